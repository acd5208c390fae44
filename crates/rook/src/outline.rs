//
// outline.rs
//
// Document outline: owns a document and its current scope-tree snapshot
//

use crate::document::Document;
use crate::parse::{build_scope_tree, DocumentKind};
use crate::position::{Position, Range};
use crate::scope::{Scope, ScopeQueryError, ScopeTree};
use crate::scope_list::ScopeList;

struct CachedTree {
    revision: u64,
    tree: ScopeTree,
}

/// The long-lived session object for one document.
///
/// Owns the document text and rebuilds the scope tree lazily whenever the
/// document revision has moved past the cached snapshot. All state is
/// explicit and per-document; there is no process-wide cache.
///
/// Queries are synchronous reads; callers should construct a snapshot
/// (scope list or active chain), run their queries, and discard it before
/// the next edit.
pub struct DocumentOutline {
    doc: Document,
    kind: DocumentKind,
    cached: Option<CachedTree>,
}

impl DocumentOutline {
    pub fn new(text: &str, kind: DocumentKind) -> Self {
        Self {
            doc: Document::new(text),
            kind,
            cached: None,
        }
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// The current scope tree, rebuilding if the cached snapshot is stale.
    pub fn tree(&mut self) -> &ScopeTree {
        let stale = match &self.cached {
            Some(cached) => cached.revision != self.doc.revision(),
            None => true,
        };
        if stale {
            log::debug!(
                "rebuilding scope tree at revision {} ({:?})",
                self.doc.revision(),
                self.kind
            );
            self.cached = Some(CachedTree {
                revision: self.doc.revision(),
                tree: build_scope_tree(&self.doc, self.kind),
            });
        }
        &self.cached.as_ref().expect("tree was just built").tree
    }

    /// All scopes containing `pos`, outermost first.
    pub fn active_scopes(&mut self, pos: Position) -> Vec<Scope<'_>> {
        self.tree().active_scopes(pos)
    }

    /// The innermost scope containing `pos`.
    pub fn scope_at(&mut self, pos: Position) -> Result<Scope<'_>, ScopeQueryError> {
        self.tree().scope_at(pos)
    }

    /// A flattened snapshot of the current tree.
    pub fn scope_list(&mut self) -> ScopeList<'_> {
        ScopeList::flatten(self.tree())
    }

    /// Out-of-band staleness notification: scope information at or after
    /// `pos` can no longer be trusted. Fire-and-forget; the next query
    /// reparses.
    pub fn invalidate_from(&mut self, pos: Position) {
        log::debug!(
            "scope tree invalidated from ({}, {})",
            pos.row,
            pos.column
        );
        self.cached = None;
    }

    /// Replace text in `range`, implicitly invalidating the snapshot.
    pub fn edit(&mut self, range: Range, text: &str) {
        self.doc.replace_range(range, text);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
