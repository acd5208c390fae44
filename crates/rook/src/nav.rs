//
// nav.rs
//
// Chunk and function navigation over scope-list snapshots
//

use crate::document::Document;
use crate::position::{Position, Range};
use crate::scope::{Scope, ScopeQueryError, ScopeTree};
use crate::scope_list::{is_named_function, ScopeList};

/// The first chunk whose preamble is strictly after `pos`.
///
/// Strict comparison means navigation always advances: a chunk whose
/// preamble sits exactly at `pos` is not "next".
pub fn next_chunk<'t>(list: &ScopeList<'t>, pos: Position) -> Option<Scope<'t>> {
    list.find_first(|s| s.is_chunk() && s.preamble().is_after(pos))
}

/// The last chunk whose preamble is strictly before `pos`.
pub fn previous_chunk<'t>(list: &ScopeList<'t>, pos: Position) -> Option<Scope<'t>> {
    list.find_last(|s| s.is_chunk() && s.preamble().is_before(pos))
}

/// The first named function whose preamble is strictly after `pos`.
pub fn next_function<'t>(list: &ScopeList<'t>, pos: Position) -> Option<Scope<'t>> {
    list.find_first(|s| is_named_function(s) && s.preamble().is_after(pos))
}

/// The last named function whose preamble is strictly before `pos`.
pub fn previous_function<'t>(list: &ScopeList<'t>, pos: Position) -> Option<Scope<'t>> {
    list.find_last(|s| is_named_function(s) && s.preamble().is_before(pos))
}

/// The innermost chunk containing `pos`, or `Ok(None)` when the cursor is
/// not inside any chunk. `Err` only on the empty-active-chain invariant
/// violation.
pub fn current_chunk(tree: &ScopeTree, pos: Position) -> Result<Option<Scope<'_>>, ScopeQueryError> {
    let chain = tree.active_scopes(pos);
    if chain.is_empty() {
        log::warn!(
            "no containing scope at ({}, {}) while resolving current chunk",
            pos.row,
            pos.column
        );
        return Err(ScopeQueryError::NoContainingScope { position: pos });
    }
    Ok(chain.into_iter().rev().find(|s| s.is_chunk()))
}

/// The body-only range of a chunk, excluding its header line and its
/// closing-delimiter line.
///
/// Start is the first column of the line after the preamble. When the body
/// ends on that same row the end is `(end.row, 0)`; otherwise the
/// closing-fence row is excluded entirely and the end is the end-of-line
/// position of the row just before it.
///
/// The caller must pass a chunk scope; anything else is a programming
/// error.
pub fn chunk_inner_range(chunk: Scope<'_>, doc: &Document) -> Range {
    debug_assert!(chunk.is_chunk(), "chunk_inner_range on a non-chunk scope");
    let start = Position::new(chunk.preamble().row + 1, 0);
    let end_row = chunk.end().row;
    let end = if start.row == end_row {
        Position::new(end_row, 0)
    } else {
        let last_body_row = end_row - 1;
        Position::new(last_body_row, doc.line_length(last_body_row))
    };
    Range::new(start, end)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
