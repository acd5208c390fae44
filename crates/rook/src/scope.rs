//
// scope.rs
//
// Scope nodes, the arena-allocated scope tree, and position queries
//

use thiserror::Error;

use crate::position::{Position, Range};

// ============================================================================
// Scope kinds and classification
// ============================================================================

/// The syntactic kind of a scope.
///
/// Classification is advisory: a document kind a provider does not produce
/// simply never appears, and `Unknown` answers `false` to every capability
/// predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// The top-level scope spanning the whole document.
    Root,
    /// A bare `{ ... }` block not attached to any construct.
    Brace,
    /// An embedded sub-document region (R Markdown or Sweave code chunk).
    Chunk,
    /// A comment section marker (`# label ----`).
    Section,
    /// A named function definition.
    Function,
    Class,
    Namespace,
    /// A backslash lambda (`\(x) ...`).
    Lambda,
    /// An anonymous `function(...)` with no binding.
    Anon,
    /// A Markdown header, with nesting depth.
    MarkdownHeader,
    /// YAML front matter at the top of a literate document.
    Yaml,
    /// A kind this library does not recognize.
    Unknown,
}

impl ScopeKind {
    /// Short lowercase name used in diagnostic output.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeKind::Root => "root",
            ScopeKind::Brace => "brace",
            ScopeKind::Chunk => "chunk",
            ScopeKind::Section => "section",
            ScopeKind::Function => "function",
            ScopeKind::Class => "class",
            ScopeKind::Namespace => "namespace",
            ScopeKind::Lambda => "lambda",
            ScopeKind::Anon => "anon",
            ScopeKind::MarkdownHeader => "header",
            ScopeKind::Yaml => "yaml",
            ScopeKind::Unknown => "unknown",
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Defects surfaced by scope queries.
///
/// These indicate provider bugs, not user state: a well-formed tree always
/// has a root scope containing every in-document position.
#[derive(Debug, Error)]
pub enum ScopeQueryError {
    #[error("no containing scope at row {}, column {}", position.row, position.column)]
    NoContainingScope { position: Position },
    #[error("scope tree invariant violated: {detail}")]
    InvariantViolation { detail: String },
}

// ============================================================================
// Tree storage
// ============================================================================

/// Index of a scope node within its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Per-node data. Nodes are linked by arena indices, never by pointers; the
/// parent back-reference is an index into the same arena.
#[derive(Debug, Clone)]
struct ScopeNode {
    label: String,
    kind: ScopeKind,
    preamble: Position,
    body_start: Position,
    end: Position,
    chunk_label: Option<String>,
    depth: u32,
    parent: Option<ScopeId>,
    children: Vec<ScopeId>,
}

/// One document's scope tree at one point in time.
///
/// Trees are built once per parse pass and never mutated afterwards. Hold a
/// tree only while the document is unchanged; positions in a snapshot are
/// stale the instant the document mutates.
#[derive(Debug, Clone)]
pub struct ScopeTree {
    nodes: Vec<ScopeNode>,
}

impl ScopeTree {
    /// The root scope (always present).
    pub fn root(&self) -> Scope<'_> {
        Scope {
            tree: self,
            id: ScopeId(0),
        }
    }

    /// Total number of scopes, including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Resolve a scope id to a view. Ids are only valid for the tree that
    /// produced them.
    pub fn get(&self, id: ScopeId) -> Scope<'_> {
        debug_assert!(id.index() < self.nodes.len());
        Scope { tree: self, id }
    }

    /// Pre-order traversal: parent before children, children in source order.
    pub fn iter(&self) -> PreOrderIter<'_> {
        PreOrderIter {
            tree: self,
            stack: if self.nodes.is_empty() {
                vec![]
            } else {
                vec![ScopeId(0)]
            },
        }
    }

    /// All scopes containing `pos`, outermost first, innermost last.
    ///
    /// Containment is end-exclusive for nested scopes (a position at a
    /// scope's end belongs to what follows it) and end-inclusive for the
    /// root, which conventionally spans the whole document. Returns an empty
    /// chain only when `pos` falls outside the root scope.
    pub fn active_scopes(&self, pos: Position) -> Vec<Scope<'_>> {
        let mut chain = Vec::new();
        if self.nodes.is_empty() {
            return chain;
        }
        let root = &self.nodes[0];
        if pos < root.preamble || pos > root.end {
            return chain;
        }
        let mut current = ScopeId(0);
        chain.push(self.get(current));
        loop {
            let node = &self.nodes[current.index()];
            match self.child_containing(&node.children, pos) {
                Some(child) => {
                    chain.push(self.get(child));
                    current = child;
                }
                None => break,
            }
        }
        chain
    }

    /// The innermost scope containing `pos`.
    ///
    /// An empty active-scope chain is an invariant violation (the root is
    /// expected to contain every in-document position); it is logged and
    /// surfaced as an error rather than silently recovered, since a wrong
    /// scope would corrupt downstream navigation decisions.
    pub fn scope_at(&self, pos: Position) -> Result<Scope<'_>, ScopeQueryError> {
        let chain = self.active_scopes(pos);
        match chain.last() {
            Some(scope) => Ok(*scope),
            None => {
                log::warn!(
                    "no containing scope at ({}, {}); root does not span the document",
                    pos.row,
                    pos.column
                );
                Err(ScopeQueryError::NoContainingScope { position: pos })
            }
        }
    }

    /// Binary search an ordered child list for the child containing `pos`.
    fn child_containing(&self, children: &[ScopeId], pos: Position) -> Option<ScopeId> {
        let mut lo = 0usize;
        let mut hi = children.len();
        while lo < hi {
            let mid = (lo + hi) / 2;
            let node = &self.nodes[children[mid].index()];
            if pos < node.preamble {
                hi = mid;
            } else if pos >= node.end {
                lo = mid + 1;
            } else {
                return Some(children[mid]);
            }
        }
        None
    }

    /// Check the structural invariants of the tree.
    ///
    /// For every scope: `preamble <= body_start <= end`; every child nests
    /// inside the parent body; consecutive children are ordered and
    /// non-overlapping. Intended for provider tests and diagnostics.
    pub fn validate(&self) -> Result<(), ScopeQueryError> {
        for (index, node) in self.nodes.iter().enumerate() {
            let fail = |detail: String| {
                log::warn!("scope tree validation failed: {detail}");
                Err(ScopeQueryError::InvariantViolation { detail })
            };
            if !(node.preamble <= node.body_start && node.body_start <= node.end) {
                return fail(format!(
                    "scope #{index} ({}) has disordered boundaries {:?} / {:?} / {:?}",
                    node.kind.as_str(),
                    node.preamble,
                    node.body_start,
                    node.end
                ));
            }
            let mut previous_end: Option<Position> = None;
            for &child_id in &node.children {
                let child = &self.nodes[child_id.index()];
                if child.parent != Some(ScopeId(index as u32)) {
                    return fail(format!(
                        "scope #{} has a stale parent back-reference",
                        child_id.index()
                    ));
                }
                if child.preamble < node.body_start || child.end > node.end {
                    return fail(format!(
                        "child #{} escapes its parent body ({:?}..{:?} outside {:?}..{:?})",
                        child_id.index(),
                        child.preamble,
                        child.end,
                        node.body_start,
                        node.end
                    ));
                }
                if let Some(prev) = previous_end {
                    if child.preamble < prev {
                        return fail(format!(
                            "children of scope #{index} overlap at {:?}",
                            child.preamble
                        ));
                    }
                }
                previous_end = Some(child.end);
            }
        }
        Ok(())
    }
}

/// Pre-order iterator over a scope tree.
pub struct PreOrderIter<'t> {
    tree: &'t ScopeTree,
    stack: Vec<ScopeId>,
}

impl<'t> Iterator for PreOrderIter<'t> {
    type Item = Scope<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = &self.tree.nodes[id.index()];
        for &child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some(self.tree.get(id))
    }
}

// ============================================================================
// Scope view
// ============================================================================

/// A cheap, copyable view of one scope in a tree.
#[derive(Clone, Copy)]
pub struct Scope<'t> {
    tree: &'t ScopeTree,
    id: ScopeId,
}

impl<'t> Scope<'t> {
    fn node(&self) -> &'t ScopeNode {
        &self.tree.nodes[self.id.index()]
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    /// The scope's display label. Empty for anonymous scopes.
    pub fn label(&self) -> &'t str {
        &self.node().label
    }

    pub fn kind(&self) -> ScopeKind {
        self.node().kind
    }

    /// Start of the semantic construct (function name, chunk header line).
    pub fn preamble(&self) -> Position {
        self.node().preamble
    }

    /// Start of the block body (opening brace, first body line of a chunk).
    pub fn body_start(&self) -> Position {
        self.node().body_start
    }

    pub fn end(&self) -> Position {
        self.node().end
    }

    pub fn range(&self) -> Range {
        Range::new(self.preamble(), self.end())
    }

    /// The chunk's label. Only meaningful for chunk scopes; `None` for an
    /// unlabeled chunk as well as for non-chunk scopes.
    pub fn chunk_label(&self) -> Option<&'t str> {
        self.node().chunk_label.as_deref()
    }

    /// Header nesting depth. Only meaningful for Markdown headers.
    pub fn depth(&self) -> u32 {
        self.node().depth
    }

    pub fn parent(&self) -> Option<Scope<'t>> {
        self.node().parent.map(|id| self.tree.get(id))
    }

    /// Children in source order.
    pub fn children(&self) -> impl Iterator<Item = Scope<'t>> + '_ {
        self.node().children.iter().map(|&id| self.tree.get(id))
    }

    /// Where a fold of this scope begins: the body for functions, the
    /// preamble for chunks and sections.
    pub fn fold_start(&self) -> Position {
        if self.is_function() {
            self.body_start()
        } else {
            self.preamble()
        }
    }

    // --- classification predicates ---

    pub fn is_top_level(&self) -> bool {
        self.kind() == ScopeKind::Root
    }

    /// Whether this scope is delimited by braces. Named functions, lambdas,
    /// classes and namespaces are all brace scopes.
    pub fn is_brace(&self) -> bool {
        matches!(
            self.kind(),
            ScopeKind::Brace
                | ScopeKind::Function
                | ScopeKind::Anon
                | ScopeKind::Lambda
                | ScopeKind::Class
                | ScopeKind::Namespace
        )
    }

    pub fn is_chunk(&self) -> bool {
        self.kind() == ScopeKind::Chunk
    }

    /// Sections include both comment section markers and Markdown headers.
    pub fn is_section(&self) -> bool {
        matches!(self.kind(), ScopeKind::Section | ScopeKind::MarkdownHeader)
    }

    pub fn is_function(&self) -> bool {
        matches!(
            self.kind(),
            ScopeKind::Function | ScopeKind::Lambda | ScopeKind::Anon
        )
    }

    pub fn is_class(&self) -> bool {
        self.kind() == ScopeKind::Class
    }

    pub fn is_namespace(&self) -> bool {
        self.kind() == ScopeKind::Namespace
    }

    pub fn is_lambda(&self) -> bool {
        self.kind() == ScopeKind::Lambda
    }

    /// Anonymous scopes: lambdas, unbound functions, and unlabeled braces.
    pub fn is_anon(&self) -> bool {
        matches!(self.kind(), ScopeKind::Anon | ScopeKind::Lambda)
            || (self.kind() == ScopeKind::Brace && self.label().is_empty())
    }

    pub fn is_markdown_header(&self) -> bool {
        self.kind() == ScopeKind::MarkdownHeader
    }

    pub fn is_yaml(&self) -> bool {
        self.kind() == ScopeKind::Yaml
    }
}

impl std::fmt::Debug for Scope<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("kind", &self.kind())
            .field("label", &self.label())
            .field("preamble", &self.preamble())
            .field("end", &self.end())
            .finish()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Node under construction; `end` stays open until the scope closes.
#[derive(Debug)]
struct BuildNode {
    label: String,
    kind: ScopeKind,
    preamble: Position,
    body_start: Position,
    end: Option<Position>,
    chunk_label: Option<String>,
    depth: u32,
    parent: Option<ScopeId>,
    children: Vec<ScopeId>,
}

/// Incrementally assembles a `ScopeTree` during a parse pass.
///
/// Providers open scopes as their preambles are encountered and close them
/// as their delimiters are seen; `finish` closes anything still open at the
/// document end so the final tree always satisfies the nesting invariant.
pub struct ScopeTreeBuilder {
    nodes: Vec<BuildNode>,
    stack: Vec<ScopeId>,
}

impl ScopeTreeBuilder {
    pub fn new() -> Self {
        let root = BuildNode {
            label: String::new(),
            kind: ScopeKind::Root,
            preamble: Position::zero(),
            body_start: Position::zero(),
            end: None,
            chunk_label: None,
            depth: 0,
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![root],
            stack: vec![ScopeId(0)],
        }
    }

    /// The innermost open scope.
    pub fn current(&self) -> ScopeId {
        *self.stack.last().expect("root scope is never closed")
    }

    pub fn kind_of(&self, id: ScopeId) -> ScopeKind {
        self.nodes[id.index()].kind
    }

    pub fn depth_of(&self, id: ScopeId) -> u32 {
        self.nodes[id.index()].depth
    }

    /// Whether any scope other than the root is still open.
    pub fn has_open_scope(&self) -> bool {
        self.stack.len() > 1
    }

    /// Open a scope as a child of the current innermost open scope.
    pub fn open(
        &mut self,
        kind: ScopeKind,
        label: impl Into<String>,
        preamble: Position,
        body_start: Position,
    ) -> ScopeId {
        let id = ScopeId(self.nodes.len() as u32);
        let parent = self.current();
        self.nodes.push(BuildNode {
            label: label.into(),
            kind,
            preamble,
            body_start,
            end: None,
            chunk_label: None,
            depth: 0,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.index()].children.push(id);
        self.stack.push(id);
        id
    }

    pub fn set_chunk_label(&mut self, id: ScopeId, label: impl Into<String>) {
        let label = label.into();
        self.nodes[id.index()].chunk_label = if label.is_empty() { None } else { Some(label) };
    }

    pub fn set_depth(&mut self, id: ScopeId, depth: u32) {
        self.nodes[id.index()].depth = depth;
    }

    /// Close the innermost open scope at `end`. Closing the root is a
    /// programming error; the root closes in `finish`.
    pub fn close(&mut self, end: Position) {
        debug_assert!(self.has_open_scope(), "attempted to close the root scope");
        if self.stack.len() > 1 {
            let id = self.stack.pop().expect("stack is non-empty");
            let node = &mut self.nodes[id.index()];
            node.end = Some(end.max(node.body_start));
        }
    }

    /// Close every open scope (root included) at `doc_end` and produce the
    /// finished tree.
    pub fn finish(mut self, doc_end: Position) -> ScopeTree {
        while self.stack.len() > 1 {
            self.close(doc_end);
        }
        self.nodes[0].end = Some(doc_end);
        let nodes = self
            .nodes
            .into_iter()
            .map(|n| {
                // A synthesized body start (e.g. the line after a fence that
                // is the last line of the document) may point past the end;
                // clamp so closing at doc_end keeps the nesting invariant.
                let body_start = n.body_start.min(doc_end).max(n.preamble);
                let end = n.end.unwrap_or(doc_end).max(body_start);
                ScopeNode {
                    label: n.label,
                    kind: n.kind,
                    preamble: n.preamble,
                    body_start,
                    end,
                    chunk_label: n.chunk_label,
                    depth: n.depth,
                    parent: n.parent,
                    children: n.children,
                }
            })
            .collect();
        ScopeTree { nodes }
    }
}

impl Default for ScopeTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
