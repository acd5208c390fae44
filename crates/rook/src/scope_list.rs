//
// scope_list.rs
//
// Flattened, filterable scope-tree snapshots
//

use crate::position::Range;
use crate::scope::{Scope, ScopeId, ScopeTree};

/// An ordered, flattened snapshot of every scope in a tree, captured by
/// pre-order traversal at construction time.
///
/// Filtering mutates the list's own index vector only; the underlying tree
/// is never touched. Two flattenings of an unchanged tree are identical
/// sequences, which is what navigation correctness rests on.
#[derive(Debug, Clone)]
pub struct ScopeList<'t> {
    tree: &'t ScopeTree,
    items: Vec<ScopeId>,
}

impl<'t> ScopeList<'t> {
    /// Flatten a tree: parent before children, children in source order.
    pub fn flatten(tree: &'t ScopeTree) -> Self {
        let items = tree.iter().map(|s| s.id()).collect();
        Self { tree, items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Scope<'t>> + '_ {
        let tree = self.tree;
        self.items.iter().map(move |&id| tree.get(id))
    }

    /// Drop every element satisfying `pred`; relative order is preserved.
    pub fn remove_all(&mut self, mut pred: impl FnMut(Scope<'t>) -> bool) {
        let tree = self.tree;
        self.items.retain(|&id| !pred(tree.get(id)));
    }

    /// Keep only elements satisfying `pred`; relative order is preserved.
    pub fn select_all(&mut self, mut pred: impl FnMut(Scope<'t>) -> bool) {
        let tree = self.tree;
        self.items.retain(|&id| pred(tree.get(id)));
    }

    /// First element in list order satisfying `pred`. `None` is the normal
    /// no-match outcome, not an error.
    pub fn find_first(&self, mut pred: impl FnMut(Scope<'t>) -> bool) -> Option<Scope<'t>> {
        self.iter().find(|&s| pred(s))
    }

    /// Last element in list order satisfying `pred`.
    pub fn find_last(&self, mut pred: impl FnMut(Scope<'t>) -> bool) -> Option<Scope<'t>> {
        let tree = self.tree;
        self.items
            .iter()
            .rev()
            .map(|&id| tree.get(id))
            .find(|&s| pred(s))
    }
}

// ============================================================================
// Built-in predicates
// ============================================================================

pub fn is_chunk(scope: Scope<'_>) -> bool {
    scope.is_chunk()
}

pub fn is_section(scope: Scope<'_>) -> bool {
    scope.is_section()
}

/// A brace scope with a non-empty label (a named function definition).
pub fn is_named_function(scope: Scope<'_>) -> bool {
    scope.is_brace() && !scope.label().is_empty()
}

/// A brace scope with no label.
pub fn is_anonymous_brace(scope: Scope<'_>) -> bool {
    scope.is_brace() && scope.label().is_empty()
}

/// Whether both endpoints of `range` nest fully inside the scope, measured
/// from its fold point.
pub fn contains_fold_range(scope: Scope<'_>, range: Range) -> bool {
    let fold_start = scope.fold_start();
    let end = scope.end();
    fold_start <= range.start && end >= range.start && fold_start <= range.end && end >= range.end
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;
    use crate::scope::{ScopeKind, ScopeTreeBuilder};

    /// root
    ///   fn alpha (1,0)..(5,1)
    ///     brace   (2,2)..(4,3)
    ///   chunk one (8,0)..(12,3)
    ///   fn beta  (15,0)..(20,1)
    fn sample_tree() -> ScopeTree {
        let mut b = ScopeTreeBuilder::new();
        b.open(
            ScopeKind::Function,
            "alpha",
            Position::new(1, 0),
            Position::new(1, 18),
        );
        b.open(ScopeKind::Brace, "", Position::new(2, 2), Position::new(2, 2));
        b.close(Position::new(4, 3));
        b.close(Position::new(5, 1));
        let chunk = b.open(
            ScopeKind::Chunk,
            "one",
            Position::new(8, 0),
            Position::new(9, 0),
        );
        b.set_chunk_label(chunk, "one");
        b.close(Position::new(12, 3));
        b.open(
            ScopeKind::Function,
            "beta",
            Position::new(15, 0),
            Position::new(15, 17),
        );
        b.close(Position::new(20, 1));
        b.finish(Position::new(25, 0))
    }

    #[test]
    fn test_flatten_is_deterministic() {
        let tree = sample_tree();
        let first: Vec<_> = ScopeList::flatten(&tree).iter().map(|s| s.id()).collect();
        let second: Vec<_> = ScopeList::flatten(&tree).iter().map(|s| s.id()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_flatten_collects_every_node_once() {
        let tree = sample_tree();
        let list = ScopeList::flatten(&tree);
        assert_eq!(list.len(), tree.len());
    }

    #[test]
    fn test_select_all_keeps_only_matches() {
        let tree = sample_tree();
        let mut list = ScopeList::flatten(&tree);
        list.select_all(is_named_function);
        let labels: Vec<&str> = list.iter().map(|s| s.label()).collect();
        assert_eq!(labels, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_remove_all_is_complement_of_select_all() {
        let tree = sample_tree();
        let mut kept = ScopeList::flatten(&tree);
        let mut dropped = ScopeList::flatten(&tree);
        kept.select_all(is_chunk);
        dropped.remove_all(is_chunk);
        assert_eq!(kept.len() + dropped.len(), tree.len());
        assert!(kept.iter().all(|s| s.is_chunk()));
        assert!(dropped.iter().all(|s| !s.is_chunk()));
    }

    #[test]
    fn test_find_first_after_select_all_satisfies_predicate() {
        let tree = sample_tree();
        let mut list = ScopeList::flatten(&tree);
        list.select_all(is_named_function);
        let found = list.find_first(|_| true).unwrap();
        assert!(is_named_function(found));
    }

    #[test]
    fn test_find_first_on_emptied_list_is_none() {
        let tree = sample_tree();
        let mut list = ScopeList::flatten(&tree);
        list.select_all(|s| s.is_yaml());
        assert!(list.is_empty());
        assert!(list.find_first(|_| true).is_none());
    }

    #[test]
    fn test_find_last_returns_last_match() {
        let tree = sample_tree();
        let list = ScopeList::flatten(&tree);
        let last = list.find_last(is_named_function).unwrap();
        assert_eq!(last.label(), "beta");
    }

    #[test]
    fn test_anonymous_brace_predicate() {
        let tree = sample_tree();
        let list = ScopeList::flatten(&tree);
        let anon = list.find_first(is_anonymous_brace).unwrap();
        assert_eq!(anon.kind(), ScopeKind::Brace);
        assert!(anon.label().is_empty());
    }

    #[test]
    fn test_contains_fold_range_measured_from_fold_point() {
        let tree = sample_tree();
        let list = ScopeList::flatten(&tree);
        let alpha = list.find_first(is_named_function).unwrap();
        // alpha's fold point is its body start (1,18), not its preamble.
        let inside = Range::new(Position::new(2, 0), Position::new(4, 0));
        let before_body = Range::new(Position::new(1, 0), Position::new(4, 0));
        let past_end = Range::new(Position::new(2, 0), Position::new(9, 0));
        assert!(contains_fold_range(alpha, inside));
        assert!(!contains_fold_range(alpha, before_body));
        assert!(!contains_fold_range(alpha, past_end));
    }

    #[test]
    fn test_filter_does_not_touch_the_tree() {
        let tree = sample_tree();
        let mut list = ScopeList::flatten(&tree);
        list.select_all(is_chunk);
        assert_eq!(list.len(), 1);
        // A fresh flattening still sees every node.
        assert_eq!(ScopeList::flatten(&tree).len(), tree.len());
    }
}
