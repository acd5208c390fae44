//
// property_tests.rs
//
// Property-based tests for the fold codec, providers, and navigation
//

#![cfg(test)]

use proptest::prelude::*;

use crate::document::Document;
use crate::fold::{decode_folds, encode_folds, Fold, FOLD_PLACEHOLDER};
use crate::nav::{next_chunk, next_function, previous_chunk};
use crate::parse::{literate, r_scopes, DocumentKind};
use crate::position::Position;
use crate::scope_list::ScopeList;

// ============================================================================
// Generators
// ============================================================================

fn fold() -> impl Strategy<Value = Fold> {
    (0u32..5000, 0u32..200, 0u32..5000, 0u32..200, "[a-z ]{0,12}")
        .prop_map(|(sr, sc, er, ec, ph)| Fold::new(sr, sc, er, ec, ph))
}

/// Body line counts for a sequence of generated chunks.
fn chunk_bodies() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0usize..5, 1..12)
}

/// Build an R Markdown document with one labeled chunk per body size,
/// returning the text and each chunk's preamble row.
fn rmd_with_chunks(bodies: &[usize]) -> (String, Vec<u32>) {
    let mut text = String::new();
    let mut preambles = Vec::new();
    let mut row = 0u32;
    for (index, body_lines) in bodies.iter().enumerate() {
        preambles.push(row);
        text.push_str(&format!("```{{r c{index}}}\n"));
        for line in 0..*body_lines {
            text.push_str(&format!("x{line} <- {line}\n"));
        }
        text.push_str("```\n\n");
        row += *body_lines as u32 + 3;
    }
    (text, preambles)
}

// ============================================================================
// Property 1: fold codec round-trips geometry, never placeholders
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_fold_round_trip_geometry(folds in prop::collection::vec(fold(), 0..40)) {
        let decoded = decode_folds(&encode_folds(&folds)).unwrap();
        prop_assert_eq!(decoded.len(), folds.len());
        for (original, restored) in folds.iter().zip(&decoded) {
            prop_assert_eq!(
                (original.start_row, original.start_column, original.end_row, original.end_column),
                (restored.start_row, restored.start_column, restored.end_row, restored.end_column)
            );
            prop_assert_eq!(restored.placeholder.as_str(), FOLD_PLACEHOLDER);
        }
    }

    #[test]
    fn prop_decode_never_panics(input in ".{0,200}") {
        // Arbitrary junk either decodes or errors; it must never panic.
        let _ = decode_folds(&input);
    }

    #[test]
    fn prop_encode_emits_one_record_per_fold(folds in prop::collection::vec(fold(), 0..40)) {
        let encoded = encode_folds(&folds);
        prop_assert_eq!(encoded.lines().count(), folds.len());
        for line in encoded.lines() {
            prop_assert_eq!(line.matches('|').count(), 4);
        }
    }
}

// ============================================================================
// Property 2: literate provider builds ordered, valid trees
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    #[test]
    fn prop_generated_rmd_tree_is_valid(bodies in chunk_bodies()) {
        let (text, preambles) = rmd_with_chunks(&bodies);
        let doc = Document::new(&text);
        let tree = literate::build(&doc, DocumentKind::RMarkdown);
        tree.validate().unwrap();
        let chunk_count = tree.iter().filter(|s| s.is_chunk()).count();
        prop_assert_eq!(chunk_count, preambles.len());
    }

    #[test]
    fn prop_flatten_is_deterministic(bodies in chunk_bodies()) {
        let (text, _) = rmd_with_chunks(&bodies);
        let doc = Document::new(&text);
        let tree = literate::build(&doc, DocumentKind::RMarkdown);
        let first: Vec<_> = ScopeList::flatten(&tree).iter().map(|s| s.id()).collect();
        let second: Vec<_> = ScopeList::flatten(&tree).iter().map(|s| s.id()).collect();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_navigation_is_strict_and_ordered(bodies in chunk_bodies()) {
        let (text, preambles) = rmd_with_chunks(&bodies);
        let doc = Document::new(&text);
        let tree = literate::build(&doc, DocumentKind::RMarkdown);
        let list = ScopeList::flatten(&tree);
        for (index, &row) in preambles.iter().enumerate() {
            let pos = Position::new(row, 0);
            // A chunk is never its own "next": strict > skips the chunk
            // whose preamble equals the query position.
            match next_chunk(&list, pos) {
                Some(next) => {
                    let expected = format!("c{}", index + 1);
                    prop_assert_eq!(next.chunk_label(), Some(expected.as_str()));
                }
                None => prop_assert_eq!(index, preambles.len() - 1),
            }
            match previous_chunk(&list, pos) {
                Some(prev) => {
                    prop_assert!(index > 0);
                    let expected = format!("c{}", index - 1);
                    prop_assert_eq!(prev.chunk_label(), Some(expected.as_str()));
                }
                None => prop_assert_eq!(index, 0),
            }
        }
    }
}

// ============================================================================
// Property 3: R provider finds every generated function, in order
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    #[test]
    fn prop_generated_functions_are_all_scoped(count in 1usize..10) {
        let mut text = String::new();
        for index in 0..count {
            text.push_str(&format!("fn{index} <- function(x) {{\n  x + {index}\n}}\n\n"));
        }
        let doc = Document::new(&text);
        let tree = r_scopes::build(&doc);
        tree.validate().unwrap();

        let list = ScopeList::flatten(&tree);
        let mut named = list.clone();
        named.select_all(crate::scope_list::is_named_function);
        prop_assert_eq!(named.len(), count);

        // next_function from each declaration row lands on the next one.
        for index in 0..count.saturating_sub(1) {
            let pos = Position::new((index * 4) as u32, 0);
            let next = next_function(&list, pos).unwrap();
            prop_assert_eq!(next.label(), format!("fn{}", index + 1));
        }
    }
}
