//
// sweave.rs
//
// Recursive <<label>> chunk-include expansion
//

use regex::Regex;
use std::sync::OnceLock;

use crate::document::Document;
use crate::nav::chunk_inner_range;
use crate::position::Position;
use crate::scope::Scope;
use crate::scope_list::ScopeList;

/// A reference line: `<<` label `>>` followed by anything. The capture is
/// non-greedy so `<<a>> <<b>>` reads label `a`.
fn include_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^<<(.*?)>>").unwrap())
}

/// Expand every `<<label>>` reference line in `chunk`'s inner text.
///
/// Only chunks strictly before the referencing chunk are eligible targets,
/// so forward and self references never resolve and expansion always
/// terminates. Unresolved references are left verbatim.
pub fn expand_chunk_includes(doc: &Document, list: &ScopeList<'_>, chunk: Scope<'_>) -> String {
    let inner = doc.text_in_range(chunk_inner_range(chunk, doc));
    expand_includes_before(doc, list, &inner, chunk.preamble())
}

/// Expand `<<label>>` references in `text` against chunks whose preamble is
/// strictly before `boundary`.
pub fn expand_includes_before(
    doc: &Document,
    list: &ScopeList<'_>,
    text: &str,
    boundary: Position,
) -> String {
    let mut out: Vec<String> = Vec::new();
    for line in text.lines() {
        let replacement = include_pattern()
            .captures(line)
            .map(|caps| caps.get(1).map(|m| m.as_str()).unwrap_or(""))
            .and_then(|label| find_prior_chunk(list, label, boundary));
        match replacement {
            Some(target) => {
                let inner = doc.text_in_range(chunk_inner_range(target, doc));
                // The target's own references resolve against chunks before
                // *it*; the strictly-decreasing boundary guarantees
                // termination without separate cycle detection.
                let expanded = expand_includes_before(doc, list, &inner, target.preamble());
                out.push(expanded.trim_end_matches('\n').to_string());
            }
            None => out.push(line.to_string()),
        }
    }
    out.join("\n")
}

/// Scan the chunk list in document order for a chunk labeled `label`,
/// giving up at the first candidate whose preamble is at or after
/// `boundary`.
fn find_prior_chunk<'t>(
    list: &ScopeList<'t>,
    label: &str,
    boundary: Position,
) -> Option<Scope<'t>> {
    for scope in list.iter() {
        if !scope.is_chunk() {
            continue;
        }
        if !scope.preamble().is_before(boundary) {
            return None;
        }
        if scope.chunk_label() == Some(label) {
            return Some(scope);
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
