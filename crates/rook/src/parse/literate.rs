//
// parse/literate.rs
//
// Scope-tree provider for R Markdown and Sweave documents
//

use regex::Regex;
use std::sync::OnceLock;

use crate::document::Document;
use crate::position::Position;
use crate::scope::{ScopeKind, ScopeTree, ScopeTreeBuilder};

use super::DocumentKind;

struct LiteratePatterns {
    yaml_fence: Regex,
    yaml_end: Regex,
    rmd_chunk_begin: Regex,
    rmd_chunk_end: Regex,
    rnw_chunk_begin: Regex,
    rnw_chunk_end: Regex,
    header: Regex,
}

fn patterns() -> &'static LiteratePatterns {
    static PATTERNS: OnceLock<LiteratePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| LiteratePatterns {
        yaml_fence: Regex::new(r"^---\s*$").unwrap(),
        yaml_end: Regex::new(r"^(?:---|\.\.\.)\s*$").unwrap(),
        rmd_chunk_begin: Regex::new(r"^```+\s*\{(.*)\}\s*$").unwrap(),
        rmd_chunk_end: Regex::new(r"^```+\s*$").unwrap(),
        rnw_chunk_begin: Regex::new(r"^<<(.*?)>>=").unwrap(),
        rnw_chunk_end: Regex::new(r"^@(?:\s.*)?$").unwrap(),
        header: Regex::new(r"^(#{1,6})\s+(.+?)\s*#*\s*$").unwrap(),
    })
}

enum State {
    Text,
    Yaml,
    Chunk,
}

/// Build the scope tree for a literate document.
///
/// Chunks nest under the innermost Markdown header; headers nest by depth;
/// YAML front matter is recognized only at the very top of an R Markdown
/// document. Everything still open at the last line closes at the document
/// end.
pub fn build(doc: &Document, kind: DocumentKind) -> ScopeTree {
    debug_assert!(kind != DocumentKind::R, "literate provider on an R source");
    let patterns = patterns();
    let mut builder = ScopeTreeBuilder::new();
    let mut state = State::Text;

    for row in 0..doc.len_lines() as u32 {
        let line = doc.line(row);
        match state {
            State::Yaml => {
                if patterns.yaml_end.is_match(&line) {
                    builder.close(Position::new(row, doc.line_length(row)));
                    state = State::Text;
                }
            }
            State::Chunk => {
                let closed = match kind {
                    DocumentKind::RMarkdown => patterns.rmd_chunk_end.is_match(&line),
                    _ => patterns.rnw_chunk_end.is_match(&line),
                };
                if closed {
                    builder.close(Position::new(row, doc.line_length(row)));
                    state = State::Text;
                }
            }
            State::Text => {
                if kind == DocumentKind::RMarkdown {
                    if row == 0 && patterns.yaml_fence.is_match(&line) {
                        builder.open(
                            ScopeKind::Yaml,
                            "",
                            Position::zero(),
                            Position::new(1, 0),
                        );
                        state = State::Yaml;
                        continue;
                    }
                    if let Some(caps) = patterns.rmd_chunk_begin.captures(&line) {
                        let label = rmd_chunk_label(caps.get(1).map(|m| m.as_str()).unwrap_or(""));
                        open_chunk(&mut builder, row, label);
                        state = State::Chunk;
                        continue;
                    }
                    if let Some(caps) = patterns.header.captures(&line) {
                        let depth = caps.get(1).map(|m| m.as_str().len() as u32).unwrap_or(1);
                        let label = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");
                        open_header(&mut builder, row, depth, label);
                        continue;
                    }
                } else if let Some(caps) = patterns.rnw_chunk_begin.captures(&line) {
                    let label = rnw_chunk_label(caps.get(1).map(|m| m.as_str()).unwrap_or(""));
                    open_chunk(&mut builder, row, label);
                    state = State::Chunk;
                }
            }
        }
    }
    builder.finish(doc.end_position())
}

/// A chunk opens on its fence line and its body starts on the next row.
fn open_chunk(builder: &mut ScopeTreeBuilder, row: u32, label: Option<String>) {
    let label = label.unwrap_or_default();
    let id = builder.open(
        ScopeKind::Chunk,
        label.clone(),
        Position::new(row, 0),
        Position::new(row + 1, 0),
    );
    builder.set_chunk_label(id, label);
}

/// Headers nest by depth: a new header closes every open header at the same
/// or deeper level before opening.
fn open_header(builder: &mut ScopeTreeBuilder, row: u32, depth: u32, label: &str) {
    while builder.kind_of(builder.current()) == ScopeKind::MarkdownHeader
        && builder.depth_of(builder.current()) >= depth
    {
        builder.close(Position::new(row, 0));
    }
    let id = builder.open(
        ScopeKind::MarkdownHeader,
        label,
        Position::new(row, 0),
        Position::new(row, 0),
    );
    builder.set_depth(id, depth);
}

/// Extract the chunk label from the inside of an R Markdown fence header:
/// `r label`, `r label, opts`, or `r, label=...`; a bare engine has no
/// label.
fn rmd_chunk_label(header: &str) -> Option<String> {
    let mut pieces = header.split(',');
    let first = pieces.next()?.trim();
    if let Some(rest) = first.splitn(2, char::is_whitespace).nth(1) {
        let label = rest.trim();
        if !label.is_empty() {
            return Some(label.to_string());
        }
    }
    match pieces.next().map(str::trim) {
        Some(second) if !second.is_empty() => {
            if let Some(value) = second.strip_prefix("label") {
                let value = value.trim_start().strip_prefix('=')?;
                let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
                (!value.is_empty()).then(|| value.to_string())
            } else if !second.contains('=') {
                Some(second.to_string())
            } else {
                None
            }
        }
        _ => None,
    }
}

/// A Sweave chunk's label is the first comma-separated piece of its header.
fn rnw_chunk_label(header: &str) -> Option<String> {
    let label = header.split(',').next()?.trim();
    // Option-only headers (`<<echo=FALSE>>=`) have no label.
    if label.is_empty() || label.contains('=') {
        return None;
    }
    Some(label.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
