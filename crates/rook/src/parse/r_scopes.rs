//
// parse/r_scopes.rs
//
// Scope-tree provider for plain R sources, built on tree-sitter
//

use regex::Regex;
use std::sync::OnceLock;
use tree_sitter::Node;

use crate::columns::byte_to_char_column;
use crate::document::Document;
use crate::position::Position;
use crate::scope::{ScopeKind, ScopeTree, ScopeTreeBuilder};

use super::parser_pool::with_parser;

/// A comment section marker: one or more hashes, a label, and a trailing
/// run of four or more dashes/equals/hashes (`# Load data ----`).
fn section_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(#+)\s+(.*?)\s*[-=#]{4,}\s*$").unwrap())
}

/// Document-ordered build events. Braces come from the AST walk and are
/// properly nested; section markers interleave and only take effect when no
/// brace scope is open.
#[derive(Debug)]
enum Event {
    Open {
        kind: ScopeKind,
        label: String,
        preamble: Position,
        body_start: Position,
    },
    Close {
        at: Position,
    },
    Section {
        at: Position,
        depth: u32,
        label: String,
    },
}

impl Event {
    fn position(&self) -> Position {
        match self {
            Event::Open { preamble, .. } => *preamble,
            Event::Close { at } => *at,
            Event::Section { at, .. } => *at,
        }
    }

    /// Tie-break at equal positions: close before marker before open.
    fn rank(&self) -> u8 {
        match self {
            Event::Close { .. } => 0,
            Event::Section { .. } => 1,
            Event::Open { .. } => 2,
        }
    }
}

/// Build the scope tree for an R document.
///
/// Every braced expression becomes a scope, classified by its context:
/// `name <- function(...) { }` is a named function (preamble at the name),
/// `\(x) { }` a lambda, an unbound `function(...) { }` anonymous, anything
/// else a bare brace. Comment section markers partition the top level.
pub fn build(doc: &Document) -> ScopeTree {
    let text = doc.text();
    let tree = with_parser(|parser| parser.parse(&text, None));

    let mut events = Vec::new();
    match &tree {
        Some(tree) => collect_events(tree.root_node(), &text, doc, &mut events),
        None => log::warn!("R parse failed; scope tree has only the root"),
    }
    events.sort_by_key(|e| (e.position(), e.rank()));

    let mut builder = ScopeTreeBuilder::new();
    for event in events {
        match event {
            Event::Open {
                kind,
                label,
                preamble,
                body_start,
            } => {
                builder.open(kind, label, preamble, body_start);
            }
            Event::Close { at } => builder.close(at),
            Event::Section { at, depth, label } => {
                // Markers inside an open brace scope are ignored; sections
                // only partition the top level and each other.
                if !matches!(
                    builder.kind_of(builder.current()),
                    ScopeKind::Root | ScopeKind::Section
                ) {
                    continue;
                }
                // The previous section runs right up to where the new one
                // begins, so a marker trailing other code on its line never
                // cuts an already-closed sibling short.
                while builder.kind_of(builder.current()) == ScopeKind::Section
                    && builder.depth_of(builder.current()) >= depth
                {
                    builder.close(at);
                }
                let id = builder.open(ScopeKind::Section, label, at, at);
                builder.set_depth(id, depth);
            }
        }
    }
    builder.finish(doc.end_position())
}

fn collect_events(node: Node, src: &str, doc: &Document, events: &mut Vec<Event>) {
    match node.kind() {
        "braced_expression" => {
            let (kind, label, preamble) = classify_brace(node, src, doc);
            events.push(Event::Open {
                kind,
                label,
                preamble,
                body_start: to_position(node.start_position(), doc),
            });
            events.push(Event::Close {
                at: to_position(node.end_position(), doc),
            });
        }
        "comment" => {
            if let Some((depth, label)) = match_section(node_text(node, src)) {
                events.push(Event::Section {
                    at: to_position(node.start_position(), doc),
                    depth,
                    label,
                });
            }
        }
        _ => {}
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_events(child, src, doc, events);
    }
}

/// Classify a braced expression by the construct it belongs to.
fn classify_brace(brace: Node, src: &str, doc: &Document) -> (ScopeKind, String, Position) {
    let parent = match brace.parent() {
        Some(p) if p.kind() == "function_definition" && is_body_of(p, brace) => p,
        _ => {
            return (
                ScopeKind::Brace,
                String::new(),
                to_position(brace.start_position(), doc),
            )
        }
    };

    // Backslash lambdas stay anonymous even when assigned to a name.
    if parent.child(0).map(|c| c.kind()) == Some("\\") {
        return (
            ScopeKind::Lambda,
            String::new(),
            to_position(parent.start_position(), doc),
        );
    }

    if let Some((label, name_node)) = named_assignment_of(parent, src) {
        let mut preamble = to_position(name_node.start_position(), doc);
        // When the name opens its line the scope starts at column 0, so the
        // whole declaration line reads as part of the function.
        let line = doc.line(preamble.row);
        if line
            .chars()
            .take(preamble.column as usize)
            .all(char::is_whitespace)
        {
            preamble.column = 0;
        }
        return (ScopeKind::Function, label, preamble);
    }

    (
        ScopeKind::Anon,
        String::new(),
        to_position(parent.start_position(), doc),
    )
}

/// If `func` is the right-hand side of `name <- function`, `name =
/// function`, or `name <<- function`, return the name. `->` assignments do
/// not produce named scopes.
fn named_assignment_of<'t>(func: Node<'t>, src: &str) -> Option<(String, Node<'t>)> {
    let assign = func.parent()?;
    if assign.kind() != "binary_operator" {
        return None;
    }
    let mut cursor = assign.walk();
    let children: Vec<Node> = assign.children(&mut cursor).filter(|c| !c.is_extra()).collect();
    if children.len() != 3 {
        return None;
    }
    let (lhs, op, rhs) = (children[0], children[1], children[2]);
    if rhs.id() != func.id() || !matches!(node_text(op, src), "<-" | "=" | "<<-") {
        return None;
    }
    if lhs.kind() != "identifier" {
        return None;
    }
    Some((node_text(lhs, src).to_string(), lhs))
}

fn is_body_of(func: Node, brace: Node) -> bool {
    func.child_by_field_name("body")
        .map(|body| body.id() == brace.id())
        .unwrap_or(false)
}

fn match_section(comment: &str) -> Option<(u32, String)> {
    let caps = section_pattern().captures(comment)?;
    let depth = caps.get(1).map(|m| m.as_str().len() as u32)?;
    let label = caps.get(2).map(|m| m.as_str().trim().to_string())?;
    if label.is_empty() {
        return None;
    }
    Some((depth, label))
}

fn node_text<'s>(node: Node, src: &'s str) -> &'s str {
    &src[node.byte_range()]
}

/// Convert a tree-sitter point (byte column) to a document position
/// (character column).
fn to_position(point: tree_sitter::Point, doc: &Document) -> Position {
    let row = point.row as u32;
    let column = byte_to_char_column(&doc.line(row), point.column as u32);
    Position::new(row, column)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
