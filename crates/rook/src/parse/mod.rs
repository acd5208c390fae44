//! Scope-tree providers.
//!
//! Each provider turns one document into a [`ScopeTree`](crate::scope::ScopeTree)
//! snapshot:
//!
//! - `r_scopes`: tree-sitter based builder for plain R sources (functions,
//!   lambdas, braces, comment sections)
//! - `literate`: line-scanner for R Markdown and Sweave documents (YAML
//!   front matter, Markdown headers, code chunks)

use std::path::Path;

use crate::document::Document;
use crate::scope::ScopeTree;

pub mod literate;
pub mod parser_pool;
pub mod r_scopes;

/// The flavor of document a provider should assume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Plain R source (`.R`).
    R,
    /// R Markdown / Quarto (`.Rmd`, `.qmd`): fenced chunks, headers, YAML.
    RMarkdown,
    /// Sweave (`.Rnw`, `.Snw`): `<<label>>=` ... `@` chunks.
    Sweave,
}

impl DocumentKind {
    /// Detect the document kind from a file extension. `None` for anything
    /// this library does not handle.
    pub fn from_path(path: &Path) -> Option<DocumentKind> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "r" => Some(DocumentKind::R),
            "rmd" | "qmd" => Some(DocumentKind::RMarkdown),
            "rnw" | "snw" => Some(DocumentKind::Sweave),
            _ => None,
        }
    }
}

/// Build a scope tree for `doc` using the provider matching `kind`.
pub fn build_scope_tree(doc: &Document, kind: DocumentKind) -> ScopeTree {
    match kind {
        DocumentKind::R => r_scopes::build(doc),
        DocumentKind::RMarkdown | DocumentKind::Sweave => literate::build(doc, kind),
    }
}
