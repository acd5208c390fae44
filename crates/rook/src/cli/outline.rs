// cli/outline.rs — `rook outline` subcommand
//
// Parses a single R / R Markdown / Sweave file and dumps its scope tree,
// chunk summary, and any persisted folds from the side-car.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde_json::json;

use crate::outline::DocumentOutline;
use crate::parse::DocumentKind;
use crate::scope::Scope;
use crate::sidecar::SidecarProperties;

/// Parsed arguments for the `outline` subcommand.
#[derive(Debug)]
pub struct OutlineArgs {
    pub path: PathBuf,
    pub json: bool,
}

/// Parse `outline` arguments from the remaining CLI args.
///
/// Expected usage: `rook outline <file> [--json]`
pub fn parse_args(args: &mut impl Iterator<Item = String>) -> Result<OutlineArgs, String> {
    let mut path: Option<PathBuf> = None;
    let mut json = false;

    for arg in args {
        match arg.as_str() {
            "--json" => json = true,
            other if other.starts_with('-') => {
                return Err(format!("Unknown flag: '{}'", other));
            }
            _ => {
                if path.is_some() {
                    return Err("Multiple files provided; expected exactly one".to_string());
                }
                path = Some(PathBuf::from(arg));
            }
        }
    }

    let path = path.ok_or_else(|| "Missing required <file> argument".to_string())?;
    Ok(OutlineArgs { path, json })
}

/// Run the outline command.
pub fn run(args: &OutlineArgs) -> anyhow::Result<()> {
    let kind = DocumentKind::from_path(&args.path).ok_or_else(|| {
        anyhow::anyhow!(
            "Unsupported file type: {} (expected .R, .Rmd, .qmd, .Rnw, or .Snw)",
            args.path.display()
        )
    })?;
    let text = fs::read_to_string(&args.path)
        .with_context(|| format!("reading {}", args.path.display()))?;

    let mut outline = DocumentOutline::new(&text, kind);
    let tree = outline.tree();

    if args.json {
        let value = scope_to_json(tree.root());
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}: {} scopes", args.path.display(), tree.len());
    for child in tree.root().children() {
        print_scope(child, 1);
    }

    let chunks: Vec<Scope> = tree.iter().filter(|s| s.is_chunk()).collect();
    if !chunks.is_empty() {
        println!();
        println!("chunks:");
        for chunk in &chunks {
            println!(
                "  {:<20} rows {}..{}",
                chunk.chunk_label().unwrap_or("(unlabeled)"),
                chunk.preamble().row,
                chunk.end().row
            );
        }
    }

    print_folds(&args.path);
    Ok(())
}

fn print_scope(scope: Scope<'_>, indent: usize) {
    let label = if scope.label().is_empty() {
        "(anonymous)"
    } else {
        scope.label()
    };
    println!(
        "{:indent$}{:<9} {:<24} rows {}..{}",
        "",
        scope.kind().as_str(),
        label,
        scope.preamble().row,
        scope.end().row,
        indent = indent * 2
    );
    for child in scope.children() {
        print_scope(child, indent + 1);
    }
}

fn scope_to_json(scope: Scope<'_>) -> serde_json::Value {
    let children: Vec<serde_json::Value> = scope.children().map(scope_to_json).collect();
    json!({
        "kind": scope.kind().as_str(),
        "label": scope.label(),
        "chunk_label": scope.chunk_label(),
        "preamble": { "row": scope.preamble().row, "column": scope.preamble().column },
        "end": { "row": scope.end().row, "column": scope.end().column },
        "children": children,
    })
}

fn print_folds(document_path: &Path) {
    let sidecar_path = SidecarProperties::path_for(document_path);
    let props = match SidecarProperties::load(&sidecar_path) {
        Ok(props) => props,
        Err(err) => {
            log::warn!("failed to load side-car: {err:#}");
            return;
        }
    };
    match props.folds() {
        Ok(folds) if !folds.is_empty() => {
            println!();
            println!("persisted folds:");
            for fold in &folds {
                println!(
                    "  ({}, {}) .. ({}, {})",
                    fold.start_row, fold.start_column, fold.end_row, fold.end_column
                );
            }
        }
        Ok(_) => {}
        Err(err) => println!("persisted folds: corrupt ({err})"),
    }
}
