// lib.rs — Scope-tree queries and chunk navigation for literate R documents.
//
// The library exposes:
//   - position/scope primitives and the arena scope tree (`position`, `scope`)
//   - flattened snapshots and navigation (`scope_list`, `nav`)
//   - Sweave chunk-include expansion (`sweave`)
//   - fold persistence (`fold`, `sidecar`)
//   - concrete providers for R / R Markdown / Sweave sources (`parse`)
//   - the per-document session object (`outline`)
//
// The `rook` binary entry point lives in main.rs.

pub mod cli;
pub mod columns;
pub mod document;
pub mod fold;
pub mod nav;
pub mod outline;
pub mod parse;
pub mod position;
pub mod scope;
pub mod scope_list;
pub mod sidecar;
pub mod sweave;

#[cfg(test)]
mod property_tests;
