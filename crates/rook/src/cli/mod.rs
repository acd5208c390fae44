//! Diagnostic subcommands for the `rook` binary.

pub mod outline;
