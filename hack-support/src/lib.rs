//! Shared plumbing for the nand2tetris toolchain.
//!
//! Every stage (`jackc`, `vmt`, `hasm`) reads one textual format and writes
//! another. This crate holds the two concerns that are identical across all
//! three stages rather than specific to any one of them:
//!
//! - [`atomic`]: write-to-temp-file-then-rename output, so a failed stage
//!   never leaves a partial artifact behind.
//! - [`diagnostic`]: the `<module>: line <N>: <message>` error shape every
//!   stage's error type renders itself into before printing to stderr.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod atomic;
pub mod diagnostic;

pub use diagnostic::Diagnostic;
