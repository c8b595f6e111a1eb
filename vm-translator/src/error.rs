//! Error types for the VM-to-Hack translator.
//!
//! The teacher's original `code_writer` rejected nothing: an unknown segment
//! or arithmetic mnemonic was a `panic!`, and a malformed command just got a
//! `Warning:` printed to stderr while translation limped on. This crate
//! rejects instead, carrying the offending line back to the caller.

use hack_support::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("line {line}: unknown command '{text}'")]
    UnknownCommand { line: usize, text: String },

    #[error("line {line}: '{command}' takes {expected} argument(s), found {found}")]
    WrongArity {
        line: usize,
        command: String,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: unknown segment '{segment}'")]
    UnknownSegment { line: usize, segment: String },

    #[error("line {line}: segment index must be a non-negative integer, found '{text}'")]
    InvalidIndex { line: usize, text: String },

    #[error("line {line}: cannot pop into the constant segment")]
    PopToConstant { line: usize },

    #[error("line {line}: pointer index must be 0 or 1, found {index}")]
    InvalidPointerIndex { line: usize, index: i64 },

    #[error("line {line}: invalid label '{label}'")]
    InvalidLabel { line: usize, label: String },

    #[error("static variable referenced outside of any source file context")]
    MissingFileContext,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TranslationError {
    /// Source line the error was found on, when one is known.
    ///
    /// [`Self::Io`] and [`Self::MissingFileContext`] have no single source
    /// line to point at.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::UnknownCommand { line, .. }
            | Self::WrongArity { line, .. }
            | Self::UnknownSegment { line, .. }
            | Self::InvalidIndex { line, .. }
            | Self::PopToConstant { line }
            | Self::InvalidPointerIndex { line, .. }
            | Self::InvalidLabel { line, .. } => Some(*line),
            Self::MissingFileContext | Self::Io(_) => None,
        }
    }

    #[must_use]
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::new("vmt", self.line().unwrap_or(0), self.to_string())
    }
}
