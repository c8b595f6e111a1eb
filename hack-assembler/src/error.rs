//! Error types for the assembler.
//!
//! The teacher's original `code` module defaulted an unrecognized mnemonic
//! to an all-zero code rather than rejecting it, which would silently
//! assemble a broken `.hack` file. This crate rejects instead of guessing:
//! every failure mode below carries the source line it was found on so the
//! CLI can report it as a [`hack_support::Diagnostic`].

use hack_support::Diagnostic;
use thiserror::Error;

use crate::parser::ParserError;

#[derive(Debug, Error)]
pub enum AssemblerError {
    #[error("line {line}: invalid dest mnemonic '{mnemonic}'")]
    InvalidDest { line: usize, mnemonic: String },

    #[error("line {line}: invalid comp mnemonic '{mnemonic}'")]
    InvalidComp { line: usize, mnemonic: String },

    #[error("line {line}: invalid jump mnemonic '{mnemonic}'")]
    InvalidJump { line: usize, mnemonic: String },

    #[error("line {line}: constant {value} exceeds the 15-bit A-instruction range (0-32767)")]
    ConstantOverflow { line: usize, value: u32 },

    #[error("line {line}: malformed label '{symbol}'")]
    MalformedLabel { line: usize, symbol: String },

    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: ParserError,
    },
}

impl AssemblerError {
    /// The source line this error was found on, for uniform reporting.
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            Self::InvalidDest { line, .. }
            | Self::InvalidComp { line, .. }
            | Self::InvalidJump { line, .. }
            | Self::ConstantOverflow { line, .. }
            | Self::MalformedLabel { line, .. }
            | Self::Parse { line, .. } => *line,
        }
    }

    #[must_use]
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::new("hasm", self.line(), self.to_string())
    }
}
