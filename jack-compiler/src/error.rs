//! Error types for the Jack compiler's three failure-producing stages.
//!
//! Mirrors the sibling stages' convention: every variant carries the
//! source line it was found on, and [`CompileError::to_diagnostic`] renders
//! the common `<module>: line <N>: <message>` shape via
//! [`hack_support::Diagnostic`].

use hack_support::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LexError {
    #[error("line {line}: invalid character '{ch}'")]
    InvalidCharacter { line: usize, ch: char },

    #[error("line {line}: unterminated string literal")]
    UnterminatedString { line: usize },

    #[error("line {line}: unterminated block comment")]
    UnterminatedComment { line: usize },
}

impl LexError {
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            Self::InvalidCharacter { line, .. }
            | Self::UnterminatedString { line }
            | Self::UnterminatedComment { line } => *line,
        }
    }
}

#[derive(Debug, Error)]
#[error("line {line}: expected {expected}, found {found}")]
pub struct ParseError {
    pub line: usize,
    pub expected: String,
    pub found: String,
}

#[derive(Debug, Error)]
pub enum SemanticError {
    #[error("line {line}: undefined variable '{name}'")]
    UndefinedVariable { line: usize, name: String },

    #[error("line {line}: '{name}' is already defined")]
    Redefined { line: usize, name: String },

    #[error("line {line}: undefined type '{name}'")]
    UndefinedType { line: usize, name: String },

    #[error("line {line}: '{name}' takes {expected} argument(s), found {found}")]
    WrongArity {
        line: usize,
        name: String,
        expected: u8,
        found: u8,
    },

    #[error("line {line}: {message}")]
    WrongCallKind { line: usize, message: String },

    #[error("line {line}: class '{name}' does not conform to the standard library signature for '{method}'")]
    NonConformingOs {
        line: usize,
        name: String,
        method: String,
    },

    #[error("line {line}: constructor '{name}' must return the enclosing class with 'return this'")]
    InvalidCtorReturnType { line: usize, name: String },

    #[error("line {line}: {message}")]
    ReturnMismatch { line: usize, message: String },

    #[error("line {line}: subroutine '{name}' must end with a return statement")]
    MissingTrailingReturn { line: usize, name: String },

    #[error("line {line}: '{name}' cannot be subscripted, it is not an array")]
    SubscriptOnNonArray { line: usize, name: String },
}

impl SemanticError {
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            Self::UndefinedVariable { line, .. }
            | Self::Redefined { line, .. }
            | Self::UndefinedType { line, .. }
            | Self::WrongArity { line, .. }
            | Self::WrongCallKind { line, .. }
            | Self::NonConformingOs { line, .. }
            | Self::InvalidCtorReturnType { line, .. }
            | Self::ReturnMismatch { line, .. }
            | Self::MissingTrailingReturn { line, .. }
            | Self::SubscriptOnNonArray { line, .. } => *line,
        }
    }
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Semantic(#[from] SemanticError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CompileError {
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            Self::Lex(e) => e.line(),
            Self::Parse(e) => e.line,
            Self::Semantic(e) => e.line(),
            Self::Io(_) => 0,
        }
    }

    #[must_use]
    pub fn to_diagnostic(&self, module: &str) -> Diagnostic {
        Diagnostic::new(module, self.line(), self.to_string())
    }
}
