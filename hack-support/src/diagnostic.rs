//! The common `<module>: line <N>: <message>` error shape.

use std::fmt;

/// A single diagnostic, tagged with the module and source line it came from.
///
/// Every stage-specific error type (`LexError`, `AssemblerError`,
/// `TranslationError`, ...) can be converted into one of these for uniform
/// reporting at the CLI boundary, per spec: "every error carries module +
/// line number".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub module: String,
    pub line: usize,
    pub message: String,
}

impl Diagnostic {
    #[must_use]
    pub fn new(module: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: line {}: {}", self.module, self.line, self.message)
    }
}
