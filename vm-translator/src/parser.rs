//! Parser for the VM language.
//!
//! Strips comments and blank lines up front, then yields validated
//! [`Command`]s one at a time through [`Parser::commands`]. A malformed
//! command (wrong arity, unknown segment, unknown opcode, negative index)
//! is a [`TranslationError`] carrying the offending source line, rather
//! than a panic or a skipped warning.

use crate::error::TranslationError;
use crate::segment::Segment;

/// A fully parsed, arity-checked VM command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Arithmetic(String),
    Push(Segment, u16),
    Pop(Segment, u16),
    Label(String),
    Goto(String),
    If(String),
    Function(String, u16),
    Call(String, u16),
    Return,
}

const ARITHMETIC_OPS: &[&str] = &["add", "sub", "neg", "and", "or", "not", "eq", "gt", "lt"];

fn is_valid_label(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let first_ok = first.is_ascii_alphabetic() || matches!(first, '.' | '$' | ':' | '_');
    first_ok && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '$' | ':' | '_'))
}

fn parse_index(line: usize, text: &str) -> Result<u16, TranslationError> {
    text.parse::<i64>()
        .ok()
        .filter(|&v| v >= 0)
        .and_then(|v| u16::try_from(v).ok())
        .ok_or_else(|| TranslationError::InvalidIndex {
            line,
            text: text.to_string(),
        })
}

/// One stripped-of-comments, non-blank source line and its 1-based number.
struct RawLine {
    text: String,
    line: usize,
}

pub struct Parser {
    raw: Vec<RawLine>,
}

impl Parser {
    /// Builds a parser over the full text of a `.vm` module.
    #[must_use]
    pub fn new(source: &str) -> Self {
        let raw = source
            .lines()
            .enumerate()
            .filter_map(|(index, line)| {
                let stripped = line.find("//").map_or(line, |pos| &line[..pos]);
                let trimmed = stripped.trim();
                (!trimmed.is_empty()).then(|| RawLine {
                    text: trimmed.to_string(),
                    line: index + 1,
                })
            })
            .collect();
        Self { raw }
    }

    /// Yields every command in source order, arity- and shape-checked.
    pub fn commands(&self) -> impl Iterator<Item = Result<(Command, usize), TranslationError>> + '_ {
        self.raw.iter().map(|raw| parse_line(raw))
    }
}

fn parse_line(raw: &RawLine) -> Result<(Command, usize), TranslationError> {
    let parts: Vec<&str> = raw.text.split_whitespace().collect();
    let op = parts[0];
    let line = raw.line;

    let arity_error = |expected: usize| TranslationError::WrongArity {
        line,
        command: op.to_string(),
        expected,
        found: parts.len() - 1,
    };
    let segment = |text: &str| {
        Segment::from_str(text).ok_or_else(|| TranslationError::UnknownSegment {
            line,
            segment: text.to_string(),
        })
    };
    let label_arg = |text: &str| {
        if is_valid_label(text) {
            Ok(text.to_string())
        } else {
            Err(TranslationError::InvalidLabel {
                line,
                label: text.to_string(),
            })
        }
    };

    let cmd = match op {
        "push" | "pop" => {
            if parts.len() != 3 {
                return Err(arity_error(2));
            }
            let seg = segment(parts[1])?;
            let index = parse_index(line, parts[2])?;
            if op == "push" {
                Command::Push(seg, index)
            } else {
                Command::Pop(seg, index)
            }
        }
        "label" | "goto" | "if-goto" => {
            if parts.len() != 2 {
                return Err(arity_error(1));
            }
            let label = label_arg(parts[1])?;
            match op {
                "label" => Command::Label(label),
                "goto" => Command::Goto(label),
                _ => Command::If(label),
            }
        }
        "function" | "call" => {
            if parts.len() != 3 {
                return Err(arity_error(2));
            }
            let name = label_arg(parts[1])?;
            let count = parse_index(line, parts[2])?;
            if op == "function" {
                Command::Function(name, count)
            } else {
                Command::Call(name, count)
            }
        }
        "return" => {
            if parts.len() != 1 {
                return Err(arity_error(0));
            }
            Command::Return
        }
        _ if ARITHMETIC_OPS.contains(&op) => {
            if parts.len() != 1 {
                return Err(arity_error(0));
            }
            Command::Arithmetic(op.to_string())
        }
        _ => {
            return Err(TranslationError::UnknownCommand {
                line,
                text: raw.text.clone(),
            })
        }
    };

    Ok((cmd, line))
}
