//! Jack tokenizer.
//!
//! Ported from the original's `LineTokenizer`/`lexer()` pair, folded into a
//! single-pass char scanner since this crate materializes the whole token
//! stream up front rather than tokenizing line-by-line. Reserved words are
//! looked up in a PHF map, the same technique the sibling assembler uses
//! for its `DEST_MAP`/`COMP_MAP`/`JUMP_MAP`. Emits a trailing `EOF` token
//! twice, matching the original, so the parser never needs to special-case
//! one-token lookahead past the end of input.

use phf::phf_map;

use crate::error::LexError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Class,
    Constructor,
    Function,
    Method,
    Field,
    Static,
    Var,
    Int,
    Char,
    Boolean,
    Void,
    True,
    False,
    Null,
    This,
    Let,
    Do,
    If,
    Else,
    While,
    Return,
}

static KEYWORDS: phf::Map<&'static str, Keyword> = phf_map! {
    "class" => Keyword::Class,
    "constructor" => Keyword::Constructor,
    "function" => Keyword::Function,
    "method" => Keyword::Method,
    "field" => Keyword::Field,
    "static" => Keyword::Static,
    "var" => Keyword::Var,
    "int" => Keyword::Int,
    "char" => Keyword::Char,
    "boolean" => Keyword::Boolean,
    "void" => Keyword::Void,
    "true" => Keyword::True,
    "false" => Keyword::False,
    "null" => Keyword::Null,
    "this" => Keyword::This,
    "let" => Keyword::Let,
    "do" => Keyword::Do,
    "if" => Keyword::If,
    "else" => Keyword::Else,
    "while" => Keyword::While,
    "return" => Keyword::Return,
};

const SYMBOLS: &str = "{}()[].,;+-*/&|<>=~";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokKind {
    Keyword(Keyword),
    Identifier,
    IntConst,
    StringConst,
    Symbol(char),
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokKind,
    pub text: String,
    pub line: usize,
}

impl Token {
    #[must_use]
    pub fn is_symbol(&self, ch: char) -> bool {
        self.kind == TokKind::Symbol(ch)
    }

    #[must_use]
    pub fn is_keyword(&self, kw: Keyword) -> bool {
        self.kind == TokKind::Keyword(kw)
    }
}

/// Tokenizes a full Jack source file.
///
/// # Errors
/// Returns [`LexError`] on an invalid character, an unterminated string
/// literal (no closing `"` before end of line), or an unterminated block
/// comment (no closing `*/` before end of input).
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut line = 1usize;
    let mut i = 0usize;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\n' => {
                line += 1;
                i += 1;
            }
            c if c.is_whitespace() => i += 1,
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                let start_line = line;
                i += 2;
                loop {
                    if i + 1 < chars.len() && chars[i] == '*' && chars[i + 1] == '/' {
                        i += 2;
                        break;
                    }
                    if i >= chars.len() {
                        return Err(LexError::UnterminatedComment { line: start_line });
                    }
                    if chars[i] == '\n' {
                        line += 1;
                    }
                    i += 1;
                }
            }
            '"' => {
                let start_line = line;
                i += 1;
                let start = i;
                while i < chars.len() && chars[i] != '"' && chars[i] != '\n' {
                    i += 1;
                }
                if i >= chars.len() || chars[i] == '\n' {
                    return Err(LexError::UnterminatedString { line: start_line });
                }
                let text: String = chars[start..i].iter().collect();
                i += 1;
                tokens.push(Token {
                    kind: TokKind::StringConst,
                    text,
                    line: start_line,
                });
            }
            c if c.is_ascii_alphabetic() => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let kind = KEYWORDS
                    .get(text.as_str())
                    .map_or(TokKind::Identifier, |kw| TokKind::Keyword(*kw));
                tokens.push(Token { kind, text, line });
            }
            c if c.is_ascii_digit() => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                tokens.push(Token {
                    kind: TokKind::IntConst,
                    text,
                    line,
                });
            }
            c if SYMBOLS.contains(c) => {
                tokens.push(Token {
                    kind: TokKind::Symbol(c),
                    text: c.to_string(),
                    line,
                });
                i += 1;
            }
            other => return Err(LexError::InvalidCharacter { line, ch: other }),
        }
    }

    tokens.push(Token {
        kind: TokKind::Eof,
        text: String::new(),
        line,
    });
    tokens.push(Token {
        kind: TokKind::Eof,
        text: String::new(),
        line,
    });
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn tokenizes_class_header() {
        let toks = lex("class Main {\n}\n").unwrap();
        assert_eq!(toks[0].kind, TokKind::Keyword(Keyword::Class));
        assert_eq!(toks[1].kind, TokKind::Identifier);
        assert_eq!(toks[1].text, "Main");
        assert_eq!(toks[2].kind, TokKind::Symbol('{'));
        assert_eq!(toks[3].kind, TokKind::Symbol('}'));
        assert_eq!(toks[4].kind, TokKind::Eof);
        assert_eq!(toks[5].kind, TokKind::Eof);
    }

    #[test]
    fn strips_line_and_block_comments() {
        let toks = lex("// a comment\n/* multi\nline */let x = 1;").unwrap();
        assert_eq!(toks[0].kind, TokKind::Keyword(Keyword::Let));
        assert_eq!(toks[0].line, 3);
    }

    #[test]
    fn string_literal_has_no_escape_handling() {
        let toks = lex("\"hi there\"").unwrap();
        assert_eq!(toks[0].kind, TokKind::StringConst);
        assert_eq!(toks[0].text, "hi there");
    }

    #[test]
    fn unterminated_string_is_fatal() {
        let err = lex("\"oops\nlet").unwrap_err();
        assert!(matches!(err, LexError::UnterminatedString { line: 1 }));
    }

    #[test]
    fn unterminated_block_comment_is_fatal() {
        let err = lex("/* never closes").unwrap_err();
        assert!(matches!(err, LexError::UnterminatedComment { line: 1 }));
    }

    #[test]
    fn invalid_character_is_fatal() {
        let err = lex("let x = 1 # 2;").unwrap_err();
        assert!(matches!(err, LexError::InvalidCharacter { ch: '#', .. }));
    }

    #[test]
    fn integer_and_identifier_are_distinguished() {
        let toks = lex("123 abc").unwrap();
        assert_eq!(toks[0].kind, TokKind::IntConst);
        assert_eq!(toks[1].kind, TokKind::Identifier);
    }

    #[test]
    fn line_numbers_are_one_based_and_accurate() {
        let toks = lex("let x = 1;\nlet y = 2;\n").unwrap();
        let lets: Vec<usize> = toks
            .iter()
            .filter(|t| t.is_keyword(Keyword::Let))
            .map(|t| t.line)
            .collect();
        assert_eq!(lets, vec![1, 2]);
    }

    proptest! {
        #[test]
        fn any_jack_int_literal_round_trips_through_lexing(n in 0u16..=32767) {
            let source = n.to_string();
            let toks = lex(&source).unwrap();
            prop_assert_eq!(toks[0].kind.clone(), TokKind::IntConst);
            prop_assert_eq!(&toks[0].text, &source);
        }

        #[test]
        fn any_ascii_identifier_lexes_as_one_token(
            name in "[A-Za-z][A-Za-z0-9_]{0,15}"
        ) {
            let toks = lex(&name).unwrap();
            prop_assert_eq!(toks.len(), 3, "identifier/keyword token + double EOF");
            prop_assert_eq!(&toks[0].text, &name);
        }
    }
}
