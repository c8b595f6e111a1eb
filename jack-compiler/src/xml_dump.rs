//! Debug pretty-printer: renders a token stream as the `<tokens>` XML the
//! original `JackAnalyzer`/`_lexer.py::test_xml` tool emits.
//!
//! Not part of the compilation pipeline (spec.md §1 scopes the XML
//! analyzer's *detailed* behavior out), but the original's debug tool is
//! cheap to carry and useful when eyeballing what the lexer produced, so
//! it rides along as a plain function rather than a CLI flag.

use crate::lexer::{TokKind, Token};

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn tag(kind: &TokKind) -> &'static str {
    match kind {
        TokKind::Keyword(_) => "keyword",
        TokKind::Symbol(_) => "symbol",
        TokKind::Identifier => "identifier",
        TokKind::IntConst => "integerConstant",
        TokKind::StringConst => "stringConstant",
        TokKind::Eof => "EOF",
    }
}

/// Renders `tokens` as `<tokens>...</tokens>` XML, one `<tag> text </tag>`
/// line per token, stopping at (and not including) the trailing `EOF`
/// marker(s).
#[must_use]
pub fn dump(tokens: &[Token]) -> String {
    let mut out = String::from("<tokens>\n");
    for token in tokens {
        if token.kind == TokKind::Eof {
            break;
        }
        out.push_str(&format!("<{0}> {1} </{0}>\n", tag(&token.kind), escape(&token.text)));
    }
    out.push_str("</tokens>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    #[test]
    fn dumps_class_header_as_tagged_lines() {
        let tokens = lex("class Main {\n}\n").unwrap();
        let xml = dump(&tokens);
        assert!(xml.starts_with("<tokens>\n"));
        assert!(xml.contains("<keyword> class </keyword>\n"));
        assert!(xml.contains("<identifier> Main </identifier>\n"));
        assert!(xml.contains("<symbol> { </symbol>\n"));
        assert!(xml.ends_with("</tokens>\n"));
    }

    #[test]
    fn escapes_xml_metacharacters_in_symbols() {
        let tokens = lex("a < b & c > d").unwrap();
        let xml = dump(&tokens);
        assert!(xml.contains("<symbol> &lt; </symbol>\n"));
        assert!(xml.contains("<symbol> &amp; </symbol>\n"));
        assert!(xml.contains("<symbol> &gt; </symbol>\n"));
    }

    #[test]
    fn stops_before_trailing_eof_markers() {
        let tokens = lex("let x = 1;\n").unwrap();
        let xml = dump(&tokens);
        assert!(!xml.contains("EOF"));
    }
}
