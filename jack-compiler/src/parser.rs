//! Predictive recursive-descent parser for Jack.
//!
//! One token of lookahead, ported from the original's
//! `Parser.expect`/`Parser.maybe` shape: `current()` peeks the token at
//! the cursor, `advance()` consumes it, `expect(kind)` consumes-or-errors,
//! `maybe(kind)` consumes-if-matching and reports whether it did. The
//! token stream is fully materialized (see [`crate::lexer`]), so term
//! dispatch peeks one token past `current()` to disambiguate a bare
//! variable from a subscript or call — still only ever reading forward,
//! never backtracking.

use crate::ast::{
    BinOp, Call, Class, ClassVar, ConstLit, Decl, Expr, IfStmt, LValue, LetStmt, Name, Param,
    Primitive, ReturnStmt, ReturnType, Statement, Subroutine, SubroutineKind, Term, TermInner,
    TypeTag, UnaryOp, VarScope, WhileStmt,
};
use crate::error::ParseError;
use crate::lexer::{Keyword, TokKind, Token};

pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    #[must_use]
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_at(&self, offset: usize) -> &Token {
        &self.tokens[(self.pos + offset).min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn describe(tok: &Token) -> String {
        match &tok.kind {
            TokKind::Eof => "end of file".to_string(),
            _ => format!("'{}'", tok.text),
        }
    }

    fn error(&self, expected: impl Into<String>) -> ParseError {
        ParseError {
            line: self.current().line,
            expected: expected.into(),
            found: Self::describe(self.current()),
        }
    }

    fn expect_symbol(&mut self, ch: char) -> Result<(), ParseError> {
        if self.current().is_symbol(ch) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!("'{ch}'")))
        }
    }

    fn expect_keyword(&mut self, kw: Keyword) -> Result<(), ParseError> {
        if self.current().is_keyword(kw) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!("'{}'", keyword_text(kw))))
        }
    }

    fn maybe_symbol(&mut self, ch: char) -> bool {
        if self.current().is_symbol(ch) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn maybe_keyword(&mut self, kw: Keyword) -> bool {
        if self.current().is_keyword(kw) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_identifier(&mut self) -> Result<Name, ParseError> {
        if self.current().kind == TokKind::Identifier {
            let tok = self.advance();
            Ok(Name {
                text: tok.text,
                line: tok.line,
            })
        } else {
            Err(self.error("an identifier"))
        }
    }

    /// Parses a whole `.jack` source file into one [`Class`].
    ///
    /// # Errors
    /// Returns [`ParseError`] at the first malformed production.
    pub fn parse_class(&mut self, module: &str) -> Result<Class, ParseError> {
        self.expect_keyword(Keyword::Class)?;
        let name = self.expect_identifier()?;
        self.expect_symbol('{')?;

        let mut class_vars = Vec::new();
        while self.current().is_keyword(Keyword::Static) || self.current().is_keyword(Keyword::Field) {
            class_vars.extend(self.parse_class_var()?);
        }

        let mut subroutines = Vec::new();
        while self.current().is_keyword(Keyword::Constructor)
            || self.current().is_keyword(Keyword::Function)
            || self.current().is_keyword(Keyword::Method)
        {
            subroutines.push(self.parse_subroutine()?);
        }

        self.expect_symbol('}')?;
        Ok(Class {
            module: module.to_string(),
            name,
            class_vars,
            subroutines,
        })
    }

    fn parse_class_var(&mut self) -> Result<Vec<ClassVar>, ParseError> {
        let scope = if self.maybe_keyword(Keyword::Static) {
            VarScope::Static
        } else {
            self.expect_keyword(Keyword::Field)?;
            VarScope::Field
        };
        let decl = self.parse_decl()?;
        self.expect_symbol(';')?;
        Ok(decl
            .names
            .iter()
            .map(|n| ClassVar {
                scope,
                decl: Decl {
                    ty: decl.ty.clone(),
                    names: vec![n.clone()],
                    line: decl.line,
                },
            })
            .collect())
    }

    /// A `type name (',' name)*` group sharing one type, as used by
    /// `classVarDec` and `varDec`.
    fn parse_decl(&mut self) -> Result<Decl, ParseError> {
        let line = self.current().line;
        let ty = self.parse_type()?;
        let mut names = vec![self.expect_identifier()?];
        while self.maybe_symbol(',') {
            names.push(self.expect_identifier()?);
        }
        Ok(Decl { ty, names, line })
    }

    fn parse_type(&mut self) -> Result<TypeTag, ParseError> {
        let tok = self.current().clone();
        match &tok.kind {
            TokKind::Keyword(Keyword::Int) => {
                self.advance();
                Ok(TypeTag::Primitive(Primitive::Int))
            }
            TokKind::Keyword(Keyword::Char) => {
                self.advance();
                Ok(TypeTag::Primitive(Primitive::Char))
            }
            TokKind::Keyword(Keyword::Boolean) => {
                self.advance();
                Ok(TypeTag::Primitive(Primitive::Boolean))
            }
            TokKind::Identifier => {
                self.advance();
                Ok(TypeTag::Class(Name {
                    text: tok.text,
                    line: tok.line,
                }))
            }
            _ => Err(self.error("a type")),
        }
    }

    fn parse_subroutine(&mut self) -> Result<Subroutine, ParseError> {
        let line = self.current().line;
        let kind = if self.maybe_keyword(Keyword::Constructor) {
            SubroutineKind::Constructor
        } else if self.maybe_keyword(Keyword::Function) {
            SubroutineKind::Function
        } else {
            self.expect_keyword(Keyword::Method)?;
            SubroutineKind::Method
        };

        let return_type = if self.maybe_keyword(Keyword::Void) {
            ReturnType::Void
        } else {
            ReturnType::Value(self.parse_type()?)
        };

        let name = self.expect_identifier()?;
        self.expect_symbol('(')?;
        let params = self.parse_param_list()?;
        self.expect_symbol(')')?;

        self.expect_symbol('{')?;
        let mut locals = Vec::new();
        while self.current().is_keyword(Keyword::Var) {
            self.advance();
            locals.push(self.parse_decl()?);
            self.expect_symbol(';')?;
        }
        let body = self.parse_statements()?;
        self.expect_symbol('}')?;

        Ok(Subroutine {
            kind,
            return_type,
            name,
            params,
            locals,
            body,
            line,
        })
    }

    fn parse_param_list(&mut self) -> Result<Vec<Param>, ParseError> {
        let mut params = Vec::new();
        if self.current().is_symbol(')') {
            return Ok(params);
        }
        loop {
            let ty = self.parse_type()?;
            let name = self.expect_identifier()?;
            params.push(Param { ty, name });
            if !self.maybe_symbol(',') {
                break;
            }
        }
        Ok(params)
    }

    fn parse_statements(&mut self) -> Result<Vec<Statement>, ParseError> {
        let mut stmts = Vec::new();
        loop {
            let stmt = match &self.current().kind {
                TokKind::Keyword(Keyword::Let) => Statement::Let(self.parse_let()?),
                TokKind::Keyword(Keyword::If) => Statement::If(self.parse_if()?),
                TokKind::Keyword(Keyword::While) => Statement::While(self.parse_while()?),
                TokKind::Keyword(Keyword::Do) => Statement::Do(self.parse_do()?),
                TokKind::Keyword(Keyword::Return) => Statement::Return(self.parse_return()?),
                _ => break,
            };
            stmts.push(stmt);
        }
        Ok(stmts)
    }

    fn parse_let(&mut self) -> Result<LetStmt, ParseError> {
        let line = self.current().line;
        self.expect_keyword(Keyword::Let)?;
        let name = self.expect_identifier()?;
        let target = if self.maybe_symbol('[') {
            let idx = self.parse_expr()?;
            self.expect_symbol(']')?;
            LValue::Subscript(name, Box::new(idx))
        } else {
            LValue::Var(name)
        };
        self.expect_symbol('=')?;
        let value = self.parse_expr()?;
        self.expect_symbol(';')?;
        Ok(LetStmt { target, value, line })
    }

    fn parse_if(&mut self) -> Result<IfStmt, ParseError> {
        let line = self.current().line;
        self.expect_keyword(Keyword::If)?;
        self.expect_symbol('(')?;
        let cond = self.parse_expr()?;
        self.expect_symbol(')')?;
        self.expect_symbol('{')?;
        let then_branch = self.parse_statements()?;
        self.expect_symbol('}')?;
        let else_branch = if self.maybe_keyword(Keyword::Else) {
            self.expect_symbol('{')?;
            let stmts = self.parse_statements()?;
            self.expect_symbol('}')?;
            Some(stmts)
        } else {
            None
        };
        Ok(IfStmt {
            cond,
            then_branch,
            else_branch,
            line,
        })
    }

    fn parse_while(&mut self) -> Result<WhileStmt, ParseError> {
        let line = self.current().line;
        self.expect_keyword(Keyword::While)?;
        self.expect_symbol('(')?;
        let cond = self.parse_expr()?;
        self.expect_symbol(')')?;
        self.expect_symbol('{')?;
        let body = self.parse_statements()?;
        self.expect_symbol('}')?;
        Ok(WhileStmt { cond, body, line })
    }

    fn parse_do(&mut self) -> Result<crate::ast::DoStmt, ParseError> {
        let line = self.current().line;
        self.expect_keyword(Keyword::Do)?;
        let call = self.parse_call()?;
        self.expect_symbol(';')?;
        Ok(crate::ast::DoStmt { call, line })
    }

    fn parse_return(&mut self) -> Result<ReturnStmt, ParseError> {
        let line = self.current().line;
        self.expect_keyword(Keyword::Return)?;
        let value = if self.current().is_symbol(';') {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect_symbol(';')?;
        Ok(ReturnStmt { value, line })
    }

    /// `subroutineName '(' ... ')'` or `(className|varName) '.' subroutineName '(' ... ')'`.
    fn parse_call(&mut self) -> Result<Call, ParseError> {
        let line = self.current().line;
        let first = self.expect_identifier()?;
        let mut names = vec![first];
        if self.maybe_symbol('.') {
            names.push(self.expect_identifier()?);
        }
        self.expect_symbol('(')?;
        let params = self.parse_expr_list()?;
        self.expect_symbol(')')?;
        Ok(Call { names, params, line })
    }

    fn parse_expr_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut exprs = Vec::new();
        if self.current().is_symbol(')') {
            return Ok(exprs);
        }
        loop {
            exprs.push(self.parse_expr()?);
            if !self.maybe_symbol(',') {
                break;
            }
        }
        Ok(exprs)
    }

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let mut terms = vec![self.parse_term()?];
        let mut ops = Vec::new();
        while let Some(op) = self.current_binop() {
            self.advance();
            ops.push(op);
            terms.push(self.parse_term()?);
        }
        Ok(Expr { terms, ops })
    }

    fn current_binop(&self) -> Option<BinOp> {
        match &self.current().kind {
            TokKind::Symbol('+') => Some(BinOp::Add),
            TokKind::Symbol('-') => Some(BinOp::Sub),
            TokKind::Symbol('*') => Some(BinOp::Mul),
            TokKind::Symbol('/') => Some(BinOp::Div),
            TokKind::Symbol('&') => Some(BinOp::And),
            TokKind::Symbol('|') => Some(BinOp::Or),
            TokKind::Symbol('<') => Some(BinOp::Lt),
            TokKind::Symbol('>') => Some(BinOp::Gt),
            TokKind::Symbol('=') => Some(BinOp::Eq),
            _ => None,
        }
    }

    fn parse_term(&mut self) -> Result<Term, ParseError> {
        let line = self.current().line;
        let unary = match &self.current().kind {
            TokKind::Symbol('-') => {
                self.advance();
                Some(UnaryOp::Neg)
            }
            TokKind::Symbol('~') => {
                self.advance();
                Some(UnaryOp::Not)
            }
            _ => None,
        };

        let inner = match self.current().kind.clone() {
            TokKind::IntConst => {
                let tok = self.advance();
                let value: u16 = tok
                    .text
                    .parse()
                    .map_err(|_| ParseError {
                        line: tok.line,
                        expected: "an integer constant in range".to_string(),
                        found: format!("'{}'", tok.text),
                    })?;
                TermInner::Const(ConstLit::Int(value))
            }
            TokKind::StringConst => {
                let tok = self.advance();
                TermInner::Const(ConstLit::Str(tok.text))
            }
            TokKind::Keyword(Keyword::True) => {
                self.advance();
                TermInner::Const(ConstLit::True)
            }
            TokKind::Keyword(Keyword::False) => {
                self.advance();
                TermInner::Const(ConstLit::False)
            }
            TokKind::Keyword(Keyword::Null) => {
                self.advance();
                TermInner::Const(ConstLit::Null)
            }
            TokKind::Keyword(Keyword::This) => {
                self.advance();
                TermInner::Const(ConstLit::This)
            }
            TokKind::Symbol('(') => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect_symbol(')')?;
                TermInner::Grouped(Box::new(expr))
            }
            TokKind::Identifier => {
                let next = self.peek_at(1).kind.clone();
                if next == TokKind::Symbol('[') {
                    let name = self.expect_identifier()?;
                    self.expect_symbol('[')?;
                    let idx = self.parse_expr()?;
                    self.expect_symbol(']')?;
                    TermInner::Subscript(name, Box::new(idx))
                } else if next == TokKind::Symbol('(') || next == TokKind::Symbol('.') {
                    TermInner::Call(self.parse_call()?)
                } else {
                    TermInner::Var(self.expect_identifier()?)
                }
            }
            _ => return Err(self.error("a term")),
        };

        Ok(Term { unary, inner, line })
    }
}

fn keyword_text(kw: Keyword) -> &'static str {
    match kw {
        Keyword::Class => "class",
        Keyword::Constructor => "constructor",
        Keyword::Function => "function",
        Keyword::Method => "method",
        Keyword::Field => "field",
        Keyword::Static => "static",
        Keyword::Var => "var",
        Keyword::Int => "int",
        Keyword::Char => "char",
        Keyword::Boolean => "boolean",
        Keyword::Void => "void",
        Keyword::True => "true",
        Keyword::False => "false",
        Keyword::Null => "null",
        Keyword::This => "this",
        Keyword::Let => "let",
        Keyword::Do => "do",
        Keyword::If => "if",
        Keyword::Else => "else",
        Keyword::While => "while",
        Keyword::Return => "return",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    fn parse(source: &str) -> Result<Class, ParseError> {
        let tokens = lex(source).unwrap();
        Parser::new(&tokens).parse_class("Test")
    }

    #[test]
    fn parses_empty_class() {
        let class = parse("class Main {\n}\n").unwrap();
        assert_eq!(class.name.text, "Main");
        assert!(class.subroutines.is_empty());
    }

    #[test]
    fn parses_class_vars_with_shared_type() {
        let class = parse("class Point {\nfield int x, y;\nstatic boolean flag;\n}\n").unwrap();
        assert_eq!(class.class_vars.len(), 3);
        assert_eq!(class.class_vars[0].decl.names[0].text, "x");
        assert_eq!(class.class_vars[2].scope, VarScope::Static);
    }

    #[test]
    fn parses_constructor_with_params_and_return_this() {
        let class = parse(
            "class Point {\n\
             field int x, y;\n\
             constructor Point new(int ax, int ay) {\n\
             let x = ax;\n\
             let y = ay;\n\
             return this;\n\
             }\n\
             }\n",
        )
        .unwrap();
        let sub = &class.subroutines[0];
        assert_eq!(sub.kind, SubroutineKind::Constructor);
        assert_eq!(sub.params.len(), 2);
        assert_eq!(sub.body.len(), 3);
        assert!(matches!(sub.body[2], Statement::Return(_)));
    }

    #[test]
    fn expr_has_no_precedence_left_to_right_terms() {
        let class = parse(
            "class Main {\nfunction void main() {\nvar int x;\nlet x = 1 + 2 * 3;\nreturn;\n}\n}\n",
        )
        .unwrap();
        let Statement::Let(let_stmt) = &class.subroutines[0].body[0] else {
            panic!("expected let");
        };
        assert_eq!(let_stmt.value.terms.len(), 3);
        assert_eq!(let_stmt.value.ops, vec![BinOp::Add, BinOp::Mul]);
    }

    #[test]
    fn disambiguates_var_subscript_and_call() {
        let class = parse(
            "class Main {\n\
             function void main() {\n\
             var Array a;\n\
             do Output.printInt(a[0]);\n\
             do foo(a);\n\
             return;\n\
             }\n\
             }\n",
        )
        .unwrap();
        let body = &class.subroutines[0].body;
        let Statement::Do(first) = &body[0] else {
            panic!();
        };
        assert_eq!(first.call.names.len(), 2);
        let TermInner::Subscript(_, _) = &first.call.params[0].terms[0].inner else {
            panic!("expected subscript arg");
        };
        let Statement::Do(second) = &body[1] else {
            panic!();
        };
        assert_eq!(second.call.names.len(), 1);
    }

    #[test]
    fn if_else_parses_both_branches() {
        let class = parse(
            "class Main {\n\
             function void main() {\n\
             if (true) {\nlet x = 1;\n} else {\nlet x = 2;\n}\n\
             return;\n\
             }\n\
             }\n",
        )
        .unwrap();
        let Statement::If(if_stmt) = &class.subroutines[0].body[0] else {
            panic!();
        };
        assert!(if_stmt.else_branch.is_some());
    }

    #[test]
    fn reports_line_and_expectation_on_malformed_input() {
        let tokens = lex("class Main {\nfunction void main( {\n}\n}\n").unwrap();
        let err = Parser::new(&tokens).parse_class("Test").unwrap_err();
        assert_eq!(err.line, 2);
    }
}
