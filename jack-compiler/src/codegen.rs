//! Code generator: Jack AST to VM command text (nand2tetris project 11).
//!
//! Ported from `Generator.py::Generator`, interleaved with the semantic
//! checks `Generator.generate_sub`/`generate_stmt` perform inline (this
//! workspace keeps those in [`crate::symtab`] instead, per spec.md §4.3
//! treating semantic analysis as its own component, but the order of
//! operations — check, then emit — is unchanged). Three corrections over
//! the original, all required by spec.md §4.4 and called out there
//! explicitly rather than reproduced:
//!
//! - call parameters are pushed onto the stack before the `call`
//!   instruction; the original's `generate_texpr` for `Call` computes
//!   `nargs` from `len(expr.params)` but never emits the params themselves.
//! - `true` lowers to `push constant 0; not` (all-ones), not the
//!   original's `push const 1`.
//! - subscript-assignment emits RHS, then base, then index, then
//!   `add; pop pointer 1; pop that 0` — RHS strictly before the address is
//!   computed, so a nested subscript on the RHS can't clobber `pointer 1`
//!   before it's consumed.

use std::io::{self, Write};

use crate::ast::{
    BinOp, Call, Class, ConstLit, DoStmt, Expr, IfStmt, LValue, LetStmt, ReturnStmt, ReturnType,
    Statement, Subroutine, SubroutineKind, Term, TermInner, TypeTag, UnaryOp, WhileStmt,
};
use crate::error::{CompileError, SemanticError};
use crate::symtab::{CallTarget, SymTable};

pub struct CodeGenerator<W: Write> {
    out: W,
    class_name: String,
    sub_name: String,
    current_kind: SubroutineKind,
    is_void: bool,
    label_count: u32,
}

impl<W: Write> CodeGenerator<W> {
    #[must_use]
    pub fn new(out: W) -> Self {
        Self {
            out,
            class_name: String::new(),
            sub_name: String::new(),
            current_kind: SubroutineKind::Function,
            is_void: true,
            label_count: 0,
        }
    }

    fn write(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.out, "{line}")
    }

    fn next_label(&mut self) -> u32 {
        self.label_count += 1;
        self.label_count
    }

    /// Flushes and returns the underlying writer.
    ///
    /// # Errors
    /// Propagates any I/O failure flushing the sink.
    pub fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }

    /// Sweep 2 + emission for one class: populates class scope, then
    /// generates every subroutine in declaration order.
    ///
    /// # Errors
    /// Any [`SemanticError`] a subroutine body triggers; propagates I/O
    /// failures writing to the sink.
    pub fn generate_class(&mut self, class: &Class, st: &mut SymTable) -> Result<(), CompileError> {
        st.start_class(class)?;
        self.class_name = class.name.text.clone();
        for sub in &class.subroutines {
            self.generate_subroutine(class, sub, st)?;
        }
        Ok(())
    }

    fn generate_subroutine(
        &mut self,
        class: &Class,
        sub: &Subroutine,
        st: &mut SymTable,
    ) -> Result<(), CompileError> {
        st.start_subroutine(sub)?;
        self.sub_name = sub.name.text.clone();
        self.current_kind = sub.kind;
        self.is_void = matches!(sub.return_type, ReturnType::Void);
        self.label_count = 0;

        if sub.kind == SubroutineKind::Constructor {
            let returns_self = matches!(
                &sub.return_type,
                ReturnType::Value(TypeTag::Class(name)) if name.text == class.name.text
            );
            if !returns_self {
                return Err(SemanticError::InvalidCtorReturnType {
                    line: sub.line,
                    name: sub.name.text.clone(),
                }
                .into());
            }
        }

        if !matches!(sub.body.last(), Some(Statement::Return(_))) {
            return Err(SemanticError::MissingTrailingReturn {
                line: sub.line,
                name: sub.name.text.clone(),
            }
            .into());
        }

        let n_locals: usize = sub.locals.iter().map(|d| d.names.len()).sum();
        self.write(&format!("function {}.{} {n_locals}", class.name.text, sub.name.text))?;

        match sub.kind {
            SubroutineKind::Method => {
                self.write("push argument 0")?;
                self.write("pop pointer 0")?;
            }
            SubroutineKind::Constructor => {
                self.write(&format!("push constant {}", st.field_count()))?;
                self.write("call Memory.alloc 1")?;
                self.write("pop pointer 0")?;
            }
            SubroutineKind::Function => {}
        }

        for stmt in &sub.body {
            self.generate_statement(stmt, st)?;
        }
        Ok(())
    }

    fn generate_statement(&mut self, stmt: &Statement, st: &SymTable) -> Result<(), CompileError> {
        match stmt {
            Statement::Let(s) => self.generate_let(s, st),
            Statement::Do(s) => self.generate_do(s, st),
            Statement::If(s) => self.generate_if(s, st),
            Statement::While(s) => self.generate_while(s, st),
            Statement::Return(s) => self.generate_return(s, st),
        }
    }

    fn generate_let(&mut self, stmt: &LetStmt, st: &SymTable) -> Result<(), CompileError> {
        match &stmt.target {
            LValue::Var(name) => {
                let var = st.lookup_var(&name.text).ok_or_else(|| SemanticError::UndefinedVariable {
                    line: stmt.line,
                    name: name.text.clone(),
                })?;
                self.generate_expr(&stmt.value, st)?;
                self.write(&format!("pop {} {}", var.segment.as_vm_str(), var.index))?;
            }
            LValue::Subscript(name, idx) => {
                let var = st.lookup_var(&name.text).ok_or_else(|| SemanticError::UndefinedVariable {
                    line: stmt.line,
                    name: name.text.clone(),
                })?;
                if !var.is_subscriptable() {
                    return Err(SemanticError::SubscriptOnNonArray {
                        line: stmt.line,
                        name: name.text.clone(),
                    }
                    .into());
                }
                self.generate_expr(&stmt.value, st)?;
                self.write(&format!("push {} {}", var.segment.as_vm_str(), var.index))?;
                self.generate_expr(idx, st)?;
                self.write("add")?;
                self.write("pop pointer 1")?;
                self.write("pop that 0")?;
            }
        }
        Ok(())
    }

    fn generate_do(&mut self, stmt: &DoStmt, st: &SymTable) -> Result<(), CompileError> {
        self.generate_call(&stmt.call, st)?;
        self.write("pop temp 0")?;
        Ok(())
    }

    fn generate_if(&mut self, stmt: &IfStmt, st: &SymTable) -> Result<(), CompileError> {
        let id = self.next_label();
        let l_else = format!("{}.{}.if_else_{id}", self.class_name, self.sub_name);
        let l_end = format!("{}.{}.if_end_{id}", self.class_name, self.sub_name);

        self.generate_expr(&stmt.cond, st)?;
        self.write("not")?;
        self.write(&format!("if-goto {l_else}"))?;
        for s in &stmt.then_branch {
            self.generate_statement(s, st)?;
        }
        self.write(&format!("goto {l_end}"))?;
        self.write(&format!("label {l_else}"))?;
        if let Some(else_branch) = &stmt.else_branch {
            for s in else_branch {
                self.generate_statement(s, st)?;
            }
        }
        self.write(&format!("label {l_end}"))?;
        Ok(())
    }

    fn generate_while(&mut self, stmt: &WhileStmt, st: &SymTable) -> Result<(), CompileError> {
        let id = self.next_label();
        let l_check = format!("{}.{}.while_check_{id}", self.class_name, self.sub_name);
        let l_done = format!("{}.{}.while_done_{id}", self.class_name, self.sub_name);

        self.write(&format!("label {l_check}"))?;
        self.generate_expr(&stmt.cond, st)?;
        self.write("not")?;
        self.write(&format!("if-goto {l_done}"))?;
        for s in &stmt.body {
            self.generate_statement(s, st)?;
        }
        self.write(&format!("goto {l_check}"))?;
        self.write(&format!("label {l_done}"))?;
        Ok(())
    }

    fn generate_return(&mut self, stmt: &ReturnStmt, st: &SymTable) -> Result<(), CompileError> {
        match (&stmt.value, self.is_void) {
            (None, true) => self.write("push constant 0")?,
            (None, false) => {
                return Err(SemanticError::ReturnMismatch {
                    line: stmt.line,
                    message: format!("'{}' must return a value", self.sub_name),
                }
                .into())
            }
            (Some(_), true) => {
                return Err(SemanticError::ReturnMismatch {
                    line: stmt.line,
                    message: format!("'{}' is void and must not return a value", self.sub_name),
                }
                .into())
            }
            (Some(expr), false) => {
                if self.current_kind == SubroutineKind::Constructor && !is_bare_this(expr) {
                    return Err(SemanticError::InvalidCtorReturnType {
                        line: stmt.line,
                        name: self.sub_name.clone(),
                    }
                    .into());
                }
                self.generate_expr(expr, st)?;
            }
        }
        self.write("return")?;
        Ok(())
    }

    fn generate_expr(&mut self, expr: &Expr, st: &SymTable) -> Result<(), CompileError> {
        self.generate_term(&expr.terms[0], st)?;
        for (op, term) in expr.ops.iter().zip(expr.terms[1..].iter()) {
            self.generate_term(term, st)?;
            match op {
                BinOp::Add => self.write("add")?,
                BinOp::Sub => self.write("sub")?,
                BinOp::And => self.write("and")?,
                BinOp::Or => self.write("or")?,
                BinOp::Lt => self.write("lt")?,
                BinOp::Gt => self.write("gt")?,
                BinOp::Eq => self.write("eq")?,
                BinOp::Mul => self.write("call Math.multiply 2")?,
                BinOp::Div => self.write("call Math.divide 2")?,
            }
        }
        Ok(())
    }

    fn generate_term(&mut self, term: &Term, st: &SymTable) -> Result<(), CompileError> {
        self.generate_term_inner(term, st)?;
        match term.unary {
            Some(UnaryOp::Neg) => self.write("neg")?,
            Some(UnaryOp::Not) => self.write("not")?,
            None => {}
        }
        Ok(())
    }

    fn generate_term_inner(&mut self, term: &Term, st: &SymTable) -> Result<(), CompileError> {
        match &term.inner {
            TermInner::Const(c) => self.generate_const(c)?,
            TermInner::Var(name) => {
                let var = st.lookup_var(&name.text).ok_or_else(|| SemanticError::UndefinedVariable {
                    line: term.line,
                    name: name.text.clone(),
                })?;
                self.write(&format!("push {} {}", var.segment.as_vm_str(), var.index))?;
            }
            TermInner::Subscript(name, idx) => {
                let var = st.lookup_var(&name.text).ok_or_else(|| SemanticError::UndefinedVariable {
                    line: term.line,
                    name: name.text.clone(),
                })?;
                if !var.is_subscriptable() {
                    return Err(SemanticError::SubscriptOnNonArray {
                        line: term.line,
                        name: name.text.clone(),
                    }
                    .into());
                }
                self.write(&format!("push {} {}", var.segment.as_vm_str(), var.index))?;
                self.generate_expr(idx, st)?;
                self.write("add")?;
                self.write("pop pointer 1")?;
                self.write("push that 0")?;
            }
            TermInner::Call(call) => self.generate_call(call, st)?,
            TermInner::Grouped(inner) => self.generate_expr(inner, st)?,
        }
        Ok(())
    }

    fn generate_const(&mut self, c: &ConstLit) -> Result<(), CompileError> {
        match c {
            ConstLit::Int(n) => self.write(&format!("push constant {n}"))?,
            ConstLit::True => {
                self.write("push constant 0")?;
                self.write("not")?;
            }
            ConstLit::False | ConstLit::Null => self.write("push constant 0")?,
            ConstLit::This => self.write("push pointer 0")?,
            ConstLit::Str(s) => {
                self.write(&format!("push constant {}", s.chars().count()))?;
                self.write("call String.new 1")?;
                for ch in s.chars() {
                    self.write(&format!("push constant {}", ch as u32))?;
                    self.write("call String.appendChar 1")?;
                }
            }
        }
        Ok(())
    }

    /// Emits a call, in `Call.params` order after the receiver (if any):
    /// `[push receiver,] push param0, push param1, ..., call Class.method n`.
    fn generate_call(&mut self, call: &Call, st: &SymTable) -> Result<(), CompileError> {
        let has_implicit_this =
            matches!(self.current_kind, SubroutineKind::Method | SubroutineKind::Constructor);
        let resolved = st.check_call(call, &self.class_name, has_implicit_this)?;

        let mut n_args = u16::from(resolved.arity);
        match &resolved.target {
            CallTarget::ImplicitThis => {
                self.write("push pointer 0")?;
                n_args += 1;
            }
            CallTarget::Variable(var) => {
                self.write(&format!("push {} {}", var.segment.as_vm_str(), var.index))?;
                n_args += 1;
            }
            CallTarget::StaticClass => {}
        }
        for param in &call.params {
            self.generate_expr(param, st)?;
        }
        self.write(&format!("call {}.{} {n_args}", resolved.class, resolved.method))?;
        Ok(())
    }
}

fn is_bare_this(expr: &Expr) -> bool {
    expr.ops.is_empty()
        && expr.terms.len() == 1
        && expr.terms[0].unary.is_none()
        && matches!(expr.terms[0].inner, TermInner::Const(ConstLit::This))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::parser::Parser;

    fn compile_one(source: &str) -> String {
        compile_program(&[source])
    }

    fn compile_program(sources: &[&str]) -> String {
        let classes: Vec<Class> = sources
            .iter()
            .map(|s| {
                let tokens = lex(s).unwrap();
                Parser::new(&tokens).parse_class("Test").unwrap()
            })
            .collect();
        let mut st = SymTable::new();
        st.add_subs(&classes).unwrap();
        let mut gen = CodeGenerator::new(Vec::new());
        for class in &classes {
            gen.generate_class(class, &mut st).unwrap();
        }
        String::from_utf8(gen.finish().unwrap()).unwrap()
    }

    #[test]
    fn constructor_lowering_matches_scenario_6() {
        let vm = compile_one(
            "class Point {\n\
             field int x, y;\n\
             constructor Point new(int ax, int ay) {\n\
             let x = ax;\n\
             let y = ay;\n\
             return this;\n\
             }\n\
             }\n",
        );
        let expected = "function Point.new 0\n\
                         push constant 2\n\
                         call Memory.alloc 1\n\
                         pop pointer 0\n\
                         push argument 0\n\
                         pop this 0\n\
                         push argument 1\n\
                         pop this 1\n\
                         push pointer 0\n\
                         return\n";
        assert_eq!(vm, expected);
    }

    #[test]
    fn push_constant_seven_matches_scenario_3() {
        let vm = compile_one(
            "class Main {\n\
             function void main() {\n\
             do Output.printInt(7);\n\
             return;\n\
             }\n\
             }\n",
        );
        assert!(vm.contains("push constant 7\ncall Output.printInt 1\npop temp 0\n"));
    }

    #[test]
    fn method_call_with_implicit_receiver_matches_scenario_5() {
        let vm = compile_one(
            "class C {\n\
             method void run(int x) {\n\
             do foo(x);\n\
             return;\n\
             }\n\
             method void foo(int y) {\n\
             return;\n\
             }\n\
             }\n",
        );
        assert!(vm.contains("push pointer 0\npush argument 1\ncall C.foo 2\npop temp 0\n"));
    }

    #[test]
    fn qualified_call_on_instance_variable_pushes_receiver_first() {
        let vm = compile_program(&[
            "class Main {\n\
             function void main() {\n\
             var Point p;\n\
             do Output.printInt(1);\n\
             do p.foo(2);\n\
             return;\n\
             }\n\
             }\n",
            "class Point {\n\
             method void foo(int y) {\n\
             return;\n\
             }\n\
             }\n",
        ]);
        assert!(vm.contains("push local 0\npush constant 2\ncall Point.foo 2\npop temp 0\n"));
    }

    #[test]
    fn true_lowers_to_all_ones_not_push_constant_one() {
        let vm = compile_one(
            "class Main {\n\
             function boolean flag() {\n\
             return true;\n\
             }\n\
             }\n",
        );
        assert!(vm.contains("push constant 0\nnot\nreturn\n"));
        assert!(!vm.contains("push constant 1\n"));
    }

    #[test]
    fn string_literal_allocates_and_appends_each_char() {
        let vm = compile_one(
            "class Main {\n\
             function void main() {\n\
             do Output.printString(\"hi\");\n\
             return;\n\
             }\n\
             }\n",
        );
        assert!(vm.contains("push constant 2\ncall String.new 1\n"));
        assert!(vm.contains("push constant 104\ncall String.appendChar 1\n"));
        assert!(vm.contains("push constant 105\ncall String.appendChar 1\n"));
    }

    #[test]
    fn subscript_write_evaluates_rhs_before_address() {
        let vm = compile_one(
            "class Main {\n\
             function void main() {\n\
             var Array a;\n\
             let a[0] = 5;\n\
             return;\n\
             }\n\
             }\n",
        );
        let rhs_pos = vm.find("push constant 5").unwrap();
        let base_pos = vm.find("push local 0").unwrap();
        assert!(rhs_pos < base_pos, "RHS must be evaluated before the address");
        assert!(vm.contains("pop pointer 1\npop that 0\n"));
    }

    #[test]
    fn missing_trailing_return_is_rejected() {
        let tokens = lex("class Main {\nfunction void main() {\nlet x = 1;\n}\n}\n").unwrap();
        let class = Parser::new(&tokens).parse_class("Test").unwrap();
        let mut st = SymTable::new();
        st.add_subs(&[class.clone()]).unwrap();
        let mut gen = CodeGenerator::new(Vec::new());
        let err = gen.generate_class(&class, &mut st).unwrap_err();
        assert!(matches!(err, CompileError::Semantic(SemanticError::MissingTrailingReturn { .. })));
    }

    #[test]
    fn constructor_must_return_this() {
        let tokens = lex(
            "class Point {\nconstructor Point new() {\nreturn;\n}\n}\n",
        )
        .unwrap();
        let class = Parser::new(&tokens).parse_class("Test").unwrap();
        let mut st = SymTable::new();
        st.add_subs(&[class.clone()]).unwrap();
        let mut gen = CodeGenerator::new(Vec::new());
        let err = gen.generate_class(&class, &mut st).unwrap_err();
        assert!(matches!(
            err,
            CompileError::Semantic(SemanticError::InvalidCtorReturnType { .. })
        ));
    }

    #[test]
    fn void_return_with_value_is_rejected() {
        let tokens = lex("class Main {\nfunction void main() {\nreturn 1;\n}\n}\n").unwrap();
        let class = Parser::new(&tokens).parse_class("Test").unwrap();
        let mut st = SymTable::new();
        st.add_subs(&[class.clone()]).unwrap();
        let mut gen = CodeGenerator::new(Vec::new());
        let err = gen.generate_class(&class, &mut st).unwrap_err();
        assert!(matches!(err, CompileError::Semantic(SemanticError::ReturnMismatch { .. })));
    }
}
