//! Emits Hack assembly for a stream of parsed VM [`Command`]s.
//!
//! One `write_*` method per command shape, each a direct transcription of
//! the per-command assembly templates in spec.md §4.6: stack push/pop,
//! arithmetic/logical/comparison, branching, and the full call-frame
//! lowering for `function`/`call`/`return`. Labels for `label`/`goto`/
//! `if-goto` are scoped to the enclosing function (`<Function>$<label>`);
//! comparison labels are scoped to the enclosing module
//! (`<Module>$<op>.<n>`); `call` return-address labels are scoped to the
//! calling function and counted per-function (`<Function>$ret.<n>`).

use std::io::{self, Write};

use crate::error::TranslationError;
use crate::parser::Command;
use crate::segment::{Segment, Shape};

/// Pushes the stack pointer to 256 and jumps into `Sys.init`, matching the
/// convention both the original 08 test harness and the sibling Rust VM
/// backend in the retrieval pack use for multi-file translation.
pub const BOOTSTRAP_SP: u16 = 256;

pub struct CodeWriter<W: Write> {
    out: W,
    module: String,
    current_function: Option<String>,
    compare_count: usize,
    return_count: usize,
}

impl<W: Write> CodeWriter<W> {
    #[must_use]
    pub fn new(out: W) -> Self {
        Self {
            out,
            module: String::new(),
            current_function: None,
            compare_count: 0,
            return_count: 0,
        }
    }

    /// Sets the enclosing module name, used to scope `static` symbols and
    /// comparison labels. Called once per input `.vm` file.
    pub fn set_module(&mut self, module: impl Into<String>) {
        self.module = module.into();
    }

    /// Emits the bootstrap preamble: `SP=256; call Sys.init 0`.
    ///
    /// # Errors
    /// Propagates any I/O failure writing to the underlying sink.
    pub fn write_bootstrap(&mut self) -> io::Result<()> {
        writeln!(self.out, "@{BOOTSTRAP_SP}")?;
        writeln!(self.out, "D=A")?;
        writeln!(self.out, "@SP")?;
        writeln!(self.out, "M=D")?;
        self.emit_call("Sys.init", 0)
    }

    /// Translates one already-parsed command, found on source `line`.
    ///
    /// # Errors
    /// Returns [`TranslationError`] for a `pop` into `constant` or a
    /// `pointer` index other than 0/1; propagates I/O errors otherwise.
    pub fn write_command(&mut self, cmd: &Command, line: usize) -> Result<(), TranslationError> {
        match cmd {
            Command::Arithmetic(op) => self.write_arithmetic(op)?,
            Command::Push(seg, index) => self.write_push(*seg, *index, line)?,
            Command::Pop(seg, index) => self.write_pop(*seg, *index, line)?,
            Command::Label(label) => self.write_label(label)?,
            Command::Goto(label) => self.write_goto(label)?,
            Command::If(label) => self.write_if_goto(label)?,
            Command::Function(name, n_locals) => self.write_function(name, *n_locals)?,
            Command::Call(name, n_args) => self.emit_call(name, *n_args)?,
            Command::Return => self.write_return()?,
        }
        Ok(())
    }

    fn label_for(&self, label: &str) -> String {
        match &self.current_function {
            Some(f) => format!("{f}${label}"),
            None => label.to_string(),
        }
    }

    fn pointer_index(line: usize, index: u16) -> Result<u16, TranslationError> {
        if index > 1 {
            return Err(TranslationError::InvalidPointerIndex {
                line,
                index: i64::from(index),
            });
        }
        Ok(index)
    }

    fn write_push(&mut self, seg: Segment, index: u16, line: usize) -> Result<(), TranslationError> {
        if seg == Segment::Pointer {
            Self::pointer_index(line, index)?;
        }
        match seg.resolve(index, &self.module) {
            Shape::Floating { base, index } => {
                writeln!(self.out, "@{base}")?;
                writeln!(self.out, "D=M")?;
                writeln!(self.out, "@{index}")?;
                writeln!(self.out, "A=D+A")?;
                writeln!(self.out, "D=M")?;
            }
            Shape::Fixed(addr) => {
                writeln!(self.out, "@{addr}")?;
                writeln!(self.out, "D=M")?;
            }
            Shape::Const(value) => {
                writeln!(self.out, "@{value}")?;
                writeln!(self.out, "D=A")?;
            }
            Shape::StaticSymbol(symbol) => {
                writeln!(self.out, "@{symbol}")?;
                writeln!(self.out, "D=M")?;
            }
        }
        self.push_d()?;
        Ok(())
    }

    fn write_pop(&mut self, seg: Segment, index: u16, line: usize) -> Result<(), TranslationError> {
        if seg == Segment::Constant {
            return Err(TranslationError::PopToConstant { line });
        }
        if seg == Segment::Pointer {
            Self::pointer_index(line, index)?;
        }
        match seg.resolve(index, &self.module) {
            Shape::Floating { base, index } => {
                // Swap trick: stash the target address in the stack's
                // spare top slot instead of a scratch register.
                writeln!(self.out, "@{base}")?;
                writeln!(self.out, "D=M")?;
                writeln!(self.out, "@{index}")?;
                writeln!(self.out, "D=D+A")?;
                writeln!(self.out, "@SP")?;
                writeln!(self.out, "A=M")?;
                writeln!(self.out, "M=D")?;
                writeln!(self.out, "@SP")?;
                writeln!(self.out, "A=M-1")?;
                writeln!(self.out, "D=M")?;
                writeln!(self.out, "@SP")?;
                writeln!(self.out, "A=M")?;
                writeln!(self.out, "A=M")?;
                writeln!(self.out, "M=D")?;
                writeln!(self.out, "@SP")?;
                writeln!(self.out, "M=M-1")?;
            }
            Shape::Fixed(addr) => {
                self.pop_to_d()?;
                writeln!(self.out, "@{addr}")?;
                writeln!(self.out, "M=D")?;
            }
            Shape::StaticSymbol(symbol) => {
                self.pop_to_d()?;
                writeln!(self.out, "@{symbol}")?;
                writeln!(self.out, "M=D")?;
            }
            Shape::Const(_) => unreachable!("rejected above"),
        }
        Ok(())
    }

    fn write_arithmetic(&mut self, op: &str) -> io::Result<()> {
        match op {
            "add" => self.binary_op("D+M"),
            "sub" => self.binary_op("M-D"),
            "and" => self.binary_op("D&M"),
            "or" => self.binary_op("D|M"),
            "neg" => self.unary_op("-M"),
            "not" => self.unary_op("!M"),
            "eq" => self.compare("JEQ"),
            "gt" => self.compare("JGT"),
            "lt" => self.compare("JLT"),
            _ => unreachable!("parser rejects unknown arithmetic ops"),
        }
    }

    fn binary_op(&mut self, comp: &str) -> io::Result<()> {
        writeln!(self.out, "@SP")?;
        writeln!(self.out, "AM=M-1")?;
        writeln!(self.out, "D=M")?;
        writeln!(self.out, "A=A-1")?;
        writeln!(self.out, "M={comp}")
    }

    fn unary_op(&mut self, comp: &str) -> io::Result<()> {
        writeln!(self.out, "@SP")?;
        writeln!(self.out, "A=M-1")?;
        writeln!(self.out, "M={comp}")
    }

    fn compare(&mut self, jump: &str) -> io::Result<()> {
        self.compare_count += 1;
        let label = format!("{}${jump}.{}", self.module, self.compare_count);
        writeln!(self.out, "@SP")?;
        writeln!(self.out, "AM=M-1")?;
        writeln!(self.out, "D=M")?;
        writeln!(self.out, "A=A-1")?;
        writeln!(self.out, "D=M-D")?;
        writeln!(self.out, "M=-1")?;
        writeln!(self.out, "@{label}")?;
        writeln!(self.out, "D;{jump}")?;
        writeln!(self.out, "@SP")?;
        writeln!(self.out, "A=M-1")?;
        writeln!(self.out, "M=0")?;
        writeln!(self.out, "({label})")
    }

    fn write_label(&mut self, label: &str) -> io::Result<()> {
        let scoped = self.label_for(label);
        writeln!(self.out, "({scoped})")
    }

    fn write_goto(&mut self, label: &str) -> io::Result<()> {
        let scoped = self.label_for(label);
        writeln!(self.out, "@{scoped}")?;
        writeln!(self.out, "0;JMP")
    }

    fn write_if_goto(&mut self, label: &str) -> io::Result<()> {
        let scoped = self.label_for(label);
        self.pop_to_d()?;
        writeln!(self.out, "@{scoped}")?;
        writeln!(self.out, "D;JNE")
    }

    fn write_function(&mut self, name: &str, n_locals: u16) -> io::Result<()> {
        self.current_function = Some(name.to_string());
        self.return_count = 0;
        writeln!(self.out, "({name})")?;
        for _ in 0..n_locals {
            writeln!(self.out, "@SP")?;
            writeln!(self.out, "A=M")?;
            writeln!(self.out, "M=0")?;
            writeln!(self.out, "@SP")?;
            writeln!(self.out, "M=M+1")?;
        }
        Ok(())
    }

    /// `call` lowering is reachable both from [`Self::write_command`] and
    /// from [`Self::write_bootstrap`] (which calls `Sys.init` directly), so
    /// it takes `&str`/`u16` rather than a borrowed [`Command`].
    fn emit_call(&mut self, name: &str, n_args: u16) -> io::Result<()> {
        self.return_count += 1;
        let caller = self.current_function.clone().unwrap_or_default();
        let ret_label = format!("{caller}$ret.{}", self.return_count);

        writeln!(self.out, "@{ret_label}")?;
        writeln!(self.out, "D=A")?;
        self.push_d()?;
        for base in ["LCL", "ARG", "THIS", "THAT"] {
            writeln!(self.out, "@{base}")?;
            writeln!(self.out, "D=M")?;
            self.push_d()?;
        }
        writeln!(self.out, "@{}", n_args + 5)?;
        writeln!(self.out, "D=A")?;
        writeln!(self.out, "@SP")?;
        writeln!(self.out, "D=M-D")?;
        writeln!(self.out, "@ARG")?;
        writeln!(self.out, "M=D")?;
        writeln!(self.out, "@SP")?;
        writeln!(self.out, "D=M")?;
        writeln!(self.out, "@LCL")?;
        writeln!(self.out, "M=D")?;
        writeln!(self.out, "@{name}")?;
        writeln!(self.out, "0;JMP")?;
        writeln!(self.out, "({ret_label})")
    }

    fn write_return(&mut self) -> io::Result<()> {
        // frame = R13 = LCL; retAddr = R14 = *(frame-5)
        writeln!(self.out, "@LCL")?;
        writeln!(self.out, "D=M")?;
        writeln!(self.out, "@R13")?;
        writeln!(self.out, "M=D")?;
        writeln!(self.out, "@5")?;
        writeln!(self.out, "A=D-A")?;
        writeln!(self.out, "D=M")?;
        writeln!(self.out, "@R14")?;
        writeln!(self.out, "M=D")?;

        // *ARG = pop()
        self.pop_to_d()?;
        writeln!(self.out, "@ARG")?;
        writeln!(self.out, "A=M")?;
        writeln!(self.out, "M=D")?;

        // SP = ARG + 1
        writeln!(self.out, "@ARG")?;
        writeln!(self.out, "D=M+1")?;
        writeln!(self.out, "@SP")?;
        writeln!(self.out, "M=D")?;

        // THAT, THIS, ARG, LCL <- walk frame-1..frame-4 via R13
        for base in ["THAT", "THIS", "ARG", "LCL"] {
            writeln!(self.out, "@R13")?;
            writeln!(self.out, "AM=M-1")?;
            writeln!(self.out, "D=M")?;
            writeln!(self.out, "@{base}")?;
            writeln!(self.out, "M=D")?;
        }

        writeln!(self.out, "@R14")?;
        writeln!(self.out, "A=M")?;
        writeln!(self.out, "0;JMP")
    }

    fn push_d(&mut self) -> io::Result<()> {
        writeln!(self.out, "@SP")?;
        writeln!(self.out, "M=M+1")?;
        writeln!(self.out, "A=M-1")?;
        writeln!(self.out, "M=D")
    }

    fn pop_to_d(&mut self) -> io::Result<()> {
        writeln!(self.out, "@SP")?;
        writeln!(self.out, "AM=M-1")?;
        writeln!(self.out, "D=M")
    }

    /// Flushes and returns the underlying writer.
    ///
    /// # Errors
    /// Propagates any I/O failure flushing the sink.
    pub fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(module: &str, cmds: &[Command]) -> String {
        let mut writer = CodeWriter::new(Vec::new());
        writer.set_module(module);
        for cmd in cmds {
            writer.write_command(cmd, 1).unwrap();
        }
        String::from_utf8(writer.finish().unwrap()).unwrap()
    }

    #[test]
    fn push_constant_matches_scenario_3() {
        let out = run("Foo", &[Command::Push(Segment::Constant, 7)]);
        assert_eq!(out, "@7\nD=A\n@SP\nM=M+1\nA=M-1\nM=D\n");
    }

    #[test]
    fn eq_after_two_pushes_yields_true_sentinel() {
        let out = run(
            "Foo",
            &[
                Command::Push(Segment::Constant, 3),
                Command::Push(Segment::Constant, 3),
                Command::Arithmetic("eq".to_string()),
            ],
        );
        assert!(out.contains("M=-1"));
        assert!(out.contains("Foo$JEQ.1"));
    }

    #[test]
    fn pop_to_constant_is_rejected() {
        let mut writer = CodeWriter::new(Vec::new());
        writer.set_module("Foo");
        let err = writer
            .write_command(&Command::Pop(Segment::Constant, 0), 9)
            .unwrap_err();
        assert!(matches!(err, TranslationError::PopToConstant { line: 9 }));
    }

    #[test]
    fn pointer_index_above_one_is_rejected() {
        let mut writer = CodeWriter::new(Vec::new());
        writer.set_module("Foo");
        let err = writer
            .write_command(&Command::Push(Segment::Pointer, 2), 4)
            .unwrap_err();
        assert!(matches!(
            err,
            TranslationError::InvalidPointerIndex { line: 4, index: 2 }
        ));
    }

    #[test]
    fn labels_are_scoped_to_enclosing_function() {
        let out = run(
            "Foo",
            &[
                Command::Function("Foo.bar".to_string(), 0),
                Command::Label("loop".to_string()),
                Command::Goto("loop".to_string()),
            ],
        );
        assert!(out.contains("(Foo.bar$loop)"));
        assert!(out.contains("@Foo.bar$loop"));
    }

    #[test]
    fn call_emits_full_frame_save() {
        let out = run("Foo", &[Command::Call("Bar.baz".to_string(), 2)]);
        assert!(out.contains("@LCL"));
        assert!(out.contains("@ARG"));
        assert!(out.contains("@THIS"));
        assert!(out.contains("@THAT"));
        assert!(out.contains("@Bar.baz"));
        assert!(out.contains("$ret.1"));
    }

    #[test]
    fn return_restores_all_four_segments() {
        let out = run("Foo", &[Command::Return]);
        assert!(out.contains("@THAT"));
        assert!(out.contains("@THIS"));
        assert!(out.contains("@ARG"));
        assert!(out.contains("@LCL"));
        assert!(out.contains("@R14"));
    }

    #[test]
    fn bootstrap_sets_stack_pointer_and_calls_sys_init() {
        let mut writer = CodeWriter::new(Vec::new());
        writer.write_bootstrap().unwrap();
        let out = String::from_utf8(writer.finish().unwrap()).unwrap();
        assert!(out.starts_with("@256\nD=A\n@SP\nM=D\n"));
        assert!(out.contains("@Sys.init"));
    }
}
