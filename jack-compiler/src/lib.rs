//! Jack-to-VM compiler (nand2tetris projects 10/11).
//!
//! # Architecture
//!
//! - [`lexer`]: char-scanning tokenizer, PHF reserved-word lookup.
//! - [`parser`]: one-token-lookahead recursive descent producing [`ast`].
//! - [`ast`]: the tagged-sum-type AST §3 of spec.md describes.
//! - [`symtab`]: two-sweep semantic analysis (subroutine-signature
//!   registration + OS conformance, then class/subroutine variable
//!   scoping and call-shape resolution).
//! - [`codegen`]: one VM command per emitted line, driven by `symtab`.
//! - [`os_table`]: the fixed nand2tetris standard-library signature table.
//! - [`xml_dump`]: debug-only token-stream pretty-printer (not part of the
//!   compilation pipeline).
//! - [`error`]: [`error::CompileError`], unifying every failure-producing
//!   stage behind one `Diagnostic`-rendering type.
//!
//! `compile_module`/`compile_program` mirror `vm-translator`'s
//! `translate_module`/`translate_directory` split: a standalone file is
//! compiled against only its own class, while a directory first registers
//! every class's subroutine signatures (sweep 1, spec.md §3: "populated in
//! a first pass over every class so that forward references and
//! cross-class calls resolve") before generating each one's `.vm` text.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

pub mod ast;
pub mod codegen;
pub mod error;
pub mod lexer;
pub mod os_table;
pub mod parser;
pub mod symtab;
pub mod xml_dump;

use std::fs;
use std::path::{Path, PathBuf};

pub use codegen::CodeGenerator;
pub use error::CompileError;
pub use symtab::SymTable;

fn module_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Unknown")
        .to_string()
}

/// Lexes and parses one `.jack` file into its [`ast::Class`].
///
/// # Errors
/// [`CompileError::Lex`] or [`CompileError::Parse`] on malformed source;
/// propagates I/O failures reading `path`.
pub fn parse_file(path: &Path) -> Result<ast::Class, CompileError> {
    let source = fs::read_to_string(path)?;
    let module = module_name(path);
    let tokens = lexer::lex(&source)?;
    let class = parser::Parser::new(&tokens).parse_class(&module)?;
    Ok(class)
}

fn emit(class: &ast::Class, st: &mut SymTable) -> Result<String, CompileError> {
    let mut gen = CodeGenerator::new(Vec::new());
    gen.generate_class(class, st)?;
    let bytes = gen.finish()?;
    Ok(String::from_utf8(bytes).expect("generated VM text is ASCII"))
}

/// Compiles a single standalone `.jack` file to VM text, registering only
/// its own class's subroutine signatures (no cross-class forward
/// references are possible in standalone mode).
///
/// # Errors
/// See [`parse_file`]; additionally any [`error::SemanticError`] the
/// class's bodies trigger.
pub fn compile_module(path: &Path) -> Result<String, CompileError> {
    let class = parse_file(path)?;
    let mut st = SymTable::new();
    st.add_subs(std::slice::from_ref(&class))?;
    emit(&class, &mut st)
}

/// Compiles every `.jack` file in `dir`, in filename order. Every class is
/// registered (sweep 1) across the whole program before any class is
/// generated, so forward references and cross-class calls resolve
/// regardless of file order; per spec.md §7, "multi-file compilation
/// fails on the first module's first error; no best-effort continuation".
///
/// Returns one `(module, vm_text)` pair per input file, since each source
/// file still produces its own `.vm` output (spec.md §6).
///
/// # Errors
/// See [`parse_file`] and [`compile_module`]; an I/O error if `dir`
/// cannot be listed is surfaced through the `From` impl.
pub fn compile_program(dir: &Path) -> Result<Vec<(String, String)>, CompileError> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("jack"))
        .collect();
    files.sort();

    let classes: Vec<ast::Class> = files.iter().map(|p| parse_file(p)).collect::<Result<_, _>>()?;

    let mut st = SymTable::new();
    st.add_subs(&classes)?;

    classes
        .iter()
        .map(|class| emit(class, &mut st).map(|vm| (class.name.text.clone(), vm)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_jack(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn standalone_module_compiles_its_own_class_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_jack(
            dir.path(),
            "Main.jack",
            "class Main {\nfunction void main() {\ndo Output.printInt(7);\nreturn;\n}\n}\n",
        );
        let vm = compile_module(&path).unwrap();
        assert!(vm.contains("function Main.main 0"));
        assert!(vm.contains("call Output.printInt 1"));
    }

    #[test]
    fn directory_mode_resolves_forward_references_across_files() {
        let dir = tempfile::tempdir().unwrap();
        write_jack(
            dir.path(),
            "Main.jack",
            "class Main {\nfunction void main() {\ndo Helper.go();\nreturn;\n}\n}\n",
        );
        write_jack(
            dir.path(),
            "Helper.jack",
            "class Helper {\nfunction void go() {\nreturn;\n}\n}\n",
        );

        let outputs = compile_program(dir.path()).unwrap();
        assert_eq!(outputs.len(), 2);
        let main_vm = &outputs.iter().find(|(m, _)| m == "Main").unwrap().1;
        assert!(main_vm.contains("call Helper.go 0"));
    }

    #[test]
    fn directory_mode_fails_on_first_error_with_no_continuation() {
        let dir = tempfile::tempdir().unwrap();
        write_jack(
            dir.path(),
            "Main.jack",
            "class Main {\nfunction void main() {\ndo Bogus.go();\nreturn;\n}\n}\n",
        );
        write_jack(dir.path(), "Ok.jack", "class Ok {\nfunction void go() {\nreturn;\n}\n}\n");

        let err = compile_program(dir.path()).unwrap_err();
        assert!(matches!(err, CompileError::Semantic(_)));
    }
}
