//! VM-to-Hack-assembly translator (nand2tetris projects 7/8).
//!
//! # Architecture
//!
//! - [`parser`]: strips comments/whitespace and yields arity-checked
//!   [`parser::Command`]s.
//! - [`segment`]: classifies each VM memory segment into the addressing
//!   shape (`Floating`/`Fixed`/`Const`) spec.md §4.5 names.
//! - [`code_writer`]: one `write_*` method per command, including the full
//!   `function`/`call`/`return` call-frame lowering.
//! - [`error`]: [`error::TranslationError`], returned instead of panicking
//!   or silently skipping on an unknown opcode or malformed operand.
//! - [`translate_module`]/[`translate_directory`]: drive a single file or
//!   a whole directory (bootstrap + concatenation) end to end.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

pub mod code_writer;
pub mod error;
pub mod parser;
pub mod segment;

use std::fs;
use std::path::{Path, PathBuf};

pub use code_writer::CodeWriter;
pub use error::TranslationError;
pub use parser::{Command, Parser};

fn module_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Unknown")
        .to_string()
}

/// Translates one `.vm` file's commands into `writer`, without a bootstrap.
///
/// # Errors
/// Returns [`TranslationError`] on the first malformed command, naming its
/// source line; propagates I/O failures reading `path`.
pub fn translate_into<W: std::io::Write>(
    path: &Path,
    writer: &mut CodeWriter<W>,
) -> Result<(), TranslationError> {
    let source = fs::read_to_string(path)?;
    let parser = Parser::new(&source);
    writer.set_module(module_name(path));

    for result in parser.commands() {
        let (cmd, line) = result?;
        writer.write_command(&cmd, line)?;
    }
    Ok(())
}

/// Translates a single standalone `.vm` file to Hack assembly text, with no
/// bootstrap preamble (spec.md §6: "single `.vm` file translated
/// standalone").
///
/// # Errors
/// See [`translate_into`].
pub fn translate_module(path: &Path) -> Result<String, TranslationError> {
    let mut writer = CodeWriter::new(Vec::new());
    translate_into(path, &mut writer)?;
    let bytes = writer.finish()?;
    Ok(String::from_utf8(bytes).expect("generated assembly is ASCII"))
}

/// Translates every `.vm` file in `dir`, in filename order, into one
/// combined Hack assembly text prefixed with the `SP=256; call Sys.init 0`
/// bootstrap (spec.md §4.6, §6).
///
/// # Errors
/// Returns [`TranslationError`] on the first module's first error (no
/// best-effort continuation, per spec.md §7); an I/O error if `dir` has no
/// `.vm` files is surfaced as [`std::io::Error`] through the `From` impl.
pub fn translate_directory(dir: &Path) -> Result<String, TranslationError> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("vm"))
        .collect();
    files.sort();

    let mut writer = CodeWriter::new(Vec::new());
    writer.write_bootstrap()?;
    for file in &files {
        translate_into(file, &mut writer)?;
    }

    let bytes = writer.finish()?;
    Ok(String::from_utf8(bytes).expect("generated assembly is ASCII"))
}
