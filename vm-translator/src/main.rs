//! `vmt` — VM-to-Hack-assembly translator (nand2tetris projects 7/8).
//!
//! ```text
//! vmt <file.vm | dir>
//! ```
//!
//! A single file translates to a standalone `.asm` with no bootstrap. A
//! directory translates every `.vm` file it contains, in filename order,
//! into one combined `.asm` prefixed with the bootstrap preamble (spec.md
//! §4.6, §6).

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

use std::env;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};

fn output_path(input: &Path) -> PathBuf {
    if input.is_dir() {
        let name = input
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("Output");
        input.join(format!("{name}.asm"))
    } else {
        input.with_extension("asm")
    }
}

fn run(input: &str) -> Result<()> {
    let path = Path::new(input);
    if !path.exists() {
        bail!("{input} does not exist");
    }

    let contents = if path.is_dir() {
        vm_translator::translate_directory(path)
    } else {
        vm_translator::translate_module(path)
    }
    .map_err(|err| {
        eprintln!("{}", err.to_diagnostic());
        anyhow::Error::from(err)
    })?;

    let output = output_path(path);
    hack_support::atomic::write_atomic(&output, &contents)
        .with_context(|| format!("writing {}", output.display()))?;

    println!("Translation complete: {} -> {}", input, output.display());
    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <file.vm | dir>", args[0]);
        process::exit(1);
    }

    if let Err(err) = run(&args[1]) {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}
