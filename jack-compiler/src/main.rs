//! `jackc` — Jack-to-VM compiler (nand2tetris projects 10/11).
//!
//! ```text
//! jackc <file.jack | dir>
//! ```
//!
//! A single file compiles to a co-located `<name>.vm`. A directory
//! compiles every `.jack` file it contains, registering every class's
//! subroutine signatures up front so forward references and cross-class
//! calls resolve regardless of file order, then writes one `.vm` per
//! source file (spec.md §6).

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

use std::env;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};

fn output_path(input: &Path, module: &str) -> PathBuf {
    if input.is_dir() {
        input.join(format!("{module}.vm"))
    } else {
        input.with_extension("vm")
    }
}

fn run(input: &str) -> Result<()> {
    let path = Path::new(input);
    if !path.exists() {
        bail!("{input} does not exist");
    }

    if path.is_dir() {
        let dir_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("Unknown");
        let outputs = jack_compiler::compile_program(path).map_err(|err| {
            eprintln!("{}", err.to_diagnostic(dir_name));
            anyhow::Error::from(err)
        })?;
        for (module, vm) in outputs {
            let output = output_path(path, &module);
            hack_support::atomic::write_atomic(&output, &vm)
                .with_context(|| format!("writing {}", output.display()))?;
            println!("Compilation complete: {module}.jack -> {}", output.display());
        }
    } else {
        let module = path.file_stem().and_then(|s| s.to_str()).unwrap_or("Unknown");
        let vm = jack_compiler::compile_module(path).map_err(|err| {
            eprintln!("{}", err.to_diagnostic(module));
            anyhow::Error::from(err)
        })?;
        let output = output_path(path, module);
        hack_support::atomic::write_atomic(&output, &vm)
            .with_context(|| format!("writing {}", output.display()))?;
        println!("Compilation complete: {} -> {}", input, output.display());
    }

    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <file.jack | dir>", args[0]);
        process::exit(1);
    }

    if let Err(err) = run(&args[1]) {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}
