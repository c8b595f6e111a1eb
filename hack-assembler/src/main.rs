//! Hack Assembler - Main Entry Point
//!
//! A two-pass assembler for the Hack assembly language (`Nand2Tetris` Project 6).
//!
//! # Usage
//! ```bash
//! hasm <input.asm> [output.hack]
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

use std::env;
use std::fs;
use std::path::Path;
use std::process;

use anyhow::{bail, Context, Result};

use hack_assembler::assemble;

/// Determines the output file path
fn output_path(input: &str, explicit_output: Option<&str>) -> String {
    explicit_output.map_or_else(
        || input.replace(".asm", ".hack"),
        std::string::ToString::to_string,
    )
}

fn run(input_path: &str, output_path: &str) -> Result<()> {
    let source = fs::read_to_string(input_path)
        .with_context(|| format!("reading {input_path}"))?;
    let lines: Vec<String> = source.lines().map(str::to_string).collect();

    let instructions = assemble(&lines).map_err(|err| {
        eprintln!("{}", err.to_diagnostic());
        err
    })?;

    if instructions.is_empty() {
        bail!("{input_path} contains no instructions");
    }

    let mut contents = instructions.join("\n");
    contents.push('\n');

    hack_support::atomic::write_atomic(Path::new(output_path), &contents)
        .with_context(|| format!("writing {output_path}"))?;

    println!("Assembly completed. Output written to {output_path}");
    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if !(2..=3).contains(&args.len()) {
        eprintln!("Usage: {} <input.asm> [output.hack]", args[0]);
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  {} Add.asm", args[0]);
        eprintln!("  {} Add.asm Add.hack", args[0]);
        process::exit(1);
    }

    let input_path = &args[1];
    let output = output_path(input_path, args.get(2).map(String::as_str));

    if let Err(err) = run(input_path, &output) {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}
