//! Two-pass assembly driver.
//!
//! Pass 1 walks the program once to record the ROM address of every label.
//! Pass 2 walks it again, resolving symbols and encoding each instruction.
//! Labels don't occupy ROM so they don't advance the pass-1 counter; A- and
//! C-instructions do.

use crate::code::{self, try_comp, try_dest, try_jump};
use crate::error::AssemblerError;
use crate::parser::{CommandType, ParserLines};
use crate::symbol_table::SymbolTable;

/// First variable address; `0..16` is reserved for `R0..R15`/`SP`/`LCL`/etc.
const FIRST_VARIABLE_ADDRESS: u16 = 16;

fn is_valid_symbol(symbol: &str) -> bool {
    let mut chars = symbol.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if first.is_ascii_digit() {
        return false;
    }
    let first_ok = first.is_ascii_alphabetic() || matches!(first, '_' | '.' | '$' | ':');
    first_ok
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$' | ':'))
}

/// Builds the symbol table by recording each label's ROM address.
fn first_pass(lines: &[String], symbol_table: &mut SymbolTable) -> Result<(), AssemblerError> {
    let mut rom_address = 0u16;
    let mut parser = ParserLines::from_lines(lines);

    while parser.advance() {
        match parser.command_type().map_err(|source| AssemblerError::Parse {
            line: parser.line_number(),
            source,
        })? {
            CommandType::LCommand => {
                let symbol = parser.symbol().map_err(|source| AssemblerError::Parse {
                    line: parser.line_number(),
                    source,
                })?;
                if !is_valid_symbol(symbol) {
                    return Err(AssemblerError::MalformedLabel {
                        line: parser.line_number(),
                        symbol: symbol.to_string(),
                    });
                }
                symbol_table.add_entry(symbol, rom_address);
            }
            CommandType::ACommand | CommandType::CCommand => {
                rom_address += 1;
            }
        }
    }

    Ok(())
}

/// Resolves symbols and encodes every instruction to a 16-bit binary string.
fn second_pass(
    lines: &[String],
    symbol_table: &mut SymbolTable,
) -> Result<Vec<String>, AssemblerError> {
    let mut ram_address = FIRST_VARIABLE_ADDRESS;
    let mut parser = ParserLines::from_lines(lines);
    let mut output = Vec::new();

    while parser.advance() {
        let line = parser.line_number();
        match parser
            .command_type()
            .map_err(|source| AssemblerError::Parse { line, source })?
        {
            CommandType::ACommand => {
                let symbol = parser
                    .symbol()
                    .map_err(|source| AssemblerError::Parse { line, source })?;

                let address = if let Ok(value) = symbol.parse::<u32>() {
                    if value > u32::from(u16::MAX >> 1) {
                        return Err(AssemblerError::ConstantOverflow { line, value });
                    }
                    u16::try_from(value).expect("checked above")
                } else {
                    if !is_valid_symbol(symbol) {
                        return Err(AssemblerError::MalformedLabel {
                            line,
                            symbol: symbol.to_string(),
                        });
                    }
                    symbol_table.get_or_insert(symbol, &mut ram_address)
                };

                output.push(code::encode_a_instruction(address));
            }
            CommandType::CCommand => {
                let dest = parser
                    .dest()
                    .map_err(|source| AssemblerError::Parse { line, source })?
                    .unwrap_or("");
                let comp = parser
                    .comp()
                    .map_err(|source| AssemblerError::Parse { line, source })?
                    .unwrap_or("");
                let jump = parser
                    .jump()
                    .map_err(|source| AssemblerError::Parse { line, source })?
                    .unwrap_or("");

                let dest_bits = try_dest(dest, line)?;
                let comp_bits = try_comp(comp, line)?;
                let jump_bits = try_jump(jump, line)?;

                output.push(format!("111{comp_bits}{dest_bits}{jump_bits}"));
            }
            CommandType::LCommand => {}
        }
    }

    Ok(output)
}

/// Assembles a complete Hack assembly program into 16-bit binary lines.
///
/// # Errors
/// Returns [`AssemblerError`] on the first invalid mnemonic, malformed
/// label, or out-of-range constant, naming the offending source line.
pub fn assemble(lines: &[String]) -> Result<Vec<String>, AssemblerError> {
    let mut symbol_table = SymbolTable::new();
    first_pass(lines, &mut symbol_table)?;
    second_pass(lines, &mut symbol_table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &[&str]) -> Vec<String> {
        src.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn assembles_simple_program() {
        let src = lines(&["@2", "D=A", "@3", "D=D+A", "@0", "M=D"]);
        let out = assemble(&src).unwrap();
        assert_eq!(out.len(), 6);
        assert_eq!(out[0], "0000000000000010");
        assert_eq!(out[1], "1110110000010000");
    }

    #[test]
    fn resolves_forward_label_references() {
        let src = lines(&["@LOOP", "0;JMP", "(LOOP)", "@0", "D=M"]);
        let out = assemble(&src).unwrap();
        // @LOOP resolves to ROM address 2, the instruction right after the label.
        assert_eq!(out[0], "0000000000000010");
    }

    #[test]
    fn allocates_variables_starting_at_sixteen() {
        let src = lines(&["@foo", "M=1", "@bar", "M=1"]);
        let out = assemble(&src).unwrap();
        assert_eq!(out[0], "0000000000010000"); // foo -> 16
        assert_eq!(out[2], "0000000000010001"); // bar -> 17
    }

    #[test]
    fn rejects_invalid_dest_mnemonic() {
        let src = lines(&["@0", "QQQ=D"]);
        let err = assemble(&src).unwrap_err();
        assert!(matches!(err, AssemblerError::InvalidDest { line: 2, .. }));
    }

    #[test]
    fn rejects_invalid_comp_mnemonic() {
        let src = lines(&["@0", "D=Q+1"]);
        let err = assemble(&src).unwrap_err();
        assert!(matches!(err, AssemblerError::InvalidComp { line: 2, .. }));
    }

    #[test]
    fn rejects_out_of_range_constant() {
        let src = lines(&["@32768"]);
        let err = assemble(&src).unwrap_err();
        assert!(matches!(
            err,
            AssemblerError::ConstantOverflow { line: 1, value: 32768 }
        ));
    }

    #[test]
    fn accepts_max_valid_constant() {
        let src = lines(&["@32767"]);
        let out = assemble(&src).unwrap();
        assert_eq!(out[0], "0111111111111111");
    }

    #[test]
    fn rejects_malformed_label() {
        let src = lines(&["(1BAD)"]);
        let err = assemble(&src).unwrap_err();
        assert!(matches!(err, AssemblerError::MalformedLabel { line: 1, .. }));
    }

    #[test]
    fn predefined_symbols_resolve_without_variable_allocation() {
        let src = lines(&["@SCREEN", "M=0", "@foo", "M=1"]);
        let out = assemble(&src).unwrap();
        assert_eq!(out[0], "0100000000000000");
        assert_eq!(out[2], "0000000000010000"); // foo still starts at 16
    }
}
