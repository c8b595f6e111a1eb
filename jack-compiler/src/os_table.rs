//! The fixed nand2tetris standard-library signature table.
//!
//! Ported from `Generator.py::SymTable.OS`: every standard-library class's
//! methods, arities, and subroutine kinds, used to seed the subroutine
//! table and to check conformance when a user class shadows one of these
//! names. Keyed as `"Class.method"` so the whole table is one flat PHF
//! map rather than a map-of-maps.

use phf::phf_map;

use crate::ast::SubroutineKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OsSignature {
    pub kind: SubroutineKind,
    pub arity: u8,
}

pub const OS_CLASS_NAMES: &[&str] = &[
    "Math", "String", "Array", "Output", "Screen", "Keyboard", "Memory", "Sys",
];

static OS_SIGNATURES: phf::Map<&'static str, OsSignature> = phf_map! {
    "Math.init" => OsSignature { kind: SubroutineKind::Function, arity: 0 },
    "Math.abs" => OsSignature { kind: SubroutineKind::Function, arity: 1 },
    "Math.multiply" => OsSignature { kind: SubroutineKind::Function, arity: 2 },
    "Math.divide" => OsSignature { kind: SubroutineKind::Function, arity: 2 },
    "Math.min" => OsSignature { kind: SubroutineKind::Function, arity: 2 },
    "Math.max" => OsSignature { kind: SubroutineKind::Function, arity: 2 },
    "Math.sqrt" => OsSignature { kind: SubroutineKind::Function, arity: 1 },

    "String.new" => OsSignature { kind: SubroutineKind::Constructor, arity: 1 },
    "String.dispose" => OsSignature { kind: SubroutineKind::Method, arity: 0 },
    "String.length" => OsSignature { kind: SubroutineKind::Method, arity: 0 },
    "String.charAt" => OsSignature { kind: SubroutineKind::Method, arity: 1 },
    "String.setCharAt" => OsSignature { kind: SubroutineKind::Method, arity: 2 },
    "String.appendChar" => OsSignature { kind: SubroutineKind::Method, arity: 1 },
    "String.eraseLastChar" => OsSignature { kind: SubroutineKind::Method, arity: 0 },
    "String.intValue" => OsSignature { kind: SubroutineKind::Method, arity: 0 },
    "String.setInt" => OsSignature { kind: SubroutineKind::Method, arity: 1 },
    "String.backSpace" => OsSignature { kind: SubroutineKind::Function, arity: 0 },
    "String.doubleQuote" => OsSignature { kind: SubroutineKind::Function, arity: 0 },
    "String.newLine" => OsSignature { kind: SubroutineKind::Function, arity: 0 },

    "Array.new" => OsSignature { kind: SubroutineKind::Function, arity: 1 },
    "Array.dispose" => OsSignature { kind: SubroutineKind::Method, arity: 0 },

    "Output.init" => OsSignature { kind: SubroutineKind::Function, arity: 0 },
    "Output.moveCursor" => OsSignature { kind: SubroutineKind::Function, arity: 2 },
    "Output.printChar" => OsSignature { kind: SubroutineKind::Function, arity: 1 },
    "Output.printString" => OsSignature { kind: SubroutineKind::Function, arity: 1 },
    "Output.printInt" => OsSignature { kind: SubroutineKind::Function, arity: 1 },
    "Output.println" => OsSignature { kind: SubroutineKind::Function, arity: 0 },
    "Output.backSpace" => OsSignature { kind: SubroutineKind::Function, arity: 0 },

    "Screen.init" => OsSignature { kind: SubroutineKind::Function, arity: 0 },
    "Screen.clearScreen" => OsSignature { kind: SubroutineKind::Function, arity: 0 },
    "Screen.setColor" => OsSignature { kind: SubroutineKind::Function, arity: 1 },
    "Screen.drawPixel" => OsSignature { kind: SubroutineKind::Function, arity: 2 },
    "Screen.drawLine" => OsSignature { kind: SubroutineKind::Function, arity: 4 },
    "Screen.drawRectangle" => OsSignature { kind: SubroutineKind::Function, arity: 4 },
    "Screen.drawCircle" => OsSignature { kind: SubroutineKind::Function, arity: 3 },

    "Keyboard.init" => OsSignature { kind: SubroutineKind::Function, arity: 0 },
    "Keyboard.keyPressed" => OsSignature { kind: SubroutineKind::Function, arity: 0 },
    "Keyboard.readChar" => OsSignature { kind: SubroutineKind::Function, arity: 0 },
    "Keyboard.readLine" => OsSignature { kind: SubroutineKind::Function, arity: 1 },
    "Keyboard.readInt" => OsSignature { kind: SubroutineKind::Function, arity: 1 },

    "Memory.init" => OsSignature { kind: SubroutineKind::Function, arity: 0 },
    "Memory.peek" => OsSignature { kind: SubroutineKind::Function, arity: 1 },
    "Memory.poke" => OsSignature { kind: SubroutineKind::Function, arity: 2 },
    "Memory.alloc" => OsSignature { kind: SubroutineKind::Function, arity: 1 },
    "Memory.deAlloc" => OsSignature { kind: SubroutineKind::Function, arity: 1 },

    "Sys.init" => OsSignature { kind: SubroutineKind::Function, arity: 0 },
    "Sys.halt" => OsSignature { kind: SubroutineKind::Function, arity: 0 },
    "Sys.error" => OsSignature { kind: SubroutineKind::Function, arity: 1 },
    "Sys.wait" => OsSignature { kind: SubroutineKind::Function, arity: 1 },
};

#[must_use]
pub fn is_os_class(name: &str) -> bool {
    OS_CLASS_NAMES.contains(&name)
}

#[must_use]
pub fn lookup(class: &str, method: &str) -> Option<OsSignature> {
    OS_SIGNATURES.get(&format!("{class}.{method}")).copied()
}

/// Every `(method, signature)` pair declared for `class`, used to check
/// conformance when a user class shares an OS class's name.
#[must_use]
pub fn signatures_for(class: &str) -> Vec<(&'static str, OsSignature)> {
    let prefix = format!("{class}.");
    OS_SIGNATURES
        .entries()
        .filter_map(|(k, v)| k.strip_prefix(prefix.as_str()).map(|m| (m, *v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_known_signatures() {
        let sig = lookup("Math", "multiply").unwrap();
        assert_eq!(sig.arity, 2);
        assert_eq!(sig.kind, SubroutineKind::Function);
    }

    #[test]
    fn string_new_is_a_constructor() {
        let sig = lookup("String", "new").unwrap();
        assert_eq!(sig.kind, SubroutineKind::Constructor);
    }

    #[test]
    fn unknown_method_is_none() {
        assert!(lookup("Math", "frobnicate").is_none());
    }

    #[test]
    fn signatures_for_lists_every_method() {
        let sigs = signatures_for("Memory");
        assert_eq!(sigs.len(), 5);
    }

    #[test]
    fn recognizes_os_class_names() {
        assert!(is_os_class("Sys"));
        assert!(!is_os_class("Foo"));
    }
}
