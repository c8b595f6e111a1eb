//! Memory segments and their addressing shapes.
//!
//! A VM segment resolves to one of three address shapes: `Floating` (base
//! pointer plus offset, for `local`/`argument`/`this`/`that`), `Fixed` (a
//! direct RAM address, for `pointer`/`temp`/`static`), or `Const` (an
//! immediate value, for `constant`, which can only ever be pushed).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Argument,
    Local,
    This,
    That,
    Static,
    Constant,
    Pointer,
    Temp,
}

impl Segment {
    #[must_use]
    pub fn from_str(segment: &str) -> Option<Self> {
        match segment {
            "argument" => Some(Self::Argument),
            "local" => Some(Self::Local),
            "this" => Some(Self::This),
            "that" => Some(Self::That),
            "static" => Some(Self::Static),
            "constant" => Some(Self::Constant),
            "pointer" => Some(Self::Pointer),
            "temp" => Some(Self::Temp),
            _ => None,
        }
    }
}

/// The addressing shape a segment resolves to, given an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// Base pointer symbol (e.g. `"LCL"`) plus an offset applied at runtime.
    Floating { base: &'static str, index: u16 },
    /// A direct RAM address known at translation time.
    Fixed(u16),
    /// An immediate value, valid only as a push source.
    Const(u16),
    /// A per-file static variable symbol, e.g. `"Foo.3"`.
    StaticSymbol(String),
}

impl Segment {
    /// Resolves this segment at `index` to its addressing [`Shape`].
    ///
    /// `module` names the enclosing file for `static`; `pointer` only
    /// accepts `0` (`THIS`) or `1` (`THAT`) and `constant` can never be a
    /// `pop` destination — both are rejected by the caller, not here, since
    /// only the caller knows whether it is pushing or popping.
    #[must_use]
    pub fn resolve(self, index: u16, module: &str) -> Shape {
        match self {
            Self::Argument => Shape::Floating { base: "ARG", index },
            Self::Local => Shape::Floating { base: "LCL", index },
            Self::This => Shape::Floating { base: "THIS", index },
            Self::That => Shape::Floating { base: "THAT", index },
            Self::Temp => Shape::Fixed(5 + index),
            Self::Pointer => Shape::Fixed(3 + index),
            Self::Constant => Shape::Const(index),
            Self::Static => Shape::StaticSymbol(format!("{module}.{index}")),
        }
    }
}
