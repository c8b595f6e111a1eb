//! AST entities produced by the parser.
//!
//! Ported 1:1 in shape from the original's `NamedTuple`-based AST: a
//! tagged sum type per production, each node carrying the source line of
//! its head token. `Expr{terms, ops}` is the one invariant worth calling
//! out explicitly: `terms.len() == ops.len() + 1`, and operators are
//! evaluated strictly left-to-right with no precedence. This is a
//! deliberate property of the language, not a gap to fix.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    pub text: String,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Int,
    Char,
    Boolean,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeTag {
    Primitive(Primitive),
    Class(Name),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnType {
    Void,
    Value(TypeTag),
}

/// A grouped declaration: one type, one or more names sharing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decl {
    pub ty: TypeTag,
    pub names: Vec<Name>,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarScope {
    Field,
    Static,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassVar {
    pub scope: VarScope,
    pub decl: Decl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubroutineKind {
    Constructor,
    Function,
    Method,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub ty: TypeTag,
    pub name: Name,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subroutine {
    pub kind: SubroutineKind,
    pub return_type: ReturnType,
    pub name: Name,
    pub params: Vec<Param>,
    pub locals: Vec<Decl>,
    pub body: Vec<Statement>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Class {
    pub module: String,
    pub name: Name,
    pub class_vars: Vec<ClassVar>,
    pub subroutines: Vec<Subroutine>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LValue {
    Var(Name),
    Subscript(Name, Box<Expr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetStmt {
    pub target: LValue,
    pub value: Expr,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoStmt {
    pub call: Call,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_branch: Vec<Statement>,
    pub else_branch: Option<Vec<Statement>>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: Vec<Statement>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Let(LetStmt),
    Do(DoStmt),
    If(IfStmt),
    While(WhileStmt),
    Return(ReturnStmt),
}

impl Statement {
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            Self::Let(s) => s.line,
            Self::Do(s) => s.line,
            Self::If(s) => s.line,
            Self::While(s) => s.line,
            Self::Return(s) => s.line,
        }
    }
}

/// `names` is length 1 (`F(...)`) or 2 (`C.F(...)`); which shape it is
/// drives call resolution in `symtab::check_call`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub names: Vec<Name>,
    pub params: Vec<Expr>,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
    Lt,
    Gt,
    Eq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstLit {
    Int(u16),
    Str(String),
    True,
    False,
    Null,
    This,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermInner {
    Const(ConstLit),
    Var(Name),
    Subscript(Name, Box<Expr>),
    Call(Call),
    Grouped(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub unary: Option<UnaryOp>,
    pub inner: TermInner,
    pub line: usize,
}

/// `terms.len() == ops.len() + 1`. No operator precedence: evaluation is
/// strictly left-to-right, term by term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub terms: Vec<Term>,
    pub ops: Vec<BinOp>,
}
