//! The Kal abstract syntax tree.
//!
//! Two node families: expressions yield a value, statements do not have to.
//! An expression used in statement position travels as [`Stmt::Expr`]. The
//! tree is strict; a node owns its children.

use std::fmt;

/// Name of the synthetic function a top-level expression is wrapped in.
pub const ANON_FN: &str = "__anon_expr";

/// The closed universe of Kal types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarType {
    /// 64-bit IEEE float.
    Double,
    /// 8-bit integer.
    Byte,
    /// 1-bit integer.
    Bool,
    /// Pointer to byte.
    BytePtr,
}

impl VarType {
    /// Parse a source-level type name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "double" => Some(VarType::Double),
            "byte" => Some(VarType::Byte),
            "bool" => Some(VarType::Bool),
            "byte_ptr" => Some(VarType::BytePtr),
            _ => None,
        }
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarType::Double => write!(f, "double"),
            VarType::Byte => write!(f, "byte"),
            VarType::Bool => write!(f, "bool"),
            VarType::BytePtr => write!(f, "byte_ptr"),
        }
    }
}

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Integer literal like `42`.
    IntLit(i64),
    /// Floating literal like `1.0`.
    FpLit(f64),
    /// String literal, already decoded to raw bytes.
    StrLit(Vec<u8>),
    /// Reference to a named local.
    Variable(String),
    /// `&x` (address-of) or `*p` (dereference).
    Unary { op: u8, operand: Box<Expr> },
    /// `lhs op rhs`; `op` is the operator's ASCII byte, `=` included.
    Binary { op: u8, lhs: Box<Expr>, rhs: Box<Expr> },
    /// `callee(arg, ...)`.
    Call { callee: String, args: Vec<Expr> },
}

/// A statement node.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `var name type (= init)?`; zero-initialised when `init` is absent.
    VarDecl {
        name: String,
        ty: VarType,
        init: Option<Expr>,
    },
    /// `if cond then stmt else stmt`; both branches are required.
    If {
        cond: Expr,
        then_stmt: Box<Stmt>,
        else_stmt: Box<Stmt>,
    },
    /// `for var = start, end (, step)? body`.
    For {
        var: String,
        start: Expr,
        end: Expr,
        step: Expr,
        body: Box<Stmt>,
    },
    /// `{ stmt; ... }`.
    Block(Vec<Stmt>),
    /// `return expr`.
    Return(Expr),
    /// An expression in statement position.
    Expr(Expr),
}

/// A function signature: name, return type, and typed parameter list.
#[derive(Debug, Clone, PartialEq)]
pub struct Prototype {
    pub name: String,
    pub ret: VarType,
    pub params: Vec<(String, VarType)>,
}

/// A function definition. Codegen consumes the prototype, so generating code
/// for a definition happens at most once.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub proto: Prototype,
    pub body: Stmt,
}

// ═══════════════════════════════════════════════════════════════════
// Pretty-printing back to Kal syntax
// ═══════════════════════════════════════════════════════════════════

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::IntLit(v) => write!(f, "{v}"),
            Expr::FpLit(v) => {
                // Keep the dot so the literal re-lexes as floating point.
                if v.fract() == 0.0 && v.is_finite() {
                    write!(f, "{v:.1}")
                } else {
                    write!(f, "{v}")
                }
            }
            Expr::StrLit(bytes) => {
                let printable = bytes
                    .iter()
                    .all(|&b| (0x20..0x7f).contains(&b) && b != b'"' && b != b'\\');
                if printable {
                    write!(f, "\"{}\"", String::from_utf8_lossy(bytes))
                } else {
                    write!(f, "\"\\x")?;
                    for b in bytes {
                        write!(f, "{b:02X}")?;
                    }
                    write!(f, "\"")
                }
            }
            Expr::Variable(name) => write!(f, "{name}"),
            Expr::Unary { op, operand } => write!(f, "{}{operand}", *op as char),
            Expr::Binary { op, lhs, rhs } => write!(f, "({lhs}{}{rhs})", *op as char),
            Expr::Call { callee, args } => {
                write!(f, "{callee}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::VarDecl { name, ty, init } => {
                write!(f, "var {name} {ty}")?;
                if let Some(init) = init {
                    write!(f, " = {init}")?;
                }
                Ok(())
            }
            Stmt::If { cond, then_stmt, else_stmt } => {
                write!(f, "if {cond} then {then_stmt} else {else_stmt}")
            }
            Stmt::For { var, start, end, step, body } => {
                write!(f, "for {var} = {start}, {end}, {step} {body}")
            }
            Stmt::Block(stmts) => {
                writeln!(f, "{{")?;
                for stmt in stmts {
                    writeln!(f, "{stmt};")?;
                }
                write!(f, "}}")
            }
            Stmt::Return(expr) => write!(f, "return {expr}"),
            Stmt::Expr(expr) => write!(f, "{expr}"),
        }
    }
}

impl fmt::Display for Prototype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}(", self.ret, self.name)?;
        for (i, (name, ty)) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{ty} {name}")?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for FunctionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "def {} {}", self.proto, self.body)
    }
}
