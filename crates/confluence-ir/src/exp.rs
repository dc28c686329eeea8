//! Expression model
//!
//! Expressions are a closed set of kinds dispatched with exhaustive
//! pattern matching, so adding a kind is a compile error at every match
//! site rather than a silent fallthrough.

use serde::{Deserialize, Serialize};

/// An expression appearing on the right-hand side of a statement or as
/// an operand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Exp {
    /// Integer literal.
    IntLiteral(i32),
    /// Reference to a simple variable.
    Var(String),
    /// Binary operation.
    Binary(BinaryExp),
    /// Arithmetic negation.
    Unary(UnaryExp),
    /// Field loads, array loads, and anything else the engine does not
    /// model; evaluates conservatively.
    Opaque,
}

impl Exp {
    /// Convenience constructor for a variable reference.
    pub fn var(name: impl Into<String>) -> Exp {
        Exp::Var(name.into())
    }

    /// Convenience constructor for `lhs op rhs`.
    pub fn binary(op: BinaryOp, lhs: Exp, rhs: Exp) -> Exp {
        Exp::Binary(BinaryExp {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    /// Convenience constructor for `-operand`.
    pub fn neg(operand: Exp) -> Exp {
        Exp::Unary(UnaryExp {
            operand: Box::new(operand),
        })
    }

    /// Simple-variable references in this expression, in syntactic order.
    pub fn vars(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_vars(&mut out);
        out
    }

    pub(crate) fn collect_vars<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Exp::Var(name) => out.push(name),
            Exp::Binary(exp) => {
                exp.lhs.collect_vars(out);
                exp.rhs.collect_vars(out);
            }
            Exp::Unary(exp) => exp.operand.collect_vars(out),
            Exp::IntLiteral(_) | Exp::Opaque => {}
        }
    }
}

/// A binary operation with operand sub-expressions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryExp {
    pub op: BinaryOp,
    pub lhs: Box<Exp>,
    pub rhs: Box<Exp>,
}

/// Arithmetic negation of a single operand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnaryExp {
    pub operand: Box<Exp>,
}

/// Binary operators grouped by family, each family its own closed enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Shift(ShiftOp),
    Condition(ConditionOp),
    Bitwise(BitwiseOp),
    Arithmetic(ArithOp),
}

/// Shift operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShiftOp {
    /// `<<`
    Shl,
    /// `>>` (sign-extending)
    Shr,
    /// `>>>` (zero-extending)
    Ushr,
}

/// Comparison operators; results are the integers 1 and 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

/// Bitwise operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BitwiseOp {
    Or,
    And,
    Xor,
}

/// Arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}
