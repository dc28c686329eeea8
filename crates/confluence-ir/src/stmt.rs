//! Statement model
//!
//! Statements form a closed set of kinds. Every statement exposes at
//! most one definition target and an enumerable set of use operands;
//! the concrete analyses dispatch on the kind exhaustively.

use crate::exp::{BinaryExp, Exp, UnaryExp};
use serde::{Deserialize, Serialize};

/// An assignment target.
///
/// Only `Var` counts as a variable definition; field and array-element
/// stores do not define (or kill) a variable, and the variables read to
/// perform the store count as uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LValue {
    /// A simple variable.
    Var(String),
    /// `base.field = ...`
    Field { base: String, field: String },
    /// `base[index] = ...`
    ArrayElem { base: String, index: Exp },
}

impl LValue {
    /// The target as a simple variable, if it is one.
    pub fn as_var(&self) -> Option<&str> {
        match self {
            LValue::Var(name) => Some(name),
            LValue::Field { .. } | LValue::ArrayElem { .. } => None,
        }
    }

    /// Variables read in order to perform the store.
    fn collect_read_vars<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            LValue::Var(_) => {}
            LValue::Field { base, .. } => out.push(base),
            LValue::ArrayElem { base, index } => {
                out.push(base);
                index.collect_vars(out);
            }
        }
    }
}

/// A statement, as a closed set of kinds.
///
/// `Branch`, `Return`, and `Nop` are the "other" kinds: they never
/// update facts in constant propagation but still contribute uses to
/// live variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stmt {
    /// `x = f(...)`; the callee is opaque to the engine.
    Call {
        target: Option<LValue>,
        args: Vec<Exp>,
    },
    /// `x = y`
    Copy { target: LValue, source: Exp },
    /// `x = 1`
    AssignLiteral { target: LValue, value: i32 },
    /// `x = a op b`
    Binary { target: LValue, exp: BinaryExp },
    /// `x = -a`
    Unary { target: LValue, exp: UnaryExp },
    /// Conditional branch; outgoing edges live on the graph.
    Branch { condition: Exp },
    /// `return` with an optional operand.
    Return(Option<Exp>),
    /// No-op; also carried by the synthetic entry and exit nodes.
    Nop,
}

impl Stmt {
    /// The single assignment target of this statement, if any.
    pub fn def(&self) -> Option<&LValue> {
        match self {
            Stmt::Call { target, .. } => target.as_ref(),
            Stmt::Copy { target, .. }
            | Stmt::AssignLiteral { target, .. }
            | Stmt::Binary { target, .. }
            | Stmt::Unary { target, .. } => Some(target),
            Stmt::Branch { .. } | Stmt::Return(_) | Stmt::Nop => None,
        }
    }

    /// Every operand reference in this statement that resolves to a
    /// simple variable, including sub-expressions of a non-variable
    /// assignment target. May contain duplicates.
    pub fn uses(&self) -> Vec<&str> {
        let mut vars = Vec::new();
        if let Some(target) = self.def() {
            target.collect_read_vars(&mut vars);
        }
        match self {
            Stmt::Call { args, .. } => {
                for arg in args {
                    arg.collect_vars(&mut vars);
                }
            }
            Stmt::Copy { source, .. } => source.collect_vars(&mut vars),
            Stmt::AssignLiteral { .. } => {}
            Stmt::Binary { exp, .. } => {
                exp.lhs.collect_vars(&mut vars);
                exp.rhs.collect_vars(&mut vars);
            }
            Stmt::Unary { exp, .. } => exp.operand.collect_vars(&mut vars),
            Stmt::Branch { condition } => condition.collect_vars(&mut vars),
            Stmt::Return(operand) => {
                if let Some(exp) = operand {
                    exp.collect_vars(&mut vars);
                }
            }
            Stmt::Nop => {}
        }
        vars
    }
}
