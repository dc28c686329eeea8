//! # Confluence IR
//!
//! The statement, expression, and control-flow-graph model consumed by
//! the Confluence dataflow engine:
//! - Closed statement and expression kinds as tagged unions with
//!   exhaustive dispatch
//! - Variable types with the trackability predicate used by constant
//!   propagation
//! - A control-flow graph over statements with designated entry/exit
//!   nodes and predecessor/successor queries
//!
//! Building a CFG *from source* is out of scope: the graph is populated
//! explicitly by whatever front end owns the analyzed unit.

pub mod cfg;
pub mod exp;
pub mod stmt;
pub mod types;

pub use cfg::{Cfg, NodeId};
pub use exp::{ArithOp, BinaryExp, BinaryOp, BitwiseOp, ConditionOp, Exp, ShiftOp, UnaryExp};
pub use stmt::{LValue, Stmt};
pub use types::VarType;
