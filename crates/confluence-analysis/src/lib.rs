//! # Confluence
//!
//! A direction-agnostic monotone dataflow engine over a control-flow
//! graph, with two shipped analyses:
//! - **Constant propagation**: forward, over a flat integer value
//!   lattice ([`constprop`])
//! - **Live variables**: backward, over a variable-set lattice
//!   ([`livevar`])
//!
//! The [`solver::FixpointSolver`] owns a per-solve IN/OUT fact store
//! and repeats full sweeps of meet + transfer over all nodes until no
//! fact changes. Termination follows from finite lattice height plus
//! monotone meet/transfer; both are obligations of the
//! [`solver::DataflowAnalysis`] implementor.
//!
//! ```
//! use confluence_analysis::{ConstantPropagation, FixpointSolver, Value};
//! use confluence_ir::{Cfg, LValue, Stmt, VarType};
//! use std::collections::HashMap;
//!
//! let (cfg, nodes) = Cfg::linear(
//!     vec![],
//!     vec![Stmt::AssignLiteral { target: LValue::Var("a".into()), value: 1 }],
//! );
//! let types = HashMap::from([("a".to_string(), VarType::Int)]);
//! let result = FixpointSolver::solve(&ConstantPropagation::new(types), &cfg).unwrap();
//! assert_eq!(result.out_fact(nodes[0]).unwrap().get("a"), Value::Const(1));
//! ```

pub mod constprop;
pub mod fact;
pub mod livevar;
pub mod solver;

pub use constprop::{evaluate, ConstFact, ConstantPropagation, Value};
pub use fact::SetFact;
pub use livevar::LiveVariables;
pub use solver::{DataflowAnalysis, DataflowResult, Direction, FixpointSolver, SolveError};
