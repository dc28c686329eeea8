//! Classic live variable analysis
//!
//! Backward may-analysis over sets of variables: a variable is live at
//! a point if some path from there to the exit reads it before
//! redefining it. Meet is set union; the boundary fact at the exit is
//! the empty set.

use crate::fact::SetFact;
use crate::solver::{DataflowAnalysis, Direction};
use confluence_ir::{Cfg, LValue, Stmt};

#[derive(Debug, Default)]
pub struct LiveVariables;

impl LiveVariables {
    pub fn new() -> Self {
        LiveVariables
    }
}

impl DataflowAnalysis for LiveVariables {
    type Fact = SetFact<String>;

    fn direction(&self) -> Direction {
        Direction::Backward
    }

    fn boundary_fact(&self, _cfg: &Cfg) -> SetFact<String> {
        // Nothing is live after the exit.
        SetFact::new()
    }

    fn initial_fact(&self) -> SetFact<String> {
        SetFact::new()
    }

    fn meet_into(&self, source: &SetFact<String>, target: &mut SetFact<String>) {
        target.union_with(source);
    }

    /// `IN = (OUT \ def) ∪ uses`, where the definition only kills when
    /// the target is a simple variable; field and array-element targets
    /// kill nothing and their components count as uses.
    fn transfer(&self, stmt: &Stmt, input: &SetFact<String>) -> SetFact<String> {
        let mut live = input.clone();
        if let Some(name) = stmt.def().and_then(LValue::as_var) {
            live.remove(name);
        }
        for used in stmt.uses() {
            live.insert(used.to_string());
        }
        live
    }
}
