//! Analysis contract and iterative fixpoint engine

use confluence_ir::{Cfg, NodeId, Stmt};
use std::collections::HashMap;
use thiserror::Error;

/// Direction of a dataflow analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// The per-analysis contract driving the solver.
///
/// Obligations on the implementor: `meet_into` must be commutative,
/// associative, and idempotent, and `transfer` must be monotone in its
/// input. Together with a finite-height fact lattice these bound the
/// total number of per-node updates by `nodes × height` and guarantee
/// the solver reaches the unique least fixpoint.
pub trait DataflowAnalysis {
    /// The fact attached to each node's IN and OUT positions.
    type Fact: Clone + PartialEq;

    fn direction(&self) -> Direction;

    /// Fact for the boundary node: entry for forward analyses, exit
    /// for backward ones.
    fn boundary_fact(&self, cfg: &Cfg) -> Self::Fact;

    /// Bottom of the fact lattice; every non-boundary node starts here.
    fn initial_fact(&self) -> Self::Fact;

    /// Fold `source` into `target`: `target = meet(target, source)`.
    fn meet_into(&self, source: &Self::Fact, target: &mut Self::Fact);

    /// Recompute the flow-consuming fact of a statement from `input`
    /// (the IN fact for forward analyses, the OUT fact for backward).
    ///
    /// Pure: returns a fresh fact and never mutates stored state. The
    /// solver detects change by value equality against the previously
    /// stored fact.
    fn transfer(&self, stmt: &Stmt, input: &Self::Fact) -> Self::Fact;
}

/// IN/OUT facts per node; the sole state carried between sweeps and the
/// sole output of a solve.
#[derive(Debug, Clone, PartialEq)]
pub struct DataflowResult<F> {
    in_facts: HashMap<NodeId, F>,
    out_facts: HashMap<NodeId, F>,
    /// Completed sweeps, including the final no-change sweep.
    pub passes: usize,
}

impl<F> DataflowResult<F> {
    fn new() -> Self {
        Self {
            in_facts: HashMap::new(),
            out_facts: HashMap::new(),
            passes: 0,
        }
    }

    pub fn in_fact(&self, node: NodeId) -> Option<&F> {
        self.in_facts.get(&node)
    }

    pub fn out_fact(&self, node: NodeId) -> Option<&F> {
        self.out_facts.get(&node)
    }

    pub fn set_in_fact(&mut self, node: NodeId, fact: F) {
        self.in_facts.insert(node, fact);
    }

    pub fn set_out_fact(&mut self, node: NodeId, fact: F) {
        self.out_facts.insert(node, fact);
    }
}

impl<F> Default for DataflowResult<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Sweep-count guard; a monotone analysis over a finite-height lattice
/// converges in at most `nodes × height` sweeps, far below this.
const MAX_PASSES: usize = 10_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SolveError {
    /// The sweep guard tripped. Only a non-monotone meet/transfer pair
    /// (or an unbounded fact lattice) can cause this.
    #[error("no fixpoint after {passes} sweeps; meet/transfer is likely non-monotone")]
    Diverged { passes: usize },
}

/// Iterative fixpoint solver.
///
/// Each sweep visits every node in graph order, folds the relevant
/// neighbor facts into a fresh fact, stores it, applies the transfer
/// function, and records whether the transferred side changed. Sweeps
/// repeat while the previous one changed at least one node.
///
/// A sweep may consume neighbor facts recomputed earlier in the same
/// sweep (accelerated iteration). That only speeds convergence; the
/// fixpoint reached is the same as with previous-sweep snapshots.
pub struct FixpointSolver;

impl FixpointSolver {
    pub fn solve<A: DataflowAnalysis>(
        analysis: &A,
        cfg: &Cfg,
    ) -> Result<DataflowResult<A::Fact>, SolveError> {
        match analysis.direction() {
            Direction::Forward => Self::solve_forward(analysis, cfg),
            Direction::Backward => Self::solve_backward(analysis, cfg),
        }
    }

    fn solve_forward<A: DataflowAnalysis>(
        analysis: &A,
        cfg: &Cfg,
    ) -> Result<DataflowResult<A::Fact>, SolveError> {
        let mut result = DataflowResult::new();
        for node in cfg.nodes() {
            result.set_in_fact(node, analysis.initial_fact());
            result.set_out_fact(node, analysis.initial_fact());
        }
        result.set_in_fact(cfg.entry(), analysis.boundary_fact(cfg));

        let mut passes = 0;
        let mut changed = true;
        while changed {
            changed = false;
            passes += 1;
            if passes > MAX_PASSES {
                return Err(SolveError::Diverged { passes: MAX_PASSES });
            }
            let mut updated = 0usize;
            for node in cfg.nodes() {
                // IN[n] = meet over preds of OUT[p], seeded with the
                // boundary fact at the entry.
                let mut input = if node == cfg.entry() {
                    analysis.boundary_fact(cfg)
                } else {
                    analysis.initial_fact()
                };
                for &pred in cfg.predecessors(node) {
                    if let Some(fact) = result.out_fact(pred) {
                        analysis.meet_into(fact, &mut input);
                    }
                }

                let stmt = match cfg.stmt(node) {
                    Some(stmt) => stmt,
                    None => continue,
                };
                let output = analysis.transfer(stmt, &input);
                if result.out_fact(node) != Some(&output) {
                    changed = true;
                    updated += 1;
                }
                result.set_in_fact(node, input);
                result.set_out_fact(node, output);
            }
            tracing::debug!(pass = passes, updated, "forward fixpoint sweep");
        }

        result.passes = passes;
        Ok(result)
    }

    fn solve_backward<A: DataflowAnalysis>(
        analysis: &A,
        cfg: &Cfg,
    ) -> Result<DataflowResult<A::Fact>, SolveError> {
        let mut result = DataflowResult::new();
        for node in cfg.nodes() {
            result.set_in_fact(node, analysis.initial_fact());
            result.set_out_fact(node, analysis.initial_fact());
        }
        result.set_out_fact(cfg.exit(), analysis.boundary_fact(cfg));

        let mut passes = 0;
        let mut changed = true;
        while changed {
            changed = false;
            passes += 1;
            if passes > MAX_PASSES {
                return Err(SolveError::Diverged { passes: MAX_PASSES });
            }
            let mut updated = 0usize;
            for node in cfg.nodes() {
                // OUT[n] = meet over succs of IN[s], seeded with the
                // boundary fact at the exit.
                let mut output = if node == cfg.exit() {
                    analysis.boundary_fact(cfg)
                } else {
                    analysis.initial_fact()
                };
                for &succ in cfg.successors(node) {
                    if let Some(fact) = result.in_fact(succ) {
                        analysis.meet_into(fact, &mut output);
                    }
                }

                let stmt = match cfg.stmt(node) {
                    Some(stmt) => stmt,
                    None => continue,
                };
                let input = analysis.transfer(stmt, &output);
                if result.in_fact(node) != Some(&input) {
                    changed = true;
                    updated += 1;
                }
                result.set_out_fact(node, output);
                result.set_in_fact(node, input);
            }
            tracing::debug!(pass = passes, updated, "backward fixpoint sweep");
        }

        result.passes = passes;
        Ok(result)
    }
}
