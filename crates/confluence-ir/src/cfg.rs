//! Control-flow graph over statements
//!
//! The graph is populated explicitly by its owner (a front end, a
//! test); building one from source is out of scope here. Node iteration
//! order is insertion order and is stable across traversals.

use crate::stmt::Stmt;
use indexmap::IndexMap;
use smallvec::SmallVec;
use serde::{Deserialize, Serialize};

/// Unique identifier for a CFG node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone)]
struct NodeData {
    stmt: Stmt,
    predecessors: SmallVec<[NodeId; 2]>,
    successors: SmallVec<[NodeId; 2]>,
}

/// Control-flow graph of one analyzed unit (a function or method body).
///
/// Each node carries a statement; the synthetic entry and exit nodes
/// carry [`Stmt::Nop`]. The formal parameters of the unit are recorded
/// on the graph for analyses that need them for their boundary fact.
#[derive(Debug, Clone)]
pub struct Cfg {
    nodes: IndexMap<NodeId, NodeData>,
    entry: NodeId,
    exit: NodeId,
    params: Vec<String>,
    next_id: usize,
}

impl Cfg {
    /// Create an empty graph with synthetic entry and exit nodes and
    /// the given formal parameters.
    pub fn new(params: Vec<String>) -> Self {
        let mut cfg = Self {
            nodes: IndexMap::new(),
            entry: NodeId(0),
            exit: NodeId(0),
            params,
            next_id: 0,
        };
        cfg.entry = cfg.add_node(Stmt::Nop);
        cfg.exit = cfg.add_node(Stmt::Nop);
        cfg
    }

    /// Chain `stmts` in sequence: entry → s1 → … → sn → exit.
    ///
    /// Returns the graph and the node ids of the chained statements in
    /// order. Convenience for straight-line code.
    pub fn linear(params: Vec<String>, stmts: impl IntoIterator<Item = Stmt>) -> (Self, Vec<NodeId>) {
        let mut cfg = Self::new(params);
        let mut ids = Vec::new();
        let mut prev = cfg.entry;
        for stmt in stmts {
            let id = cfg.add_node(stmt);
            cfg.add_edge(prev, id);
            ids.push(id);
            prev = id;
        }
        let exit = cfg.exit;
        cfg.add_edge(prev, exit);
        (cfg, ids)
    }

    /// Add a node carrying `stmt`, with no edges yet.
    pub fn add_node(&mut self, stmt: Stmt) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            NodeData {
                stmt,
                predecessors: SmallVec::new(),
                successors: SmallVec::new(),
            },
        );
        id
    }

    /// Add a directed edge. Duplicate edges and unknown endpoints are
    /// ignored.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) {
        if let Some(node) = self.nodes.get_mut(&from) {
            if !node.successors.contains(&to) {
                node.successors.push(to);
            }
        }
        if let Some(node) = self.nodes.get_mut(&to) {
            if !node.predecessors.contains(&from) {
                node.predecessors.push(from);
            }
        }
    }

    /// The entry node (boundary of forward analyses).
    pub fn entry(&self) -> NodeId {
        self.entry
    }

    /// The exit node (boundary of backward analyses).
    pub fn exit(&self) -> NodeId {
        self.exit
    }

    /// Formal parameters of the analyzed unit.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// All nodes, in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The statement carried by `node`.
    pub fn stmt(&self, node: NodeId) -> Option<&Stmt> {
        self.nodes.get(&node).map(|data| &data.stmt)
    }

    pub fn predecessors(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(&node)
            .map(|data| data.predecessors.as_slice())
            .unwrap_or(&[])
    }

    pub fn successors(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(&node)
            .map(|data| data.successors.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exp::Exp;
    use crate::stmt::LValue;

    #[test]
    fn test_new_graph_has_entry_and_exit() {
        let cfg = Cfg::new(vec!["p".to_string()]);
        assert_eq!(cfg.node_count(), 2);
        assert!(matches!(cfg.stmt(cfg.entry()), Some(Stmt::Nop)));
        assert!(matches!(cfg.stmt(cfg.exit()), Some(Stmt::Nop)));
        assert_eq!(cfg.params(), ["p".to_string()]);
    }

    #[test]
    fn test_add_edge_is_idempotent() {
        let mut cfg = Cfg::new(vec![]);
        let (entry, exit) = (cfg.entry(), cfg.exit());
        cfg.add_edge(entry, exit);
        cfg.add_edge(entry, exit);
        assert_eq!(cfg.successors(entry), [exit]);
        assert_eq!(cfg.predecessors(exit), [entry]);
    }

    #[test]
    fn test_linear_chains_statements() {
        let stmts = vec![
            Stmt::AssignLiteral {
                target: LValue::Var("a".to_string()),
                value: 1,
            },
            Stmt::Return(Some(Exp::var("a"))),
        ];
        let (cfg, nodes) = Cfg::linear(vec![], stmts);

        assert_eq!(nodes.len(), 2);
        assert_eq!(cfg.successors(cfg.entry()), [nodes[0]]);
        assert_eq!(cfg.successors(nodes[0]), [nodes[1]]);
        assert_eq!(cfg.successors(nodes[1]), [cfg.exit()]);
        assert_eq!(cfg.predecessors(nodes[1]), [nodes[0]]);
    }

    #[test]
    fn test_node_iteration_is_stable() {
        let mut cfg = Cfg::new(vec![]);
        let a = cfg.add_node(Stmt::Nop);
        let b = cfg.add_node(Stmt::Nop);
        let first: Vec<_> = cfg.nodes().collect();
        let second: Vec<_> = cfg.nodes().collect();
        assert_eq!(first, second);
        assert_eq!(first, vec![cfg.entry(), cfg.exit(), a, b]);
    }

    #[test]
    fn test_queries_on_unknown_node_are_empty() {
        let cfg = Cfg::new(vec![]);
        let ghost = NodeId(99);
        assert!(cfg.stmt(ghost).is_none());
        assert!(cfg.predecessors(ghost).is_empty());
        assert!(cfg.successors(ghost).is_empty());
    }
}
