use fxhash::FxHashSet;
use std::io::{self, Write};
use crate::cust_error::ProcessingError;
use crate::graph::{Edge, Graph};

/// A set of vertices computed by one of the heuristics.
#[derive(Debug, Eq, PartialEq, Clone, Default)]
pub struct Cover {
    nodes: FxHashSet<usize>,
}

impl Cover {

    /// Adds `node` to the cover. Returns `false` if it was already contained.
    pub(crate) fn insert(&mut self, node: usize) -> bool {
        self.nodes.insert(node)
    }

    pub fn contains(&self, node: usize) -> bool {
        self.nodes.contains(&node)
    }

    /// Checks if `edge` has at least one endpoint in `self`.
    pub fn covers_edge(&self, edge: &Edge) -> bool {
        self.contains(edge.0) || self.contains(edge.1)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item=usize> + '_ {
        self.nodes.iter().copied()
    }

    /// Returns the nodes in ascending order.
    pub fn sorted(&self) -> Vec<usize> {
        let mut nodes: Vec<usize> = self.iter().collect();
        nodes.sort_unstable();
        nodes
    }

    /// Checks if every edge in `edges` has an endpoint in `self`.
    pub fn covers(&self, edges: &[Edge]) -> bool {
        edges.iter().all(|edge| self.covers_edge(edge))
    }

    /// Returns an error naming the first edge of `graph` that `self` misses.
    pub fn validate(&self, graph: &Graph) -> Result<(), ProcessingError> {
        match graph.edges().iter().find(|edge| !self.covers_edge(edge)) {
            Some(Edge(left, right)) => Err(ProcessingError::InvalidSolution(
                format!("edge ({}, {}) is not covered", left, right))),
            None => Ok(()),
        }
    }
}

impl FromIterator<usize> for Cover {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Cover { nodes: iter.into_iter().collect() }
    }
}

impl Cover {

    /// Writes the ascending, comma separated nodes followed by a tab and the cover size.
    pub fn write_solution<W: Write>(&self, mut out: W) -> Result<(), io::Error> {
        let nodes: Vec<String> = self.sorted().iter().map(|node| node.to_string()).collect();
        writeln!(out, "{}\t{}", nodes.join(","), self.len())
    }
}
