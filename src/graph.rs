//! Implementation of the input graph as a plain edge list, and of the shrinking adjacency view
//! that the degree based heuristics consume.

use fxhash::{FxHashMap, FxHashSet};
use rand::{Rng, RngCore};
use std::cmp::Reverse;
use std::io::{self, BufRead, Write};
use tracing::debug;
use crate::cust_error::ImportError;

/// An undirected edge between two vertex ids. `Edge(v, v)` is a self-loop.
#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash)]
pub struct Edge(pub usize, pub usize);

impl Edge {

    pub fn is_loop(&self) -> bool {
        self.0 == self.1
    }
}

impl From<(usize, usize)> for Edge {
    fn from((left, right): (usize, usize)) -> Self {
        Edge(left, right)
    }
}

/// An undirected graph given by its edges in input order. Vertices are implied by the edges.
#[derive(Debug, Eq, PartialEq, Clone, Default)]
pub struct Graph {
    edges: Vec<Edge>,
}

impl Graph {

    /// Creates a graph from `edges`. Duplicates and self-loops are kept as they are.
    pub fn new(edges: Vec<Edge>) -> Self {
        Graph { edges }
    }

    /// Returns the edges in input order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Returns the largest vertex id, or `None` if `self` has no edges.
    pub fn max_id(&self) -> Option<usize> {
        self.edges.iter().map(|e| e.0.max(e.1)).max()
    }

    /// Returns every vertex that appears in at least one edge.
    pub fn nodes(&self) -> FxHashSet<usize> {
        self.edges.iter().flat_map(|e| [e.0, e.1]).collect()
    }

    /// Builds a fresh adjacency view of `self`.
    pub fn adjacency(&self) -> AdjView {
        AdjView::from_edges(&self.edges)
    }
}

impl FromIterator<(usize, usize)> for Graph {
    fn from_iter<I: IntoIterator<Item = (usize, usize)>>(iter: I) -> Self {
        Graph::new(iter.into_iter().map(Edge::from).collect())
    }
}

impl Graph {

    /// Reads an edge list with one `left<TAB>right` pair per line. Blank lines are skipped.
    /// The first malformed line aborts the import.
    pub fn read_edges<R: BufRead>(input: R) -> Result<Self, ImportError> {
        let mut edges = Vec::new();
        for (idx, line) in input.lines().enumerate() {
            let line = line?;
            let line_no = idx + 1;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue
            }
            let mut s = line.split('\t');
            let left = s.next().ok_or(ImportError::MissingSeparator { line: line_no })?;
            let right = s.next().ok_or(ImportError::MissingSeparator { line: line_no })?;
            if s.next().is_some() {
                return Err(ImportError::TrailingToken { line: line_no });
            }
            edges.push(Edge(parse_id(left, line_no)?, parse_id(right, line_no)?));
        }
        debug!(edges = edges.len(), "read edge list");
        Ok(Graph { edges })
    }

    /// Writes `self` in the format accepted by `Graph::read_edges`.
    pub fn write_edges<W: Write>(&self, mut out: W) -> Result<(), io::Error> {
        for Edge(left, right) in &self.edges {
            writeln!(out, "{}\t{}", left, right)?;
        }
        out.flush()
    }
}

fn parse_id(token: &str, line: usize) -> Result<usize, ImportError> {
    token.trim().parse().map_err(|source| ImportError::BadInt {
        line,
        token: token.to_owned(),
        source,
    })
}

/// Per-run adjacency view that shrinks while a cover is built.
///
/// Every node kept in the view has at least one neighbor: deleting a node prunes all neighbors
/// that are left without edges. Hence the view is empty exactly when all edges are covered.
/// Nodes are keyed by id, so sparse or huge ids cost no more than dense ones.
#[derive(Debug, Eq, PartialEq, Clone, Default)]
pub struct AdjView {
    adj_list: FxHashMap<usize, FxHashSet<usize>>,
    /// Alive nodes in arbitrary order, for uniform sampling.
    alive: Vec<usize>,
    /// Index of each alive node in `alive`.
    position: FxHashMap<usize, usize>,
}

// Static functions
impl AdjView {

    /// Builds the symmetric adjacency view of `edges`. Parallel edges collapse into one.
    pub fn from_edges(edges: &[Edge]) -> Self {
        let mut adj_list: FxHashMap<usize, FxHashSet<usize>> = FxHashMap::default();
        for &Edge(left, right) in edges {
            adj_list.entry(left).or_default().insert(right);
            adj_list.entry(right).or_default().insert(left);
        }
        // Sorted, so sampling does not depend on the map's iteration order.
        let mut alive: Vec<usize> = adj_list.keys().copied().collect();
        alive.sort_unstable();
        let position = alive.iter().enumerate().map(|(idx, node)| (*node, idx)).collect();
        AdjView {
            adj_list,
            alive,
            position,
        }
    }

    /// Returns an `Iterator` over all nodes that have not yet been deleted.
    pub fn nodes(&self) -> impl Iterator<Item=usize> + '_ {
        self.alive.iter().copied()
    }

    /// Returns the number of nodes of `self`.
    pub fn num_nodes(&self) -> usize {
        self.alive.len()
    }

    /// Checks if `self` is empty (holds no undeleted nodes).
    pub fn is_empty(&self) -> bool {
        self.alive.is_empty()
    }

    /// Returns the neighborhood of `node`, or `None` if `node` was deleted or never existed.
    pub fn neighbors(&self, node: usize) -> Option<&FxHashSet<usize>> {
        self.adj_list.get(&node)
    }

    /// Returns the degree of `node`, or `None` if `node` was deleted. A self-loop counts once.
    pub fn degree(&self, node: usize) -> Option<usize> {
        self.neighbors(node).map(|neighbors| neighbors.len())
    }

    /// Returns the node with the highest degree. Ties go to the lowest id.
    pub fn max_degree_node(&self) -> Option<usize> {
        self.nodes()
            .max_by_key(|node| (self.degree(*node).expect("`node` exists"), Reverse(*node)))
    }

    /// Returns a uniformly random remaining node.
    pub fn random_node(&self, rng: &mut dyn RngCore) -> Option<usize> {
        if self.alive.is_empty() {
            return None
        }
        Some(self.alive[rng.gen_range(0..self.alive.len())])
    }

    /// Returns a uniformly random neighbor of `node`.
    pub fn random_neighbor(&self, node: usize, rng: &mut dyn RngCore) -> Option<usize> {
        let neighs = self.neighbors(node)?;
        if neighs.is_empty() {
            return None
        }
        let id = rng.gen_range(0..neighs.len());
        neighs.iter().nth(id).copied()
    }
}

// Dynamic functions
impl AdjView {

    /// Tries to delete `node` together with its incident edges, then prunes every former
    /// neighbor that has no edge left.
    /// Returns the old neighborhood of `node` or `None` if nothing was deleted.
    pub fn delete_node(&mut self, node: usize) -> Option<FxHashSet<usize>> {
        let neighborhood = self.adj_list.remove(&node)?;
        self.unlist(node);
        let mut emptied = Vec::new();
        for neighbor in neighborhood.iter().filter(|neigh| **neigh != node) {
            if let Some(nn) = self.adj_list.get_mut(neighbor) {
                nn.remove(&node);
                if nn.is_empty() {
                    emptied.push(*neighbor);
                }
            }
        }
        for isolated in emptied {
            self.adj_list.remove(&isolated);
            self.unlist(isolated);
        }
        Some(neighborhood)
    }

    fn unlist(&mut self, node: usize) {
        let idx = self.position.remove(&node).expect("alive nodes have a position");
        self.alive.swap_remove(idx);
        if let Some(moved) = self.alive.get(idx) {
            self.position.insert(*moved, idx);
        }
    }
}
