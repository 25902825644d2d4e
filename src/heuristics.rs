//! The common interface of the vertex cover heuristics and the selector that builds them.
//!
//! Every heuristic first copies the part of the graph it works on into private state
//! (`CoverAlgorithm::parse`) and then consumes that state to build a cover
//! (`CoverAlgorithm::solve`). Randomness always comes from the generator passed in by the
//! caller, so a seeded generator reproduces a run.

use rand::RngCore;
use crate::cover::Cover;
use crate::cust_error::ProcessingError;
use crate::edge_scan::{EdgeScan, RandomEdgeScan};
use crate::graph::Graph;
use crate::max_degree::{MaxDegree, RandomMaxDegree};

pub trait CoverAlgorithm {

    /// Name used in benchmark rows.
    fn name(&self) -> &'static str;

    /// Replaces the working state of `self` with a private copy of `graph`.
    fn parse(&mut self, graph: &Graph, rng: &mut dyn RngCore);

    /// Consumes the working state and returns the cover. A second call without `parse` in
    /// between returns an empty cover.
    fn solve(&mut self, rng: &mut dyn RngCore) -> Cover;

    fn solve_once(&mut self, graph: &Graph, rng: &mut dyn RngCore) -> Cover {
        self.parse(graph, rng);
        self.solve(rng)
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash)]
pub enum Algorithm {
    /// Adds both endpoints of every uncovered edge in input order.
    EdgeScan = 1,
    /// Repeatedly takes the node of highest degree.
    MaxDegree = 2,
    /// Repeatedly takes the endpoint of higher degree of a random edge.
    RandomMaxDegree = 3,
    /// Adds one random endpoint of every uncovered edge in shuffled order.
    RandomEdgeScan = 4,
}

pub const ALL_ALGORITHMS: &[Algorithm] = &[
    Algorithm::EdgeScan,
    Algorithm::MaxDegree,
    Algorithm::RandomMaxDegree,
    Algorithm::RandomEdgeScan,
];

impl Algorithm {

    /// Maps the command line selector `1..=4` to a heuristic.
    pub fn from_selector(selector: u32) -> Result<Self, ProcessingError> {
        match selector {
            1 => Ok(Algorithm::EdgeScan),
            2 => Ok(Algorithm::MaxDegree),
            3 => Ok(Algorithm::RandomMaxDegree),
            4 => Ok(Algorithm::RandomEdgeScan),
            other => Err(ProcessingError::UnsupportedSelector(other)),
        }
    }

    pub fn selector(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::EdgeScan => "EdgeScan",
            Algorithm::MaxDegree => "MaxDegree",
            Algorithm::RandomMaxDegree => "RandomMaxDegree",
            Algorithm::RandomEdgeScan => "RandomEdgeScan",
        }
    }

    /// Returns a fresh instance of the heuristic with empty working state.
    pub fn build(self) -> Box<dyn CoverAlgorithm + Send> {
        match self {
            Algorithm::EdgeScan => Box::new(EdgeScan::new()),
            Algorithm::MaxDegree => Box::new(MaxDegree::default()),
            Algorithm::RandomMaxDegree => Box::new(RandomMaxDegree::default()),
            Algorithm::RandomEdgeScan => Box::new(RandomEdgeScan::default()),
        }
    }
}
