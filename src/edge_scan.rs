//! Heuristics that decide cover membership edge by edge, without any degree information.

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use tracing::trace;
use crate::cover::Cover;
use crate::graph::{Edge, Graph};
use crate::heuristics::CoverAlgorithm;

/// Scans the edges and adds both endpoints of every edge that is not yet covered.
///
/// The added edges form a maximal matching, so the cover is at most twice the size of an
/// optimal one.
#[derive(Debug, Default, Clone)]
pub struct EdgeScan {
    edges: Vec<Edge>,
    shuffle: bool,
}

impl EdgeScan {

    /// Scans the edges in input order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans the edges in a random order drawn at parse time.
    pub fn shuffled() -> Self {
        EdgeScan {
            edges: Vec::new(),
            shuffle: true,
        }
    }
}

impl CoverAlgorithm for EdgeScan {

    fn name(&self) -> &'static str {
        "EdgeScan"
    }

    fn parse(&mut self, graph: &Graph, rng: &mut dyn RngCore) {
        self.edges = graph.edges().to_vec();
        if self.shuffle {
            self.edges.shuffle(rng);
        }
    }

    fn solve(&mut self, _rng: &mut dyn RngCore) -> Cover {
        let mut cover = Cover::default();
        for edge in self.edges.drain(..) {
            if !cover.covers_edge(&edge) {
                trace!(left = edge.0, right = edge.1, "adding both endpoints");
                cover.insert(edge.0);
                cover.insert(edge.1);
            }
        }
        cover
    }
}

/// Shuffles the edges once and adds one endpoint, chosen by a fair coin, of every edge that is
/// not yet covered.
#[derive(Debug, Default, Clone)]
pub struct RandomEdgeScan {
    edges: Vec<Edge>,
}

impl CoverAlgorithm for RandomEdgeScan {

    fn name(&self) -> &'static str {
        "RandomEdgeScan"
    }

    fn parse(&mut self, graph: &Graph, rng: &mut dyn RngCore) {
        self.edges = graph.edges().to_vec();
        self.edges.shuffle(rng);
    }

    fn solve(&mut self, rng: &mut dyn RngCore) -> Cover {
        let mut cover = Cover::default();
        while let Some(edge) = self.edges.pop() {
            if cover.covers_edge(&edge) {
                continue
            }
            let node = if rng.gen_bool(0.5) { edge.0 } else { edge.1 };
            trace!(node, "coin picked endpoint");
            cover.insert(node);
        }
        cover
    }
}
