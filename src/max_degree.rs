//! Degree based heuristics. Both work on a private `AdjView` that shrinks with every node added
//! to the cover, until no edge remains.

use rand::RngCore;
use std::collections::BTreeSet;
use tracing::{debug, trace};
use crate::cover::Cover;
use crate::graph::{AdjView, Graph};
use crate::heuristics::CoverAlgorithm;

/// Repeatedly adds the node with the highest remaining degree to the cover and removes it from
/// the graph. Ties go to the lowest node id.
#[derive(Debug, Default, Clone)]
pub struct MaxDegree {
    view: AdjView,
}

impl CoverAlgorithm for MaxDegree {

    fn name(&self) -> &'static str {
        "MaxDegree"
    }

    fn parse(&mut self, graph: &Graph, _rng: &mut dyn RngCore) {
        self.view = graph.adjacency();
    }

    fn solve(&mut self, _rng: &mut dyn RngCore) -> Cover {
        let mut view = std::mem::take(&mut self.view);
        debug!(nodes = view.num_nodes(), "max degree on adjacency view");
        let mut buckets = DegreeBuckets::new(&view);
        let mut cover = Cover::default();
        while let Some(node) = buckets.pop_max() {
            let neighbors = view.delete_node(node).expect("bucketed nodes are alive");
            trace!(node, degree = neighbors.len(), "max degree pick");
            cover.insert(node);
            for neigh in neighbors.into_iter().filter(|neigh| *neigh != node) {
                match view.degree(neigh) {
                    Some(degree) => buckets.relocate(neigh, degree + 1, degree),
                    // Pruned, it had `node` as its only neighbor.
                    None => buckets.remove(neigh, 1),
                }
            }
        }
        debug_assert!(view.is_empty());
        cover
    }
}

/// Bucket queue of nodes keyed by degree. Within a bucket the lowest id comes first, which gives
/// the same picks as a full rescan with `AdjView::max_degree_node`.
#[derive(Debug)]
struct DegreeBuckets {
    buckets: Vec<BTreeSet<usize>>,
    /// Upper bound on the highest non-empty bucket. Degrees only shrink, so it never grows.
    max: usize,
}

impl DegreeBuckets {

    fn new(view: &AdjView) -> Self {
        let max = view.nodes()
            .map(|node| view.degree(node).expect("`node` exists"))
            .max()
            .unwrap_or(0);
        let mut buckets = vec![BTreeSet::new(); max + 1];
        for node in view.nodes() {
            buckets[view.degree(node).expect("`node` exists")].insert(node);
        }
        DegreeBuckets { buckets, max }
    }

    fn pop_max(&mut self) -> Option<usize> {
        while self.max > 0 && self.buckets[self.max].is_empty() {
            self.max -= 1;
        }
        self.buckets.get_mut(self.max)?.pop_first()
    }

    fn relocate(&mut self, node: usize, from: usize, to: usize) {
        self.buckets[from].remove(&node);
        self.buckets[to].insert(node);
    }

    fn remove(&mut self, node: usize, degree: usize) {
        self.buckets[degree].remove(&node);
    }
}

/// Repeatedly picks a uniformly random edge and adds its endpoint of higher degree to the cover.
/// On equal degrees the second endpoint, the random neighbor, wins.
#[derive(Debug, Default, Clone)]
pub struct RandomMaxDegree {
    view: AdjView,
}

impl CoverAlgorithm for RandomMaxDegree {

    fn name(&self) -> &'static str {
        "RandomMaxDegree"
    }

    fn parse(&mut self, graph: &Graph, _rng: &mut dyn RngCore) {
        self.view = graph.adjacency();
    }

    fn solve(&mut self, rng: &mut dyn RngCore) -> Cover {
        let mut view = std::mem::take(&mut self.view);
        debug!(nodes = view.num_nodes(), "random max degree on adjacency view");
        let mut cover = Cover::default();
        while let Some(left) = view.random_node(rng) {
            let Some(right) = view.random_neighbor(left, rng) else {
                // Only reachable if an isolated node escaped pruning.
                view.delete_node(left);
                continue
            };
            let winner = if view.degree(left) > view.degree(right) { left } else { right };
            trace!(left, right, winner, "random edge pick");
            cover.insert(winner);
            view.delete_node(winner);
        }
        cover
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn solve<A: CoverAlgorithm + Default>(graph: &Graph, seed: u64) -> Cover {
        A::default().solve_once(graph, &mut ChaCha8Rng::seed_from_u64(seed))
    }

    /// Full rescan after every pick, as a reference for the bucket queue.
    fn rescan_max_degree(graph: &Graph) -> Cover {
        let mut view = graph.adjacency();
        let mut cover = Cover::default();
        while let Some(node) = view.max_degree_node() {
            cover.insert(node);
            view.delete_node(node);
        }
        cover
    }

    #[test]
    fn path_test() {
        let graph: Graph = vec![(1, 2), (2, 3), (3, 4)].into_iter().collect();
        let cover = solve::<MaxDegree>(&graph, 0);
        assert_eq!(cover.sorted(), vec![2, 3]);
    }

    #[test]
    fn star_test() {
        let graph: Graph = (1..=12).map(|leaf| (0, leaf)).collect();
        assert_eq!(solve::<MaxDegree>(&graph, 0).sorted(), vec![0]);
        // The center has the higher degree on every edge of the star.
        for seed in 0..10 {
            assert_eq!(solve::<RandomMaxDegree>(&graph, seed).sorted(), vec![0]);
        }
    }

    #[test]
    fn buckets_match_rescan_test() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        for _ in 0..20 {
            let graph: Graph = (0..120)
                .map(|_| {
                    use rand::Rng;
                    (rng.gen_range(0..40), rng.gen_range(0..40))
                })
                .collect();
            let cover = solve::<MaxDegree>(&graph, 0);
            assert_eq!(cover, rescan_max_degree(&graph));
            assert!(cover.covers(graph.edges()));
        }
    }

    #[test]
    fn self_loop_test() {
        let graph: Graph = vec![(3, 3), (1, 2)].into_iter().collect();
        let cover = solve::<MaxDegree>(&graph, 0);
        assert!(cover.contains(3));
        assert!(cover.covers(graph.edges()));
        for seed in 0..10 {
            let cover = solve::<RandomMaxDegree>(&graph, seed);
            assert!(cover.contains(3));
            assert_eq!(cover.len(), 2);
        }
    }

    #[test]
    fn random_max_degree_test() {
        let graph: Graph = vec![(0, 1), (1, 2), (2, 3), (3, 0), (0, 2), (4, 5), (5, 5)]
            .into_iter()
            .collect();
        for seed in 0..30 {
            let cover = solve::<RandomMaxDegree>(&graph, seed);
            assert!(cover.covers(graph.edges()));
            assert_eq!(cover, solve::<RandomMaxDegree>(&graph, seed));
        }
    }

    #[test]
    fn parallel_edges_test() {
        let graph: Graph = vec![(0, 1), (1, 0), (0, 1)].into_iter().collect();
        assert_eq!(solve::<MaxDegree>(&graph, 0).sorted(), vec![0]);
        assert_eq!(solve::<RandomMaxDegree>(&graph, 4).len(), 1);
    }
}
