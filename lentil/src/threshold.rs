//! Distance threshold search for a target number of clusters.
//!
//! Cutting at distance `t` groups leaves under the highest subtrees
//! whose largest merge distance is still `<= t` (flat clustering with
//! the "distance" criterion). The search walks `t` upward in adaptive
//! steps rather than bisecting, so the returned value depends on the
//! step schedule: start at 0 with `step = root_distance / 2`, advance
//! while the cut yields too many clusters, step back and halve when it
//! yields too few, and stop once `step < 0.1`.

use crate::cluster_tree::ClusterTree;
use crate::lentil_common::*;

/// Smallest step before the search settles for an estimate
pub const MIN_STEP: f64 = 0.1;

/// Returned when the tree is already at least as fine as requested
pub const NO_THRESHOLD: f64 = -1.0;

/// Precomputed subtree maxima for repeated cuts of one tree
pub struct TreeCut {
    subtree_max: Vec<f64>,
    parents: Vec<Option<NodeId>>,
    live: Vec<NodeId>,
}

impl TreeCut {
    pub fn new(tree: &ClusterTree) -> Self {
        let subtree_max = tree.subtree_max_distances();
        let mut parents = vec![None; tree.id_bound()];
        let mut live = Vec::with_capacity(tree.num_nodes());
        for node in tree.iter() {
            parents[node.id] = node.parent;
            live.push(node.id);
        }
        Self {
            subtree_max,
            parents,
            live,
        }
    }

    /// Number of flat clusters obtained by cutting at `cut`
    pub fn count_clusters(&self, cut: f64) -> usize {
        self.live
            .iter()
            .filter(|&&id| {
                self.subtree_max[id] <= cut
                    && match self.parents[id] {
                        Some(p) => self.subtree_max[p] > cut,
                        None => true,
                    }
            })
            .count()
    }
}

/// Number of flat clusters obtained by cutting `tree` at `cut`
pub fn count_clusters_at(tree: &ClusterTree, cut: f64) -> usize {
    TreeCut::new(tree).count_clusters(cut)
}

/// Find a distance at which cutting `tree` yields `cluster_count`
/// clusters, or the search's closest estimate.
///
/// Returns [`NO_THRESHOLD`] when `cluster_count` is zero or not smaller
/// than the number of leaves.
pub fn distance_threshold(tree: &ClusterTree, cluster_count: usize) -> f64 {
    debug!("Calculating distance threshold for {} clusters", cluster_count);

    if cluster_count == 0 || cluster_count >= tree.num_leaves() {
        return NO_THRESHOLD;
    }

    let cut = TreeCut::new(tree);

    let mut i = 0.0;
    let mut step = tree.root_distance() / 2.0;

    while step >= MIN_STEP {
        let count = cut.count_clusters(i);
        if count < cluster_count {
            if i == 0.0 {
                return 0.0;
            }
            i -= step;
            step /= 2.0;
        } else if count == cluster_count {
            return i;
        } else {
            i += step;
        }
    }

    i + step * 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linkage::{LeafInput, Merge};

    /// 6 leaves: {0,1} @1, {2,3} @2, {4,5} @3, {01,23} @8, {0123,45} @12
    fn six_leaves() -> ClusterTree {
        let leaves = (0..6)
            .map(|i| LeafInput::dense(format!("{}", i), &[i as f64]))
            .collect();
        let merges = vec![
            Merge::new(0, 1, 1.0, 2),
            Merge::new(2, 3, 2.0, 2),
            Merge::new(4, 5, 3.0, 2),
            Merge::new(6, 7, 8.0, 4),
            Merge::new(9, 8, 12.0, 6),
        ];
        ClusterTree::build(leaves, &merges).unwrap()
    }

    #[test]
    fn test_count_clusters_at() {
        let tree = six_leaves();
        assert_eq!(count_clusters_at(&tree, 0.0), 6);
        assert_eq!(count_clusters_at(&tree, 1.0), 5);
        assert_eq!(count_clusters_at(&tree, 2.5), 4);
        assert_eq!(count_clusters_at(&tree, 5.0), 3);
        assert_eq!(count_clusters_at(&tree, 9.0), 2);
        assert_eq!(count_clusters_at(&tree, 12.0), 1);
    }

    #[test]
    fn test_threshold_degenerate() {
        let tree = six_leaves();
        assert_eq!(distance_threshold(&tree, 6), NO_THRESHOLD);
        assert_eq!(distance_threshold(&tree, 10), NO_THRESHOLD);
        assert_eq!(distance_threshold(&tree, 0), NO_THRESHOLD);
    }

    #[test]
    fn test_threshold_follows_steps() {
        let tree = six_leaves();
        // i = 0 (6) -> 6 (3) -> 12 (1): back to 6, step 3 -> 9 (2)
        assert_eq!(distance_threshold(&tree, 2), 9.0);
        // i = 0 (6) -> 6 (3)
        assert_eq!(distance_threshold(&tree, 3), 6.0);
        assert_eq!(count_clusters_at(&tree, distance_threshold(&tree, 4)), 4);
    }

    #[test]
    fn test_threshold_single_cluster() {
        let tree = six_leaves();
        let t = distance_threshold(&tree, 1);
        assert!(t >= 12.0);
        assert_eq!(count_clusters_at(&tree, t), 1);
    }
}
