mod common;

use common::*;
use lentil::coloring::color_clusters;
use lentil::threshold::{count_clusters_at, distance_threshold};
use lentil::{ClusterTree, ConfigError, LeafInput, Merge};
use std::collections::HashSet;

#[test]
fn six_leaves_give_requested_clusters() -> anyhow::Result<()> {
    init_logger();

    let expected_roots = [(2, vec![8, 9]), (3, vec![6, 7, 8]), (4, vec![4, 5, 6, 7])];

    for (k, roots) in expected_roots {
        let (leaves, merges) = six_leaves();
        let mut tree = ClusterTree::build(leaves, &merges)?;
        let coloring = color_clusters(&mut tree, k, 1)?.expect("cut exists");

        let mut found: Vec<usize> = coloring.clusters.iter().map(|c| c.root).collect();
        found.sort();
        assert_eq!(found, roots);

        let assignments = coloring.assignments();
        assert_eq!(assignments.len(), 6);
        for leaf in tree.leaf_ids() {
            let node = tree.node(leaf).unwrap();
            assert_eq!(node.cluster, assignments.get(&leaf).copied());
        }

        for cluster in coloring.clusters.iter() {
            let root = tree.node(cluster.root).unwrap();
            assert_eq!(root.color.as_ref(), Some(&cluster.color));
        }
    }
    Ok(())
}

#[test]
fn each_leaf_in_exactly_one_cluster() -> anyhow::Result<()> {
    init_logger();
    let mut num_exact = 0;

    for seed in 0..5 {
        let (leaves, merges) = random_linkage(80, seed);
        let mut tree = ClusterTree::build(leaves, &merges)?;
        let root_distance = tree.root_distance();

        for k in [2, 4, 9] {
            let coloring = color_clusters(&mut tree, k, seed)?.expect("fewer clusters than leaves");
            let threshold = coloring.threshold;
            assert!(threshold > 0.0);

            // a cut above the root leaves no node to colour
            if threshold > root_distance {
                assert!(coloring.clusters.is_empty());
                continue;
            }

            let mut hits = vec![0usize; tree.id_bound()];
            for cluster in coloring.clusters.iter() {
                for &leaf in cluster.leaves.iter() {
                    hits[leaf] += 1;
                }
            }
            for leaf in tree.leaf_ids() {
                assert_eq!(hits[leaf], 1, "leaf {} with k = {}", leaf, k);
            }

            let distinct: HashSet<usize> = tree
                .leaf_ids()
                .into_iter()
                .filter_map(|x| tree.node(x).and_then(|n| n.cluster))
                .collect();
            // roots sit strictly below the cut
            let below = count_clusters_at(&tree, threshold - 1e-9);
            assert_eq!(distinct.len(), coloring.clusters.len());
            assert_eq!(distinct.len(), below);
            if distinct.len() == k {
                num_exact += 1;
            }
        }
    }
    assert!(num_exact > 0);
    Ok(())
}

#[test]
fn cut_on_a_merge_distance_splits_that_merge() -> anyhow::Result<()> {
    init_logger();

    // chain: {0,1} @1, +2 @2, +3 @3, +4 @4
    let leaves = (0..5)
        .map(|i| LeafInput::dense(format!("obj_{}", i), &[i as f64]))
        .collect();
    let merges = vec![
        Merge::new(0, 1, 1.0, 2),
        Merge::new(5, 2, 2.0, 3),
        Merge::new(6, 3, 3.0, 4),
        Merge::new(7, 4, 4.0, 5),
    ];
    let mut tree = ClusterTree::build(leaves, &merges)?;

    // the merge at 2 counts as one cluster for the search ...
    assert_eq!(distance_threshold(&tree, 3), 2.0);
    assert_eq!(count_clusters_at(&tree, 2.0), 3);

    // ... but a root must sit strictly below the cut
    let coloring = color_clusters(&mut tree, 3, 1)?.expect("cut exists");
    let mut roots: Vec<usize> = coloring.clusters.iter().map(|c| c.root).collect();
    roots.sort();
    assert_eq!(roots, vec![2, 3, 4, 5]);
    assert_eq!(tree.node(0).unwrap().cluster, tree.node(1).unwrap().cluster);
    Ok(())
}

#[test]
fn too_many_clusters_are_skipped() -> anyhow::Result<()> {
    let (leaves, merges) = six_leaves();
    let mut tree = ClusterTree::build(leaves, &merges)?;

    assert!(color_clusters(&mut tree, 6, 1)?.is_none());
    assert!(tree.iter().all(|x| x.color.is_none() && x.cluster.is_none()));

    let err = color_clusters(&mut tree, 1, 1).unwrap_err();
    assert_eq!(
        err.downcast_ref::<ConfigError>(),
        Some(&ConfigError::ClusterCount(1))
    );
    Ok(())
}
