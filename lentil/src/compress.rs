//! Collapse every subtree merged at or below a distance threshold into
//! a single synthetic leaf.
//!
//! Starting from each original leaf we follow parent pointers while the
//! parent's distance is `<= threshold`; every node passed on the way is
//! dropped and the node where the walk stops absorbs the leaf. Absorbed
//! object ids are concatenated in leaf id order and the feature vectors
//! are summarized column by column.

use crate::cluster_tree::{ClusterTree, LeafData, NodeKind};
use crate::lentil_common::*;
use crate::reducer::Reducer;
use matrix_util::column_stat::ColumnStatOps;
use ndarray::Array2;

/// What a compression pass did
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionSummary {
    pub threshold: f64,
    /// Merge nodes turned into synthetic leaves
    pub num_collapsed: usize,
    /// Nodes removed from the arena
    pub num_removed: usize,
}

/// Collapse `tree` in place at `threshold` and summarize the absorbed
/// feature vectors with `reducer` (median or mean).
///
/// A collapse point absorbs every leaf beneath it, so the tree stays
/// consistent even when merge distances are not monotone.
pub fn compress_tree(
    tree: &mut ClusterTree,
    threshold: f64,
    reducer: Reducer,
) -> anyhow::Result<CompressionSummary> {
    if !reducer.is_numeric() {
        return Err(ConfigError::NonNumericReducer(reducer).into());
    }

    let mut seen: HashSet<NodeId> = HashSet::default();
    let mut collapse_points: Vec<NodeId> = vec![];

    for leaf in tree.leaf_ids() {
        let mut node_id = leaf;
        while let Some(parent) = tree.node(node_id).and_then(|x| x.parent) {
            match tree.node(parent) {
                Some(p) if p.distance <= threshold => node_id = parent,
                _ => break,
            }
        }

        if node_id != leaf && seen.insert(node_id) {
            collapse_points.push(node_id);
        }
    }

    // higher nodes first; nested collapse points are absorbed by them
    collapse_points.sort_unstable_by(|a, b| b.cmp(a));

    let mut num_collapsed = 0;
    let mut num_removed = 0;

    for id in collapse_points {
        if !tree.contains(id) {
            continue;
        }

        let mut objects: Vec<Box<str>> = vec![];
        let mut rows: Vec<Vec<Option<f64>>> = vec![];

        let mut beneath = tree.subtree(id);
        beneath.sort_unstable();

        for &desc in beneath.iter().filter(|&&x| x != id) {
            if let Some(node) = tree.take(desc) {
                if let NodeKind::Leaf(data) = node.kind {
                    objects.extend(data.objects);
                    rows.push(data.features);
                }
                num_removed += 1;
            }
        }

        let features = summarize_features(&rows, reducer);
        if let Some(node) = tree.node_mut(id) {
            node.kind = NodeKind::Leaf(LeafData {
                objects,
                features,
                label: None,
                structure: None,
            });
            node.distance = 0.0;
            node.count = 1;
            num_collapsed += 1;
        }
    }

    tree.recount();

    info!(
        "Compressed at distance {:.3}: {} synthetic leaves, {} nodes removed, {} leaves left",
        threshold,
        num_collapsed,
        num_removed,
        tree.num_leaves()
    );

    Ok(CompressionSummary {
        threshold,
        num_collapsed,
        num_removed,
    })
}

/// Column-wise summary of several rows; missing values are skipped and
/// a column without any present value stays missing.
pub fn summarize_features(rows: &[Vec<Option<f64>>], reducer: Reducer) -> Vec<Option<f64>> {
    let ncol = rows.iter().map(|x| x.len()).max().unwrap_or(0);
    if ncol == 0 {
        return vec![];
    }

    let mut mat = Array2::<f64>::from_elem((rows.len(), ncol), f64::NAN);
    for (i, row) in rows.iter().enumerate() {
        for (j, x) in row.iter().enumerate() {
            if let Some(x) = x {
                mat[[i, j]] = *x;
            }
        }
    }

    let summary = match reducer {
        Reducer::Mean => mat.nan_mean_columns(),
        _ => mat.nan_median_columns(),
    };

    summary
        .iter()
        .map(|&x| if x.is_finite() { Some(x) } else { None })
        .collect()
}
