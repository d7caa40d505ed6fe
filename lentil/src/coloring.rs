//! Colour a requested number of clusters by cutting the tree.
//!
//! A node is a cluster root when its own distance is below the cut and
//! its parent's distance is at or above it (the root's parent counts as
//! distance 0). Each cluster root gets a colour and a sequential index,
//! and the index is pushed down to every leaf beneath it.

use crate::cluster_tree::ClusterTree;
use crate::lentil_common::*;
use crate::threshold::distance_threshold;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const DEFAULT_COLOR_SEED: u64 = 42;

/// One coloured cluster
#[derive(Debug, Clone, PartialEq)]
pub struct ColoredCluster {
    pub index: usize,
    /// Topmost node of the cluster
    pub root: NodeId,
    pub color: Box<str>,
    pub leaves: Vec<NodeId>,
}

/// Result of a colouring pass
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterColoring {
    pub threshold: f64,
    pub clusters: Vec<ColoredCluster>,
}

impl ClusterColoring {
    /// leaf id -> cluster index
    pub fn assignments(&self) -> HashMap<NodeId, usize> {
        self.clusters
            .iter()
            .flat_map(|c| c.leaves.iter().map(move |&l| (l, c.index)))
            .collect()
    }
}

/// Bright, well-saturated random colours rendered as `#rrggbb`
pub struct ColorPalette {
    rng: StdRng,
}

impl ColorPalette {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn next_color(&mut self) -> Box<str> {
        let hue = self.rng.random_range(0.0..360.0);
        let sat = self.rng.random_range(0.55..0.95);
        let val = self.rng.random_range(0.7..0.95);
        let (r, g, b) = hsv_to_rgb(hue, sat, val);
        format!("#{:02x}{:02x}{:02x}", r, g, b).into_boxed_str()
    }

    pub fn generate(&mut self, count: usize) -> Vec<Box<str>> {
        (0..count).map(|_| self.next_color()).collect()
    }
}

fn hsv_to_rgb(hue: f64, sat: f64, val: f64) -> (u8, u8, u8) {
    let c = val * sat;
    let h = (hue / 60.0) % 6.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = val - c;
    let to_byte = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (to_byte(r), to_byte(g), to_byte(b))
}

/// Cut `tree` into `cluster_count` clusters, store colours on cluster
/// roots and cluster indices on leaves.
///
/// Returns `None` when the tree cannot be cut that finely.
pub fn color_clusters(
    tree: &mut ClusterTree,
    cluster_count: usize,
    seed: u64,
) -> anyhow::Result<Option<ClusterColoring>> {
    if cluster_count < 2 {
        return Err(ConfigError::ClusterCount(cluster_count).into());
    }

    let threshold = distance_threshold(tree, cluster_count);
    if threshold < 0.0 {
        info!(
            "Not colouring: {} clusters requested for {} leaves",
            cluster_count,
            tree.num_leaves()
        );
        return Ok(None);
    }
    info!("Distance threshold for {} clusters: {:.3}", cluster_count, threshold);

    let roots: Vec<NodeId> = tree
        .iter()
        .filter(|x| x.distance < threshold && tree.parent_distance(x.id) >= threshold)
        .map(|x| x.id)
        .collect();

    let colors = ColorPalette::new(seed).generate(roots.len());

    let mut clusters = Vec::with_capacity(roots.len());
    for (index, (root, color)) in roots.into_iter().zip(colors).enumerate() {
        let leaves = tree.leaves_under(root);
        if let Some(node) = tree.node_mut(root) {
            node.color = Some(color.clone());
        }
        for &leaf in leaves.iter() {
            if let Some(node) = tree.node_mut(leaf) {
                node.cluster = Some(index);
            }
        }
        clusters.push(ColoredCluster {
            index,
            root,
            color,
            leaves,
        });
    }

    if clusters.len() != cluster_count {
        warn!(
            "Requested {} clusters, the cut at {:.3} gives {}",
            cluster_count,
            threshold,
            clusters.len()
        );
    }

    Ok(Some(ClusterColoring {
        threshold,
        clusters,
    }))
}
