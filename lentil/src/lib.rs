//! Cluster heatmap trees.
//!
//! Turns the merge history of a hierarchical clustering run into an
//! addressable binary tree, optionally collapses low-distance subtrees
//! into aggregate leaves, colours a requested number of clusters, and
//! joins external per-object records onto the resulting leaves. The
//! result is a serializable document for interactive heatmap viewers.
//!
//! ```text
//! linkage ─► ClusterTree ─► compress ─► color ─► attach ─► HeatmapDocument
//!                 ▲
//! column linkage ─┘ (independent ColumnAxis tree)
//! ```

pub mod attach; // join external record tables onto leaves
pub mod cluster_tree; // arena of leaves and merge nodes
pub mod coloring; // cut the tree and label clusters
pub mod column_axis; // independently clustered feature columns
pub mod compress; // collapse subtrees below a distance threshold
pub mod document; // serializable output format
pub mod error; // configuration errors
pub mod heatmap; // the whole pipeline
pub mod lentil_common; // shared imports and helpers
pub mod linkage; // merge encoding and leaf inputs
pub mod reducer; // column-wise reducers
pub mod threshold; // distance threshold search

pub use cluster_tree::{ClusterNode, ClusterTree, LeafData, NodeKind};
pub use document::HeatmapDocument;
pub use error::ConfigError;
pub use heatmap::{ClusterHeatmap, HeatmapArgs, HeatmapInput};
pub use linkage::{LeafInput, Merge};
pub use reducer::Reducer;
