pub use crate::error::ConfigError;
pub use fnv::FnvHashMap as HashMap;
pub use fnv::FnvHashSet as HashSet;
pub use log::{debug, info, warn};

/// Index of a node in a [`crate::cluster_tree::ClusterTree`]
pub type NodeId = usize;

/// Round to three decimal digits, the precision of every emitted number
#[inline]
pub fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}
