//! Binary cluster tree stored as an arena addressed by node id.
//!
//! For `n` leaves the ids are `0..n` for leaves (input order) and
//! `n..2n-1` for merges (merge order), so a child id is always smaller
//! than its parent's. Compression removes nodes in place: the slot is
//! emptied and the remaining ids stay stable.
//!
//! ```text
//!         6 (distance=1.0)
//!        / \
//!       4   5 (distance=0.7)
//!      / \ / \
//!     0  1 2  3 (leaves)
//! ```

use crate::lentil_common::*;
use crate::linkage::{LeafInput, Merge};
use std::collections::VecDeque;

/// Payload of a leaf or of a collapsed subtree
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LeafData {
    /// Absorbed object identifiers (exactly one for an original leaf)
    pub objects: Vec<Box<str>>,
    /// Feature vector (column-wise summary for a collapsed subtree)
    pub features: Vec<Option<f64>>,
    pub label: Option<Box<str>>,
    pub structure: Option<Box<str>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Leaf(LeafData),
    Internal { left: NodeId, right: NodeId },
}

/// A node of the cluster tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterNode {
    pub id: NodeId,
    /// `None` only for the root
    pub parent: Option<NodeId>,
    /// Number of leaves (or collapsed leaves) beneath this node
    pub count: usize,
    /// Merge distance, 0 for leaves
    pub distance: f64,
    pub kind: NodeKind,
    /// Display colour of a cluster root
    pub color: Option<Box<str>>,
    /// Cluster index propagated to leaves
    pub cluster: Option<usize>,
}

impl ClusterNode {
    fn leaf(id: NodeId, data: LeafData) -> Self {
        Self {
            id,
            parent: None,
            count: 1,
            distance: 0.0,
            kind: NodeKind::Leaf(data),
            color: None,
            cluster: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    /// Leaf payload, if this is a leaf
    pub fn leaf_data(&self) -> Option<&LeafData> {
        match &self.kind {
            NodeKind::Leaf(data) => Some(data),
            _ => None,
        }
    }

    /// `(left, right)` children, if this is a merge node
    pub fn children(&self) -> Option<(NodeId, NodeId)> {
        match self.kind {
            NodeKind::Internal { left, right } => Some((left, right)),
            _ => None,
        }
    }
}

/// Arena-backed binary tree built from a merge sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterTree {
    nodes: Vec<Option<ClusterNode>>,
    num_original_leaves: usize,
    root: NodeId,
}

impl ClusterTree {
    /// Build the tree from `n` leaves and the `n - 1` merges joining them.
    ///
    /// The merge sequence is trusted to come from a clustering routine;
    /// only child references that would fall outside the arena are
    /// rejected.
    pub fn build(leaves: Vec<LeafInput>, merges: &[Merge]) -> anyhow::Result<Self> {
        let n = leaves.len();
        if n == 0 {
            anyhow::bail!("cannot build a cluster tree without leaves");
        }

        let mut nodes: Vec<Option<ClusterNode>> = Vec::with_capacity(n + merges.len());

        for (id, leaf) in leaves.into_iter().enumerate() {
            let data = LeafData {
                objects: vec![leaf.object_id],
                features: leaf.features,
                label: leaf.label,
                structure: leaf.structure,
            };
            nodes.push(Some(ClusterNode::leaf(id, data)));
        }

        for (i, merge) in merges.iter().enumerate() {
            let id = n + i;
            let mut count = 0;
            for child in [merge.left, merge.right] {
                let child_node = nodes
                    .get_mut(child)
                    .and_then(|x| x.as_mut())
                    .ok_or_else(|| {
                        anyhow::anyhow!("merge {} refers to unknown cluster {}", id, child)
                    })?;
                child_node.parent = Some(id);
                count += child_node.count;
            }

            if merge.count != count {
                debug!(
                    "merge {}: encoded size {} differs from {} leaves beneath",
                    id, merge.count, count
                );
            }

            nodes.push(Some(ClusterNode {
                id,
                parent: None,
                count,
                distance: merge.distance,
                kind: NodeKind::Internal {
                    left: merge.left,
                    right: merge.right,
                },
                color: None,
                cluster: None,
            }));
        }

        let root = nodes.len() - 1;

        Ok(Self {
            nodes,
            num_original_leaves: n,
            root,
        })
    }

    /// Tree over `n` anonymous leaves named by their index, e.g., the
    /// columns of a feature matrix.
    pub fn build_bare(names: &[Box<str>], merges: &[Merge]) -> anyhow::Result<Self> {
        let leaves = names
            .iter()
            .map(|name| LeafInput::new(name.clone(), vec![]))
            .collect();
        Self::build(leaves, merges)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Merge distance of the root
    pub fn root_distance(&self) -> f64 {
        self.node(self.root).map(|x| x.distance).unwrap_or(0.0)
    }

    /// Number of leaves the tree was built from
    pub fn num_original_leaves(&self) -> usize {
        self.num_original_leaves
    }

    /// Number of nodes still present
    pub fn num_nodes(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    /// Number of leaves still present (collapsed subtrees count once)
    pub fn num_leaves(&self) -> usize {
        self.iter().filter(|x| x.is_leaf()).count()
    }

    /// One past the largest id ever allocated
    pub fn id_bound(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&ClusterNode> {
        self.nodes.get(id).and_then(|x| x.as_ref())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut ClusterNode> {
        self.nodes.get_mut(id).and_then(|x| x.as_mut())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Live nodes in increasing id order
    pub fn iter(&self) -> impl Iterator<Item = &ClusterNode> {
        self.nodes.iter().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ClusterNode> {
        self.nodes.iter_mut().flatten()
    }

    /// Live leaf ids in increasing order
    pub fn leaf_ids(&self) -> Vec<NodeId> {
        self.iter().filter(|x| x.is_leaf()).map(|x| x.id).collect()
    }

    /// Distance of the parent; the root is treated as having a parent
    /// at distance 0.
    pub fn parent_distance(&self, id: NodeId) -> f64 {
        self.node(id)
            .and_then(|x| x.parent)
            .and_then(|p| self.node(p))
            .map(|p| p.distance)
            .unwrap_or(0.0)
    }

    /// Remove a node from the arena, returning it
    pub(crate) fn take(&mut self, id: NodeId) -> Option<ClusterNode> {
        self.nodes.get_mut(id).and_then(|x| x.take())
    }

    /// Leaves beneath `id` (itself if it is a leaf), expanding merge
    /// nodes breadth-first.
    pub fn leaves_under(&self, id: NodeId) -> Vec<NodeId> {
        let mut queue = VecDeque::from([id]);
        let mut leaves = vec![];
        while let Some(curr) = queue.pop_front() {
            match self.node(curr).map(|x| &x.kind) {
                Some(NodeKind::Internal { left, right }) => {
                    queue.push_back(*left);
                    queue.push_back(*right);
                }
                Some(NodeKind::Leaf(_)) => leaves.push(curr),
                None => {}
            }
        }
        leaves
    }

    /// Every node beneath `id`, including `id` itself
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut queue = VecDeque::from([id]);
        let mut nodes = vec![];
        while let Some(curr) = queue.pop_front() {
            let Some(node) = self.node(curr) else {
                continue;
            };
            if let Some((left, right)) = node.children() {
                queue.push_back(left);
                queue.push_back(right);
            }
            nodes.push(curr);
        }
        nodes
    }

    /// Left-to-right leaf sequence of the dendrogram
    pub fn leaf_order(&self) -> Vec<NodeId> {
        let mut stack = vec![self.root];
        let mut order = Vec::with_capacity(self.num_original_leaves);
        while let Some(curr) = stack.pop() {
            match self.node(curr).map(|x| &x.kind) {
                Some(NodeKind::Internal { left, right }) => {
                    stack.push(*right);
                    stack.push(*left);
                }
                Some(NodeKind::Leaf(_)) => order.push(curr),
                None => {}
            }
        }
        order
    }

    /// Largest merge distance within each subtree, indexed by id
    /// (`NaN` for removed slots).
    pub fn subtree_max_distances(&self) -> Vec<f64> {
        let mut max_dist = vec![f64::NAN; self.nodes.len()];
        // children always precede their parent
        for node in self.iter() {
            max_dist[node.id] = match node.children() {
                Some((left, right)) => node.distance.max(max_dist[left]).max(max_dist[right]),
                None => node.distance,
            };
        }
        max_dist
    }

    /// Recompute every merge node's count as the number of leaves
    /// beneath it, walking up from each leaf.
    pub fn recount(&mut self) {
        for node in self.iter_mut() {
            node.count = if node.is_leaf() { 1 } else { 0 };
        }

        for leaf in self.leaf_ids() {
            let mut parent = self.node(leaf).and_then(|x| x.parent);
            while let Some(p) = parent {
                parent = match self.node_mut(p) {
                    Some(node) => {
                        node.count += 1;
                        node.parent
                    }
                    None => None,
                };
            }
        }
    }

    /// Check parent/child agreement, a single root and leaf counts.
    pub fn validate(&self) -> anyhow::Result<()> {
        let roots: Vec<NodeId> = self
            .iter()
            .filter(|x| x.parent.is_none())
            .map(|x| x.id)
            .collect();

        if roots != [self.root] {
            anyhow::bail!("expected the single root {}, found {:?}", self.root, roots);
        }

        for node in self.iter() {
            if let Some(p) = node.parent {
                let parent = self
                    .node(p)
                    .ok_or_else(|| anyhow::anyhow!("node {}: missing parent {}", node.id, p))?;
                match parent.children() {
                    Some((left, right)) if left == node.id || right == node.id => {}
                    _ => anyhow::bail!("node {}: parent {} does not list it", node.id, p),
                }
            }

            if let Some((left, right)) = node.children() {
                let mut sum = 0;
                for child in [left, right] {
                    let child_node = self.node(child).ok_or_else(|| {
                        anyhow::anyhow!("node {}: missing child {}", node.id, child)
                    })?;
                    if child_node.parent != Some(node.id) {
                        anyhow::bail!("node {}: child {} points elsewhere", node.id, child);
                    }
                    sum += child_node.count;
                }
                if sum != node.count {
                    anyhow::bail!(
                        "node {}: count {} but children hold {}",
                        node.id,
                        node.count,
                        sum
                    );
                }
            } else if node.count != 1 {
                anyhow::bail!("leaf {}: count {} != 1", node.id, node.count);
            }
        }
        Ok(())
    }
}
