//! Serializable cluster heatmap document.
//!
//! ```text
//! {
//!   "data": { "nodes": { "<id>": node, ... }, "feature_names": [...] },
//!   "column_dendrogram": { "nodes": { ... } },
//!   "metadata": { "nodes": { "<leaf id>": [...] }, "feature_names": [...] },
//!   "alternative_data": { ... },
//!   "column_metadata": { "features": [[...]], "feature_names": [...] }
//! }
//! ```
//!
//! Distances and the summarized features of collapsed leaves are rounded
//! to three decimals when the document is assembled; features of single
//! objects are written as given.

use crate::attach::{AttachedData, ColumnMetadata};
use crate::cluster_tree::{ClusterNode, ClusterTree, NodeKind};
use crate::lentil_common::*;
use matrix_util::common_io::{mkdir, read_to_string, write_text};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One node as emitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub count: usize,
    pub distance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_child: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_child: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objects: Option<Vec<Box<str>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<Option<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<usize>,
}

impl NodeRecord {
    /// Topology only: count, distance, parent and children
    fn skeleton(node: &ClusterNode) -> Self {
        let (left_child, right_child) = match node.children() {
            Some((l, r)) => (Some(l), Some(r)),
            None => (None, None),
        };
        Self {
            count: node.count,
            distance: round3(node.distance),
            parent: node.parent,
            left_child,
            right_child,
            objects: None,
            features: None,
            label: None,
            structure: None,
            color: None,
            cluster: None,
        }
    }

    /// Full row-tree record; features are dropped unless `write_data`.
    /// Only summarized features of collapsed leaves are rounded.
    fn from_node(node: &ClusterNode, write_data: bool) -> Self {
        let mut record = Self::skeleton(node);
        if let NodeKind::Leaf(data) = &node.kind {
            record.objects = Some(data.objects.clone());
            record.features = Some(match (write_data, data.objects.len() > 1) {
                (false, _) => vec![],
                (true, true) => data.features.iter().map(|x| x.map(round3)).collect(),
                (true, false) => data.features.clone(),
            });
            record.label = data.label.clone();
            record.structure = data.structure.clone();
        }
        record.color = node.color.clone();
        record.cluster = node.cluster;
        record
    }

    pub fn is_leaf(&self) -> bool {
        self.left_child.is_none() && self.right_child.is_none()
    }
}

/// Node table of the row dendrogram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSection {
    pub nodes: BTreeMap<NodeId, NodeRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<Box<str>>>,
}

impl TreeSection {
    pub fn from_tree(
        tree: &ClusterTree,
        feature_names: Option<Vec<Box<str>>>,
        write_data: bool,
    ) -> Self {
        Self {
            nodes: tree
                .iter()
                .map(|x| (x.id, NodeRecord::from_node(x, write_data)))
                .collect(),
            feature_names,
        }
    }
}

/// Node table of the column dendrogram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDendrogram {
    pub nodes: BTreeMap<NodeId, NodeRecord>,
}

impl ColumnDendrogram {
    pub fn from_tree(tree: &ClusterTree) -> Self {
        Self {
            nodes: tree
                .iter()
                .map(|x| (x.id, NodeRecord::skeleton(x)))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapDocument {
    pub data: TreeSection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_dendrogram: Option<ColumnDendrogram>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<AttachedData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative_data: Option<AttachedData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_metadata: Option<ColumnMetadata>,
}

impl HeatmapDocument {
    /// Serialize to JSON, either compact (`minify`) or with four-space
    /// indentation.
    pub fn to_json(&self, minify: bool) -> anyhow::Result<String> {
        if minify {
            return Ok(serde_json::to_string(self)?);
        }
        let mut buf = Vec::new();
        let fmt = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, fmt);
        self.serialize(&mut ser)?;
        Ok(String::from_utf8(buf)?)
    }

    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Write the document to `output_file` (`.gz` compresses, `stdout`
    /// prints)
    pub fn write_json(&self, output_file: &str, minify: bool) -> anyhow::Result<()> {
        let text = self.to_json(minify)?;
        if !output_file.eq_ignore_ascii_case("stdout") {
            mkdir(output_file)?;
        }
        write_text(&text, output_file)?;
        info!("Wrote cluster heatmap to {}", output_file);
        Ok(())
    }

    pub fn read_json(input_file: &str) -> anyhow::Result<Self> {
        Self::from_json(&read_to_string(input_file)?)
    }

    /// Leaf records of the row dendrogram
    pub fn leaves(&self) -> impl Iterator<Item = (&NodeId, &NodeRecord)> {
        self.data.nodes.iter().filter(|(_, x)| x.is_leaf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linkage::{LeafInput, Merge};

    fn doc() -> HeatmapDocument {
        let leaves = vec![
            LeafInput::dense("a", &[1.23456, 2.0]).with_label("first"),
            LeafInput::new("b", vec![None, Some(4.0)]),
        ];
        let tree = ClusterTree::build(leaves, &[Merge::new(0, 1, 0.98765, 2)]).unwrap();
        HeatmapDocument {
            data: TreeSection::from_tree(&tree, Some(vec!["x".into(), "y".into()]), true),
            column_dendrogram: None,
            metadata: None,
            alternative_data: None,
            column_metadata: None,
        }
    }

    #[test]
    fn test_rounding_and_fields() {
        let doc = doc();
        let root = &doc.data.nodes[&2];
        assert_eq!(root.distance, 0.988);
        assert_eq!((root.left_child, root.right_child), (Some(0), Some(1)));
        assert!(root.parent.is_none());

        let a = &doc.data.nodes[&0];
        assert_eq!(a.features, Some(vec![Some(1.23456), Some(2.0)]));
        assert_eq!(a.label.as_deref(), Some("first"));
        assert_eq!(a.parent, Some(2));
        assert_eq!(doc.leaves().count(), 2);
    }

    #[test]
    fn test_collapsed_features_rounded() -> anyhow::Result<()> {
        let leaves = vec![
            LeafInput::dense("a", &[1.0]),
            LeafInput::dense("b", &[1.0001]),
            LeafInput::dense("c", &[7.77777]),
        ];
        let merges = [Merge::new(0, 1, 0.1, 2), Merge::new(3, 2, 4.0, 3)];
        let mut tree = ClusterTree::build(leaves, &merges)?;
        crate::compress::compress_tree(&mut tree, 0.5, crate::Reducer::Mean)?;

        let section = TreeSection::from_tree(&tree, None, true);
        assert_eq!(section.nodes[&3].features, Some(vec![Some(1.0)]));
        assert_eq!(section.nodes[&2].features, Some(vec![Some(7.77777)]));
        Ok(())
    }

    #[test]
    fn test_json_shape() -> anyhow::Result<()> {
        let value: serde_json::Value = serde_json::from_str(&doc().to_json(true)?)?;
        assert_eq!(value["data"]["nodes"]["2"]["left_child"], 0);
        assert_eq!(value["data"]["nodes"]["1"]["features"][0], serde_json::Value::Null);
        assert!(value["data"]["nodes"]["2"].get("objects").is_none());
        assert!(value.get("metadata").is_none());
        Ok(())
    }

    #[test]
    fn test_minified_has_no_whitespace_layout() -> anyhow::Result<()> {
        let doc = doc();
        let compact = doc.to_json(true)?;
        let pretty = doc.to_json(false)?;
        assert!(!compact.contains('\n'));
        assert!(pretty.contains("\n    \"data\""));
        assert_eq!(HeatmapDocument::from_json(&compact)?, doc);
        assert_eq!(HeatmapDocument::from_json(&pretty)?, doc);
        Ok(())
    }
}
