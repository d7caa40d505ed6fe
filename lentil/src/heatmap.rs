//! The cluster heatmap pipeline.
//!
//! (1) Build the row tree (and the column tree when a column linkage is
//! given), (2) optionally compress it to about `compress` leaves,
//! (3) optionally colour `color_clusters` clusters, then attach any
//! number of external tables before exporting a [`HeatmapDocument`].

use crate::attach::{attach_records, AttachedData, ColumnMetadata, RecordTable};
use crate::cluster_tree::{ClusterTree, NodeKind};
use crate::coloring::{color_clusters, ClusterColoring, DEFAULT_COLOR_SEED};
use crate::column_axis::ColumnAxis;
use crate::compress::{compress_tree, CompressionSummary};
use crate::document::{ColumnDendrogram, HeatmapDocument, TreeSection};
use crate::lentil_common::*;
use crate::linkage::{LeafInput, Merge};
use crate::reducer::Reducer;
use crate::threshold::distance_threshold;

/// Settings of one heatmap run
#[derive(Debug, Clone)]
pub struct HeatmapArgs {
    /// Target number of rows after compression (0 = no compression)
    pub compress: usize,
    /// How features of merged rows are summarized
    pub compressed_value: Reducer,
    /// Whether leaf features are written to the document
    pub write_data: bool,
    /// Number of clusters to colour (0 = no colouring)
    pub color_clusters: usize,
    pub color_seed: u64,
}

impl Default for HeatmapArgs {
    fn default() -> Self {
        Self {
            compress: 0,
            compressed_value: Reducer::Median,
            write_data: true,
            color_clusters: 0,
            color_seed: DEFAULT_COLOR_SEED,
        }
    }
}

impl HeatmapArgs {
    pub fn with_compression(mut self, target_rows: usize, reducer: Reducer) -> Self {
        self.compress = target_rows;
        self.compressed_value = reducer;
        self
    }

    pub fn with_color_clusters(mut self, cluster_count: usize) -> Self {
        self.color_clusters = cluster_count;
        self
    }

    pub fn with_color_seed(mut self, seed: u64) -> Self {
        self.color_seed = seed;
        self
    }

    pub fn without_data(mut self) -> Self {
        self.write_data = false;
        self
    }
}

/// Clustered rows and their merge history
#[derive(Debug, Clone, Default)]
pub struct HeatmapInput {
    pub leaves: Vec<LeafInput>,
    pub row_linkage: Vec<Merge>,
    /// Merge history of the feature columns, for dual-axis clustering
    pub column_linkage: Option<Vec<Merge>>,
    pub feature_names: Option<Vec<Box<str>>>,
}

impl HeatmapInput {
    pub fn new(leaves: Vec<LeafInput>, row_linkage: Vec<Merge>) -> Self {
        Self {
            leaves,
            row_linkage,
            ..Default::default()
        }
    }

    pub fn with_column_linkage(mut self, column_linkage: Vec<Merge>) -> Self {
        self.column_linkage = Some(column_linkage);
        self
    }

    pub fn with_feature_names(mut self, names: Vec<Box<str>>) -> Self {
        self.feature_names = Some(names);
        self
    }
}

/// A clustered, possibly compressed and coloured, heatmap
pub struct ClusterHeatmap {
    tree: ClusterTree,
    column_axis: Option<ColumnAxis>,
    feature_names: Option<Vec<Box<str>>>,
    feature_width: usize,
    write_data: bool,
    compression: Option<CompressionSummary>,
    coloring: Option<ClusterColoring>,
    metadata: Option<AttachedData>,
    alternative_data: Option<AttachedData>,
    column_metadata: Option<ColumnMetadata>,
}

impl ClusterHeatmap {
    pub fn new(input: HeatmapInput, args: &HeatmapArgs) -> anyhow::Result<Self> {
        let HeatmapInput {
            mut leaves,
            row_linkage,
            column_linkage,
            mut feature_names,
        } = input;

        let feature_width = leaves.first().map(|x| x.features.len()).unwrap_or(0);

        let column_axis = match column_linkage {
            Some(merges) => {
                info!("Building column dendrogram over {} features", feature_width);
                let axis = ColumnAxis::build(feature_width, &merges)?;
                for leaf in leaves.iter_mut() {
                    leaf.features = axis.reorder_or_empty(&leaf.features)?;
                }
                if let Some(names) = feature_names.as_mut() {
                    *names = axis.reorder(names.as_slice())?;
                }
                Some(axis)
            }
            None => None,
        };

        info!(
            "Building row dendrogram: {} rows, {} merges",
            leaves.len(),
            row_linkage.len()
        );
        let mut tree = ClusterTree::build(leaves, &row_linkage)?;

        let mut compression = None;
        if args.compress > 0 {
            let threshold = distance_threshold(&tree, args.compress);
            info!("Distance threshold for compression: {:.3}", threshold);
            if threshold >= 0.0 {
                compression = Some(compress_tree(
                    &mut tree,
                    threshold,
                    args.compressed_value,
                )?);
            }
        }

        let coloring = if args.color_clusters > 1 {
            color_clusters(&mut tree, args.color_clusters, args.color_seed)?
        } else {
            None
        };

        if log::log_enabled!(log::Level::Debug) {
            match tree.validate() {
                Ok(_) => debug!("Row dendrogram: {} nodes, consistent", tree.num_nodes()),
                Err(e) => debug!("Row dendrogram inconsistent: {}", e),
            }
        }

        Ok(Self {
            tree,
            column_axis,
            feature_names,
            feature_width,
            write_data: args.write_data,
            compression,
            coloring,
            metadata: None,
            alternative_data: None,
            column_metadata: None,
        })
    }

    pub fn tree(&self) -> &ClusterTree {
        &self.tree
    }

    pub fn column_axis(&self) -> Option<&ColumnAxis> {
        self.column_axis.as_ref()
    }

    pub fn compression(&self) -> Option<&CompressionSummary> {
        self.compression.as_ref()
    }

    pub fn coloring(&self) -> Option<&ClusterColoring> {
        self.coloring.as_ref()
    }

    pub fn is_compressed(&self) -> bool {
        self.compression.is_some()
    }

    /// Descriptive per-object records; `reducer` applies to collapsed rows
    pub fn add_metadata(&mut self, table: &RecordTable, reducer: Reducer) -> anyhow::Result<()> {
        info!("Adding metadata: {} rows", table.len());
        self.metadata = attach_records(&self.tree, table, reducer)?;
        Ok(())
    }

    /// A second table of measurements; with dual-axis clustering its
    /// columns are first put into the clustered column order.
    pub fn add_alternative_data(
        &mut self,
        table: &RecordTable,
        reducer: Reducer,
    ) -> anyhow::Result<()> {
        info!("Adding alternative data: {} rows", table.len());
        self.alternative_data = match &self.column_axis {
            Some(axis) => attach_records(&self.tree, &table.reorder_columns(axis)?, reducer)?,
            None => attach_records(&self.tree, table, reducer)?,
        };
        Ok(())
    }

    /// One record per feature column; every row must match the feature
    /// width.
    pub fn add_column_metadata<S: AsRef<str>>(
        &mut self,
        rows: &[Vec<S>],
        label_first: bool,
    ) -> anyhow::Result<()> {
        self.column_metadata = Some(ColumnMetadata::from_rows(
            rows,
            label_first,
            self.feature_width,
            self.column_axis.as_ref(),
        )?);
        Ok(())
    }

    /// Number of objects covered by the leaves (equals the input rows)
    pub fn num_objects(&self) -> usize {
        self.tree
            .iter()
            .map(|x| match &x.kind {
                NodeKind::Leaf(data) => data.objects.len(),
                _ => 0,
            })
            .sum()
    }

    pub fn to_document(&self) -> HeatmapDocument {
        let feature_names = self.feature_names.as_ref().map(|names| {
            if self.write_data {
                names.clone()
            } else {
                vec![]
            }
        });

        HeatmapDocument {
            data: TreeSection::from_tree(&self.tree, feature_names, self.write_data),
            column_dendrogram: self
                .column_axis
                .as_ref()
                .map(|axis| ColumnDendrogram::from_tree(axis.tree())),
            metadata: self.metadata.clone(),
            alternative_data: self.alternative_data.clone(),
            column_metadata: self.column_metadata.clone(),
        }
    }
}
