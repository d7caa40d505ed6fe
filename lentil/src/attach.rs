//! Join external per-object records onto the leaves of a cluster tree.
//!
//! Each leaf collects the records of the objects it absorbed. A leaf
//! holding a single object copies its record verbatim; a collapsed leaf
//! reduces the matching records column by column. Leaves without any
//! matching record are left out.

use crate::cluster_tree::ClusterTree;
use crate::column_axis::ColumnAxis;
use crate::lentil_common::*;
use crate::reducer::Reducer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Records keyed by object id, read-only during attachment
#[derive(Debug, Clone, Default)]
pub struct RecordTable {
    header: Option<Vec<Box<str>>>,
    records: HashMap<Box<str>, Vec<Box<str>>>,
}

impl RecordTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from rows whose first cell is the object id.
    ///
    /// * `rows` - table rows
    /// * `header` - whether the first row holds column labels
    pub fn from_rows<S: AsRef<str>>(rows: &[Vec<S>], header: bool) -> anyhow::Result<Self> {
        let mut table = Self::new();
        let mut rows = rows.iter();

        if header {
            let hdr = rows
                .next()
                .ok_or_else(|| anyhow::anyhow!("missing header row"))?;
            table.header = Some(hdr.iter().skip(1).map(|x| x.as_ref().into()).collect());
        }

        for row in rows {
            let Some((id, values)) = row.split_first() else {
                continue;
            };
            table.insert(id.as_ref(), values.iter().map(|x| x.as_ref().into()).collect());
        }
        Ok(table)
    }

    pub fn with_header(mut self, header: Vec<Box<str>>) -> Self {
        self.header = Some(header);
        self
    }

    pub fn insert(&mut self, object_id: &str, values: Vec<Box<str>>) {
        self.records.insert(object_id.into(), values);
    }

    pub fn get(&self, object_id: &str) -> Option<&[Box<str>]> {
        self.records.get(object_id).map(|x| x.as_slice())
    }

    pub fn header(&self) -> Option<&[Box<str>]> {
        self.header.as_deref()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Permute every record (and the header) into the clustered column
    /// order of `axis`.
    pub fn reorder_columns(&self, axis: &ColumnAxis) -> anyhow::Result<Self> {
        let header = match &self.header {
            Some(hdr) => Some(axis.reorder(hdr)?),
            None => None,
        };
        let mut records = HashMap::default();
        for (id, values) in self.records.iter() {
            records.insert(id.clone(), axis.reorder(values)?);
        }
        Ok(Self { header, records })
    }
}

/// Side-document of one attached table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachedData {
    /// leaf id -> row
    pub nodes: BTreeMap<NodeId, Vec<serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<Box<str>>>,
}

/// Join `table` onto the current leaves of `tree`.
///
/// Returns `None` when no object of the tree appears in the table.
pub fn attach_records(
    tree: &ClusterTree,
    table: &RecordTable,
    reducer: Reducer,
) -> anyhow::Result<Option<AttachedData>> {
    let mut nodes: BTreeMap<NodeId, Vec<serde_json::Value>> = BTreeMap::new();
    let mut num_matched = 0;

    for node in tree.iter() {
        let Some(data) = node.leaf_data() else {
            continue;
        };

        let matched: Vec<&[Box<str>]> = data
            .objects
            .iter()
            .filter_map(|obj| table.get(obj))
            .collect();
        num_matched += matched.len();

        let row = match matched.as_slice() {
            [] => continue,
            [record] if data.objects.len() == 1 => record
                .iter()
                .map(|x| serde_json::Value::String(x.to_string()))
                .collect(),
            records => reduce_records(records, reducer),
        };
        nodes.insert(node.id, row);
    }

    if nodes.is_empty() {
        info!("No data objects correspond with the clustered data according to their IDs. No additional data added.");
        return Ok(None);
    }

    info!(
        "Attached {} of {} records to {} of {} leaves",
        num_matched,
        table.len(),
        nodes.len(),
        tree.num_leaves()
    );

    Ok(Some(AttachedData {
        nodes,
        feature_names: table.header().map(|x| x.to_vec()),
    }))
}

/// Column-wise reduction of several records; short records leave holes
/// that count as missing.
fn reduce_records(records: &[&[Box<str>]], reducer: Reducer) -> Vec<serde_json::Value> {
    let ncol = records.iter().map(|x| x.len()).max().unwrap_or(0);
    (0..ncol)
        .map(|j| {
            let column: Vec<&str> = records
                .iter()
                .map(|r| r.get(j).map(|x| x.as_ref()).unwrap_or(""))
                .collect();
            reducer.reduce_literals(&column).into()
        })
        .collect()
}

/// One record per feature column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub features: Vec<Vec<Box<str>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<Box<str>>>,
}

impl ColumnMetadata {
    /// Check and arrange column metadata rows.
    ///
    /// * `rows` - one row per annotation, one value per feature column
    /// * `label_first` - whether the first cell of each row is its label
    /// * `feature_width` - number of feature columns
    /// * `axis` - clustered column order, if columns were clustered
    pub fn from_rows<S: AsRef<str>>(
        rows: &[Vec<S>],
        label_first: bool,
        feature_width: usize,
        axis: Option<&ColumnAxis>,
    ) -> anyhow::Result<Self> {
        let mut features = Vec::with_capacity(rows.len());
        let mut names = Vec::with_capacity(rows.len());

        for (i, row) in rows.iter().enumerate() {
            let mut values: Vec<Box<str>> = row.iter().map(|x| x.as_ref().into()).collect();
            if label_first && !values.is_empty() {
                names.push(values.remove(0));
            }

            if values.len() != feature_width {
                return Err(ConfigError::ColumnMetadataLength {
                    expected: feature_width,
                    found: values.len(),
                    row: i,
                }
                .into());
            }

            features.push(match axis {
                Some(axis) => axis.reorder(&values)?,
                None => values,
            });
        }

        info!("Adding column metadata: {} rows", features.len());

        Ok(Self {
            features,
            feature_names: if label_first { Some(names) } else { None },
        })
    }
}
