//! Inputs produced upstream of the tree: the merge sequence of an
//! agglomerative clustering run and the rows that were clustered.
//!
//! Merge ids follow the SciPy/MATLAB convention also used by `kodama`:
//! leaves are `0..n`, and the `i`-th merge creates cluster `n + i`.

/// A single agglomeration step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Merge {
    /// First cluster being merged (becomes the left child).
    pub left: usize,
    /// Second cluster being merged (becomes the right child).
    pub right: usize,
    /// Distance at which the two clusters merged.
    pub distance: f64,
    /// Number of leaves in the merged cluster.
    pub count: usize,
}

impl Merge {
    pub fn new(left: usize, right: usize, distance: f64, count: usize) -> Self {
        Self {
            left,
            right,
            distance,
            count,
        }
    }

    /// Read a linkage matrix where each row is
    /// `[left, right, distance, count]` stored as floats.
    pub fn from_linkage_rows(rows: &[[f64; 4]]) -> anyhow::Result<Vec<Merge>> {
        rows.iter()
            .enumerate()
            .map(|(i, row)| {
                let as_index = |x: f64| -> anyhow::Result<usize> {
                    if x < 0.0 || x.fract() != 0.0 {
                        anyhow::bail!("linkage row {}: invalid cluster index {}", i, x);
                    }
                    Ok(x as usize)
                };
                Ok(Merge::new(
                    as_index(row[0])?,
                    as_index(row[1])?,
                    row[2],
                    as_index(row[3])?,
                ))
            })
            .collect()
    }
}

impl From<(usize, usize, f64, usize)> for Merge {
    fn from((left, right, distance, count): (usize, usize, f64, usize)) -> Self {
        Merge::new(left, right, distance, count)
    }
}

/// One clustered row
#[derive(Debug, Clone, PartialEq)]
pub struct LeafInput {
    /// Object identifier used to join external records
    pub object_id: Box<str>,
    /// Feature values; `None` marks a missing value
    pub features: Vec<Option<f64>>,
    pub label: Option<Box<str>>,
    /// Auxiliary payload such as a structure string
    pub structure: Option<Box<str>>,
}

impl LeafInput {
    pub fn new(object_id: impl Into<Box<str>>, features: Vec<Option<f64>>) -> Self {
        Self {
            object_id: object_id.into(),
            features,
            label: None,
            structure: None,
        }
    }

    /// Convenience for rows without missing values
    pub fn dense(object_id: impl Into<Box<str>>, features: &[f64]) -> Self {
        Self::new(object_id, features.iter().copied().map(Some).collect())
    }

    pub fn with_label(mut self, label: impl Into<Box<str>>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_structure(mut self, structure: impl Into<Box<str>>) -> Self {
        self.structure = Some(structure.into());
        self
    }
}
