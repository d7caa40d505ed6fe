use std::fmt;

use crate::reducer::Reducer;

/// Invalid settings or inputs that abort a run.
///
/// These travel inside `anyhow::Error`; use
/// `err.downcast_ref::<ConfigError>()` to inspect them.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Reducer name other than median, mean, frequency.
    UnknownReducer(String),

    /// A reducer that cannot summarize numeric features.
    NonNumericReducer(Reducer),

    /// Column metadata row whose length differs from the feature width.
    ColumnMetadataLength {
        /// Number of feature columns.
        expected: usize,
        /// Length of the offending row.
        found: usize,
        /// Row index within the column metadata.
        row: usize,
    },

    /// Row whose width does not match the clustered column order.
    ColumnOrderLength {
        /// Number of clustered columns.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },

    /// Cluster colouring needs at least two clusters.
    ClusterCount(usize),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownReducer(name) => write!(
                f,
                "unknown reducer '{name}': possible values are median, mean, frequency"
            ),
            ConfigError::NonNumericReducer(reducer) => {
                write!(f, "reducer '{reducer}' cannot summarize numeric features")
            }
            ConfigError::ColumnMetadataLength {
                expected,
                found,
                row,
            } => write!(
                f,
                "column metadata row {row} has {found} values, but there are {expected} features"
            ),
            ConfigError::ColumnOrderLength { expected, found } => write!(
                f,
                "row has {found} columns, but the column dendrogram has {expected} leaves"
            ),
            ConfigError::ClusterCount(k) => {
                write!(f, "cannot colour {k} cluster(s): need at least 2")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
