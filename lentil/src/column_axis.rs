//! Clustering along the feature (column) axis.
//!
//! The column tree is built by the same [`ClusterTree::build`] as the
//! row tree and kept entirely separate from it. Its leaf order, read
//! right to left, becomes the order in which every per-column vector
//! (features, feature names, alternative data, column metadata) is
//! emitted.

use crate::cluster_tree::ClusterTree;
use crate::lentil_common::*;
use crate::linkage::Merge;

#[derive(Debug, Clone)]
pub struct ColumnAxis {
    tree: ClusterTree,
    /// `order[k]` = original column shown at position `k`
    order: Vec<usize>,
}

impl ColumnAxis {
    /// Build the column tree over `num_columns` features
    pub fn build(num_columns: usize, merges: &[Merge]) -> anyhow::Result<Self> {
        let names: Vec<Box<str>> = (0..num_columns)
            .map(|j| j.to_string().into_boxed_str())
            .collect();
        let tree = ClusterTree::build_bare(&names, merges)?;

        let mut order = tree.leaf_order();
        order.reverse();

        debug!("Column order: {:?}", order);

        Ok(Self { tree, order })
    }

    pub fn tree(&self) -> &ClusterTree {
        &self.tree
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn num_columns(&self) -> usize {
        self.order.len()
    }

    /// Permute one row into the clustered column order
    pub fn reorder<T: Clone>(&self, row: &[T]) -> anyhow::Result<Vec<T>> {
        if row.len() != self.order.len() {
            return Err(ConfigError::ColumnOrderLength {
                expected: self.order.len(),
                found: row.len(),
            }
            .into());
        }
        Ok(self.order.iter().map(|&j| row[j].clone()).collect())
    }

    /// Like [`Self::reorder`], but rows without any columns pass through
    pub fn reorder_or_empty<T: Clone>(&self, row: &[T]) -> anyhow::Result<Vec<T>> {
        if row.is_empty() {
            Ok(vec![])
        } else {
            self.reorder(row)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reversed_leaf_order() -> anyhow::Result<()> {
        // columns {2, 0} @1, then 1 joins @3: leaf order 2, 0, 1
        let merges = vec![Merge::new(2, 0, 1.0, 2), Merge::new(3, 1, 3.0, 3)];
        let axis = ColumnAxis::build(3, &merges)?;
        assert_eq!(axis.order(), &[1, 0, 2]);
        assert_eq!(axis.reorder(&["a", "b", "c"])?, vec!["b", "a", "c"]);
        assert_eq!(axis.tree().num_nodes(), 5);
        Ok(())
    }

    #[test]
    fn test_reorder_length_mismatch() -> anyhow::Result<()> {
        let axis = ColumnAxis::build(2, &[Merge::new(0, 1, 1.0, 2)])?;
        let err = axis.reorder(&[1, 2, 3]).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::ColumnOrderLength {
                expected: 2,
                found: 3
            })
        );
        assert!(axis.reorder_or_empty::<i32>(&[])?.is_empty());
        Ok(())
    }
}
