//! Compiled regression trees
//!
//! Rows are dense `f64` slices in model column order. Categorical values are
//! stored as level codes and missing values as NaN.

use crate::artifact::{ColumnType, NodeDef, TreeDef};
use carprice_core::{Error, Result};

/// Split test applied at an internal node
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `value < threshold` goes left
    LessThan(f64),
    /// Level codes that go left, sorted
    InLevels(Vec<u32>),
}

impl Condition {
    fn goes_left(&self, value: f64) -> bool {
        match self {
            Self::LessThan(threshold) => value < *threshold,
            Self::InLevels(levels) => levels.binary_search(&(value as u32)).is_ok(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Split {
        column: usize,
        condition: Condition,
        na_left: bool,
        left: usize,
        right: usize,
    },
    Leaf(f64),
}

impl Node {
    pub fn leaf(value: f64) -> Self {
        Self::Leaf(value)
    }

    pub fn less_than(column: usize, threshold: f64, left: usize, right: usize) -> Self {
        Self::Split {
            column,
            condition: Condition::LessThan(threshold),
            na_left: false,
            left,
            right,
        }
    }

    pub fn in_levels(column: usize, mut levels: Vec<u32>, left: usize, right: usize) -> Self {
        levels.sort_unstable();
        levels.dedup();
        Self::Split {
            column,
            condition: Condition::InLevels(levels),
            na_left: false,
            left,
            right,
        }
    }

    /// Send missing values left at this split
    pub fn missing_left(mut self) -> Self {
        if let Self::Split { na_left, .. } = &mut self {
            *na_left = true;
        }
        self
    }
}

/// A single regression tree; node 0 is the root
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Build a tree and check its structure against the model's columns.
    ///
    /// `columns` gives the type and domain size of every model column. Child
    /// indices must point strictly forward, so traversal always terminates.
    pub fn new(nodes: Vec<Node>, columns: &[(ColumnType, usize)]) -> Result<Self> {
        if nodes.is_empty() {
            return Err(Error::invalid_artifact("tree has no nodes"));
        }

        for (index, node) in nodes.iter().enumerate() {
            let Node::Split {
                column,
                condition,
                left,
                right,
                ..
            } = node
            else {
                continue;
            };

            for child in [*left, *right] {
                if child <= index || child >= nodes.len() {
                    return Err(Error::invalid_artifact(format!(
                        "node {} has invalid child {}",
                        index, child
                    )));
                }
            }

            let (column_type, domain_len) = columns.get(*column).copied().ok_or_else(|| {
                Error::invalid_artifact(format!("node {} splits on unknown column {}", index, column))
            })?;

            match (condition, column_type) {
                (Condition::LessThan(threshold), ColumnType::Numeric) => {
                    if threshold.is_nan() {
                        return Err(Error::invalid_artifact(format!(
                            "node {} has a NaN threshold",
                            index
                        )));
                    }
                }
                (Condition::InLevels(levels), ColumnType::Categorical) => {
                    if let Some(level) = levels.iter().find(|l| **l as usize >= domain_len) {
                        return Err(Error::invalid_artifact(format!(
                            "node {} references level {} outside a domain of {}",
                            index, level, domain_len
                        )));
                    }
                }
                _ => {
                    return Err(Error::invalid_artifact(format!(
                        "node {} split kind does not match column {} type",
                        index, column
                    )));
                }
            }
        }

        Ok(Self { nodes })
    }

    /// Compile a serialized tree
    pub fn from_def(def: &TreeDef, columns: &[(ColumnType, usize)]) -> Result<Self> {
        let nodes = def
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| match node {
                NodeDef::Leaf(value) => Ok(Node::Leaf(*value)),
                NodeDef::Split(split) => {
                    let condition = match (&split.threshold, &split.levels) {
                        (Some(threshold), None) => Condition::LessThan(*threshold),
                        (None, Some(levels)) => {
                            let mut levels = levels.clone();
                            levels.sort_unstable();
                            levels.dedup();
                            Condition::InLevels(levels)
                        }
                        _ => {
                            return Err(Error::invalid_artifact(format!(
                                "node {} must set exactly one of threshold or levels",
                                index
                            )))
                        }
                    };
                    Ok(Node::Split {
                        column: split.column,
                        condition,
                        na_left: split.na_left,
                        left: split.left,
                        right: split.right,
                    })
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(nodes, columns)
    }

    /// Walk the tree for one row and return the leaf value
    pub fn evaluate(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf(value) => return *value,
                Node::Split {
                    column,
                    condition,
                    na_left,
                    left,
                    right,
                } => {
                    let value = row.get(*column).copied().unwrap_or(f64::NAN);
                    let go_left = if value.is_nan() {
                        *na_left
                    } else {
                        condition.goes_left(value)
                    };
                    index = if go_left { *left } else { *right };
                }
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges on the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        let mut depths = vec![0usize; self.nodes.len()];
        let mut max = 0;
        for (index, node) in self.nodes.iter().enumerate() {
            if let Node::Split { left, right, .. } = node {
                let child_depth = depths[index] + 1;
                depths[*left] = depths[*left].max(child_depth);
                depths[*right] = depths[*right].max(child_depth);
                max = max.max(child_depth);
            }
        }
        max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: [(ColumnType, usize); 2] = [(ColumnType::Numeric, 0), (ColumnType::Categorical, 4)];

    fn stump() -> Tree {
        Tree::new(
            vec![
                Node::less_than(0, 100.0, 1, 2),
                Node::leaf(-10.0),
                Node::leaf(10.0),
            ],
            &COLUMNS,
        )
        .unwrap()
    }

    #[test]
    fn test_numeric_split() {
        let tree = stump();
        assert_eq!(tree.evaluate(&[99.9, 0.0]), -10.0);
        // Threshold itself goes right
        assert_eq!(tree.evaluate(&[100.0, 0.0]), 10.0);
    }

    #[test]
    fn test_missing_direction() {
        assert_eq!(stump().evaluate(&[f64::NAN, 0.0]), 10.0);

        let tree = Tree::new(
            vec![
                Node::less_than(0, 100.0, 1, 2).missing_left(),
                Node::leaf(-10.0),
                Node::leaf(10.0),
            ],
            &COLUMNS,
        )
        .unwrap();
        assert_eq!(tree.evaluate(&[f64::NAN, 0.0]), -10.0);
    }

    #[test]
    fn test_categorical_split() {
        let tree = Tree::new(
            vec![
                Node::in_levels(1, vec![3, 1], 1, 2),
                Node::leaf(1.0),
                Node::leaf(2.0),
            ],
            &COLUMNS,
        )
        .unwrap();

        assert_eq!(tree.evaluate(&[0.0, 1.0]), 1.0);
        assert_eq!(tree.evaluate(&[0.0, 3.0]), 1.0);
        assert_eq!(tree.evaluate(&[0.0, 2.0]), 2.0);
        assert_eq!(tree.evaluate(&[0.0, f64::NAN]), 2.0);
    }

    #[test]
    fn test_rejects_backward_child() {
        let result = Tree::new(
            vec![Node::less_than(0, 1.0, 0, 1), Node::leaf(0.0)],
            &COLUMNS,
        );
        assert!(matches!(result, Err(Error::InvalidArtifact(_))));
    }

    #[test]
    fn test_rejects_mismatched_split_kind() {
        let result = Tree::new(
            vec![Node::less_than(1, 1.0, 1, 2), Node::leaf(0.0), Node::leaf(1.0)],
            &COLUMNS,
        );
        assert!(result.is_err());

        let result = Tree::new(
            vec![Node::in_levels(1, vec![4], 1, 2), Node::leaf(0.0), Node::leaf(1.0)],
            &COLUMNS,
        );
        assert!(result.is_err(), "level outside the domain");
    }

    #[test]
    fn test_rejects_empty_tree() {
        assert!(Tree::new(vec![], &COLUMNS).is_err());
    }

    #[test]
    fn test_depth() {
        assert_eq!(stump().depth(), 1);
        let single = Tree::new(vec![Node::leaf(3.0)], &COLUMNS).unwrap();
        assert_eq!(single.depth(), 0);
        assert_eq!(single.evaluate(&[]), 3.0);
    }
}
