//! Gradient boosted regression model
//!
//! Scores are `link_inv(init_f + sum of tree outputs)`. Input frames are
//! matched to model columns by name: columns the model does not know are
//! ignored, model columns absent from the frame are scored as missing, and
//! categorical levels outside the training domain are scored as missing.

use crate::artifact::{ColumnDef, ColumnType, Distribution, ModelArtifact};
use crate::frame::{level_string, Column, Frame};
use crate::tree::Tree;
use carprice_core::{Error, Result};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Name of the single column in a prediction frame
pub const PREDICT_COLUMN: &str = "predict";

/// A compiled GBM ready for scoring
#[derive(Debug, Clone)]
pub struct GbmModel {
    name: String,
    algorithm: String,
    distribution: Distribution,
    response_column: Option<String>,
    init_f: f64,
    columns: Vec<ColumnDef>,
    /// Level string to level code, per categorical column
    level_index: Vec<HashMap<String, u32>>,
    trees: Vec<Tree>,
}

impl GbmModel {
    /// Validate an artifact and compile its trees
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self> {
        if artifact.trees.is_empty() {
            return Err(Error::invalid_artifact("model has no trees"));
        }
        if !artifact.init_f.is_finite() {
            return Err(Error::invalid_artifact("init_f must be finite"));
        }

        let mut seen = HashMap::new();
        for (i, column) in artifact.columns.iter().enumerate() {
            if seen.insert(column.name.as_str(), i).is_some() {
                return Err(Error::invalid_artifact(format!(
                    "duplicate column '{}'",
                    column.name
                )));
            }
            if column.column_type == ColumnType::Categorical && column.domain.is_empty() {
                return Err(Error::invalid_artifact(format!(
                    "categorical column '{}' has an empty domain",
                    column.name
                )));
            }
        }

        let shape: Vec<(ColumnType, usize)> = artifact
            .columns
            .iter()
            .map(|c| (c.column_type, c.domain.len()))
            .collect();

        let trees = artifact
            .trees
            .iter()
            .enumerate()
            .map(|(i, def)| {
                Tree::from_def(def, &shape).map_err(|e| match e {
                    Error::InvalidArtifact(msg) => {
                        Error::invalid_artifact(format!("tree {}: {}", i, msg))
                    }
                    other => other,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let level_index = artifact
            .columns
            .iter()
            .map(|c| {
                c.domain
                    .iter()
                    .enumerate()
                    .map(|(code, level)| (level.clone(), code as u32))
                    .collect()
            })
            .collect();

        Ok(Self {
            name: artifact.name,
            algorithm: artifact.algorithm,
            distribution: artifact.distribution,
            response_column: artifact.response_column,
            init_f: artifact.init_f,
            columns: artifact.columns,
            level_index,
            trees,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn distribution(&self) -> Distribution {
        self.distribution
    }

    pub fn response_column(&self) -> Option<&str> {
        self.response_column.as_deref()
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    /// Score every row of `frame`, returning a frame with a single
    /// [`PREDICT_COLUMN`] column
    pub fn predict(&self, frame: &Frame) -> Result<Frame> {
        let rows = self.adapt(frame)?;
        let scores = rows.iter().map(|row| self.score_row(row)).collect();
        Frame::new().with_column(PREDICT_COLUMN, Column::Numeric(scores))
    }

    /// Score one dense row already in model column order
    pub fn score_row(&self, row: &[f64]) -> f64 {
        let raw: f64 = self.init_f + self.trees.iter().map(|t| t.evaluate(row)).sum::<f64>();
        self.distribution.link_inv(raw)
    }

    /// Map a frame onto dense rows in model column order
    fn adapt(&self, frame: &Frame) -> Result<Vec<Vec<f64>>> {
        let nrows = frame.nrows();
        let mut rows = vec![vec![f64::NAN; self.columns.len()]; nrows];

        for (col, def) in self.columns.iter().enumerate() {
            let Some(column) = frame.column(&def.name) else {
                warn!(column = %def.name, "Input frame is missing a model column; scoring as missing");
                continue;
            };

            match (def.column_type, column) {
                (ColumnType::Numeric, Column::Numeric(values)) => {
                    for (row, value) in rows.iter_mut().zip(values) {
                        row[col] = *value;
                    }
                }
                (ColumnType::Numeric, Column::Categorical(_)) => {
                    return Err(Error::prediction(format!(
                        "column '{}' is categorical in the input but numeric in the model",
                        def.name
                    )));
                }
                (ColumnType::Categorical, Column::Categorical(levels)) => {
                    for (row, level) in rows.iter_mut().zip(levels) {
                        row[col] = self.level_code(col, level.as_deref());
                    }
                }
                (ColumnType::Categorical, Column::Numeric(values)) => {
                    debug!(column = %def.name, "Treating numeric input as category codes");
                    for (row, value) in rows.iter_mut().zip(values) {
                        row[col] = self.level_code(col, level_string(*value).as_deref());
                    }
                }
            }
        }

        Ok(rows)
    }

    fn level_code(&self, col: usize, level: Option<&str>) -> f64 {
        match level.and_then(|l| self.level_index[col].get(l)) {
            Some(code) => *code as f64,
            None => {
                if let Some(level) = level {
                    debug!(
                        column = %self.columns[col].name,
                        level = %level,
                        "Level not in training domain; scoring as missing"
                    );
                }
                f64::NAN
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{NodeDef, SplitDef, TreeDef};

    fn split(column: usize, threshold: Option<f64>, levels: Option<Vec<u32>>) -> NodeDef {
        NodeDef::Split(SplitDef {
            column,
            threshold,
            levels,
            na_left: false,
            left: 1,
            right: 2,
        })
    }

    fn artifact() -> ModelArtifact {
        ModelArtifact {
            name: "test_gbm".to_string(),
            algorithm: "gbm".to_string(),
            distribution: Distribution::Gaussian,
            response_column: Some("Price".to_string()),
            init_f: 1000.0,
            columns: vec![
                ColumnDef::numeric("HorsePower"),
                ColumnDef::categorical("Fuel Types", vec!["0".into(), "1".into(), "2".into()]),
            ],
            trees: vec![
                TreeDef {
                    nodes: vec![
                        split(0, Some(200.0), None),
                        NodeDef::Leaf(-100.0),
                        NodeDef::Leaf(300.0),
                    ],
                },
                TreeDef {
                    nodes: vec![
                        split(1, None, Some(vec![2])),
                        NodeDef::Leaf(50.0),
                        NodeDef::Leaf(-20.0),
                    ],
                },
            ],
        }
    }

    fn frame(horsepower: f64, fuel: f64) -> Frame {
        let mut frame = Frame::new()
            .with_column("HorsePower", Column::Numeric(vec![horsepower]))
            .unwrap()
            .with_column("Fuel Types", Column::Numeric(vec![fuel]))
            .unwrap();
        frame.as_factor("Fuel Types").unwrap();
        frame
    }

    #[test]
    fn test_predict_sums_trees() {
        let model = GbmModel::from_artifact(artifact()).unwrap();

        let out = model.predict(&frame(150.0, 2.0)).unwrap();
        assert_eq!(out.names(), &[PREDICT_COLUMN.to_string()]);
        assert_eq!(out.numeric_at(0, 0), Some(1000.0 - 100.0 + 50.0));

        let out = model.predict(&frame(250.0, 0.0)).unwrap();
        assert_eq!(out.numeric_at(0, 0), Some(1000.0 + 300.0 - 20.0));
    }

    #[test]
    fn test_unseen_level_scores_as_missing() {
        let model = GbmModel::from_artifact(artifact()).unwrap();
        // Level "9" is not in the domain; missing goes right
        let out = model.predict(&frame(150.0, 9.0)).unwrap();
        assert_eq!(out.numeric_at(0, 0), Some(1000.0 - 100.0 - 20.0));
    }

    #[test]
    fn test_missing_and_extra_columns() {
        let model = GbmModel::from_artifact(artifact()).unwrap();
        let frame = Frame::new()
            .with_column("HorsePower", Column::Numeric(vec![250.0]))
            .unwrap()
            .with_column("Colour", Column::Numeric(vec![4.0]))
            .unwrap();
        let out = model.predict(&frame).unwrap();
        assert_eq!(out.numeric_at(0, 0), Some(1000.0 + 300.0 - 20.0));
    }

    #[test]
    fn test_numeric_codes_for_categorical_column() {
        let model = GbmModel::from_artifact(artifact()).unwrap();
        let frame = Frame::new()
            .with_column("HorsePower", Column::Numeric(vec![150.0]))
            .unwrap()
            .with_column("Fuel Types", Column::Numeric(vec![2.0]))
            .unwrap();
        let out = model.predict(&frame).unwrap();
        assert_eq!(out.numeric_at(0, 0), Some(950.0));
    }

    #[test]
    fn test_categorical_input_for_numeric_column_fails() {
        let model = GbmModel::from_artifact(artifact()).unwrap();
        let mut frame = frame(150.0, 1.0);
        frame.as_factor("HorsePower").unwrap();
        assert!(matches!(model.predict(&frame), Err(Error::Prediction(_))));
    }

    #[test]
    fn test_log_link() {
        let mut artifact = artifact();
        artifact.distribution = Distribution::Poisson;
        artifact.init_f = 0.0;
        artifact.trees.truncate(1);
        artifact.trees[0].nodes = vec![NodeDef::Leaf(1.0)];
        let model = GbmModel::from_artifact(artifact).unwrap();
        let score = model.score_row(&[0.0, 0.0]);
        assert!((score - std::f64::consts::E).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_artifacts() {
        let mut no_trees = artifact();
        no_trees.trees.clear();
        assert!(GbmModel::from_artifact(no_trees).is_err());

        let mut duplicate = artifact();
        duplicate.columns[1].name = "HorsePower".to_string();
        assert!(GbmModel::from_artifact(duplicate).is_err());

        let mut empty_domain = artifact();
        empty_domain.columns[1].domain.clear();
        assert!(GbmModel::from_artifact(empty_domain).is_err());

        let mut bad_split = artifact();
        bad_split.trees[0].nodes[0] = split(0, Some(1.0), Some(vec![0]));
        let err = GbmModel::from_artifact(bad_split).unwrap_err();
        assert!(err.to_string().contains("tree 0"));
    }
}
