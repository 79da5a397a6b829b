//! On-disk representation of an exported GBM
//!
//! The artifact is a JSON document holding the column schema (with the level
//! domain of every categorical column), the initial prediction, the link
//! distribution and the trees in flat node-array form.

use carprice_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up when the artifact path is a directory
pub const ARTIFACT_FILE_NAME: &str = "model.json";

/// Serialized GBM model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Model identifier assigned by the training run
    pub name: String,

    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    #[serde(default)]
    pub distribution: Distribution,

    /// Name of the column the model was trained to predict
    #[serde(default)]
    pub response_column: Option<String>,

    /// Initial prediction added to the sum of tree outputs (link scale)
    pub init_f: f64,

    /// Predictor columns; splits refer to them by index
    pub columns: Vec<ColumnDef>,

    pub trees: Vec<TreeDef>,
}

fn default_algorithm() -> String {
    "gbm".to_string()
}

impl ModelArtifact {
    /// Parse an artifact from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Response distribution, which fixes the inverse link applied to raw scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distribution {
    /// Identity link
    #[default]
    Gaussian,
    /// Log link
    Poisson,
    /// Log link
    Gamma,
    /// Log link
    Tweedie,
}

impl Distribution {
    /// Map a raw link-scale score to the response scale
    pub fn link_inv(self, f: f64) -> f64 {
        match self {
            Self::Gaussian => f,
            Self::Poisson | Self::Gamma | Self::Tweedie => f.exp(),
        }
    }
}

/// Column type as seen by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Numeric,
    Categorical,
}

/// Predictor column definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,

    #[serde(rename = "type")]
    pub column_type: ColumnType,

    /// Level strings for categorical columns, indexed by level code
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domain: Vec<String>,
}

impl ColumnDef {
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: ColumnType::Numeric,
            domain: Vec::new(),
        }
    }

    pub fn categorical(name: impl Into<String>, domain: Vec<String>) -> Self {
        Self {
            name: name.into(),
            column_type: ColumnType::Categorical,
            domain,
        }
    }
}

/// A tree as a flat node array; node 0 is the root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeDef {
    pub nodes: Vec<NodeDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeDef {
    Split(SplitDef),
    Leaf(f64),
}

/// Internal node.
///
/// Exactly one of `threshold` (numeric split, `value < threshold` goes left)
/// or `levels` (categorical split, listed level codes go left) is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitDef {
    /// Index into [`ModelArtifact::columns`]
    pub column: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub levels: Option<Vec<u32>>,

    /// Direction taken by missing values
    #[serde(default)]
    pub na_left: bool,

    pub left: usize,
    pub right: usize,
}

/// Resolve the artifact file for a path that is either the JSON file itself
/// or a directory containing [`ARTIFACT_FILE_NAME`].
pub fn resolve_artifact_path(path: &Path) -> Result<PathBuf> {
    if path.is_dir() {
        let file = path.join(ARTIFACT_FILE_NAME);
        if !file.is_file() {
            return Err(Error::invalid_artifact(format!(
                "{} does not contain {}",
                path.display(),
                ARTIFACT_FILE_NAME
            )));
        }
        Ok(file)
    } else if path.is_file() {
        Ok(path.to_path_buf())
    } else {
        Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("model artifact not found at {}", path.display()),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_artifact() {
        let json = r#"{
            "name": "gbm_test",
            "init_f": 100.0,
            "columns": [
                {"name": "HorsePower", "type": "numeric"},
                {"name": "Engines", "type": "categorical", "domain": ["0", "1"]}
            ],
            "trees": [
                {"nodes": [
                    {"split": {"column": 1, "levels": [1], "left": 1, "right": 2}},
                    {"leaf": 5.0},
                    {"leaf": -5.0}
                ]}
            ]
        }"#;

        let artifact = ModelArtifact::from_json(json).unwrap();
        assert_eq!(artifact.algorithm, "gbm");
        assert_eq!(artifact.distribution, Distribution::Gaussian);
        assert_eq!(artifact.columns[1].column_type, ColumnType::Categorical);
        assert_eq!(artifact.columns[1].domain, vec!["0", "1"]);

        match &artifact.trees[0].nodes[0] {
            NodeDef::Split(split) => {
                assert_eq!(split.levels.as_deref(), Some(&[1u32][..]));
                assert!(split.threshold.is_none());
                assert!(!split.na_left);
            }
            NodeDef::Leaf(_) => panic!("root should be a split"),
        }
    }

    #[test]
    fn test_link_inv() {
        assert_eq!(Distribution::Gaussian.link_inv(2.5), 2.5);
        assert!((Distribution::Poisson.link_inv(0.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resolve_artifact_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(resolve_artifact_path(dir.path()).is_err());

        let file = dir.path().join(ARTIFACT_FILE_NAME);
        std::fs::write(&file, "{}").unwrap();
        assert_eq!(resolve_artifact_path(dir.path()).unwrap(), file);
        assert_eq!(resolve_artifact_path(&file).unwrap(), file);

        let missing = dir.path().join("missing");
        assert!(matches!(resolve_artifact_path(&missing), Err(Error::Io(_))));
    }
}
