//! Single-load model cache
//!
//! [`ModelLoader`] owns the path of the exported artifact and loads it at
//! most once per process. Concurrent first callers wait on the same load;
//! a failed load is not cached, so a later call tries again.

use crate::artifact::{resolve_artifact_path, ColumnType, Distribution, ModelArtifact};
use crate::gbm::GbmModel;
use carprice_core::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;
use tracing::{error, info};

/// Default artifact location, relative to the working directory
pub const DEFAULT_MODEL_PATH: &str = "GBM_grid_1_AutoML_1_20250807_144050_model_2";

/// A compiled model together with what was learned while loading it
#[derive(Debug)]
pub struct LoadedModel {
    pub model: GbmModel,
    pub info: ModelInfo,
}

/// Metadata describing a loaded artifact
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub name: String,
    pub algorithm: String,
    pub distribution: Distribution,
    pub response_column: Option<String>,
    pub trees: usize,
    pub max_depth: usize,
    pub columns: Vec<ColumnSummary>,
    /// Hex SHA-256 of the artifact bytes
    pub sha256: String,
    pub path: PathBuf,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Number of levels for categorical columns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cardinality: Option<usize>,
}

impl LoadedModel {
    /// Read, fingerprint, validate and compile an artifact
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = resolve_artifact_path(path.as_ref())?;
        let bytes = std::fs::read(&file)?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let sha256 = format!("{:x}", hasher.finalize());

        let artifact: ModelArtifact = serde_json::from_slice(&bytes)?;
        Self::from_artifact(artifact, file, sha256)
    }

    fn from_artifact(artifact: ModelArtifact, path: PathBuf, sha256: String) -> Result<Self> {
        let model = GbmModel::from_artifact(artifact)?;

        let columns = model
            .columns()
            .iter()
            .map(|c| ColumnSummary {
                name: c.name.clone(),
                column_type: c.column_type,
                cardinality: (c.column_type == ColumnType::Categorical).then_some(c.domain.len()),
            })
            .collect();

        let info = ModelInfo {
            name: model.name().to_string(),
            algorithm: model.algorithm().to_string(),
            distribution: model.distribution(),
            response_column: model.response_column().map(str::to_string),
            trees: model.trees().len(),
            max_depth: model.trees().iter().map(|t| t.depth()).max().unwrap_or(0),
            columns,
            sha256,
            path,
            loaded_at: Utc::now(),
        };

        Ok(Self { model, info })
    }
}

/// Lazily loads the model artifact once and hands out shared references
pub struct ModelLoader {
    path: PathBuf,
    cell: OnceCell<Arc<LoadedModel>>,
    loads: AtomicU64,
}

impl ModelLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cell: OnceCell::new(),
            loads: AtomicU64::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return the cached model, loading it on first use.
    ///
    /// Every successful call returns a clone of the same `Arc`.
    pub async fn get(&self) -> Result<Arc<LoadedModel>> {
        self.cell
            .get_or_try_init(|| self.load())
            .await
            .map(Arc::clone)
    }

    /// The cached model, if a load has already succeeded
    pub fn loaded(&self) -> Option<Arc<LoadedModel>> {
        self.cell.get().cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }

    /// Number of successful loads from storage
    pub fn load_count(&self) -> u64 {
        self.loads.load(Ordering::SeqCst)
    }

    async fn load(&self) -> Result<Arc<LoadedModel>> {
        let path = self.path.clone();
        let started = Instant::now();
        info!(path = %path.display(), "Loading model artifact");

        let result = tokio::task::spawn_blocking(move || LoadedModel::load(path))
            .await
            .map_err(|e| Error::internal(format!("model load task failed: {}", e)))?;

        match result {
            Ok(loaded) => {
                self.loads.fetch_add(1, Ordering::SeqCst);
                metrics::counter!("carprice_model_loads_total").increment(1);
                info!(
                    model = %loaded.info.name,
                    trees = loaded.info.trees,
                    sha256 = %loaded.info.sha256,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Model loaded"
                );
                Ok(Arc::new(loaded))
            }
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "Failed to load model artifact");
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for ModelLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelLoader")
            .field("path", &self.path)
            .field("loaded", &self.is_loaded())
            .field("loads", &self.load_count())
            .finish()
    }
}
