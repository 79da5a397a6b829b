//! Car Price Model
//!
//! Native evaluation of the exported gradient boosted pricing model.
//!
//! The model was selected offline by an AutoML search and exported as a JSON
//! tree ensemble. This crate reads that artifact, validates its structure,
//! and scores one-row frames built from the form inputs. [`ModelLoader`]
//! guarantees the artifact is read from storage at most once per process.

pub mod artifact;
pub mod frame;
pub mod gbm;
pub mod loader;
pub mod tree;

pub use artifact::{ColumnDef, ColumnType, Distribution, ModelArtifact, ARTIFACT_FILE_NAME};
pub use frame::{Column, Frame};
pub use gbm::{GbmModel, PREDICT_COLUMN};
pub use loader::{ColumnSummary, LoadedModel, ModelInfo, ModelLoader, DEFAULT_MODEL_PATH};
pub use tree::{Condition, Node, Tree};
