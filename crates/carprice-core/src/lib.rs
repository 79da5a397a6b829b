//! Car Price Estimator Core
//!
//! Types shared by the model evaluator and the web server.
//!
//! This crate provides:
//! - The ten-column feature schema the pricing model was trained on
//! - Coercion of loosely-typed form inputs into a typed feature vector
//! - US-currency formatting of price estimates
//! - Error types and result handling

pub mod error;
pub mod features;
pub mod input;
pub mod price;

pub use error::{Error, Result};
pub use features::{ColumnKind, Feature, FeatureSpec, ValueType, FEATURES};
pub use input::{FeatureValue, FeatureVector, RawInputs, RawValue};
pub use price::{format_usd, PriceEstimate};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::features::{ColumnKind, Feature, FeatureSpec, FEATURES};
    pub use crate::input::{FeatureValue, FeatureVector, RawInputs, RawValue};
    pub use crate::price::PriceEstimate;
}
