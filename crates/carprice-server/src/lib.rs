//! Car Price Estimator Server
//!
//! Web form and JSON API over the exported pricing model, plus a small CLI.

pub mod cli;
pub mod config;
pub mod predict;
pub mod server;
pub mod state;
pub mod telemetry;

pub use cli::*;
pub use config::ServerConfig;
pub use predict::{predict_price, render, PredictError, PredictResult, PredictionOutcome};
pub use server::*;
pub use state::*;
