//! Prediction adapter
//!
//! Turns ten loosely-typed form values into a price estimate: coerce, build a
//! one-row frame with the training column names, mark the categorical
//! columns, score, and take the first cell of the prediction frame.
//!
//! Failures are a closed set of kinds. Rendering them as `Error: ...` text for
//! the page is a separate step ([`render`]).

use carprice_core::{ColumnKind, Feature, FeatureVector, PriceEstimate, RawInputs};
use carprice_model::{Frame, GbmModel, ModelLoader};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, warn};

/// Why a prediction could not be produced
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum PredictError {
    /// A form value is missing or not numeric
    #[error("{0}")]
    InputConversion(String),

    /// The model artifact could not be loaded
    #[error("{0}")]
    ModelUnavailable(String),

    /// The model failed to score the input frame
    #[error("{0}")]
    Prediction(String),
}

impl PredictError {
    /// Stable label used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InputConversion(_) => "input_conversion",
            Self::ModelUnavailable(_) => "model_unavailable",
            Self::Prediction(_) => "prediction",
        }
    }
}

/// A successful prediction
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionOutcome {
    pub estimate: PriceEstimate,

    /// Inputs outside the slider bounds; they are still passed to the model
    pub out_of_range: Vec<Feature>,
}

pub type PredictResult = std::result::Result<PredictionOutcome, PredictError>;

/// Load the model if needed and estimate a price for `inputs`
pub async fn predict_price(loader: &ModelLoader, inputs: &RawInputs) -> PredictResult {
    let started = Instant::now();
    let result = run(loader, inputs).await;

    let outcome = match &result {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    };
    metrics::counter!("carprice_predictions_total", "outcome" => outcome).increment(1);
    metrics::histogram!("carprice_prediction_latency_us")
        .record(started.elapsed().as_micros() as f64);

    match &result {
        Ok(outcome) => debug!(usd = outcome.estimate.usd, "Prediction complete"),
        Err(e) => warn!(kind = e.kind(), error = %e, "Prediction failed"),
    }

    result
}

async fn run(loader: &ModelLoader, inputs: &RawInputs) -> PredictResult {
    let loaded = loader
        .get()
        .await
        .map_err(|e| PredictError::ModelUnavailable(e.to_string()))?;

    let vector =
        FeatureVector::coerce(inputs).map_err(|e| PredictError::InputConversion(e.to_string()))?;

    let out_of_range = vector.out_of_range();
    if !out_of_range.is_empty() {
        let fields: Vec<_> = out_of_range.iter().map(|f| f.key()).collect();
        warn!(?fields, "Inputs outside slider ranges; passing through to the model");
    }

    let estimate = estimate(&loaded.model, &vector)?;
    Ok(PredictionOutcome {
        estimate,
        out_of_range,
    })
}

/// Score an already coerced feature vector
pub fn estimate(model: &GbmModel, vector: &FeatureVector) -> Result<PriceEstimate, PredictError> {
    let to_prediction_error = |e: carprice_core::Error| PredictError::Prediction(e.to_string());

    let mut frame = Frame::from_features(vector);
    for feature in Feature::ALL {
        if feature.spec().kind == ColumnKind::Categorical {
            frame.as_factor(feature.column()).map_err(to_prediction_error)?;
        }
    }

    let prediction = model.predict(&frame).map_err(to_prediction_error)?;
    let usd = prediction
        .numeric_at(0, 0)
        .ok_or_else(|| PredictError::Prediction("model returned an empty prediction".to_string()))?;

    Ok(PriceEstimate::new(usd))
}

/// Text shown in the output box
pub fn render(result: &PredictResult) -> String {
    match result {
        Ok(outcome) => outcome.estimate.to_string(),
        Err(e) => format!("Error: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carprice_model::LoadedModel;

    fn bundled_path() -> std::path::PathBuf {
        std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../GBM_grid_1_AutoML_1_20250807_144050_model_2")
    }

    fn example() -> RawInputs {
        RawInputs::from_values([3.0, 120.0, 2.0, 2000.0, 150.0, 210.0, 7.5, 1.0, 5.0, 300.0])
    }

    #[test]
    fn test_estimate_marks_categoricals() {
        let loaded = LoadedModel::load(bundled_path()).unwrap();
        let vector = FeatureVector::coerce(&example()).unwrap();
        let estimate = estimate(&loaded.model, &vector).unwrap();
        assert_eq!(estimate.usd, 32_600.0);

        // Engine code 6 falls in the left branch of the engine split
        let vector =
            FeatureVector::coerce(&example().with(Feature::EngineCode, 6.0)).unwrap();
        assert_eq!(estimate_of(&loaded, &vector), 32_600.0 + 8_200.0 + 1_200.0);
    }

    fn estimate_of(loaded: &LoadedModel, vector: &FeatureVector) -> f64 {
        estimate(&loaded.model, vector).unwrap().usd
    }

    #[tokio::test]
    async fn test_predict_price_renders_currency() {
        let loader = ModelLoader::new(bundled_path());
        let result = predict_price(&loader, &example()).await;
        assert_eq!(render(&result), "Estimated Price (USD): $32,600.00");
    }

    #[tokio::test]
    async fn test_non_numeric_input_renders_error() {
        let loader = ModelLoader::new(bundled_path());
        let result = predict_price(&loader, &example().with(Feature::Seats, "many")).await;

        assert!(matches!(result, Err(PredictError::InputConversion(_))));
        let text = render(&result);
        assert!(text.starts_with("Error: "), "{text}");
        assert!(text.contains("Seats"));
    }

    #[tokio::test]
    async fn test_missing_model_is_unavailable() {
        let loader = ModelLoader::new("/nonexistent/carprice/model");
        let result = predict_price(&loader, &example()).await;
        assert_eq!(result.as_ref().unwrap_err().kind(), "model_unavailable");
        assert!(render(&result).starts_with("Error: "));
    }

    #[test]
    fn test_error_serialization() {
        let err = PredictError::InputConversion("bad seats".to_string());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "kind": "input_conversion", "message": "bad seats" })
        );
    }
}
