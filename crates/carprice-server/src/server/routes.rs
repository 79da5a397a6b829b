use crate::predict::{self, PredictError, PredictResult};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use carprice_core::{FeatureSpec, RawInputs, FEATURES};
use serde::Serialize;
use tracing::{info_span, Instrument};
use uuid::Uuid;

// ============================================================================
// Health and metrics
// ============================================================================

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "model_loaded": state.loader.is_loaded(),
    }))
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = state
        .prometheus
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default();
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
}

// ============================================================================
// Form schema and model metadata
// ============================================================================

#[derive(Debug, Serialize)]
pub struct FeatureView {
    #[serde(flatten)]
    pub spec: &'static FeatureSpec,
    pub default: f64,
}

/// Slider definitions in submission order
pub async fn features() -> impl IntoResponse {
    let views: Vec<FeatureView> = FEATURES
        .iter()
        .map(|spec| FeatureView {
            spec,
            default: spec.default_value(),
        })
        .collect();
    Json(views)
}

pub async fn model_info(State(state): State<AppState>) -> impl IntoResponse {
    let loaded = match state.loader.get().await {
        Ok(loaded) => loaded,
        Err(e) => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
        }
    };

    json_or_internal_error(&loaded.info)
}

/// Serialize `value` as a 200 body, or report a 500 if it cannot be encoded
fn json_or_internal_error<T: Serialize>(value: &T) -> (StatusCode, Json<serde_json::Value>) {
    match serde_json::to_value(value) {
        Ok(body) => (StatusCode::OK, Json(body)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode response body");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
        }
    }
}

// ============================================================================
// Prediction
// ============================================================================

/// Body returned by `POST /api/predict`
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    /// `ok` or `error`
    pub status: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_usd: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<PredictError>,

    /// Form keys of inputs outside the slider bounds
    pub out_of_range: Vec<&'static str>,

    /// Text for the output box
    pub display: String,
}

impl PredictResponse {
    pub fn from_result(result: &PredictResult) -> Self {
        let display = predict::render(result);
        match result {
            Ok(outcome) => Self {
                status: "ok",
                price_usd: Some(outcome.estimate.usd),
                error: None,
                out_of_range: outcome.out_of_range.iter().map(|f| f.key()).collect(),
                display,
            },
            Err(e) => Self {
                status: "error",
                price_usd: None,
                error: Some(e.clone()),
                out_of_range: Vec::new(),
                display,
            },
        }
    }
}

/// Estimate a price from the ten form values.
///
/// Adapter outcomes, failures included, are returned with 200 so the page can
/// always show the display text. A body that is not a JSON object is rejected
/// with 422 in the same shape.
pub async fn predict(
    State(state): State<AppState>,
    body: Result<Json<RawInputs>, JsonRejection>,
) -> impl IntoResponse {
    let inputs = match body {
        Ok(Json(inputs)) => inputs,
        Err(rejection) => {
            let result: PredictResult =
                Err(PredictError::InputConversion(rejection.body_text()));
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(PredictResponse::from_result(&result)),
            );
        }
    };

    let span = info_span!("predict", request_id = %Uuid::new_v4());
    let result = predict::predict_price(&state.loader, &inputs)
        .instrument(span)
        .await;

    (StatusCode::OK, Json(PredictResponse::from_result(&result)))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("cannot encode"))
        }
    }

    #[test]
    fn test_encoding_failure_is_internal_error() {
        let (status, Json(body)) = json_or_internal_error(&Unencodable);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "cannot encode");
    }

    #[test]
    fn test_encodable_body_is_ok() {
        let (status, Json(body)) = json_or_internal_error(&serde_json::json!({ "trees": 5 }));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["trees"], 5);
    }
}
