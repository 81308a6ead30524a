//! HTTP API for AQI prediction
//!
//! Serves the interactive form and a JSON prediction endpoint using axum.
//!
//! ## Endpoints
//!
//! - `GET /` - Input form with the nine pollutant fields
//! - `POST /` - Form submission, re-renders the page with the result
//! - `POST /v1/predict` - JSON prediction API
//! - `GET /health` - Health check
//! - `GET /ready` - Artifact readiness
//! - `GET /metrics` - Prometheus-formatted metrics
//!
//! ## Example
//!
//! ```rust,ignore
//! use respirar::api::{create_router, AppState};
//!
//! let state = AppState::demo();
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    artifact::ArtifactState,
    form::{FormState, FIELDS, MIN_VALUE, NUM_FEATURES},
    metrics::MetricsCollector,
    pipeline::Prediction,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Artifact pair, loaded once at startup and never mutated
    artifacts: Arc<ArtifactState>,
    /// Prediction metrics
    metrics: Arc<MetricsCollector>,
}

impl AppState {
    /// Create application state from a loaded (or failed) artifact pair.
    #[must_use]
    pub fn new(artifacts: ArtifactState) -> Self {
        Self {
            artifacts: Arc::new(artifacts),
            metrics: Arc::new(MetricsCollector::new()),
        }
    }

    /// State backed by the built-in demo artifacts.
    #[must_use]
    pub fn demo() -> Self {
        Self::new(ArtifactState::demo())
    }

    /// The artifact state
    #[must_use]
    pub fn artifacts(&self) -> &ArtifactState {
        &self.artifacts
    }

    /// The metrics collector
    #[must_use]
    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }
}

/// Request body for `POST /v1/predict`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    /// Pollutant readings in the canonical order:
    /// pm25, pm10, no, no2, nox, nh3, co, so2, o3
    pub features: Vec<f32>,
}

/// Response body for `POST /v1/predict`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    /// Unique request identifier
    pub request_id: String,
    /// Predicted AQI scalar
    pub aqi: f32,
    /// Health category label
    pub category: String,
    /// Display color for the category
    pub color: String,
    /// Advisory text, present only for hazardous categories
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<String>,
    /// Server-side latency in milliseconds
    pub latency_ms: f64,
}

/// Response body for `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status, always "ok" when reachable
    pub status: String,
    /// Crate version
    pub version: String,
}

/// Response body for `GET /ready`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyResponse {
    /// Whether the service can serve predictions
    pub ready: bool,
    /// Whether the artifact pair loaded at startup
    pub artifacts_loaded: bool,
    /// Load failure description when not ready
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Create the application router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Form UI
        .route("/", get(index_handler).post(form_predict_handler))
        // JSON API
        .route("/v1/predict", post(predict_handler))
        // Health and metrics
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Serve the input form with default values.
async fn index_handler(State(state): State<AppState>) -> Html<String> {
    Html(render_page(
        &FormState::default(),
        None,
        state.artifacts().failure(),
    ))
}

/// Handle a form submission and re-render the page with the result.
async fn form_predict_handler(
    State(state): State<AppState>,
    Form(form): Form<FormState>,
) -> Html<String> {
    let start = Instant::now();
    match state.artifacts().predictor() {
        Ok(predictor) => match predictor.handle(&form) {
            Ok(prediction) => {
                state.metrics().record_success(start.elapsed());
                Html(render_page(&form, Some(&prediction), None))
            }
            Err(err) => {
                state.metrics().record_failure();
                Html(render_page(&form, None, Some(&err.to_string())))
            }
        },
        Err(_) => {
            state.metrics().record_failure();
            Html(render_page(&form, None, state.artifacts().failure()))
        }
    }
}

/// JSON prediction handler (`/v1/predict`)
async fn predict_handler(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, (StatusCode, Json<ErrorResponse>)> {
    let start = Instant::now();

    // Validate input shape before touching the artifacts
    if request.features.len() != NUM_FEATURES {
        state.metrics().record_failure();
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!(
                    "expected {NUM_FEATURES} features, got {}",
                    request.features.len()
                ),
            }),
        ));
    }

    let predictor = state.artifacts().predictor().map_err(|err| {
        state.metrics().record_failure();
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: err.to_string(),
            }),
        )
    })?;

    let prediction = predictor.predict(&request.features).map_err(|err| {
        state.metrics().record_failure();
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Prediction failed: {err}"),
            }),
        )
    })?;

    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    state.metrics().record_success(start.elapsed());

    Ok(Json(PredictResponse {
        request_id: uuid::Uuid::new_v4().to_string(),
        aqi: prediction.aqi,
        category: prediction.bucket.label().to_string(),
        color: prediction.bucket.color().to_string(),
        advisory: prediction.advisory().map(ToString::to_string),
        latency_ms,
    }))
}

/// Health check handler
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
    })
}

/// Readiness handler, false until both artifacts load
async fn ready_handler(State(state): State<AppState>) -> Json<ReadyResponse> {
    let loaded = state.artifacts().is_loaded();
    Json(ReadyResponse {
        ready: loaded,
        artifacts_loaded: loaded,
        detail: state.artifacts().failure().map(ToString::to_string),
    })
}

/// Prometheus metrics handler
async fn metrics_handler(State(state): State<AppState>) -> String {
    state.metrics().to_prometheus()
}

const PAGE_STYLE: &str = r"
* { box-sizing: border-box; margin: 0; }
body { font-family: system-ui, sans-serif; background: #f4f6f8; color: #1a202c; line-height: 1.5; }
main { max-width: 760px; margin: 0 auto; padding: 32px 16px; }
h1 { margin-bottom: 4px; }
.tagline { color: #4a5568; margin-bottom: 24px; }
.banner { background: #fde8e8; border: 1px solid #f8b4b4; color: #9b1c1c; padding: 12px; border-radius: 6px; margin-bottom: 24px; }
.grid { display: grid; grid-template-columns: repeat(3, 1fr); gap: 16px; margin-bottom: 24px; }
.column { display: flex; flex-direction: column; gap: 16px; }
label { display: flex; flex-direction: column; gap: 4px; font-size: 0.875rem; color: #2d3748; }
input[type=number] { padding: 8px; border: 1px solid #cbd5e0; border-radius: 6px; font-size: 1rem; }
button { background: #2b6cb0; color: #fff; border: none; padding: 10px 24px; border-radius: 6px; font-size: 1rem; cursor: pointer; }
button:hover { background: #2c5282; }
.result { background: #fff; border: 1px solid #e2e8f0; border-radius: 6px; padding: 24px; margin-top: 24px; }
.result h2 { margin-bottom: 8px; }
.advisory { margin-top: 12px; background: #fefcbf; border: 1px solid #f6e05e; padding: 12px; border-radius: 6px; color: #744210; }
@media (max-width: 600px) { .grid { grid-template-columns: 1fr; } }
";

/// Render the full page: form, optional result, optional error banner.
fn render_page(form: &FormState, prediction: Option<&Prediction>, failure: Option<&str>) -> String {
    let banner = match failure {
        Some(reason) => format!(
            "  <div class=\"banner\">Model or scaler artifact could not be loaded: {reason}. Predictions are disabled.</div>\n"
        ),
        None => String::new(),
    };
    let result = match prediction {
        Some(p) => render_result(p),
        None => String::new(),
    };
    let fields = render_fields(form);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>AQI Prediction</title>
<style>{style}</style>
</head>
<body>
<main>
  <h1>AQI Prediction</h1>
  <p class="tagline">Predict the Air Quality Index from nine pollutant readings.</p>
{banner}  <form method="post" action="/">
    <div class="grid">
{fields}    </div>
    <button type="submit">Predict AQI</button>
  </form>
{result}</main>
</body>
</html>
"#,
        style = PAGE_STYLE,
    )
}

/// Render the nine inputs in three columns, preserving the canonical order.
fn render_fields(form: &FormState) -> String {
    let values = form.feature_vector();
    let mut out = String::new();
    for (fields, values) in FIELDS.chunks(3).zip(values.chunks(3)) {
        out.push_str("      <div class=\"column\">\n");
        for (field, value) in fields.iter().zip(values.iter()) {
            out.push_str(&format!(
                "        <label>{label}\n          <input type=\"number\" name=\"{name}\" min=\"{min}\" step=\"{step}\" value=\"{value}\" required>\n        </label>\n",
                label = field.label,
                name = field.name,
                min = MIN_VALUE,
                step = field.step,
            ));
        }
        out.push_str("      </div>\n");
    }
    out
}

fn render_result(prediction: &Prediction) -> String {
    let advisory = match prediction.advisory() {
        Some(text) => format!("    <p class=\"advisory\">{text}</p>\n"),
        None => String::new(),
    };
    format!(
        "  <section class=\"result\">\n    <h2>Predicted AQI: {aqi}</h2>\n    <p>Health Category: <span style=\"color: {color}\">{label}</span></p>\n{advisory}  </section>\n",
        aqi = prediction.formatted_aqi(),
        color = prediction.bucket.color(),
        label = prediction.bucket.label(),
    )
}
