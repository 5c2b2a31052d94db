//! HTTP surface for Brand Guardian.
//!
//! This module exposes a compact Axum router:
//!
//! - `POST /audit` – Run one compliance audit for a video URL (optionally with an explicit
//!   retrieval `query`, a `transcript` and `ocr_text` lines). Returns the session id, the short
//!   video id, the `PASS`/`FAIL` status, the markdown report and the issues found.
//! - `GET /health` – Liveness probe.
//! - `GET /metrics` – Audit counters since startup.
//!
//! A blank audit subject is rejected with `422`; any failure inside the workflow (for example
//! an unreachable search index) is reported as `500` with the error text in `detail`.

use crate::audit::{AuditApi, AuditError, AuditRequest};
use crate::metrics::MetricsSnapshot;
use crate::workflow::{ComplianceIssue, FinalStatus};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Build the HTTP router exposing the audit API surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: AuditApi + 'static,
{
    Router::new()
        .route("/audit", post(audit_video::<S>))
        .route("/health", get(health_check))
        .route("/metrics", get(get_metrics::<S>))
        .with_state(service)
}

/// Request body for the `POST /audit` endpoint.
#[derive(Deserialize)]
struct AuditRequestBody {
    /// Video to audit; also the retrieval query when `query` is absent.
    video_url: String,
    /// Optional explicit retrieval query.
    #[serde(default)]
    query: Option<String>,
    /// Optional transcript extracted ahead of time.
    #[serde(default)]
    transcript: Option<String>,
    /// Optional OCR lines extracted ahead of time.
    #[serde(default)]
    ocr_text: Option<Vec<String>>,
}

/// Success response for the `POST /audit` endpoint.
#[derive(Serialize)]
struct AuditResponse {
    session_id: String,
    video_id: String,
    status: FinalStatus,
    final_report: String,
    compliance_results: Vec<ComplianceIssue>,
    errors: Vec<String>,
    audited_at: String,
}

/// Run the compliance workflow for one video.
async fn audit_video<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<AuditRequestBody>,
) -> Result<Json<AuditResponse>, AppError>
where
    S: AuditApi,
{
    let AuditRequestBody {
        video_url,
        query,
        transcript,
        ocr_text,
    } = request;
    let report = service
        .run_audit(AuditRequest {
            video_url: Some(video_url),
            query,
            transcript,
            ocr_text: ocr_text.unwrap_or_default(),
        })
        .await?;

    let state = &report.state;
    Ok(Json(AuditResponse {
        session_id: report.session_id.clone(),
        video_id: report.video_id.clone(),
        status: state.final_status(),
        final_report: state
            .final_report()
            .unwrap_or("No report generated.")
            .to_string(),
        compliance_results: state.compliance_results().to_vec(),
        errors: state.errors().to_vec(),
        audited_at: report.audited_at.clone(),
    }))
}

/// Liveness probe for load balancers and uptime checks.
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy", "service": "Brand Guardian AI" }))
}

/// Return the audit counters accumulated since startup.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsSnapshot>
where
    S: AuditApi,
{
    Json(service.metrics_snapshot())
}

struct AppError(AuditError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            AuditError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AuditError::Workflow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::error!(status = %status, error = %self.0, "Audit request failed");
        (status, Json(json!({ "detail": self.0.to_string() }))).into_response()
    }
}

impl From<AuditError> for AppError {
    fn from(inner: AuditError) -> Self {
        Self(inner)
    }
}
