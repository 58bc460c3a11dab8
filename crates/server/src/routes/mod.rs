//! JSON API surface.
//!
//! Endpoints (all JSON, under `/api`):
//! - `POST /api/rfp/create-from-text`        — structure a natural-language request into an RFP
//! - `GET  /api/rfp`                         — list RFPs, newest first
//! - `GET  /api/rfp/{id}`                    — one RFP with vendor/proposal references expanded
//! - `POST /api/rfp/{id}/send-to-vendors`    — mail the RFP, per-vendor outcomes
//! - `GET  /api/proposals/by-rfp/{rfp_id}`   — proposals for an RFP, vendor reference expanded
//! - `POST /api/proposals/poll-emails`       — run one inbox poll cycle
//! - `GET  /api/comparison/{rfp_id}`         — AI-ranked comparison of all proposals
//! - `GET|POST /api/vendors`, `GET|PUT|DELETE /api/vendors/{id}` — vendor management

pub mod comparison;
pub mod proposals;
pub mod rfp;
pub mod vendors;


use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use procura_ai::extract::{ExtractError, RfpExtractor};
use procura_ai::llm::LlmError;
use procura_ai::recommend::RecommendationGenerator;
use procura_db::repositories::{
    ProposalRepository, RepositoryError, RfpRepository, VendorRepository,
};
use procura_ingest::IngestPipeline;
use procura_mail::outbound::RfpMailer;

#[derive(Clone)]
pub struct AppState {
    pub rfps: Arc<dyn RfpRepository>,
    pub vendors: Arc<dyn VendorRepository>,
    pub proposals: Arc<dyn ProposalRepository>,
    pub rfp_extractor: Arc<RfpExtractor>,
    pub recommender: Arc<RecommendationGenerator>,
    pub mailer: Arc<RfpMailer>,
    pub ingest: Arc<IngestPipeline>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

pub type ErrorResponse = (StatusCode, Json<ApiError>);
pub type ApiResult<T> = Result<T, ErrorResponse>;

pub fn api_error(status: StatusCode, message: impl Into<String>) -> ErrorResponse {
    (status, Json(ApiError { error: message.into() }))
}

pub fn not_found(what: &str) -> ErrorResponse {
    api_error(StatusCode::NOT_FOUND, format!("{what} not found"))
}

/// Repository failures are our side: plain 500s.
pub fn repository_error(error: RepositoryError) -> ErrorResponse {
    tracing::error!(
        event_name = "api.repository_error",
        error = %error,
        "repository operation failed"
    );
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "storage operation failed")
}

/// Extraction is fail-loud: the model boundary misbehaved, surface it as an
/// upstream failure with the distinct kind in the message.
pub fn extract_error(error: ExtractError) -> ErrorResponse {
    tracing::error!(
        event_name = "api.extract_error",
        error = %error,
        "structured extraction failed"
    );
    api_error(StatusCode::BAD_GATEWAY, error.to_string())
}

pub fn llm_error(error: LlmError) -> ErrorResponse {
    tracing::error!(event_name = "api.llm_error", error = %error, "model call failed");
    api_error(StatusCode::BAD_GATEWAY, error.to_string())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/rfp/create-from-text", post(rfp::create_from_text))
        .route("/api/rfp", get(rfp::list_rfps))
        .route("/api/rfp/{id}", get(rfp::get_rfp))
        .route("/api/rfp/{id}/send-to-vendors", post(rfp::send_to_vendors))
        .route("/api/proposals/by-rfp/{rfp_id}", get(proposals::get_by_rfp))
        .route("/api/proposals/poll-emails", post(proposals::poll_emails))
        .route("/api/comparison/{rfp_id}", get(comparison::get_comparison))
        .route("/api/vendors", get(vendors::list_vendors).post(vendors::create_vendor))
        .route(
            "/api/vendors/{id}",
            get(vendors::get_vendor).put(vendors::update_vendor).delete(vendors::delete_vendor),
        )
        .with_state(state)
}
