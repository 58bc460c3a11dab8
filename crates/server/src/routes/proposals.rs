use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::info;

use procura_core::domain::proposal::Proposal;
use procura_core::domain::rfp::RfpId;
use procura_core::domain::vendor::VendorId;

use super::{api_error, repository_error, ApiResult, AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorRef {
    pub id: VendorId,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct ProposalView {
    #[serde(flatten)]
    pub proposal: Proposal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<VendorRef>,
}

#[derive(Debug, Serialize)]
pub struct ProposalListResponse {
    pub proposals: Vec<ProposalView>,
}

pub async fn get_by_rfp(
    State(state): State<AppState>,
    Path(rfp_id): Path<String>,
) -> ApiResult<Json<ProposalListResponse>> {
    let rfp_id = RfpId(rfp_id);
    let proposals =
        state.proposals.list_for_rfp_newest_first(&rfp_id).await.map_err(repository_error)?;

    let mut views = Vec::with_capacity(proposals.len());
    for proposal in proposals {
        let vendor = state
            .vendors
            .find_by_id(&proposal.vendor_id)
            .await
            .map_err(repository_error)?
            .map(|vendor| VendorRef { id: vendor.id, name: vendor.name, email: vendor.email });
        views.push(ProposalView { proposal, vendor });
    }

    Ok(Json(ProposalListResponse { proposals: views }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollEmailsResponse {
    pub success: bool,
    pub message: String,
    pub new_proposals: usize,
    pub proposals: Vec<Proposal>,
}

pub async fn poll_emails(State(state): State<AppState>) -> ApiResult<Json<PollEmailsResponse>> {
    let proposals = state.ingest.poll_once().await.map_err(|error| {
        tracing::error!(
            event_name = "api.poll.cycle_failed",
            error = %error,
            "poll cycle aborted"
        );
        api_error(StatusCode::BAD_GATEWAY, error.to_string())
    })?;

    info!(
        event_name = "api.poll.cycle_finished",
        new_proposals = proposals.len(),
        "poll cycle finished via api"
    );

    Ok(Json(PollEmailsResponse {
        success: true,
        message: format!("Created {} new proposals!", proposals.len()),
        new_proposals: proposals.len(),
        proposals,
    }))
}
