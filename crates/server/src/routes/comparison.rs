use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use tracing::info;

use procura_core::domain::recommendation::{Comparison, ScoredProposal};
use procura_core::domain::rfp::RfpId;

use super::{llm_error, not_found, repository_error, ApiResult, AppState};

pub async fn get_comparison(
    State(state): State<AppState>,
    Path(rfp_id): Path<String>,
) -> ApiResult<Json<Comparison>> {
    let rfp_id = RfpId(rfp_id);
    let rfp = state
        .rfps
        .find_by_id(&rfp_id)
        .await
        .map_err(repository_error)?
        .ok_or_else(|| not_found("RFP"))?;

    let proposals =
        state.proposals.list_for_rfp_newest_first(&rfp.id).await.map_err(repository_error)?;
    if proposals.is_empty() {
        return Err(not_found("proposals for this RFP"));
    }

    let mut scored = Vec::with_capacity(proposals.len());
    for proposal in proposals {
        let Some(vendor) =
            state.vendors.find_by_id(&proposal.vendor_id).await.map_err(repository_error)?
        else {
            // A proposal without its vendor record cannot be summarized.
            continue;
        };
        scored.push(ScoredProposal { vendor, proposal });
    }

    let recommendation = state.recommender.generate(&rfp, &scored).await.map_err(llm_error)?;

    info!(
        event_name = "api.comparison.generated",
        rfp_id = %rfp.id,
        proposals = scored.len(),
        recommended_vendor = recommendation.recommended_vendor,
        "comparison generated"
    );

    Ok(Json(Comparison {
        rfp_id: rfp.id,
        total_proposals: scored.len(),
        proposals: scored,
        recommendation,
        generated_at: Utc::now(),
    }))
}
