use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use procura_core::domain::proposal::Proposal;
use procura_core::domain::rfp::{Rfp, RfpId, RfpStatus};
use procura_core::domain::vendor::{Vendor, VendorId};
use procura_mail::outbound::SendOutcome;

use super::{api_error, extract_error, not_found, repository_error, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct CreateFromTextRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct CreateRfpResponse {
    pub success: bool,
    pub rfp: Rfp,
    pub message: String,
}

pub async fn create_from_text(
    State(state): State<AppState>,
    Json(request): Json<CreateFromTextRequest>,
) -> ApiResult<(StatusCode, Json<CreateRfpResponse>)> {
    let text = request.text.trim();
    if text.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "text must not be empty"));
    }

    let extracted = state.rfp_extractor.extract(text).await.map_err(extract_error)?;
    let rfp = Rfp::new(extracted.title_or_default(), text.to_string(), extracted.specifications);

    state.rfps.save(&rfp).await.map_err(repository_error)?;

    info!(
        event_name = "api.rfp.created",
        rfp_id = %rfp.id,
        items = rfp.specifications.items.len(),
        "rfp created from natural language"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateRfpResponse {
            success: true,
            rfp,
            message: "RFP created successfully".to_string(),
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct RfpListResponse {
    pub rfps: Vec<Rfp>,
}

pub async fn list_rfps(State(state): State<AppState>) -> ApiResult<Json<RfpListResponse>> {
    let rfps = state.rfps.list_newest_first().await.map_err(repository_error)?;
    Ok(Json(RfpListResponse { rfps }))
}

#[derive(Debug, Serialize)]
pub struct RfpDetailResponse {
    pub rfp: Rfp,
    pub vendors: Vec<Vendor>,
    pub proposals: Vec<Proposal>,
}

pub async fn get_rfp(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<RfpDetailResponse>> {
    let rfp_id = RfpId(id);
    let rfp = state
        .rfps
        .find_by_id(&rfp_id)
        .await
        .map_err(repository_error)?
        .ok_or_else(|| not_found("RFP"))?;

    let vendors = state.vendors.list_by_ids(&rfp.vendors).await.map_err(repository_error)?;
    let proposals =
        state.proposals.list_for_rfp_newest_first(&rfp.id).await.map_err(repository_error)?;

    Ok(Json(RfpDetailResponse { rfp, vendors, proposals }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendToVendorsRequest {
    pub vendor_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SendToVendorsResponse {
    pub success: bool,
    pub message: String,
    pub results: Vec<SendOutcome>,
}

pub async fn send_to_vendors(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SendToVendorsRequest>,
) -> ApiResult<Json<SendToVendorsResponse>> {
    if request.vendor_ids.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "vendorIds must not be empty"));
    }

    let rfp_id = RfpId(id);
    let mut rfp = state
        .rfps
        .find_by_id(&rfp_id)
        .await
        .map_err(repository_error)?
        .ok_or_else(|| not_found("RFP"))?;

    let requested: Vec<VendorId> =
        request.vendor_ids.into_iter().map(VendorId).collect();
    let vendors = state.vendors.list_by_ids(&requested).await.map_err(repository_error)?;
    if vendors.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "none of the vendorIds are known"));
    }

    let results = state.mailer.send_rfp_to_vendors(&rfp, &vendors).await;

    rfp.vendors = vendors.iter().map(|vendor| vendor.id.clone()).collect();
    if rfp.status == RfpStatus::Draft {
        rfp.transition_to(RfpStatus::Sent).map_err(|error| {
            api_error(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
        })?;
    }
    state.rfps.save(&rfp).await.map_err(repository_error)?;

    info!(
        event_name = "api.rfp.sent_to_vendors",
        rfp_id = %rfp.id,
        vendors = results.len(),
        "rfp dispatched to vendor batch"
    );

    Ok(Json(SendToVendorsResponse {
        success: true,
        message: "RFP sent to vendors".to_string(),
        results,
    }))
}
