use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use procura_core::domain::vendor::{normalize_email, Vendor, VendorId, VendorStatus};

use super::{api_error, not_found, repository_error, ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct VendorListResponse {
    pub vendors: Vec<Vendor>,
}

pub async fn list_vendors(State(state): State<AppState>) -> ApiResult<Json<VendorListResponse>> {
    let vendors = state.vendors.list_all().await.map_err(repository_error)?;
    Ok(Json(VendorListResponse { vendors }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVendorRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VendorResponse {
    pub vendor: Vendor,
}

pub async fn create_vendor(
    State(state): State<AppState>,
    Json(request): Json<CreateVendorRequest>,
) -> ApiResult<(StatusCode, Json<VendorResponse>)> {
    if request.name.trim().is_empty() || request.email.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "name and email are required"));
    }
    if !request.email.contains('@') {
        return Err(api_error(StatusCode::BAD_REQUEST, "email must be a mail address"));
    }

    let normalized = normalize_email(&request.email);
    if state.vendors.find_by_email(&normalized).await.map_err(repository_error)?.is_some() {
        return Err(api_error(
            StatusCode::CONFLICT,
            format!("a vendor with email `{normalized}` already exists"),
        ));
    }

    let vendor = Vendor::new(
        request.name.trim().to_string(),
        &request.email,
        request.contact_person,
        request.phone,
    );
    state.vendors.save(&vendor).await.map_err(repository_error)?;

    info!(event_name = "api.vendor.created", vendor_id = %vendor.id, "vendor registered");
    Ok((StatusCode::CREATED, Json(VendorResponse { vendor })))
}

pub async fn get_vendor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<VendorResponse>> {
    let vendor = state
        .vendors
        .find_by_id(&VendorId(id))
        .await
        .map_err(repository_error)?
        .ok_or_else(|| not_found("Vendor"))?;
    Ok(Json(VendorResponse { vendor }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVendorRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub status: Option<VendorStatus>,
}

pub async fn update_vendor(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateVendorRequest>,
) -> ApiResult<Json<VendorResponse>> {
    let mut vendor = state
        .vendors
        .find_by_id(&VendorId(id))
        .await
        .map_err(repository_error)?
        .ok_or_else(|| not_found("Vendor"))?;

    if let Some(name) = request.name {
        if name.trim().is_empty() {
            return Err(api_error(StatusCode::BAD_REQUEST, "name must not be empty"));
        }
        vendor.name = name.trim().to_string();
    }
    if let Some(email) = request.email {
        if !email.contains('@') {
            return Err(api_error(StatusCode::BAD_REQUEST, "email must be a mail address"));
        }
        vendor.email = normalize_email(&email);
    }
    if let Some(contact_person) = request.contact_person {
        vendor.contact_person = Some(contact_person);
    }
    if let Some(phone) = request.phone {
        vendor.phone = Some(phone);
    }
    if let Some(status) = request.status {
        vendor.status = status;
    }

    state.vendors.save(&vendor).await.map_err(repository_error)?;
    Ok(Json(VendorResponse { vendor }))
}

#[derive(Debug, Serialize)]
pub struct DeleteVendorResponse {
    pub success: bool,
    pub message: String,
}

pub async fn delete_vendor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteVendorResponse>> {
    let removed = state.vendors.delete(&VendorId(id)).await.map_err(repository_error)?;
    if !removed {
        return Err(not_found("Vendor"));
    }

    Ok(Json(DeleteVendorResponse {
        success: true,
        message: "Vendor deleted successfully".to_string(),
    }))
}
