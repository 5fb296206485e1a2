//! `/v1/apikeys` routes (spec §4.6, §6).

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use memoria_core::{ApiKey, ApiKeyStatus, LabelMap};
use memoria_services::LabelUpdate;
use serde::{Deserialize, Serialize};

use crate::dto::{authenticate, parse_id, parse_opt_id};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyResponse {
    pub api_key_id: String,
    pub user_id: String,
    pub key_prefix: String,
    pub status: String,
    pub labels: LabelMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<ApiKey> for ApiKeyResponse {
    fn from(key: ApiKey) -> Self {
        Self {
            api_key_id: key.api_key_id.to_hex(),
            user_id: key.user_id.to_hex(),
            key_prefix: key.key_prefix,
            status: status_name(key.status),
            labels: key.labels,
            expires_at: key.expires_at.map(memoria_core::codec::to_millis),
            last_used_at: key.last_used_at.map(memoria_core::codec::to_millis),
            created_at: memoria_core::codec::to_millis(key.created_at),
            updated_at: memoria_core::codec::to_millis(key.updated_at),
        }
    }
}

fn status_name(status: ApiKeyStatus) -> String {
    match status {
        ApiKeyStatus::Active => "ACTIVE".to_string(),
        ApiKeyStatus::Inactive => "INACTIVE".to_string(),
    }
}

fn status_from_name(raw: &str) -> ApiResult<ApiKeyStatus> {
    match raw {
        "ACTIVE" => Ok(ApiKeyStatus::Active),
        "INACTIVE" => Ok(ApiKeyStatus::Inactive),
        other => Err(memoria_core::Status::invalid_argument(format!("unknown status {other}")).into()),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApiKeyRequest {
    pub owner_id: Option<String>,
    #[serde(default)]
    pub labels: LabelMap,
    pub expires_at: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApiKeyResponse {
    #[serde(flatten)]
    pub api_key: ApiKeyResponse,
    pub raw_secret: String,
}

#[utoipa::path(
    post,
    path = "/v1/apikeys",
    responses((status = 200, description = "The new key, with its raw secret shown once"))
)]
pub async fn create_api_key(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateApiKeyRequest>,
) -> ApiResult<Json<CreateApiKeyResponse>> {
    let caller = authenticate(&state.auth, &headers).await?;
    let owner_id = parse_opt_id(req.owner_id.as_ref())?;
    let expires_at = req.expires_at.map(memoria_core::codec::from_millis).transpose()?;
    let (key, raw_secret) = state.api_keys.create(&caller, owner_id, req.labels, expires_at).await?;
    Ok(Json(CreateApiKeyResponse {
        api_key: key.into(),
        raw_secret,
    }))
}

#[utoipa::path(
    get,
    path = "/v1/apikeys/{id}",
    params(("id" = String, Path, description = "Hex-encoded api key id")),
    responses((status = 200, description = "The requested api key"))
)]
pub async fn get_api_key(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id_raw): Path<String>,
) -> ApiResult<Json<ApiKeyResponse>> {
    let caller = authenticate(&state.auth, &headers).await?;
    let id = parse_id(&id_raw)?;
    let key = state.api_keys.get(&caller, id).await?;
    Ok(Json(key.into()))
}

#[utoipa::path(
    get,
    path = "/v1/apikeys",
    params(("ownerId" = Option<String>, Query, description = "Defaults to the caller's own id")),
    responses((status = 200, description = "Api keys owned by the given user"))
)]
pub async fn list_api_keys(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Vec<ApiKeyResponse>>> {
    let caller = authenticate(&state.auth, &headers).await?;
    let owner_id = match params.get("ownerId") {
        Some(raw) => parse_id(raw)?,
        None => caller.user_id,
    };
    let keys = state.api_keys.list(&caller, owner_id).await?;
    Ok(Json(keys.into_iter().map(ApiKeyResponse::from).collect()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateApiKeyRequest {
    pub status: Option<String>,
    pub replace_labels: Option<LabelMap>,
    pub merge_labels: Option<LabelMap>,
}

#[utoipa::path(
    put,
    path = "/v1/apikeys/{id}",
    params(("id" = String, Path, description = "Hex-encoded api key id")),
    responses((status = 200, description = "The updated api key"))
)]
pub async fn update_api_key(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id_raw): Path<String>,
    Json(req): Json<UpdateApiKeyRequest>,
) -> ApiResult<Json<ApiKeyResponse>> {
    let caller = authenticate(&state.auth, &headers).await?;
    let id = parse_id(&id_raw)?;
    let status = req.status.map(|s| status_from_name(&s)).transpose()?;
    let label_update = LabelUpdate {
        replace: req.replace_labels,
        merge: req.merge_labels,
    };
    let key = state.api_keys.update(&caller, id, status, label_update).await?;
    Ok(Json(key.into()))
}

#[utoipa::path(
    delete,
    path = "/v1/apikeys/{id}",
    params(("id" = String, Path, description = "Hex-encoded api key id")),
    responses((status = 204, description = "The api key was deleted"))
)]
pub async fn delete_api_key(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id_raw): Path<String>,
) -> ApiResult<StatusCode> {
    let caller = authenticate(&state.auth, &headers).await?;
    let id = parse_id(&id_raw)?;
    state.api_keys.delete(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
