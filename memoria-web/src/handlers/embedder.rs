//! `/v1/embedders` routes (spec §4.7, §6).

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use memoria_core::{Embedder, EmbedderFilter, LabelMap, Modality, Pagination, ProviderType};
use memoria_services::embedder_service::EmbedderUpdate;
use memoria_services::LabelUpdate;
use serde::{Deserialize, Serialize};

use crate::dto::{authenticate, parse_id, parse_opt_id};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedderResponse {
    pub embedder_id: String,
    pub display_name: String,
    pub description: String,
    pub provider_type: String,
    pub endpoint_url: String,
    pub api_path: String,
    pub model_identifier: String,
    pub dimensionality: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_sequence_length: Option<u32>,
    pub supported_modalities: Vec<String>,
    pub labels: LabelMap,
    pub version: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitoring_endpoint: Option<String>,
    pub owner_id: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<Embedder> for EmbedderResponse {
    fn from(e: Embedder) -> Self {
        Self {
            embedder_id: e.embedder_id.to_hex(),
            display_name: e.display_name,
            description: e.description,
            provider_type: provider_name(e.provider_type),
            endpoint_url: e.endpoint_url,
            api_path: e.api_path,
            model_identifier: e.model_identifier,
            dimensionality: e.dimensionality,
            max_sequence_length: e.max_sequence_length,
            supported_modalities: e.supported_modalities.iter().map(|m| modality_name(*m)).collect(),
            labels: e.labels,
            version: e.version,
            monitoring_endpoint: e.monitoring_endpoint,
            owner_id: e.owner_id.to_hex(),
            created_at: memoria_core::codec::to_millis(e.created_at),
            updated_at: memoria_core::codec::to_millis(e.updated_at),
        }
    }
}

fn provider_name(p: ProviderType) -> String {
    match p {
        ProviderType::Unspecified => "UNSPECIFIED",
        ProviderType::Openai => "OPENAI",
        ProviderType::Vllm => "VLLM",
        ProviderType::Tei => "TEI",
    }
    .to_string()
}

fn provider_from_name(raw: &str) -> ProviderType {
    match raw {
        "OPENAI" => ProviderType::Openai,
        "VLLM" => ProviderType::Vllm,
        "TEI" => ProviderType::Tei,
        _ => ProviderType::Unspecified,
    }
}

fn modality_name(m: Modality) -> String {
    match m {
        Modality::Text => "TEXT",
        Modality::Image => "IMAGE",
        Modality::Audio => "AUDIO",
        Modality::Video => "VIDEO",
    }
    .to_string()
}

fn modality_from_name(raw: &str) -> Modality {
    match raw {
        "IMAGE" => Modality::Image,
        "AUDIO" => Modality::Audio,
        "VIDEO" => Modality::Video,
        _ => Modality::Text,
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmbedderRequest {
    pub owner_id: Option<String>,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    pub provider_type: String,
    pub endpoint_url: String,
    #[serde(default)]
    pub api_path: String,
    pub model_identifier: String,
    pub dimensionality: u32,
    pub max_sequence_length: Option<u32>,
    #[serde(default)]
    pub supported_modalities: Vec<String>,
    #[serde(default)]
    pub credentials: String,
    #[serde(default)]
    pub labels: LabelMap,
    pub monitoring_endpoint: Option<String>,
}

#[utoipa::path(
    post,
    path = "/v1/embedders",
    responses((status = 200, description = "The new embedder"))
)]
pub async fn create_embedder(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateEmbedderRequest>,
) -> ApiResult<Json<EmbedderResponse>> {
    let caller = authenticate(&state.auth, &headers).await?;
    let owner_id = parse_opt_id(req.owner_id.as_ref())?;
    let embedder = state
        .embedders
        .create(
            &caller,
            owner_id,
            req.display_name,
            req.description,
            provider_from_name(&req.provider_type),
            req.endpoint_url,
            req.api_path,
            req.model_identifier,
            req.dimensionality,
            req.max_sequence_length,
            req.supported_modalities.iter().map(|m| modality_from_name(m)).collect(),
            req.credentials,
            req.labels,
            req.monitoring_endpoint,
        )
        .await?;
    Ok(Json(embedder.into()))
}

#[utoipa::path(
    get,
    path = "/v1/embedders/{id}",
    params(("id" = String, Path, description = "Hex-encoded embedder id")),
    responses((status = 200, description = "The requested embedder"))
)]
pub async fn get_embedder(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id_raw): Path<String>,
) -> ApiResult<Json<EmbedderResponse>> {
    let caller = authenticate(&state.auth, &headers).await?;
    let id = parse_id(&id_raw)?;
    let embedder = state.embedders.get(&caller, id).await?;
    Ok(Json(embedder.into()))
}

#[utoipa::path(
    get,
    path = "/v1/embedders",
    params(
        ("ownerId" = Option<String>, Query),
        ("providerType" = Option<String>, Query),
        ("labels" = Option<String>, Query, description = "key1:value1,key2:value2"),
    ),
    responses((status = 200, description = "Embedders visible to the caller"))
)]
pub async fn list_embedders(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Vec<EmbedderResponse>>> {
    let caller = authenticate(&state.auth, &headers).await?;
    let filter = EmbedderFilter {
        owner_id: parse_opt_id(params.get("ownerId"))?,
        provider_type: params.get("providerType").map(|p| provider_from_name(p)),
        label_selectors: parse_label_selectors(params.get("labels")),
    };
    let page = Pagination {
        start: params.get("start").and_then(|s| s.parse().ok()).unwrap_or(0),
        max_results: params.get("maxResults").and_then(|s| s.parse().ok()).unwrap_or(50),
        ..Pagination::default()
    };
    let embedders = state.embedders.list(&caller, filter, &page).await?;
    Ok(Json(embedders.into_iter().map(EmbedderResponse::from).collect()))
}

/// Parses `key1:value1,key2:value2` (the mechanical query-string shape
/// for a label selector map, spec §4.12.1 — there is no standard
/// nested-map query encoding to fall back on).
pub(crate) fn parse_label_selectors(raw: Option<&String>) -> LabelMap {
    let Some(raw) = raw else {
        return LabelMap::new();
    };
    raw.split(',')
        .filter_map(|pair| pair.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmbedderRequest {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub credentials: Option<String>,
    pub monitoring_endpoint: Option<String>,
    pub replace_labels: Option<LabelMap>,
    pub merge_labels: Option<LabelMap>,
}

#[utoipa::path(
    put,
    path = "/v1/embedders/{id}",
    params(("id" = String, Path, description = "Hex-encoded embedder id")),
    responses((status = 200, description = "The updated embedder"))
)]
pub async fn update_embedder(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id_raw): Path<String>,
    Json(req): Json<UpdateEmbedderRequest>,
) -> ApiResult<Json<EmbedderResponse>> {
    let caller = authenticate(&state.auth, &headers).await?;
    let id = parse_id(&id_raw)?;
    let update = EmbedderUpdate {
        display_name: req.display_name,
        description: req.description,
        credentials: req.credentials,
        monitoring_endpoint: req.monitoring_endpoint,
        labels: LabelUpdate {
            replace: req.replace_labels,
            merge: req.merge_labels,
        },
    };
    let embedder = state.embedders.update(&caller, id, update).await?;
    Ok(Json(embedder.into()))
}

#[utoipa::path(
    delete,
    path = "/v1/embedders/{id}",
    params(("id" = String, Path, description = "Hex-encoded embedder id")),
    responses((status = 204, description = "The embedder was deleted"))
)]
pub async fn delete_embedder(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id_raw): Path<String>,
) -> ApiResult<StatusCode> {
    let caller = authenticate(&state.auth, &headers).await?;
    let id = parse_id(&id_raw)?;
    state.embedders.delete(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
