//! `/v1/spaces` routes (spec §4.8, §4.9, §4.10, §6).

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use memoria_core::{LabelMap, SortBy, SortOrder, Space, SpaceFilter};
use memoria_services::space_service::SpaceUpdate;
use memoria_services::LabelUpdate;
use serde::{Deserialize, Serialize};

use crate::dto::{authenticate, parse_id, parse_opt_id};
use crate::error::ApiResult;
use crate::handlers::embedder::parse_label_selectors;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceResponse {
    pub space_id: String,
    pub name: String,
    pub owner_id: String,
    pub embedder_id: String,
    pub labels: LabelMap,
    pub public_read: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<Space> for SpaceResponse {
    fn from(s: Space) -> Self {
        Self {
            space_id: s.space_id.to_hex(),
            name: s.name,
            owner_id: s.owner_id.to_hex(),
            embedder_id: s.embedder_id.to_hex(),
            labels: s.labels,
            public_read: s.public_read,
            created_at: memoria_core::codec::to_millis(s.created_at),
            updated_at: memoria_core::codec::to_millis(s.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListSpacesResponse {
    pub items: Vec<SpaceResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSpaceRequest {
    pub owner_id: Option<String>,
    pub name: String,
    pub embedder_id: Option<String>,
    #[serde(default)]
    pub labels: LabelMap,
    #[serde(default)]
    pub public_read: bool,
}

#[utoipa::path(
    post,
    path = "/v1/spaces",
    responses((status = 200, description = "The new space"))
)]
pub async fn create_space(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateSpaceRequest>,
) -> ApiResult<Json<SpaceResponse>> {
    let caller = authenticate(&state.auth, &headers).await?;
    let owner_id = parse_opt_id(req.owner_id.as_ref())?;
    let embedder_id = parse_opt_id(req.embedder_id.as_ref())?;
    let space = state
        .spaces
        .create(&caller, owner_id, req.name, embedder_id, req.labels, req.public_read)
        .await?;
    Ok(Json(space.into()))
}

#[utoipa::path(
    get,
    path = "/v1/spaces/{id}",
    params(("id" = String, Path, description = "Hex-encoded space id")),
    responses((status = 200, description = "The requested space"))
)]
pub async fn get_space(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id_raw): Path<String>,
) -> ApiResult<Json<SpaceResponse>> {
    let caller = authenticate(&state.auth, &headers).await?;
    let id = parse_id(&id_raw)?;
    let space = state.spaces.get(&caller, id).await?;
    Ok(Json(space.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSpaceRequest {
    pub name: Option<String>,
    pub public_read: Option<bool>,
    pub replace_labels: Option<LabelMap>,
    pub merge_labels: Option<LabelMap>,
}

#[utoipa::path(
    put,
    path = "/v1/spaces/{id}",
    params(("id" = String, Path, description = "Hex-encoded space id")),
    responses((status = 200, description = "The updated space"))
)]
pub async fn update_space(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id_raw): Path<String>,
    Json(req): Json<UpdateSpaceRequest>,
) -> ApiResult<Json<SpaceResponse>> {
    let caller = authenticate(&state.auth, &headers).await?;
    let id = parse_id(&id_raw)?;
    let update = SpaceUpdate {
        name: req.name,
        public_read: req.public_read,
        labels: LabelUpdate {
            replace: req.replace_labels,
            merge: req.merge_labels,
        },
    };
    let space = state.spaces.update(&caller, id, update).await?;
    Ok(Json(space.into()))
}

#[utoipa::path(
    delete,
    path = "/v1/spaces/{id}",
    params(("id" = String, Path, description = "Hex-encoded space id")),
    responses((status = 204, description = "The space was deleted"))
)]
pub async fn delete_space(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id_raw): Path<String>,
) -> ApiResult<StatusCode> {
    let caller = authenticate(&state.auth, &headers).await?;
    let id = parse_id(&id_raw)?;
    state.spaces.delete(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn sort_by_from_name(raw: Option<&String>) -> SortBy {
    match raw.map(String::as_str) {
        Some("name") => SortBy::Name,
        Some("updated_time") => SortBy::UpdatedTime,
        _ => SortBy::CreatedTime,
    }
}

fn sort_order_from_name(raw: Option<&String>) -> SortOrder {
    match raw.map(String::as_str) {
        Some("DESCENDING") => SortOrder::Descending,
        _ => SortOrder::Ascending,
    }
}

#[utoipa::path(
    get,
    path = "/v1/spaces",
    params(
        ("ownerId" = Option<String>, Query),
        ("labels" = Option<String>, Query, description = "key1:value1,key2:value2"),
        ("nameFilter" = Option<String>, Query),
        ("sortBy" = Option<String>, Query),
        ("sortOrder" = Option<String>, Query),
        ("maxResults" = Option<u32>, Query),
        ("pageToken" = Option<String>, Query),
    ),
    responses((status = 200, description = "A page of spaces visible to the caller"))
)]
pub async fn list_spaces(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<ListSpacesResponse>> {
    let caller = authenticate(&state.auth, &headers).await?;
    let filter = SpaceFilter {
        owner_id: parse_opt_id(params.get("ownerId"))?,
        label_selectors: parse_label_selectors(params.get("labels")),
        name_filter: params.get("nameFilter").cloned(),
    };
    let sort_by = sort_by_from_name(params.get("sortBy"));
    let sort_order = sort_order_from_name(params.get("sortOrder"));
    let max_results = params.get("maxResults").and_then(|s| s.parse().ok()).unwrap_or(50);
    let page_token = params.get("pageToken").map(String::as_str);

    let page = state
        .spaces
        .list(&caller, filter, sort_by, sort_order, max_results, page_token)
        .await?;
    Ok(Json(ListSpacesResponse {
        items: page.items.into_iter().map(SpaceResponse::from).collect(),
        next_token: page.next_token,
    }))
}
