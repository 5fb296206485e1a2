//! `/v1/memories` and `/v1/spaces/{spaceId}/memories` routes (spec
//! §4.11, §6).

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use memoria_core::{LabelMap, Memory, Pagination, ProcessingStatus};
use serde::{Deserialize, Serialize};

use crate::dto::{authenticate, parse_id};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryResponse {
    pub memory_id: String,
    pub space_id: String,
    pub original_content_ref: String,
    pub content_type: String,
    pub metadata: LabelMap,
    pub processing_status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<Memory> for MemoryResponse {
    fn from(m: Memory) -> Self {
        Self {
            memory_id: m.memory_id.to_hex(),
            space_id: m.space_id.to_hex(),
            original_content_ref: m.original_content_ref,
            content_type: m.content_type,
            metadata: m.metadata,
            processing_status: status_name(m.processing_status),
            created_at: memoria_core::codec::to_millis(m.created_at),
            updated_at: memoria_core::codec::to_millis(m.updated_at),
        }
    }
}

fn status_name(status: ProcessingStatus) -> String {
    match status {
        ProcessingStatus::Pending => "PENDING",
        ProcessingStatus::Processing => "PROCESSING",
        ProcessingStatus::Completed => "COMPLETED",
        ProcessingStatus::Failed => "FAILED",
    }
    .to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemoryRequest {
    pub space_id: String,
    pub original_content_ref: String,
    pub content_type: String,
    #[serde(default)]
    pub metadata: LabelMap,
}

#[utoipa::path(
    post,
    path = "/v1/memories",
    responses((status = 200, description = "The new memory, in PENDING processing state"))
)]
pub async fn create_memory(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateMemoryRequest>,
) -> ApiResult<Json<MemoryResponse>> {
    let caller = authenticate(&state.auth, &headers).await?;
    let space_id = parse_id(&req.space_id)?;
    let memory = state
        .memories
        .create(&caller, space_id, req.original_content_ref, req.content_type, req.metadata)
        .await?;
    Ok(Json(memory.into()))
}

#[utoipa::path(
    get,
    path = "/v1/memories/{id}",
    params(("id" = String, Path, description = "Hex-encoded memory id")),
    responses((status = 200, description = "The requested memory"))
)]
pub async fn get_memory(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id_raw): Path<String>,
) -> ApiResult<Json<MemoryResponse>> {
    let caller = authenticate(&state.auth, &headers).await?;
    let id = parse_id(&id_raw)?;
    let memory = state.memories.get(&caller, id).await?;
    Ok(Json(memory.into()))
}

#[utoipa::path(
    delete,
    path = "/v1/memories/{id}",
    params(("id" = String, Path, description = "Hex-encoded memory id")),
    responses((status = 204, description = "The memory was deleted"))
)]
pub async fn delete_memory(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id_raw): Path<String>,
) -> ApiResult<StatusCode> {
    let caller = authenticate(&state.auth, &headers).await?;
    let id = parse_id(&id_raw)?;
    state.memories.delete(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/v1/spaces/{id}/memories",
    params(
        ("id" = String, Path, description = "Hex-encoded space id"),
        ("start" = Option<u32>, Query),
        ("maxResults" = Option<u32>, Query),
    ),
    responses((status = 200, description = "Memories belonging to the space"))
)]
pub async fn list_memories_by_space(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(space_id_raw): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Vec<MemoryResponse>>> {
    let caller = authenticate(&state.auth, &headers).await?;
    let space_id = parse_id(&space_id_raw)?;
    let page = Pagination {
        start: params.get("start").and_then(|s| s.parse().ok()).unwrap_or(0),
        max_results: params.get("maxResults").and_then(|s| s.parse().ok()).unwrap_or(50),
        ..Pagination::default()
    };
    let memories = state.memories.list_by_space(&caller, space_id, &page).await?;
    Ok(Json(memories.into_iter().map(MemoryResponse::from).collect()))
}
