//! `POST /v1/system/init` (spec §4.5, §6) — the one route the
//! authentication layer lets through unauthenticated.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitSystemResponse {
    pub already_initialized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[utoipa::path(
    post,
    path = "/v1/system/init",
    responses((status = 200, description = "Bootstraps the root user and its first API key, or reports that this already happened"))
)]
pub async fn init_system(State(state): State<AppState>) -> ApiResult<Json<InitSystemResponse>> {
    let result = state.system_init.init().await?;
    Ok(Json(InitSystemResponse {
        already_initialized: result.already_initialized,
        api_key: result.api_key,
        user_id: result.user_id.map(|id| id.to_hex()),
    }))
}
