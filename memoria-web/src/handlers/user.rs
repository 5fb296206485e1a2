//! `GET /v1/users/{id}` (spec §6), with `?email=` as an alternative
//! lookup key — the path id is ignored when a query `email` is given.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use memoria_core::{Role, User};
use serde::Serialize;

use crate::dto::{authenticate, parse_id};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user_id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub display_name: String,
    pub roles: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id.to_hex(),
            username: user.username,
            email: user.email,
            display_name: user.display_name,
            roles: user.roles.iter().map(role_name).collect(),
            created_at: memoria_core::codec::to_millis(user.created_at),
            updated_at: memoria_core::codec::to_millis(user.updated_at),
        }
    }
}

fn role_name(role: &Role) -> String {
    match role {
        Role::Root => "ROOT".to_string(),
        Role::User => "USER".to_string(),
    }
}

#[utoipa::path(
    get,
    path = "/v1/users/{id}",
    params(("id" = String, Path, description = "Hex-encoded user id"), ("email" = Option<String>, Query, description = "Look up by email instead of id")),
    responses((status = 200, description = "The requested user"))
)]
pub async fn get_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id_raw): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<UserResponse>> {
    let caller = authenticate(&state.auth, &headers).await?;
    let user = if let Some(email) = params.get("email") {
        state.users.get_by_email(&caller, email).await?
    } else {
        let id = parse_id(&id_raw)?;
        state.users.get_by_id(&caller, id).await?
    };
    Ok(Json(user.into()))
}
