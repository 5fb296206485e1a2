//! Assembles the `/v1/...` route table onto one [`Router`] (spec §6).

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::{apikey, embedder, memory, space, system, user};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(
    system::init_system,
    user::get_user,
    apikey::create_api_key,
    apikey::get_api_key,
    apikey::list_api_keys,
    apikey::update_api_key,
    apikey::delete_api_key,
    embedder::create_embedder,
    embedder::get_embedder,
    embedder::list_embedders,
    embedder::update_embedder,
    embedder::delete_embedder,
    space::create_space,
    space::get_space,
    space::list_spaces,
    space::update_space,
    space::delete_space,
    memory::create_memory,
    memory::get_memory,
    memory::list_memories_by_space,
    memory::delete_memory,
))]
struct ApiDoc;

/// Builds the full HTTP surface: every handler shares one [`AppState`],
/// so this and the `memoria-grpc` tonic surface can never see a
/// different view of the business core.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/v1/system/init", post(system::init_system))
        .route("/v1/users/:id", get(user::get_user))
        .route("/v1/apikeys", post(apikey::create_api_key).get(apikey::list_api_keys))
        .route(
            "/v1/apikeys/:id",
            get(apikey::get_api_key).put(apikey::update_api_key).delete(apikey::delete_api_key),
        )
        .route("/v1/embedders", post(embedder::create_embedder).get(embedder::list_embedders))
        .route(
            "/v1/embedders/:id",
            get(embedder::get_embedder).put(embedder::update_embedder).delete(embedder::delete_embedder),
        )
        .route("/v1/spaces", post(space::create_space).get(space::list_spaces))
        .route(
            "/v1/spaces/:id",
            get(space::get_space).put(space::update_space).delete(space::delete_space),
        )
        .route("/v1/spaces/:id/memories", get(memory::list_memories_by_space))
        .route("/v1/memories", post(memory::create_memory))
        .route("/v1/memories/:id", get(memory::get_memory).delete(memory::delete_memory))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
