//! End-to-end exercise of the HTTP surface through [`tower::ServiceExt::oneshot`],
//! wired against in-memory fakes rather than Postgres/S3 — the same
//! style the teacher repo's web tests use.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use memoria_core::{
    ApiKey, ApiKeyRepository, Embedder, EmbedderFilter, EmbedderRepository, Memory, MemoryRepository, Pagination,
    ResourceId, Result, Space, SpaceFilter, SpaceRepository, SystemInitRepository, User, UserRepository,
};
use memoria_security::AuthInterceptor;
use memoria_services::{ApiKeyService, EmbedderService, MemoryService, SpaceService, SystemInitService, UserService};
use memoria_storage::FakeObjectStore;
use memoria_web::{build_app, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

#[derive(Default)]
struct FakeUserRepo {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepository for FakeUserRepo {
    async fn load_by_id(&self, id: ResourceId) -> Result<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.user_id == id).cloned())
    }
    async fn load_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.username == username).cloned())
    }
    async fn load_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email.as_deref() == Some(email))
            .cloned())
    }
    async fn save(&self, user: &User) -> Result<()> {
        let mut users = self.users.lock().unwrap();
        if let Some(existing) = users.iter_mut().find(|u| u.user_id == user.user_id) {
            *existing = user.clone();
        } else {
            users.push(user.clone());
        }
        Ok(())
    }
}

#[derive(Default)]
struct FakeApiKeyRepo {
    keys: Mutex<Vec<ApiKey>>,
}

#[async_trait]
impl ApiKeyRepository for FakeApiKeyRepo {
    async fn load_by_id(&self, id: ResourceId) -> Result<Option<ApiKey>> {
        Ok(self.keys.lock().unwrap().iter().find(|k| k.api_key_id == id).cloned())
    }
    async fn load_by_hashed_key(&self, hashed_key_material: &str) -> Result<Option<ApiKey>> {
        Ok(self
            .keys
            .lock()
            .unwrap()
            .iter()
            .find(|k| k.hashed_key_material == hashed_key_material)
            .cloned())
    }
    async fn save(&self, key: &ApiKey) -> Result<()> {
        let mut keys = self.keys.lock().unwrap();
        if let Some(existing) = keys.iter_mut().find(|k| k.api_key_id == key.api_key_id) {
            *existing = key.clone();
        } else {
            keys.push(key.clone());
        }
        Ok(())
    }
    async fn delete_by_id(&self, id: ResourceId) -> Result<()> {
        self.keys.lock().unwrap().retain(|k| k.api_key_id != id);
        Ok(())
    }
    async fn list_by_owner(&self, owner_id: ResourceId) -> Result<Vec<ApiKey>> {
        Ok(self
            .keys
            .lock()
            .unwrap()
            .iter()
            .filter(|k| k.user_id == owner_id)
            .cloned()
            .collect())
    }
    async fn touch_last_used(&self, _id: ResourceId) -> Result<()> {
        Ok(())
    }
}

#[derive(Default)]
struct FakeEmbedderRepo {
    embedders: Mutex<Vec<Embedder>>,
}

#[async_trait]
impl EmbedderRepository for FakeEmbedderRepo {
    async fn load_by_id(&self, id: ResourceId) -> Result<Option<Embedder>> {
        Ok(self.embedders.lock().unwrap().iter().find(|e| e.embedder_id == id).cloned())
    }
    async fn load_by_connection_triple(
        &self,
        endpoint_url: &str,
        api_path: &str,
        model_identifier: &str,
    ) -> Result<Option<Embedder>> {
        Ok(self
            .embedders
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.endpoint_url == endpoint_url && e.api_path == api_path && e.model_identifier == model_identifier)
            .cloned())
    }
    async fn save(&self, embedder: &Embedder) -> Result<()> {
        let mut embedders = self.embedders.lock().unwrap();
        if let Some(existing) = embedders.iter_mut().find(|e| e.embedder_id == embedder.embedder_id) {
            *existing = embedder.clone();
        } else {
            embedders.push(embedder.clone());
        }
        Ok(())
    }
    async fn delete_by_id(&self, id: ResourceId) -> Result<()> {
        self.embedders.lock().unwrap().retain(|e| e.embedder_id != id);
        Ok(())
    }
    async fn list(&self, filter: &EmbedderFilter, _page: &Pagination) -> Result<Vec<Embedder>> {
        Ok(self
            .embedders
            .lock()
            .unwrap()
            .iter()
            .filter(|e| filter.owner_id.map_or(true, |o| o == e.owner_id))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct FakeSpaceRepo {
    spaces: Mutex<Vec<Space>>,
}

#[async_trait]
impl SpaceRepository for FakeSpaceRepo {
    async fn load_by_id(&self, id: ResourceId) -> Result<Option<Space>> {
        Ok(self.spaces.lock().unwrap().iter().find(|s| s.space_id == id).cloned())
    }
    async fn load_by_owner_and_name(&self, owner_id: ResourceId, name: &str) -> Result<Option<Space>> {
        Ok(self
            .spaces
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.owner_id == owner_id && s.name == name)
            .cloned())
    }
    async fn save(&self, space: &Space) -> Result<()> {
        let mut spaces = self.spaces.lock().unwrap();
        if let Some(existing) = spaces.iter_mut().find(|s| s.space_id == space.space_id) {
            *existing = space.clone();
        } else {
            spaces.push(space.clone());
        }
        Ok(())
    }
    async fn delete_by_id(&self, id: ResourceId) -> Result<()> {
        self.spaces.lock().unwrap().retain(|s| s.space_id != id);
        Ok(())
    }
    async fn list(&self, filter: &SpaceFilter, _page: &Pagination) -> Result<Vec<Space>> {
        Ok(self
            .spaces
            .lock()
            .unwrap()
            .iter()
            .filter(|s| filter.owner_id.map_or(true, |o| o == s.owner_id))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct FakeMemoryRepo {
    memories: Mutex<Vec<Memory>>,
}

#[async_trait]
impl MemoryRepository for FakeMemoryRepo {
    async fn load_by_id(&self, id: ResourceId) -> Result<Option<Memory>> {
        Ok(self.memories.lock().unwrap().iter().find(|m| m.memory_id == id).cloned())
    }
    async fn save(&self, memory: &Memory) -> Result<()> {
        let mut memories = self.memories.lock().unwrap();
        if let Some(existing) = memories.iter_mut().find(|m| m.memory_id == memory.memory_id) {
            *existing = memory.clone();
        } else {
            memories.push(memory.clone());
        }
        Ok(())
    }
    async fn delete_by_id(&self, id: ResourceId) -> Result<()> {
        self.memories.lock().unwrap().retain(|m| m.memory_id != id);
        Ok(())
    }
    async fn list_by_space(&self, space_id: ResourceId, _page: &Pagination) -> Result<Vec<Memory>> {
        Ok(self
            .memories
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.space_id == space_id)
            .cloned()
            .collect())
    }
    async fn save_embedding(&self, _memory_id: ResourceId, _embedding: &[f32]) -> Result<()> {
        Ok(())
    }
    async fn delete_embedding(&self, _memory_id: ResourceId) -> Result<()> {
        Ok(())
    }
}

struct FakeSystemInitRepo {
    users: Arc<FakeUserRepo>,
    keys: Arc<FakeApiKeyRepo>,
}

#[async_trait]
impl SystemInitRepository for FakeSystemInitRepo {
    async fn try_init(&self, user: &User, key: &ApiKey) -> Result<bool> {
        if self.users.load_by_username("root").await?.is_some() {
            return Ok(false);
        }
        self.users.save(user).await?;
        self.keys.save(key).await?;
        Ok(true)
    }
}

/// Builds a full [`AppState`] over in-memory fakes, running
/// [`SystemInitService::init`] so the returned raw secret can
/// authenticate subsequent requests as root.
async fn test_state() -> (AppState, String) {
    let users = Arc::new(FakeUserRepo::default());
    let keys = Arc::new(FakeApiKeyRepo::default());
    let embedders = Arc::new(FakeEmbedderRepo::default());
    let spaces = Arc::new(FakeSpaceRepo::default());
    let memories = Arc::new(FakeMemoryRepo::default());
    let init_repo = Arc::new(FakeSystemInitRepo {
        users: users.clone(),
        keys: keys.clone(),
    });

    let pepper = "test-pepper".to_string();
    let audit = Arc::new(memoria_security::AuditLogger::new());
    let auth = Arc::new(AuthInterceptor::new(keys.clone(), users.clone(), audit.clone(), pepper.clone()));

    let system_init = Arc::new(SystemInitService::new(init_repo, pepper.clone(), audit.clone()));
    let init_result = system_init.init().await.unwrap();
    let raw_secret = init_result.api_key.unwrap();

    let spaces_for_memories = spaces.clone();
    let state = AppState::new(
        auth,
        system_init,
        Arc::new(UserService::new(users)),
        Arc::new(ApiKeyService::new(keys, pepper, audit.clone())),
        Arc::new(EmbedderService::new(embedders.clone())),
        Arc::new(SpaceService::new(spaces, embedders.clone(), None)),
        Arc::new(MemoryService::new(
            memories,
            spaces_for_memories,
            embedders,
            Arc::new(FakeObjectStore::new()),
            "memoria-blobs".to_string(),
        )),
    );
    (state, raw_secret)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn system_init_is_idempotent_over_http() {
    let (state, _secret) = test_state().await;
    let app = build_app(state);

    let response = app
        .clone()
        .oneshot(Request::builder().method("POST").uri("/v1/system/init").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["alreadyInitialized"], json!(true));
}

#[tokio::test]
async fn missing_api_key_is_rejected() {
    let (state, _secret) = test_state().await;
    let app = build_app(state);

    let response = app
        .oneshot(Request::builder().uri("/v1/embedders").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_then_get_embedder_round_trips() {
    let (state, secret) = test_state().await;
    let app = build_app(state);

    let create_body = json!({
        "displayName": "small-embedder",
        "providerType": "OPENAI",
        "endpointUrl": "https://api.openai.com",
        "modelIdentifier": "text-embedding-3-small",
        "dimensionality": 1536,
    });
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/embedders")
                .header("content-type", "application/json")
                .header("x-api-key", &secret)
                .body(Body::from(create_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await;
    let embedder_id = created["embedderId"].as_str().unwrap().to_string();

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/v1/embedders/{embedder_id}"))
                .header("x-api-key", &secret)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = body_json(response).await;
    assert_eq!(fetched["displayName"], json!("small-embedder"));
}

#[tokio::test]
async fn create_space_rejects_unknown_embedder() {
    let (state, secret) = test_state().await;
    let app = build_app(state);

    let body = json!({
        "name": "orphan-space",
        "embedderId": ResourceId::new_random().to_hex(),
    });
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/spaces")
                .header("content-type", "application/json")
                .header("x-api-key", &secret)
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn put_updates_a_space_with_replace_then_merge_labels() {
    let (state, secret) = test_state().await;
    let app = build_app(state);

    let create_embedder = json!({
        "displayName": "small-embedder",
        "providerType": "OPENAI",
        "endpointUrl": "https://api.openai.com",
        "modelIdentifier": "text-embedding-3-small",
        "dimensionality": 1536,
    });
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/embedders")
                .header("content-type", "application/json")
                .header("x-api-key", &secret)
                .body(Body::from(create_embedder.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let embedder_id = body_json(response).await["embedderId"].as_str().unwrap().to_string();

    let create_space = json!({
        "name": "put-test-space",
        "embedderId": embedder_id,
        "labels": {"a": "1", "b": "2"},
    });
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/spaces")
                .header("content-type", "application/json")
                .header("x-api-key", &secret)
                .body(Body::from(create_space.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let space_id = body_json(response).await["spaceId"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/v1/spaces/{space_id}"))
                .header("content-type", "application/json")
                .header("x-api-key", &secret)
                .body(Body::from(json!({"replaceLabels": {"c": "3"}}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let replaced = body_json(response).await;
    assert_eq!(replaced["labels"], json!({"c": "3"}));

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/v1/spaces/{space_id}"))
                .header("content-type", "application/json")
                .header("x-api-key", &secret)
                .body(Body::from(json!({"mergeLabels": {"d": "4", "c": "30"}}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let merged = body_json(response).await;
    assert_eq!(merged["labels"], json!({"c": "30", "d": "4"}));
}

#[tokio::test]
async fn malformed_id_in_path_is_a_400() {
    let (state, secret) = test_state().await;
    let app = build_app(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/embedders/not-a-hex-id")
                .header("x-api-key", &secret)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

