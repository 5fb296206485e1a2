//! Memory resource service (spec §4.11).

use std::sync::Arc;

use chrono::Utc;
use memoria_core::{
    EmbedderRepository, LabelMap, Memory, MemoryRepository, ObjectStore, Pagination,
    ProcessingStatus, ResourceId, Result, SpaceRepository, Status,
};
use memoria_security::access_control::{authorize, AuthenticatedUser, ResourceKind, Verb};
use tracing::warn;

pub struct MemoryService {
    repo: Arc<dyn MemoryRepository>,
    spaces: Arc<dyn SpaceRepository>,
    embedders: Arc<dyn EmbedderRepository>,
    objects: Arc<dyn ObjectStore>,
    bucket: String,
}

impl MemoryService {
    #[must_use]
    pub fn new(
        repo: Arc<dyn MemoryRepository>,
        spaces: Arc<dyn SpaceRepository>,
        embedders: Arc<dyn EmbedderRepository>,
        objects: Arc<dyn ObjectStore>,
        bucket: String,
    ) -> Self {
        Self {
            repo,
            spaces,
            embedders,
            objects,
            bucket,
        }
    }

    async fn load_owning_space(&self, space_id: ResourceId) -> Result<memoria_core::Space> {
        self.spaces
            .load_by_id(space_id)
            .await?
            .ok_or_else(|| Status::failed_precondition(format!("space {space_id} does not exist")))
    }

    /// Resolves the space's bound embedder so `mark_completed` can check
    /// the embedding's dimensionality (spec §3: "the vector's
    /// dimensionality equals the bound embedder's `dimensionality`").
    async fn load_bound_embedder(&self, space: &memoria_core::Space) -> Result<memoria_core::Embedder> {
        self.embedders.load_by_id(space.embedder_id).await?.ok_or_else(|| {
            Status::failed_precondition(format!("embedder {} does not exist", space.embedder_id))
        })
    }

    /// `originalContentRef` is the object-store key of an
    /// already-uploaded blob; this service only stores the reference,
    /// not the bytes (spec §4.11).
    pub async fn create(
        &self,
        caller: &AuthenticatedUser,
        space_id: ResourceId,
        original_content_ref: String,
        content_type: String,
        metadata: LabelMap,
    ) -> Result<Memory> {
        let space = self.load_owning_space(space_id).await?;
        authorize(caller, Verb::Create, ResourceKind::Memory, Some(space.owner_id))?;

        if original_content_ref.trim().is_empty() {
            return Err(Status::invalid_argument("originalContentRef must not be empty"));
        }

        let now = Utc::now();
        let memory = Memory {
            memory_id: ResourceId::new_random(),
            space_id,
            original_content_ref,
            content_type,
            metadata,
            processing_status: ProcessingStatus::Pending,
            created_at: now,
            updated_at: now,
            created_by_id: caller.user_id,
            updated_by_id: caller.user_id,
        };
        self.repo.save(&memory).await?;
        Ok(memory)
    }

    pub async fn get(&self, caller: &AuthenticatedUser, id: ResourceId) -> Result<Memory> {
        let memory = self
            .repo
            .load_by_id(id)
            .await?
            .ok_or_else(|| Status::not_found(format!("memory {id} not found")))?;
        let space = self.load_owning_space(memory.space_id).await?;
        authorize(caller, Verb::Get, ResourceKind::Memory, Some(space.owner_id))?;
        Ok(memory)
    }

    pub async fn list_by_space(
        &self,
        caller: &AuthenticatedUser,
        space_id: ResourceId,
        page: &Pagination,
    ) -> Result<Vec<Memory>> {
        let space = self.load_owning_space(space_id).await?;
        authorize(caller, Verb::List, ResourceKind::Memory, Some(space.owner_id))?;
        self.repo.list_by_space(space_id, page).await
    }

    /// Removes the row, then the vector entry and object-store blob
    /// best-effort (spec §4.11, §7): the row is authoritative, so a
    /// failure cleaning up the vector or blob is logged, not surfaced.
    pub async fn delete(&self, caller: &AuthenticatedUser, id: ResourceId) -> Result<()> {
        let memory = self
            .repo
            .load_by_id(id)
            .await?
            .ok_or_else(|| Status::not_found(format!("memory {id} not found")))?;
        let space = self.load_owning_space(memory.space_id).await?;
        authorize(caller, Verb::Delete, ResourceKind::Memory, Some(space.owner_id))?;

        self.repo.delete_by_id(id).await?;

        if let Err(e) = self.repo.delete_embedding(id).await {
            warn!(memory_id = %id, error = %e, "failed to delete embedding after memory delete");
        }
        if let Err(e) = self.objects.delete(&self.bucket, &memory.original_content_ref).await {
            warn!(memory_id = %id, error = %e, "failed to delete object-store blob after memory delete");
        }
        Ok(())
    }

    /// Called back by the (external) embedding pipeline once it starts
    /// work on a memory; not gated by caller permissions, since the
    /// pipeline runs as a trusted, process-internal collaborator rather
    /// than on behalf of an end user (spec §1: the pipeline itself is
    /// out of scope for this core).
    pub async fn mark_processing(&self, id: ResourceId) -> Result<Memory> {
        self.transition(id, ProcessingStatus::Processing).await
    }

    pub async fn mark_completed(&self, id: ResourceId, embedding: &[f32]) -> Result<Memory> {
        let current = self
            .repo
            .load_by_id(id)
            .await?
            .ok_or_else(|| Status::not_found(format!("memory {id} not found")))?;
        let space = self.load_owning_space(current.space_id).await?;
        let embedder = self.load_bound_embedder(&space).await?;
        if embedding.len() as u32 != embedder.dimensionality {
            return Err(Status::invalid_argument(format!(
                "embedding has dimensionality {}, expected {} for the bound embedder",
                embedding.len(),
                embedder.dimensionality
            )));
        }

        let memory = self.transition(id, ProcessingStatus::Completed).await?;
        self.repo.save_embedding(id, embedding).await?;
        Ok(memory)
    }

    pub async fn mark_failed(&self, id: ResourceId) -> Result<Memory> {
        self.transition(id, ProcessingStatus::Failed).await
    }

    async fn transition(&self, id: ResourceId, next: ProcessingStatus) -> Result<Memory> {
        let mut memory = self
            .repo
            .load_by_id(id)
            .await?
            .ok_or_else(|| Status::not_found(format!("memory {id} not found")))?;
        if !memory.processing_status.can_transition_to(next) {
            return Err(Status::failed_precondition(format!(
                "cannot transition memory {id} from {:?} to {next:?}",
                memory.processing_status
            )));
        }
        memory.processing_status = next;
        memory.updated_at = Utc::now();
        self.repo.save(&memory).await?;
        Ok(memory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use memoria_core::{
        Embedder, EmbedderFilter, Modality, ProviderType, Role, SpaceFilter, StatusCode,
    };
    use memoria_storage::FakeObjectStore;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeMemoryRepo {
        memories: Mutex<Vec<Memory>>,
        embeddings: Mutex<Vec<(ResourceId, Vec<f32>)>>,
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
        async fn save_embedding(&self, memory_id: ResourceId, embedding: &[f32]) -> Result<()> {
            self.embeddings.lock().unwrap().push((memory_id, embedding.to_vec()));
            Ok(())
        }
        async fn delete_embedding(&self, memory_id: ResourceId) -> Result<()> {
            self.embeddings.lock().unwrap().retain(|(id, _)| *id != memory_id);
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeSpaceRepo {
        spaces: Mutex<Vec<memoria_core::Space>>,
    }

    #[async_trait]
    impl SpaceRepository for FakeSpaceRepo {
        async fn load_by_id(&self, id: ResourceId) -> Result<Option<memoria_core::Space>> {
            Ok(self.spaces.lock().unwrap().iter().find(|s| s.space_id == id).cloned())
        }
        async fn load_by_owner_and_name(&self, _: ResourceId, _: &str) -> Result<Option<memoria_core::Space>> {
            Ok(None)
        }
        async fn save(&self, space: &memoria_core::Space) -> Result<()> {
            self.spaces.lock().unwrap().push(space.clone());
            Ok(())
        }
        async fn delete_by_id(&self, _id: ResourceId) -> Result<()> {
            Ok(())
        }
        async fn list(&self, _filter: &SpaceFilter, _page: &Pagination) -> Result<Vec<memoria_core::Space>> {
            Ok(self.spaces.lock().unwrap().clone())
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
        async fn load_by_connection_triple(&self, _: &str, _: &str, _: &str) -> Result<Option<Embedder>> {
            Ok(None)
        }
        async fn save(&self, embedder: &Embedder) -> Result<()> {
            self.embedders.lock().unwrap().push(embedder.clone());
            Ok(())
        }
        async fn delete_by_id(&self, _id: ResourceId) -> Result<()> {
            Ok(())
        }
        async fn list(&self, _filter: &EmbedderFilter, _page: &Pagination) -> Result<Vec<Embedder>> {
            Ok(self.embedders.lock().unwrap().clone())
        }
    }

    fn caller(role: Role, user_id: ResourceId) -> AuthenticatedUser {
        AuthenticatedUser::new(user_id, vec![role], ResourceId::new_random())
    }

    fn sample_space(owner_id: ResourceId, embedder_id: ResourceId) -> memoria_core::Space {
        let now = Utc::now();
        memoria_core::Space {
            space_id: ResourceId::new_random(),
            name: "s".to_string(),
            owner_id,
            embedder_id,
            labels: LabelMap::new(),
            public_read: false,
            created_at: now,
            updated_at: now,
            created_by_id: owner_id,
            updated_by_id: owner_id,
        }
    }

    fn sample_embedder(owner_id: ResourceId, dimensionality: u32) -> Embedder {
        let now = Utc::now();
        Embedder {
            embedder_id: ResourceId::new_random(),
            display_name: "E".to_string(),
            description: String::new(),
            provider_type: ProviderType::Openai,
            endpoint_url: "https://api.openai.com".to_string(),
            api_path: "/v1/embeddings".to_string(),
            model_identifier: "text-embedding-3-small".to_string(),
            dimensionality,
            max_sequence_length: None,
            supported_modalities: vec![Modality::Text],
            credentials: "secret".to_string(),
            labels: LabelMap::new(),
            version: 1,
            monitoring_endpoint: None,
            owner_id,
            created_at: now,
            updated_at: now,
            created_by_id: owner_id,
            updated_by_id: owner_id,
        }
    }

    async fn setup() -> (MemoryService, memoria_core::Space, AuthenticatedUser) {
        setup_with_dimensionality(2).await
    }

    async fn setup_with_dimensionality(dimensionality: u32) -> (MemoryService, memoria_core::Space, AuthenticatedUser) {
        let user = caller(Role::User, ResourceId::new_random());
        let embedder_repo = Arc::new(FakeEmbedderRepo::default());
        let embedder = sample_embedder(user.user_id, dimensionality);
        embedder_repo.save(&embedder).await.unwrap();

        let space_repo = Arc::new(FakeSpaceRepo::default());
        let space = sample_space(user.user_id, embedder.embedder_id);
        space_repo.save(&space).await.unwrap();

        let service = MemoryService::new(
            Arc::new(FakeMemoryRepo::default()),
            space_repo,
            embedder_repo,
            Arc::new(FakeObjectStore::new()),
            "memoria-blobs".to_string(),
        );
        (service, space, user)
    }

    #[tokio::test]
    async fn create_rejects_unknown_space() {
        let (service, _space, user) = setup().await;
        let err = service
            .create(
                &user,
                ResourceId::new_random(),
                "blob/key".to_string(),
                "text/plain".to_string(),
                LabelMap::new(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, StatusCode::FailedPrecondition);
    }

    #[tokio::test]
    async fn create_then_delete_removes_the_row() {
        let (service, space, user) = setup().await;
        let memory = service
            .create(
                &user,
                space.space_id,
                "blob/key".to_string(),
                "text/plain".to_string(),
                LabelMap::new(),
            )
            .await
            .unwrap();
        service.delete(&user, memory.memory_id).await.unwrap();
        let err = service.get(&user, memory.memory_id).await.unwrap_err();
        assert_eq!(err.code, StatusCode::NotFound);
    }

    #[tokio::test]
    async fn another_owners_space_is_not_accessible() {
        let (service, space, _user) = setup().await;
        let intruder = caller(Role::User, ResourceId::new_random());
        let err = service
            .create(
                &intruder,
                space.space_id,
                "blob/key".to_string(),
                "text/plain".to_string(),
                LabelMap::new(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, StatusCode::PermissionDenied);
    }

    #[tokio::test]
    async fn processing_status_follows_the_state_machine() {
        let (service, space, user) = setup().await;
        let memory = service
            .create(
                &user,
                space.space_id,
                "blob/key".to_string(),
                "text/plain".to_string(),
                LabelMap::new(),
            )
            .await
            .unwrap();

        let err = service.mark_completed(memory.memory_id, &[0.1, 0.2]).await.unwrap_err();
        assert_eq!(err.code, StatusCode::FailedPrecondition);

        service.mark_processing(memory.memory_id).await.unwrap();
        let completed = service.mark_completed(memory.memory_id, &[0.1, 0.2]).await.unwrap();
        assert_eq!(completed.processing_status, ProcessingStatus::Completed);
    }

    #[tokio::test]
    async fn mark_completed_rejects_embedding_with_wrong_dimensionality() {
        let (service, space, user) = setup_with_dimensionality(3).await;
        let memory = service
            .create(
                &user,
                space.space_id,
                "blob/key".to_string(),
                "text/plain".to_string(),
                LabelMap::new(),
            )
            .await
            .unwrap();

        service.mark_processing(memory.memory_id).await.unwrap();
        let err = service
            .mark_completed(memory.memory_id, &[0.1, 0.2])
            .await
            .unwrap_err();
        assert_eq!(err.code, StatusCode::InvalidArgument);
    }
}
