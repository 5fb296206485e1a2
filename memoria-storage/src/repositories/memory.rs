use async_trait::async_trait;
use memoria_core::codec::labels_to_json;
use memoria_core::{Memory, MemoryRepository, Pagination, ResourceId, Result, Status, StatusCode};
use pgvector::Vector;
use tokio_postgres::Row;

use crate::pool::PgPool;
use crate::rowmap::{processing_status_from_str, processing_status_to_str};

pub struct PgMemoryRepository {
    pool: PgPool,
}

impl PgMemoryRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn from_row(row: &Row) -> Result<Memory> {
        let id: uuid::Uuid = row.get("memory_id");
        let space: uuid::Uuid = row.get("space_id");
        let created_by: uuid::Uuid = row.get("created_by_id");
        let updated_by: uuid::Uuid = row.get("updated_by_id");
        let status: String = row.get("processing_status");
        let metadata: serde_json::Value = row.get("metadata");

        Ok(Memory {
            memory_id: ResourceId::from_bytes(id.as_bytes())?,
            space_id: ResourceId::from_bytes(space.as_bytes())?,
            original_content_ref: row.get("original_content_ref"),
            content_type: row.get("content_type"),
            metadata: memoria_core::codec::labels_from_json(&metadata)?,
            processing_status: processing_status_from_str(&status)?,
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
            created_by_id: ResourceId::from_bytes(created_by.as_bytes())?,
            updated_by_id: ResourceId::from_bytes(updated_by.as_bytes())?,
        })
    }
}

#[async_trait]
impl MemoryRepository for PgMemoryRepository {
    async fn load_by_id(&self, id: ResourceId) -> Result<Option<Memory>> {
        let client = self.pool.get_client().await?;
        let row = client
            .query_opt(
                "SELECT * FROM memory WHERE memory_id = $1",
                &[&uuid::Uuid::from_bytes(id.as_bytes())],
            )
            .await
            .map_err(|e| Status::with_cause(StatusCode::Internal, "load_by_id failed", e))?;
        row.map(|r| Self::from_row(&r)).transpose()
    }

    async fn save(&self, memory: &Memory) -> Result<()> {
        let client = self.pool.get_client().await?;
        let status = processing_status_to_str(memory.processing_status);
        let metadata = labels_to_json(&memory.metadata);
        client
            .execute(
                "INSERT INTO memory (memory_id, space_id, original_content_ref, content_type,
                    metadata, processing_status, created_at, updated_at, created_by_id, updated_by_id)
                 VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)
                 ON CONFLICT (memory_id) DO UPDATE SET
                    metadata = EXCLUDED.metadata,
                    processing_status = EXCLUDED.processing_status,
                    updated_at = EXCLUDED.updated_at,
                    updated_by_id = EXCLUDED.updated_by_id",
                &[
                    &uuid::Uuid::from_bytes(memory.memory_id.as_bytes()),
                    &uuid::Uuid::from_bytes(memory.space_id.as_bytes()),
                    &memory.original_content_ref,
                    &memory.content_type,
                    &metadata,
                    &status,
                    &memory.created_at,
                    &memory.updated_at,
                    &uuid::Uuid::from_bytes(memory.created_by_id.as_bytes()),
                    &uuid::Uuid::from_bytes(memory.updated_by_id.as_bytes()),
                ],
            )
            .await
            .map_err(|e| Status::with_cause(StatusCode::Internal, "save memory failed", e))?;
        Ok(())
    }

    async fn delete_by_id(&self, id: ResourceId) -> Result<()> {
        let client = self.pool.get_client().await?;
        client
            .execute(
                "DELETE FROM memory WHERE memory_id = $1",
                &[&uuid::Uuid::from_bytes(id.as_bytes())],
            )
            .await
            .map_err(|e| Status::with_cause(StatusCode::Internal, "delete memory failed", e))?;
        Ok(())
    }

    async fn list_by_space(&self, space_id: ResourceId, page: &Pagination) -> Result<Vec<Memory>> {
        let client = self.pool.get_client().await?;
        let rows = client
            .query(
                "SELECT * FROM memory WHERE space_id = $1
                 ORDER BY created_at ASC OFFSET $2 LIMIT $3",
                &[
                    &uuid::Uuid::from_bytes(space_id.as_bytes()),
                    &i64::from(page.start),
                    &i64::from(page.max_results),
                ],
            )
            .await
            .map_err(|e| Status::with_cause(StatusCode::Internal, "list_by_space failed", e))?;
        rows.iter().map(Self::from_row).collect()
    }

    async fn save_embedding(&self, memory_id: ResourceId, embedding: &[f32]) -> Result<()> {
        let client = self.pool.get_client().await?;
        let vector = Vector::from(embedding.to_vec());
        client
            .execute(
                "UPDATE memory SET embedding = $2 WHERE memory_id = $1",
                &[&uuid::Uuid::from_bytes(memory_id.as_bytes()), &vector],
            )
            .await
            .map_err(|e| Status::with_cause(StatusCode::Internal, "save_embedding failed", e))?;
        Ok(())
    }

    async fn delete_embedding(&self, memory_id: ResourceId) -> Result<()> {
        let client = self.pool.get_client().await?;
        client
            .execute(
                "UPDATE memory SET embedding = NULL WHERE memory_id = $1",
                &[&uuid::Uuid::from_bytes(memory_id.as_bytes())],
            )
            .await
            .map_err(|e| Status::with_cause(StatusCode::Internal, "delete_embedding failed", e))?;
        Ok(())
    }
}
