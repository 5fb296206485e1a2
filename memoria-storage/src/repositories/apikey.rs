use async_trait::async_trait;
use memoria_core::{ApiKey, ApiKeyRepository, ResourceId, Result, Status, StatusCode};
use memoria_core::codec::labels_from_json;
use tokio_postgres::Row;

use crate::pool::PgPool;
use crate::rowmap::{api_key_status_from_str, api_key_status_to_str};

pub struct PgApiKeyRepository {
    pool: PgPool,
}

impl PgApiKeyRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn from_row(row: &Row) -> Result<ApiKey> {
        let id: uuid::Uuid = row.get("api_key_id");
        let user_id: uuid::Uuid = row.get("user_id");
        let created_by: uuid::Uuid = row.get("created_by_id");
        let updated_by: uuid::Uuid = row.get("updated_by_id");
        let status: String = row.get("status");
        let labels: serde_json::Value = row.get("labels");

        Ok(ApiKey {
            api_key_id: ResourceId::from_bytes(id.as_bytes())?,
            user_id: ResourceId::from_bytes(user_id.as_bytes())?,
            key_prefix: row.get("key_prefix"),
            hashed_key_material: row.get("hashed_key_material"),
            status: api_key_status_from_str(&status)?,
            labels: labels_from_json(&labels)?,
            expires_at: row.get("expires_at"),
            last_used_at: row.get("last_used_at"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
            created_by_id: ResourceId::from_bytes(created_by.as_bytes())?,
            updated_by_id: ResourceId::from_bytes(updated_by.as_bytes())?,
        })
    }
}

#[async_trait]
impl ApiKeyRepository for PgApiKeyRepository {
    async fn load_by_id(&self, id: ResourceId) -> Result<Option<ApiKey>> {
        let client = self.pool.get_client().await?;
        let row = client
            .query_opt(
                "SELECT * FROM api_key WHERE api_key_id = $1",
                &[&uuid::Uuid::from_bytes(id.as_bytes())],
            )
            .await
            .map_err(|e| Status::with_cause(StatusCode::Internal, "load_by_id failed", e))?;
        row.map(|r| Self::from_row(&r)).transpose()
    }

    async fn load_by_hashed_key(&self, hashed_key_material: &str) -> Result<Option<ApiKey>> {
        let client = self.pool.get_client().await?;
        let row = client
            .query_opt(
                "SELECT * FROM api_key WHERE hashed_key_material = $1",
                &[&hashed_key_material],
            )
            .await
            .map_err(|e| Status::with_cause(StatusCode::Internal, "load_by_hashed_key failed", e))?;
        row.map(|r| Self::from_row(&r)).transpose()
    }

    async fn save(&self, key: &ApiKey) -> Result<()> {
        let client = self.pool.get_client().await?;
        let status = api_key_status_to_str(key.status);
        let labels = memoria_core::codec::labels_to_json(&key.labels);
        client
            .execute(
                "INSERT INTO api_key (api_key_id, user_id, key_prefix, hashed_key_material,
                    status, labels, expires_at, last_used_at, created_at, updated_at,
                    created_by_id, updated_by_id)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                 ON CONFLICT (api_key_id) DO UPDATE SET
                    status = EXCLUDED.status,
                    labels = EXCLUDED.labels,
                    expires_at = EXCLUDED.expires_at,
                    last_used_at = EXCLUDED.last_used_at,
                    updated_at = EXCLUDED.updated_at,
                    updated_by_id = EXCLUDED.updated_by_id",
                &[
                    &uuid::Uuid::from_bytes(key.api_key_id.as_bytes()),
                    &uuid::Uuid::from_bytes(key.user_id.as_bytes()),
                    &key.key_prefix,
                    &key.hashed_key_material,
                    &status,
                    &labels,
                    &key.expires_at,
                    &key.last_used_at,
                    &key.created_at,
                    &key.updated_at,
                    &uuid::Uuid::from_bytes(key.created_by_id.as_bytes()),
                    &uuid::Uuid::from_bytes(key.updated_by_id.as_bytes()),
                ],
            )
            .await
            .map_err(|e| Status::with_cause(StatusCode::Internal, "save api key failed", e))?;
        Ok(())
    }

    async fn delete_by_id(&self, id: ResourceId) -> Result<()> {
        let client = self.pool.get_client().await?;
        client
            .execute(
                "DELETE FROM api_key WHERE api_key_id = $1",
                &[&uuid::Uuid::from_bytes(id.as_bytes())],
            )
            .await
            .map_err(|e| Status::with_cause(StatusCode::Internal, "delete api key failed", e))?;
        Ok(())
    }

    async fn list_by_owner(&self, owner_id: ResourceId) -> Result<Vec<ApiKey>> {
        let client = self.pool.get_client().await?;
        let rows = client
            .query(
                "SELECT * FROM api_key WHERE user_id = $1 ORDER BY created_at ASC",
                &[&uuid::Uuid::from_bytes(owner_id.as_bytes())],
            )
            .await
            .map_err(|e| Status::with_cause(StatusCode::Internal, "list_by_owner failed", e))?;
        rows.iter().map(Self::from_row).collect()
    }

    async fn touch_last_used(&self, id: ResourceId) -> Result<()> {
        let client = self.pool.get_client().await?;
        client
            .execute(
                "UPDATE api_key SET last_used_at = now() WHERE api_key_id = $1",
                &[&uuid::Uuid::from_bytes(id.as_bytes())],
            )
            .await
            .map_err(|e| Status::with_cause(StatusCode::Internal, "touch_last_used failed", e))?;
        Ok(())
    }
}
