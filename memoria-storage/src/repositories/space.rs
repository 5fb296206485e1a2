use async_trait::async_trait;
use memoria_core::codec::{labels_from_json, labels_to_json};
use memoria_core::{
    Pagination, ResourceId, Result, SortBy, SortOrder, Space, SpaceFilter, SpaceRepository,
    Status, StatusCode,
};
use tokio_postgres::Row;

use crate::pool::PgPool;

pub struct PgSpaceRepository {
    pool: PgPool,
}

impl PgSpaceRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn from_row(row: &Row) -> Result<Space> {
        let id: uuid::Uuid = row.get("space_id");
        let owner: uuid::Uuid = row.get("owner_id");
        let embedder: uuid::Uuid = row.get("embedder_id");
        let created_by: uuid::Uuid = row.get("created_by_id");
        let updated_by: uuid::Uuid = row.get("updated_by_id");
        let labels: serde_json::Value = row.get("labels");

        Ok(Space {
            space_id: ResourceId::from_bytes(id.as_bytes())?,
            name: row.get("name"),
            owner_id: ResourceId::from_bytes(owner.as_bytes())?,
            embedder_id: ResourceId::from_bytes(embedder.as_bytes())?,
            labels: labels_from_json(&labels)?,
            public_read: row.get("public_read"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
            created_by_id: ResourceId::from_bytes(created_by.as_bytes())?,
            updated_by_id: ResourceId::from_bytes(updated_by.as_bytes())?,
        })
    }
}

#[async_trait]
impl SpaceRepository for PgSpaceRepository {
    async fn load_by_id(&self, id: ResourceId) -> Result<Option<Space>> {
        let client = self.pool.get_client().await?;
        let row = client
            .query_opt(
                "SELECT * FROM space WHERE space_id = $1",
                &[&uuid::Uuid::from_bytes(id.as_bytes())],
            )
            .await
            .map_err(|e| Status::with_cause(StatusCode::Internal, "load_by_id failed", e))?;
        row.map(|r| Self::from_row(&r)).transpose()
    }

    async fn load_by_owner_and_name(&self, owner_id: ResourceId, name: &str) -> Result<Option<Space>> {
        let client = self.pool.get_client().await?;
        let row = client
            .query_opt(
                "SELECT * FROM space WHERE owner_id = $1 AND name = $2",
                &[&uuid::Uuid::from_bytes(owner_id.as_bytes()), &name],
            )
            .await
            .map_err(|e| {
                Status::with_cause(StatusCode::Internal, "load_by_owner_and_name failed", e)
            })?;
        row.map(|r| Self::from_row(&r)).transpose()
    }

    async fn save(&self, space: &Space) -> Result<()> {
        let client = self.pool.get_client().await?;
        let labels = labels_to_json(&space.labels);
        client
            .execute(
                "INSERT INTO space (space_id, name, owner_id, embedder_id, labels, public_read,
                    created_at, updated_at, created_by_id, updated_by_id)
                 VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)
                 ON CONFLICT (space_id) DO UPDATE SET
                    name = EXCLUDED.name,
                    labels = EXCLUDED.labels,
                    public_read = EXCLUDED.public_read,
                    updated_at = EXCLUDED.updated_at,
                    updated_by_id = EXCLUDED.updated_by_id",
                &[
                    &uuid::Uuid::from_bytes(space.space_id.as_bytes()),
                    &space.name,
                    &uuid::Uuid::from_bytes(space.owner_id.as_bytes()),
                    &uuid::Uuid::from_bytes(space.embedder_id.as_bytes()),
                    &labels,
                    &space.public_read,
                    &space.created_at,
                    &space.updated_at,
                    &uuid::Uuid::from_bytes(space.created_by_id.as_bytes()),
                    &uuid::Uuid::from_bytes(space.updated_by_id.as_bytes()),
                ],
            )
            .await
            .map_err(|e| Status::with_cause(StatusCode::Internal, "save space failed", e))?;
        Ok(())
    }

    async fn delete_by_id(&self, id: ResourceId) -> Result<()> {
        // ON DELETE CASCADE on `memory.space_id` handles the cascade
        // (spec §3, §5); a single statement is enough to stay
        // transactional without an explicit BEGIN/COMMIT here.
        let client = self.pool.get_client().await?;
        client
            .execute(
                "DELETE FROM space WHERE space_id = $1",
                &[&uuid::Uuid::from_bytes(id.as_bytes())],
            )
            .await
            .map_err(|e| Status::with_cause(StatusCode::Internal, "delete space failed", e))?;
        Ok(())
    }

    async fn list(&self, filter: &SpaceFilter, page: &Pagination) -> Result<Vec<Space>> {
        let client = self.pool.get_client().await?;
        let order_col = match page.sort_by {
            SortBy::Name => "name",
            SortBy::UpdatedTime => "updated_at",
            SortBy::CreatedTime => "created_at",
        };
        let direction = match page.sort_order {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        };

        let owner_uuid = filter.owner_id.map(|id| uuid::Uuid::from_bytes(id.as_bytes()));
        let name_pattern = filter
            .name_filter
            .as_ref()
            .map(|f| f.replace('*', "%"));
        // JSONB containment (`labels @> selectors`) pushes the label-selector
        // match into the same query as OFFSET/LIMIT, so pagination stays
        // correct when selectors are present (an in-memory post-filter would
        // apply after the page had already been sliced).
        let label_selectors = labels_to_json(&filter.label_selectors);

        let query = format!(
            "SELECT * FROM space
             WHERE ($1::uuid IS NULL OR owner_id = $1)
               AND ($2::text IS NULL OR name LIKE $2)
               AND labels @> $3::jsonb
             ORDER BY {order_col} {direction}
             OFFSET $4 LIMIT $5"
        );

        let rows = client
            .query(
                &query,
                &[
                    &owner_uuid,
                    &name_pattern,
                    &label_selectors,
                    &i64::from(page.start),
                    &i64::from(page.max_results),
                ],
            )
            .await
            .map_err(|e| Status::with_cause(StatusCode::Internal, "list space failed", e))?;

        rows.iter().map(Self::from_row).collect()
    }
}
