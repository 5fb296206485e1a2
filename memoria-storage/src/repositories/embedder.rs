use async_trait::async_trait;
use memoria_core::codec::{labels_from_json, labels_to_json};
use memoria_core::{
    Embedder, EmbedderFilter, EmbedderRepository, Pagination, ResourceId, Result, SortBy,
    SortOrder, Status, StatusCode,
};
use tokio_postgres::Row;

use crate::pool::PgPool;
use crate::rowmap::{
    modalities_from_strings, modalities_to_strings, provider_type_from_str, provider_type_to_str,
};

pub struct PgEmbedderRepository {
    pool: PgPool,
}

impl PgEmbedderRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn from_row(row: &Row) -> Result<Embedder> {
        let id: uuid::Uuid = row.get("embedder_id");
        let owner: uuid::Uuid = row.get("owner_id");
        let created_by: uuid::Uuid = row.get("created_by_id");
        let updated_by: uuid::Uuid = row.get("updated_by_id");
        let provider_type: String = row.get("provider_type");
        let modalities: Vec<String> = row.get("supported_modalities");
        let labels: serde_json::Value = row.get("labels");
        let dimensionality: i32 = row.get("dimensionality");
        let max_sequence_length: Option<i32> = row.get("max_sequence_length");
        let version: i64 = row.get("version");

        Ok(Embedder {
            embedder_id: ResourceId::from_bytes(id.as_bytes())?,
            display_name: row.get("display_name"),
            description: row.get("description"),
            provider_type: provider_type_from_str(&provider_type)?,
            endpoint_url: row.get("endpoint_url"),
            api_path: row.get("api_path"),
            model_identifier: row.get("model_identifier"),
            dimensionality: dimensionality as u32,
            max_sequence_length: max_sequence_length.map(|v| v as u32),
            supported_modalities: modalities_from_strings(&modalities)?,
            credentials: row.get("credentials"),
            labels: labels_from_json(&labels)?,
            version: version as u64,
            monitoring_endpoint: row.get("monitoring_endpoint"),
            owner_id: ResourceId::from_bytes(owner.as_bytes())?,
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
            created_by_id: ResourceId::from_bytes(created_by.as_bytes())?,
            updated_by_id: ResourceId::from_bytes(updated_by.as_bytes())?,
        })
    }
}

#[async_trait]
impl EmbedderRepository for PgEmbedderRepository {
    async fn load_by_id(&self, id: ResourceId) -> Result<Option<Embedder>> {
        let client = self.pool.get_client().await?;
        let row = client
            .query_opt(
                "SELECT * FROM embedder WHERE embedder_id = $1",
                &[&uuid::Uuid::from_bytes(id.as_bytes())],
            )
            .await
            .map_err(|e| Status::with_cause(StatusCode::Internal, "load_by_id failed", e))?;
        row.map(|r| Self::from_row(&r)).transpose()
    }

    async fn load_by_connection_triple(
        &self,
        endpoint_url: &str,
        api_path: &str,
        model_identifier: &str,
    ) -> Result<Option<Embedder>> {
        let client = self.pool.get_client().await?;
        let row = client
            .query_opt(
                "SELECT * FROM embedder WHERE endpoint_url = $1 AND api_path = $2 AND model_identifier = $3",
                &[&endpoint_url, &api_path, &model_identifier],
            )
            .await
            .map_err(|e| {
                Status::with_cause(StatusCode::Internal, "load_by_connection_triple failed", e)
            })?;
        row.map(|r| Self::from_row(&r)).transpose()
    }

    async fn save(&self, embedder: &Embedder) -> Result<()> {
        let client = self.pool.get_client().await?;
        let provider_type = provider_type_to_str(embedder.provider_type);
        let modalities = modalities_to_strings(&embedder.supported_modalities);
        let labels = labels_to_json(&embedder.labels);
        client
            .execute(
                "INSERT INTO embedder (embedder_id, display_name, description, provider_type,
                    endpoint_url, api_path, model_identifier, dimensionality, max_sequence_length,
                    supported_modalities, credentials, labels, version, monitoring_endpoint,
                    owner_id, created_at, updated_at, created_by_id, updated_by_id)
                 VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,$18,$19)
                 ON CONFLICT (embedder_id) DO UPDATE SET
                    display_name = EXCLUDED.display_name,
                    description = EXCLUDED.description,
                    max_sequence_length = EXCLUDED.max_sequence_length,
                    supported_modalities = EXCLUDED.supported_modalities,
                    credentials = EXCLUDED.credentials,
                    labels = EXCLUDED.labels,
                    version = EXCLUDED.version,
                    monitoring_endpoint = EXCLUDED.monitoring_endpoint,
                    updated_at = EXCLUDED.updated_at,
                    updated_by_id = EXCLUDED.updated_by_id",
                &[
                    &uuid::Uuid::from_bytes(embedder.embedder_id.as_bytes()),
                    &embedder.display_name,
                    &embedder.description,
                    &provider_type,
                    &embedder.endpoint_url,
                    &embedder.api_path,
                    &embedder.model_identifier,
                    &(embedder.dimensionality as i32),
                    &embedder.max_sequence_length.map(|v| v as i32),
                    &modalities,
                    &embedder.credentials,
                    &labels,
                    &(embedder.version as i64),
                    &embedder.monitoring_endpoint,
                    &uuid::Uuid::from_bytes(embedder.owner_id.as_bytes()),
                    &embedder.created_at,
                    &embedder.updated_at,
                    &uuid::Uuid::from_bytes(embedder.created_by_id.as_bytes()),
                    &uuid::Uuid::from_bytes(embedder.updated_by_id.as_bytes()),
                ],
            )
            .await
            .map_err(|e| Status::with_cause(StatusCode::Internal, "save embedder failed", e))?;
        Ok(())
    }

    async fn delete_by_id(&self, id: ResourceId) -> Result<()> {
        let client = self.pool.get_client().await?;
        client
            .execute(
                "DELETE FROM embedder WHERE embedder_id = $1",
                &[&uuid::Uuid::from_bytes(id.as_bytes())],
            )
            .await
            .map_err(|e| Status::with_cause(StatusCode::Internal, "delete embedder failed", e))?;
        Ok(())
    }

    async fn list(&self, filter: &EmbedderFilter, page: &Pagination) -> Result<Vec<Embedder>> {
        let client = self.pool.get_client().await?;
        let order_col = match page.sort_by {
            SortBy::Name => "display_name",
            SortBy::UpdatedTime => "updated_at",
            SortBy::CreatedTime => "created_at",
        };
        let direction = match page.sort_order {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        };

        let owner_uuid = filter.owner_id.map(|id| uuid::Uuid::from_bytes(id.as_bytes()));
        let provider_type = filter.provider_type.map(provider_type_to_str);
        // JSONB containment keeps the label-selector match in the same query
        // as OFFSET/LIMIT; filtering after the fact would slice the page
        // before the selector was ever applied.
        let label_selectors = labels_to_json(&filter.label_selectors);

        let query = format!(
            "SELECT * FROM embedder
             WHERE ($1::uuid IS NULL OR owner_id = $1)
               AND ($2::text IS NULL OR provider_type = $2)
               AND labels @> $3::jsonb
             ORDER BY {order_col} {direction}
             OFFSET $4 LIMIT $5"
        );

        let rows = client
            .query(
                &query,
                &[
                    &owner_uuid,
                    &provider_type,
                    &label_selectors,
                    &i64::from(page.start),
                    &i64::from(page.max_results),
                ],
            )
            .await
            .map_err(|e| Status::with_cause(StatusCode::Internal, "list embedder failed", e))?;

        rows.iter().map(Self::from_row).collect()
    }
}
