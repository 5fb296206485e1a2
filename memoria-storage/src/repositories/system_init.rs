//! Transactional critical section for system-init (spec §4.5).

use async_trait::async_trait;
use memoria_core::codec::labels_to_json;
use memoria_core::{ApiKey, Result, Status, StatusCode, SystemInitRepository, User};

use crate::pool::PgPool;
use crate::rowmap::{api_key_status_to_str, role_to_str};

pub struct PgSystemInitRepository {
    pool: PgPool,
}

impl PgSystemInitRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SystemInitRepository for PgSystemInitRepository {
    async fn try_init(&self, user: &User, key: &ApiKey) -> Result<bool> {
        let mut client = self.pool.get_client().await?;
        let txn = client
            .transaction()
            .await
            .map_err(|e| Status::with_cause(StatusCode::Internal, "begin init transaction failed", e))?;

        // Locks the row (if any) for the duration of the transaction so
        // two concurrent first-run callers cannot both observe "absent"
        // and both insert a root user.
        let existing = txn
            .query_opt(
                "SELECT user_id FROM \"user\" WHERE username = $1 FOR UPDATE",
                &[&user.username],
            )
            .await
            .map_err(|e| Status::with_cause(StatusCode::Internal, "lookup root user failed", e))?;

        if existing.is_some() {
            txn.rollback().await.ok();
            return Ok(false);
        }

        let user_id = uuid::Uuid::from_bytes(user.user_id.as_bytes());
        txn.execute(
            "INSERT INTO \"user\" (user_id, username, email, display_name, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
            &[
                &user_id,
                &user.username,
                &user.email,
                &user.display_name,
                &user.created_at,
                &user.updated_at,
            ],
        )
        .await
        .map_err(|e| Status::with_cause(StatusCode::Internal, "insert root user failed", e))?;

        for role in &user.roles {
            let role_str = role_to_str(*role);
            txn.execute(
                "INSERT INTO user_role (user_id, role) VALUES ($1, $2)",
                &[&user_id, &role_str],
            )
            .await
            .map_err(|e| Status::with_cause(StatusCode::Internal, "insert root user role failed", e))?;
        }

        let status = api_key_status_to_str(key.status);
        let labels = labels_to_json(&key.labels);
        txn.execute(
            "INSERT INTO api_key (api_key_id, user_id, key_prefix, hashed_key_material,
                status, labels, expires_at, last_used_at, created_at, updated_at,
                created_by_id, updated_by_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
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
        .map_err(|e| Status::with_cause(StatusCode::Internal, "insert bootstrap api key failed", e))?;

        txn.commit()
            .await
            .map_err(|e| Status::with_cause(StatusCode::Internal, "commit init transaction failed", e))?;

        Ok(true)
    }
}
