use async_trait::async_trait;
use memoria_core::{ResourceId, Result, Role, Status, StatusCode, User, UserRepository};
use tokio_postgres::Row;

use crate::pool::PgPool;
use crate::rowmap::{role_from_str, role_to_str};

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn from_row(row: &Row, roles: Vec<Role>) -> Result<User> {
        let id: uuid::Uuid = row.get("user_id");
        Ok(User {
            user_id: ResourceId::from_bytes(id.as_bytes())?,
            username: row.get("username"),
            email: row.get("email"),
            display_name: row.get("display_name"),
            roles,
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }

    async fn load_roles(client: &deadpool_postgres::Client, user_id: uuid::Uuid) -> Result<Vec<Role>> {
        let rows = client
            .query("SELECT role FROM user_role WHERE user_id = $1", &[&user_id])
            .await
            .map_err(|e| Status::with_cause(StatusCode::Internal, "load_roles failed", e))?;
        rows.iter()
            .map(|r| role_from_str(r.get::<_, String>("role").as_str()))
            .collect()
    }

    async fn hydrate(&self, row: Row) -> Result<User> {
        let client = self.pool.get_client().await?;
        let id: uuid::Uuid = row.get("user_id");
        let roles = Self::load_roles(&client, id).await?;
        Self::from_row(&row, roles)
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn load_by_id(&self, id: ResourceId) -> Result<Option<User>> {
        let client = self.pool.get_client().await?;
        let row = client
            .query_opt(
                "SELECT * FROM \"user\" WHERE user_id = $1",
                &[&uuid::Uuid::from_bytes(id.as_bytes())],
            )
            .await
            .map_err(|e| Status::with_cause(StatusCode::Internal, "load_by_id failed", e))?;
        match row {
            Some(r) => Ok(Some(self.hydrate(r).await?)),
            None => Ok(None),
        }
    }

    async fn load_by_username(&self, username: &str) -> Result<Option<User>> {
        let client = self.pool.get_client().await?;
        let row = client
            .query_opt("SELECT * FROM \"user\" WHERE username = $1", &[&username])
            .await
            .map_err(|e| Status::with_cause(StatusCode::Internal, "load_by_username failed", e))?;
        match row {
            Some(r) => Ok(Some(self.hydrate(r).await?)),
            None => Ok(None),
        }
    }

    async fn load_by_email(&self, email: &str) -> Result<Option<User>> {
        let client = self.pool.get_client().await?;
        let row = client
            .query_opt("SELECT * FROM \"user\" WHERE email = $1", &[&email])
            .await
            .map_err(|e| Status::with_cause(StatusCode::Internal, "load_by_email failed", e))?;
        match row {
            Some(r) => Ok(Some(self.hydrate(r).await?)),
            None => Ok(None),
        }
    }

    async fn save(&self, user: &User) -> Result<()> {
        let mut client = self.pool.get_client().await?;
        let txn = client
            .transaction()
            .await
            .map_err(|e| Status::with_cause(StatusCode::Internal, "begin save user failed", e))?;
        let id = uuid::Uuid::from_bytes(user.user_id.as_bytes());
        txn.execute(
            "INSERT INTO \"user\" (user_id, username, email, display_name, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (user_id) DO UPDATE SET
                username = EXCLUDED.username,
                email = EXCLUDED.email,
                display_name = EXCLUDED.display_name,
                updated_at = EXCLUDED.updated_at",
            &[
                &id,
                &user.username,
                &user.email,
                &user.display_name,
                &user.created_at,
                &user.updated_at,
            ],
        )
        .await
        .map_err(|e| Status::with_cause(StatusCode::Internal, "save user failed", e))?;

        txn.execute("DELETE FROM user_role WHERE user_id = $1", &[&id])
            .await
            .map_err(|e| Status::with_cause(StatusCode::Internal, "clear user roles failed", e))?;
        for role in &user.roles {
            let role_str = role_to_str(*role);
            txn.execute(
                "INSERT INTO user_role (user_id, role) VALUES ($1, $2)",
                &[&id, &role_str],
            )
            .await
            .map_err(|e| Status::with_cause(StatusCode::Internal, "insert user role failed", e))?;
        }

        txn.commit()
            .await
            .map_err(|e| Status::with_cause(StatusCode::Internal, "commit save user failed", e))?;
        Ok(())
    }
}
