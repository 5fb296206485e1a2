//! Integration tests for the Postgres-backed DAL.
//!
//! Requires a running Postgres instance with the `vector` extension
//! available. Run: `docker compose -f docker/postgres-compose.yml up -d`

use chrono::Utc;
use memoria_core::{
    ApiKey, ApiKeyRepository, ApiKeyStatus, LabelMap, ResourceId, Role, User, UserRepository,
};
use memoria_storage::{PgApiKeyRepository, PgUserRepository, PgPool, PostgresConfig};
use tokio::sync::OnceCell;

const TEST_HOST: &str = "localhost:5432/memoria_test";

static MIGRATION_INIT: OnceCell<()> = OnceCell::const_new();

async fn pool() -> PgPool {
    let config = PostgresConfig::new(TEST_HOST, "memoria", "memoria_dev_pass");
    let pool = PgPool::new(&config).expect("failed to build pool");
    MIGRATION_INIT
        .get_or_init(|| async {
            pool.run_migrations()
                .await
                .expect("failed to run migrations");
        })
        .await;
    pool
}

fn sample_user() -> User {
    let now = Utc::now();
    User {
        user_id: ResourceId::new_random(),
        username: format!("user-{}", ResourceId::new_random().to_hex()),
        email: None,
        display_name: "Test User".to_string(),
        roles: vec![Role::User],
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn saves_and_loads_a_user_by_id() {
    let pool = pool().await;
    let repo = PgUserRepository::new(pool);
    let user = sample_user();

    repo.save(&user).await.unwrap();
    let loaded = repo.load_by_id(user.user_id).await.unwrap().unwrap();
    assert_eq!(loaded.username, user.username);
}

#[tokio::test]
async fn roundtrips_a_users_roles_through_the_user_role_table() {
    let pool = pool().await;
    let repo = PgUserRepository::new(pool);
    let mut user = sample_user();
    user.roles = vec![Role::User, Role::Root];

    repo.save(&user).await.unwrap();
    let loaded = repo.load_by_id(user.user_id).await.unwrap().unwrap();
    assert_eq!(loaded.roles.len(), 2);
    assert!(loaded.roles.contains(&Role::User));
    assert!(loaded.roles.contains(&Role::Root));

    user.roles = vec![Role::Root];
    repo.save(&user).await.unwrap();
    let reloaded = repo.load_by_id(user.user_id).await.unwrap().unwrap();
    assert_eq!(reloaded.roles, vec![Role::Root]);
}

#[tokio::test]
async fn loads_a_user_by_username() {
    let pool = pool().await;
    let repo = PgUserRepository::new(pool);
    let user = sample_user();

    repo.save(&user).await.unwrap();
    let loaded = repo
        .load_by_username(&user.username)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.user_id, user.user_id);
}

#[tokio::test]
async fn api_key_round_trips_and_lists_by_owner() {
    let pool = pool().await;
    let users = PgUserRepository::new(pool.clone());
    let keys = PgApiKeyRepository::new(pool);

    let user = sample_user();
    users.save(&user).await.unwrap();

    let now = Utc::now();
    let key = ApiKey {
        api_key_id: ResourceId::new_random(),
        user_id: user.user_id,
        key_prefix: "gm_abc123".to_string(),
        hashed_key_material: format!("hash-{}", ResourceId::new_random().to_hex()),
        status: ApiKeyStatus::Active,
        labels: LabelMap::new(),
        expires_at: None,
        last_used_at: None,
        created_at: now,
        updated_at: now,
        created_by_id: user.user_id,
        updated_by_id: user.user_id,
    };
    keys.save(&key).await.unwrap();

    let loaded = keys
        .load_by_hashed_key(&key.hashed_key_material)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.api_key_id, key.api_key_id);

    let owned = keys.list_by_owner(user.user_id).await.unwrap();
    assert!(owned.iter().any(|k| k.api_key_id == key.api_key_id));

    keys.touch_last_used(key.api_key_id).await.unwrap();
    let refreshed = keys.load_by_id(key.api_key_id).await.unwrap().unwrap();
    assert!(refreshed.last_used_at.is_some());
}
