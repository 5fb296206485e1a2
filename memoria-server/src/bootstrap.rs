//! Wires every crate in the workspace together into one running
//! process (spec §4.11): config → pool/object store → migrations →
//! repositories → services → both transports, behind one shared
//! [`AuthInterceptor`].

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use memoria_config::MemoriaConfig;
use memoria_security::{AuditLogger, AuthInterceptor};
use memoria_services::{ApiKeyService, EmbedderService, MemoryService, SpaceService, SystemInitService, UserService};
use memoria_storage::{
    PgApiKeyRepository, PgEmbedderRepository, PgMemoryRepository, PgPool, PgSpaceRepository,
    PgSystemInitRepository, PgUserRepository, PostgresConfig, S3ObjectStore,
};
use tonic::transport::{Identity, Server, ServerTlsConfig};
use tracing_subscriber::EnvFilter;

use crate::shutdown::{ShutdownConfig, ShutdownCoordinator};

/// Reads `RUST_LOG` if set, otherwise defaults to `info`; matches the
/// teacher CLI's stderr-only tracing setup, minus the `--trace` flag
/// this binary has no argv for.
fn setup_tracing() {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Runs the service until `Ctrl+C`, draining in-flight requests before
/// returning.
pub async fn run() -> Result<()> {
    setup_tracing();

    let config = MemoriaConfig::from_env().context("loading configuration")?;
    tracing::info!(
        grpc_port = config.transport.grpc_port,
        http_port = config.transport.http_port,
        "starting memoria-server"
    );

    let pg_config = PostgresConfig::new(&config.database.url, &config.database.user, &config.database.password);
    let pool = PgPool::new(&pg_config).context("building postgres pool")?;
    pool.run_migrations().await.context("running migrations")?;

    let objects = Arc::new(
        S3ObjectStore::new(
            &config.object_store.endpoint,
            &config.object_store.access_key,
            &config.object_store.secret_key,
        )
        .await,
    );
    if !objects.bucket_exists(&config.object_store.bucket).await? {
        objects.make_bucket(&config.object_store.bucket).await?;
    }

    let users_repo = Arc::new(PgUserRepository::new(pool.clone()));
    let api_keys_repo = Arc::new(PgApiKeyRepository::new(pool.clone()));
    let embedders_repo = Arc::new(PgEmbedderRepository::new(pool.clone()));
    let spaces_repo = Arc::new(PgSpaceRepository::new(pool.clone()));
    let memories_repo = Arc::new(PgMemoryRepository::new(pool.clone()));
    let system_init_repo = Arc::new(PgSystemInitRepository::new(pool.clone()));

    let audit = Arc::new(AuditLogger::new());
    let auth = Arc::new(AuthInterceptor::new(
        api_keys_repo.clone(),
        users_repo.clone(),
        audit.clone(),
        config.apikey_pepper.clone(),
    ));

    let system_init = Arc::new(SystemInitService::new(system_init_repo, config.apikey_pepper.clone(), audit.clone()));
    let users = Arc::new(UserService::new(users_repo));
    let api_keys = Arc::new(ApiKeyService::new(api_keys_repo, config.apikey_pepper.clone(), audit));
    let embedders = Arc::new(EmbedderService::new(embedders_repo.clone()));
    let spaces = Arc::new(SpaceService::new(spaces_repo.clone(), embedders_repo.clone(), None));
    let memories = Arc::new(MemoryService::new(
        memories_repo,
        spaces_repo,
        embedders_repo,
        objects,
        config.object_store.bucket.clone(),
    ));

    let grpc_services = memoria_grpc::GrpcServices::new(
        auth.clone(),
        system_init.clone(),
        users.clone(),
        api_keys.clone(),
        embedders.clone(),
        spaces.clone(),
        memories.clone(),
    );
    let reflection = memoria_grpc::reflection_service().context("building grpc reflection service")?;

    let state = memoria_web::AppState::new(auth, system_init, users, api_keys, embedders, spaces, memories);
    let app = memoria_web::build_app(state);

    let shutdown = Arc::new(ShutdownCoordinator::new(ShutdownConfig::default()));

    let grpc_addr = format!("0.0.0.0:{}", config.transport.grpc_port)
        .parse()
        .context("parsing grpc listen address")?;
    let tls_identity = tokio::fs::read(&config.transport.tls_cert_path)
        .await
        .context("reading tls cert")?;
    let tls_key = tokio::fs::read(&config.transport.tls_key_path)
        .await
        .context("reading tls key")?;
    let tls_config = ServerTlsConfig::new().identity(Identity::from_pem(tls_identity, tls_key));

    let grpc_shutdown = shutdown.clone();
    let grpc_task = tokio::spawn(async move {
        Server::builder()
            .tls_config(tls_config)
            .context("configuring grpc tls")?
            .add_service(reflection)
            .add_service(grpc_services.system)
            .add_service(grpc_services.user)
            .add_service(grpc_services.api_key)
            .add_service(grpc_services.embedder)
            .add_service(grpc_services.space)
            .add_service(grpc_services.memory)
            .serve_with_shutdown(grpc_addr, grpc_shutdown.signal())
            .await
            .context("grpc server")
    });

    let http_addr = format!("0.0.0.0:{}", config.transport.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .context("binding http listener")?;
    let http_shutdown = shutdown.clone();
    let http_task = tokio::spawn(async move {
        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(http_shutdown.signal())
            .await
            .context("http server")
    });

    shutdown.wait_for_signal().await;

    match tokio::time::timeout(shutdown.grace_period(), async {
        let _ = tokio::join!(grpc_task, http_task);
    })
    .await
    {
        Ok(()) => tracing::info!("drained in-flight requests cleanly"),
        Err(_) => tracing::warn!("grace period elapsed before transports drained"),
    }

    Ok(())
}
