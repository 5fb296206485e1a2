//! Environment-first configuration for the Memoria vector memory
//! service (spec §0, §6).
//!
//! `MemoriaConfig::from_env` is the only supported entry point in
//! production: every setting is read from the process environment
//! using the catalog in [`env_registry`], validated once at startup,
//! and handed to `memoria-server` as a single immutable value. There is
//! no profile/layering system here — this service has one deployment
//! shape, not the multi-engine preset composition the teacher's config
//! crate supported.

pub mod env_registry;
mod validation;

use std::fmt;

use memoria_core::error::{Result, Status};

pub use validation::ValidationError;

/// Postgres connection settings.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub user: String,
    pub password: String,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// S3-compatible object store settings (MinIO in development).
#[derive(Clone)]
pub struct ObjectStoreConfig {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
}

impl fmt::Debug for ObjectStoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectStoreConfig")
            .field("endpoint", &self.endpoint)
            .field("access_key", &"***")
            .field("secret_key", &"***")
            .field("bucket", &self.bucket)
            .finish()
    }
}

/// Dual-transport listen settings (spec §6: gRPC + REST side by side).
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub grpc_port: u16,
    pub http_port: u16,
    pub tls_cert_path: String,
    pub tls_key_path: String,
}

/// Top-level, validated configuration for the whole service.
#[derive(Debug, Clone)]
pub struct MemoriaConfig {
    pub database: DatabaseConfig,
    pub object_store: ObjectStoreConfig,
    pub transport: TransportConfig,
    /// Secret mixed into API key hashing (spec §4.6); never logged.
    pub apikey_pepper: String,
}

impl MemoriaConfig {
    /// Load configuration from the process environment, applying the
    /// defaults in [`env_registry::standard_vars`] and validating the
    /// result.
    pub fn from_env() -> Result<Self> {
        let raw = env_registry::read_process_env();
        let get = |name: &str| raw.get(name).cloned().flatten().unwrap_or_default();

        let config = Self {
            database: DatabaseConfig {
                url: get("DB_URL"),
                user: get("DB_USER"),
                password: get("DB_PASSWORD"),
            },
            object_store: ObjectStoreConfig {
                endpoint: get("MINIO_ENDPOINT"),
                access_key: get("MINIO_ACCESS_KEY"),
                secret_key: get("MINIO_SECRET_KEY"),
                bucket: get("MINIO_BUCKET"),
            },
            transport: TransportConfig {
                grpc_port: parse_port(&get("MEMORIA_GRPC_PORT"))?,
                http_port: parse_port(&get("MEMORIA_HTTP_PORT"))?,
                tls_cert_path: get("MEMORIA_TLS_CERT_PATH"),
                tls_key_path: get("MEMORIA_TLS_KEY_PATH"),
            },
            apikey_pepper: get("MEMORIA_APIKEY_PEPPER"),
        };

        validation::validate(&config).map_err(|e| Status::invalid_argument(e.to_string()))?;
        Ok(config)
    }
}

fn parse_port(raw: &str) -> Result<u16> {
    raw.parse()
        .map_err(|_| Status::invalid_argument(format!("invalid port value: {raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clear_all() {
        for def in env_registry::standard_vars() {
            env::remove_var(def.name);
        }
    }

    #[test]
    #[serial]
    fn from_env_applies_defaults_when_unset() {
        clear_all();
        let config = MemoriaConfig::from_env().unwrap();
        assert_eq!(config.transport.grpc_port, 9090);
        assert_eq!(config.transport.http_port, 8080);
        assert_eq!(config.object_store.bucket, "memoria-content");
    }

    #[test]
    #[serial]
    fn from_env_honors_overrides() {
        clear_all();
        env::set_var("MEMORIA_GRPC_PORT", "19090");
        let config = MemoriaConfig::from_env().unwrap();
        assert_eq!(config.transport.grpc_port, 19090);
        clear_all();
    }

    #[test]
    #[serial]
    fn from_env_rejects_non_numeric_port() {
        clear_all();
        env::set_var("MEMORIA_HTTP_PORT", "not-a-port");
        let err = MemoriaConfig::from_env().unwrap_err();
        assert_eq!(err.code, memoria_core::StatusCode::InvalidArgument);
        clear_all();
    }

    #[test]
    fn database_debug_masks_password() {
        let db = DatabaseConfig {
            url: "localhost:5432/memoria".into(),
            user: "memoria".into(),
            password: "hunter2".into(),
        };
        assert!(!format!("{db:?}").contains("hunter2"));
    }
}
