//! Startup validation for [`crate::MemoriaConfig`].
//!
//! Kept deliberately small: this service has one deployment shape, so
//! there is no cross-profile consistency checking to do, just "is
//! every required value present and well-formed".

use std::fmt;

use crate::MemoriaConfig;

#[derive(Debug)]
pub enum ValidationError {
    MissingRequired(&'static str),
    PortCollision(u16),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRequired(name) => write!(f, "missing required setting: {name}"),
            Self::PortCollision(port) => {
                write!(f, "gRPC and HTTP ports must differ, both are {port}")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

pub fn validate(config: &MemoriaConfig) -> Result<(), ValidationError> {
    if config.database.url.is_empty() {
        return Err(ValidationError::MissingRequired("DB_URL"));
    }
    if config.object_store.bucket.is_empty() {
        return Err(ValidationError::MissingRequired("MINIO_BUCKET"));
    }
    if config.transport.grpc_port == config.transport.http_port {
        return Err(ValidationError::PortCollision(config.transport.grpc_port));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DatabaseConfig, ObjectStoreConfig, TransportConfig};

    fn base() -> MemoriaConfig {
        MemoriaConfig {
            database: DatabaseConfig {
                url: "localhost:5432/memoria".into(),
                user: "memoria".into(),
                password: String::new(),
            },
            object_store: ObjectStoreConfig {
                endpoint: "http://localhost:9000".into(),
                access_key: String::new(),
                secret_key: String::new(),
                bucket: "memoria-content".into(),
            },
            transport: TransportConfig {
                grpc_port: 9090,
                http_port: 8080,
                tls_cert_path: String::new(),
                tls_key_path: String::new(),
            },
            apikey_pepper: String::new(),
        }
    }

    #[test]
    fn accepts_a_well_formed_config() {
        assert!(validate(&base()).is_ok());
    }

    #[test]
    fn rejects_colliding_ports() {
        let mut config = base();
        config.transport.http_port = config.transport.grpc_port;
        assert!(matches!(
            validate(&config),
            Err(ValidationError::PortCollision(_))
        ));
    }

    #[test]
    fn rejects_missing_db_url() {
        let mut config = base();
        config.database.url.clear();
        assert!(matches!(
            validate(&config),
            Err(ValidationError::MissingRequired("DB_URL"))
        ));
    }
}
