//! Centralized environment variable registry.
//!
//! A single source of truth for every environment variable Memoria reads,
//! grounded on the teacher's `EnvRegistry`/`EnvVarDef` shape: each
//! variable knows its own description, whether it's sensitive (for
//! masking in diagnostics), and an optional default.

use std::collections::HashMap;
use std::env;

/// Category of environment variable, used to group `memoria-server`'s
/// `--print-config` diagnostic output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvCategory {
    Database,
    ObjectStore,
    Transport,
}

/// Definition of one recognized environment variable.
#[derive(Debug, Clone)]
pub struct EnvVarDef {
    pub name: &'static str,
    pub description: &'static str,
    pub category: EnvCategory,
    pub default: Option<&'static str>,
    pub sensitive: bool,
}

/// The catalog of every environment variable Memoria understands
/// (spec §6).
#[must_use]
pub fn standard_vars() -> Vec<EnvVarDef> {
    vec![
        EnvVarDef {
            name: "DB_URL",
            description: "PostgreSQL connection string (host:port/dbname)",
            category: EnvCategory::Database,
            default: Some("localhost:5432/memoria"),
            sensitive: false,
        },
        EnvVarDef {
            name: "DB_USER",
            description: "PostgreSQL user",
            category: EnvCategory::Database,
            default: Some("memoria"),
            sensitive: false,
        },
        EnvVarDef {
            name: "DB_PASSWORD",
            description: "PostgreSQL password",
            category: EnvCategory::Database,
            default: None,
            sensitive: true,
        },
        EnvVarDef {
            name: "MINIO_ENDPOINT",
            description: "S3-compatible object store endpoint",
            category: EnvCategory::ObjectStore,
            default: Some("http://localhost:9000"),
            sensitive: false,
        },
        EnvVarDef {
            name: "MINIO_ACCESS_KEY",
            description: "Object store access key",
            category: EnvCategory::ObjectStore,
            default: None,
            sensitive: true,
        },
        EnvVarDef {
            name: "MINIO_SECRET_KEY",
            description: "Object store secret key",
            category: EnvCategory::ObjectStore,
            default: None,
            sensitive: true,
        },
        EnvVarDef {
            name: "MINIO_BUCKET",
            description: "Bucket holding memory content blobs",
            category: EnvCategory::ObjectStore,
            default: Some("memoria-content"),
            sensitive: false,
        },
        EnvVarDef {
            name: "MEMORIA_GRPC_PORT",
            description: "Binary RPC listen port (spec default 9090)",
            category: EnvCategory::Transport,
            default: Some("9090"),
            sensitive: false,
        },
        EnvVarDef {
            name: "MEMORIA_HTTP_PORT",
            description: "JSON/HTTP listen port (spec default 8080)",
            category: EnvCategory::Transport,
            default: Some("8080"),
            sensitive: false,
        },
        EnvVarDef {
            name: "MEMORIA_TLS_CERT_PATH",
            description: "TLS certificate path for the gRPC surface",
            category: EnvCategory::Transport,
            default: Some("/etc/memoria/tls/server.crt"),
            sensitive: false,
        },
        EnvVarDef {
            name: "MEMORIA_TLS_KEY_PATH",
            description: "TLS private key path for the gRPC surface",
            category: EnvCategory::Transport,
            default: Some("/etc/memoria/tls/server.key"),
            sensitive: false,
        },
        EnvVarDef {
            name: "MEMORIA_APIKEY_PEPPER",
            description: "Per-install secret mixed into API key hashing",
            category: EnvCategory::Transport,
            default: None,
            sensitive: true,
        },
    ]
}

/// Read every recognized variable out of the process environment,
/// falling back to its registered default.
#[must_use]
pub fn read_process_env() -> HashMap<&'static str, Option<String>> {
    standard_vars()
        .into_iter()
        .map(|def| {
            let value = env::var(def.name)
                .ok()
                .or_else(|| def.default.map(ToString::to_string));
            (def.name, value)
        })
        .collect()
}

/// Render `value` for diagnostics, masking it if the variable is marked
/// sensitive.
#[must_use]
pub fn mask_if_sensitive(def: &EnvVarDef, value: &str) -> String {
    if def.sensitive && !value.is_empty() {
        "***".to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_var_has_a_unique_name() {
        let vars = standard_vars();
        let mut names: Vec<_> = vars.iter().map(|v| v.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), vars.len());
    }

    #[test]
    fn masks_sensitive_values() {
        let def = EnvVarDef {
            name: "X",
            description: "",
            category: EnvCategory::Database,
            default: None,
            sensitive: true,
        };
        assert_eq!(mask_if_sensitive(&def, "hunter2"), "***");
    }
}
