//! Audit logging for authentication, authorization, and API key events.

use chrono::{DateTime, Utc};
use memoria_core::{ResourceId, Status};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info};

/// Audit event types (spec §4.6, §4.7: every permission decision and
/// API key lifecycle transition is auditable).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AuditEvent {
    AccessGranted {
        user_id: ResourceId,
        operation: String,
        resource: String,
    },
    AccessDenied {
        user_id: ResourceId,
        operation: String,
        resource: String,
        reason: String,
    },
    AuthenticationFailed {
        reason: String,
    },
    ApiKeyCreated {
        api_key_id: ResourceId,
        owner_id: ResourceId,
    },
    ApiKeyRevoked {
        api_key_id: ResourceId,
        revoked_by: ResourceId,
    },
    SystemInitialized {
        root_user_id: ResourceId,
    },
}

/// Audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: uuid::Uuid,
    pub timestamp: DateTime<Utc>,
    pub event: AuditEvent,
}

impl AuditEntry {
    #[must_use]
    pub fn new(event: AuditEvent) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Audit logger. Entries are handed off over an unbounded channel to a
/// background task so that logging a denied request never adds latency
/// to the request path itself.
pub struct AuditLogger {
    sender: mpsc::UnboundedSender<AuditEntry>,
}

impl AuditLogger {
    #[must_use]
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<AuditEntry>();

        tokio::spawn(async move {
            while let Some(entry) = receiver.recv().await {
                match &entry.event {
                    AuditEvent::AccessGranted {
                        user_id,
                        operation,
                        resource,
                    } => {
                        info!(
                            audit = true,
                            event_type = "access_granted",
                            user_id = %user_id,
                            operation = %operation,
                            resource = %resource,
                            "access granted"
                        );
                    }
                    AuditEvent::AccessDenied {
                        user_id,
                        operation,
                        resource,
                        reason,
                    } => {
                        info!(
                            audit = true,
                            event_type = "access_denied",
                            user_id = %user_id,
                            operation = %operation,
                            resource = %resource,
                            reason = %reason,
                            "access denied"
                        );
                    }
                    AuditEvent::AuthenticationFailed { reason } => {
                        info!(
                            audit = true,
                            event_type = "authentication_failed",
                            reason = %reason,
                            "authentication failed"
                        );
                    }
                    AuditEvent::ApiKeyCreated {
                        api_key_id,
                        owner_id,
                    } => {
                        info!(
                            audit = true,
                            event_type = "api_key_created",
                            api_key_id = %api_key_id,
                            owner_id = %owner_id,
                            "api key created"
                        );
                    }
                    AuditEvent::ApiKeyRevoked {
                        api_key_id,
                        revoked_by,
                    } => {
                        info!(
                            audit = true,
                            event_type = "api_key_revoked",
                            api_key_id = %api_key_id,
                            revoked_by = %revoked_by,
                            "api key revoked"
                        );
                    }
                    AuditEvent::SystemInitialized { root_user_id } => {
                        info!(
                            audit = true,
                            event_type = "system_initialized",
                            root_user_id = %root_user_id,
                            "system initialized"
                        );
                    }
                }
            }
        });

        Self { sender }
    }

    /// Log an audit event. Never fails the caller's request on a
    /// channel send error — it only logs one.
    pub async fn log(&self, event: AuditEvent) -> memoria_core::Result<()> {
        let entry = AuditEntry::new(event);
        if let Err(e) = self.sender.send(entry) {
            error!("failed to send audit entry: {e}");
            return Err(Status::internal("audit logging channel closed"));
        }
        Ok(())
    }
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new()
    }
}
