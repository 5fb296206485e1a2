//! Authentication, authorization, API key lifecycle, audit logging,
//! and the pagination-token codec for the Memoria vector memory
//! service.

pub mod access_control;
pub mod apikey;
pub mod audit;
pub mod auth;
pub mod pagination;

pub use access_control::{
    authorize, list_owner_filter, permissions_for_role, AuthenticatedUser, Permission,
    ResourceKind, Scope, Verb,
};
pub use apikey::GeneratedApiKey;
pub use audit::{AuditEntry, AuditEvent, AuditLogger};
pub use auth::{is_open_method, AuthInterceptor};
pub use pagination::PageToken;
