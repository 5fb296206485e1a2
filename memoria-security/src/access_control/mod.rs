//! Authenticated-principal context and the permission gate.

pub mod context;
pub mod policies;

pub use context::AuthenticatedUser;
pub use policies::{
    authorize, list_owner_filter, permissions_for_role, Permission, ResourceKind, Scope, Verb,
};
