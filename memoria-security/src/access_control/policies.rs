//! The permission gate (spec §4.5, §4.6): a closed `Verb x Resource x
//! Scope` permission model, two role bundles, and the 3-step algorithm
//! every service method runs a call through before touching storage.

use std::fmt;

use memoria_core::{ResourceId, Role, Status};

use crate::access_control::context::AuthenticatedUser;

/// The action being attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Create,
    Get,
    List,
    Update,
    Delete,
}

/// The aggregate the action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    User,
    ApiKey,
    Embedder,
    Space,
    Memory,
}

/// Whether the permission covers only the caller's own resources, or
/// every tenant's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Own,
    Any,
}

/// One `(verb, resource, scope)` grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Permission {
    pub verb: Verb,
    pub resource: ResourceKind,
    pub scope: Scope,
}

impl Permission {
    #[must_use]
    pub const fn new(verb: Verb, resource: ResourceKind, scope: Scope) -> Self {
        Self {
            verb,
            resource,
            scope,
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}_{:?}_{:?}",
            self.verb, self.resource, self.scope
        )
    }
}

const ALL_RESOURCES: [ResourceKind; 5] = [
    ResourceKind::User,
    ResourceKind::ApiKey,
    ResourceKind::Embedder,
    ResourceKind::Space,
    ResourceKind::Memory,
];

const ALL_VERBS: [Verb; 5] = [
    Verb::Create,
    Verb::Get,
    Verb::List,
    Verb::Update,
    Verb::Delete,
];

/// Every permission a [`Role`] bundles. `Root` gets everything in both
/// scopes; `User` gets every verb on every resource, scoped to its own
/// resources only (spec §4.6: "`ROOT` = everything, `USER` = all
/// `*_OWN`").
#[must_use]
pub fn permissions_for_role(role: Role) -> Vec<Permission> {
    let mut out = Vec::with_capacity(ALL_RESOURCES.len() * ALL_VERBS.len());
    for &resource in &ALL_RESOURCES {
        for &verb in &ALL_VERBS {
            match role {
                Role::Root => {
                    out.push(Permission::new(verb, resource, Scope::Own));
                    out.push(Permission::new(verb, resource, Scope::Any));
                }
                Role::User => {
                    out.push(Permission::new(verb, resource, Scope::Own));
                }
            }
        }
    }
    out
}

#[must_use]
fn user_has_permission(user: &AuthenticatedUser, required: Permission) -> bool {
    user.roles
        .iter()
        .any(|&role| permissions_for_role(role).contains(&required))
}

/// Runs the 3-step permission gate every resource-service method calls
/// before touching the DAL:
///
/// 1. Determine the [`Scope`] of the attempted action: `Own` if
///    `owner_id` is `Some` and equals the caller's user id, `Any`
///    otherwise (including anonymous/cross-tenant targets).
/// 2. Look up whether any of the caller's roles grant
///    `(verb, resource, scope)`.
/// 3. If the caller fails the `Own` check but holds the `Any` grant,
///    allow anyway — `Any` always subsumes `Own`.
///
/// Returns `PERMISSION_DENIED` (not `NOT_FOUND`) on failure: spec §4.6
/// is explicit that authorization failures must not leak whether the
/// resource exists.
pub fn authorize(
    user: &AuthenticatedUser,
    verb: Verb,
    resource: ResourceKind,
    owner_id: Option<ResourceId>,
) -> Result<(), Status> {
    let is_own = owner_id.is_some_and(|owner| owner == user.user_id);
    let attempted_scope = if is_own { Scope::Own } else { Scope::Any };

    let required = Permission::new(verb, resource, attempted_scope);
    if user_has_permission(user, required) {
        return Ok(());
    }

    // Own check failed: Any still might cover it.
    if attempted_scope == Scope::Own {
        let broadened = Permission::new(verb, resource, Scope::Any);
        if user_has_permission(user, broadened) {
            return Ok(());
        }
    }

    Err(Status::permission_denied(format!(
        "requires {}",
        Permission::new(verb, resource, Scope::Any)
    )))
}

/// Authorization for `LIST` calls is a filter, not a gate (spec §4.6):
/// a `USER`-role caller always succeeds, but is restricted to their own
/// resources unless they hold the `Any` grant. Returns the owner filter
/// to apply, or `None` meaning "no owner restriction".
#[must_use]
pub fn list_owner_filter(user: &AuthenticatedUser, resource: ResourceKind) -> Option<ResourceId> {
    let any_grant = Permission::new(Verb::List, resource, Scope::Any);
    if user_has_permission(user, any_grant) {
        None
    } else {
        Some(user.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root_user() -> AuthenticatedUser {
        AuthenticatedUser::new(
            ResourceId::new_random(),
            vec![Role::Root],
            ResourceId::new_random(),
        )
    }

    fn plain_user() -> AuthenticatedUser {
        AuthenticatedUser::new(
            ResourceId::new_random(),
            vec![Role::User],
            ResourceId::new_random(),
        )
    }

    #[test]
    fn root_may_touch_any_owner() {
        let user = root_user();
        assert!(authorize(
            &user,
            Verb::Delete,
            ResourceKind::Space,
            Some(ResourceId::new_random())
        )
        .is_ok());
    }

    #[test]
    fn plain_user_may_touch_their_own_resource() {
        let user = plain_user();
        assert!(authorize(&user, Verb::Update, ResourceKind::Space, Some(user.user_id)).is_ok());
    }

    #[test]
    fn plain_user_denied_on_someone_elses_resource() {
        let user = plain_user();
        let err = authorize(
            &user,
            Verb::Update,
            ResourceKind::Space,
            Some(ResourceId::new_random()),
        )
        .unwrap_err();
        assert_eq!(err.code, memoria_core::StatusCode::PermissionDenied);
    }

    #[test]
    fn list_filter_restricts_plain_users_to_their_own() {
        let user = plain_user();
        assert_eq!(
            list_owner_filter(&user, ResourceKind::Space),
            Some(user.user_id)
        );
    }

    #[test]
    fn list_filter_is_unrestricted_for_root() {
        let user = root_user();
        assert_eq!(list_owner_filter(&user, ResourceKind::Space), None);
    }
}
