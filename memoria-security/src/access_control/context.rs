//! The authenticated principal carried through a single request.

use memoria_core::{ResourceId, Role};

/// The user an incoming request has been authenticated as, plus the key
/// it authenticated with. Built once by the [`crate::auth`] interceptor
/// and threaded through as a request-scoped value — never a global —
/// so two concurrent requests from different users never share state.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: ResourceId,
    pub roles: Vec<Role>,
    /// The API key used to authenticate this request, so handlers can
    /// bind pagination tokens to it (spec §4.10) and bump `lastUsedAt`.
    pub api_key_id: ResourceId,
}

impl AuthenticatedUser {
    #[must_use]
    pub fn new(user_id: ResourceId, roles: Vec<Role>, api_key_id: ResourceId) -> Self {
        Self {
            user_id,
            roles,
            api_key_id,
        }
    }

    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.has_role(Role::Root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_role_membership() {
        let user = AuthenticatedUser::new(
            ResourceId::new_random(),
            vec![Role::User],
            ResourceId::new_random(),
        );
        assert!(user.has_role(Role::User));
        assert!(!user.is_root());
    }
}
