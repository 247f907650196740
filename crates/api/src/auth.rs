// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Actor identity for authorization decisions.
//!
//! Real credential handling (sessions, tokens, identity providers) lives
//! outside this system. The boundary here is an already-identified staff
//! member plus their resolved role.

use crate::error::ApiError;
use rota_audit::Actor;
use rota_domain::{RoleDefinition, UserId};
use rota_persistence::SqlitePersistence;

/// An authenticated actor: an identified staff member with their role
/// resolved for the duration of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The acting staff member.
    pub user_id: UserId,
    /// The role governing this actor's permissions, resolved once.
    pub role: RoleDefinition,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The acting staff member
    /// * `role` - The resolved role definition
    #[must_use]
    pub const fn new(user_id: UserId, role: RoleDefinition) -> Self {
        Self { user_id, role }
    }

    /// Converts this authenticated actor into an audit Actor.
    ///
    /// This is used when recording audit events to attribute actions to the
    /// acting staff member.
    #[must_use]
    pub fn to_audit_actor(&self) -> Actor {
        Actor::new(format!("user-{}", self.user_id), self.role.name.to_lowercase())
    }
}

/// Stub authentication function.
///
/// This is a minimal placeholder: it trusts the supplied member ID and
/// resolves the member's role. In a real deployment this would validate
/// credentials or integrate with an identity provider.
///
/// # Arguments
///
/// * `persistence` - The persistence layer to resolve the role from
/// * `user_id` - The identifier of the actor to authenticate
///
/// # Returns
///
/// An authenticated actor if the member exists.
///
/// # Errors
///
/// Returns an error if the member or their role cannot be resolved.
pub fn authenticate_stub(
    persistence: &mut SqlitePersistence,
    user_id: UserId,
) -> Result<AuthenticatedActor, ApiError> {
    let role: RoleDefinition =
        persistence
            .role_for_member(user_id)
            .map_err(|e| ApiError::AuthenticationFailed {
                reason: format!("Could not resolve role for user {user_id}: {e}"),
            })?;
    Ok(AuthenticatedActor::new(user_id, role))
}
