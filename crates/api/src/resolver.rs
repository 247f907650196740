// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Record-level permission resolution with request-scoped memoization.
//!
//! Given a role's permission matrix and the actor's company/assignment
//! graph, the resolver decides access at four widening scopes — global,
//! company, assigned, self — and materializes the concrete set of
//! accessible staff IDs.
//!
//! ## Invariants
//!
//! - Resolution order is global, company, assigned, self; first grant wins
//! - An actor always reaches their own record, independent of the matrix
//! - A role with no scoped grant materializes an empty accessible set; the
//!   self-only fallback is the caller's responsibility
//! - The [`RequestScope`] cache lives for exactly one inbound request. It is
//!   never shared across requests and can be discarded at any time: it is an
//!   optimization, not a source of truth

use std::collections::HashMap;

use rota_domain::{
    AccessKind, AccessScope, CompanyId, PermissionAction, PermissionCategory, PermissionMatrix,
    UserId, resolve_access_scope,
};
use rota_persistence::{PersistenceError, SqlitePersistence};

/// Repository reads the resolver depends on.
///
/// The persistence layer implements this; tests substitute counting fakes.
pub trait Directory {
    /// Resolves the permission matrix governing a staff member.
    ///
    /// # Errors
    ///
    /// Returns an error if the member or their role cannot be resolved.
    fn matrix_for(&mut self, user_id: UserId) -> Result<PermissionMatrix, PersistenceError>;

    /// Resolves a member's company (`None` = internal staff).
    ///
    /// # Errors
    ///
    /// Returns an error if the member cannot be resolved.
    fn company_of(&mut self, user_id: UserId) -> Result<Option<CompanyId>, PersistenceError>;

    /// Resolves the managers a member lists.
    ///
    /// # Errors
    ///
    /// Returns an error if the member cannot be resolved.
    fn manager_ids_of(&mut self, user_id: UserId) -> Result<Vec<UserId>, PersistenceError>;

    /// Lists the members of a company (`None` = internal staff).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn users_in_company(
        &mut self,
        company_id: Option<CompanyId>,
    ) -> Result<Vec<UserId>, PersistenceError>;

    /// Lists the members assigned to a manager.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn assigned_user_ids(&mut self, manager_id: UserId) -> Result<Vec<UserId>, PersistenceError>;

    /// Lists every member ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn all_user_ids(&mut self) -> Result<Vec<UserId>, PersistenceError>;
}

impl Directory for SqlitePersistence {
    fn matrix_for(&mut self, user_id: UserId) -> Result<PermissionMatrix, PersistenceError> {
        Ok(self.role_for_member(user_id)?.matrix)
    }

    fn company_of(&mut self, user_id: UserId) -> Result<Option<CompanyId>, PersistenceError> {
        self.member(user_id)?
            .map(|m| m.company_id)
            .ok_or_else(|| PersistenceError::NotFound(format!("Staff member {user_id}")))
    }

    fn manager_ids_of(&mut self, user_id: UserId) -> Result<Vec<UserId>, PersistenceError> {
        self.member(user_id)?
            .map(|m| m.manager_ids)
            .ok_or_else(|| PersistenceError::NotFound(format!("Staff member {user_id}")))
    }

    fn users_in_company(
        &mut self,
        company_id: Option<CompanyId>,
    ) -> Result<Vec<UserId>, PersistenceError> {
        Self::users_in_company(self, company_id)
    }

    fn assigned_user_ids(&mut self, manager_id: UserId) -> Result<Vec<UserId>, PersistenceError> {
        Self::assigned_user_ids(self, manager_id)
    }

    fn all_user_ids(&mut self) -> Result<Vec<UserId>, PersistenceError> {
        Self::all_user_ids(self)
    }
}

/// Request-scoped memoization over a [`Directory`].
///
/// Constructed once per inbound request and discarded at its end. Repository
/// reads and capability decisions are cached for the request's lifetime so a
/// batch touching the same actor and graph pays for each lookup once.
pub struct RequestScope<'a> {
    directory: &'a mut dyn Directory,
    matrices: HashMap<UserId, PermissionMatrix>,
    companies: HashMap<UserId, Option<CompanyId>>,
    managers: HashMap<UserId, Vec<UserId>>,
    company_rosters: HashMap<Option<CompanyId>, Vec<UserId>>,
    assigned: HashMap<UserId, Vec<UserId>>,
    all_users: Option<Vec<UserId>>,
    capability_decisions: HashMap<(UserId, PermissionCategory, PermissionAction), bool>,
}

impl<'a> RequestScope<'a> {
    /// Creates a fresh scope over a directory for one request.
    pub fn new(directory: &'a mut dyn Directory) -> Self {
        Self {
            directory,
            matrices: HashMap::new(),
            companies: HashMap::new(),
            managers: HashMap::new(),
            company_rosters: HashMap::new(),
            assigned: HashMap::new(),
            all_users: None,
            capability_decisions: HashMap::new(),
        }
    }

    /// Resolves (and caches) the matrix governing a member.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory read fails.
    pub fn matrix_for(&mut self, user_id: UserId) -> Result<PermissionMatrix, PersistenceError> {
        if let Some(matrix) = self.matrices.get(&user_id) {
            return Ok(matrix.clone());
        }
        let matrix: PermissionMatrix = self.directory.matrix_for(user_id)?;
        self.matrices.insert(user_id, matrix.clone());
        Ok(matrix)
    }

    /// Resolves (and caches) a member's company.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory read fails.
    pub fn company_of(&mut self, user_id: UserId) -> Result<Option<CompanyId>, PersistenceError> {
        if let Some(company) = self.companies.get(&user_id) {
            return Ok(*company);
        }
        let company: Option<CompanyId> = self.directory.company_of(user_id)?;
        self.companies.insert(user_id, company);
        Ok(company)
    }

    /// Resolves (and caches) the managers a member lists.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory read fails.
    pub fn manager_ids_of(&mut self, user_id: UserId) -> Result<Vec<UserId>, PersistenceError> {
        if let Some(managers) = self.managers.get(&user_id) {
            return Ok(managers.clone());
        }
        let managers: Vec<UserId> = self.directory.manager_ids_of(user_id)?;
        self.managers.insert(user_id, managers.clone());
        Ok(managers)
    }

    fn company_roster(
        &mut self,
        company_id: Option<CompanyId>,
    ) -> Result<Vec<UserId>, PersistenceError> {
        if let Some(roster) = self.company_rosters.get(&company_id) {
            return Ok(roster.clone());
        }
        let roster: Vec<UserId> = self.directory.users_in_company(company_id)?;
        self.company_rosters.insert(company_id, roster.clone());
        Ok(roster)
    }

    fn assigned_to(&mut self, manager_id: UserId) -> Result<Vec<UserId>, PersistenceError> {
        if let Some(assigned) = self.assigned.get(&manager_id) {
            return Ok(assigned.clone());
        }
        let assigned: Vec<UserId> = self.directory.assigned_user_ids(manager_id)?;
        self.assigned.insert(manager_id, assigned.clone());
        Ok(assigned)
    }

    fn all_users(&mut self) -> Result<Vec<UserId>, PersistenceError> {
        if let Some(all) = &self.all_users {
            return Ok(all.clone());
        }
        let all: Vec<UserId> = self.directory.all_user_ids()?;
        self.all_users = Some(all.clone());
        Ok(all)
    }

    /// Checks one matrix cell for an actor, memoized by
    /// `(actor, category, action)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory read fails.
    pub fn has_capability(
        &mut self,
        actor: UserId,
        category: PermissionCategory,
        action: PermissionAction,
    ) -> Result<bool, PersistenceError> {
        let key = (actor, category, action);
        if let Some(decision) = self.capability_decisions.get(&key) {
            return Ok(*decision);
        }
        let granted: bool = self.matrix_for(actor)?.is_granted(category, action);
        self.capability_decisions.insert(key, granted);
        Ok(granted)
    }

    /// Resolves the widest scope the actor's matrix grants for a category
    /// and access kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory read fails.
    pub fn access_scope(
        &mut self,
        actor: UserId,
        category: PermissionCategory,
        kind: AccessKind,
    ) -> Result<AccessScope, PersistenceError> {
        let matrix: PermissionMatrix = self.matrix_for(actor)?;
        Ok(resolve_access_scope(&matrix, category, kind))
    }

    /// Decides whether the actor may act on the target's records.
    ///
    /// Resolution order: global grant, company grant (shared `company_id`,
    /// both internal counts as shared), assigned grant (actor listed among
    /// the target's managers), then implicit self access.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory read fails.
    pub fn can_act_on(
        &mut self,
        actor: UserId,
        target: UserId,
        category: PermissionCategory,
        kind: AccessKind,
    ) -> Result<bool, PersistenceError> {
        match self.access_scope(actor, category, kind)? {
            AccessScope::Global => return Ok(true),
            AccessScope::Company => {
                if self.company_of(actor)? == self.company_of(target)? {
                    return Ok(true);
                }
            }
            AccessScope::Assigned => {
                if self.manager_ids_of(target)?.contains(&actor) {
                    return Ok(true);
                }
            }
            AccessScope::SelfOnly => {}
        }
        // An actor always reaches their own record.
        Ok(actor == target)
    }

    /// Materializes the set of staff IDs the actor may reach for a category
    /// and access kind, sorted and deduplicated.
    ///
    /// A role with no scoped grant yields an empty set; callers fall back to
    /// self-only visibility themselves.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory read fails.
    pub fn accessible_user_ids(
        &mut self,
        actor: UserId,
        category: PermissionCategory,
        kind: AccessKind,
    ) -> Result<Vec<UserId>, PersistenceError> {
        let mut ids: Vec<UserId> = match self.access_scope(actor, category, kind)? {
            AccessScope::Global => self.all_users()?,
            AccessScope::Company => {
                let company: Option<CompanyId> = self.company_of(actor)?;
                self.company_roster(company)?
            }
            AccessScope::Assigned => self.assigned_to(actor)?,
            AccessScope::SelfOnly => Vec::new(),
        };
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }
}
