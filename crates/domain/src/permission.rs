// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Role permission matrix and pure access-scope resolution.
//!
//! A role carries a closed category × action grid of booleans. The grid is
//! loaded from a JSON document and validated eagerly: an unknown category or
//! action name fails at load time instead of silently resolving to `false`
//! deep inside request handling.
//!
//! ## Invariants
//!
//! - Categories and actions are closed enums; no dynamic capability names
//! - Matrix booleans are independent; scope precedence is encoded in
//!   [`resolve_access_scope`], not in the grid itself
//! - Scope resolution is a pure function of the matrix

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A permission category groups the actions of one management area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PermissionCategory {
    /// Shift registration and editing.
    ShiftManagement,
    /// Attendance punches, force clocking, and corrections.
    AttendanceManagement,
    /// Staff directory visibility.
    MemberManagement,
    /// Global settings and registration unlocks.
    SystemAdministration,
}

impl PermissionCategory {
    /// Parses a category from its matrix document key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key does not name a known category.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "shiftManagement" => Ok(Self::ShiftManagement),
            "attendanceManagement" => Ok(Self::AttendanceManagement),
            "memberManagement" => Ok(Self::MemberManagement),
            "systemAdministration" => Ok(Self::SystemAdministration),
            _ => Err(DomainError::UnknownPermissionCategory(s.to_string())),
        }
    }

    /// Returns the matrix document key for this category.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ShiftManagement => "shiftManagement",
            Self::AttendanceManagement => "attendanceManagement",
            Self::MemberManagement => "memberManagement",
            Self::SystemAdministration => "systemAdministration",
        }
    }
}

/// A single boolean flag within a permission category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PermissionAction {
    /// View every staff member's records.
    ViewAll,
    /// View records of staff sharing the actor's company.
    ViewCompany,
    /// View records of staff assigned to the actor.
    ViewAssigned,
    /// Edit every staff member's records.
    EditAll,
    /// Edit records of staff sharing the actor's company.
    EditCompany,
    /// Edit records of staff assigned to the actor.
    EditAssigned,
    /// Delete records within the granted edit scope.
    Delete,
    /// Register shifts regardless of the registration window.
    ForceRegister,
    /// Record punches on behalf of another staff member.
    ForceClock,
    /// Amend a recorded punch timestamp.
    CorrectPunch,
    /// Grant a time-boxed registration unlock.
    Unlock,
    /// Change the global settings record.
    ManageSettings,
}

impl PermissionAction {
    /// Parses an action from its matrix document key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key does not name a known action.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "viewAll" => Ok(Self::ViewAll),
            "viewCompany" => Ok(Self::ViewCompany),
            "viewAssigned" => Ok(Self::ViewAssigned),
            "editAll" => Ok(Self::EditAll),
            "editCompany" => Ok(Self::EditCompany),
            "editAssigned" => Ok(Self::EditAssigned),
            "delete" => Ok(Self::Delete),
            "forceRegister" => Ok(Self::ForceRegister),
            "forceClock" => Ok(Self::ForceClock),
            "correctPunch" => Ok(Self::CorrectPunch),
            "unlock" => Ok(Self::Unlock),
            "manageSettings" => Ok(Self::ManageSettings),
            _ => Err(DomainError::UnknownPermissionAction(s.to_string())),
        }
    }

    /// Returns the matrix document key for this action.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ViewAll => "viewAll",
            Self::ViewCompany => "viewCompany",
            Self::ViewAssigned => "viewAssigned",
            Self::EditAll => "editAll",
            Self::EditCompany => "editCompany",
            Self::EditAssigned => "editAssigned",
            Self::Delete => "delete",
            Self::ForceRegister => "forceRegister",
            Self::ForceClock => "forceClock",
            Self::CorrectPunch => "correctPunch",
            Self::Unlock => "unlock",
            Self::ManageSettings => "manageSettings",
        }
    }
}

/// Pages a role may open. Advisory for the UI layer; never consulted by the
/// record-level access checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PageAccess {
    /// The monthly shift calendar.
    ShiftCalendar,
    /// The monthly attendance view.
    AttendanceSheet,
    /// The staff directory.
    MemberDirectory,
    /// The administration console.
    AdminConsole,
}

impl PageAccess {
    /// Parses a page access entry from its document key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key does not name a known page.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "shiftCalendar" => Ok(Self::ShiftCalendar),
            "attendanceSheet" => Ok(Self::AttendanceSheet),
            "memberDirectory" => Ok(Self::MemberDirectory),
            "adminConsole" => Ok(Self::AdminConsole),
            _ => Err(DomainError::UnknownPageAccess(s.to_string())),
        }
    }

    /// Returns the document key for this page.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ShiftCalendar => "shiftCalendar",
            Self::AttendanceSheet => "attendanceSheet",
            Self::MemberDirectory => "memberDirectory",
            Self::AdminConsole => "adminConsole",
        }
    }
}

/// The validated category × action grid of one role version.
///
/// Immutable once loaded. Only granted (true) cells are stored; absent cells
/// read as denied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PermissionMatrix {
    granted: BTreeSet<(PermissionCategory, PermissionAction)>,
}

impl PermissionMatrix {
    /// Creates an empty matrix with every cell denied.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            granted: BTreeSet::new(),
        }
    }

    /// Creates a matrix from explicit grants. Test and seeding convenience.
    #[must_use]
    pub fn from_grants(grants: &[(PermissionCategory, PermissionAction)]) -> Self {
        Self {
            granted: grants.iter().copied().collect(),
        }
    }

    /// Loads a matrix from its JSON document.
    ///
    /// The document maps category keys to objects of action keys and boolean
    /// values, e.g. `{"shiftManagement": {"viewAll": true}}`. Unknown
    /// category or action names and non-boolean values fail fast.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not an object of objects, if any
    /// key is unknown, or if any value is not a boolean.
    pub fn from_json(doc: &serde_json::Value) -> Result<Self, DomainError> {
        let root = doc
            .as_object()
            .ok_or_else(|| DomainError::InvalidPermissionMatrix {
                reason: String::from("Document root must be an object"),
            })?;

        let mut granted: BTreeSet<(PermissionCategory, PermissionAction)> = BTreeSet::new();

        for (category_key, actions) in root {
            let category: PermissionCategory = PermissionCategory::parse(category_key)?;
            let entries =
                actions
                    .as_object()
                    .ok_or_else(|| DomainError::InvalidPermissionMatrix {
                        reason: format!("Category '{category_key}' must map to an object"),
                    })?;

            for (action_key, value) in entries {
                let action: PermissionAction = PermissionAction::parse(action_key)?;
                let flag: bool =
                    value
                        .as_bool()
                        .ok_or_else(|| DomainError::InvalidPermissionMatrix {
                            reason: format!(
                                "Value for '{category_key}.{action_key}' must be a boolean"
                            ),
                        })?;
                if flag {
                    granted.insert((category, action));
                }
            }
        }

        Ok(Self { granted })
    }

    /// Loads a matrix from a JSON document string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid JSON or the document is
    /// invalid per [`Self::from_json`].
    pub fn from_json_str(s: &str) -> Result<Self, DomainError> {
        let doc: serde_json::Value =
            serde_json::from_str(s).map_err(|e| DomainError::InvalidPermissionMatrix {
                reason: format!("Malformed JSON: {e}"),
            })?;
        Self::from_json(&doc)
    }

    /// Returns whether the given cell is granted.
    #[must_use]
    pub fn is_granted(&self, category: PermissionCategory, action: PermissionAction) -> bool {
        self.granted.contains(&(category, action))
    }
}

/// Parses a page access list from its JSON document (an array of page keys).
///
/// # Errors
///
/// Returns an error if the document is not an array of strings or any entry
/// names an unknown page.
pub fn page_access_from_json(doc: &serde_json::Value) -> Result<Vec<PageAccess>, DomainError> {
    let entries = doc
        .as_array()
        .ok_or_else(|| DomainError::InvalidPermissionMatrix {
            reason: String::from("Page access document must be an array"),
        })?;

    let mut pages: Vec<PageAccess> = Vec::with_capacity(entries.len());
    for entry in entries {
        let key = entry
            .as_str()
            .ok_or_else(|| DomainError::InvalidPermissionMatrix {
                reason: String::from("Page access entries must be strings"),
            })?;
        pages.push(PageAccess::parse(key)?);
    }
    Ok(pages)
}

/// One immutable role version: a named matrix plus page access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDefinition {
    /// Canonical identifier assigned by the database.
    pub role_id: i64,
    /// Display name (e.g. "Administrator", "Staff").
    pub name: String,
    /// The validated permission grid.
    pub matrix: PermissionMatrix,
    /// Pages this role may open.
    pub page_access: Vec<PageAccess>,
}

/// The two record-level access kinds a scoped check can ask about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AccessKind {
    /// Read access to records.
    View,
    /// Write access to records.
    Edit,
}

impl AccessKind {
    /// The scoped actions for this kind, widest first.
    ///
    /// The order encodes business precedence: a global grant wins over a
    /// company grant, which wins over an assigned grant.
    #[must_use]
    pub const fn scoped_actions(self) -> [PermissionAction; 3] {
        match self {
            Self::View => [
                PermissionAction::ViewAll,
                PermissionAction::ViewCompany,
                PermissionAction::ViewAssigned,
            ],
            Self::Edit => [
                PermissionAction::EditAll,
                PermissionAction::EditCompany,
                PermissionAction::EditAssigned,
            ],
        }
    }
}

/// The widening scopes at which access can be granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessScope {
    /// Every staff member.
    Global,
    /// Staff sharing the actor's company (both internal counts as sharing).
    Company,
    /// Staff who list the actor among their managers.
    Assigned,
    /// No management grant; an actor always reaches their own record.
    SelfOnly,
}

/// Resolves the widest scope a matrix grants for a category and access kind.
///
/// First granted flag wins, checked widest first (global, company, assigned).
/// A matrix with none of the scoped flags resolves to [`AccessScope::SelfOnly`];
/// self-access itself is implicit and never encoded in the grid.
#[must_use]
pub fn resolve_access_scope(
    matrix: &PermissionMatrix,
    category: PermissionCategory,
    kind: AccessKind,
) -> AccessScope {
    let [all, company, assigned] = kind.scoped_actions();
    if matrix.is_granted(category, all) {
        AccessScope::Global
    } else if matrix.is_granted(category, company) {
        AccessScope::Company
    } else if matrix.is_granted(category, assigned) {
        AccessScope::Assigned
    } else {
        AccessScope::SelfOnly
    }
}
