// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod civil;
mod error;
mod permission;
mod reconcile;
mod registration_window;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use civil::{civil_from_unix, civil_now};
pub use error::DomainError;
pub use permission::{
    AccessKind, AccessScope, PageAccess, PermissionAction, PermissionCategory, PermissionMatrix,
    RoleDefinition, page_access_from_json, resolve_access_scope,
};
pub use reconcile::{
    AttendanceTotals, ReconcileWarning, ReconciledDay, ReconciledRange, format_minutes, reconcile,
};
pub use registration_window::{
    RegistrationDenial, WindowDecision, evaluate_registration_window,
};

// Re-export public types
pub use types::{
    AttendanceEvent, CompanyId, DEFAULT_BREAK_MINUTES, PunchKind, RegistrationLock, Shift,
    ShiftStatus, ShiftType, StaffMember, SystemSettings, UserId, month_from_number,
};
pub use validation::{validate_deadline_day, validate_member_name, validate_shift};
