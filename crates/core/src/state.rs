// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use rota_audit::{AuditEvent, PunchCorrection, RosterScope, StateSnapshot};
use rota_domain::{
    AttendanceEvent, PunchKind, RegistrationLock, Shift, StaffMember, SystemSettings, UserId,
};
use time::{Date, Month};

/// Roster metadata: the provisioned staff directory and the settings record.
///
/// This is separate from the scoped `State` and represents global system
/// context resolved once per request. The transition engine reads it for
/// validation and never mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterMetadata {
    /// All provisioned staff members.
    pub members: Vec<StaffMember>,
    /// The current settings record.
    pub settings: SystemSettings,
}

impl RosterMetadata {
    /// Creates metadata from a member directory and settings.
    #[must_use]
    pub const fn new(members: Vec<StaffMember>, settings: SystemSettings) -> Self {
        Self { members, settings }
    }

    /// Looks up a staff member by ID.
    #[must_use]
    pub fn member(&self, user_id: UserId) -> Option<&StaffMember> {
        self.members.iter().find(|m| m.user_id == user_id)
    }

    /// Checks if a staff member exists.
    #[must_use]
    pub fn has_member(&self, user_id: UserId) -> bool {
        self.member(user_id).is_some()
    }
}

/// The complete roster state scoped to one staff member's calendar month.
///
/// Scoping state to `(user_id, year, month)` keeps transitions small and
/// enables per-member persistence and audit scoping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    /// The staff member this state is scoped to.
    pub user_id: UserId,
    /// Calendar year of the scoped month.
    pub year: i32,
    /// Calendar month.
    pub month: Month,
    /// All shifts registered in this month.
    pub shifts: Vec<Shift>,
    /// All attendance punches recorded in this month.
    pub events: Vec<AttendanceEvent>,
}

impl State {
    /// Creates a new empty state for a member's month.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The staff member this state is scoped to
    /// * `year` - Calendar year
    /// * `month` - Calendar month
    #[must_use]
    pub const fn new(user_id: UserId, year: i32, month: Month) -> Self {
        Self {
            user_id,
            year,
            month,
            shifts: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Returns the audit scope of this state.
    #[must_use]
    pub const fn scope(&self) -> RosterScope {
        RosterScope::new(self.user_id, self.year, self.month)
    }

    /// Checks whether a date falls inside this state's month.
    #[must_use]
    pub fn contains_date(&self, date: Date) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Looks up the shift on a date, if one exists.
    #[must_use]
    pub fn shift_on(&self, date: Date) -> Option<&Shift> {
        self.shifts.iter().find(|s| s.date == date)
    }

    /// Looks up the punch of a kind on a date, if one exists.
    #[must_use]
    pub fn punch_on(&self, date: Date, kind: PunchKind) -> Option<&AttendanceEvent> {
        self.events
            .iter()
            .find(|e| e.date == date && e.kind == kind)
    }

    /// Checks whether any punch exists on a date.
    #[must_use]
    pub fn has_attendance_on(&self, date: Date) -> bool {
        self.events.iter().any(|e| e.date == date)
    }

    /// Converts the state to a snapshot for audit purposes.
    #[must_use]
    pub fn to_snapshot(&self) -> StateSnapshot {
        StateSnapshot::new(format!(
            "user={},year={},month={},shifts_count={},punches_count={}",
            self.user_id,
            self.year,
            u8::from(self.month),
            self.shifts.len(),
            self.events.len()
        ))
    }
}

/// The result of a successful state transition.
///
/// Transitions are atomic: they either succeed completely or fail without
/// side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The new state after the transition.
    pub new_state: State,
    /// The audit event recording this transition.
    pub audit_event: AuditEvent,
    /// The correction trail record for punch amendments.
    pub correction: Option<PunchCorrection>,
}

/// The result of an administrative operation.
///
/// Administrative operations modify the lock ledger or settings, not scoped
/// month state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminResult {
    /// The lock record to upsert, for unlock grants.
    pub new_lock: Option<RegistrationLock>,
    /// The settings record to store, for settings changes.
    pub new_settings: Option<SystemSettings>,
    /// The audit event recording this operation.
    pub audit_event: AuditEvent,
}
