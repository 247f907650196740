// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request and response types for the API boundary.
//!
//! Dates travel as ISO 8601 calendar dates (`2025-07-10`) and timestamps as
//! ISO 8601 date-times without offset (`2025-07-10T09:00:00`); the handlers
//! parse and validate them before anything reaches the rule functions.

use serde::{Deserialize, Serialize};

/// API request to register a single shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterShiftRequest {
    /// The staff member the shift is for.
    pub user_id: i64,
    /// The shift date.
    pub date: String,
    /// Scheduled start time of day (`09:00:00`).
    pub start_time: String,
    /// Scheduled end time of day (`17:00:00`).
    pub end_time: String,
    /// Unpaid break minutes.
    pub break_minutes: u16,
    /// `REGULAR` or `SPOT`.
    pub shift_type: String,
    /// Work location; defaults to the member's default location.
    pub location: Option<String>,
}

/// API response for a successful shift registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterShiftResponse {
    /// The staff member the shift is for.
    pub user_id: i64,
    /// The shift date.
    pub date: String,
    /// A success message.
    pub message: String,
}

/// API request to register many shifts at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterShiftsBatchRequest {
    /// The shifts to register.
    pub entries: Vec<RegisterShiftRequest>,
}

/// Outcome of one entry in a batch mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEntryOutcome {
    /// Index of the entry in the request.
    pub index: usize,
    /// The staff member the entry targeted.
    pub user_id: i64,
    /// The date the entry targeted.
    pub date: String,
    /// Whether the entry succeeded.
    pub ok: bool,
    /// The failure message for rejected entries.
    pub message: Option<String>,
}

/// API response for a batch registration: per-entry outcomes plus counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterShiftsBatchResponse {
    /// One outcome per request entry, in request order.
    pub outcomes: Vec<BatchEntryOutcome>,
    /// How many entries succeeded.
    pub succeeded: usize,
    /// How many entries failed.
    pub failed: usize,
}

/// API request to update the shift on a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateShiftRequest {
    /// The staff member the shift is for.
    pub user_id: i64,
    /// The shift date.
    pub date: String,
    /// Scheduled start time of day.
    pub start_time: String,
    /// Scheduled end time of day.
    pub end_time: String,
    /// Unpaid break minutes.
    pub break_minutes: u16,
    /// `REGULAR` or `SPOT`.
    pub shift_type: String,
    /// Work location; defaults to the member's default location.
    pub location: Option<String>,
}

/// API response for a successful shift update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateShiftResponse {
    /// The staff member the shift is for.
    pub user_id: i64,
    /// The shift date.
    pub date: String,
    /// A success message.
    pub message: String,
}

/// API request to delete the shift on a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteShiftRequest {
    /// The staff member holding the shift.
    pub user_id: i64,
    /// The date to clear.
    pub date: String,
}

/// API response for a successful shift deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteShiftResponse {
    /// The staff member the shift was for.
    pub user_id: i64,
    /// The cleared date.
    pub date: String,
    /// A success message.
    pub message: String,
}

/// API request to record an attendance punch.
///
/// Staff punch for themselves; recording for another member requires the
/// force-clock capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPunchRequest {
    /// The staff member the punch is for.
    pub user_id: i64,
    /// The logical date of the punch.
    pub date: String,
    /// `WAKE_UP`, `DEPARTURE`, `CLOCK_IN` or `CLOCK_OUT`.
    pub kind: String,
    /// When the punch happened; defaults to the current instant.
    pub recorded_at: Option<String>,
}

/// API response for a recorded punch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPunchResponse {
    /// The staff member the punch is for.
    pub user_id: i64,
    /// The logical date of the punch.
    pub date: String,
    /// The punch kind.
    pub kind: String,
    /// The recorded timestamp.
    pub recorded_at: String,
    /// A success message.
    pub message: String,
}

/// API request to amend a recorded punch timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectPunchRequest {
    /// The staff member whose punch is amended.
    pub user_id: i64,
    /// The date of the punch.
    pub date: String,
    /// The punch kind.
    pub kind: String,
    /// The corrected timestamp.
    pub new_recorded_at: String,
}

/// API response for a punch correction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectPunchResponse {
    /// The staff member whose punch was amended.
    pub user_id: i64,
    /// The date of the punch.
    pub date: String,
    /// The punch kind.
    pub kind: String,
    /// The timestamp before the amendment.
    pub old_recorded_at: String,
    /// The timestamp after the amendment.
    pub new_recorded_at: String,
    /// A success message.
    pub message: String,
}

/// API request to grant a one-hour registration unlock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantUnlockRequest {
    /// The staff member to unlock.
    pub user_id: i64,
    /// Calendar year of the month to unlock.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: u8,
}

/// API response for an unlock grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantUnlockResponse {
    /// The unlocked staff member.
    pub user_id: i64,
    /// Calendar year of the unlocked month.
    pub year: i32,
    /// Calendar month.
    pub month: u8,
    /// When the unlock was granted.
    pub unlocked_at: String,
    /// A success message.
    pub message: String,
}

/// API request to change the registration deadline day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetDeadlineDayRequest {
    /// The new day-of-month, between 1 and 31.
    pub day: u8,
}

/// API response for a deadline day change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetDeadlineDayResponse {
    /// The new day-of-month.
    pub day: u8,
    /// A success message.
    pub message: String,
}

/// A shift as rendered in monthly views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftView {
    /// Canonical shift identifier.
    pub shift_id: Option<i64>,
    /// The shift date.
    pub date: String,
    /// Scheduled start.
    pub start_time: String,
    /// Scheduled end.
    pub end_time: String,
    /// Unpaid break minutes.
    pub break_minutes: u16,
    /// `REGULAR` or `SPOT`.
    pub shift_type: String,
    /// Work location.
    pub location: String,
    /// Approval status.
    pub status: String,
}

/// One reconciled day in a monthly view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayView {
    /// The civil date.
    pub date: String,
    /// The approved shift, if any.
    pub shift: Option<ShiftView>,
    /// Wake-up report timestamp.
    pub wake_up: Option<String>,
    /// Departure report timestamp.
    pub departure: Option<String>,
    /// Clock-in timestamp.
    pub clock_in: Option<String>,
    /// Clock-out timestamp.
    pub clock_out: Option<String>,
    /// Minutes worked net of break, once both clock punches exist.
    pub worked_minutes: Option<u32>,
    /// Whether the clock-in was late; absent when undefined.
    pub is_late: Option<bool>,
    /// Whether the day is judged absent.
    pub is_absent: bool,
}

/// Aggregate counters of a monthly view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalsView {
    /// Sum of worked minutes.
    pub worked_minutes: u32,
    /// Worked minutes rendered as `H:MM`.
    pub worked_text: String,
    /// Days with both clock punches.
    pub work_days: u32,
    /// Days judged late.
    pub late_count: u32,
    /// Days judged absent.
    pub absent_days: u32,
    /// Days carrying an approved shift.
    pub scheduled_days: u32,
}

/// API request for one member's reconciled month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyAttendanceRequest {
    /// The staff member to view.
    pub user_id: i64,
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: u8,
}

/// API response for one member's reconciled month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyAttendanceResponse {
    /// The staff member viewed.
    pub user_id: i64,
    /// Calendar year.
    pub year: i32,
    /// Calendar month.
    pub month: u8,
    /// One record per date, ascending.
    pub days: Vec<DayView>,
    /// Aggregate counters.
    pub totals: TotalsView,
    /// Data anomalies observed while reconciling.
    pub warnings: Vec<String>,
}

/// API request for the staff IDs an actor may reach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListAccessibleMembersRequest {
    /// Permission category key (e.g. `shiftManagement`).
    pub category: String,
    /// `view` or `edit`.
    pub kind: String,
}

/// API response listing accessible staff IDs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListAccessibleMembersResponse {
    /// The accessible staff IDs, sorted ascending. Falls back to the actor
    /// alone when their role grants no management scope.
    pub user_ids: Vec<i64>,
}
