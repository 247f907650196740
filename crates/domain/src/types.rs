// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use time::{Date, Month, PrimitiveDateTime};

/// Canonical staff member identifier assigned by the database.
pub type UserId = i64;

/// Canonical company identifier. Staff with no company are internal.
pub type CompanyId = i64;

/// Break deducted from worked time when a shift carries no explicit value.
pub const DEFAULT_BREAK_MINUTES: u16 = 60;

/// Classification of a planned work interval.
///
/// Shift types are fixed domain constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShiftType {
    /// A regular scheduled shift.
    #[serde(rename = "REGULAR")]
    Regular,
    /// A one-off spot shift.
    #[serde(rename = "SPOT")]
    Spot,
}

impl ShiftType {
    /// Parses a shift type from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string does not match a valid shift type.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "REGULAR" => Ok(Self::Regular),
            "SPOT" => Ok(Self::Spot),
            _ => Err(DomainError::InvalidShiftType(format!(
                "Unknown shift type: {s}"
            ))),
        }
    }

    /// Returns the string representation of this shift type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "REGULAR",
            Self::Spot => "SPOT",
        }
    }
}

/// Approval status of a shift.
///
/// Registration currently auto-approves: every persisted shift is `Approved`.
/// The pending/rejected states exist for the approval pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShiftStatus {
    /// Confirmed and counted by reconciliation.
    #[default]
    #[serde(rename = "APPROVED")]
    Approved,
    /// Awaiting approval.
    #[serde(rename = "PENDING")]
    Pending,
    /// Rejected by an approver.
    #[serde(rename = "REJECTED")]
    Rejected,
}

impl ShiftStatus {
    /// Parses a shift status from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string does not match a valid shift status.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "APPROVED" => Ok(Self::Approved),
            "PENDING" => Ok(Self::Pending),
            "REJECTED" => Ok(Self::Rejected),
            _ => Err(DomainError::InvalidShiftStatus(format!(
                "Unknown shift status: {s}"
            ))),
        }
    }

    /// Returns the string representation of this shift status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "APPROVED",
            Self::Pending => "PENDING",
            Self::Rejected => "REJECTED",
        }
    }
}

/// A planned work interval for one staff member on one date.
///
/// At most one shift exists per (`user_id`, `date`). Start and end times are
/// civil date-times on the shift date; day boundaries are midnight-to-midnight
/// in the declared timezone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    /// Canonical identifier assigned by the database.
    /// `None` indicates the shift has not been persisted yet.
    pub shift_id: Option<i64>,
    /// The staff member working this shift.
    pub user_id: UserId,
    /// The civil date this shift belongs to.
    pub date: Date,
    /// Scheduled start, on the shift date.
    pub start_time: PrimitiveDateTime,
    /// Scheduled end, on the shift date.
    pub end_time: PrimitiveDateTime,
    /// Unpaid break deducted from worked time.
    pub break_minutes: u16,
    /// Regular or spot classification.
    pub shift_type: ShiftType,
    /// Work location label.
    pub location: String,
    /// Approval status.
    pub status: ShiftStatus,
}

impl Shift {
    /// Creates a new `Shift` without a persisted ID.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The staff member working this shift
    /// * `date` - The civil date
    /// * `start_time` - Scheduled start on that date
    /// * `end_time` - Scheduled end on that date
    /// * `break_minutes` - Unpaid break minutes
    /// * `shift_type` - Regular or spot
    /// * `location` - Work location label
    #[must_use]
    pub const fn new(
        user_id: UserId,
        date: Date,
        start_time: PrimitiveDateTime,
        end_time: PrimitiveDateTime,
        break_minutes: u16,
        shift_type: ShiftType,
        location: String,
    ) -> Self {
        Self {
            shift_id: None,
            user_id,
            date,
            start_time,
            end_time,
            break_minutes,
            shift_type,
            location,
            status: ShiftStatus::Approved,
        }
    }

    /// Creates a `Shift` with an existing persisted ID.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub const fn with_id(
        shift_id: i64,
        user_id: UserId,
        date: Date,
        start_time: PrimitiveDateTime,
        end_time: PrimitiveDateTime,
        break_minutes: u16,
        shift_type: ShiftType,
        location: String,
        status: ShiftStatus,
    ) -> Self {
        Self {
            shift_id: Some(shift_id),
            user_id,
            date,
            start_time,
            end_time,
            break_minutes,
            shift_type,
            location,
            status,
        }
    }

    /// Scheduled length of this shift in minutes, before break deduction.
    #[must_use]
    pub fn scheduled_minutes(&self) -> i64 {
        (self.end_time - self.start_time).whole_minutes()
    }
}

/// A single timestamped attendance punch of one kind.
///
/// Punch kinds are fixed domain constants. At most one event of each kind
/// exists per (`user_id`, `date`); corrections amend `recorded_at` in place
/// rather than inserting duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PunchKind {
    /// Morning wake-up report, opt-in per staff member.
    #[serde(rename = "WAKE_UP")]
    WakeUp,
    /// Departure-for-work report, opt-in per staff member.
    #[serde(rename = "DEPARTURE")]
    Departure,
    /// Start-of-work clock-in.
    #[serde(rename = "CLOCK_IN")]
    ClockIn,
    /// End-of-work clock-out.
    #[serde(rename = "CLOCK_OUT")]
    ClockOut,
}

impl PunchKind {
    /// All punch kinds, in the order they occur across a working day.
    pub const ALL: [Self; 4] = [Self::WakeUp, Self::Departure, Self::ClockIn, Self::ClockOut];

    /// Parses a punch kind from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string does not match a valid punch kind.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "WAKE_UP" => Ok(Self::WakeUp),
            "DEPARTURE" => Ok(Self::Departure),
            "CLOCK_IN" => Ok(Self::ClockIn),
            "CLOCK_OUT" => Ok(Self::ClockOut),
            _ => Err(DomainError::InvalidPunchKind(format!(
                "Unknown punch kind: {s}"
            ))),
        }
    }

    /// Returns the string representation of this punch kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::WakeUp => "WAKE_UP",
            Self::Departure => "DEPARTURE",
            Self::ClockIn => "CLOCK_IN",
            Self::ClockOut => "CLOCK_OUT",
        }
    }
}

/// One recorded attendance punch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEvent {
    /// Canonical identifier assigned by the database.
    /// `None` indicates the event has not been persisted yet.
    pub event_id: Option<i64>,
    /// The staff member who punched.
    pub user_id: UserId,
    /// The logical civil date this punch belongs to.
    pub date: Date,
    /// The kind of punch.
    pub kind: PunchKind,
    /// When the punch was recorded, in civil time.
    pub recorded_at: PrimitiveDateTime,
}

impl AttendanceEvent {
    /// Creates a new `AttendanceEvent` without a persisted ID.
    #[must_use]
    pub const fn new(
        user_id: UserId,
        date: Date,
        kind: PunchKind,
        recorded_at: PrimitiveDateTime,
    ) -> Self {
        Self {
            event_id: None,
            user_id,
            date,
            kind,
            recorded_at,
        }
    }

    /// Creates an `AttendanceEvent` with an existing persisted ID.
    #[must_use]
    pub const fn with_id(
        event_id: i64,
        user_id: UserId,
        date: Date,
        kind: PunchKind,
        recorded_at: PrimitiveDateTime,
    ) -> Self {
        Self {
            event_id: Some(event_id),
            user_id,
            date,
            kind,
            recorded_at,
        }
    }
}

/// Per-user, per-month registration override record.
///
/// At most one record exists per (`user_id`, `year`, `month`). Created or
/// updated only by an administrator unlock grant or by the auto-relock write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationLock {
    /// The staff member this override applies to.
    pub user_id: UserId,
    /// Calendar year of the unlocked month.
    pub year: i32,
    /// Calendar month of the unlocked month.
    pub month: Month,
    /// Whether the override is currently active.
    pub is_unlocked: bool,
    /// When the override was granted. `None` when never unlocked.
    pub unlocked_at: Option<PrimitiveDateTime>,
}

impl RegistrationLock {
    /// Creates an active unlock granted at `unlocked_at`.
    #[must_use]
    pub const fn unlocked(
        user_id: UserId,
        year: i32,
        month: Month,
        unlocked_at: PrimitiveDateTime,
    ) -> Self {
        Self {
            user_id,
            year,
            month,
            is_unlocked: true,
            unlocked_at: Some(unlocked_at),
        }
    }
}

/// A staff member known to the roster.
///
/// Staff are provisioned by administration and referenced, never mutated, by
/// the scheduling and attendance rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffMember {
    /// Canonical internal identifier.
    pub user_id: UserId,
    /// Display name (informational, not unique).
    pub name: String,
    /// Employing company. `None` for internal staff.
    pub company_id: Option<CompanyId>,
    /// Managers granted assigned-scope access to this member.
    pub manager_ids: Vec<UserId>,
    /// The role governing this member's permissions.
    pub role_id: i64,
    /// Whether wake-up reports are collected for this member.
    pub wake_up_enabled: bool,
    /// Whether departure reports are collected for this member.
    pub departure_enabled: bool,
    /// Default work location for new shifts.
    pub default_location: String,
}

impl StaffMember {
    /// Returns whether this member records punches of the given kind.
    ///
    /// Clock-in and clock-out are always recorded; wake-up and departure
    /// reports are per-member opt-ins.
    #[must_use]
    pub const fn accepts_punch(&self, kind: PunchKind) -> bool {
        match kind {
            PunchKind::ClockIn | PunchKind::ClockOut => true,
            PunchKind::WakeUp => self.wake_up_enabled,
            PunchKind::Departure => self.departure_enabled,
        }
    }
}

/// The mutable global settings record.
///
/// Read-mostly. Lazily materialized with defaults on first access; callers
/// resolve it once per request and thread the values into the rule functions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemSettings {
    /// Day-of-month after which new-month registration closes.
    registration_deadline_day: u8,
    /// IANA name of the single civil timezone the system operates in.
    timezone: String,
}

impl SystemSettings {
    /// Default registration deadline day.
    pub const DEFAULT_DEADLINE_DAY: u8 = 3;

    /// Default declared timezone.
    pub const DEFAULT_TIMEZONE: &'static str = "Asia/Tokyo";

    /// Creates new `SystemSettings`.
    ///
    /// # Arguments
    ///
    /// * `registration_deadline_day` - Day-of-month, between 1 and 31
    /// * `timezone` - IANA timezone name
    ///
    /// # Errors
    ///
    /// Returns an error if the deadline day is out of range or the timezone
    /// name does not parse.
    pub fn new(registration_deadline_day: u8, timezone: String) -> Result<Self, DomainError> {
        if !(1..=31).contains(&registration_deadline_day) {
            return Err(DomainError::InvalidDeadlineDay {
                day: registration_deadline_day,
            });
        }
        if timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(DomainError::InvalidTimezone(timezone));
        }
        Ok(Self {
            registration_deadline_day,
            timezone,
        })
    }

    /// The settings record materialized on first access.
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            registration_deadline_day: Self::DEFAULT_DEADLINE_DAY,
            timezone: String::from(Self::DEFAULT_TIMEZONE),
        }
    }

    /// Returns the registration deadline day.
    #[must_use]
    pub const fn registration_deadline_day(&self) -> u8 {
        self.registration_deadline_day
    }

    /// Returns the declared timezone name.
    #[must_use]
    pub fn timezone(&self) -> &str {
        &self.timezone
    }
}

/// Converts a 1-based month number into a `Month`.
///
/// # Errors
///
/// Returns an error if the number is not within [1, 12].
pub fn month_from_number(month: u8) -> Result<Month, DomainError> {
    Month::try_from(month).map_err(|_| DomainError::InvalidMonth { month })
}
