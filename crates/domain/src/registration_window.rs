// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Registration window evaluation for shift creation and editing.
//!
//! This module decides whether a shift on a target date may be registered,
//! based on:
//! - The configured monthly deadline day
//! - An administrator-granted, auto-expiring unlock override
//! - The current civil instant
//!
//! ## Invariants
//!
//! - The deadline is the last instant (23:59:59) of the deadline day in the
//!   target shift's own month, clamped to that month's final day
//! - An unlock is valid for one hour from its grant and only for the current
//!   calendar month
//! - Unlock expiry is evaluated fresh on every call; a cached `is_unlocked`
//!   flag is never trusted past its expiry instant
//! - The evaluation itself never mutates state; when it observes an expired
//!   unlock it reports `relock_due` and the caller performs the idempotent
//!   relock write
//!
//! ## Usage
//!
//! This logic is used by:
//! - Shift registration and edit handlers (single and batch)
//! - The force-registration path bypasses this policy entirely at the
//!   caller; the policy itself stays capability-agnostic

use crate::types::RegistrationLock;
use time::macros::time;
use time::{Date, Duration, PrimitiveDateTime};

/// Machine-readable reason a registration was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationDenial {
    /// The monthly deadline has passed and no active unlock exists.
    DeadlinePassed,
    /// An unlock existed but its one-hour validity has elapsed.
    UnlockExpired,
    /// An active unlock exists but the target date is outside the current
    /// calendar month.
    UnlockWrongMonth,
}

impl RegistrationDenial {
    /// Returns the wire code for this denial, surfaced verbatim to callers.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::DeadlinePassed => "DEADLINE_PASSED",
            Self::UnlockExpired => "UNLOCK_EXPIRED",
            Self::UnlockWrongMonth => "UNLOCK_WRONG_MONTH",
        }
    }
}

impl std::fmt::Display for RegistrationDenial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// The outcome of a registration window evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowDecision {
    /// Registration is permitted.
    Allowed,
    /// Registration is denied.
    Denied {
        /// Why registration was denied.
        reason: RegistrationDenial,
        /// Whether the caller must run the idempotent relock write: the
        /// evaluated unlock has passed its expiry instant but is still
        /// flagged unlocked in storage.
        relock_due: bool,
    },
}

impl WindowDecision {
    /// Returns whether registration is permitted.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Returns the denial reason, if denied.
    #[must_use]
    pub const fn denial(&self) -> Option<RegistrationDenial> {
        match self {
            Self::Allowed => None,
            Self::Denied { reason, .. } => Some(*reason),
        }
    }

    /// Returns whether the caller must persist an auto-relock.
    #[must_use]
    pub const fn relock_due(&self) -> bool {
        matches!(
            self,
            Self::Denied {
                relock_due: true,
                ..
            }
        )
    }

    const fn denied(reason: RegistrationDenial) -> Self {
        Self::Denied {
            reason,
            relock_due: false,
        }
    }
}

/// How long an unlock grant remains valid.
const UNLOCK_VALIDITY: Duration = Duration::hours(1);

/// Evaluates whether a shift on `target_date` may be registered at `now`.
///
/// # Arguments
///
/// * `target_date` - The civil date of the shift being registered or edited
/// * `now` - The current civil instant in the declared timezone
/// * `deadline_day` - The configured day-of-month, between 1 and 31
/// * `lock` - The (user, year, month) override record for the target month,
///   if one exists
///
/// # Window rules
///
/// 1. Up to and including 23:59:59 on the deadline day of the target month,
///    registration is open. A deadline day beyond the month's length clamps
///    to the month's final day.
/// 2. After the deadline, registration requires an active unlock.
/// 3. An unlock expires one hour after its grant; an expired unlock denies
///    with `UNLOCK_EXPIRED` and `relock_due` set so the caller can persist
///    the flip (flipping an already-relocked record is a no-op).
/// 4. An active unlock applies only to dates in `now`'s calendar month,
///    including dates already in the past within that month.
#[must_use]
pub fn evaluate_registration_window(
    target_date: Date,
    now: PrimitiveDateTime,
    deadline_day: u8,
    lock: Option<&RegistrationLock>,
) -> WindowDecision {
    let deadline: PrimitiveDateTime = month_deadline(target_date, deadline_day);
    if now <= deadline {
        return WindowDecision::Allowed;
    }

    let Some(lock) = lock else {
        return WindowDecision::denied(RegistrationDenial::DeadlinePassed);
    };
    if !lock.is_unlocked {
        return WindowDecision::denied(RegistrationDenial::DeadlinePassed);
    }
    // An unlocked record always carries its grant instant; a record without
    // one is treated as never unlocked.
    let Some(unlocked_at) = lock.unlocked_at else {
        return WindowDecision::denied(RegistrationDenial::DeadlinePassed);
    };

    let auto_relock_at: PrimitiveDateTime = unlocked_at.saturating_add(UNLOCK_VALIDITY);
    if now >= auto_relock_at {
        return WindowDecision::Denied {
            reason: RegistrationDenial::UnlockExpired,
            relock_due: true,
        };
    }

    let today: Date = now.date();
    if (target_date.year(), target_date.month()) != (today.year(), today.month()) {
        return WindowDecision::denied(RegistrationDenial::UnlockWrongMonth);
    }

    WindowDecision::Allowed
}

/// Last writable instant of the target month: 23:59:59 on the deadline day,
/// clamped to the month's final day for short months.
fn month_deadline(target_date: Date, deadline_day: u8) -> PrimitiveDateTime {
    let last_day: u8 = target_date.month().length(target_date.year());
    let day: u8 = deadline_day.clamp(1, last_day);
    // The clamped day is always a valid calendar day for this month.
    let date: Date = Date::from_calendar_date(target_date.year(), target_date.month(), day)
        .unwrap_or(target_date);
    PrimitiveDateTime::new(date, time!(23:59:59))
}
