// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::Shift;

/// Validates the structural constraints of a shift.
///
/// # Constraints
///
/// - The location must be non-empty
/// - Start and end must both fall on the shift's date
/// - The end must be strictly after the start
/// - The break must not exceed the scheduled length
///
/// # Errors
///
/// Returns an error describing the first violated constraint.
pub fn validate_shift(shift: &Shift) -> Result<(), DomainError> {
    if shift.location.trim().is_empty() {
        return Err(DomainError::InvalidLocation(String::from(
            "Location cannot be empty",
        )));
    }

    if shift.start_time.date() != shift.date || shift.end_time.date() != shift.date {
        return Err(DomainError::InvalidShiftTimes {
            reason: format!(
                "Shift times must fall on the shift date {}: got {} to {}",
                shift.date, shift.start_time, shift.end_time
            ),
        });
    }

    if shift.end_time <= shift.start_time {
        return Err(DomainError::InvalidShiftTimes {
            reason: format!(
                "Shift end {} must be after start {}",
                shift.end_time, shift.start_time
            ),
        });
    }

    let scheduled: i64 = shift.scheduled_minutes();
    if i64::from(shift.break_minutes) > scheduled {
        return Err(DomainError::InvalidBreakMinutes {
            minutes: shift.break_minutes,
        });
    }

    Ok(())
}

/// Validates a staff member display name.
///
/// # Errors
///
/// Returns an error if the name is empty or whitespace-only.
pub fn validate_member_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::InvalidName(String::from(
            "Name cannot be empty",
        )));
    }
    Ok(())
}

/// Validates a registration deadline day.
///
/// # Errors
///
/// Returns an error if the day is outside [1, 31].
pub const fn validate_deadline_day(day: u8) -> Result<(), DomainError> {
    if day >= 1 && day <= 31 {
        Ok(())
    } else {
        Err(DomainError::InvalidDeadlineDay { day })
    }
}
