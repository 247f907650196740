// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Conversion of a UTC instant into the declared civil timezone.
//!
//! The system operates entirely in one civil timezone; every date boundary is
//! that zone's midnight-to-midnight. The server clock supplies UTC; this
//! module projects it into the declared zone once per request, and the
//! resulting civil instant is threaded through the rule functions as a plain
//! value.

use crate::error::DomainError;
use chrono::{Datelike, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use time::{Date, Month, PrimitiveDateTime, Time};

/// Projects a UTC instant into civil wall-clock time in the named zone.
///
/// # Arguments
///
/// * `timezone` - IANA name of the declared civil timezone
/// * `utc` - The instant to project
///
/// # Errors
///
/// Returns an error if the timezone name does not parse or the projected
/// components do not form a valid civil date-time.
pub fn civil_now(timezone: &str, utc: chrono::DateTime<Utc>) -> Result<PrimitiveDateTime, DomainError> {
    let tz: Tz = timezone
        .parse()
        .map_err(|_| DomainError::InvalidTimezone(timezone.to_string()))?;
    let local = utc.with_timezone(&tz);

    let month_number: u8 =
        u8::try_from(local.month()).map_err(|_| DomainError::InvalidCivilTime {
            reason: format!("Month out of range: {}", local.month()),
        })?;
    let month: Month = Month::try_from(month_number).map_err(|_| DomainError::InvalidCivilTime {
        reason: format!("Month out of range: {month_number}"),
    })?;
    let day: u8 = u8::try_from(local.day()).map_err(|_| DomainError::InvalidCivilTime {
        reason: format!("Day out of range: {}", local.day()),
    })?;

    let date: Date = Date::from_calendar_date(local.year(), month, day).map_err(|e| {
        DomainError::InvalidCivilTime {
            reason: format!("Invalid civil date: {e}"),
        }
    })?;

    let (hour, minute, second) = (local.hour(), local.minute(), local.second());
    let time: Time = Time::from_hms(
        u8::try_from(hour).unwrap_or(0),
        u8::try_from(minute).unwrap_or(0),
        u8::try_from(second).unwrap_or(0),
    )
    .map_err(|e| DomainError::InvalidCivilTime {
        reason: format!("Invalid civil time: {e}"),
    })?;

    Ok(PrimitiveDateTime::new(date, time))
}

/// Projects a Unix timestamp (seconds) into civil time in the named zone.
///
/// # Errors
///
/// Returns an error if the timestamp is outside the representable range or
/// the timezone name does not parse.
pub fn civil_from_unix(timezone: &str, unix_seconds: i64) -> Result<PrimitiveDateTime, DomainError> {
    let utc = Utc
        .timestamp_opt(unix_seconds, 0)
        .single()
        .ok_or_else(|| DomainError::InvalidCivilTime {
            reason: format!("Unix timestamp out of range: {unix_seconds}"),
        })?;
    civil_now(timezone, utc)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_utc_midnight_is_tokyo_morning() {
        // 2025-07-09T15:30:00Z is 2025-07-10T00:30:00 in Tokyo.
        let utc = Utc.with_ymd_and_hms(2025, 7, 9, 15, 30, 0).unwrap();
        let civil = civil_now("Asia/Tokyo", utc).unwrap();
        assert_eq!(civil, datetime!(2025 - 07 - 10 00:30:00));
    }

    #[test]
    fn test_unknown_timezone_rejected() {
        let utc = Utc.with_ymd_and_hms(2025, 7, 9, 15, 30, 0).unwrap();
        assert_eq!(
            civil_now("Mars/Olympus", utc),
            Err(DomainError::InvalidTimezone(String::from("Mars/Olympus")))
        );
    }

    #[test]
    fn test_unix_projection_matches() {
        let utc = Utc.with_ymd_and_hms(2025, 7, 9, 15, 30, 0).unwrap();
        let from_instant = civil_now("Asia/Tokyo", utc).unwrap();
        let from_unix = civil_from_unix("Asia/Tokyo", utc.timestamp()).unwrap();
        assert_eq!(from_instant, from_unix);
    }
}
