// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::unwrap_used)]

use crate::error::ApiError;
use crate::handlers::{
    correct_punch, delete_shift, grant_unlock, monthly_attendance, record_punch, register_shift,
    register_shifts_batch, set_deadline_day,
};
use crate::request_response::{
    CorrectPunchRequest, DeleteShiftRequest, GrantUnlockRequest, MonthlyAttendanceRequest,
    RecordPunchRequest, RegisterShiftRequest, RegisterShiftsBatchRequest, SetDeadlineDayRequest,
};
use crate::tests::helpers::{actor_for, seed_roster, test_cause};
use time::Month;
use time::macros::datetime;

fn shift_request(user_id: i64, date: &str) -> RegisterShiftRequest {
    RegisterShiftRequest {
        user_id,
        date: String::from(date),
        start_time: String::from("09:00:00"),
        end_time: String::from("18:00:00"),
        break_minutes: 60,
        shift_type: String::from("REGULAR"),
        location: None,
    }
}

fn punch(user_id: i64, date: &str, kind: &str, at: &str) -> RecordPunchRequest {
    RecordPunchRequest {
        user_id,
        date: String::from(date),
        kind: String::from(kind),
        recorded_at: Some(String::from(at)),
    }
}

#[test]
fn test_window_closes_after_deadline() {
    let mut roster = seed_roster();
    let actor = actor_for(&mut roster.persistence, roster.staff_a);

    // July's deadline (day 3) has passed on July 20.
    let now = datetime!(2025 - 07 - 20 12:00:00);
    let result = register_shift(
        &mut roster.persistence,
        shift_request(roster.staff_a, "2025-07-25"),
        &actor,
        test_cause(),
        now,
    );

    assert_eq!(
        result.unwrap_err(),
        ApiError::RegistrationDenied {
            code: String::from("DEADLINE_PASSED"),
        }
    );

    // Next month is still open.
    let result = register_shift(
        &mut roster.persistence,
        shift_request(roster.staff_a, "2025-08-25"),
        &actor,
        test_cause(),
        now,
    );
    assert!(result.is_ok());
}

#[test]
fn test_unlock_reopens_current_month_then_expires() {
    let mut roster = seed_roster();
    let admin = actor_for(&mut roster.persistence, roster.admin);
    let staff = actor_for(&mut roster.persistence, roster.staff_a);

    let granted_at = datetime!(2025 - 07 - 20 09:00:00);
    grant_unlock(
        &mut roster.persistence,
        GrantUnlockRequest {
            user_id: roster.staff_a,
            year: 2025,
            month: 7,
        },
        &admin,
        test_cause(),
        granted_at,
    )
    .unwrap();

    // Within the hour, a past date in the current month is registrable.
    let result = register_shift(
        &mut roster.persistence,
        shift_request(roster.staff_a, "2025-07-05"),
        &staff,
        test_cause(),
        datetime!(2025 - 07 - 20 09:59:59),
    );
    assert!(result.is_ok());

    // The unlock never reaches another month.
    let result = register_shift(
        &mut roster.persistence,
        shift_request(roster.staff_a, "2025-06-15"),
        &staff,
        test_cause(),
        datetime!(2025 - 07 - 20 09:30:00),
    );
    assert_eq!(
        result.unwrap_err(),
        ApiError::RegistrationDenied {
            code: String::from("UNLOCK_WRONG_MONTH"),
        }
    );

    // Past the hour the unlock is spent, and the observation relocks it.
    let result = register_shift(
        &mut roster.persistence,
        shift_request(roster.staff_a, "2025-07-06"),
        &staff,
        test_cause(),
        datetime!(2025 - 07 - 20 10:00:01),
    );
    assert_eq!(
        result.unwrap_err(),
        ApiError::RegistrationDenied {
            code: String::from("UNLOCK_EXPIRED"),
        }
    );
    let lock = roster
        .persistence
        .lock_record(roster.staff_a, 2025, Month::July)
        .unwrap()
        .unwrap();
    assert!(!lock.is_unlocked);

    // A later attempt sees a plain closed window.
    let result = register_shift(
        &mut roster.persistence,
        shift_request(roster.staff_a, "2025-07-07"),
        &staff,
        test_cause(),
        datetime!(2025 - 07 - 20 10:30:00),
    );
    assert_eq!(
        result.unwrap_err(),
        ApiError::RegistrationDenied {
            code: String::from("DEADLINE_PASSED"),
        }
    );
}

#[test]
fn test_force_register_bypasses_window() {
    let mut roster = seed_roster();
    let admin = actor_for(&mut roster.persistence, roster.admin);

    // Deep in the past, no unlock anywhere: forceRegister does not consult
    // the window at all.
    let result = register_shift(
        &mut roster.persistence,
        shift_request(roster.staff_a, "2025-03-10"),
        &admin,
        test_cause(),
        datetime!(2025 - 07 - 20 12:00:00),
    );
    assert!(result.is_ok());
}

#[test]
fn test_deadline_day_change_takes_effect() {
    let mut roster = seed_roster();
    let admin = actor_for(&mut roster.persistence, roster.admin);
    let staff = actor_for(&mut roster.persistence, roster.staff_a);

    set_deadline_day(
        &mut roster.persistence,
        SetDeadlineDayRequest { day: 25 },
        &admin,
        test_cause(),
    )
    .unwrap();

    // July 20 is now inside July's window.
    let result = register_shift(
        &mut roster.persistence,
        shift_request(roster.staff_a, "2025-07-22"),
        &staff,
        test_cause(),
        datetime!(2025 - 07 - 20 12:00:00),
    );
    assert!(result.is_ok());
}

#[test]
fn test_batch_reports_per_entry_outcomes() {
    let mut roster = seed_roster();
    let admin = actor_for(&mut roster.persistence, roster.admin);
    let now = datetime!(2025 - 07 - 01 12:00:00);

    let request = RegisterShiftsBatchRequest {
        entries: vec![
            shift_request(roster.staff_a, "2025-08-04"),
            shift_request(roster.staff_b, "2025-08-04"),
            // Intra-batch duplicate: same member, same date as the first
            // entry. Rejected before any insert.
            shift_request(roster.staff_a, "2025-08-04"),
            shift_request(roster.staff_a, "not-a-date"),
        ],
    };

    let response =
        register_shifts_batch(&mut roster.persistence, request, &admin, &test_cause(), now)
            .unwrap();

    assert_eq!(response.succeeded, 2);
    assert_eq!(response.failed, 2);
    assert!(response.outcomes[0].ok);
    assert!(response.outcomes[1].ok);
    assert!(!response.outcomes[2].ok);
    assert!(!response.outcomes[3].ok);

    // The successes are committed and visible.
    let shifts = roster
        .persistence
        .shifts_in_range(
            roster.staff_a,
            time::macros::date!(2025 - 08 - 01),
            time::macros::date!(2025 - 08 - 31),
        )
        .unwrap();
    assert_eq!(shifts.len(), 1);
}

#[test]
fn test_monthly_view_computes_pay_metrics() {
    let mut roster = seed_roster();
    let admin = actor_for(&mut roster.persistence, roster.admin);
    let staff = actor_for(&mut roster.persistence, roster.staff_a);
    let setup_now = datetime!(2025 - 07 - 01 08:00:00);

    // Two July shifts, registered while the window is open... (July 1 is
    // before the day-3 deadline.)
    register_shift(
        &mut roster.persistence,
        shift_request(roster.staff_a, "2025-07-02"),
        &staff,
        test_cause(),
        setup_now,
    )
    .unwrap();
    register_shift(
        &mut roster.persistence,
        shift_request(roster.staff_a, "2025-07-03"),
        &staff,
        test_cause(),
        setup_now,
    )
    .unwrap();

    // ...then a full punched day on the 2nd (late by five minutes), and
    // nothing on the 3rd.
    record_punch(
        &mut roster.persistence,
        punch(roster.staff_a, "2025-07-02", "CLOCK_IN", "2025-07-02T09:05:00"),
        &staff,
        test_cause(),
        datetime!(2025 - 07 - 02 09:05:00),
    )
    .unwrap();
    record_punch(
        &mut roster.persistence,
        punch(roster.staff_a, "2025-07-02", "CLOCK_OUT", "2025-07-02T18:00:00"),
        &staff,
        test_cause(),
        datetime!(2025 - 07 - 02 18:00:00),
    )
    .unwrap();

    let response = monthly_attendance(
        &mut roster.persistence,
        MonthlyAttendanceRequest {
            user_id: roster.staff_a,
            year: 2025,
            month: 7,
        },
        &admin,
        datetime!(2025 - 07 - 20 12:00:00),
    )
    .unwrap();

    assert_eq!(response.days.len(), 2);

    let worked_day = &response.days[0];
    assert_eq!(worked_day.date, "2025-07-02");
    // 09:05 to 18:00 minus the 60-minute break.
    assert_eq!(worked_day.worked_minutes, Some(475));
    assert_eq!(worked_day.is_late, Some(true));
    assert!(!worked_day.is_absent);

    let missed_day = &response.days[1];
    assert_eq!(missed_day.date, "2025-07-03");
    assert_eq!(missed_day.worked_minutes, None);
    assert!(missed_day.is_absent);

    assert_eq!(response.totals.worked_minutes, 475);
    assert_eq!(response.totals.worked_text, "7:55");
    assert_eq!(response.totals.work_days, 1);
    assert_eq!(response.totals.late_count, 1);
    assert_eq!(response.totals.absent_days, 1);
    assert_eq!(response.totals.scheduled_days, 2);
    assert!(response.warnings.is_empty());
}

#[test]
fn test_wake_up_toggle_enforced_on_punch() {
    let mut roster = seed_roster();
    let now = datetime!(2025 - 07 - 10 06:00:00);

    // staff_a has wake-up reports enabled.
    let staff_a = actor_for(&mut roster.persistence, roster.staff_a);
    let result = record_punch(
        &mut roster.persistence,
        punch(roster.staff_a, "2025-07-10", "WAKE_UP", "2025-07-10T06:00:00"),
        &staff_a,
        test_cause(),
        now,
    );
    assert!(result.is_ok());

    // staff_b does not.
    let staff_b = actor_for(&mut roster.persistence, roster.staff_b);
    let result = record_punch(
        &mut roster.persistence,
        punch(roster.staff_b, "2025-07-10", "WAKE_UP", "2025-07-10T06:00:00"),
        &staff_b,
        test_cause(),
        now,
    );
    assert!(matches!(
        result.unwrap_err(),
        ApiError::DomainRuleViolation { .. }
    ));
}

#[test]
fn test_duplicate_punch_rejected() {
    let mut roster = seed_roster();
    let staff = actor_for(&mut roster.persistence, roster.staff_a);
    let now = datetime!(2025 - 07 - 10 09:00:00);

    record_punch(
        &mut roster.persistence,
        punch(roster.staff_a, "2025-07-10", "CLOCK_IN", "2025-07-10T09:00:00"),
        &staff,
        test_cause(),
        now,
    )
    .unwrap();

    let result = record_punch(
        &mut roster.persistence,
        punch(roster.staff_a, "2025-07-10", "CLOCK_IN", "2025-07-10T09:30:00"),
        &staff,
        test_cause(),
        now,
    );
    assert!(matches!(
        result.unwrap_err(),
        ApiError::DomainRuleViolation { .. }
    ));
}

#[test]
fn test_correction_amends_and_leaves_trail() {
    let mut roster = seed_roster();
    let staff = actor_for(&mut roster.persistence, roster.staff_a);
    let admin = actor_for(&mut roster.persistence, roster.admin);

    record_punch(
        &mut roster.persistence,
        punch(roster.staff_a, "2025-07-10", "CLOCK_IN", "2025-07-10T09:12:00"),
        &staff,
        test_cause(),
        datetime!(2025 - 07 - 10 09:12:00),
    )
    .unwrap();

    let response = correct_punch(
        &mut roster.persistence,
        CorrectPunchRequest {
            user_id: roster.staff_a,
            date: String::from("2025-07-10"),
            kind: String::from("CLOCK_IN"),
            new_recorded_at: String::from("2025-07-10T09:00:00"),
        },
        &admin,
        test_cause(),
        datetime!(2025 - 07 - 11 10:00:00),
    )
    .unwrap();
    assert!(response.old_recorded_at.starts_with("2025-07-10T09:12:00"));

    let corrections = roster
        .persistence
        .corrections_for_member(roster.staff_a)
        .unwrap();
    assert_eq!(corrections.len(), 1);
    assert_eq!(corrections[0].approved_by, roster.admin);

    // The canonical punch now carries the corrected timestamp.
    let events = roster
        .persistence
        .events_in_range(
            roster.staff_a,
            time::macros::date!(2025 - 07 - 10),
            time::macros::date!(2025 - 07 - 10),
        )
        .unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].recorded_at, datetime!(2025 - 07 - 10 09:00:00));
}

#[test]
fn test_delete_blocked_once_attendance_exists() {
    let mut roster = seed_roster();
    let staff = actor_for(&mut roster.persistence, roster.staff_a);
    let setup_now = datetime!(2025 - 07 - 01 08:00:00);

    register_shift(
        &mut roster.persistence,
        shift_request(roster.staff_a, "2025-07-02"),
        &staff,
        test_cause(),
        setup_now,
    )
    .unwrap();
    record_punch(
        &mut roster.persistence,
        punch(roster.staff_a, "2025-07-02", "CLOCK_IN", "2025-07-02T09:00:00"),
        &staff,
        test_cause(),
        datetime!(2025 - 07 - 02 09:00:00),
    )
    .unwrap();

    let result = delete_shift(
        &mut roster.persistence,
        DeleteShiftRequest {
            user_id: roster.staff_a,
            date: String::from("2025-07-02"),
        },
        &staff,
        test_cause(),
        datetime!(2025 - 07 - 02 12:00:00),
    );
    assert!(matches!(
        result.unwrap_err(),
        ApiError::DomainRuleViolation { .. }
    ));
}
