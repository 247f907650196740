// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::unwrap_used)]

use crate::error::ApiError;
use crate::handlers::{
    grant_unlock, list_accessible_members, monthly_attendance, record_punch, register_shift,
};
use crate::request_response::{
    GrantUnlockRequest, ListAccessibleMembersRequest, MonthlyAttendanceRequest,
    RecordPunchRequest, RegisterShiftRequest,
};
use crate::tests::helpers::{actor_for, seed_roster, test_cause};
use time::macros::datetime;

fn shift_request(user_id: i64, date: &str) -> RegisterShiftRequest {
    RegisterShiftRequest {
        user_id,
        date: String::from(date),
        start_time: String::from("09:00:00"),
        end_time: String::from("17:00:00"),
        break_minutes: 60,
        shift_type: String::from("REGULAR"),
        location: None,
    }
}

#[test]
fn test_staff_cannot_register_for_others() {
    let mut roster = seed_roster();
    let actor = actor_for(&mut roster.persistence, roster.staff_a);

    // Before the August deadline, so only the permission gate can refuse.
    let now = datetime!(2025 - 07 - 01 12:00:00);
    let result = register_shift(
        &mut roster.persistence,
        shift_request(roster.staff_b, "2025-08-05"),
        &actor,
        test_cause(),
        now,
    );

    assert!(matches!(
        result.unwrap_err(),
        ApiError::PermissionDenied { .. }
    ));
}

#[test]
fn test_staff_can_register_for_self() {
    let mut roster = seed_roster();
    let actor = actor_for(&mut roster.persistence, roster.staff_a);

    let now = datetime!(2025 - 07 - 01 12:00:00);
    let result = register_shift(
        &mut roster.persistence,
        shift_request(roster.staff_a, "2025-08-05"),
        &actor,
        test_cause(),
        now,
    );

    assert!(result.is_ok());
}

#[test]
fn test_manager_edits_assigned_only() {
    let mut roster = seed_roster();
    let actor = actor_for(&mut roster.persistence, roster.manager);
    let now = datetime!(2025 - 07 - 01 12:00:00);

    // staff_a is assigned to the manager.
    let result = register_shift(
        &mut roster.persistence,
        shift_request(roster.staff_a, "2025-08-05"),
        &actor,
        test_cause(),
        now,
    );
    assert!(result.is_ok());

    // staff_b shares the company but is not assigned; editAssigned does not
    // reach them.
    let result = register_shift(
        &mut roster.persistence,
        shift_request(roster.staff_b, "2025-08-05"),
        &actor,
        test_cause(),
        now,
    );
    assert!(matches!(
        result.unwrap_err(),
        ApiError::PermissionDenied { .. }
    ));
}

#[test]
fn test_company_view_gates_monthly_attendance() {
    let mut roster = seed_roster();
    let actor = actor_for(&mut roster.persistence, roster.manager);
    let now = datetime!(2025 - 07 - 20 12:00:00);

    // Same company: allowed.
    let result = monthly_attendance(
        &mut roster.persistence,
        MonthlyAttendanceRequest {
            user_id: roster.staff_b,
            year: 2025,
            month: 7,
        },
        &actor,
        now,
    );
    assert!(result.is_ok());

    // Different company: denied.
    let result = monthly_attendance(
        &mut roster.persistence,
        MonthlyAttendanceRequest {
            user_id: roster.staff_c,
            year: 2025,
            month: 7,
        },
        &actor,
        now,
    );
    assert!(matches!(
        result.unwrap_err(),
        ApiError::PermissionDenied { .. }
    ));
}

#[test]
fn test_staff_views_own_attendance_only() {
    let mut roster = seed_roster();
    let actor = actor_for(&mut roster.persistence, roster.staff_a);
    let now = datetime!(2025 - 07 - 20 12:00:00);

    let own = monthly_attendance(
        &mut roster.persistence,
        MonthlyAttendanceRequest {
            user_id: roster.staff_a,
            year: 2025,
            month: 7,
        },
        &actor,
        now,
    );
    assert!(own.is_ok());

    let other = monthly_attendance(
        &mut roster.persistence,
        MonthlyAttendanceRequest {
            user_id: roster.staff_b,
            year: 2025,
            month: 7,
        },
        &actor,
        now,
    );
    assert!(matches!(
        other.unwrap_err(),
        ApiError::PermissionDenied { .. }
    ));
}

#[test]
fn test_force_clock_requires_capability() {
    let mut roster = seed_roster();
    let now = datetime!(2025 - 07 - 10 09:00:00);

    // Staff cannot punch for someone else.
    let actor = actor_for(&mut roster.persistence, roster.staff_a);
    let result = record_punch(
        &mut roster.persistence,
        RecordPunchRequest {
            user_id: roster.staff_b,
            date: String::from("2025-07-10"),
            kind: String::from("CLOCK_IN"),
            recorded_at: None,
        },
        &actor,
        test_cause(),
        now,
    );
    assert!(matches!(
        result.unwrap_err(),
        ApiError::PermissionDenied { .. }
    ));

    // An administrator with forceClock can.
    let admin = actor_for(&mut roster.persistence, roster.admin);
    let result = record_punch(
        &mut roster.persistence,
        RecordPunchRequest {
            user_id: roster.staff_b,
            date: String::from("2025-07-10"),
            kind: String::from("CLOCK_IN"),
            recorded_at: None,
        },
        &admin,
        test_cause(),
        now,
    );
    assert!(result.is_ok());
}

#[test]
fn test_unlock_requires_capability() {
    let mut roster = seed_roster();
    let now = datetime!(2025 - 07 - 20 09:00:00);

    let manager = actor_for(&mut roster.persistence, roster.manager);
    let result = grant_unlock(
        &mut roster.persistence,
        GrantUnlockRequest {
            user_id: roster.staff_a,
            year: 2025,
            month: 7,
        },
        &manager,
        test_cause(),
        now,
    );
    assert!(matches!(
        result.unwrap_err(),
        ApiError::PermissionDenied { .. }
    ));

    let admin = actor_for(&mut roster.persistence, roster.admin);
    let result = grant_unlock(
        &mut roster.persistence,
        GrantUnlockRequest {
            user_id: roster.staff_a,
            year: 2025,
            month: 7,
        },
        &admin,
        test_cause(),
        now,
    );
    assert!(result.is_ok());
}

#[test]
fn test_accessible_members_with_fallback() {
    let mut roster = seed_roster();

    // Admin reaches everyone.
    let admin = actor_for(&mut roster.persistence, roster.admin);
    let response = list_accessible_members(
        &mut roster.persistence,
        &ListAccessibleMembersRequest {
            category: String::from("shiftManagement"),
            kind: String::from("view"),
        },
        &admin,
    )
    .unwrap();
    assert_eq!(
        response.user_ids,
        vec![
            roster.admin,
            roster.manager,
            roster.staff_a,
            roster.staff_b,
            roster.staff_c
        ]
    );

    // Manager sees company 1.
    let manager = actor_for(&mut roster.persistence, roster.manager);
    let response = list_accessible_members(
        &mut roster.persistence,
        &ListAccessibleMembersRequest {
            category: String::from("shiftManagement"),
            kind: String::from("view"),
        },
        &manager,
    )
    .unwrap();
    assert_eq!(
        response.user_ids,
        vec![roster.manager, roster.staff_a, roster.staff_b]
    );

    // Staff with no management scope fall back to themselves.
    let staff = actor_for(&mut roster.persistence, roster.staff_a);
    let response = list_accessible_members(
        &mut roster.persistence,
        &ListAccessibleMembersRequest {
            category: String::from("shiftManagement"),
            kind: String::from("view"),
        },
        &staff,
    )
    .unwrap();
    assert_eq!(response.user_ids, vec![roster.staff_a]);
}
