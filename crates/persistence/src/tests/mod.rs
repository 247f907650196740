// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::unwrap_used)]

use crate::SqlitePersistence;
use rota::{State, TransitionResult};
use rota_audit::{Action, Actor, AuditEvent, Cause, PunchCorrection, StateSnapshot};
use rota_domain::{
    AttendanceEvent, PunchKind, RegistrationLock, Shift, ShiftType, SystemSettings,
};
use time::Month;
use time::macros::{date, datetime};

const MATRIX_STAFF: &str = r#"{"shiftManagement": {}, "attendanceManagement": {}}"#;
const MATRIX_ADMIN: &str = r#"{
    "shiftManagement": {"viewAll": true, "editAll": true, "forceRegister": true},
    "attendanceManagement": {"viewAll": true, "forceClock": true, "correctPunch": true},
    "systemAdministration": {"unlock": true, "manageSettings": true}
}"#;
const PAGES_ALL: &str = r#"["shiftCalendar", "attendanceSheet", "memberDirectory", "adminConsole"]"#;

fn persistence_with_member() -> (SqlitePersistence, i64) {
    let mut p = SqlitePersistence::new_in_memory().unwrap();
    let role_id = p.create_role("Staff", MATRIX_STAFF, r#"["shiftCalendar"]"#).unwrap();
    let user_id = p
        .create_member("A. Staff", None, role_id, true, false, "HQ")
        .unwrap();
    (p, user_id)
}

fn audit_event(user_id: i64) -> AuditEvent {
    AuditEvent::new(
        Actor::new(format!("user-{user_id}"), String::from("staff")),
        Cause::new(String::from("req-1"), String::from("Test request")),
        Action::new(String::from("RegisterShift"), None),
        StateSnapshot::new(String::from("shifts_count=0")),
        StateSnapshot::new(String::from("shifts_count=1")),
        rota_audit::RosterScope::new(user_id, 2025, Month::July),
    )
}

fn month_state_with_shift(user_id: i64) -> State {
    let mut state = State::new(user_id, 2025, Month::July);
    state.shifts.push(Shift::new(
        user_id,
        date!(2025 - 07 - 10),
        datetime!(2025 - 07 - 10 09:00:00),
        datetime!(2025 - 07 - 10 18:00:00),
        60,
        ShiftType::Regular,
        String::from("HQ"),
    ));
    state
}

#[test]
fn test_settings_lazily_materialized_with_defaults() {
    let mut p = SqlitePersistence::new_in_memory().unwrap();
    let settings = p.settings().unwrap();
    assert_eq!(settings, SystemSettings::defaults());

    // A second read returns the same row, not a second insert.
    let again = p.settings().unwrap();
    assert_eq!(again, settings);
}

#[test]
fn test_role_documents_validated_at_creation() {
    let mut p = SqlitePersistence::new_in_memory().unwrap();

    let result = p.create_role("Bad", r#"{"payroll": {"viewAll": true}}"#, PAGES_ALL);
    assert!(result.is_err());

    let result = p.create_role(
        "Bad",
        r#"{"shiftManagement": {"viewEverything": true}}"#,
        PAGES_ALL,
    );
    assert!(result.is_err());

    assert!(p.create_role("Admin", MATRIX_ADMIN, PAGES_ALL).is_ok());
}

#[test]
fn test_member_round_trip_with_manager_edges() {
    let (mut p, user_id) = persistence_with_member();
    let role_id = p.create_role("Manager", MATRIX_ADMIN, PAGES_ALL).unwrap();
    let manager_id = p
        .create_member("M. Manager", Some(5), role_id, false, false, "HQ")
        .unwrap();
    p.add_manager(user_id, manager_id).unwrap();

    let member = p.member(user_id).unwrap().unwrap();
    assert_eq!(member.name, "A. Staff");
    assert_eq!(member.company_id, None);
    assert!(member.wake_up_enabled);
    assert!(!member.departure_enabled);
    assert_eq!(member.manager_ids, vec![manager_id]);

    assert_eq!(p.assigned_user_ids(manager_id).unwrap(), vec![user_id]);
    assert_eq!(p.users_in_company(Some(5)).unwrap(), vec![manager_id]);
    assert_eq!(p.users_in_company(None).unwrap(), vec![user_id]);
}

#[test]
fn test_commit_transition_syncs_month_rows() {
    let (mut p, user_id) = persistence_with_member();
    let mut state = month_state_with_shift(user_id);
    state.events.push(AttendanceEvent::new(
        user_id,
        date!(2025 - 07 - 10),
        PunchKind::ClockIn,
        datetime!(2025 - 07 - 10 09:02:00),
    ));

    let result = TransitionResult {
        new_state: state.clone(),
        audit_event: audit_event(user_id),
        correction: None,
    };
    let event_id = p.commit_transition(&result).unwrap();
    assert!(event_id > 0);

    let loaded = p.load_month_state(user_id, 2025, Month::July).unwrap();
    assert_eq!(loaded.shifts.len(), 1);
    assert_eq!(loaded.shifts[0].date, date!(2025 - 07 - 10));
    assert_eq!(loaded.shifts[0].start_time, datetime!(2025 - 07 - 10 09:00:00));
    assert_eq!(loaded.events.len(), 1);
    assert_eq!(
        loaded.events[0].recorded_at,
        datetime!(2025 - 07 - 10 09:02:00)
    );
    assert_eq!(p.count_audit_events(user_id, 2025, Month::July).unwrap(), 1);
}

#[test]
fn test_commit_transitions_is_one_transaction_per_batch() {
    let (mut p, user_id) = persistence_with_member();

    let mut first = State::new(user_id, 2025, Month::July);
    first.shifts.push(Shift::new(
        user_id,
        date!(2025 - 07 - 10),
        datetime!(2025 - 07 - 10 09:00:00),
        datetime!(2025 - 07 - 10 17:00:00),
        60,
        ShiftType::Regular,
        String::from("HQ"),
    ));
    let mut second = first.clone();
    second.shifts.push(Shift::new(
        user_id,
        date!(2025 - 07 - 11),
        datetime!(2025 - 07 - 11 09:00:00),
        datetime!(2025 - 07 - 11 17:00:00),
        60,
        ShiftType::Spot,
        String::from("Warehouse"),
    ));

    let results = vec![
        TransitionResult {
            new_state: first,
            audit_event: audit_event(user_id),
            correction: None,
        },
        TransitionResult {
            new_state: second,
            audit_event: audit_event(user_id),
            correction: None,
        },
    ];

    let event_ids = p.commit_transitions(&results).unwrap();
    assert_eq!(event_ids.len(), 2);

    let loaded = p.load_month_state(user_id, 2025, Month::July).unwrap();
    assert_eq!(loaded.shifts.len(), 2);
    assert_eq!(p.count_audit_events(user_id, 2025, Month::July).unwrap(), 2);
}

#[test]
fn test_correction_trail_is_appended() {
    let (mut p, user_id) = persistence_with_member();
    let mut state = State::new(user_id, 2025, Month::July);
    state.events.push(AttendanceEvent::new(
        user_id,
        date!(2025 - 07 - 10),
        PunchKind::ClockIn,
        datetime!(2025 - 07 - 10 09:00:00),
    ));

    let result = TransitionResult {
        new_state: state,
        audit_event: audit_event(user_id),
        correction: Some(PunchCorrection::new(
            user_id,
            date!(2025 - 07 - 10),
            PunchKind::ClockIn,
            datetime!(2025 - 07 - 10 09:12:00),
            datetime!(2025 - 07 - 10 09:00:00),
            7,
            datetime!(2025 - 07 - 11 10:00:00),
        )),
    };
    p.commit_transition(&result).unwrap();

    let corrections = p.corrections_for_member(user_id).unwrap();
    assert_eq!(corrections.len(), 1);
    assert_eq!(
        corrections[0].old_recorded_at,
        datetime!(2025 - 07 - 10 09:12:00)
    );
    assert_eq!(corrections[0].approved_by, 7);
}

#[test]
fn test_lock_record_round_trip() {
    let (mut p, user_id) = persistence_with_member();
    assert!(p.lock_record(user_id, 2025, Month::July).unwrap().is_none());

    let granted_at = datetime!(2025 - 07 - 20 09:00:00);
    let result = rota::AdminResult {
        new_lock: Some(RegistrationLock::unlocked(
            user_id,
            2025,
            Month::July,
            granted_at,
        )),
        new_settings: None,
        audit_event: audit_event(user_id),
    };
    p.commit_admin(&result).unwrap();

    let lock = p.lock_record(user_id, 2025, Month::July).unwrap().unwrap();
    assert!(lock.is_unlocked);
    assert_eq!(lock.unlocked_at, Some(granted_at));
}

#[test]
fn test_expire_unlock_if_due_is_idempotent() {
    let (mut p, user_id) = persistence_with_member();
    let granted_at = datetime!(2025 - 07 - 20 09:00:00);
    let result = rota::AdminResult {
        new_lock: Some(RegistrationLock::unlocked(
            user_id,
            2025,
            Month::July,
            granted_at,
        )),
        new_settings: None,
        audit_event: audit_event(user_id),
    };
    p.commit_admin(&result).unwrap();

    // Still within the hour: nothing flips.
    let within = datetime!(2025 - 07 - 20 09:59:00);
    assert!(
        !p.expire_unlock_if_due(user_id, 2025, Month::July, within)
            .unwrap()
    );
    assert!(
        p.lock_record(user_id, 2025, Month::July)
            .unwrap()
            .unwrap()
            .is_unlocked
    );

    // Past the hour: the flag flips exactly once.
    let after = datetime!(2025 - 07 - 20 10:00:01);
    assert!(
        p.expire_unlock_if_due(user_id, 2025, Month::July, after)
            .unwrap()
    );
    assert!(
        !p.lock_record(user_id, 2025, Month::July)
            .unwrap()
            .unwrap()
            .is_unlocked
    );

    // Flipping an already-relocked record is a no-op.
    assert!(
        !p.expire_unlock_if_due(user_id, 2025, Month::July, after)
            .unwrap()
    );
}

#[test]
fn test_settings_update_via_admin_commit() {
    let (mut p, _user_id) = persistence_with_member();
    let _ = p.settings().unwrap();

    let result = rota::AdminResult {
        new_lock: None,
        new_settings: Some(SystemSettings::new(10, String::from("Asia/Tokyo")).unwrap()),
        audit_event: audit_event(0),
    };
    p.commit_admin(&result).unwrap();

    let settings = p.settings().unwrap();
    assert_eq!(settings.registration_deadline_day(), 10);
}

#[test]
fn test_datetime_encoding_round_trip() {
    let encoded = crate::encode_datetime(datetime!(2025 - 07 - 10 09:00:00)).unwrap();
    let decoded = crate::data_models::decode_datetime(&encoded).unwrap();
    assert_eq!(decoded, datetime!(2025 - 07 - 10 09:00:00));
}
