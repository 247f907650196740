// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::unwrap_used)]

use crate::auth::{AuthenticatedActor, authenticate_stub};
use rota_audit::Cause;
use rota_persistence::SqlitePersistence;

/// Full administrative matrix.
pub const MATRIX_ADMIN: &str = r#"{
    "shiftManagement": {
        "viewAll": true, "editAll": true, "delete": true, "forceRegister": true
    },
    "attendanceManagement": {
        "viewAll": true, "editAll": true, "forceClock": true, "correctPunch": true
    },
    "memberManagement": {"viewAll": true},
    "systemAdministration": {"unlock": true, "manageSettings": true}
}"#;

/// Company-scoped manager matrix: sees the company, edits assigned staff.
pub const MATRIX_MANAGER: &str = r#"{
    "shiftManagement": {"viewCompany": true, "editAssigned": true},
    "attendanceManagement": {"viewCompany": true},
    "memberManagement": {"viewCompany": true}
}"#;

/// Plain staff matrix: no management scope at all.
pub const MATRIX_STAFF: &str = r#"{
    "shiftManagement": {},
    "attendanceManagement": {}
}"#;

pub const PAGES_ADMIN: &str =
    r#"["shiftCalendar", "attendanceSheet", "memberDirectory", "adminConsole"]"#;
pub const PAGES_STAFF: &str = r#"["shiftCalendar", "attendanceSheet"]"#;

/// A seeded roster shared by the api tests.
pub struct TestRoster {
    pub persistence: SqlitePersistence,
    /// Internal administrator.
    pub admin: i64,
    /// Manager in company 1, managing `staff_a`.
    pub manager: i64,
    /// Staff in company 1, assigned to `manager`. Wake-up reports enabled.
    pub staff_a: i64,
    /// Staff in company 1, not assigned to anyone.
    pub staff_b: i64,
    /// Staff in company 2.
    pub staff_c: i64,
}

pub fn seed_roster() -> TestRoster {
    let mut p = SqlitePersistence::new_in_memory().unwrap();

    let admin_role = p.create_role("Administrator", MATRIX_ADMIN, PAGES_ADMIN).unwrap();
    let manager_role = p.create_role("Manager", MATRIX_MANAGER, PAGES_ADMIN).unwrap();
    let staff_role = p.create_role("Staff", MATRIX_STAFF, PAGES_STAFF).unwrap();

    let admin = p
        .create_member("Admin", None, admin_role, false, false, "HQ")
        .unwrap();
    let manager = p
        .create_member("Manager One", Some(1), manager_role, false, false, "HQ")
        .unwrap();
    let staff_a = p
        .create_member("Staff A", Some(1), staff_role, true, false, "HQ")
        .unwrap();
    let staff_b = p
        .create_member("Staff B", Some(1), staff_role, false, false, "HQ")
        .unwrap();
    let staff_c = p
        .create_member("Staff C", Some(2), staff_role, false, false, "Depot")
        .unwrap();
    p.add_manager(staff_a, manager).unwrap();

    TestRoster {
        persistence: p,
        admin,
        manager,
        staff_a,
        staff_b,
        staff_c,
    }
}

pub fn actor_for(persistence: &mut SqlitePersistence, user_id: i64) -> AuthenticatedActor {
    authenticate_stub(persistence, user_id).unwrap()
}

pub fn test_cause() -> Cause {
    Cause::new(String::from("req-test"), String::from("Test request"))
}
