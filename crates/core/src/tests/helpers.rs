// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::unwrap_used)]

use crate::state::{RosterMetadata, State};
use rota_audit::{Actor, Cause};
use rota_domain::{Shift, ShiftType, StaffMember, SystemSettings};
use time::macros::time;
use time::{Date, Month, PrimitiveDateTime};

/// Default test member ID.
pub const MEMBER_ID: i64 = 42;

pub fn test_member(user_id: i64) -> StaffMember {
    StaffMember {
        user_id,
        name: format!("Member {user_id}"),
        company_id: None,
        manager_ids: vec![],
        role_id: 1,
        wake_up_enabled: true,
        departure_enabled: false,
        default_location: String::from("HQ"),
    }
}

pub fn test_metadata() -> RosterMetadata {
    RosterMetadata::new(vec![test_member(MEMBER_ID)], SystemSettings::defaults())
}

pub fn empty_state() -> State {
    State::new(MEMBER_ID, 2025, Month::July)
}

pub fn test_actor() -> Actor {
    Actor::new(String::from("admin-1"), String::from("admin"))
}

pub fn test_cause() -> Cause {
    Cause::new(String::from("req-1"), String::from("Test request"))
}

pub fn nine_to_five(date: Date) -> Shift {
    Shift::new(
        MEMBER_ID,
        date,
        PrimitiveDateTime::new(date, time!(09:00:00)),
        PrimitiveDateTime::new(date, time!(17:00:00)),
        60,
        ShiftType::Regular,
        String::from("HQ"),
    )
}
