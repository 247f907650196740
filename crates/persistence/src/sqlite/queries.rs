// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use rusqlite::{Connection, OptionalExtension, params};
use rota_domain::{
    AttendanceEvent, PermissionMatrix, PunchKind, RegistrationLock, RoleDefinition, Shift,
    ShiftStatus, ShiftType, StaffMember, SystemSettings, month_from_number, page_access_from_json,
};
use time::Date;

use crate::data_models::{decode_date, decode_datetime};
use crate::error::PersistenceError;

/// Reads the settings record, lazily materializing the defaults.
///
/// The insert is `OR IGNORE`: concurrent first readers race harmlessly
/// because every writer inserts the identical default row.
///
/// # Errors
///
/// Returns an error if the query fails or the stored values are invalid.
pub fn get_settings(conn: &Connection) -> Result<SystemSettings, PersistenceError> {
    let defaults: SystemSettings = SystemSettings::defaults();
    conn.execute(
        "INSERT OR IGNORE INTO system_settings (id, registration_deadline_day, timezone)
         VALUES (1, ?1, ?2)",
        params![
            defaults.registration_deadline_day(),
            defaults.timezone()
        ],
    )?;

    let (day, timezone): (u8, String) = conn.query_row(
        "SELECT registration_deadline_day, timezone FROM system_settings WHERE id = 1",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    Ok(SystemSettings::new(day, timezone)?)
}

/// Loads a role definition by ID.
///
/// The permission matrix and page access documents are validated at load
/// time; unknown names in stored documents surface as corrupt-record errors
/// instead of silently denying.
///
/// # Errors
///
/// Returns an error if the role does not exist or its documents are invalid.
pub fn get_role(conn: &Connection, role_id: i64) -> Result<RoleDefinition, PersistenceError> {
    let row: Option<(String, String, String)> = conn
        .query_row(
            "SELECT name, matrix_json, page_access_json FROM roles WHERE role_id = ?1",
            params![role_id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()?;

    let Some((name, matrix_json, page_access_json)) = row else {
        return Err(PersistenceError::NotFound(format!("Role {role_id}")));
    };

    let matrix: PermissionMatrix = PermissionMatrix::from_json_str(&matrix_json)?;
    let page_doc: serde_json::Value = serde_json::from_str(&page_access_json)?;
    let page_access = page_access_from_json(&page_doc)?;

    Ok(RoleDefinition {
        role_id,
        name,
        matrix,
        page_access,
    })
}

/// Loads the role definition governing a staff member.
///
/// # Errors
///
/// Returns an error if the member or their role does not exist.
pub fn get_role_for_member(
    conn: &Connection,
    user_id: i64,
) -> Result<RoleDefinition, PersistenceError> {
    let role_id: Option<i64> = conn
        .query_row(
            "SELECT role_id FROM staff_members WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )
        .optional()?;

    let Some(role_id) = role_id else {
        return Err(PersistenceError::NotFound(format!("Staff member {user_id}")));
    };
    get_role(conn, role_id)
}

/// Loads a staff member by ID, including their manager edges.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_member(
    conn: &Connection,
    user_id: i64,
) -> Result<Option<StaffMember>, PersistenceError> {
    let row: Option<(String, Option<i64>, i64, bool, bool, String)> = conn
        .query_row(
            "SELECT name, company_id, role_id, wake_up_enabled, departure_enabled,
                    default_location
             FROM staff_members WHERE user_id = ?1",
            params![user_id],
            |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                ))
            },
        )
        .optional()?;

    let Some((name, company_id, role_id, wake_up_enabled, departure_enabled, default_location)) =
        row
    else {
        return Ok(None);
    };

    let mut stmt = conn
        .prepare("SELECT manager_id FROM staff_managers WHERE user_id = ?1 ORDER BY manager_id")?;
    let manager_ids: Vec<i64> = stmt
        .query_map(params![user_id], |row| row.get(0))?
        .collect::<Result<_, _>>()?;

    Ok(Some(StaffMember {
        user_id,
        name,
        company_id,
        manager_ids,
        role_id,
        wake_up_enabled,
        departure_enabled,
        default_location,
    }))
}

/// Lists every staff member, including manager edges.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_members(conn: &Connection) -> Result<Vec<StaffMember>, PersistenceError> {
    let ids: Vec<i64> = all_user_ids(conn)?;
    let mut members: Vec<StaffMember> = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(member) = get_member(conn, id)? {
            members.push(member);
        }
    }
    Ok(members)
}

/// Lists every staff member ID, ascending.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn all_user_ids(conn: &Connection) -> Result<Vec<i64>, PersistenceError> {
    let mut stmt = conn.prepare("SELECT user_id FROM staff_members ORDER BY user_id")?;
    let ids: Vec<i64> = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<_, _>>()?;
    Ok(ids)
}

/// Lists the IDs of staff sharing a company, ascending.
///
/// `None` selects internal staff (no company).
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn users_in_company(
    conn: &Connection,
    company_id: Option<i64>,
) -> Result<Vec<i64>, PersistenceError> {
    let ids: Vec<i64> = match company_id {
        Some(company) => {
            let mut stmt = conn.prepare(
                "SELECT user_id FROM staff_members WHERE company_id = ?1 ORDER BY user_id",
            )?;
            let rows = stmt.query_map(params![company], |row| row.get(0))?;
            rows.collect::<Result<_, _>>()?
        }
        None => {
            let mut stmt = conn.prepare(
                "SELECT user_id FROM staff_members WHERE company_id IS NULL ORDER BY user_id",
            )?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            rows.collect::<Result<_, _>>()?
        }
    };
    Ok(ids)
}

/// Lists the IDs of staff who list `manager_id` among their managers.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn assigned_user_ids(
    conn: &Connection,
    manager_id: i64,
) -> Result<Vec<i64>, PersistenceError> {
    let mut stmt = conn
        .prepare("SELECT user_id FROM staff_managers WHERE manager_id = ?1 ORDER BY user_id")?;
    let ids: Vec<i64> = stmt
        .query_map(params![manager_id], |row| row.get(0))?
        .collect::<Result<_, _>>()?;
    Ok(ids)
}

/// Loads a member's shifts within an inclusive date range, ascending.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row is invalid.
pub fn shifts_in_range(
    conn: &Connection,
    user_id: i64,
    from: Date,
    to: Date,
) -> Result<Vec<Shift>, PersistenceError> {
    let from_text: String = crate::data_models::encode_date(from)?;
    let to_text: String = crate::data_models::encode_date(to)?;

    let mut stmt = conn.prepare(
        "SELECT shift_id, date, start_time, end_time, break_minutes, shift_type, location,
                status
         FROM shifts
         WHERE user_id = ?1 AND date >= ?2 AND date <= ?3
         ORDER BY date",
    )?;
    let rows: Vec<(i64, String, String, String, u16, String, String, String)> = stmt
        .query_map(params![user_id, from_text, to_text], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
                row.get(7)?,
            ))
        })?
        .collect::<Result<_, _>>()?;

    let mut shifts: Vec<Shift> = Vec::with_capacity(rows.len());
    for (shift_id, date, start_time, end_time, break_minutes, shift_type, location, status) in rows
    {
        shifts.push(Shift::with_id(
            shift_id,
            user_id,
            decode_date(&date)?,
            decode_datetime(&start_time)?,
            decode_datetime(&end_time)?,
            break_minutes,
            ShiftType::parse(&shift_type)?,
            location,
            ShiftStatus::parse(&status)?,
        ));
    }
    Ok(shifts)
}

/// Loads a member's punches within an inclusive date range, ascending by
/// date and kind.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row is invalid.
pub fn events_in_range(
    conn: &Connection,
    user_id: i64,
    from: Date,
    to: Date,
) -> Result<Vec<AttendanceEvent>, PersistenceError> {
    let from_text: String = crate::data_models::encode_date(from)?;
    let to_text: String = crate::data_models::encode_date(to)?;

    let mut stmt = conn.prepare(
        "SELECT event_id, date, kind, recorded_at
         FROM attendance_events
         WHERE user_id = ?1 AND date >= ?2 AND date <= ?3
         ORDER BY date, kind",
    )?;
    let rows: Vec<(i64, String, String, String)> = stmt
        .query_map(params![user_id, from_text, to_text], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?
        .collect::<Result<_, _>>()?;

    let mut events: Vec<AttendanceEvent> = Vec::with_capacity(rows.len());
    for (event_id, date, kind, recorded_at) in rows {
        events.push(AttendanceEvent::with_id(
            event_id,
            user_id,
            decode_date(&date)?,
            PunchKind::parse(&kind)?,
            decode_datetime(&recorded_at)?,
        ));
    }
    Ok(events)
}

/// Loads the registration override record for a member's month.
///
/// # Errors
///
/// Returns an error if the query fails or the stored row is invalid.
pub fn get_lock_record(
    conn: &Connection,
    user_id: i64,
    year: i32,
    month: u8,
) -> Result<Option<RegistrationLock>, PersistenceError> {
    let row: Option<(bool, Option<String>)> = conn
        .query_row(
            "SELECT is_unlocked, unlocked_at
             FROM registration_locks
             WHERE user_id = ?1 AND year = ?2 AND month = ?3",
            params![user_id, year, month],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let Some((is_unlocked, unlocked_at)) = row else {
        return Ok(None);
    };

    let unlocked_at = match unlocked_at {
        Some(text) => Some(decode_datetime(&text)?),
        None => None,
    };

    Ok(Some(RegistrationLock {
        user_id,
        year,
        month: month_from_number(month)?,
        is_unlocked,
        unlocked_at,
    }))
}

/// Counts audit events recorded for a member's month.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn count_audit_events(
    conn: &Connection,
    user_id: i64,
    year: i32,
    month: u8,
) -> Result<i64, PersistenceError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM audit_events WHERE user_id = ?1 AND year = ?2 AND month = ?3",
        params![user_id, year, month],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Lists the correction trail for a member, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row is invalid.
pub fn corrections_for_member(
    conn: &Connection,
    user_id: i64,
) -> Result<Vec<rota_audit::PunchCorrection>, PersistenceError> {
    let mut stmt = conn.prepare(
        "SELECT date, kind, old_recorded_at, new_recorded_at, approved_by, corrected_at
         FROM punch_corrections
         WHERE user_id = ?1
         ORDER BY correction_id",
    )?;
    let rows: Vec<(String, String, String, String, i64, String)> = stmt
        .query_map(params![user_id], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
            ))
        })?
        .collect::<Result<_, _>>()?;

    let mut corrections = Vec::with_capacity(rows.len());
    for (date, kind, old_recorded_at, new_recorded_at, approved_by, corrected_at) in rows {
        corrections.push(rota_audit::PunchCorrection::new(
            user_id,
            decode_date(&date)?,
            PunchKind::parse(&kind)?,
            decode_datetime(&old_recorded_at)?,
            decode_datetime(&new_recorded_at)?,
            approved_by,
            decode_datetime(&corrected_at)?,
        ));
    }
    Ok(corrections)
}
