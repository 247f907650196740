// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use rusqlite::{Transaction, params};
use tracing::debug;

use rota::{AdminResult, State, TransitionResult};
use rota_audit::{AuditEvent, PunchCorrection};
use rota_domain::{RegistrationLock, SystemSettings};
use time::Date;

use crate::data_models::{
    ActionData, ActorData, CauseData, StateSnapshotData, encode_date, encode_datetime,
};
use crate::error::PersistenceError;

/// Persists a transition result: the audit event, the canonical month rows,
/// and any correction trail record, all inside the caller's transaction.
///
/// # Arguments
///
/// * `tx` - The active database transaction
/// * `result` - The transition result to persist
///
/// # Returns
///
/// The event ID assigned to the persisted audit event.
///
/// # Errors
///
/// Returns an error if persistence fails.
pub fn persist_transition(
    tx: &Transaction<'_>,
    result: &TransitionResult,
) -> Result<i64, PersistenceError> {
    let event_id: i64 = persist_audit_event(tx, &result.audit_event)?;
    debug!(event_id, "Persisted audit event");

    sync_month_rows(tx, &result.new_state)?;
    debug!(
        user_id = result.new_state.user_id,
        year = result.new_state.year,
        month = u8::from(result.new_state.month),
        shift_count = result.new_state.shifts.len(),
        punch_count = result.new_state.events.len(),
        "Synced canonical month rows"
    );

    if let Some(correction) = &result.correction {
        insert_correction(tx, correction)?;
        debug!(user_id = correction.user_id, "Appended punch correction");
    }

    Ok(event_id)
}

/// Persists an administrative result: the audit event plus the lock or
/// settings write it carries.
///
/// # Arguments
///
/// * `tx` - The active database transaction
/// * `result` - The administrative result to persist
///
/// # Returns
///
/// The event ID assigned to the persisted audit event.
///
/// # Errors
///
/// Returns an error if persistence fails.
pub fn persist_admin(tx: &Transaction<'_>, result: &AdminResult) -> Result<i64, PersistenceError> {
    let event_id: i64 = persist_audit_event(tx, &result.audit_event)?;
    debug!(event_id, "Persisted admin audit event");

    if let Some(lock) = &result.new_lock {
        upsert_lock(tx, lock)?;
    }
    if let Some(settings) = &result.new_settings {
        store_settings(tx, settings)?;
    }

    Ok(event_id)
}

/// Persists a single audit event.
///
/// # Errors
///
/// Returns an error if serialization or the insert fails.
pub fn persist_audit_event(
    tx: &Transaction<'_>,
    event: &AuditEvent,
) -> Result<i64, PersistenceError> {
    let actor_json: String = serde_json::to_string(&ActorData::from(&event.actor))?;
    let cause_json: String = serde_json::to_string(&CauseData::from(&event.cause))?;
    let action_json: String = serde_json::to_string(&ActionData::from(&event.action))?;
    let before_json: String = serde_json::to_string(&StateSnapshotData::from(&event.before))?;
    let after_json: String = serde_json::to_string(&StateSnapshotData::from(&event.after))?;

    tx.execute(
        "INSERT INTO audit_events
            (user_id, year, month, actor_json, cause_json, action_json,
             before_snapshot_json, after_snapshot_json)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            event.scope.user_id,
            event.scope.year,
            u8::from(event.scope.month),
            actor_json,
            cause_json,
            action_json,
            before_json,
            after_json,
        ],
    )?;

    Ok(tx.last_insert_rowid())
}

/// Replaces the canonical shift and punch rows for a state's month with the
/// state's contents.
fn sync_month_rows(tx: &Transaction<'_>, state: &State) -> Result<(), PersistenceError> {
    let (from, to): (String, String) = month_bounds(state.year, state.month)?;

    tx.execute(
        "DELETE FROM shifts WHERE user_id = ?1 AND date >= ?2 AND date <= ?3",
        params![state.user_id, from, to],
    )?;
    for shift in &state.shifts {
        tx.execute(
            "INSERT INTO shifts
                (user_id, date, start_time, end_time, break_minutes, shift_type, location,
                 status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                shift.user_id,
                encode_date(shift.date)?,
                encode_datetime(shift.start_time)?,
                encode_datetime(shift.end_time)?,
                shift.break_minutes,
                shift.shift_type.as_str(),
                shift.location,
                shift.status.as_str(),
            ],
        )?;
    }

    tx.execute(
        "DELETE FROM attendance_events WHERE user_id = ?1 AND date >= ?2 AND date <= ?3",
        params![state.user_id, from, to],
    )?;
    for event in &state.events {
        tx.execute(
            "INSERT INTO attendance_events (user_id, date, kind, recorded_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                event.user_id,
                encode_date(event.date)?,
                event.kind.as_str(),
                encode_datetime(event.recorded_at)?,
            ],
        )?;
    }

    Ok(())
}

/// Appends one punch correction record. The trail is append-only; existing
/// records are never touched.
fn insert_correction(
    tx: &Transaction<'_>,
    correction: &PunchCorrection,
) -> Result<(), PersistenceError> {
    tx.execute(
        "INSERT INTO punch_corrections
            (user_id, date, kind, old_recorded_at, new_recorded_at, approved_by, corrected_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            correction.user_id,
            encode_date(correction.date)?,
            correction.kind.as_str(),
            encode_datetime(correction.old_recorded_at)?,
            encode_datetime(correction.new_recorded_at)?,
            correction.approved_by,
            encode_datetime(correction.corrected_at)?,
        ],
    )?;
    Ok(())
}

/// Creates or replaces the lock record for a member's month.
fn upsert_lock(tx: &Transaction<'_>, lock: &RegistrationLock) -> Result<(), PersistenceError> {
    let unlocked_at: Option<String> = match lock.unlocked_at {
        Some(at) => Some(encode_datetime(at)?),
        None => None,
    };
    tx.execute(
        "INSERT INTO registration_locks (user_id, year, month, is_unlocked, unlocked_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(user_id, year, month)
         DO UPDATE SET is_unlocked = excluded.is_unlocked,
                       unlocked_at = excluded.unlocked_at",
        params![
            lock.user_id,
            lock.year,
            u8::from(lock.month),
            lock.is_unlocked,
            unlocked_at,
        ],
    )?;
    Ok(())
}

/// Stores the settings record.
fn store_settings(tx: &Transaction<'_>, settings: &SystemSettings) -> Result<(), PersistenceError> {
    tx.execute(
        "INSERT INTO system_settings (id, registration_deadline_day, timezone)
         VALUES (1, ?1, ?2)
         ON CONFLICT(id)
         DO UPDATE SET registration_deadline_day = excluded.registration_deadline_day,
                       timezone = excluded.timezone",
        params![settings.registration_deadline_day(), settings.timezone()],
    )?;
    Ok(())
}

/// Returns the encoded first and last dates of a calendar month.
fn month_bounds(year: i32, month: time::Month) -> Result<(String, String), PersistenceError> {
    let first: Date = Date::from_calendar_date(year, month, 1)
        .map_err(|e| PersistenceError::Other(format!("Invalid month bounds: {e}")))?;
    let last: Date = Date::from_calendar_date(year, month, month.length(year))
        .map_err(|e| PersistenceError::Other(format!("Invalid month bounds: {e}")))?;
    Ok((encode_date(first)?, encode_date(last)?))
}
