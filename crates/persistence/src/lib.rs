// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the ROTA staffing system.
//!
//! This crate stores the staff directory, roles, canonical shift and punch
//! rows, registration lock records, the settings singleton, the punch
//! correction trail, and the audit log. It is built on `rusqlite` with
//! foreign keys enforced and explicit transactions.
//!
//! ## Transaction discipline
//!
//! - Every mutation commits through one transaction
//! - Batch mutations share a single transaction per batch: individual record
//!   failures are skipped by the caller before persistence, successes are
//!   committed together
//! - The audit event and the canonical rows it describes always commit
//!   atomically

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod data_models;
mod error;
mod sqlite;

#[cfg(test)]
mod tests;

use rusqlite::{Connection, params};
use std::path::Path;
use time::{Date, Duration, Month, PrimitiveDateTime};
use tracing::{debug, info};

use rota::{AdminResult, RosterMetadata, State, TransitionResult};
use rota_audit::PunchCorrection;
use rota_domain::{
    AttendanceEvent, PermissionMatrix, RegistrationLock, RoleDefinition, Shift, StaffMember,
    SystemSettings, page_access_from_json,
};

pub use data_models::{encode_date, encode_datetime};
pub use error::PersistenceError;

/// `SQLite`-backed persistence for the roster.
pub struct SqlitePersistence {
    conn: Connection,
}

impl SqlitePersistence {
    /// Opens an in-memory database and initializes the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or schema bootstrap fails.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let conn: Connection = Connection::open_in_memory()
            .map_err(|e| PersistenceError::DatabaseConnectionFailed(e.to_string()))?;
        sqlite::schema::initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Opens (or creates) a database file and initializes the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or schema bootstrap fails.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let conn: Connection = Connection::open(path)
            .map_err(|e| PersistenceError::DatabaseConnectionFailed(e.to_string()))?;
        sqlite::schema::initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    // ---- Settings ----

    /// Reads the settings record, materializing the defaults on first
    /// access.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored values are invalid.
    pub fn settings(&mut self) -> Result<SystemSettings, PersistenceError> {
        sqlite::queries::get_settings(&self.conn)
    }

    // ---- Roles and staff ----

    /// Creates a role from its permission documents.
    ///
    /// Both documents are validated before the insert so that unknown
    /// capability names fail here rather than during request handling.
    ///
    /// # Errors
    ///
    /// Returns an error if a document is invalid or the insert fails.
    pub fn create_role(
        &mut self,
        name: &str,
        matrix_json: &str,
        page_access_json: &str,
    ) -> Result<i64, PersistenceError> {
        PermissionMatrix::from_json_str(matrix_json)?;
        let page_doc: serde_json::Value = serde_json::from_str(page_access_json)?;
        page_access_from_json(&page_doc)?;

        self.conn.execute(
            "INSERT INTO roles (name, matrix_json, page_access_json) VALUES (?1, ?2, ?3)",
            params![name, matrix_json, page_access_json],
        )?;
        let role_id: i64 = self.conn.last_insert_rowid();
        info!(role_id, name, "Created role");
        Ok(role_id)
    }

    /// Loads a role definition by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the role does not exist or its documents are
    /// invalid.
    pub fn role(&mut self, role_id: i64) -> Result<RoleDefinition, PersistenceError> {
        sqlite::queries::get_role(&self.conn, role_id)
    }

    /// Loads the role definition governing a staff member.
    ///
    /// # Errors
    ///
    /// Returns an error if the member or their role does not exist.
    pub fn role_for_member(&mut self, user_id: i64) -> Result<RoleDefinition, PersistenceError> {
        sqlite::queries::get_role_for_member(&self.conn, user_id)
    }

    /// Creates a staff member.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_member(
        &mut self,
        name: &str,
        company_id: Option<i64>,
        role_id: i64,
        wake_up_enabled: bool,
        departure_enabled: bool,
        default_location: &str,
    ) -> Result<i64, PersistenceError> {
        self.conn.execute(
            "INSERT INTO staff_members
                (name, company_id, role_id, wake_up_enabled, departure_enabled,
                 default_location)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                name,
                company_id,
                role_id,
                wake_up_enabled,
                departure_enabled,
                default_location,
            ],
        )?;
        let user_id: i64 = self.conn.last_insert_rowid();
        info!(user_id, name, "Created staff member");
        Ok(user_id)
    }

    /// Adds a manager edge: `manager_id` gains assigned scope over
    /// `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn add_manager(&mut self, user_id: i64, manager_id: i64) -> Result<(), PersistenceError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO staff_managers (user_id, manager_id) VALUES (?1, ?2)",
            params![user_id, manager_id],
        )?;
        Ok(())
    }

    /// Loads a staff member by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn member(&mut self, user_id: i64) -> Result<Option<StaffMember>, PersistenceError> {
        sqlite::queries::get_member(&self.conn, user_id)
    }

    /// Lists every staff member.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_members(&mut self) -> Result<Vec<StaffMember>, PersistenceError> {
        sqlite::queries::list_members(&self.conn)
    }

    /// Lists every staff member ID, ascending.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn all_user_ids(&mut self) -> Result<Vec<i64>, PersistenceError> {
        sqlite::queries::all_user_ids(&self.conn)
    }

    /// Lists the IDs of staff sharing a company (`None` selects internal
    /// staff).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn users_in_company(
        &mut self,
        company_id: Option<i64>,
    ) -> Result<Vec<i64>, PersistenceError> {
        sqlite::queries::users_in_company(&self.conn, company_id)
    }

    /// Lists the IDs of staff assigned to a manager.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn assigned_user_ids(&mut self, manager_id: i64) -> Result<Vec<i64>, PersistenceError> {
        sqlite::queries::assigned_user_ids(&self.conn, manager_id)
    }

    /// Builds the roster metadata consumed by the transition engine.
    ///
    /// # Errors
    ///
    /// Returns an error if any query fails.
    pub fn load_metadata(&mut self) -> Result<RosterMetadata, PersistenceError> {
        let members: Vec<StaffMember> = self.list_members()?;
        let settings: SystemSettings = self.settings()?;
        Ok(RosterMetadata::new(members, settings))
    }

    // ---- Shifts and punches ----

    /// Loads a member's shifts within an inclusive date range.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored row is invalid.
    pub fn shifts_in_range(
        &mut self,
        user_id: i64,
        from: Date,
        to: Date,
    ) -> Result<Vec<Shift>, PersistenceError> {
        sqlite::queries::shifts_in_range(&self.conn, user_id, from, to)
    }

    /// Loads a member's punches within an inclusive date range.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored row is invalid.
    pub fn events_in_range(
        &mut self,
        user_id: i64,
        from: Date,
        to: Date,
    ) -> Result<Vec<AttendanceEvent>, PersistenceError> {
        sqlite::queries::events_in_range(&self.conn, user_id, from, to)
    }

    /// Loads the scoped month state for the transition engine.
    ///
    /// # Errors
    ///
    /// Returns an error if any query fails or a stored row is invalid.
    pub fn load_month_state(
        &mut self,
        user_id: i64,
        year: i32,
        month: Month,
    ) -> Result<State, PersistenceError> {
        let (from, to): (Date, Date) = month_dates(year, month)?;
        let mut state: State = State::new(user_id, year, month);
        state.shifts = self.shifts_in_range(user_id, from, to)?;
        state.events = self.events_in_range(user_id, from, to)?;
        Ok(state)
    }

    /// Lists the punch correction trail for a member, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored row is invalid.
    pub fn corrections_for_member(
        &mut self,
        user_id: i64,
    ) -> Result<Vec<PunchCorrection>, PersistenceError> {
        sqlite::queries::corrections_for_member(&self.conn, user_id)
    }

    // ---- Registration locks ----

    /// Loads the registration override record for a member's month.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored row is invalid.
    pub fn lock_record(
        &mut self,
        user_id: i64,
        year: i32,
        month: Month,
    ) -> Result<Option<RegistrationLock>, PersistenceError> {
        sqlite::queries::get_lock_record(&self.conn, user_id, year, u8::from(month))
    }

    /// Relocks an unlock whose one-hour validity has elapsed.
    ///
    /// Idempotent: relocking an already-locked record (or one still within
    /// its validity) changes nothing. Returns whether a row was flipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn expire_unlock_if_due(
        &mut self,
        user_id: i64,
        year: i32,
        month: Month,
        now: PrimitiveDateTime,
    ) -> Result<bool, PersistenceError> {
        let cutoff: String = encode_datetime(now.saturating_sub(Duration::hours(1)))?;
        let flipped: usize = self.conn.execute(
            "UPDATE registration_locks
             SET is_unlocked = 0
             WHERE user_id = ?1 AND year = ?2 AND month = ?3
               AND is_unlocked = 1 AND unlocked_at IS NOT NULL AND unlocked_at <= ?4",
            params![user_id, year, u8::from(month), cutoff],
        )?;
        if flipped > 0 {
            debug!(user_id, year, month = u8::from(month), "Auto-relocked");
        }
        Ok(flipped > 0)
    }

    // ---- Transition commits ----

    /// Commits one transition result in its own transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails; nothing is written on failure.
    pub fn commit_transition(
        &mut self,
        result: &TransitionResult,
    ) -> Result<i64, PersistenceError> {
        let tx = self.conn.transaction()?;
        let event_id: i64 = sqlite::persistence::persist_transition(&tx, result)?;
        tx.commit()?;
        Ok(event_id)
    }

    /// Commits a batch of transition results in one transaction.
    ///
    /// The batch either commits as a whole or leaves the database untouched.
    /// Per-record validation failures are the caller's to filter before this
    /// point; by the time results reach here they have all been applied.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails; nothing is written on failure.
    pub fn commit_transitions(
        &mut self,
        results: &[TransitionResult],
    ) -> Result<Vec<i64>, PersistenceError> {
        let tx = self.conn.transaction()?;
        let mut event_ids: Vec<i64> = Vec::with_capacity(results.len());
        for result in results {
            event_ids.push(sqlite::persistence::persist_transition(&tx, result)?);
        }
        tx.commit()?;
        Ok(event_ids)
    }

    /// Commits one administrative result in its own transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails; nothing is written on failure.
    pub fn commit_admin(&mut self, result: &AdminResult) -> Result<i64, PersistenceError> {
        let tx = self.conn.transaction()?;
        let event_id: i64 = sqlite::persistence::persist_admin(&tx, result)?;
        tx.commit()?;
        Ok(event_id)
    }

    /// Counts audit events recorded for a member's month.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_audit_events(
        &mut self,
        user_id: i64,
        year: i32,
        month: Month,
    ) -> Result<i64, PersistenceError> {
        sqlite::queries::count_audit_events(&self.conn, user_id, year, u8::from(month))
    }
}

/// Returns the first and last dates of a calendar month.
///
/// # Errors
///
/// Returns an error if the month bounds cannot be constructed.
pub fn month_dates(year: i32, month: Month) -> Result<(Date, Date), PersistenceError> {
    let first: Date = Date::from_calendar_date(year, month, 1)
        .map_err(|e| PersistenceError::Other(format!("Invalid month bounds: {e}")))?;
    let last: Date = Date::from_calendar_date(year, month, month.length(year))
        .map_err(|e| PersistenceError::Other(format!("Invalid month bounds: {e}")))?;
    Ok((first, last))
}
