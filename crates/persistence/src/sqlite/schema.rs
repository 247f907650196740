// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use rusqlite::Connection;
use tracing::info;

use crate::error::PersistenceError;

/// Initializes the database schema.
///
/// # Arguments
///
/// * `conn` - The database connection to initialize
///
/// # Errors
///
/// Returns an error if schema creation fails.
pub fn initialize_schema(conn: &Connection) -> Result<(), PersistenceError> {
    info!("Initializing database schema");

    // Enable foreign key enforcement
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute_batch(
        "
        -- Role definitions: immutable-per-version permission documents
        CREATE TABLE IF NOT EXISTS roles (
            role_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            matrix_json TEXT NOT NULL,
            page_access_json TEXT NOT NULL
        );

        -- Staff directory
        CREATE TABLE IF NOT EXISTS staff_members (
            user_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            company_id INTEGER,
            role_id INTEGER NOT NULL,
            wake_up_enabled INTEGER NOT NULL DEFAULT 0 CHECK(wake_up_enabled IN (0, 1)),
            departure_enabled INTEGER NOT NULL DEFAULT 0 CHECK(departure_enabled IN (0, 1)),
            default_location TEXT NOT NULL DEFAULT '',
            FOREIGN KEY(role_id) REFERENCES roles(role_id)
        );

        CREATE INDEX IF NOT EXISTS idx_staff_members_company
            ON staff_members(company_id);

        -- Assignment edges: a manager listed by a member gains assigned scope
        CREATE TABLE IF NOT EXISTS staff_managers (
            user_id INTEGER NOT NULL,
            manager_id INTEGER NOT NULL,
            PRIMARY KEY (user_id, manager_id),
            FOREIGN KEY(user_id) REFERENCES staff_members(user_id),
            FOREIGN KEY(manager_id) REFERENCES staff_members(user_id)
        );

        CREATE INDEX IF NOT EXISTS idx_staff_managers_manager
            ON staff_managers(manager_id);

        -- Canonical shift rows: one per member per date
        CREATE TABLE IF NOT EXISTS shifts (
            shift_id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            date TEXT NOT NULL,
            start_time TEXT NOT NULL,
            end_time TEXT NOT NULL,
            break_minutes INTEGER NOT NULL,
            shift_type TEXT NOT NULL CHECK(shift_type IN ('REGULAR', 'SPOT')),
            location TEXT NOT NULL,
            status TEXT NOT NULL CHECK(status IN ('APPROVED', 'PENDING', 'REJECTED')),
            UNIQUE(user_id, date),
            FOREIGN KEY(user_id) REFERENCES staff_members(user_id)
        );

        CREATE INDEX IF NOT EXISTS idx_shifts_user_date
            ON shifts(user_id, date);

        -- Canonical punch rows: one per member per date per kind
        CREATE TABLE IF NOT EXISTS attendance_events (
            event_id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            date TEXT NOT NULL,
            kind TEXT NOT NULL
                CHECK(kind IN ('WAKE_UP', 'DEPARTURE', 'CLOCK_IN', 'CLOCK_OUT')),
            recorded_at TEXT NOT NULL,
            UNIQUE(user_id, date, kind),
            FOREIGN KEY(user_id) REFERENCES staff_members(user_id)
        );

        CREATE INDEX IF NOT EXISTS idx_attendance_events_user_date
            ON attendance_events(user_id, date);

        -- Append-only punch amendment trail
        CREATE TABLE IF NOT EXISTS punch_corrections (
            correction_id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            date TEXT NOT NULL,
            kind TEXT NOT NULL,
            old_recorded_at TEXT NOT NULL,
            new_recorded_at TEXT NOT NULL,
            approved_by INTEGER NOT NULL,
            corrected_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES staff_members(user_id)
        );

        -- Per-member, per-month registration overrides
        CREATE TABLE IF NOT EXISTS registration_locks (
            user_id INTEGER NOT NULL,
            year INTEGER NOT NULL,
            month INTEGER NOT NULL CHECK(month BETWEEN 1 AND 12),
            is_unlocked INTEGER NOT NULL DEFAULT 0 CHECK(is_unlocked IN (0, 1)),
            unlocked_at TEXT,
            PRIMARY KEY (user_id, year, month),
            FOREIGN KEY(user_id) REFERENCES staff_members(user_id)
        );

        -- Singleton settings row, lazily materialized with defaults
        CREATE TABLE IF NOT EXISTS system_settings (
            id INTEGER PRIMARY KEY CHECK(id = 1),
            registration_deadline_day INTEGER NOT NULL
                CHECK(registration_deadline_day BETWEEN 1 AND 31),
            timezone TEXT NOT NULL
        );

        -- Audit log
        CREATE TABLE IF NOT EXISTS audit_events (
            event_id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            year INTEGER NOT NULL,
            month INTEGER NOT NULL,
            actor_json TEXT NOT NULL,
            cause_json TEXT NOT NULL,
            action_json TEXT NOT NULL,
            before_snapshot_json TEXT NOT NULL,
            after_snapshot_json TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS idx_audit_events_scope
            ON audit_events(user_id, year, month, event_id);
        ",
    )?;

    Ok(())
}
