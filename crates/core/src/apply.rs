// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::Command;
use crate::error::CoreError;
use crate::state::{AdminResult, RosterMetadata, State, TransitionResult};
use rota_audit::{Action, Actor, AuditEvent, Cause, PunchCorrection, RosterScope, StateSnapshot};
use rota_domain::{
    AttendanceEvent, DomainError, RegistrationLock, SystemSettings, validate_deadline_day,
    validate_shift,
};
use time::Date;

/// Applies a month-scoped command to the current state, producing a new
/// state and audit event.
///
/// Permission and registration-window gates run in the caller before this
/// function; `apply` enforces only the structural data invariants.
///
/// # Arguments
///
/// * `metadata` - The roster metadata (for member validation)
/// * `state` - The current state (immutable)
/// * `command` - The command to apply
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
///
/// # Returns
///
/// * `Ok(TransitionResult)` containing the new state and audit event
/// * `Err(CoreError)` if the command is invalid
///
/// # Errors
///
/// Returns an error if:
/// - The command violates a domain rule (duplicate shift or punch, missing
///   record, attendance blocking a delete)
/// - The command targets a member or date outside the supplied scope
#[allow(clippy::too_many_lines)]
pub fn apply(
    metadata: &RosterMetadata,
    state: &State,
    command: Command,
    actor: Actor,
    cause: Cause,
) -> Result<TransitionResult, CoreError> {
    match command {
        Command::RegisterShift { shift } => {
            check_scope(state, shift.user_id, shift.date)?;
            check_member(metadata, shift.user_id)?;
            validate_shift(&shift)?;

            // At most one shift per (user, date).
            if state.shift_on(shift.date).is_some() {
                return Err(CoreError::DomainViolation(DomainError::DuplicateShift {
                    user_id: shift.user_id,
                    date: shift.date,
                }));
            }

            let before: StateSnapshot = state.to_snapshot();

            let mut new_state: State = state.clone();
            let date: Date = shift.date;
            new_state.shifts.push(shift);
            new_state.shifts.sort_by_key(|s| s.date);

            let after: StateSnapshot = new_state.to_snapshot();
            let action: Action = Action::new(
                String::from("RegisterShift"),
                Some(format!("Registered shift on {date}")),
            );
            let audit_event: AuditEvent =
                AuditEvent::new(actor, cause, action, before, after, state.scope());

            Ok(TransitionResult {
                new_state,
                audit_event,
                correction: None,
            })
        }
        Command::UpdateShift { shift } => {
            check_scope(state, shift.user_id, shift.date)?;
            check_member(metadata, shift.user_id)?;
            validate_shift(&shift)?;

            if state.shift_on(shift.date).is_none() {
                return Err(CoreError::DomainViolation(DomainError::ShiftNotFound {
                    user_id: shift.user_id,
                    date: shift.date,
                }));
            }

            let before: StateSnapshot = state.to_snapshot();

            let date: Date = shift.date;
            let mut new_state: State = state.clone();
            new_state.shifts.retain(|s| s.date != date);
            new_state.shifts.push(shift);
            new_state.shifts.sort_by_key(|s| s.date);

            let after: StateSnapshot = new_state.to_snapshot();
            let action: Action = Action::new(
                String::from("UpdateShift"),
                Some(format!("Updated shift on {date}")),
            );
            let audit_event: AuditEvent =
                AuditEvent::new(actor, cause, action, before, after, state.scope());

            Ok(TransitionResult {
                new_state,
                audit_event,
                correction: None,
            })
        }
        Command::DeleteShift { user_id, date } => {
            check_scope(state, user_id, date)?;

            if state.shift_on(date).is_none() {
                return Err(CoreError::DomainViolation(DomainError::ShiftNotFound {
                    user_id,
                    date,
                }));
            }
            // A shift with recorded attendance is pay-relevant history.
            if state.has_attendance_on(date) {
                return Err(CoreError::DomainViolation(
                    DomainError::ShiftHasAttendance { user_id, date },
                ));
            }

            let before: StateSnapshot = state.to_snapshot();

            let mut new_state: State = state.clone();
            new_state.shifts.retain(|s| s.date != date);

            let after: StateSnapshot = new_state.to_snapshot();
            let action: Action = Action::new(
                String::from("DeleteShift"),
                Some(format!("Deleted shift on {date}")),
            );
            let audit_event: AuditEvent =
                AuditEvent::new(actor, cause, action, before, after, state.scope());

            Ok(TransitionResult {
                new_state,
                audit_event,
                correction: None,
            })
        }
        Command::RecordPunch {
            user_id,
            date,
            kind,
            recorded_at,
            forced,
        } => {
            check_scope(state, user_id, date)?;
            let member = check_member(metadata, user_id)?;

            if !member.accepts_punch(kind) {
                return Err(CoreError::DomainViolation(DomainError::PunchKindDisabled {
                    user_id,
                    kind: kind.as_str().to_string(),
                }));
            }
            // At most one punch per (user, date, kind); amendments go
            // through CorrectPunch.
            if state.punch_on(date, kind).is_some() {
                return Err(CoreError::DomainViolation(DomainError::DuplicatePunch {
                    user_id,
                    date,
                    kind: kind.as_str().to_string(),
                }));
            }

            let before: StateSnapshot = state.to_snapshot();

            let mut new_state: State = state.clone();
            new_state
                .events
                .push(AttendanceEvent::new(user_id, date, kind, recorded_at));

            let after: StateSnapshot = new_state.to_snapshot();
            let name: &str = if forced { "ForceClock" } else { "RecordPunch" };
            let action: Action = Action::new(
                String::from(name),
                Some(format!("{} on {date} at {recorded_at}", kind.as_str())),
            );
            let audit_event: AuditEvent =
                AuditEvent::new(actor, cause, action, before, after, state.scope());

            Ok(TransitionResult {
                new_state,
                audit_event,
                correction: None,
            })
        }
        Command::CorrectPunch {
            user_id,
            date,
            kind,
            new_recorded_at,
            approved_by,
            corrected_at,
        } => {
            check_scope(state, user_id, date)?;

            let Some(existing) = state.punch_on(date, kind) else {
                return Err(CoreError::DomainViolation(DomainError::PunchNotFound {
                    user_id,
                    date,
                    kind: kind.as_str().to_string(),
                }));
            };
            let old_recorded_at = existing.recorded_at;

            let before: StateSnapshot = state.to_snapshot();

            let mut new_state: State = state.clone();
            for event in &mut new_state.events {
                if event.date == date && event.kind == kind {
                    event.recorded_at = new_recorded_at;
                }
            }

            let correction: PunchCorrection = PunchCorrection::new(
                user_id,
                date,
                kind,
                old_recorded_at,
                new_recorded_at,
                approved_by,
                corrected_at,
            );

            let after: StateSnapshot = new_state.to_snapshot();
            let action: Action = Action::new(
                String::from("CorrectPunch"),
                Some(format!(
                    "{} on {date}: {old_recorded_at} -> {new_recorded_at}",
                    kind.as_str()
                )),
            );
            let audit_event: AuditEvent =
                AuditEvent::new(actor, cause, action, before, after, state.scope());

            Ok(TransitionResult {
                new_state,
                audit_event,
                correction: Some(correction),
            })
        }
        Command::GrantUnlock { .. } | Command::SetDeadlineDay { .. } => Err(CoreError::Internal(
            String::from("apply called with administrative command"),
        )),
    }
}

/// Applies an administrative command, producing the record to persist and an
/// audit event.
///
/// Administrative commands (`GrantUnlock`, `SetDeadlineDay`) operate on the
/// lock ledger and the settings record rather than month-scoped state.
///
/// # Arguments
///
/// * `metadata` - The roster metadata (for member validation and current
///   settings)
/// * `command` - The administrative command to apply
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
///
/// # Errors
///
/// Returns an error if:
/// - The command violates a domain rule (unknown member, day out of range)
/// - The command is not administrative
pub fn apply_admin(
    metadata: &RosterMetadata,
    command: Command,
    actor: Actor,
    cause: Cause,
) -> Result<AdminResult, CoreError> {
    match command {
        Command::GrantUnlock {
            user_id,
            year,
            month,
            granted_at,
        } => {
            check_member(metadata, user_id)?;

            let lock: RegistrationLock =
                RegistrationLock::unlocked(user_id, year, month, granted_at);

            let before: StateSnapshot = StateSnapshot::new(String::from("is_unlocked=false"));
            let after: StateSnapshot = StateSnapshot::new(format!(
                "is_unlocked=true,unlocked_at={granted_at}"
            ));
            let action: Action = Action::new(
                String::from("GrantUnlock"),
                Some(format!(
                    "Unlocked {year}-{:02} for user {user_id}",
                    u8::from(month)
                )),
            );
            let audit_event: AuditEvent = AuditEvent::new(
                actor,
                cause,
                action,
                before,
                after,
                RosterScope::new(user_id, year, month),
            );

            Ok(AdminResult {
                new_lock: Some(lock),
                new_settings: None,
                audit_event,
            })
        }
        Command::SetDeadlineDay { day } => {
            validate_deadline_day(day)?;

            let old_day: u8 = metadata.settings.registration_deadline_day();
            let new_settings: SystemSettings =
                SystemSettings::new(day, metadata.settings.timezone().to_string())?;

            let before: StateSnapshot =
                StateSnapshot::new(format!("registration_deadline_day={old_day}"));
            let after: StateSnapshot =
                StateSnapshot::new(format!("registration_deadline_day={day}"));
            let action: Action = Action::new(
                String::from("SetDeadlineDay"),
                Some(format!("Deadline day {old_day} -> {day}")),
            );
            // Settings changes are global; audit them against the reserved
            // system scope.
            let audit_event: AuditEvent = AuditEvent::new(
                actor,
                cause,
                action,
                before,
                after,
                RosterScope::new(0, 0, time::Month::January),
            );

            Ok(AdminResult {
                new_lock: None,
                new_settings: Some(new_settings),
                audit_event,
            })
        }
        _ => Err(CoreError::Internal(String::from(
            "apply_admin called with month-scoped command",
        ))),
    }
}

/// Validates that a command's member and date match the supplied state scope.
fn check_scope(state: &State, user_id: i64, date: Date) -> Result<(), CoreError> {
    if user_id != state.user_id {
        return Err(CoreError::ScopeMismatch {
            reason: format!(
                "Command targets user {user_id} but state is scoped to user {}",
                state.user_id
            ),
        });
    }
    if !state.contains_date(date) {
        return Err(CoreError::ScopeMismatch {
            reason: format!(
                "Date {date} is outside the scoped month {}-{:02}",
                state.year,
                u8::from(state.month)
            ),
        });
    }
    Ok(())
}

/// Validates that a member exists in the roster metadata.
fn check_member<'a>(
    metadata: &'a RosterMetadata,
    user_id: i64,
) -> Result<&'a rota_domain::StaffMember, CoreError> {
    metadata
        .member(user_id)
        .ok_or(CoreError::DomainViolation(DomainError::MemberNotFound {
            user_id,
        }))
}
