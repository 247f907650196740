// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.
//!
//! Every mutation follows the same shape: authorize against the permission
//! resolver, gate shift mutations through the registration window, translate
//! the request into a core command, apply it, and commit the transition with
//! its audit event.

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, PrimitiveDateTime, Time};
use tracing::info;

use rota::{Command, RosterMetadata, State, TransitionResult, apply, apply_admin};
use rota_audit::Cause;
use rota_domain::{
    AccessKind, PermissionAction, PermissionCategory, PunchKind, ReconcileWarning,
    ReconciledRange, Shift, ShiftType, StaffMember, SystemSettings, evaluate_registration_window,
    month_from_number, reconcile,
};
use rota_persistence::{SqlitePersistence, encode_date, encode_datetime, month_dates};

use crate::auth::AuthenticatedActor;
use crate::error::{ApiError, translate_core_error};
use crate::request_response::{
    BatchEntryOutcome, CorrectPunchRequest, CorrectPunchResponse, DayView, DeleteShiftRequest,
    DeleteShiftResponse, GrantUnlockRequest, GrantUnlockResponse, ListAccessibleMembersRequest,
    ListAccessibleMembersResponse, MonthlyAttendanceRequest, MonthlyAttendanceResponse,
    RecordPunchRequest, RecordPunchResponse, RegisterShiftRequest, RegisterShiftResponse,
    RegisterShiftsBatchRequest, RegisterShiftsBatchResponse, SetDeadlineDayRequest,
    SetDeadlineDayResponse, ShiftView, TotalsView, UpdateShiftRequest, UpdateShiftResponse,
};
use crate::resolver::RequestScope;

/// Registers a single shift.
///
/// This function:
/// - Verifies the actor may edit the target member's shifts
/// - Gates the target date through the registration window (the
///   force-register capability bypasses the window wholesale)
/// - Applies the command and commits the transition with its audit event
///
/// # Errors
///
/// Returns an error if the actor lacks permission, the window is closed, a
/// field is invalid, or a domain rule is violated.
pub fn register_shift(
    persistence: &mut SqlitePersistence,
    request: RegisterShiftRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: PrimitiveDateTime,
) -> Result<RegisterShiftResponse, ApiError> {
    let date: Date = parse_date_field("date", &request.date)?;

    let (can_edit, force): (bool, bool) = edit_and_force_flags(persistence, actor, request.user_id)?;
    if !can_edit {
        return Err(ApiError::PermissionDenied {
            action: format!("register a shift for user {}", request.user_id),
        });
    }
    if !force {
        enforce_window(persistence, request.user_id, date, now)?;
    }

    let metadata: RosterMetadata = persistence.load_metadata()?;
    let shift: Shift = build_shift(&metadata, &request, date)?;

    let state: State = persistence.load_month_state(request.user_id, date.year(), date.month())?;
    let result: TransitionResult = apply(
        &metadata,
        &state,
        Command::RegisterShift { shift },
        actor.to_audit_actor(),
        cause,
    )
    .map_err(translate_core_error)?;

    let event_id: i64 = persistence.commit_transition(&result)?;
    info!(
        event_id,
        user_id = request.user_id,
        date = %date,
        "Registered shift"
    );

    Ok(RegisterShiftResponse {
        user_id: request.user_id,
        date: request.date,
        message: format!("Shift registered for {date}"),
    })
}

/// Registers many shifts in one batch.
///
/// The batch commits in a single transaction. Entries are validated and
/// applied individually: a rejected entry (closed window, duplicate date,
/// invalid field) is reported in its outcome while the remaining entries
/// proceed. Duplicate (user, date) pairs within the batch are rejected
/// before any insert happens.
///
/// # Errors
///
/// Returns an error only for request-level failures (permission resolution
/// or the final commit); per-entry failures are reported in the outcomes.
#[allow(clippy::too_many_lines)]
pub fn register_shifts_batch(
    persistence: &mut SqlitePersistence,
    request: RegisterShiftsBatchRequest,
    actor: &AuthenticatedActor,
    cause: &Cause,
    now: PrimitiveDateTime,
) -> Result<RegisterShiftsBatchResponse, ApiError> {
    // Resolve permissions for the whole batch against one request scope.
    let mut edit_allowed: Vec<bool> = Vec::with_capacity(request.entries.len());
    let force: bool = {
        let mut scope: RequestScope<'_> = RequestScope::new(persistence);
        for entry in &request.entries {
            edit_allowed.push(scope.can_act_on(
                actor.user_id,
                entry.user_id,
                PermissionCategory::ShiftManagement,
                AccessKind::Edit,
            )?);
        }
        scope.has_capability(
            actor.user_id,
            PermissionCategory::ShiftManagement,
            PermissionAction::ForceRegister,
        )?
    };

    let metadata: RosterMetadata = persistence.load_metadata()?;

    // Apply entries sequentially, accumulating per-month state so intra-batch
    // duplicates are caught before any insert.
    let mut states: std::collections::HashMap<(i64, i32, u8), State> =
        std::collections::HashMap::new();
    let mut results: Vec<TransitionResult> = Vec::new();
    let mut outcomes: Vec<BatchEntryOutcome> = Vec::with_capacity(request.entries.len());

    for (index, entry) in request.entries.iter().enumerate() {
        let outcome_base = |ok: bool, message: Option<String>| BatchEntryOutcome {
            index,
            user_id: entry.user_id,
            date: entry.date.clone(),
            ok,
            message,
        };

        let applied: Result<TransitionResult, ApiError> = (|| {
            let date: Date = parse_date_field("date", &entry.date)?;
            if !edit_allowed[index] {
                return Err(ApiError::PermissionDenied {
                    action: format!("register a shift for user {}", entry.user_id),
                });
            }
            if !force {
                enforce_window(persistence, entry.user_id, date, now)?;
            }
            let shift: Shift = build_shift(&metadata, entry, date)?;

            let key: (i64, i32, u8) = (entry.user_id, date.year(), u8::from(date.month()));
            let state: State = match states.get(&key) {
                Some(state) => state.clone(),
                None => persistence.load_month_state(entry.user_id, date.year(), date.month())?,
            };

            let result: TransitionResult = apply(
                &metadata,
                &state,
                Command::RegisterShift { shift },
                actor.to_audit_actor(),
                cause.clone(),
            )
            .map_err(translate_core_error)?;

            states.insert(key, result.new_state.clone());
            Ok(result)
        })();

        match applied {
            Ok(result) => {
                results.push(result);
                outcomes.push(outcome_base(true, None));
            }
            Err(err) => outcomes.push(outcome_base(false, Some(err.to_string()))),
        }
    }

    // One transaction per batch: successes commit together.
    persistence.commit_transitions(&results)?;

    let succeeded: usize = outcomes.iter().filter(|o| o.ok).count();
    let failed: usize = outcomes.len() - succeeded;
    info!(succeeded, failed, "Committed shift batch");

    Ok(RegisterShiftsBatchResponse {
        outcomes,
        succeeded,
        failed,
    })
}

/// Updates the shift on a date.
///
/// # Errors
///
/// Returns an error if the actor lacks permission, the window is closed, a
/// field is invalid, or no shift exists on the date.
pub fn update_shift(
    persistence: &mut SqlitePersistence,
    request: UpdateShiftRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: PrimitiveDateTime,
) -> Result<UpdateShiftResponse, ApiError> {
    let date: Date = parse_date_field("date", &request.date)?;

    let (can_edit, force): (bool, bool) = edit_and_force_flags(persistence, actor, request.user_id)?;
    if !can_edit {
        return Err(ApiError::PermissionDenied {
            action: format!("edit shifts for user {}", request.user_id),
        });
    }
    if !force {
        enforce_window(persistence, request.user_id, date, now)?;
    }

    let metadata: RosterMetadata = persistence.load_metadata()?;
    let register_like: RegisterShiftRequest = RegisterShiftRequest {
        user_id: request.user_id,
        date: request.date.clone(),
        start_time: request.start_time.clone(),
        end_time: request.end_time.clone(),
        break_minutes: request.break_minutes,
        shift_type: request.shift_type.clone(),
        location: request.location.clone(),
    };
    let shift: Shift = build_shift(&metadata, &register_like, date)?;

    let state: State = persistence.load_month_state(request.user_id, date.year(), date.month())?;
    let result: TransitionResult = apply(
        &metadata,
        &state,
        Command::UpdateShift { shift },
        actor.to_audit_actor(),
        cause,
    )
    .map_err(translate_core_error)?;

    let event_id: i64 = persistence.commit_transition(&result)?;
    info!(event_id, user_id = request.user_id, date = %date, "Updated shift");

    Ok(UpdateShiftResponse {
        user_id: request.user_id,
        date: request.date,
        message: format!("Shift updated for {date}"),
    })
}

/// Deletes the shift on a date.
///
/// Deleting another member's shift additionally requires the delete
/// capability; members may delete their own shifts within the window.
///
/// # Errors
///
/// Returns an error if the actor lacks permission, the window is closed, or
/// attendance is already recorded on the date.
pub fn delete_shift(
    persistence: &mut SqlitePersistence,
    request: DeleteShiftRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: PrimitiveDateTime,
) -> Result<DeleteShiftResponse, ApiError> {
    let date: Date = parse_date_field("date", &request.date)?;

    let (can_edit, force, can_delete_others): (bool, bool, bool) = {
        let mut scope: RequestScope<'_> = RequestScope::new(persistence);
        let can_edit: bool = scope.can_act_on(
            actor.user_id,
            request.user_id,
            PermissionCategory::ShiftManagement,
            AccessKind::Edit,
        )?;
        let force: bool = scope.has_capability(
            actor.user_id,
            PermissionCategory::ShiftManagement,
            PermissionAction::ForceRegister,
        )?;
        let can_delete_others: bool = scope.has_capability(
            actor.user_id,
            PermissionCategory::ShiftManagement,
            PermissionAction::Delete,
        )?;
        (can_edit, force, can_delete_others)
    };

    if !can_edit || (request.user_id != actor.user_id && !can_delete_others) {
        return Err(ApiError::PermissionDenied {
            action: format!("delete shifts for user {}", request.user_id),
        });
    }
    if !force {
        enforce_window(persistence, request.user_id, date, now)?;
    }

    let metadata: RosterMetadata = persistence.load_metadata()?;
    let state: State = persistence.load_month_state(request.user_id, date.year(), date.month())?;
    let result: TransitionResult = apply(
        &metadata,
        &state,
        Command::DeleteShift {
            user_id: request.user_id,
            date,
        },
        actor.to_audit_actor(),
        cause,
    )
    .map_err(translate_core_error)?;

    let event_id: i64 = persistence.commit_transition(&result)?;
    info!(event_id, user_id = request.user_id, date = %date, "Deleted shift");

    Ok(DeleteShiftResponse {
        user_id: request.user_id,
        date: request.date,
        message: format!("Shift deleted for {date}"),
    })
}

/// Records an attendance punch.
///
/// Staff punch for themselves; recording for another member requires the
/// force-clock capability and is audited as a forced punch.
///
/// # Errors
///
/// Returns an error if the actor lacks permission, the punch kind is
/// disabled for the member, or a punch of this kind already exists.
pub fn record_punch(
    persistence: &mut SqlitePersistence,
    request: RecordPunchRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: PrimitiveDateTime,
) -> Result<RecordPunchResponse, ApiError> {
    let date: Date = parse_date_field("date", &request.date)?;
    let kind: PunchKind =
        PunchKind::parse(&request.kind).map_err(crate::error::translate_domain_error)?;
    let recorded_at: PrimitiveDateTime = match &request.recorded_at {
        Some(text) => parse_datetime_field("recorded_at", text)?,
        None => now,
    };

    let forced: bool = request.user_id != actor.user_id;
    if forced {
        let allowed: bool = {
            let mut scope: RequestScope<'_> = RequestScope::new(persistence);
            scope.has_capability(
                actor.user_id,
                PermissionCategory::AttendanceManagement,
                PermissionAction::ForceClock,
            )?
        };
        if !allowed {
            return Err(ApiError::PermissionDenied {
                action: format!("record punches for user {}", request.user_id),
            });
        }
    }

    let metadata: RosterMetadata = persistence.load_metadata()?;
    let state: State = persistence.load_month_state(request.user_id, date.year(), date.month())?;
    let result: TransitionResult = apply(
        &metadata,
        &state,
        Command::RecordPunch {
            user_id: request.user_id,
            date,
            kind,
            recorded_at,
            forced,
        },
        actor.to_audit_actor(),
        cause,
    )
    .map_err(translate_core_error)?;

    let event_id: i64 = persistence.commit_transition(&result)?;
    info!(
        event_id,
        user_id = request.user_id,
        kind = kind.as_str(),
        forced,
        "Recorded punch"
    );

    Ok(RecordPunchResponse {
        user_id: request.user_id,
        date: request.date,
        kind: String::from(kind.as_str()),
        recorded_at: encode_datetime(recorded_at)?,
        message: format!("{} recorded for {date}", kind.as_str()),
    })
}

/// Amends a recorded punch timestamp, leaving an append-only correction
/// record naming the approver.
///
/// # Errors
///
/// Returns an error if the actor lacks the correction capability or the
/// punch does not exist.
pub fn correct_punch(
    persistence: &mut SqlitePersistence,
    request: CorrectPunchRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: PrimitiveDateTime,
) -> Result<CorrectPunchResponse, ApiError> {
    let date: Date = parse_date_field("date", &request.date)?;
    let kind: PunchKind =
        PunchKind::parse(&request.kind).map_err(crate::error::translate_domain_error)?;
    let new_recorded_at: PrimitiveDateTime =
        parse_datetime_field("new_recorded_at", &request.new_recorded_at)?;

    let allowed: bool = {
        let mut scope: RequestScope<'_> = RequestScope::new(persistence);
        scope.can_act_on(
            actor.user_id,
            request.user_id,
            PermissionCategory::AttendanceManagement,
            AccessKind::Edit,
        )? && scope.has_capability(
            actor.user_id,
            PermissionCategory::AttendanceManagement,
            PermissionAction::CorrectPunch,
        )?
    };
    if !allowed {
        return Err(ApiError::PermissionDenied {
            action: format!("correct punches for user {}", request.user_id),
        });
    }

    let metadata: RosterMetadata = persistence.load_metadata()?;
    let state: State = persistence.load_month_state(request.user_id, date.year(), date.month())?;
    let result: TransitionResult = apply(
        &metadata,
        &state,
        Command::CorrectPunch {
            user_id: request.user_id,
            date,
            kind,
            new_recorded_at,
            approved_by: actor.user_id,
            corrected_at: now,
        },
        actor.to_audit_actor(),
        cause,
    )
    .map_err(translate_core_error)?;

    let old_recorded_at: String = result
        .correction
        .as_ref()
        .map(|c| encode_datetime(c.old_recorded_at))
        .transpose()?
        .unwrap_or_default();

    let event_id: i64 = persistence.commit_transition(&result)?;
    info!(
        event_id,
        user_id = request.user_id,
        kind = kind.as_str(),
        "Corrected punch"
    );

    Ok(CorrectPunchResponse {
        user_id: request.user_id,
        date: request.date,
        kind: String::from(kind.as_str()),
        old_recorded_at,
        new_recorded_at: request.new_recorded_at,
        message: format!("{} corrected for {date}", kind.as_str()),
    })
}

/// Grants a one-hour registration unlock for a member's month.
///
/// # Errors
///
/// Returns an error if the actor lacks the unlock capability or the member
/// is unknown.
pub fn grant_unlock(
    persistence: &mut SqlitePersistence,
    request: GrantUnlockRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
    now: PrimitiveDateTime,
) -> Result<GrantUnlockResponse, ApiError> {
    let month = month_from_number(request.month).map_err(crate::error::translate_domain_error)?;

    let allowed: bool = {
        let mut scope: RequestScope<'_> = RequestScope::new(persistence);
        scope.has_capability(
            actor.user_id,
            PermissionCategory::SystemAdministration,
            PermissionAction::Unlock,
        )?
    };
    if !allowed {
        return Err(ApiError::PermissionDenied {
            action: format!("unlock registration for user {}", request.user_id),
        });
    }

    let metadata: RosterMetadata = persistence.load_metadata()?;
    let result = apply_admin(
        &metadata,
        Command::GrantUnlock {
            user_id: request.user_id,
            year: request.year,
            month,
            granted_at: now,
        },
        actor.to_audit_actor(),
        cause,
    )
    .map_err(translate_core_error)?;

    let event_id: i64 = persistence.commit_admin(&result)?;
    info!(
        event_id,
        user_id = request.user_id,
        year = request.year,
        month = request.month,
        "Granted registration unlock"
    );

    Ok(GrantUnlockResponse {
        user_id: request.user_id,
        year: request.year,
        month: request.month,
        unlocked_at: encode_datetime(now)?,
        message: format!(
            "Registration unlocked for {}-{:02} (valid one hour)",
            request.year, request.month
        ),
    })
}

/// Changes the monthly registration deadline day.
///
/// # Errors
///
/// Returns an error if the actor lacks the settings capability or the day is
/// out of range.
pub fn set_deadline_day(
    persistence: &mut SqlitePersistence,
    request: SetDeadlineDayRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<SetDeadlineDayResponse, ApiError> {
    let allowed: bool = {
        let mut scope: RequestScope<'_> = RequestScope::new(persistence);
        scope.has_capability(
            actor.user_id,
            PermissionCategory::SystemAdministration,
            PermissionAction::ManageSettings,
        )?
    };
    if !allowed {
        return Err(ApiError::PermissionDenied {
            action: String::from("change the registration deadline"),
        });
    }

    let metadata: RosterMetadata = persistence.load_metadata()?;
    let result = apply_admin(
        &metadata,
        Command::SetDeadlineDay { day: request.day },
        actor.to_audit_actor(),
        cause,
    )
    .map_err(translate_core_error)?;

    let event_id: i64 = persistence.commit_admin(&result)?;
    info!(event_id, day = request.day, "Changed registration deadline day");

    Ok(SetDeadlineDayResponse {
        day: request.day,
        message: format!("Registration deadline day set to {}", request.day),
    })
}

/// Builds one member's reconciled month: day records, totals, and observed
/// anomalies.
///
/// # Errors
///
/// Returns an error if the actor may not view the member or a stored row is
/// invalid.
pub fn monthly_attendance(
    persistence: &mut SqlitePersistence,
    request: MonthlyAttendanceRequest,
    actor: &AuthenticatedActor,
    now: PrimitiveDateTime,
) -> Result<MonthlyAttendanceResponse, ApiError> {
    let month = month_from_number(request.month).map_err(crate::error::translate_domain_error)?;

    let allowed: bool = {
        let mut scope: RequestScope<'_> = RequestScope::new(persistence);
        scope.can_act_on(
            actor.user_id,
            request.user_id,
            PermissionCategory::AttendanceManagement,
            AccessKind::View,
        )?
    };
    if !allowed {
        return Err(ApiError::PermissionDenied {
            action: format!("view attendance for user {}", request.user_id),
        });
    }

    let (from, to): (Date, Date) = month_dates(request.year, month)?;
    let shifts = persistence.shifts_in_range(request.user_id, from, to)?;
    let events = persistence.events_in_range(request.user_id, from, to)?;

    let reconciled: ReconciledRange = reconcile(&shifts, &events, now);

    let mut days: Vec<DayView> = Vec::with_capacity(reconciled.days.len());
    for day in &reconciled.days {
        days.push(DayView {
            date: encode_date(day.date)?,
            shift: day.shift.as_ref().map(shift_view).transpose()?,
            wake_up: day.wake_up.map(encode_datetime).transpose()?,
            departure: day.departure.map(encode_datetime).transpose()?,
            clock_in: day.clock_in.map(encode_datetime).transpose()?,
            clock_out: day.clock_out.map(encode_datetime).transpose()?,
            worked_minutes: day.worked_minutes,
            is_late: day.is_late,
            is_absent: day.is_absent,
        });
    }

    Ok(MonthlyAttendanceResponse {
        user_id: request.user_id,
        year: request.year,
        month: request.month,
        days,
        totals: TotalsView {
            worked_minutes: reconciled.totals.worked_minutes,
            worked_text: reconciled.totals.worked_text.clone(),
            work_days: reconciled.totals.work_days,
            late_count: reconciled.totals.late_count,
            absent_days: reconciled.totals.absent_days,
            scheduled_days: reconciled.totals.scheduled_days,
        },
        warnings: reconciled.warnings.iter().map(render_warning).collect(),
    })
}

/// Materializes the staff IDs the actor may reach for a category and access
/// kind, falling back to the actor alone when their role grants no
/// management scope.
///
/// # Errors
///
/// Returns an error if the category or kind is invalid or a directory read
/// fails.
pub fn list_accessible_members(
    persistence: &mut SqlitePersistence,
    request: &ListAccessibleMembersRequest,
    actor: &AuthenticatedActor,
) -> Result<ListAccessibleMembersResponse, ApiError> {
    let category: PermissionCategory = PermissionCategory::parse(&request.category)
        .map_err(crate::error::translate_domain_error)?;
    let kind: AccessKind = match request.kind.as_str() {
        "view" => AccessKind::View,
        "edit" => AccessKind::Edit,
        other => {
            return Err(ApiError::InvalidInput {
                field: String::from("kind"),
                message: format!("Unknown access kind: {other}"),
            });
        }
    };

    let mut scope: RequestScope<'_> = RequestScope::new(persistence);
    let mut user_ids: Vec<i64> = scope.accessible_user_ids(actor.user_id, category, kind)?;
    if user_ids.is_empty() {
        // Self-only fallback: a role without management scope still sees its
        // own record.
        user_ids.push(actor.user_id);
    }

    Ok(ListAccessibleMembersResponse { user_ids })
}

// ---- Shared helpers ----

/// Resolves the actor's edit access to a target plus their force-register
/// flag, against one request scope.
fn edit_and_force_flags(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    target: i64,
) -> Result<(bool, bool), ApiError> {
    let mut scope: RequestScope<'_> = RequestScope::new(persistence);
    let can_edit: bool = scope.can_act_on(
        actor.user_id,
        target,
        PermissionCategory::ShiftManagement,
        AccessKind::Edit,
    )?;
    let force: bool = scope.has_capability(
        actor.user_id,
        PermissionCategory::ShiftManagement,
        PermissionAction::ForceRegister,
    )?;
    Ok((can_edit, force))
}

/// Gates a shift mutation through the registration window, running the
/// idempotent relock write when an expired unlock is observed.
fn enforce_window(
    persistence: &mut SqlitePersistence,
    user_id: i64,
    target_date: Date,
    now: PrimitiveDateTime,
) -> Result<(), ApiError> {
    let settings: SystemSettings = persistence.settings()?;
    // An unlock is granted for the month it was issued in; the override
    // record to consult is the current month's, and the policy itself
    // decides whether the target date falls inside it.
    let today: Date = now.date();
    let lock = persistence.lock_record(user_id, today.year(), today.month())?;

    let decision = evaluate_registration_window(
        target_date,
        now,
        settings.registration_deadline_day(),
        lock.as_ref(),
    );

    if decision.relock_due() {
        persistence.expire_unlock_if_due(user_id, today.year(), today.month(), now)?;
    }

    match decision.denial() {
        None => Ok(()),
        Some(reason) => Err(ApiError::RegistrationDenied {
            code: String::from(reason.code()),
        }),
    }
}

/// Translates a shift request into a validated domain shift, defaulting the
/// location from the member's record.
fn build_shift(
    metadata: &RosterMetadata,
    request: &RegisterShiftRequest,
    date: Date,
) -> Result<Shift, ApiError> {
    let member: &StaffMember =
        metadata
            .member(request.user_id)
            .ok_or_else(|| ApiError::ResourceNotFound {
                resource_type: String::from("Staff member"),
                message: format!("Staff member {} is not known to the roster", request.user_id),
            })?;

    let start: Time = parse_time_field("start_time", &request.start_time)?;
    let end: Time = parse_time_field("end_time", &request.end_time)?;
    let shift_type: ShiftType =
        ShiftType::parse(&request.shift_type).map_err(crate::error::translate_domain_error)?;
    let location: String = request
        .location
        .clone()
        .unwrap_or_else(|| member.default_location.clone());

    Ok(Shift::new(
        request.user_id,
        date,
        PrimitiveDateTime::new(date, start),
        PrimitiveDateTime::new(date, end),
        request.break_minutes,
        shift_type,
        location,
    ))
}

/// Renders a reconciliation warning for the response side channel.
fn render_warning(warning: &ReconcileWarning) -> String {
    match warning {
        ReconcileWarning::DuplicatePunch {
            date,
            kind,
            discarded,
        } => format!(
            "Duplicate {} punches on {date}: kept the latest, discarded {discarded}",
            kind.as_str()
        ),
        ReconcileWarning::UnscheduledPunch { date } => {
            format!("Punches recorded on {date} without a shift")
        }
        ReconcileWarning::ClockOutWithoutClockIn { date } => {
            format!("Clock-out without clock-in on {date}")
        }
    }
}

/// Renders a shift for monthly views.
fn shift_view(shift: &Shift) -> Result<ShiftView, ApiError> {
    Ok(ShiftView {
        shift_id: shift.shift_id,
        date: encode_date(shift.date)?,
        start_time: encode_datetime(shift.start_time)?,
        end_time: encode_datetime(shift.end_time)?,
        break_minutes: shift.break_minutes,
        shift_type: String::from(shift.shift_type.as_str()),
        location: shift.location.clone(),
        status: String::from(shift.status.as_str()),
    })
}

/// Wire encoding for calendar date fields (`2025-07-10`).
const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// Wire encoding for time-of-day fields (`09:00:00`).
const TIME_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[hour]:[minute]:[second]");

/// Wire encoding for date-time fields (`2025-07-10T09:00:00`).
const DATETIME_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

/// Parses a calendar date field.
fn parse_date_field(field: &str, value: &str) -> Result<Date, ApiError> {
    Date::parse(value, DATE_FORMAT).map_err(|e| ApiError::InvalidInput {
        field: String::from(field),
        message: format!("Failed to parse date '{value}': {e}"),
    })
}

/// Parses a time-of-day field.
fn parse_time_field(field: &str, value: &str) -> Result<Time, ApiError> {
    Time::parse(value, TIME_FORMAT).map_err(|e| ApiError::InvalidInput {
        field: String::from(field),
        message: format!("Failed to parse time '{value}': {e}"),
    })
}

/// Parses a date-time field.
fn parse_datetime_field(field: &str, value: &str) -> Result<PrimitiveDateTime, ApiError> {
    PrimitiveDateTime::parse(value, DATETIME_FORMAT).map_err(|e| ApiError::InvalidInput {
        field: String::from(field),
        message: format!("Failed to parse datetime '{value}': {e}"),
    })
}
