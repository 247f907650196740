// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use rota_domain::UserId;
use time::{Month, PrimitiveDateTime};

/// Represents the entity performing an action.
///
/// An actor is any identifiable entity that initiates a state change.
/// This could be a staff member, an administrator, or the system itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The type of actor (e.g., "staff", "admin", "system").
    pub actor_type: String,
}

impl Actor {
    /// Creates a new Actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `actor_type` - The type of actor
    #[must_use]
    pub const fn new(id: String, actor_type: String) -> Self {
        Self { id, actor_type }
    }
}

/// Represents the reason or trigger for an action.
///
/// A cause describes why a state change was initiated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cause {
    /// A unique identifier for this cause (e.g., request ID).
    pub id: String,
    /// A description of the cause.
    pub description: String,
}

impl Cause {
    /// Creates a new Cause.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this cause
    /// * `description` - A description of what triggered this action
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

/// Represents the specific action performed.
///
/// An action describes what state change occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// The name of the action (e.g., "`RegisterShift`", "`RecordPunch`").
    pub name: String,
    /// Optional additional details about the action.
    pub details: Option<String>,
}

impl Action {
    /// Creates a new Action.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the action
    /// * `details` - Optional additional details
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// The roster scope an audit event belongs to: one staff member's month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterScope {
    /// The staff member whose records changed.
    pub user_id: UserId,
    /// Calendar year of the affected month.
    pub year: i32,
    /// Calendar month.
    pub month: Month,
}

impl RosterScope {
    /// Creates a new `RosterScope`.
    #[must_use]
    pub const fn new(user_id: UserId, year: i32, month: Month) -> Self {
        Self {
            user_id,
            year,
            month,
        }
    }
}

/// A snapshot of scoped state at a point in time.
///
/// Captures a compact string rendering of the relevant state for audit
/// purposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSnapshot {
    /// A string representation of the state.
    pub data: String,
}

impl StateSnapshot {
    /// Creates a new `StateSnapshot`.
    ///
    /// # Arguments
    ///
    /// * `data` - A string representation of the state
    #[must_use]
    pub const fn new(data: String) -> Self {
        Self { data }
    }
}

/// An immutable audit event representing a state transition.
///
/// Every successful state change must produce exactly one audit event.
/// Audit events are immutable once created and capture:
/// - Who performed the action (actor)
/// - Why it was performed (cause)
/// - What action was performed (action)
/// - The state before and after the transition
/// - The roster scope the transition belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// The actor who initiated this state change.
    pub actor: Actor,
    /// The cause or reason for this state change.
    pub cause: Cause,
    /// The action that was performed.
    pub action: Action,
    /// The state before the transition.
    pub before: StateSnapshot,
    /// The state after the transition.
    pub after: StateSnapshot,
    /// The roster scope this event belongs to.
    pub scope: RosterScope,
}

impl AuditEvent {
    /// Creates a new `AuditEvent`.
    ///
    /// Once created, an audit event is immutable.
    ///
    /// # Arguments
    ///
    /// * `actor` - The actor who initiated the change
    /// * `cause` - The reason for the change
    /// * `action` - The action that was performed
    /// * `before` - The state before the transition
    /// * `after` - The state after the transition
    /// * `scope` - The roster scope the change belongs to
    #[must_use]
    pub const fn new(
        actor: Actor,
        cause: Cause,
        action: Action,
        before: StateSnapshot,
        after: StateSnapshot,
        scope: RosterScope,
    ) -> Self {
        Self {
            actor,
            cause,
            action,
            before,
            after,
            scope,
        }
    }
}

/// An append-only record of one punch timestamp amendment.
///
/// Corrections never overwrite each other; each amendment produces a new
/// record carrying the old and new timestamps and the approver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PunchCorrection {
    /// The staff member whose punch was amended.
    pub user_id: UserId,
    /// The civil date of the amended punch.
    pub date: time::Date,
    /// The punch kind that was amended.
    pub kind: rota_domain::PunchKind,
    /// The timestamp before the amendment.
    pub old_recorded_at: PrimitiveDateTime,
    /// The timestamp after the amendment.
    pub new_recorded_at: PrimitiveDateTime,
    /// The administrator who approved the amendment.
    pub approved_by: UserId,
    /// When the amendment was made.
    pub corrected_at: PrimitiveDateTime,
}

impl PunchCorrection {
    /// Creates a new `PunchCorrection`.
    ///
    /// Once created, a correction record is immutable.
    #[must_use]
    pub const fn new(
        user_id: UserId,
        date: time::Date,
        kind: rota_domain::PunchKind,
        old_recorded_at: PrimitiveDateTime,
        new_recorded_at: PrimitiveDateTime,
        approved_by: UserId,
        corrected_at: PrimitiveDateTime,
    ) -> Self {
        Self {
            user_id,
            date,
            kind,
            old_recorded_at,
            new_recorded_at,
            approved_by,
            corrected_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rota_domain::PunchKind;
    use time::macros::{date, datetime};

    fn sample_scope() -> RosterScope {
        RosterScope::new(42, 2025, Month::July)
    }

    #[test]
    fn test_actor_creation_requires_all_fields() {
        let actor: Actor = Actor::new(String::from("user-42"), String::from("staff"));

        assert_eq!(actor.id, "user-42");
        assert_eq!(actor.actor_type, "staff");
    }

    #[test]
    fn test_audit_event_creation_requires_all_fields() {
        let actor: Actor = Actor::new(String::from("user-42"), String::from("staff"));
        let cause: Cause = Cause::new(String::from("req-7"), String::from("Staff request"));
        let action: Action = Action::new(String::from("RegisterShift"), None);
        let before: StateSnapshot = StateSnapshot::new(String::from("shifts=0"));
        let after: StateSnapshot = StateSnapshot::new(String::from("shifts=1"));

        let event: AuditEvent = AuditEvent::new(
            actor.clone(),
            cause.clone(),
            action.clone(),
            before.clone(),
            after.clone(),
            sample_scope(),
        );

        assert_eq!(event.actor, actor);
        assert_eq!(event.cause, cause);
        assert_eq!(event.action, action);
        assert_eq!(event.before, before);
        assert_eq!(event.after, after);
        assert_eq!(event.scope, sample_scope());
    }

    #[test]
    fn test_audit_event_equality() {
        let make = || {
            AuditEvent::new(
                Actor::new(String::from("user-42"), String::from("staff")),
                Cause::new(String::from("req-7"), String::from("Staff request")),
                Action::new(String::from("RecordPunch"), Some(String::from("CLOCK_IN"))),
                StateSnapshot::new(String::from("punches=0")),
                StateSnapshot::new(String::from("punches=1")),
                sample_scope(),
            )
        };

        assert_eq!(make(), make());
    }

    #[test]
    fn test_punch_correction_captures_both_timestamps() {
        let correction: PunchCorrection = PunchCorrection::new(
            42,
            date!(2025 - 07 - 10),
            PunchKind::ClockIn,
            datetime!(2025 - 07 - 10 09:12:00),
            datetime!(2025 - 07 - 10 09:00:00),
            7,
            datetime!(2025 - 07 - 11 08:30:00),
        );

        assert_eq!(correction.old_recorded_at, datetime!(2025 - 07 - 10 09:12:00));
        assert_eq!(correction.new_recorded_at, datetime!(2025 - 07 - 10 09:00:00));
        assert_eq!(correction.approved_by, 7);
    }
}
