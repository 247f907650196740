// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use rota::CoreError;
use rota_domain::DomainError;
use rota_persistence::PersistenceError;

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API
/// contract. Expected business conditions (no permission, closed
/// registration window) are values of this type, never panics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// The actor does not have permission for the attempted action.
    PermissionDenied {
        /// The action that was attempted.
        action: String,
    },
    /// The registration window refused the shift mutation.
    RegistrationDenied {
        /// The machine-readable denial code, surfaced verbatim.
        code: String,
    },
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::PermissionDenied { action } => {
                write!(f, "Not authorized to {action}")
            }
            Self::RegistrationDenied { code } => {
                write!(f, "Registration window closed: {code}")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked
/// directly.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::InvalidName(msg) => ApiError::InvalidInput {
            field: String::from("name"),
            message: msg,
        },
        DomainError::InvalidLocation(msg) => ApiError::InvalidInput {
            field: String::from("location"),
            message: msg,
        },
        DomainError::InvalidShiftType(msg) => ApiError::InvalidInput {
            field: String::from("shift_type"),
            message: msg,
        },
        DomainError::InvalidShiftStatus(msg) => ApiError::InvalidInput {
            field: String::from("status"),
            message: msg,
        },
        DomainError::InvalidPunchKind(msg) => ApiError::InvalidInput {
            field: String::from("kind"),
            message: msg,
        },
        DomainError::InvalidShiftTimes { reason } => ApiError::InvalidInput {
            field: String::from("shift_times"),
            message: reason,
        },
        DomainError::InvalidBreakMinutes { minutes } => ApiError::InvalidInput {
            field: String::from("break_minutes"),
            message: format!("Invalid break minutes: {minutes}"),
        },
        DomainError::InvalidDeadlineDay { day } => ApiError::InvalidInput {
            field: String::from("deadline_day"),
            message: format!("Invalid registration deadline day: {day}. Must be between 1 and 31"),
        },
        DomainError::InvalidTimezone(name) => ApiError::InvalidInput {
            field: String::from("timezone"),
            message: format!("Invalid timezone: {name}"),
        },
        DomainError::InvalidCivilTime { reason } => ApiError::InvalidInput {
            field: String::from("datetime"),
            message: reason,
        },
        DomainError::InvalidMonth { month } => ApiError::InvalidInput {
            field: String::from("month"),
            message: format!("Invalid month: {month}. Must be between 1 and 12"),
        },
        DomainError::UnknownPermissionCategory(name) => ApiError::InvalidInput {
            field: String::from("category"),
            message: format!("Unknown permission category: {name}"),
        },
        DomainError::UnknownPermissionAction(name) => ApiError::InvalidInput {
            field: String::from("action"),
            message: format!("Unknown permission action: {name}"),
        },
        DomainError::UnknownPageAccess(name) => ApiError::InvalidInput {
            field: String::from("page_access"),
            message: format!("Unknown page access: {name}"),
        },
        DomainError::InvalidPermissionMatrix { reason } => ApiError::InvalidInput {
            field: String::from("permission_matrix"),
            message: reason,
        },
        DomainError::DuplicateShift { user_id, date } => ApiError::DomainRuleViolation {
            rule: String::from("one_shift_per_date"),
            message: format!("A shift already exists for user {user_id} on {date}"),
        },
        DomainError::DuplicatePunch {
            user_id,
            date,
            kind,
        } => ApiError::DomainRuleViolation {
            rule: String::from("one_punch_per_kind_per_date"),
            message: format!("A {kind} punch already exists for user {user_id} on {date}"),
        },
        DomainError::PunchNotFound {
            user_id,
            date,
            kind,
        } => ApiError::ResourceNotFound {
            resource_type: String::from("Punch"),
            message: format!("No {kind} punch exists for user {user_id} on {date}"),
        },
        DomainError::ShiftHasAttendance { user_id, date } => ApiError::DomainRuleViolation {
            rule: String::from("shift_delete_requires_no_attendance"),
            message: format!(
                "Shift for user {user_id} on {date} cannot be deleted: attendance is recorded"
            ),
        },
        DomainError::ShiftNotFound { user_id, date } => ApiError::ResourceNotFound {
            resource_type: String::from("Shift"),
            message: format!("No shift exists for user {user_id} on {date}"),
        },
        DomainError::PunchKindDisabled { user_id, kind } => ApiError::DomainRuleViolation {
            rule: String::from("punch_kind_enabled"),
            message: format!("Punch kind {kind} is disabled for user {user_id}"),
        },
        DomainError::MemberNotFound { user_id } => ApiError::ResourceNotFound {
            resource_type: String::from("Staff member"),
            message: format!("Staff member {user_id} is not known to the roster"),
        },
        DomainError::DateParseError { value, error } => ApiError::InvalidInput {
            field: String::from("date"),
            message: format!("Failed to parse date '{value}': {error}"),
        },
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked
/// directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::ScopeMismatch { reason } => ApiError::Internal {
            message: format!("Scope mismatch: {reason}"),
        },
        CoreError::Internal(msg) => ApiError::Internal {
            message: format!("Internal error: {msg}"),
        },
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound(what) => Self::ResourceNotFound {
                resource_type: String::from("Record"),
                message: what,
            },
            other => Self::Internal {
                message: other.to_string(),
            },
        }
    }
}
