// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Serializable mirrors of the audit types plus the text encodings used for
//! dates and timestamps in the database.

use crate::error::PersistenceError;
use rota_audit::{Action, Actor, Cause, StateSnapshot};
use serde::{Deserialize, Serialize};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, PrimitiveDateTime};

/// Text encoding for civil dates (`2025-07-10`).
const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// Text encoding for civil date-times (`2025-07-10T09:00:00`).
const DATETIME_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

/// Serializable mirror of [`Actor`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorData {
    /// The actor's unique identifier.
    pub id: String,
    /// The type of actor.
    pub actor_type: String,
}

impl From<&Actor> for ActorData {
    fn from(actor: &Actor) -> Self {
        Self {
            id: actor.id.clone(),
            actor_type: actor.actor_type.clone(),
        }
    }
}

impl From<ActorData> for Actor {
    fn from(data: ActorData) -> Self {
        Self::new(data.id, data.actor_type)
    }
}

/// Serializable mirror of [`Cause`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CauseData {
    /// The cause's unique identifier.
    pub id: String,
    /// A description of the cause.
    pub description: String,
}

impl From<&Cause> for CauseData {
    fn from(cause: &Cause) -> Self {
        Self {
            id: cause.id.clone(),
            description: cause.description.clone(),
        }
    }
}

impl From<CauseData> for Cause {
    fn from(data: CauseData) -> Self {
        Self::new(data.id, data.description)
    }
}

/// Serializable mirror of [`Action`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionData {
    /// The action name.
    pub name: String,
    /// Optional details.
    pub details: Option<String>,
}

impl From<&Action> for ActionData {
    fn from(action: &Action) -> Self {
        Self {
            name: action.name.clone(),
            details: action.details.clone(),
        }
    }
}

impl From<ActionData> for Action {
    fn from(data: ActionData) -> Self {
        Self::new(data.name, data.details)
    }
}

/// Serializable mirror of [`StateSnapshot`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshotData {
    /// The snapshot rendering.
    pub data: String,
}

impl From<&StateSnapshot> for StateSnapshotData {
    fn from(snapshot: &StateSnapshot) -> Self {
        Self {
            data: snapshot.data.clone(),
        }
    }
}

impl From<StateSnapshotData> for StateSnapshot {
    fn from(data: StateSnapshotData) -> Self {
        Self::new(data.data)
    }
}

/// Encodes a civil date as its ISO 8601 text form.
///
/// # Errors
///
/// Returns an error if formatting fails.
pub fn encode_date(date: Date) -> Result<String, PersistenceError> {
    date.format(DATE_FORMAT)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

/// Decodes a civil date from its ISO 8601 text form.
///
/// # Errors
///
/// Returns an error if the stored text does not parse.
pub fn decode_date(text: &str) -> Result<Date, PersistenceError> {
    Date::parse(text, DATE_FORMAT)
        .map_err(|e| PersistenceError::CorruptRecord(format!("Bad date '{text}': {e}")))
}

/// Encodes a civil date-time as its ISO 8601 text form.
///
/// # Errors
///
/// Returns an error if formatting fails.
pub fn encode_datetime(datetime: PrimitiveDateTime) -> Result<String, PersistenceError> {
    datetime
        .format(DATETIME_FORMAT)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

/// Decodes a civil date-time from its ISO 8601 text form.
///
/// # Errors
///
/// Returns an error if the stored text does not parse.
pub fn decode_datetime(text: &str) -> Result<PrimitiveDateTime, PersistenceError> {
    PrimitiveDateTime::parse(text, DATETIME_FORMAT)
        .map_err(|e| PersistenceError::CorruptRecord(format!("Bad datetime '{text}': {e}")))
}
