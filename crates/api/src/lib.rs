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

mod auth;
mod error;
mod handlers;
mod request_response;
mod resolver;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, authenticate_stub};
pub use error::{ApiError, translate_core_error, translate_domain_error};
pub use handlers::{
    correct_punch, delete_shift, grant_unlock, list_accessible_members, monthly_attendance,
    record_punch, register_shift, register_shifts_batch, set_deadline_day, update_shift,
};
pub use request_response::{
    BatchEntryOutcome, CorrectPunchRequest, CorrectPunchResponse, DayView, DeleteShiftRequest,
    DeleteShiftResponse, GrantUnlockRequest, GrantUnlockResponse, ListAccessibleMembersRequest,
    ListAccessibleMembersResponse, MonthlyAttendanceRequest, MonthlyAttendanceResponse,
    RecordPunchRequest, RecordPunchResponse, RegisterShiftRequest, RegisterShiftResponse,
    RegisterShiftsBatchRequest, RegisterShiftsBatchResponse, SetDeadlineDayRequest,
    SetDeadlineDayResponse, ShiftView, TotalsView, UpdateShiftRequest, UpdateShiftResponse,
};
pub use resolver::{Directory, RequestScope};
