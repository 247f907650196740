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
#![allow(clippy::multiple_crate_versions)]

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use time::PrimitiveDateTime;
use tokio::sync::Mutex;
use tracing::{error, info};

use rota_api::{
    ApiError, AuthenticatedActor, CorrectPunchRequest, DeleteShiftRequest, GrantUnlockRequest,
    ListAccessibleMembersRequest, MonthlyAttendanceRequest, RecordPunchRequest,
    RegisterShiftRequest, RegisterShiftsBatchRequest, SetDeadlineDayRequest, UpdateShiftRequest,
    authenticate_stub, correct_punch, delete_shift, grant_unlock, list_accessible_members,
    monthly_attendance, record_punch, register_shift, register_shifts_batch, set_deadline_day,
    translate_domain_error, update_shift,
};
use rota_audit::Cause;
use rota_domain::civil_now;
use rota_persistence::SqlitePersistence;

/// ROTA Server - HTTP server for the ROTA staffing system
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory
    /// database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,
}

/// Application state shared across handlers.
///
/// This contains the persistence layer wrapped in a Mutex to allow safe
/// concurrent access.
#[derive(Clone)]
struct AppState {
    /// The persistence layer for roster data and audit events.
    persistence: Arc<Mutex<SqlitePersistence>>,
}

/// Error payload returned to clients.
#[derive(Debug, Serialize, Deserialize)]
struct ErrorBody {
    /// Human-readable error message.
    error: String,
}

/// Maps an API error to its HTTP status and payload.
fn error_response(err: &ApiError) -> Response {
    let status: StatusCode = match err {
        ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
        ApiError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
        ApiError::RegistrationDenied { .. } | ApiError::DomainRuleViolation { .. } => {
            StatusCode::CONFLICT
        }
        ApiError::InvalidInput { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
        ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!(%err, "Internal error while handling request");
    }
    (
        status,
        Json(ErrorBody {
            error: err.to_string(),
        }),
    )
        .into_response()
}

/// Resolves the acting staff member from the `x-actor-id` header.
///
/// Authentication proper (sessions, credentials) is outside this system;
/// the header carries an already-verified identity.
fn actor_id_from(headers: &HeaderMap) -> Result<i64, ApiError> {
    let value = headers
        .get("x-actor-id")
        .ok_or_else(|| ApiError::AuthenticationFailed {
            reason: String::from("Missing x-actor-id header"),
        })?;
    value
        .to_str()
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| ApiError::AuthenticationFailed {
            reason: String::from("Malformed x-actor-id header"),
        })
}

/// Projects the server's UTC clock into the declared civil timezone.
fn resolve_now(persistence: &mut SqlitePersistence) -> Result<PrimitiveDateTime, ApiError> {
    let settings = persistence.settings()?;
    civil_now(settings.timezone(), chrono::Utc::now()).map_err(translate_domain_error)
}

/// Builds a request-unique cause for the audit trail.
fn request_cause() -> Cause {
    let nanos: u128 = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos());
    Cause::new(format!("req-{nanos}"), String::from("HTTP request"))
}

/// Authenticates the actor and resolves the request's civil instant.
fn request_context(
    persistence: &mut SqlitePersistence,
    headers: &HeaderMap,
) -> Result<(AuthenticatedActor, PrimitiveDateTime), ApiError> {
    let actor_id: i64 = actor_id_from(headers)?;
    let actor: AuthenticatedActor = authenticate_stub(persistence, actor_id)?;
    let now: PrimitiveDateTime = resolve_now(persistence)?;
    Ok((actor, now))
}

async fn http_register_shift(
    AxumState(state): AxumState<AppState>,
    headers: HeaderMap,
    Json(request): Json<RegisterShiftRequest>,
) -> Response {
    let mut persistence = state.persistence.lock().await;
    let (actor, now) = match request_context(&mut persistence, &headers) {
        Ok(ctx) => ctx,
        Err(err) => return error_response(&err),
    };
    match register_shift(&mut persistence, request, &actor, request_cause(), now) {
        Ok(response) => Json(response).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn http_register_shifts_batch(
    AxumState(state): AxumState<AppState>,
    headers: HeaderMap,
    Json(request): Json<RegisterShiftsBatchRequest>,
) -> Response {
    let mut persistence = state.persistence.lock().await;
    let (actor, now) = match request_context(&mut persistence, &headers) {
        Ok(ctx) => ctx,
        Err(err) => return error_response(&err),
    };
    match register_shifts_batch(&mut persistence, request, &actor, &request_cause(), now) {
        Ok(response) => Json(response).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn http_update_shift(
    AxumState(state): AxumState<AppState>,
    headers: HeaderMap,
    Json(request): Json<UpdateShiftRequest>,
) -> Response {
    let mut persistence = state.persistence.lock().await;
    let (actor, now) = match request_context(&mut persistence, &headers) {
        Ok(ctx) => ctx,
        Err(err) => return error_response(&err),
    };
    match update_shift(&mut persistence, request, &actor, request_cause(), now) {
        Ok(response) => Json(response).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn http_delete_shift(
    AxumState(state): AxumState<AppState>,
    headers: HeaderMap,
    Json(request): Json<DeleteShiftRequest>,
) -> Response {
    let mut persistence = state.persistence.lock().await;
    let (actor, now) = match request_context(&mut persistence, &headers) {
        Ok(ctx) => ctx,
        Err(err) => return error_response(&err),
    };
    match delete_shift(&mut persistence, request, &actor, request_cause(), now) {
        Ok(response) => Json(response).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn http_record_punch(
    AxumState(state): AxumState<AppState>,
    headers: HeaderMap,
    Json(request): Json<RecordPunchRequest>,
) -> Response {
    let mut persistence = state.persistence.lock().await;
    let (actor, now) = match request_context(&mut persistence, &headers) {
        Ok(ctx) => ctx,
        Err(err) => return error_response(&err),
    };
    match record_punch(&mut persistence, request, &actor, request_cause(), now) {
        Ok(response) => Json(response).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn http_correct_punch(
    AxumState(state): AxumState<AppState>,
    headers: HeaderMap,
    Json(request): Json<CorrectPunchRequest>,
) -> Response {
    let mut persistence = state.persistence.lock().await;
    let (actor, now) = match request_context(&mut persistence, &headers) {
        Ok(ctx) => ctx,
        Err(err) => return error_response(&err),
    };
    match correct_punch(&mut persistence, request, &actor, request_cause(), now) {
        Ok(response) => Json(response).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn http_grant_unlock(
    AxumState(state): AxumState<AppState>,
    headers: HeaderMap,
    Json(request): Json<GrantUnlockRequest>,
) -> Response {
    let mut persistence = state.persistence.lock().await;
    let (actor, now) = match request_context(&mut persistence, &headers) {
        Ok(ctx) => ctx,
        Err(err) => return error_response(&err),
    };
    match grant_unlock(&mut persistence, request, &actor, request_cause(), now) {
        Ok(response) => Json(response).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn http_set_deadline_day(
    AxumState(state): AxumState<AppState>,
    headers: HeaderMap,
    Json(request): Json<SetDeadlineDayRequest>,
) -> Response {
    let mut persistence = state.persistence.lock().await;
    let (actor, _now) = match request_context(&mut persistence, &headers) {
        Ok(ctx) => ctx,
        Err(err) => return error_response(&err),
    };
    match set_deadline_day(&mut persistence, request, &actor, request_cause()) {
        Ok(response) => Json(response).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn http_monthly_attendance(
    AxumState(state): AxumState<AppState>,
    headers: HeaderMap,
    Path((user_id, year, month)): Path<(i64, i32, u8)>,
) -> Response {
    let mut persistence = state.persistence.lock().await;
    let (actor, now) = match request_context(&mut persistence, &headers) {
        Ok(ctx) => ctx,
        Err(err) => return error_response(&err),
    };
    let request = MonthlyAttendanceRequest {
        user_id,
        year,
        month,
    };
    match monthly_attendance(&mut persistence, request, &actor, now) {
        Ok(response) => Json(response).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn http_list_accessible_members(
    AxumState(state): AxumState<AppState>,
    headers: HeaderMap,
    Query(request): Query<ListAccessibleMembersRequest>,
) -> Response {
    let mut persistence = state.persistence.lock().await;
    let (actor, _now) = match request_context(&mut persistence, &headers) {
        Ok(ctx) => ctx,
        Err(err) => return error_response(&err),
    };
    match list_accessible_members(&mut persistence, &request, &actor) {
        Ok(response) => Json(response).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn http_health() -> Response {
    (StatusCode::OK, "ok").into_response()
}

/// Builds the application router.
fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(http_health))
        .route(
            "/shifts",
            post(http_register_shift)
                .put(http_update_shift)
                .delete(http_delete_shift),
        )
        .route("/shifts/batch", post(http_register_shifts_batch))
        .route("/punches", post(http_record_punch))
        .route("/punches/corrections", post(http_correct_punch))
        .route("/unlocks", post(http_grant_unlock))
        .route("/settings/deadline-day", put(http_set_deadline_day))
        .route(
            "/attendance/{user_id}/{year}/{month}",
            get(http_monthly_attendance),
        )
        .route("/members/accessible", get(http_list_accessible_members))
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Args = Args::parse();

    let persistence: SqlitePersistence = match &args.database {
        Some(path) => {
            info!(%path, "Opening database");
            SqlitePersistence::open(path)?
        }
        None => {
            info!("Using in-memory database");
            SqlitePersistence::new_in_memory()?
        }
    };

    let state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
    };
    let app: Router = build_router(state);

    let addr: String = format!("0.0.0.0:{}", args.port);
    info!(%addr, "Starting ROTA server");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
