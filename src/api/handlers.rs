//! HTTP API handlers.
//!
//! Every route keeps its own response shape; clients depend on them as-is.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::{error, info, warn};

use super::extract::LenientJson;
use crate::models::{Appointment, ContactMessage, LoginRequest, NewAppointment, NewContactMessage};
use crate::store::Store;

pub const BANNER: &str = "Contact desk backend is live";

/// Application state shared with handlers.
#[derive(Debug, Clone)]
pub struct AppState<S> {
    pub store: S,
    /// Shared secret for admin login; `None` rejects every attempt.
    pub admin_password: Option<Arc<str>>,
}

impl<S: Store> AppState<S> {
    pub fn new(store: S, admin_password: Option<String>) -> Self {
        Self {
            store,
            admin_password: admin_password.map(Arc::from),
        }
    }
}

/// `{success, message?}` used by appointments, login and deletes.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

/// `{status, message}` used by the contact form.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// `{error}` used by list endpoints.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
}

type Reply<T> = (StatusCode, Json<T>);

fn success() -> Reply<SuccessResponse> {
    (
        StatusCode::OK,
        Json(SuccessResponse {
            success: true,
            message: None,
        }),
    )
}

fn delete_failed() -> Reply<SuccessResponse> {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(SuccessResponse {
            success: false,
            message: Some("Database Error"),
        }),
    )
}

/// Parse a path id the way Postgres reads an `int4`: surrounding whitespace is
/// ignored, anything else that is not a 32-bit integer is rejected.
fn parse_row_id(raw: &str) -> Option<i32> {
    raw.trim_matches(|c: char| c.is_ascii_whitespace() || c == '\u{b}')
        .parse()
        .ok()
}

/// Liveness banner.
pub async fn root() -> &'static str {
    BANNER
}

pub async fn create_appointment<S: Store>(
    State(state): State<AppState<S>>,
    LenientJson(payload): LenientJson<NewAppointment>,
) -> Reply<SuccessResponse> {
    info!(name = ?payload.name, time = ?payload.time, "new appointment");

    match state.store.insert_appointment(payload).await {
        Ok(row) => {
            info!(id = row.id, "appointment saved");
            success()
        }
        Err(e) => {
            error!(error = %e, "failed to save appointment");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SuccessResponse {
                    success: false,
                    message: None,
                }),
            )
        }
    }
}

pub async fn create_contact<S: Store>(
    State(state): State<AppState<S>>,
    LenientJson(payload): LenientJson<NewContactMessage>,
) -> Reply<StatusResponse> {
    info!(
        name = ?payload.name,
        email = ?payload.email,
        message = ?payload.message,
        "new contact form submission"
    );

    match state.store.insert_contact_message(payload).await {
        Ok(row) => {
            info!(id = row.id, "contact message saved");
            (
                StatusCode::OK,
                Json(StatusResponse {
                    status: "success",
                    message: "Your message has been received and saved!",
                }),
            )
        }
        Err(e) => {
            error!(error = %e, "failed to save contact message");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(StatusResponse {
                    status: "error",
                    message: "Failed to save message to database.",
                }),
            )
        }
    }
}

pub async fn list_messages<S: Store>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<ContactMessage>>, Reply<ErrorResponse>> {
    state.store.list_contact_messages().await.map(Json).map_err(|e| {
        error!(error = %e, "failed to fetch messages");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Failed to fetch messages",
            }),
        )
    })
}

pub async fn login<S: Store>(
    State(state): State<AppState<S>>,
    LenientJson(payload): LenientJson<LoginRequest>,
) -> Reply<SuccessResponse> {
    let matches = match (state.admin_password.as_deref(), payload.password.as_deref()) {
        (Some(secret), Some(attempt)) => secret == attempt,
        _ => false,
    };

    if matches {
        success()
    } else {
        info!("admin login rejected");
        (
            StatusCode::UNAUTHORIZED,
            Json(SuccessResponse {
                success: false,
                message: Some("Invalid Password"),
            }),
        )
    }
}

pub async fn delete_message<S: Store>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Reply<SuccessResponse> {
    let Some(id) = parse_row_id(&id) else {
        warn!(id = %id, "invalid message id");
        return delete_failed();
    };

    match state.store.delete_contact_message(id).await {
        Ok(_) => success(),
        Err(e) => {
            error!(id, error = %e, "failed to delete message");
            delete_failed()
        }
    }
}

pub async fn list_appointments<S: Store>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<Appointment>>, Reply<ErrorResponse>> {
    match state.store.list_appointments().await {
        Ok(rows) => Ok(Json(rows)),
        // Bootstrap may still be running on first start.
        Err(e) if e.is_undefined_table() => Ok(Json(Vec::new())),
        Err(e) => {
            error!(error = %e, "failed to fetch appointments");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Database Error",
                }),
            ))
        }
    }
}

pub async fn delete_appointment<S: Store>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Reply<SuccessResponse> {
    let Some(id) = parse_row_id(&id) else {
        warn!(id = %id, "invalid appointment id");
        return delete_failed();
    };

    match state.store.delete_appointment(id).await {
        Ok(_) => success(),
        Err(e) => {
            error!(id, error = %e, "failed to delete appointment");
            delete_failed()
        }
    }
}
