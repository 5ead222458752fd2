//! Endpoint handlers.

use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};
use serde::Serialize;

use crate::http::request::{request_id, CredentialsBody};
use crate::http::response::{
    message, ApiError, MessageResponse, LOGIN_SUCCEEDED, REGISTRATION_SUCCEEDED,
};
use crate::http::server::AppState;

/// `POST /api/login`
///
/// 200 when the pair matches a configured account, 401 otherwise. Nothing
/// is issued on success: no session, no token.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    CredentialsBody(credentials): CredentialsBody,
) -> Result<MessageResponse, ApiError> {
    let request_id = request_id(&headers);

    if state.store.verify(&credentials) {
        tracing::info!(
            request_id = %request_id,
            username = ?credentials.username(),
            "Login succeeded"
        );
        Ok(message(StatusCode::OK, LOGIN_SUCCEEDED))
    } else {
        tracing::warn!(
            request_id = %request_id,
            username = ?credentials.username(),
            "Login rejected"
        );
        Err(ApiError::InvalidCredentials)
    }
}

/// `POST /api/register`
///
/// 400 for a reserved username, 201 for anything else. The password is
/// never looked at and nothing is stored.
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    CredentialsBody(credentials): CredentialsBody,
) -> Result<MessageResponse, ApiError> {
    let request_id = request_id(&headers);

    if state.store.is_reserved(credentials.username()) {
        tracing::warn!(
            request_id = %request_id,
            username = ?credentials.username(),
            "Registration refused, username reserved"
        );
        return Err(ApiError::UsernameTaken);
    }

    tracing::info!(
        request_id = %request_id,
        username = ?credentials.username(),
        "Registration accepted"
    );
    Ok(message(StatusCode::CREATED, REGISTRATION_SUCCEEDED))
}

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
