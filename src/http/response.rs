//! Response payloads and error mapping.
//!
//! # Responsibilities
//! - Define the `{"message": ...}` body shared by every endpoint
//! - Map each failure to its status code and fixed message
//! - Turn axum JSON rejections into the same JSON shape
//!
//! # Design Decisions
//! - Failures are values of `ApiError`; handlers never build error bodies
//! - Messages are fixed strings, clients match on them

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

pub const LOGIN_SUCCEEDED: &str = "Login bem-sucedido!";
pub const REGISTRATION_SUCCEEDED: &str = "Usuário registrado com sucesso!";

/// Body of every response from the auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Status code paired with a message body.
pub type MessageResponse = (StatusCode, Json<MessageBody>);

pub fn message(status: StatusCode, text: &str) -> MessageResponse {
    (status, Json(MessageBody::new(text)))
}

/// Every way a request can be refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Usuário ou senha incorretos.")]
    InvalidCredentials,
    #[error("Username already exists.")]
    UsernameTaken,
    #[error("Corpo da requisição inválido.")]
    MalformedBody,
    #[error("Content-Type deve ser application/json.")]
    UnsupportedMediaType,
    #[error("Corpo da requisição muito grande.")]
    PayloadTooLarge,
    #[error("Not found.")]
    NotFound,
    #[error("Tempo limite da requisição esgotado.")]
    RequestTimeout,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::UsernameTaken | ApiError::MalformedBody => StatusCode::BAD_REQUEST,
            ApiError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(MessageBody::new(self.to_string()))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected request body");
        match rejection.status() {
            StatusCode::UNSUPPORTED_MEDIA_TYPE => ApiError::UnsupportedMediaType,
            StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge,
            _ => ApiError::MalformedBody,
        }
    }
}
