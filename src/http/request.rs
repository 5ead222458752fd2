//! Request handling.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) when the client sent none
//! - Extract credentials from the JSON body without rejecting odd shapes
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Only a body that is not a JSON object is rejected; missing or
//!   mistyped fields are left for the handlers to treat as mismatches

use axum::{
    extract::{FromRequest, Request},
    http::{self, HeaderMap, HeaderValue},
    Json,
};
use serde_json::Value;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::auth::Credentials;
use crate::http::response::ApiError;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Read the request ID header, for log fields.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Credentials pulled from a JSON object body.
#[derive(Debug)]
pub struct CredentialsBody(pub Credentials);

impl<S> FromRequest<S> for CredentialsBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state).await?;
        match value {
            Value::Object(object) => Ok(Self(Credentials::from_json_object(&object))),
            _ => Err(ApiError::MalformedBody),
        }
    }
}
