//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware: request ID, trace, timeout, CORS)
//!     → request.rs (request ID, credentials extraction)
//!     → handlers.rs (login / register / health)
//!     → auth::CredentialStore (decision)
//!     → response.rs (status + {"message"} body)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{CredentialsBody, MakeRequestUuid, X_REQUEST_ID};
pub use response::{ApiError, MessageBody};
pub use server::{build_router, ApiServer, AppState};
