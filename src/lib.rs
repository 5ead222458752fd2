//! Login Service Library
//!
//! A small JSON-over-HTTP service with two endpoints:
//! `POST /api/login` checks a username/password pair against the configured
//! accounts, and `POST /api/register` refuses configured usernames and
//! accepts everything else. Nothing is persisted, and no sessions or
//! tokens exist.

pub mod auth;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use auth::{CredentialStore, Credentials, InMemoryCredentialStore};
pub use config::ServiceConfig;
pub use http::ApiServer;
pub use lifecycle::Shutdown;
