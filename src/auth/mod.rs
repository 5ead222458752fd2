//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! JSON body
//!     → credentials.rs (lenient field extraction)
//!     → store.rs (CredentialStore::verify / is_reserved)
//!     → bool decision handed back to the handler
//! ```
//!
//! No sessions, tokens or hashing: a decision is made per request and
//! nothing is remembered.

pub mod credentials;
pub mod store;

pub use credentials::Credentials;
pub use store::{CredentialStore, InMemoryCredentialStore, SwappableCredentialStore};
