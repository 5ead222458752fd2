//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!
//! On file change (--watch):
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → sent to the running server
//!     → credential store swapped atomically
//! ```
//!
//! # Design Decisions
//! - All fields have defaults, an empty file is a valid config
//! - Validation separates syntactic (serde) from semantic checks
//! - Only the credential accounts are hot-reloadable; listener and
//!   middleware settings need a restart

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AccountConfig, CredentialsConfig, ListenerConfig, ObservabilityConfig, SecurityConfig,
    ServiceConfig, TimeoutConfig,
};
pub use watcher::ConfigWatcher;
