//! Connection and init-check core for MongoDB Atlas deployments.
//!
//! This crate provides the session type shared by atlaslink binaries: it
//! builds the DNS-seed-list connection URI from validated parameters,
//! enforces TLS on the derived client options, exposes lazy database and
//! collection handles, and answers the "can I safely initialize this
//! collection?" question through an ordered existence check.
//!
//! # Security Guarantees
//! - Passwords are held in zeroized buffers and consumed at connection time
//! - Credentials never appear in logs, errors, or `Debug` output
//! - Connection targets are redacted before display
//!
//! # Architecture
//! - One session per logical target collection, shareable across tasks
//! - A narrow probe trait over the driver for topology questions
//! - Comprehensive error handling with credential sanitization

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod session;

// Re-export commonly used types
pub use config::ConnectionConfig;
pub use error::{AtlasLinkError, Result, redact_connection_uri};
pub use logging::init_logging;
pub use models::InitCheck;
pub use session::{ClientSession, NamespaceProbe, evaluate_init_check};
