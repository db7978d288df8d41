//! Entertainment Tracker Server Library
//!
//! Records of watched/read/played entertainment, user accounts, and per-user statistics
//! derived from the records. Exposed as a library for the integration tests.

pub mod config;
pub mod entertainment;
pub mod server;
pub mod sqlite_persistence;
pub mod statistics;
pub mod tracker_store;
pub mod user;

// Re-export commonly used types for convenience
pub use server::{run_server, RequestsLoggingLevel};
pub use tracker_store::SqliteTrackerStore;
