//! SQLite persistence of users, entertainment records and statistics.

mod schema;
mod sqlite_tracker_store;

pub use schema::TRACKER_VERSIONED_SCHEMAS;
pub use sqlite_tracker_store::SqliteTrackerStore;
