//! Test fixture creation
//!
//! Creates the temporary database used by each test server.

use super::constants::*;
use anyhow::Result;
use entertainment_tracker_server::tracker_store::SqliteTrackerStore;
use entertainment_tracker_server::user::UserManager;
use std::sync::Arc;
use tempfile::TempDir;

/// Creates a temporary directory holding a tracker database with one registered user.
///
/// Returns the directory, the opened store and the id of the seeded user.
pub fn create_test_store_with_user() -> Result<(TempDir, Arc<SqliteTrackerStore>, usize)> {
    let dir = TempDir::new()?;
    let store = Arc::new(SqliteTrackerStore::new(dir.path().join("tracker.db"))?);

    let user_manager = UserManager::new(store.clone());
    let user_id = user_manager.register(TEST_USER, TEST_EMAIL, TEST_PASS)?;

    Ok((dir, store, user_id))
}
