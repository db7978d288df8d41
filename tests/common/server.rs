//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own database and uploads directory.

use super::constants::*;
use super::fixtures::create_test_store_with_user;
use entertainment_tracker_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use entertainment_tracker_server::statistics::{StatisticsStore, UserStatistics};
use entertainment_tracker_server::tracker_store::SqliteTrackerStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with an isolated database
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// Store for direct database access in tests
    pub store: Arc<SqliteTrackerStore>,

    /// Id of the user seeded in the database
    pub user_id: usize,

    /// Where the server writes uploaded photos
    pub uploads_dir: PathBuf,

    // Private fields - keep resources alive until drop
    _temp_db_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port
    ///
    /// # Panics
    ///
    /// Panics if the database cannot be created, the port cannot be bound
    /// or the server doesn't become ready within timeout.
    pub async fn spawn() -> Self {
        Self::spawn_with(false).await
    }

    /// Same as [`TestServer::spawn`], with per-user serialization of statistics
    /// recomputes switched on or off.
    pub async fn spawn_with(serialize_statistics_per_user: bool) -> Self {
        let (temp_db_dir, store, user_id) =
            create_test_store_with_user().expect("Failed to create test database");
        let uploads_dir = temp_db_dir.path().join("uploads");

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            requests_logging_level: RequestsLoggingLevel::None,
            port,
            metrics_port: 0,
            uploads_dir: uploads_dir.clone(),
            serialize_statistics_per_user,
        };
        let app = make_app(config, store.clone(), store.clone(), store.clone())
            .expect("Failed to build app");

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            store,
            user_id,
            uploads_dir,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the home endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }

    /// Polls the stored statistics of the user until `accept` returns true.
    ///
    /// Mutations refresh the stored summary in a detached task, so tests that read the
    /// table right after a mutation go through here.
    ///
    /// # Panics
    ///
    /// Panics if no accepted row shows up within timeout.
    pub async fn wait_for_stored_statistics<F>(&self, user_id: usize, accept: F) -> UserStatistics
    where
        F: Fn(&UserStatistics) -> bool,
    {
        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(RECOMPUTE_TIMEOUT_MS);

        loop {
            let stored = self
                .store
                .get_statistics(user_id)
                .expect("Failed to read statistics");
            match stored {
                Some(statistics) if accept(&statistics) => return statistics,
                last => {
                    if start.elapsed() > timeout {
                        panic!(
                            "Statistics of user {} not refreshed within {}ms, last seen {:?}",
                            user_id, RECOMPUTE_TIMEOUT_MS, last
                        );
                    }
                    tokio::time::sleep(Duration::from_millis(RECOMPUTE_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
