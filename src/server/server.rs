use anyhow::{Context, Result};
use std::{
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use tower_http::services::ServeDir;
use tracing::{error, info};

use axum::{extract::State, middleware, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;

use super::account_routes::make_account_routes;
use super::entertainment_routes::make_entertainment_routes;
use super::metrics::metrics_handler;
use super::statistics_routes::make_statistics_routes;
use super::{log_requests, state::ServerState, RequestsLoggingLevel, ServerConfig};
use crate::entertainment::{EntertainmentStore, PhotoStore};
use crate::statistics::{StatisticsQueryService, StatisticsRecomputer, StatisticsStore};
use crate::user::{UserManager, UserStore};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub server_time: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        server_time: chrono::Utc::now().to_rfc3339(),
    };
    Json(stats)
}

impl ServerState {
    fn new(
        config: ServerConfig,
        entertainment_store: Arc<dyn EntertainmentStore>,
        statistics_store: Arc<dyn StatisticsStore>,
        user_store: Arc<dyn UserStore>,
    ) -> ServerState {
        let statistics_recomputer = StatisticsRecomputer::new(
            entertainment_store.clone(),
            statistics_store,
            config.serialize_statistics_per_user,
        );
        ServerState {
            photo_store: Arc::new(PhotoStore::new(&config.uploads_dir)),
            statistics_query: StatisticsQueryService::new(statistics_recomputer.clone()),
            statistics_recomputer,
            user_manager: Arc::new(UserManager::new(user_store)),
            entertainment_store,
            start_time: Instant::now(),
            config,
        }
    }
}

pub fn make_app(
    config: ServerConfig,
    entertainment_store: Arc<dyn EntertainmentStore>,
    statistics_store: Arc<dyn StatisticsStore>,
    user_store: Arc<dyn UserStore>,
) -> Result<Router> {
    std::fs::create_dir_all(&config.uploads_dir).with_context(|| {
        format!(
            "Failed to create uploads directory {}",
            config.uploads_dir.display()
        )
    })?;
    let uploads_service = ServeDir::new(&config.uploads_dir);
    let state = ServerState::new(
        config,
        entertainment_store,
        statistics_store,
        user_store,
    );

    let home_router: Router = Router::new()
        .route("/", get(home))
        .with_state(state.clone());

    let app: Router = home_router
        .merge(make_account_routes(state.clone()))
        .merge(make_entertainment_routes(state.clone()))
        .merge(make_statistics_routes(state.clone()))
        .nest_service("/uploads", uploads_service)
        .layer(middleware::from_fn_with_state(state.clone(), log_requests));

    Ok(app)
}

fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

#[allow(clippy::too_many_arguments)]
pub async fn run_server(
    entertainment_store: Arc<dyn EntertainmentStore>,
    statistics_store: Arc<dyn StatisticsStore>,
    user_store: Arc<dyn UserStore>,
    requests_logging_level: RequestsLoggingLevel,
    port: u16,
    metrics_port: u16,
    uploads_dir: PathBuf,
    serialize_statistics_per_user: bool,
) -> Result<()> {
    let config = ServerConfig {
        requests_logging_level,
        port,
        metrics_port,
        uploads_dir,
        serialize_statistics_per_user,
    };
    let app = make_app(config, entertainment_store, statistics_store, user_store)?;

    let metrics_listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", metrics_port))?;
    tokio::spawn(async move {
        if let Err(err) = axum::serve(metrics_listener, make_metrics_app()).await {
            error!("Metrics server stopped: {}", err);
        }
    });

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Listening on {}", listener.local_addr()?);

    Ok(axum::serve(listener, app).await?)
}
