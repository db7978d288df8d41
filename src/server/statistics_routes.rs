use super::metrics::record_error;
use super::response::{failure, success};
use super::state::ServerState;
use crate::statistics::StatisticsQueryService;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    routing::get,
    Router,
};
use tracing::error;

/// Recomputes the stored summary of the user, then answers with the summary and the
/// per-label distributions of their records.
async fn get_statistics(
    State(query_service): State<StatisticsQueryService>,
    Path(user_id): Path<usize>,
) -> Response {
    let result =
        tokio::task::spawn_blocking(move || query_service.query_statistics(user_id)).await;

    match result {
        Ok(Ok(view)) => success(None, Some(view)),
        Ok(Err(err)) => {
            error!("Failed to query statistics of user {}: {:#}", user_id, err);
            record_error("statistics_query", "statistics");
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load statistics",
            )
        }
        Err(err) => {
            error!("Statistics task of user {} panicked: {}", user_id, err);
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load statistics",
            )
        }
    }
}

pub fn make_statistics_routes(state: ServerState) -> Router {
    Router::new()
        .route("/statistics/{user_id}", get(get_statistics))
        .with_state(state)
}
