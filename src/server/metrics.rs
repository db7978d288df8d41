use axum::{http::StatusCode, response::IntoResponse};
use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Encoder, Histogram, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;

/// Metric name prefix for all tracker metrics
const PREFIX: &str = "tracker";

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "endpoint", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
        &["method", "endpoint"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Account Metrics
    pub static ref LOGIN_ATTEMPTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_login_attempts_total"), "Total login attempts"),
        &["status"]
    ).expect("Failed to create login_attempts_total metric");

    // Statistics Metrics
    pub static ref STATISTICS_RECOMPUTES_TOTAL: CounterVec = CounterVec::new(
        Opts::new(
            format!("{PREFIX}_statistics_recomputes_total"),
            "Statistics recomputes by trigger and outcome"
        ),
        &["trigger", "outcome"]
    ).expect("Failed to create statistics_recomputes_total metric");

    pub static ref STATISTICS_RECOMPUTE_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            format!("{PREFIX}_statistics_recompute_duration_seconds"),
            "Statistics recompute duration in seconds"
        )
        .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0])
    ).expect("Failed to create statistics_recompute_duration_seconds metric");

    // Error Metrics
    pub static ref ERRORS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_errors_total"), "Total errors by type and endpoint"),
        &["error_type", "endpoint"]
    ).expect("Failed to create errors_total metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Already registered is fine, tests call this many times.
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(LOGIN_ATTEMPTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(STATISTICS_RECOMPUTES_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(STATISTICS_RECOMPUTE_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(ERRORS_TOTAL.clone()));

    tracing::info!("Metrics system initialized successfully");
}

/// Collapses a request path into a bounded set of endpoint labels, so that record
/// and user ids do not end up in metric labels.
pub fn categorize_endpoint(path: &str) -> &'static str {
    let first = path.trim_start_matches('/').split('/').next().unwrap_or("");
    match first {
        "" => "home",
        "register" => "register",
        "login" => "login",
        "update-user" => "update_user",
        "entertainments" => "entertainments",
        "insert-entertainment" => "insert_entertainment",
        "update-entertainment" => "update_entertainment",
        "delete-entertainment" => "delete_entertainment",
        "statistics" => "statistics",
        "uploads" => "uploads",
        _ => "other",
    }
}

/// Record an HTTP request
pub fn record_http_request(method: &str, endpoint: &str, status: u16, duration: Duration) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, endpoint, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, endpoint])
        .observe(duration.as_secs_f64());
}

/// Record a login attempt
pub fn record_login_attempt(status: &str) {
    LOGIN_ATTEMPTS_TOTAL.with_label_values(&[status]).inc();
}

/// Record a statistics recompute. `trigger` is either "mutation" or "query".
pub fn record_statistics_recompute(trigger: &str, success: bool, duration: Duration) {
    let outcome = if success { "success" } else { "failure" };
    STATISTICS_RECOMPUTES_TOTAL
        .with_label_values(&[trigger, outcome])
        .inc();

    STATISTICS_RECOMPUTE_DURATION_SECONDS.observe(duration.as_secs_f64());
}

/// Record an error
pub fn record_error(error_type: &str, endpoint: &str) {
    ERRORS_TOTAL
        .with_label_values(&[error_type, endpoint])
        .inc();
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_default();
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}
