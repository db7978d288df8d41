//! Registration, login and profile update.

use super::metrics::{record_error, record_login_attempt};
use super::response::{failure, success};
use super::state::GuardedUserManager;
use crate::user::AccountError;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use super::state::ServerState;

#[derive(Deserialize, Debug)]
struct RegisterBody {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterResponse {
    pub success: bool,
    pub message: &'static str,
    pub user_id: usize,
}

#[derive(Deserialize, Debug)]
struct LoginBody {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize, Debug)]
struct UpdateUserBody {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub password: Option<String>,
}

fn account_error_response(err: AccountError) -> Response {
    match err {
        AccountError::InvalidInput(_) => failure(StatusCode::BAD_REQUEST, err.to_string()),
        AccountError::AlreadyTaken(_) => failure(StatusCode::CONFLICT, err.to_string()),
        AccountError::InvalidCredentials => failure(StatusCode::UNAUTHORIZED, err.to_string()),
        AccountError::NotFound => failure(StatusCode::NOT_FOUND, err.to_string()),
        AccountError::Store(err) => {
            error!("Account operation failed: {:#}", err);
            record_error("account_store", "account");
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

async fn register(
    State(user_manager): State<GuardedUserManager>,
    Json(body): Json<RegisterBody>,
) -> Response {
    match user_manager.register(&body.username, &body.email, &body.password) {
        Ok(user_id) => Json(RegisterResponse {
            success: true,
            message: "Registration successful",
            user_id,
        })
        .into_response(),
        Err(err) => account_error_response(err),
    }
}

async fn login(
    State(user_manager): State<GuardedUserManager>,
    Json(body): Json<LoginBody>,
) -> Response {
    match user_manager.login(&body.email, &body.password) {
        Ok(user) => {
            record_login_attempt("success");
            success(Some("Login successful"), Some(user))
        }
        Err(err) => {
            record_login_attempt("failure");
            account_error_response(err)
        }
    }
}

async fn update_user(
    State(user_manager): State<GuardedUserManager>,
    Path(id): Path<usize>,
    Json(body): Json<UpdateUserBody>,
) -> Response {
    let password_changed = body
        .password
        .as_deref()
        .map(|p| !p.trim().is_empty())
        .unwrap_or(false);
    match user_manager.update_user(id, &body.username, &body.email, body.password.as_deref()) {
        Ok(user) => {
            let message = if password_changed {
                "Profile and password updated"
            } else {
                "Profile updated"
            };
            success(Some(message), Some(user))
        }
        Err(err) => account_error_response(err),
    }
}

pub fn make_account_routes(state: ServerState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/update-user/{id}", put(update_user))
        .with_state(state)
}
