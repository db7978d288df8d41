//! End-to-end tests for account endpoints
//!
//! Tests registration, login and profile updates.

mod common;

use common::{TestClient, TestServer, TEST_EMAIL, TEST_PASS, TEST_USER};
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn test_login_with_valid_credentials() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.login(TEST_EMAIL, TEST_PASS).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["id"].as_u64(), Some(server.user_id as u64));
    assert_eq!(body["data"]["username"], TEST_USER);
    assert!(body["data"].get("password").is_none());
}

#[tokio::test]
async fn test_login_failures_share_one_message() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let wrong_password = client.login(TEST_EMAIL, "wrong_password").await;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    let wrong_password: Value = wrong_password.json().await.unwrap();

    let unknown_email = client.login("nobody@example.com", TEST_PASS).await;
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    let unknown_email: Value = unknown_email.json().await.unwrap();

    assert_eq!(wrong_password["message"], unknown_email["message"]);
}

#[tokio::test]
async fn test_register_then_login() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.register("newbie", "newbie@example.com", "s3cret").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    let user_id = body["userId"].as_u64().unwrap();
    assert_ne!(user_id, server.user_id as u64);

    let response = client.login("newbie@example.com", "s3cret").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_register_rejects_taken_and_blank_fields() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.register(TEST_USER, "other@example.com", "pw").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = client.register("other", TEST_EMAIL, "pw").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = client.register("", "blank@example.com", "pw").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_user_profile_and_password() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .update_user(server.user_id, "renamed", TEST_EMAIL, None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Profile updated");
    assert_eq!(body["data"]["username"], "renamed");

    // The password is untouched.
    let response = client.login(TEST_EMAIL, TEST_PASS).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .update_user(server.user_id, "renamed", TEST_EMAIL, Some("brand-new"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Profile and password updated");

    let response = client.login(TEST_EMAIL, TEST_PASS).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let response = client.login(TEST_EMAIL, "brand-new").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_update_missing_user() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .update_user(server.user_id + 100, "ghost", "ghost@example.com", None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
