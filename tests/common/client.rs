//! HTTP client for end-to-end tests
//!
//! Wraps reqwest and provides one method per server endpoint.
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::multipart::{Form, Part};
use reqwest::Response;
use serde_json::json;
use std::time::Duration;

/// Fields of a record form. Unset fields are not sent at all.
#[derive(Default, Clone)]
pub struct RecordForm {
    pub user_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub rating: Option<String>,
    /// File name and content of the photo part.
    pub photo: Option<(String, Vec<u8>)>,
}

impl RecordForm {
    /// A form owned by `user_id` with the fields the statistics care about.
    pub fn rated(user_id: usize, genre: &str, status: &str, rating: f64) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            title: Some(format!("{} pick", genre)),
            genre: Some(genre.to_string()),
            category: Some("Movie".to_string()),
            status: Some(status.to_string()),
            rating: Some(rating.to_string()),
            ..Default::default()
        }
    }

    pub fn with_photo(mut self, file_name: &str, bytes: &[u8]) -> Self {
        self.photo = Some((file_name.to_string(), bytes.to_vec()));
        self
    }

    fn into_multipart(self) -> Form {
        let mut form = Form::new();
        let text_fields = [
            ("user_id", self.user_id),
            ("title", self.title),
            ("description", self.description),
            ("genre", self.genre),
            ("category", self.category),
            ("status", self.status),
            ("rating", self.rating),
        ];
        for (name, value) in text_fields {
            if let Some(value) = value {
                form = form.text(name, value);
            }
        }
        if let Some((file_name, bytes)) = self.photo {
            form = form.part("photo", Part::bytes(bytes).file_name(file_name));
        }
        form
    }
}

/// HTTP test client
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    // ========================================================================
    // Account Endpoints
    // ========================================================================

    /// POST /register
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Response {
        self.client
            .post(format!("{}/register", self.base_url))
            .json(&json!({
                "username": username,
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .expect("Register request failed")
    }

    /// POST /login
    pub async fn login(&self, email: &str, password: &str) -> Response {
        self.client
            .post(format!("{}/login", self.base_url))
            .json(&json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .expect("Login request failed")
    }

    /// PUT /update-user/{id}
    pub async fn update_user(
        &self,
        id: usize,
        username: &str,
        email: &str,
        password: Option<&str>,
    ) -> Response {
        self.client
            .put(format!("{}/update-user/{}", self.base_url, id))
            .json(&json!({
                "username": username,
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .expect("Update user request failed")
    }

    // ========================================================================
    // Entertainment Endpoints
    // ========================================================================

    /// GET /entertainments with the given query pairs
    pub async fn list_entertainments(&self, query: &[(&str, &str)]) -> Response {
        self.client
            .get(format!("{}/entertainments", self.base_url))
            .query(query)
            .send()
            .await
            .expect("List entertainments request failed")
    }

    /// GET /entertainments/{id}
    pub async fn get_entertainment(&self, id: usize) -> Response {
        self.client
            .get(format!("{}/entertainments/{}", self.base_url, id))
            .send()
            .await
            .expect("Get entertainment request failed")
    }

    /// POST /insert-entertainment
    pub async fn insert_entertainment(&self, form: RecordForm) -> Response {
        self.client
            .post(format!("{}/insert-entertainment", self.base_url))
            .multipart(form.into_multipart())
            .send()
            .await
            .expect("Insert entertainment request failed")
    }

    /// POST /insert-entertainment, returning the id of the stored record.
    ///
    /// # Panics
    ///
    /// Panics if the record is not stored.
    pub async fn insert_entertainment_id(&self, form: RecordForm) -> usize {
        let response = self.insert_entertainment(form).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let body: serde_json::Value = response.json().await.expect("Invalid JSON body");
        body["data"]["id"].as_u64().expect("Missing record id") as usize
    }

    /// PUT /update-entertainment/{id}
    pub async fn update_entertainment(&self, id: usize, form: RecordForm) -> Response {
        self.client
            .put(format!("{}/update-entertainment/{}", self.base_url, id))
            .multipart(form.into_multipart())
            .send()
            .await
            .expect("Update entertainment request failed")
    }

    /// DELETE /delete-entertainment/{id}
    pub async fn delete_entertainment(&self, id: usize) -> Response {
        self.client
            .delete(format!("{}/delete-entertainment/{}", self.base_url, id))
            .send()
            .await
            .expect("Delete entertainment request failed")
    }

    // ========================================================================
    // Statistics & Static Endpoints
    // ========================================================================

    /// GET /statistics/{user_id}
    pub async fn get_statistics(&self, user_id: usize) -> Response {
        self.client
            .get(format!("{}/statistics/{}", self.base_url, user_id))
            .send()
            .await
            .expect("Get statistics request failed")
    }

    /// GET /{path}, used for uploaded photos
    pub async fn get_path(&self, path: &str) -> Response {
        self.client
            .get(format!("{}/{}", self.base_url, path))
            .send()
            .await
            .expect("Get path request failed")
    }
}
