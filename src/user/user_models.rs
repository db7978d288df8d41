//! User data models

use serde::Serialize;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: usize,
    pub username: String,
    pub email: String,
}
