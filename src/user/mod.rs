pub mod auth;
mod user_manager;
pub mod user_models;
mod user_store;

pub use auth::{PasswordCredentials, TrackerHasher};
pub use user_manager::{AccountError, AccountResult, UserManager};
pub use user_models::User;
pub use user_store::{UserCredentialsStore, UserStore};
