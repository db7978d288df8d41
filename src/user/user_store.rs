use super::auth::PasswordCredentials;
use super::user_models::User;
use anyhow::Result;

pub trait UserCredentialsStore: Send + Sync {
    /// Returns Ok(None) if the user has no password set.
    fn get_password_credentials(&self, user_id: usize) -> Result<Option<PasswordCredentials>>;

    /// Sets the password credentials of a user, replacing any previous ones.
    fn set_password_credentials(&self, credentials: &PasswordCredentials) -> Result<()>;
}

pub trait UserStore: UserCredentialsStore + Send + Sync {
    /// Creates a new user and returns the user id.
    fn create_user(&self, username: &str, email: &str) -> Result<usize>;

    /// Returns Ok(None) if the user does not exist.
    fn get_user(&self, user_id: usize) -> Result<Option<User>>;

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Returns false if the user does not exist.
    fn update_user_profile(&self, user_id: usize, username: &str, email: &str) -> Result<bool>;
}
