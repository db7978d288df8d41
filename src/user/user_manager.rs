use super::{
    auth::{PasswordCredentials, TrackerHasher},
    user_models::User,
    UserStore,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum AccountError {
    #[error("{0}")]
    InvalidInput(&'static str),

    #[error("The {0} is already taken")]
    AlreadyTaken(&'static str),

    #[error("Wrong email or password")]
    InvalidCredentials,

    #[error("User not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub type AccountResult<T> = std::result::Result<T, AccountError>;

fn non_blank<'a>(value: &'a str, message: &'static str) -> AccountResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AccountError::InvalidInput(message));
    }
    Ok(trimmed)
}

pub struct UserManager {
    user_store: Arc<dyn UserStore>,
    hasher: TrackerHasher,
}

impl UserManager {
    pub fn new(user_store: Arc<dyn UserStore>) -> Self {
        Self {
            user_store,
            hasher: TrackerHasher::Argon2,
        }
    }

    fn ensure_available(
        &self,
        username: &str,
        email: &str,
        current_user: Option<usize>,
    ) -> AccountResult<()> {
        let taken_by_other = |user: Option<User>| match user {
            Some(user) => Some(user.id) != current_user,
            None => false,
        };
        if taken_by_other(self.user_store.get_user_by_username(username)?) {
            return Err(AccountError::AlreadyTaken("username"));
        }
        if taken_by_other(self.user_store.get_user_by_email(email)?) {
            return Err(AccountError::AlreadyTaken("email"));
        }
        Ok(())
    }

    /// Creates a user with a password and returns its id.
    pub fn register(&self, username: &str, email: &str, password: &str) -> AccountResult<usize> {
        let username = non_blank(username, "The username cannot be empty")?;
        let email = non_blank(email, "The email cannot be empty")?;
        if password.is_empty() {
            return Err(AccountError::InvalidInput("The password cannot be empty"));
        }
        self.ensure_available(username, email, None)?;

        let user_id = self.user_store.create_user(username, email)?;
        let credentials = PasswordCredentials::create(user_id, password, self.hasher.clone())?;
        self.user_store.set_password_credentials(&credentials)?;

        info!("Registered user {} with id {}", username, user_id);
        Ok(user_id)
    }

    /// Unknown emails and wrong passwords both give [`AccountError::InvalidCredentials`].
    pub fn login(&self, email: &str, password: &str) -> AccountResult<User> {
        let user = self
            .user_store
            .get_user_by_email(email.trim())?
            .ok_or(AccountError::InvalidCredentials)?;
        let credentials = self
            .user_store
            .get_password_credentials(user.id)?
            .ok_or(AccountError::InvalidCredentials)?;

        if !credentials.verify(password)? {
            return Err(AccountError::InvalidCredentials);
        }
        Ok(user)
    }

    /// Replaces username and email. A non-blank password replaces the current one too.
    pub fn update_user(
        &self,
        user_id: usize,
        username: &str,
        email: &str,
        password: Option<&str>,
    ) -> AccountResult<User> {
        let username = non_blank(username, "The username cannot be empty")?;
        let email = non_blank(email, "The email cannot be empty")?;
        if self.user_store.get_user(user_id)?.is_none() {
            return Err(AccountError::NotFound);
        }
        self.ensure_available(username, email, Some(user_id))?;

        if !self
            .user_store
            .update_user_profile(user_id, username, email)?
        {
            return Err(AccountError::NotFound);
        }

        if let Some(password) = password.filter(|p| !p.trim().is_empty()) {
            let credentials = PasswordCredentials::create(user_id, password, self.hasher.clone())?;
            self.user_store.set_password_credentials(&credentials)?;
            info!("Password of user {} updated", user_id);
        }

        Ok(User {
            id: user_id,
            username: username.to_string(),
            email: email.to_string(),
        })
    }
}
