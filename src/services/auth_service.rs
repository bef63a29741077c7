//! Domain service for authentication and user management.
//!
//! Handles registration, login, principal resolution, password changes, API
//! keys and the admin user directory.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::{ProfileChanges, User};
use crate::domain::{Principal, Role, UserId};

const USERNAME_MIN: usize = 6;
const USERNAME_MAX: usize = 24;
const PASSWORD_MIN: usize = 8;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0} is already taken")]
    Conflict(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Public view of an account. Never carries the hash or the API key.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: UserId,
    pub firstname: String,
    pub lastname: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            firstname: user.firstname,
            lastname: user.lastname,
            username: user.username,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Login result containing user info and API key.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub user: UserInfo,
    pub api_key: String,
}

/// Sign-up form.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub firstname: String,
    pub lastname: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

fn username_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").expect("Invalid regex"))
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex")
    })
}

pub fn validate_username(username: &str) -> Result<(), AuthError> {
    let len = username.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
        return Err(AuthError::Validation(format!(
            "Username must be between {USERNAME_MIN} and {USERNAME_MAX} characters"
        )));
    }
    if !username_regex().is_match(username) {
        return Err(AuthError::Validation(
            "Username can only contain letters, numbers, dots, hyphens and underscores"
                .to_string(),
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), AuthError> {
    if email.len() > 254 || !email_regex().is_match(email) {
        return Err(AuthError::Validation(format!("Invalid email address: {email}")));
    }
    Ok(())
}

/// At least eight characters with a letter and a digit.
pub fn validate_password_strength(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < PASSWORD_MIN {
        return Err(AuthError::Validation(format!(
            "Password must be at least {PASSWORD_MIN} characters"
        )));
    }
    if !password.chars().any(char::is_alphabetic) || !password.chars().any(|c| c.is_ascii_digit())
    {
        return Err(AuthError::Validation(
            "Password must contain at least one letter and one digit".to_string(),
        ));
    }
    Ok(())
}

/// Trims the names, then checks every field of the form.
pub fn validate_registration(form: &mut Registration) -> Result<(), AuthError> {
    form.firstname = form.firstname.trim().to_string();
    form.lastname = form.lastname.trim().to_string();
    form.username = form.username.trim().to_string();
    form.email = form.email.trim().to_string();

    if form.firstname.is_empty() || form.lastname.is_empty() {
        return Err(AuthError::Validation(
            "First and last name are required".to_string(),
        ));
    }

    validate_username(&form.username)?;
    validate_email(&form.email)?;
    validate_password_strength(&form.password)?;

    if form.password != form.confirm_password {
        return Err(AuthError::Validation("Passwords do not match".to_string()));
    }

    Ok(())
}

/// Fields a user may change on their profile. Absent fields stay as they are.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
}

impl ProfileUpdate {
    const fn is_empty(&self) -> bool {
        self.firstname.is_none()
            && self.lastname.is_none()
            && self.username.is_none()
            && self.email.is_none()
    }
}

impl From<ProfileUpdate> for ProfileChanges {
    fn from(update: ProfileUpdate) -> Self {
        Self {
            firstname: update.firstname,
            lastname: update.lastname,
            username: update.username,
            email: update.email,
        }
    }
}

/// Trims the present fields and applies the registration rules to them.
pub fn validate_profile_update(update: &mut ProfileUpdate) -> Result<(), AuthError> {
    for field in [
        &mut update.firstname,
        &mut update.lastname,
        &mut update.username,
        &mut update.email,
    ] {
        if let Some(value) = field {
            *value = value.trim().to_string();
        }
    }

    if update.is_empty() {
        return Err(AuthError::Validation("Nothing to update".to_string()));
    }
    if [&update.firstname, &update.lastname]
        .into_iter()
        .flatten()
        .any(String::is_empty)
    {
        return Err(AuthError::Validation(
            "First and last name cannot be empty".to_string(),
        ));
    }
    if let Some(username) = &update.username {
        validate_username(username)?;
    }
    if let Some(email) = &update.email {
        validate_email(email)?;
    }

    Ok(())
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates a USER account.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Validation`] if any field is malformed
    /// - [`AuthError::Conflict`] if the username or email is taken
    async fn register(&self, form: Registration) -> Result<UserInfo, AuthError>;

    /// Verifies credentials and returns user info with the API key.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if login fails.
    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError>;

    /// Resolves the principal behind a session.
    async fn principal_for_user(&self, user_id: UserId) -> Result<Option<Principal>, AuthError>;

    /// Resolves the principal owning an API key.
    async fn principal_for_api_key(&self, api_key: &str)
    -> Result<Option<Principal>, AuthError>;

    async fn me(&self, principal: &Principal) -> Result<UserInfo, AuthError>;

    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] if the current password is wrong, the
    /// confirmation differs or the new password is weak.
    async fn change_password(
        &self,
        principal: &Principal,
        current_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), AuthError>;

    async fn get_api_key(&self, principal: &Principal) -> Result<String, AuthError>;

    /// Regenerates the API key and returns the new one.
    async fn regenerate_api_key(&self, principal: &Principal) -> Result<String, AuthError>;

    /// Every account. Requires the user management capability.
    async fn list_users(&self, principal: &Principal) -> Result<Vec<UserInfo>, AuthError>;

    /// The caller's own account, or any account for an admin.
    async fn get_user(&self, principal: &Principal, id: UserId) -> Result<UserInfo, AuthError>;

    /// Changes names, username or email. Self or admin.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Validation`] if a field is malformed or nothing is set
    /// - [`AuthError::Conflict`] if another account holds the username or email
    async fn update_user(
        &self,
        principal: &Principal,
        id: UserId,
        update: ProfileUpdate,
    ) -> Result<UserInfo, AuthError>;

    /// Deletes an account and everything it owns. Self or admin.
    async fn delete_user(&self, principal: &Principal, id: UserId) -> Result<(), AuthError>;
}
