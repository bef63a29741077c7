//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;

use crate::config::SecurityConfig;
use crate::db::{NewUser, Store, User, is_unique_violation};
use crate::domain::{Capability, Principal, Role, UserId};
use crate::services::auth_service::{
    AuthError, AuthService, LoginResult, ProfileUpdate, Registration, UserInfo,
    validate_password_strength, validate_profile_update, validate_registration,
};

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    fn principal_of(user: User) -> Principal {
        Principal {
            user_id: user.id,
            username: user.username,
            role: user.role,
        }
    }

    /// Rejects a username or email already held by an account other than `except`.
    async fn ensure_identity_free(
        &self,
        username: &str,
        email: &str,
        except: Option<UserId>,
    ) -> Result<(), AuthError> {
        let (username_taken, email_taken) = self
            .store
            .user_identity_taken(username, email, except)
            .await?;
        if username_taken {
            return Err(AuthError::Conflict(format!("Username '{username}'")));
        }
        if email_taken {
            return Err(AuthError::Conflict(format!("Email '{email}'")));
        }
        Ok(())
    }

    async fn load_user(&self, id: UserId) -> Result<User, AuthError> {
        self.store
            .get_user(id)
            .await?
            .ok_or(AuthError::UserNotFound(id))
    }

    /// Validates the form and creates an account with the given role. Used by
    /// registration and by the `create-admin` command.
    pub async fn create_account(
        &self,
        mut form: Registration,
        role: Role,
    ) -> Result<UserInfo, AuthError> {
        validate_registration(&mut form)?;

        self.ensure_identity_free(&form.username, &form.email, None)
            .await?;

        let user = self
            .store
            .create_user(
                NewUser {
                    firstname: form.firstname,
                    lastname: form.lastname,
                    username: form.username,
                    email: form.email,
                    password: form.password,
                    role,
                },
                &self.security,
            )
            .await
            .map_err(identity_write_error)?;

        Ok(user.into())
    }
}

/// A concurrent write can claim a username or email between the check and the
/// insert; the unique index then decides.
fn identity_write_error(err: anyhow::Error) -> AuthError {
    if is_unique_violation(&err) {
        AuthError::Conflict("Username or email".to_string())
    } else {
        err.into()
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, form: Registration) -> Result<UserInfo, AuthError> {
        self.create_account(form, Role::User).await
    }

    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError> {
        if !self.store.verify_user_password(username, password).await? {
            tracing::warn!("Failed login attempt for '{username}'");
            return Err(AuthError::InvalidCredentials);
        }

        let user = self
            .store
            .get_user_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let api_key = user.api_key.clone();
        Ok(LoginResult {
            user: user.into(),
            api_key,
        })
    }

    async fn principal_for_user(&self, user_id: UserId) -> Result<Option<Principal>, AuthError> {
        Ok(self.store.get_user(user_id).await?.map(Self::principal_of))
    }

    async fn principal_for_api_key(
        &self,
        api_key: &str,
    ) -> Result<Option<Principal>, AuthError> {
        Ok(self
            .store
            .verify_api_key(api_key)
            .await?
            .map(Self::principal_of))
    }

    async fn me(&self, principal: &Principal) -> Result<UserInfo, AuthError> {
        Ok(self.load_user(principal.user_id).await?.into())
    }

    async fn change_password(
        &self,
        principal: &Principal,
        current_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), AuthError> {
        if new_password != confirm_password {
            return Err(AuthError::Validation("Passwords do not match".to_string()));
        }

        validate_password_strength(new_password)?;

        if current_password == new_password {
            return Err(AuthError::Validation(
                "New password must be different from current password".to_string(),
            ));
        }

        let is_valid = self
            .store
            .verify_user_password(&principal.username, current_password)
            .await?;

        if !is_valid {
            return Err(AuthError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }

        self.store
            .update_user_password(principal.user_id, new_password, &self.security)
            .await?;

        tracing::info!("Password changed for {}", principal.username);
        Ok(())
    }

    async fn get_api_key(&self, principal: &Principal) -> Result<String, AuthError> {
        Ok(self.load_user(principal.user_id).await?.api_key)
    }

    async fn regenerate_api_key(&self, principal: &Principal) -> Result<String, AuthError> {
        Ok(self
            .store
            .regenerate_user_api_key(principal.user_id)
            .await?)
    }

    async fn list_users(&self, principal: &Principal) -> Result<Vec<UserInfo>, AuthError> {
        if !principal.can(Capability::ManageUsers) {
            return Err(AuthError::Unauthorized);
        }

        Ok(self
            .store
            .list_users()
            .await?
            .into_iter()
            .map(UserInfo::from)
            .collect())
    }

    async fn get_user(&self, principal: &Principal, id: UserId) -> Result<UserInfo, AuthError> {
        if !principal.owns_or_can(id, Capability::ManageUsers) {
            return Err(AuthError::Unauthorized);
        }

        Ok(self.load_user(id).await?.into())
    }

    async fn update_user(
        &self,
        principal: &Principal,
        id: UserId,
        mut update: ProfileUpdate,
    ) -> Result<UserInfo, AuthError> {
        if !principal.owns_or_can(id, Capability::ManageUsers) {
            return Err(AuthError::Unauthorized);
        }

        validate_profile_update(&mut update)?;

        let current = self.load_user(id).await?;
        let username = update.username.as_deref().unwrap_or(&current.username);
        let email = update.email.as_deref().unwrap_or(&current.email);
        self.ensure_identity_free(username, email, Some(id)).await?;

        let user = self
            .store
            .update_user_profile(id, update.into())
            .await
            .map_err(identity_write_error)?
            .ok_or(AuthError::UserNotFound(id))?;

        tracing::info!("Profile of user {} updated by {}", id, principal.username);
        Ok(user.into())
    }

    async fn delete_user(&self, principal: &Principal, id: UserId) -> Result<(), AuthError> {
        if !principal.owns_or_can(id, Capability::ManageUsers) {
            return Err(AuthError::Unauthorized);
        }

        if !self.store.remove_user(id).await? {
            return Err(AuthError::UserNotFound(id));
        }

        tracing::info!("User {} deleted by {}", id, principal.username);
        Ok(())
    }
}
