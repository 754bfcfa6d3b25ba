use std::sync::LazyLock;

use async_trait::async_trait;
use bcrypt::{DEFAULT_COST, hash, verify};
use regex::Regex;
use uuid::Uuid;

use crate::config::Config;
use crate::database::models::IdentityAccount;
use crate::database::repositories::{PasswordResetTokenRepository, UserRepository};
use crate::error::AppError;

/// An account known to the identity provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
}

impl From<IdentityAccount> for Identity {
    fn from(account: IdentityAccount) -> Self {
        Self {
            id: account.id,
            email: account.email,
        }
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AppError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AppError>;

    /// Fire-and-forget from the caller's point of view.
    async fn send_credential_reset(&self, email: &str) -> Result<(), AppError>;

    async fn delete_account(&self, identity_id: Uuid) -> Result<(), AppError>;

    /// Sessions are bearer tokens that expire on their own.
    async fn sign_out(&self, identity_id: Uuid) -> Result<(), AppError> {
        log::info!("Identity {} signed out", identity_id);
        Ok(())
    }
}

/// Identity provider backed by the `users` table.
#[derive(Clone)]
pub struct LocalIdentityProvider {
    users: UserRepository,
    reset_tokens: PasswordResetTokenRepository,
    config: Config,
}

impl LocalIdentityProvider {
    pub fn new(
        users: UserRepository,
        reset_tokens: PasswordResetTokenRepository,
        config: Config,
    ) -> Self {
        Self {
            users,
            reset_tokens,
            config,
        }
    }

    /// Redeems a reset token and sets a new password.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AppError> {
        validate_password(new_password)?;

        let reset_token = self
            .reset_tokens
            .find_valid_token(token)
            .await?
            .ok_or_else(|| AppError::validation("Invalid or expired reset token"))?;

        let password_hash = hash_password(new_password)?;
        self.users
            .update_password(reset_token.user_id, &password_hash)
            .await?;
        self.reset_tokens
            .invalidate_user_tokens(reset_token.user_id)
            .await?;

        Ok(())
    }
}

fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST).map_err(|e| {
        log::error!("Password hashing failed: {}", e);
        AppError::internal_server_error_message("Password hashing failed")
    })
}

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

pub fn validate_email(email: &str) -> Result<(), AppError> {
    if !EMAIL.is_match(email) {
        return Err(AppError::validation(format!("Invalid email address: {}", email)));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < 6 {
        return Err(AppError::validation(
            "Password must be at least 6 characters",
        ));
    }
    Ok(())
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AppError> {
        validate_email(email)?;
        validate_password(password)?;

        if self.users.email_exists(email).await? {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        let account = IdentityAccount::new(email.to_string(), hash_password(password)?);
        self.users.create_user(&account).await?;

        Ok(account.into())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AppError> {
        let account = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let matches = verify(password, &account.password_hash).map_err(|e| {
            log::error!("Password verification failed for {}: {}", email, e);
            AppError::Unauthorized
        })?;
        if !matches {
            log::warn!("Invalid password for {}", email);
            return Err(AppError::Unauthorized);
        }

        Ok(account.into())
    }

    async fn send_credential_reset(&self, email: &str) -> Result<(), AppError> {
        let Some(account) = self.users.find_by_email(email).await? else {
            // Unknown addresses get the same silent success
            log::info!("Credential reset requested for unknown email {}", email);
            return Ok(());
        };

        let reset_token = self.reset_tokens.create_token(account.id).await?;

        // No mail transport is wired in; the link goes to the log
        log::info!(
            "Password reset link for {}: {}/reset-password?token={}",
            email,
            self.config.client_base_url,
            reset_token.token
        );

        Ok(())
    }

    async fn delete_account(&self, identity_id: Uuid) -> Result<(), AppError> {
        if !self.users.delete_user(identity_id).await? {
            return Err(AppError::not_found("Identity account"));
        }
        Ok(())
    }
}
