use async_trait::async_trait;
use rand::{Rng, distr::Alphanumeric};
use std::sync::Arc;
use uuid::Uuid;

use crate::database::models::{CreatePersonnelInput, NewPersonnel, Personnel};
use crate::error::AppError;
use crate::services::identity::{IdentityProvider, validate_email};

#[async_trait]
pub trait PersonnelStore: Send + Sync {
    async fn email_taken(&self, email: &str) -> Result<bool, AppError>;

    async fn insert_personnel(&self, record: NewPersonnel) -> Result<Personnel, AppError>;
}

/// Ten random alphanumerics plus a fixed `A1`.
pub fn temporary_password() -> String {
    let random: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(10)
        .map(char::from)
        .collect();
    format!("{}A1", random)
}

/// Creates a staff member as identity account + personnel record, undoing the
/// account when the record cannot be stored.
#[derive(Clone)]
pub struct PersonnelProvisioning {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn PersonnelStore>,
}

impl PersonnelProvisioning {
    pub fn new(identity: Arc<dyn IdentityProvider>, store: Arc<dyn PersonnelStore>) -> Self {
        Self { identity, store }
    }

    pub async fn provision(
        &self,
        company_id: Uuid,
        input: CreatePersonnelInput,
    ) -> Result<Personnel, AppError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::validation("Name is required"));
        }
        validate_email(&input.email)?;

        if self.store.email_taken(&input.email).await? {
            return Err(AppError::Conflict(format!(
                "Personnel with email {} already exists",
                input.email
            )));
        }

        let identity = self
            .identity
            .sign_up(&input.email, &temporary_password())
            .await?;

        let record = NewPersonnel {
            company_id,
            team_id: input.team_id,
            identity_id: identity.id,
            name,
            email: identity.email.clone(),
        };

        let personnel = match self.store.insert_personnel(record).await {
            Ok(personnel) => personnel,
            Err(e) => {
                log::error!("Storing personnel {} failed: {}", identity.email, e);
                if let Err(cleanup) = self.identity.delete_account(identity.id).await {
                    log::error!(
                        "Could not remove identity {} after failed provisioning: {}",
                        identity.id,
                        cleanup
                    );
                    return Err(AppError::PartialProvisioning(format!(
                        "identity {} exists without a personnel record",
                        identity.id
                    )));
                }
                return Err(e);
            }
        };

        if let Err(e) = self.identity.send_credential_reset(&personnel.email).await {
            log::warn!(
                "Credential reset email for {} was not sent: {}",
                personnel.email,
                e
            );
        }

        log::info!(
            "Provisioned personnel {} on team {}",
            personnel.id,
            personnel.team_id
        );
        Ok(personnel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temporary_password_shape() {
        let password = temporary_password();
        assert_eq!(password.len(), 12);
        assert!(password.ends_with("A1"));
        assert!(password[..10].chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(temporary_password(), password);
    }
}
