use async_trait::async_trait;
use uuid::Uuid;

use crate::database::models::{Company, Personnel};
use crate::database::repositories::{CompanyRepository, PersonnelRepository};
use crate::error::AppError;
use crate::services::user_context::SessionDirectory;

/// Session lookups against the company and personnel tables.
#[derive(Clone)]
pub struct SessionRepository {
    companies: CompanyRepository,
    personnel: PersonnelRepository,
}

impl SessionRepository {
    pub fn new(companies: CompanyRepository, personnel: PersonnelRepository) -> Self {
        Self {
            companies,
            personnel,
        }
    }
}

#[async_trait]
impl SessionDirectory for SessionRepository {
    async fn company_owned_by(&self, identity_id: Uuid) -> Result<Option<Company>, AppError> {
        Ok(self.companies.find_by_id(identity_id).await?)
    }

    async fn personnel_for(&self, identity_id: Uuid) -> Result<Option<Personnel>, AppError> {
        Ok(self.personnel.find_by_identity(identity_id).await?)
    }
}
