use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::database::models::{Team, TeamInput};
use crate::error::AppError;
use crate::services::UserContext;

#[async_trait]
pub trait TeamStore: Send + Sync {
    async fn insert_team(&self, company_id: Uuid, input: TeamInput) -> Result<Team, AppError>;
    async fn find_team(&self, company_id: Uuid, id: Uuid) -> Result<Option<Team>, AppError>;
    async fn list_teams(&self, company_id: Uuid) -> Result<Vec<Team>, AppError>;
    async fn rename_team(
        &self,
        company_id: Uuid,
        id: Uuid,
        input: TeamInput,
    ) -> Result<Option<Team>, AppError>;
    /// Customers, personnel and visits still pointing at the team.
    async fn team_references(&self, id: Uuid) -> Result<i64, AppError>;
    async fn remove_team(&self, company_id: Uuid, id: Uuid) -> Result<bool, AppError>;
}

fn validate(input: &TeamInput) -> Result<TeamInput, AppError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(AppError::validation("Team name is required"));
    }
    Ok(TeamInput {
        name: name.to_string(),
    })
}

/// Team administration, scoped to the caller's company.
#[derive(Clone)]
pub struct TeamDirectory {
    store: Arc<dyn TeamStore>,
}

impl TeamDirectory {
    pub fn new(store: Arc<dyn TeamStore>) -> Self {
        Self { store }
    }

    /// The team, provided it belongs to the caller's company.
    pub async fn find(&self, ctx: &UserContext, team_id: Uuid) -> Result<Team, AppError> {
        self.store
            .find_team(ctx.company_id, team_id)
            .await?
            .ok_or_else(|| {
                log::warn!("Team {} not found in company {}", team_id, ctx.company_id);
                AppError::not_found("Team")
            })
    }

    pub async fn create(&self, ctx: &UserContext, input: TeamInput) -> Result<Team, AppError> {
        ctx.requires_admin()?;
        let input = validate(&input)?;

        self.store
            .insert_team(ctx.company_id, input)
            .await
            .map_err(|e| {
                log::error!("Failed to create team: {}", e);
                e
            })
    }

    pub async fn list(&self, ctx: &UserContext) -> Result<Vec<Team>, AppError> {
        ctx.requires_admin()?;
        self.store.list_teams(ctx.company_id).await
    }

    pub async fn get(&self, ctx: &UserContext, team_id: Uuid) -> Result<Team, AppError> {
        ctx.requires_admin()?;
        self.find(ctx, team_id).await
    }

    pub async fn update(
        &self,
        ctx: &UserContext,
        team_id: Uuid,
        input: TeamInput,
    ) -> Result<Team, AppError> {
        ctx.requires_admin()?;
        let input = validate(&input)?;

        self.store
            .rename_team(ctx.company_id, team_id, input)
            .await
            .map_err(|e| {
                log::error!("Failed to update team {}: {}", team_id, e);
                e
            })?
            .ok_or_else(|| AppError::not_found("Team"))
    }

    /// Refused while anything still references the team.
    pub async fn delete(&self, ctx: &UserContext, team_id: Uuid) -> Result<(), AppError> {
        ctx.requires_admin()?;
        let team = self.find(ctx, team_id).await?;

        let references = self.store.team_references(team.id).await?;
        if references > 0 {
            log::warn!(
                "Refusing to delete team {} with {} dependent records",
                team.id,
                references
            );
            return Err(AppError::Conflict(format!(
                "Team '{}' still has {} customers, personnel or visits",
                team.name, references
            )));
        }

        if !self.store.remove_team(ctx.company_id, team.id).await? {
            return Err(AppError::not_found("Team"));
        }
        Ok(())
    }
}
