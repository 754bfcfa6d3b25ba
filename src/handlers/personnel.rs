use actix_web::{HttpResponse, Result, web};
use uuid::Uuid;

use crate::AppState;
use crate::database::models::{CreatePersonnelInput, UpdatePersonnelInput};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::{IdentityProvider, UserContext};

pub async fn create_personnel(
    ctx: UserContext,
    data: web::Data<AppState>,
    input: web::Json<CreatePersonnelInput>,
) -> Result<HttpResponse> {
    ctx.requires_admin()?;
    let input = input.into_inner();
    data.teams.find(&ctx, input.team_id).await?;

    let personnel = data.provisioning.provision(ctx.company_id, input).await?;

    Ok(ApiResponse::created(personnel))
}

pub async fn get_personnel_list(
    ctx: UserContext,
    data: web::Data<AppState>,
) -> Result<HttpResponse> {
    ctx.requires_admin()?;

    let personnel = data
        .personnel_repository
        .list_staff(ctx.company_id)
        .await
        .map_err(AppError::from)?;

    Ok(ApiResponse::success(personnel))
}

pub async fn get_personnel(
    ctx: UserContext,
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    ctx.requires_admin()?;
    let personnel_id = path.into_inner();

    let personnel = data
        .personnel_repository
        .find_by_id(ctx.company_id, personnel_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found("Personnel"))?;

    Ok(ApiResponse::success(personnel))
}

/// Name and team only; the email is bound to the identity account.
pub async fn update_personnel(
    ctx: UserContext,
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
    input: web::Json<UpdatePersonnelInput>,
) -> Result<HttpResponse> {
    ctx.requires_admin()?;
    let personnel_id = path.into_inner();
    let input = input.into_inner();

    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::validation("Name is required").into());
    }
    data.teams.find(&ctx, input.team_id).await?;

    let personnel = data
        .personnel_repository
        .update_personnel(
            ctx.company_id,
            personnel_id,
            UpdatePersonnelInput {
                team_id: input.team_id,
                name,
            },
        )
        .await
        .map_err(|e| {
            log::error!("Failed to update personnel {}: {}", personnel_id, e);
            AppError::DatabaseError(e)
        })?
        .ok_or_else(|| AppError::not_found("Personnel"))?;

    Ok(ApiResponse::success(personnel))
}

/// Removes the record, then its identity account. A failed account removal is
/// logged and does not fail the request.
pub async fn delete_personnel(
    ctx: UserContext,
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    ctx.requires_admin()?;
    let personnel_id = path.into_inner();

    let personnel = data
        .personnel_repository
        .find_by_id(ctx.company_id, personnel_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found("Personnel"))?;

    if !data
        .personnel_repository
        .delete_personnel(ctx.company_id, personnel.id)
        .await
        .map_err(AppError::from)?
    {
        return Err(AppError::not_found("Personnel").into());
    }

    if let Err(e) = data.identity.delete_account(personnel.identity_id).await {
        log::error!(
            "Personnel {} deleted but identity {} remains: {}",
            personnel.id,
            personnel.identity_id,
            e
        );
    }

    Ok(ApiResponse::success_message("Personnel deleted successfully"))
}
