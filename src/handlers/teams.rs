use actix_web::{HttpResponse, Result, web};
use uuid::Uuid;

use crate::AppState;
use crate::database::models::TeamInput;
use crate::handlers::shared::ApiResponse;
use crate::services::UserContext;

pub async fn create_team(
    ctx: UserContext,
    data: web::Data<AppState>,
    input: web::Json<TeamInput>,
) -> Result<HttpResponse> {
    let team = data.teams.create(&ctx, input.into_inner()).await?;

    Ok(ApiResponse::created(team))
}

pub async fn get_teams(ctx: UserContext, data: web::Data<AppState>) -> Result<HttpResponse> {
    let teams = data.teams.list(&ctx).await?;

    Ok(ApiResponse::success(teams))
}

pub async fn get_team(
    ctx: UserContext,
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let team = data.teams.get(&ctx, path.into_inner()).await?;

    Ok(ApiResponse::success(team))
}

pub async fn update_team(
    ctx: UserContext,
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
    input: web::Json<TeamInput>,
) -> Result<HttpResponse> {
    let team = data
        .teams
        .update(&ctx, path.into_inner(), input.into_inner())
        .await?;

    Ok(ApiResponse::success(team))
}

/// Refused with 409 while customers, personnel or visits reference the team.
pub async fn delete_team(
    ctx: UserContext,
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    data.teams.delete(&ctx, path.into_inner()).await?;

    Ok(ApiResponse::success_message("Team deleted successfully"))
}
