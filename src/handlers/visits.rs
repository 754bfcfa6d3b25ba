use actix_web::{HttpResponse, Result, web};
use chrono::Utc;
use uuid::Uuid;

use crate::AppState;
use crate::database::models::{
    CheckInInput, CreateVisitInput, NoteInput, RescheduleVisitInput, TodayPanel,
    VisitOverrideInput, VisitQuery,
};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::UserContext;

/// Checks the team and customer a visit is left with once the patch applies.
async fn ensure_patched_references(
    data: &AppState,
    ctx: &UserContext,
    visit_id: Uuid,
    team_id: Option<Uuid>,
    customer_id: Option<Uuid>,
) -> Result<(), AppError> {
    if team_id.is_none() && customer_id.is_none() {
        return Ok(());
    }

    let visit = data.lifecycle.get(ctx, visit_id).await?;
    data.customers
        .ensure_visit_references(
            ctx,
            team_id.unwrap_or(visit.team_id),
            customer_id.unwrap_or(visit.customer_id),
        )
        .await
}

pub async fn create_visit(
    ctx: UserContext,
    data: web::Data<AppState>,
    input: web::Json<CreateVisitInput>,
) -> Result<HttpResponse> {
    ctx.requires_admin()?;
    let input = input.into_inner();
    data.customers
        .ensure_visit_references(&ctx, input.team_id, input.customer_id)
        .await?;

    let visit = data.lifecycle.create(&ctx, input).await?;

    Ok(ApiResponse::created(visit))
}

pub async fn get_visits(
    ctx: UserContext,
    data: web::Data<AppState>,
    query: web::Query<VisitQuery>,
) -> Result<HttpResponse> {
    ctx.requires_admin()?;

    let visits = data
        .visit_repository
        .list(ctx.company_id, &query)
        .await
        .map_err(|e| {
            log::error!("Failed to list visits: {}", e);
            AppError::DatabaseError(e)
        })?;

    Ok(ApiResponse::success(visits))
}

/// The caller's team's visits planned for today, with progress.
pub async fn get_today(ctx: UserContext, data: web::Data<AppState>) -> Result<HttpResponse> {
    let team_id = ctx.requires_team()?;
    let today = Utc::now().date_naive();

    let visits = data
        .visit_repository
        .list_for_team_on(ctx.company_id, team_id, today)
        .await
        .map_err(AppError::from)?;

    Ok(ApiResponse::success(TodayPanel::new(today, visits)))
}

pub async fn get_visit(
    ctx: UserContext,
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let visit = data.lifecycle.get(&ctx, path.into_inner()).await?;

    Ok(ApiResponse::success(visit))
}

pub async fn reschedule_visit(
    ctx: UserContext,
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
    input: web::Json<RescheduleVisitInput>,
) -> Result<HttpResponse> {
    ctx.requires_admin()?;
    let visit_id = path.into_inner();
    let input = input.into_inner();
    ensure_patched_references(&data, &ctx, visit_id, input.team_id, input.customer_id).await?;

    let visit = data.lifecycle.reschedule(&ctx, visit_id, input).await?;

    Ok(ApiResponse::success(visit))
}

pub async fn override_visit(
    ctx: UserContext,
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
    input: web::Json<VisitOverrideInput>,
) -> Result<HttpResponse> {
    ctx.requires_admin()?;
    let visit_id = path.into_inner();
    let input = input.into_inner();
    ensure_patched_references(&data, &ctx, visit_id, input.team_id, input.customer_id).await?;

    let visit = data.lifecycle.override_visit(&ctx, visit_id, input).await?;

    Ok(ApiResponse::success(visit))
}

pub async fn delete_visit(
    ctx: UserContext,
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    data.lifecycle.delete(&ctx, path.into_inner()).await?;

    Ok(ApiResponse::success_message("Visit deleted successfully"))
}

pub async fn check_in(
    ctx: UserContext,
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
    input: web::Json<CheckInInput>,
) -> Result<HttpResponse> {
    let visit = data
        .lifecycle
        .check_in(&ctx, path.into_inner(), input.into_inner())
        .await?;

    Ok(ApiResponse::success(visit))
}

pub async fn set_note(
    ctx: UserContext,
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
    input: web::Json<NoteInput>,
) -> Result<HttpResponse> {
    let visit = data
        .lifecycle
        .set_note(&ctx, path.into_inner(), input.into_inner().note)
        .await?;

    Ok(ApiResponse::success(visit))
}

pub async fn complete_visit(
    ctx: UserContext,
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let visit = data.lifecycle.complete(&ctx, path.into_inner()).await?;

    Ok(ApiResponse::success(visit))
}

pub async fn cancel_visit(
    ctx: UserContext,
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let visit = data.lifecycle.cancel(&ctx, path.into_inner()).await?;

    Ok(ApiResponse::success(visit))
}
