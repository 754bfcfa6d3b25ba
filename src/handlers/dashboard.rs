use actix_web::{HttpResponse, Result, web};
use chrono::Utc;

use crate::AppState;
use crate::database::models::{DashboardStats, VisitQuery};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::UserContext;

pub async fn get_dashboard(ctx: UserContext, data: web::Data<AppState>) -> Result<HttpResponse> {
    ctx.requires_admin()?;
    let company_id = ctx.company_id;

    let total_customers = data
        .customer_repository
        .count_for_company(company_id)
        .await
        .map_err(AppError::from)?;
    let total_teams = data
        .team_repository
        .count_for_company(company_id)
        .await
        .map_err(AppError::from)?;
    let total_personnel = data
        .personnel_repository
        .count_staff(company_id)
        .await
        .map_err(AppError::from)?;

    let today = VisitQuery {
        date: Some(Utc::now().date_naive()),
        ..Default::default()
    };
    let visits = data
        .visit_repository
        .list(company_id, &today)
        .await
        .map_err(|e| {
            log::error!("Failed to load today's visits: {}", e);
            AppError::DatabaseError(e)
        })?;

    Ok(ApiResponse::success(DashboardStats::from_today(
        total_customers,
        total_teams,
        total_personnel,
        visits,
    )))
}
