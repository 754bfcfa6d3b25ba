use actix_web::{HttpResponse, Result, web};

use crate::AppState;
use crate::database::models::{OptimizeRouteInput, OptimizeRouteResponse};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::UserContext;

/// Optimizes the round trip through a team's visits on one day. The first
/// visit created for that day is the depot.
pub async fn optimize_route(
    ctx: UserContext,
    data: web::Data<AppState>,
    input: web::Json<OptimizeRouteInput>,
) -> Result<HttpResponse> {
    ctx.requires_admin()?;
    let input = input.into_inner();
    data.teams.find(&ctx, input.team_id).await?;

    let visits = data
        .visit_repository
        .list_for_team_on(ctx.company_id, input.team_id, input.date)
        .await
        .map_err(AppError::from)?;
    let customers = data.customers.list(&ctx, None).await?;

    let route = data.route_planner.optimize(visits, &customers).await?;
    if route.is_none() {
        log::info!(
            "No optimization available for team {} on {}",
            input.team_id,
            input.date
        );
    }

    Ok(ApiResponse::success(OptimizeRouteResponse { route }))
}
