use actix_web::{HttpResponse, Result, web};
use uuid::Uuid;

use crate::AppState;
use crate::database::models::{CustomerInput, CustomerQuery, DeleteQuery};
use crate::handlers::shared::ApiResponse;
use crate::services::UserContext;

pub async fn create_customer(
    ctx: UserContext,
    data: web::Data<AppState>,
    input: web::Json<CustomerInput>,
) -> Result<HttpResponse> {
    let customer = data.customers.create(&ctx, input.into_inner()).await?;

    Ok(ApiResponse::created(customer))
}

pub async fn get_customers(
    ctx: UserContext,
    data: web::Data<AppState>,
    query: web::Query<CustomerQuery>,
) -> Result<HttpResponse> {
    let customers = data.customers.list(&ctx, query.team_id).await?;

    Ok(ApiResponse::success(customers))
}

pub async fn get_customer(
    ctx: UserContext,
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let customer = data.customers.get(&ctx, path.into_inner()).await?;

    Ok(ApiResponse::success(customer))
}

pub async fn update_customer(
    ctx: UserContext,
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
    input: web::Json<CustomerInput>,
) -> Result<HttpResponse> {
    let customer = data
        .customers
        .update(&ctx, path.into_inner(), input.into_inner())
        .await?;

    Ok(ApiResponse::success(customer))
}

pub async fn delete_customer(
    ctx: UserContext,
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<DeleteQuery>,
) -> Result<HttpResponse> {
    data.customers
        .delete(&ctx, path.into_inner(), query.cascade)
        .await?;

    let message = if query.cascade {
        "Customer and visits deleted"
    } else {
        "Customer deleted successfully"
    };
    Ok(ApiResponse::success_message(message))
}
