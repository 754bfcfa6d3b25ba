use actix_web::{HttpResponse, Result, web};

use crate::AppState;
use crate::database::models::{ForgotPasswordInput, LoginInput, RegisterInput, ResetPasswordInput};
use crate::handlers::shared::ApiResponse;
use crate::services::{IdentityProvider, UserContext};

pub async fn register(
    data: web::Data<AppState>,
    input: web::Json<RegisterInput>,
) -> Result<HttpResponse> {
    let response = data.auth_service.register(input.into_inner()).await?;

    Ok(ApiResponse::created(response))
}

pub async fn login(
    data: web::Data<AppState>,
    input: web::Json<LoginInput>,
) -> Result<HttpResponse> {
    let response = data.auth_service.login(input.into_inner()).await?;

    Ok(ApiResponse::success(response))
}

pub async fn logout(ctx: UserContext, data: web::Data<AppState>) -> Result<HttpResponse> {
    data.auth_service.logout(&ctx).await?;

    Ok(ApiResponse::success_message("Signed out"))
}

pub async fn me(ctx: UserContext) -> Result<HttpResponse> {
    Ok(ApiResponse::success(ctx.session_info()))
}

pub async fn forgot_password(
    data: web::Data<AppState>,
    input: web::Json<ForgotPasswordInput>,
) -> Result<HttpResponse> {
    data.identity.send_credential_reset(&input.email).await?;

    // Same answer whether or not the address is known
    Ok(ApiResponse::success_message(
        "If the address is registered, a password reset link has been sent.",
    ))
}

pub async fn reset_password(
    data: web::Data<AppState>,
    input: web::Json<ResetPasswordInput>,
) -> Result<HttpResponse> {
    data.identity
        .reset_password(&input.token, &input.new_password)
        .await?;

    Ok(ApiResponse::success_message(
        "Password has been reset successfully.",
    ))
}
