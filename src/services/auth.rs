use actix_web::{Error as ActixError, FromRequest, HttpRequest, dev::Payload, web::Data};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::future::{Ready, ready};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::Config;
use crate::database::models::{AuthResponse, LoginInput, RegisterInput, Role};
use crate::database::repositories::CompanyRepository;
use crate::error::AppError;
use crate::services::identity::IdentityProvider;
use crate::services::user_context::{SessionDirectory, UserContext};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub sub: Uuid, // identity id
    pub email: String,
    pub company_id: Uuid,
    pub role: Role,
    pub team_id: Option<Uuid>,
    pub personnel_id: Option<Uuid>,
    pub exp: usize,
}

impl FromRequest for Claims {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(config) = req.app_data::<Data<Config>>() else {
            log::error!("Config missing from app data");
            return ready(Err(AppError::internal_server_error().into()));
        };

        let token = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        let result: Result<Self, ActixError> = match token {
            Some(token) => decode_token(&config.jwt_secret, token).map_err(|e| {
                log::warn!("Rejected session token: {}", e);
                e.into()
            }),
            None => Err(AppError::Unauthorized.into()),
        };

        ready(result)
    }
}

pub fn encode_token(config: &Config, ctx: &UserContext) -> Result<String, AppError> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::days(config.jwt_expiration_days))
        .ok_or_else(|| AppError::internal_server_error_message("Token expiry out of range"))?
        .timestamp() as usize;

    let claims = Claims {
        sub: ctx.identity_id,
        email: ctx.email.clone(),
        company_id: ctx.company_id,
        role: ctx.role,
        team_id: ctx.team_id,
        personnel_id: ctx.personnel_id,
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_ref()),
    )
    .map_err(|e| {
        log::error!("Failed to sign session token: {}", e);
        AppError::internal_server_error_message("Failed to sign session token")
    })
}

pub fn decode_token(secret: &str, token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized)
}

#[derive(Clone)]
pub struct AuthService {
    identity: Arc<dyn IdentityProvider>,
    company_repository: CompanyRepository,
    sessions: Arc<dyn SessionDirectory>,
    config: Config,
}

impl AuthService {
    pub fn new(
        config: Config,
        identity: Arc<dyn IdentityProvider>,
        company_repository: CompanyRepository,
        sessions: Arc<dyn SessionDirectory>,
    ) -> Self {
        Self {
            identity,
            company_repository,
            sessions,
            config,
        }
    }

    /// Signs up the admin identity and creates the company it owns.
    pub async fn register(&self, request: RegisterInput) -> Result<AuthResponse, AppError> {
        let company_name = request.company_name.trim();
        if company_name.is_empty() {
            return Err(AppError::validation("Company name is required"));
        }

        let identity = self
            .identity
            .sign_up(&request.email, &request.password)
            .await?;

        if let Err(e) = self
            .company_repository
            .create_company(identity.id, company_name, &identity.email)
            .await
        {
            log::error!("Company creation failed for {}: {}", identity.email, e);
            if let Err(cleanup) = self.identity.delete_account(identity.id).await {
                log::error!(
                    "Could not remove identity {} after failed registration: {}",
                    identity.id,
                    cleanup
                );
                return Err(AppError::PartialProvisioning(format!(
                    "identity {} exists without a company",
                    identity.id
                )));
            }
            return Err(e.into());
        }

        log::info!("Registered company '{}' for {}", company_name, identity.email);
        self.respond(UserContext::admin(identity.id, identity.email))
    }

    pub async fn login(&self, request: LoginInput) -> Result<AuthResponse, AppError> {
        let identity = self
            .identity
            .sign_in(&request.email, &request.password)
            .await?;

        let ctx = UserContext::resolve(self.sessions.as_ref(), identity.id, identity.email).await?;
        self.respond(ctx)
    }

    pub async fn logout(&self, ctx: &UserContext) -> Result<(), AppError> {
        self.identity.sign_out(ctx.identity_id).await
    }

    fn respond(&self, ctx: UserContext) -> Result<AuthResponse, AppError> {
        let token = encode_token(&self.config, &ctx)?;
        Ok(AuthResponse {
            token,
            session: ctx.session_info(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config() -> Config {
        let mut config = Config::from_env_only().unwrap();
        config.jwt_secret = "unit-test-secret".to_string();
        config
    }

    #[test]
    fn token_round_trips_the_session() {
        let config = config();
        let ctx = UserContext::staff(
            Uuid::new_v4(),
            "tech@example.com",
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
        );

        let token = encode_token(&config, &ctx).unwrap();
        let claims = decode_token(&config.jwt_secret, &token).unwrap();

        assert_eq!(claims.sub, ctx.identity_id);
        assert_eq!(claims.role, Role::Staff);
        assert_eq!(claims.company_id, ctx.company_id);
        assert_eq!(claims.team_id, ctx.team_id);
        assert_eq!(claims.personnel_id, ctx.personnel_id);
    }

    #[test]
    fn token_signed_with_another_secret_is_unauthorized() {
        let config = config();
        let token = encode_token(&config, &UserContext::admin(Uuid::new_v4(), "a@b.co")).unwrap();

        assert!(matches!(
            decode_token("some-other-secret", &token),
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            decode_token(&config.jwt_secret, "not-a-jwt"),
            Err(AppError::Unauthorized)
        ));
    }
}
