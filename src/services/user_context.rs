use actix_web::{Error as ActixError, FromRequest, HttpRequest, dev::Payload, web::Data};
use async_trait::async_trait;
use futures_util::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use crate::database::models::{Company, Personnel, Role, SessionInfo};
use crate::error::AppError;
use crate::services::auth::Claims;

/// Records a session is checked against on every request.
#[async_trait]
pub trait SessionDirectory: Send + Sync {
    /// The company administered by this identity, if any.
    async fn company_owned_by(&self, identity_id: Uuid) -> Result<Option<Company>, AppError>;
    async fn personnel_for(&self, identity_id: Uuid) -> Result<Option<Personnel>, AppError>;
}

/// The caller's identity and company. The token names the identity; company,
/// team and role come from the records as they are now.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserContext {
    pub identity_id: Uuid,
    pub email: String,
    pub company_id: Uuid,
    pub role: Role,
    pub team_id: Option<Uuid>,
    pub personnel_id: Option<Uuid>,
}

impl UserContext {
    pub fn admin(identity_id: Uuid, email: impl Into<String>) -> Self {
        Self {
            identity_id,
            email: email.into(),
            company_id: identity_id,
            role: Role::Admin,
            team_id: None,
            personnel_id: None,
        }
    }

    pub fn staff(
        identity_id: Uuid,
        email: impl Into<String>,
        company_id: Uuid,
        team_id: Uuid,
        personnel_id: Uuid,
    ) -> Self {
        Self {
            identity_id,
            email: email.into(),
            company_id,
            role: Role::Staff,
            team_id: Some(team_id),
            personnel_id: Some(personnel_id),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn requires_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            log::warn!("{} attempted an admin-only operation", self.email);
            Err(AppError::PermissionDenied(
                "Company admin access required".to_string(),
            ))
        }
    }

    /// Staff team, or a permission error for callers without one.
    pub fn requires_team(&self) -> Result<Uuid, AppError> {
        self.team_id.ok_or_else(|| {
            AppError::PermissionDenied("This operation is only available to staff".to_string())
        })
    }

    /// Admins act on every team of their company; staff only on their own.
    pub fn can_act_on_team(&self, team_id: Uuid) -> bool {
        self.is_admin() || self.team_id == Some(team_id)
    }

    pub fn session_info(&self) -> SessionInfo {
        SessionInfo {
            identity_id: self.identity_id,
            email: self.email.clone(),
            company_id: self.company_id,
            role: self.role,
            team_id: self.team_id,
            personnel_id: self.personnel_id,
        }
    }
}

impl UserContext {
    /// Rebuilds the context of a verified token. A staff member whose record
    /// was deleted, or an admin whose company is gone, is unauthorized.
    pub async fn from_claims(
        claims: Claims,
        sessions: &dyn SessionDirectory,
    ) -> Result<Self, AppError> {
        let identity_id = claims.sub;
        let ctx = match claims.role {
            Role::Admin => Self::admin_session(sessions, identity_id, claims.email).await?,
            Role::Staff => Self::staff_session(sessions, identity_id).await?,
        };

        ctx.ok_or_else(|| {
            log::warn!("Session of {} no longer matches its records", identity_id);
            AppError::Unauthorized
        })
    }

    /// An identity that owns a company is its admin; otherwise it must have a
    /// personnel record.
    pub async fn resolve(
        sessions: &dyn SessionDirectory,
        identity_id: Uuid,
        email: String,
    ) -> Result<Self, AppError> {
        if let Some(ctx) = Self::admin_session(sessions, identity_id, email).await? {
            return Ok(ctx);
        }

        Self::staff_session(sessions, identity_id)
            .await?
            .ok_or_else(|| {
                log::warn!("Identity {} has no company or personnel record", identity_id);
                AppError::Unauthorized
            })
    }

    async fn admin_session(
        sessions: &dyn SessionDirectory,
        identity_id: Uuid,
        email: String,
    ) -> Result<Option<Self>, AppError> {
        Ok(sessions
            .company_owned_by(identity_id)
            .await?
            .map(|company| Self::admin(company.id, email)))
    }

    async fn staff_session(
        sessions: &dyn SessionDirectory,
        identity_id: Uuid,
    ) -> Result<Option<Self>, AppError> {
        Ok(sessions.personnel_for(identity_id).await?.map(|personnel| {
            Self::staff(
                identity_id,
                personnel.email,
                personnel.company_id,
                personnel.team_id,
                personnel.id,
            )
        }))
    }
}

impl FromRequest for UserContext {
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let claims = Claims::from_request(req, payload).into_inner();
        let state = req.app_data::<Data<AppState>>().cloned();

        Box::pin(async move {
            let claims = claims?;
            let Some(state) = state else {
                log::error!("AppState missing from app data");
                return Err(AppError::internal_server_error().into());
            };

            UserContext::from_claims(claims, state.sessions.as_ref())
                .await
                .map_err(ActixError::from)
        })
    }
}
