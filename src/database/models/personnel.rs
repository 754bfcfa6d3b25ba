use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::Role;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Personnel {
    pub id: Uuid,
    pub company_id: Uuid,
    pub team_id: Uuid,
    pub identity_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePersonnelInput {
    pub team_id: Uuid,
    pub name: String,
    pub email: String,
}

/// Record written once the identity account exists.
#[derive(Debug, Clone)]
pub struct NewPersonnel {
    pub company_id: Uuid,
    pub team_id: Uuid,
    pub identity_id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePersonnelInput {
    pub team_id: Uuid,
    pub name: String,
}
