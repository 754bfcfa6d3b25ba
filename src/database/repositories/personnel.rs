use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{
    models::{NewPersonnel, Personnel, Role, UpdatePersonnelInput},
    utils::sql,
};
use crate::error::AppError;
use crate::services::provisioning::PersonnelStore;

#[derive(Clone)]
pub struct PersonnelRepository {
    pool: PgPool,
}

impl PersonnelRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(
        &self,
        company_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Personnel>, sqlx::Error> {
        sqlx::query_as::<_, Personnel>(&sql(r#"
            SELECT
                id,
                company_id,
                team_id,
                identity_id,
                name,
                email,
                role,
                created_at,
                updated_at
            FROM
                personnel
            WHERE
                id = ?
                AND company_id = ?
        "#))
        .bind(id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn find_by_identity(&self, identity_id: Uuid) -> Result<Option<Personnel>, sqlx::Error> {
        sqlx::query_as::<_, Personnel>(&sql(r#"
            SELECT
                id,
                company_id,
                team_id,
                identity_id,
                name,
                email,
                role,
                created_at,
                updated_at
            FROM
                personnel
            WHERE
                identity_id = ?
        "#))
        .bind(identity_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn list_staff(&self, company_id: Uuid) -> Result<Vec<Personnel>, sqlx::Error> {
        sqlx::query_as::<_, Personnel>(&sql(r#"
            SELECT
                id,
                company_id,
                team_id,
                identity_id,
                name,
                email,
                role,
                created_at,
                updated_at
            FROM
                personnel
            WHERE
                company_id = ?
                AND role = ?
            ORDER BY
                name
        "#))
        .bind(company_id)
        .bind(Role::Staff)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn update_personnel(
        &self,
        company_id: Uuid,
        id: Uuid,
        input: UpdatePersonnelInput,
    ) -> Result<Option<Personnel>, sqlx::Error> {
        sqlx::query_as::<_, Personnel>(&sql(r#"
            UPDATE
                personnel
            SET
                team_id = ?,
                name = ?,
                updated_at = ?
            WHERE
                id = ?
                AND company_id = ?
            RETURNING
                id,
                company_id,
                team_id,
                identity_id,
                name,
                email,
                role,
                created_at,
                updated_at
        "#))
        .bind(input.team_id)
        .bind(input.name)
        .bind(Utc::now())
        .bind(id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete_personnel(&self, company_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(&sql("DELETE FROM personnel WHERE id = ? AND company_id = ?"))
            .bind(id)
            .bind(company_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count_staff(&self, company_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(&sql(
            "SELECT COUNT(*) FROM personnel WHERE company_id = ? AND role = ?",
        ))
        .bind(company_id)
        .bind(Role::Staff)
        .fetch_one(&self.pool)
        .await
    }
}

#[async_trait]
impl PersonnelStore for PersonnelRepository {
    async fn email_taken(&self, email: &str) -> Result<bool, AppError> {
        let count: i64 = sqlx::query_scalar(&sql("SELECT COUNT(*) FROM personnel WHERE email = ?"))
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    async fn insert_personnel(&self, record: NewPersonnel) -> Result<Personnel, AppError> {
        let now = Utc::now();

        let personnel = sqlx::query_as::<_, Personnel>(&sql(r#"
            INSERT INTO
                personnel (
                    id,
                    company_id,
                    team_id,
                    identity_id,
                    name,
                    email,
                    role,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING
                id,
                company_id,
                team_id,
                identity_id,
                name,
                email,
                role,
                created_at,
                updated_at
        "#))
        .bind(Uuid::new_v4())
        .bind(record.company_id)
        .bind(record.team_id)
        .bind(record.identity_id)
        .bind(record.name)
        .bind(record.email)
        .bind(Role::Staff)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(personnel)
    }
}
