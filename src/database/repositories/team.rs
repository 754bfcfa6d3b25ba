use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{
    models::{Team, TeamInput},
    utils::sql,
};
use crate::error::AppError;
use crate::services::team_directory::TeamStore;

#[derive(Clone)]
pub struct TeamRepository {
    pool: PgPool,
}

impl TeamRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_team(&self, company_id: Uuid, input: TeamInput) -> Result<Team, sqlx::Error> {
        let now = Utc::now();

        sqlx::query_as::<_, Team>(&sql(r#"
            INSERT INTO
                teams (id, company_id, name, created_at, updated_at)
            VALUES
                (?, ?, ?, ?, ?)
            RETURNING
                id,
                company_id,
                name,
                created_at,
                updated_at
        "#))
        .bind(Uuid::new_v4())
        .bind(company_id)
        .bind(input.name)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
    }

    /// Looks a team up inside one company; other companies' teams read as missing.
    pub async fn find_by_id(&self, company_id: Uuid, id: Uuid) -> Result<Option<Team>, sqlx::Error> {
        sqlx::query_as::<_, Team>(&sql(r#"
            SELECT
                id,
                company_id,
                name,
                created_at,
                updated_at
            FROM
                teams
            WHERE
                id = ?
                AND company_id = ?
        "#))
        .bind(id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn list_for_company(&self, company_id: Uuid) -> Result<Vec<Team>, sqlx::Error> {
        sqlx::query_as::<_, Team>(&sql(r#"
            SELECT
                id,
                company_id,
                name,
                created_at,
                updated_at
            FROM
                teams
            WHERE
                company_id = ?
            ORDER BY
                name
        "#))
        .bind(company_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn update_team(
        &self,
        company_id: Uuid,
        id: Uuid,
        input: TeamInput,
    ) -> Result<Option<Team>, sqlx::Error> {
        sqlx::query_as::<_, Team>(&sql(r#"
            UPDATE
                teams
            SET
                name = ?,
                updated_at = ?
            WHERE
                id = ?
                AND company_id = ?
            RETURNING
                id,
                company_id,
                name,
                created_at,
                updated_at
        "#))
        .bind(input.name)
        .bind(Utc::now())
        .bind(id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Customers, personnel and visits still pointing at the team.
    pub async fn count_references(&self, id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(&sql(r#"
            SELECT
                (SELECT COUNT(*) FROM customers WHERE team_id = ?)
                + (SELECT COUNT(*) FROM personnel WHERE team_id = ?)
                + (SELECT COUNT(*) FROM visits WHERE team_id = ?)
        "#))
        .bind(id)
        .bind(id)
        .bind(id)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn delete_team(&self, company_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(&sql("DELETE FROM teams WHERE id = ? AND company_id = ?"))
            .bind(id)
            .bind(company_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count_for_company(&self, company_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(&sql("SELECT COUNT(*) FROM teams WHERE company_id = ?"))
            .bind(company_id)
            .fetch_one(&self.pool)
            .await
    }
}

#[async_trait]
impl TeamStore for TeamRepository {
    async fn insert_team(&self, company_id: Uuid, input: TeamInput) -> Result<Team, AppError> {
        Ok(self.create_team(company_id, input).await?)
    }

    async fn find_team(&self, company_id: Uuid, id: Uuid) -> Result<Option<Team>, AppError> {
        Ok(self.find_by_id(company_id, id).await?)
    }

    async fn list_teams(&self, company_id: Uuid) -> Result<Vec<Team>, AppError> {
        Ok(self.list_for_company(company_id).await?)
    }

    async fn rename_team(
        &self,
        company_id: Uuid,
        id: Uuid,
        input: TeamInput,
    ) -> Result<Option<Team>, AppError> {
        Ok(self.update_team(company_id, id, input).await?)
    }

    async fn team_references(&self, id: Uuid) -> Result<i64, AppError> {
        Ok(self.count_references(id).await?)
    }

    async fn remove_team(&self, company_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        Ok(self.delete_team(company_id, id).await?)
    }
}
