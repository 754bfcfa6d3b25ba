use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{models::Company, utils::sql};

#[derive(Clone)]
pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the company owned by `admin_id`; the company takes that id.
    pub async fn create_company(
        &self,
        admin_id: Uuid,
        name: &str,
        admin_email: &str,
    ) -> Result<Company, sqlx::Error> {
        let now = Utc::now();

        sqlx::query_as::<_, Company>(&sql(r#"
            INSERT INTO
                companies (id, name, admin_email, created_at, updated_at)
            VALUES
                (?, ?, ?, ?, ?)
            RETURNING
                id,
                name,
                admin_email,
                created_at,
                updated_at
        "#))
        .bind(admin_id)
        .bind(name)
        .bind(admin_email)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_by_id(&self, company_id: Uuid) -> Result<Option<Company>, sqlx::Error> {
        sqlx::query_as::<_, Company>(&sql(r#"
            SELECT
                id,
                name,
                admin_email,
                created_at,
                updated_at
            FROM
                companies
            WHERE
                id = ?
        "#))
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
    }
}
