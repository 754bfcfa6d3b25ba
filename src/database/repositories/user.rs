use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{models::IdentityAccount, utils::sql};

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_user(&self, user: &IdentityAccount) -> Result<(), sqlx::Error> {
        sqlx::query(&sql(r#"
            INSERT INTO
                users (id, email, password_hash, created_at, updated_at)
            VALUES
                (?, ?, ?, ?, ?)
        "#))
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<IdentityAccount>, sqlx::Error> {
        sqlx::query_as::<_, IdentityAccount>(&sql(r#"
            SELECT
                id,
                email,
                password_hash,
                created_at,
                updated_at
            FROM
                users
            WHERE
                email = ?
        "#))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, sqlx::Error> {
        let count: i64 = sqlx::query_scalar(&sql("SELECT COUNT(*) FROM users WHERE email = ?"))
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    pub async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), sqlx::Error> {
        sqlx::query(&sql(r#"
            UPDATE
                users
            SET
                password_hash = ?,
                updated_at = ?
            WHERE
                id = ?
        "#))
        .bind(password_hash)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(&sql("DELETE FROM users WHERE id = ?"))
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
