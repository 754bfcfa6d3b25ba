use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{models::PasswordResetToken, utils::sql};

const TOKEN_LEN: usize = 64;
const TOKEN_TTL_HOURS: i64 = 1;

/// Generate a cryptographically secure random token
fn generate_secure_token() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ\
                             abcdefghijklmnopqrstuvwxyz\
                             0123456789";
    let mut rng = rand::rng();

    (0..TOKEN_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

#[derive(Clone)]
pub struct PasswordResetTokenRepository {
    pool: PgPool,
}

impl PasswordResetTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_token(&self, user_id: Uuid) -> Result<PasswordResetToken, sqlx::Error> {
        let now = Utc::now();

        sqlx::query_as::<_, PasswordResetToken>(&sql(r#"
            INSERT INTO
                password_reset_tokens (id, user_id, token, expires_at, created_at)
            VALUES
                (?, ?, ?, ?, ?)
            RETURNING
                id,
                user_id,
                token,
                expires_at,
                used_at,
                created_at
        "#))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(generate_secure_token())
        .bind(now + Duration::hours(TOKEN_TTL_HOURS))
        .bind(now)
        .fetch_one(&self.pool)
        .await
    }

    /// Find a valid (unused and not expired) token
    pub async fn find_valid_token(
        &self,
        token: &str,
    ) -> Result<Option<PasswordResetToken>, sqlx::Error> {
        sqlx::query_as::<_, PasswordResetToken>(&sql(r#"
            SELECT
                id,
                user_id,
                token,
                expires_at,
                used_at,
                created_at
            FROM
                password_reset_tokens
            WHERE
                token = ?
                AND used_at IS NULL
                AND expires_at > ?
        "#))
        .bind(token)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
    }

    /// Marks every outstanding token of the user as used, the redeemed one included.
    pub async fn invalidate_user_tokens(&self, user_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(&sql(r#"
            UPDATE
                password_reset_tokens
            SET
                used_at = ?
            WHERE
                user_id = ?
                AND used_at IS NULL
        "#))
        .bind(Utc::now())
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
