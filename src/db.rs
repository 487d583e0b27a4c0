// src/db.rs
use crate::models::{PaymentMethod, PaymentRecord, RequestSummary, TokenRecord, UserCredentials};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// Status every new request starts in.
pub const INITIAL_STATUS_ID: i64 = 1;

pub async fn create_user(
    pool: &PgPool,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await
}

pub async fn get_user_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<UserCredentials>, sqlx::Error> {
    sqlx::query_as::<_, UserCredentials>("SELECT id, password_hash FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn create_token(
    pool: &PgPool,
    token: &str,
    expiration_date: DateTime<Utc>,
    user_id: i64,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO tokens (token_string, expiration_date, user_id) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(token)
    .bind(expiration_date)
    .bind(user_id)
    .fetch_one(pool)
    .await
}

pub async fn get_token(pool: &PgPool, token: &str) -> Result<Option<TokenRecord>, sqlx::Error> {
    sqlx::query_as::<_, TokenRecord>(
        "SELECT id, expiration_date FROM tokens WHERE token_string = $1",
    )
    .bind(token)
    .fetch_optional(pool)
    .await
}

pub async fn create_model(
    pool: &PgPool,
    file_name: &str,
    file_data: &[u8],
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO three_d_models (file_name, file_data) VALUES ($1, $2) RETURNING id",
    )
    .bind(file_name)
    .bind(file_data)
    .fetch_one(pool)
    .await
}

pub async fn create_request(
    pool: &PgPool,
    model_name: &str,
    image_id: i64,
    token_id: i64,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO requests (model_name, status_id, image_id, token_id) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(model_name)
    .bind(INITIAL_STATUS_ID)
    .bind(image_id)
    .bind(token_id)
    .fetch_one(pool)
    .await
}

pub async fn list_requests(
    pool: &PgPool,
    token_id: i64,
) -> Result<Vec<RequestSummary>, sqlx::Error> {
    sqlx::query_as::<_, RequestSummary>(
        r#"
        SELECT r.id, r.model_name AS model, s.name AS status, t.file_name AS filename
        FROM requests r
        JOIN statuses s ON r.status_id = s.id
        JOIN three_d_models t ON r.image_id = t.id
        WHERE r.token_id = $1
        ORDER BY r.id
        "#,
    )
    .bind(token_id)
    .fetch_all(pool)
    .await
}

pub async fn create_payment(pool: &PgPool, user_id: i64, type_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO payments (user_id, type_id, is_paid) VALUES ($1, $2, true)")
        .bind(user_id)
        .bind(type_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn get_latest_payment(
    pool: &PgPool,
    user_id: i64,
) -> Result<Option<PaymentRecord>, sqlx::Error> {
    sqlx::query_as::<_, PaymentRecord>(
        "SELECT is_paid, payment_date FROM payments WHERE user_id = $1 ORDER BY payment_date DESC, id DESC LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn list_payment_types(pool: &PgPool) -> Result<Vec<PaymentMethod>, sqlx::Error> {
    sqlx::query_as::<_, PaymentMethod>("SELECT id, name FROM payment_types ORDER BY id")
        .fetch_all(pool)
        .await
}

pub async fn log_usage(pool: &PgPool, token_id: i64, value: &str) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO usage_events (token_id, value) VALUES ($1, $2)")
        .bind(token_id)
        .bind(value)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn count_usage(pool: &PgPool, token_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM usage_events WHERE token_id = $1")
        .bind(token_id)
        .fetch_one(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test]
    async fn test_duplicate_email_hits_unique_constraint(pool: PgPool) {
        create_user(&pool, "alice", "alice@example.com", "hash")
            .await
            .unwrap();
        let err = create_user(&pool, "alice2", "alice@example.com", "hash")
            .await
            .unwrap_err();

        let db_err = err.as_database_error().unwrap();
        assert!(db_err.is_unique_violation());
        assert_eq!(db_err.constraint(), Some(crate::error::USERS_EMAIL_CONSTRAINT));
    }

    #[sqlx::test]
    async fn test_model_bytes_stored_verbatim(pool: PgPool) {
        let id = create_model(&pool, "bunny.obj", b"v 0 0 0\n").await.unwrap();

        let stored: Vec<u8> =
            sqlx::query_scalar("SELECT file_data FROM three_d_models WHERE id = $1")
                .bind(id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(stored, b"v 0 0 0\n");
    }

    #[sqlx::test]
    async fn test_payment_types_seeded(pool: PgPool) {
        let types = list_payment_types(&pool).await.unwrap();
        assert!(!types.is_empty());
        assert_eq!(types[0].id, 1);
    }
}
