// src/token.rs
use crate::db;
use crate::error::ApiError;
use crate::models::{IssuedToken, TokenRequest, TokenValidation};
use actix_web::{HttpResponse, get, post, web};
use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use sqlx::PgPool;

/// Lifetime of a freshly issued token.
pub const TOKEN_TTL_DAYS: i64 = 7;

const TOKEN_BYTES: usize = 32;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(generate_token);
    cfg.service(validate_token);
}

/// 256 bits from the OS RNG, base64url without padding.
pub fn generate_token_string() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

pub fn expiration_from(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::days(TOKEN_TTL_DAYS)
}

/// A token is still valid at the exact instant it expires.
pub fn is_expired(expiration_date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now > expiration_date
}

pub async fn issue_token(pool: &PgPool, user_id: i64) -> Result<IssuedToken, ApiError> {
    let token = generate_token_string();
    let expires = expiration_from(Utc::now());

    let token_id = db::create_token(pool, &token, expires, user_id).await?;
    tracing::info!(user_id, token_id, "Token issued");

    Ok(IssuedToken { token, expires })
}

pub async fn check_token(pool: &PgPool, token: &str) -> Result<TokenValidation, ApiError> {
    let record = db::get_token(pool, token)
        .await?
        .ok_or(ApiError::NotFound("Token"))?;

    if is_expired(record.expiration_date, Utc::now()) {
        return Err(ApiError::Forbidden);
    }

    Ok(TokenValidation {
        status: "valid".to_string(),
        token_id: record.id,
    })
}

#[post("/token/generate")]
pub async fn generate_token(
    pool: web::Data<PgPool>,
    req: web::Json<TokenRequest>,
) -> Result<HttpResponse, ApiError> {
    let issued = issue_token(&pool, req.user_id).await?;
    Ok(HttpResponse::Ok().json(issued))
}

#[get("/token/validate/{token}")]
pub async fn validate_token(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let validation = check_token(&pool, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(validation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{PasswordHasher, register_user};
    use crate::models::RegisterRequest;
    use chrono::TimeZone;

    async fn create_user(pool: &PgPool) -> i64 {
        register_user(
            pool,
            PasswordHasher::new(4),
            RegisterRequest {
                username: "tok".to_string(),
                email: "tok@example.com".to_string(),
                password: "pw".to_string(),
            },
        )
        .await
        .unwrap();
        db::get_user_by_email(pool, "tok@example.com")
            .await
            .unwrap()
            .unwrap()
            .id
    }

    #[test]
    fn test_token_string_shape() {
        let token = generate_token_string();

        // 32 bytes -> 43 unpadded base64 chars
        assert_eq!(token.len(), 43);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        assert_ne!(token, generate_token_string());
    }

    #[test]
    fn test_expiration_is_seven_days_out() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            expiration_from(now),
            Utc.with_ymd_and_hms(2025, 1, 8, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_expiry_boundary() {
        let expires = Utc.with_ymd_and_hms(2025, 1, 8, 0, 0, 0).unwrap();

        assert!(!is_expired(expires, expires - Duration::seconds(1)));
        assert!(!is_expired(expires, expires));
        assert!(is_expired(expires, expires + Duration::seconds(1)));
    }

    #[sqlx::test]
    async fn test_fresh_token_validates(pool: PgPool) {
        let user_id = create_user(&pool).await;
        let issued = issue_token(&pool, user_id).await.unwrap();

        let validation = check_token(&pool, &issued.token).await.unwrap();
        assert_eq!(validation.status, "valid");

        let record = db::get_token(&pool, &issued.token).await.unwrap().unwrap();
        assert_eq!(validation.token_id, record.id);
    }

    #[sqlx::test]
    async fn test_expired_token_is_forbidden_not_missing(pool: PgPool) {
        let user_id = create_user(&pool).await;
        let token = generate_token_string();
        db::create_token(&pool, &token, Utc::now() - Duration::hours(1), user_id)
            .await
            .unwrap();

        let err = check_token(&pool, &token).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden));
    }

    #[sqlx::test]
    async fn test_unknown_token_not_found(pool: PgPool) {
        let err = check_token(&pool, "no-such-token").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound("Token")));
    }

    #[sqlx::test]
    async fn test_validation_has_no_side_effects(pool: PgPool) {
        let user_id = create_user(&pool).await;
        let issued = issue_token(&pool, user_id).await.unwrap();

        check_token(&pool, &issued.token).await.unwrap();
        check_token(&pool, &issued.token).await.unwrap();

        let record = db::get_token(&pool, &issued.token).await.unwrap().unwrap();
        assert_eq!(
            record.expiration_date.timestamp_micros(),
            issued.expires.timestamp_micros()
        );
    }
}
