// src/auth.rs
use crate::db;
use crate::error::ApiError;
use crate::models::{LoginRequest, LoginResponse, MessageResponse, RegisterRequest};
use actix_web::{HttpResponse, post, web};
use sqlx::PgPool;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(register);
    cfg.service(login);
}

/// Salted bcrypt hashing at a fixed cost. Cheap to clone; shared through app data.
#[derive(Clone, Copy, Debug)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, password: &str) -> Result<String, bcrypt::BcryptError> {
        bcrypt::hash(password, self.cost)
    }

    /// A malformed stored hash counts as a mismatch.
    pub fn verify(&self, password: &str, password_hash: &str) -> bool {
        bcrypt::verify(password, password_hash).unwrap_or(false)
    }
}

pub async fn register_user(
    pool: &PgPool,
    hasher: PasswordHasher,
    req: RegisterRequest,
) -> Result<MessageResponse, ApiError> {
    let RegisterRequest {
        username,
        email,
        password,
    } = req;

    let password_hash = web::block(move || hasher.hash(&password)).await??;
    let user_id = db::create_user(pool, &username, &email, &password_hash).await?;

    tracing::info!(user_id, "User created");
    Ok(MessageResponse::new("User created"))
}

pub async fn login_user(
    pool: &PgPool,
    hasher: PasswordHasher,
    req: LoginRequest,
) -> Result<LoginResponse, ApiError> {
    let Some(user) = db::get_user_by_email(pool, &req.email).await? else {
        return Err(ApiError::Unauthorized);
    };

    let password = req.password;
    let password_hash = user.password_hash;
    let verified = web::block(move || hasher.verify(&password, &password_hash)).await?;
    if !verified {
        return Err(ApiError::Unauthorized);
    }

    Ok(LoginResponse {
        message: "Login successful".to_string(),
        user_id: user.id,
    })
}

#[post("/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    hasher: web::Data<PasswordHasher>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    let response = register_user(&pool, **hasher, req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    hasher: web::Data<PasswordHasher>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let response = login_user(&pool, **hasher, req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}
