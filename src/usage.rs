// src/usage.rs
use crate::db;
use crate::error::ApiError;
use crate::models::{MessageResponse, UsageLogRequest, UsageStats};
use actix_web::{HttpResponse, get, post, web};
use sqlx::PgPool;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(log_usage);
    cfg.service(usage_stats);
}

pub async fn record_usage(pool: &PgPool, req: UsageLogRequest) -> Result<MessageResponse, ApiError> {
    db::log_usage(pool, req.token_id, &req.value).await?;
    tracing::debug!(token_id = req.token_id, "Usage logged");
    Ok(MessageResponse::new("Logged"))
}

pub async fn stats(pool: &PgPool, token_id: i64) -> Result<UsageStats, ApiError> {
    let requests = db::count_usage(pool, token_id).await?;
    Ok(UsageStats { requests })
}

#[post("/usage/log")]
pub async fn log_usage(
    pool: web::Data<PgPool>,
    req: web::Json<UsageLogRequest>,
) -> Result<HttpResponse, ApiError> {
    let response = record_usage(&pool, req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[get("/usage/stats/{token_id}")]
pub async fn usage_stats(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let response = stats(&pool, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}
