// src/payments.rs
use crate::db;
use crate::error::ApiError;
use crate::models::{MessageResponse, PaymentMethod, PaymentRequest, PaymentStatus};
use actix_web::{HttpResponse, get, post, web};
use sqlx::PgPool;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_payment);
    cfg.service(payment_status);
    cfg.service(payment_methods);
}

/// Records that a user paid. There is no gateway behind this; the row is the
/// whole effect.
pub async fn record_payment(pool: &PgPool, req: PaymentRequest) -> Result<MessageResponse, ApiError> {
    db::create_payment(pool, req.user_id, req.type_id).await?;
    tracing::info!(user_id = req.user_id, type_id = req.type_id, "Payment recorded");
    Ok(MessageResponse::new("Payment successful"))
}

pub async fn latest_status(pool: &PgPool, user_id: i64) -> Result<PaymentStatus, ApiError> {
    let status = match db::get_latest_payment(pool, user_id).await? {
        Some(payment) => PaymentStatus {
            paid: payment.is_paid,
            date: Some(payment.payment_date),
        },
        None => PaymentStatus {
            paid: false,
            date: None,
        },
    };
    Ok(status)
}

pub async fn methods(pool: &PgPool) -> Result<Vec<PaymentMethod>, ApiError> {
    Ok(db::list_payment_types(pool).await?)
}

#[post("/payment/create")]
pub async fn create_payment(
    pool: web::Data<PgPool>,
    req: web::Json<PaymentRequest>,
) -> Result<HttpResponse, ApiError> {
    let response = record_payment(&pool, req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[get("/payment/status/{user_id}")]
pub async fn payment_status(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let status = latest_status(&pool, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(status))
}

#[get("/payment/methods")]
pub async fn payment_methods(pool: web::Data<PgPool>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(methods(&pool).await?))
}
