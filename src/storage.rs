// src/storage.rs
use crate::db;
use crate::error::ApiError;
use crate::models::{CreatedResponse, ModelUpload};
use actix_web::{HttpResponse, post, web};
use sqlx::PgPool;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(upload_model);
}

/// Stores the payload bytes as received; no dedup or size policy here.
pub async fn store_model(pool: &PgPool, upload: ModelUpload) -> Result<CreatedResponse, ApiError> {
    let id = db::create_model(pool, &upload.file_name, upload.file_data.as_bytes()).await?;
    tracing::info!(
        model_id = id,
        bytes = upload.file_data.len(),
        "Model uploaded"
    );

    Ok(CreatedResponse {
        message: "Model uploaded".to_string(),
        id,
    })
}

#[post("/model/upload")]
pub async fn upload_model(
    pool: web::Data<PgPool>,
    req: web::Json<ModelUpload>,
) -> Result<HttpResponse, ApiError> {
    let response = store_model(&pool, req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}
