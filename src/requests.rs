// src/requests.rs
use crate::db;
use crate::error::ApiError;
use crate::models::{CreateRequest, CreatedResponse, RequestSummary};
use actix_web::{HttpResponse, get, post, web};
use sqlx::PgPool;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_request);
    cfg.service(list_requests);
}

/// Records a processing job in the initial status. Status is never changed
/// through this API.
pub async fn submit_request(pool: &PgPool, req: CreateRequest) -> Result<CreatedResponse, ApiError> {
    let id = db::create_request(pool, &req.model_name, req.image_id, req.token_id).await?;
    tracing::info!(
        request_id = id,
        token_id = req.token_id,
        image_id = req.image_id,
        "Request created"
    );

    Ok(CreatedResponse {
        message: "Request created".to_string(),
        id,
    })
}

pub async fn requests_for_token(
    pool: &PgPool,
    token_id: i64,
) -> Result<Vec<RequestSummary>, ApiError> {
    Ok(db::list_requests(pool, token_id).await?)
}

#[post("/request/create")]
pub async fn create_request(
    pool: web::Data<PgPool>,
    req: web::Json<CreateRequest>,
) -> Result<HttpResponse, ApiError> {
    let response = submit_request(&pool, req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[get("/request/list/{token_id}")]
pub async fn list_requests(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let requests = requests_for_token(&pool, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(requests))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test]
    async fn test_no_requests_is_empty_list(pool: PgPool) {
        let requests = requests_for_token(&pool, 12345).await.unwrap();
        assert!(requests.is_empty());
    }

    #[sqlx::test]
    async fn test_dangling_references_surface_as_store_error(pool: PgPool) {
        let err = submit_request(
            &pool,
            CreateRequest {
                model_name: "ghost".to_string(),
                image_id: 999,
                token_id: 999,
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ApiError::Store(_)));
    }
}
