// src/main.rs
use actix_web::{App, HttpResponse, HttpServer, get, middleware::Logger, web};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

mod auth;
mod config;
mod db;
mod error;
mod models;
mod payments;
mod requests;
mod storage;
mod token;
mod usage;

use error::ApiError;

#[get("/test")]
async fn liveness() -> HttpResponse {
    HttpResponse::Ok().json(["It worked"])
}

/// Malformed JSON bodies get the same `{"error": ...}` shape as every other failure.
fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into())
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(liveness);
    auth::init_routes(cfg);
    token::init_routes(cfg);
    storage::init_routes(cfg);
    requests::init_routes(cfg);
    payments::init_routes(cfg);
    usage::init_routes(cfg);
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting reconstruction API");

    let config = config::Config::from_env().map_err(|e| {
        tracing::error!("Failed to load config from environment: {}", e);
        std::io::Error::other(e)
    })?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to Postgres: {}", e);
            std::io::Error::other(e)
        })?;

    if config.run_migrations {
        sqlx::migrate!().run(&pool).await.map_err(|e| {
            tracing::error!("Failed to run migrations: {}", e);
            std::io::Error::other(e)
        })?;
        tracing::info!("Migrations applied");
    }

    let hasher = auth::PasswordHasher::new(config.bcrypt_cost);
    let json_limit = config.json_limit;
    let bind = (config.host.clone(), config.port);
    tracing::info!("Listening on {}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(hasher))
            .app_data(json_config(json_limit))
            .wrap(Logger::default())
            .configure(routes)
    })
    .bind(bind)?
    .run()
    .await
}
