// src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Clone, Debug, FromRow)]
pub struct UserCredentials {
    pub id: i64,
    pub password_hash: String,
}

#[derive(Clone, Debug, FromRow)]
pub struct TokenRecord {
    pub id: i64,
    pub expiration_date: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, FromRow)]
pub struct RequestSummary {
    pub id: i64,
    pub model: String,
    pub status: String,
    pub filename: String,
}

#[derive(Clone, Debug, FromRow)]
pub struct PaymentRecord {
    pub is_paid: bool,
    pub payment_date: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, FromRow)]
pub struct PaymentMethod {
    pub id: i64,
    pub name: String,
}

#[derive(Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    pub user_id: i64,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelUpload {
    pub file_name: String,
    pub file_data: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    pub model_name: String,
    pub image_id: i64,
    pub token_id: i64,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub user_id: i64,
    pub type_id: i64,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageLogRequest {
    pub token_id: i64,
    pub value: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Message plus the id of the row just created.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct CreatedResponse {
    pub message: String,
    pub id: i64,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub user_id: i64,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct IssuedToken {
    pub token: String,
    pub expires: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenValidation {
    pub status: String,
    pub token_id: i64,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct PaymentStatus {
    pub paid: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub date: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct UsageStats {
    pub requests: i64,
}
