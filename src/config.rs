// src/config.rs
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub database_url: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
    /// Upper bound for JSON bodies, sized for base64 model uploads.
    #[serde(default = "default_json_limit")]
    pub json_limit: usize,
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_connections() -> u32 {
    5
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

fn default_json_limit() -> usize {
    16 * 1024 * 1024
}

fn default_run_migrations() -> bool {
    true
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }
}
