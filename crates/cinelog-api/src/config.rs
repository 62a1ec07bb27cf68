use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::warn;

/// Placeholder JWT secrets that must not survive into a real deployment.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

#[derive(Debug, Clone)]
pub struct Config {
    pub mongodb_url: String,
    pub db_name: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub upload_dir: PathBuf,
    pub dataset_path: PathBuf,
    /// When set and the user collection is empty, an admin account is seeded
    /// with this password at startup.
    pub admin_password: Option<String>,
}

impl Config {
    /// Reads `CINELOG_*` variables, falling back to development defaults.
    pub fn load() -> Result<Self> {
        let mongodb_url = env_or("CINELOG_MONGODB_URL", "mongodb://localhost:27017");
        let db_name = env_or("CINELOG_DB_NAME", "cinelog");
        let host = env_or("CINELOG_HOST", "0.0.0.0");
        let port: u16 = env_or("CINELOG_PORT", "8000")
            .parse()
            .context("CINELOG_PORT must be a port number")?;

        let jwt_secret = env_or("CINELOG_JWT_SECRET", "dev-secret-change-me");
        if PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            warn!("CINELOG_JWT_SECRET is a placeholder; tokens issued with it are forgeable");
        }

        let token_ttl_minutes: i64 = env_or("CINELOG_TOKEN_TTL_MINUTES", "1440")
            .parse()
            .context("CINELOG_TOKEN_TTL_MINUTES must be a number of minutes")?;

        let upload_dir = PathBuf::from(env_or("CINELOG_UPLOAD_DIR", "./uploads"));
        let dataset_path = PathBuf::from(env_or("CINELOG_DATASET", "./dataset/movies.json"));
        let admin_password = std::env::var("CINELOG_ADMIN_PASSWORD")
            .ok()
            .filter(|value| !value.is_empty());

        Ok(Self {
            mongodb_url,
            db_name,
            host,
            port,
            jwt_secret,
            token_ttl_minutes,
            upload_dir,
            dataset_path,
            admin_password,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
