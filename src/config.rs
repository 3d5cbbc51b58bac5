use std::{env, time::Duration};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub park_api_url: String,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub park_api_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let park_api_url = env::var("PARK_API_URL")
            .map_err(|_| anyhow::anyhow!("PARK_API_URL is not set"))?;
        let jwt_secret =
            env::var("JWT_SECRET").map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let timeout_secs = env::var("PARK_API_TIMEOUT_SECS")
            .ok()
            .and_then(|t| t.parse::<u64>().ok())
            .unwrap_or(10);
        Ok(Self {
            park_api_url,
            jwt_secret,
            host,
            port,
            park_api_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
