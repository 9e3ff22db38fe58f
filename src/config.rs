use std::net::IpAddr;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    /// Rows per page for every listing. Passed into the pager explicitly
    /// rather than read from ambient state at query time.
    pub page_size: i64,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let jwt_secret = env_required("JWT_SECRET")?;

        let host: IpAddr = env_or("BACKOFFICE_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid BACKOFFICE_HOST: {e}"))?;

        let port: u16 = env_or("BACKOFFICE_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid BACKOFFICE_PORT: {e}"))?;

        let page_size: i64 = env_or("BACKOFFICE_PAGE_SIZE", "25")
            .parse()
            .map_err(|e| format!("Invalid BACKOFFICE_PAGE_SIZE: {e}"))?;
        if page_size < 1 {
            return Err("BACKOFFICE_PAGE_SIZE must be at least 1".to_string());
        }

        let log_level = env_or("BACKOFFICE_LOG_LEVEL", "info");

        Ok(Config {
            database_url,
            jwt_secret,
            host,
            port,
            page_size,
            log_level,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
