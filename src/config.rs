//! Process-wide configuration loaded from the environment.
//!
//! Mirrors the shape of `logging::LoggingConfig::from_env`: every field has a
//! typed default so that a missing optional variable never fails server
//! boot (the heavy-job limit and watcher stagger delay in particular must be
//! absent-tolerant per the job queue design).

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub service_key: Option<String>,
    pub jwt_signing_key: String,
    pub access_token_ttl_secs: i64,
    pub refresh_token_ttl_secs: i64,
    pub auth_code_ttl_secs: i64,
    pub heavy_job_limit: usize,
    pub watcher_startup_delay_secs: u64,
    pub service_user_stale_days: i64,
    pub oauth_issuer: String,
    pub eodhd_api_key: Option<String>,
    pub eodhd_api_base: String,
    pub navexa_api_base: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL must be set".to_string())?;
        let jwt_signing_key = std::env::var("JWT_SIGNING_KEY")
            .map_err(|_| "JWT_SIGNING_KEY must be set".to_string())?;

        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let service_key = std::env::var("VIRE_SERVICE_KEY").ok().filter(|k| !k.is_empty());

        let access_token_ttl_secs = std::env::var("ACCESS_TOKEN_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3600);
        let refresh_token_ttl_secs = std::env::var("REFRESH_TOKEN_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1_209_600);
        let auth_code_ttl_secs = std::env::var("AUTH_CODE_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(120);

        // Both of these are allowed to be absent; server boot must not fail.
        let heavy_job_limit = std::env::var("HEAVY_JOB_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(2);
        let watcher_startup_delay_secs = std::env::var("WATCHER_STARTUP_DELAY_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);

        let service_user_stale_days = std::env::var("SERVICE_USER_STALE_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        let oauth_issuer = std::env::var("OAUTH_ISSUER")
            .unwrap_or_else(|_| format!("http://{}", bind_addr));

        let eodhd_api_key = std::env::var("EODHD_API_KEY").ok();
        let eodhd_api_base =
            std::env::var("EODHD_API_BASE").unwrap_or_else(|_| "https://eodhd.com/api".to_string());
        let navexa_api_base = std::env::var("NAVEXA_API_BASE")
            .unwrap_or_else(|_| "https://api.navexa.io".to_string());

        Ok(Self {
            database_url,
            bind_addr,
            service_key,
            jwt_signing_key,
            access_token_ttl_secs,
            refresh_token_ttl_secs,
            auth_code_ttl_secs,
            heavy_job_limit,
            watcher_startup_delay_secs,
            service_user_stale_days,
            oauth_issuer,
            eodhd_api_key,
            eodhd_api_base,
            navexa_api_base,
        })
    }
}
