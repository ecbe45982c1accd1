/*
 * Responsibility
 * - read environment variables / .env (DATABASE_URL, Firebase project, CORS, uploads...)
 * - validate values (missing required keys abort startup)
 */
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com/v1";
pub const DEFAULT_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw
            .unwrap_or("development")
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub database_url: String,
    pub database_max_connections: u32,

    pub cors_allowed_origins: Vec<String>,

    pub firebase_project_id: String,
    pub firebase_api_key: String,
    pub identity_base_url: String,
    pub jwks_url: String,
    pub identity_timeout: Duration,
    pub id_token_leeway_seconds: u64,

    pub upload_dir: PathBuf,
    pub upload_max_bytes: usize,
    pub request_timeout: Duration,

    pub rate_limit_max_requests: u32,
    pub rate_limit_window: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// `from_env` passes `std::env::var`; tests pass a map.
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = parse_or(&var, "PORT", 5000)?;
        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(var("APP_ENV").as_deref());

        let database_url = required(&var, "DATABASE_URL")?;
        let database_max_connections = parse_or(&var, "DATABASE_MAX_CONNECTIONS", 10)?;

        let cors_allowed_origins = var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let firebase_project_id = required(&var, "FIREBASE_PROJECT_ID")?;
        let firebase_api_key = required(&var, "FIREBASE_API_KEY")?;

        let identity_base_url = var("FIREBASE_IDENTITY_URL")
            .unwrap_or_else(|| DEFAULT_IDENTITY_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let jwks_url = var("FIREBASE_JWKS_URL").unwrap_or_else(|| DEFAULT_JWKS_URL.to_string());

        let identity_timeout =
            Duration::from_secs(parse_or(&var, "IDENTITY_TIMEOUT_SECONDS", 10)?);
        let id_token_leeway_seconds = parse_or(&var, "ID_TOKEN_LEEWAY_SECONDS", 5)?;

        let upload_dir = PathBuf::from(var("UPLOAD_DIR").unwrap_or_else(|| "uploads".into()));
        let upload_max_bytes = parse_or(&var, "UPLOAD_MAX_BYTES", 5 * 1024 * 1024)?;
        let request_timeout = Duration::from_secs(parse_or(&var, "REQUEST_TIMEOUT_SECONDS", 30)?);

        let rate_limit_max_requests: u32 = parse_or(&var, "RATE_LIMIT_MAX_REQUESTS", 100)?;
        if rate_limit_max_requests == 0 {
            return Err(ConfigError::Invalid("RATE_LIMIT_MAX_REQUESTS"));
        }
        let rate_limit_window_seconds: u64 = parse_or(&var, "RATE_LIMIT_WINDOW_SECONDS", 900)?;
        if rate_limit_window_seconds == 0 {
            return Err(ConfigError::Invalid("RATE_LIMIT_WINDOW_SECONDS"));
        }

        Ok(Self {
            addr,
            app_env,
            database_url,
            database_max_connections,
            cors_allowed_origins,
            firebase_project_id,
            firebase_api_key,
            identity_base_url,
            jwks_url,
            identity_timeout,
            id_token_leeway_seconds,
            upload_dir,
            upload_max_bytes,
            request_timeout,
            rate_limit_max_requests,
            rate_limit_window: Duration::from_secs(rate_limit_window_seconds),
        })
    }
}

fn required<F>(var: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    var(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(key))
}

// Unset means default; set but unparsable is an error rather than a silent fallback.
fn parse_or<F, T>(var: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match var(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}
