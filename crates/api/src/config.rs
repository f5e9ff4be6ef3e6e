use adsage_llm::CompletionConfig;
use adsage_payments::PaymentsConfig;

use crate::auth::jwt::AuthConfig;

/// Server configuration loaded from environment variables.
///
/// All server-level fields have defaults suitable for local development.
/// The nested provider configs carry their own required secrets.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `120`). Completions are slow.
    pub request_timeout_secs: u64,
    /// How long in-flight requests may drain after a shutdown signal (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Postgres pool size (default: `20`).
    pub db_max_connections: u32,
    /// Directory uploaded creative media is written to (default: `storage/media`).
    pub media_dir: String,
    /// Public origin used to build media URLs (default: `http://localhost:$PORT`).
    pub public_base_url: String,
    /// Bearer token validation.
    pub auth: AuthConfig,
    /// Chat-completion provider.
    pub completion: CompletionConfig,
    /// Payments provider.
    pub payments: PaymentsConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                  |
    /// |-------------------------|--------------------------|
    /// | `HOST`                  | `0.0.0.0`                |
    /// | `PORT`                  | `3000`                   |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`  |
    /// | `REQUEST_TIMEOUT_SECS`  | `120`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                     |
    /// | `DB_MAX_CONNECTIONS`    | `20`                     |
    /// | `MEDIA_DIR`             | `storage/media`          |
    /// | `PUBLIC_BASE_URL`       | `http://localhost:$PORT` |
    ///
    /// See [`AuthConfig::from_env`], [`CompletionConfig::from_env`] and
    /// [`PaymentsConfig::from_env`] for the nested settings.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let db_max_connections: u32 = std::env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "20".into())
            .parse()
            .expect("DB_MAX_CONNECTIONS must be a valid u32");

        let media_dir = std::env::var("MEDIA_DIR").unwrap_or_else(|_| "storage/media".into());

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{port}"))
            .trim_end_matches('/')
            .to_string();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            db_max_connections,
            media_dir,
            public_base_url,
            auth: AuthConfig::from_env(),
            completion: CompletionConfig::from_env(),
            payments: PaymentsConfig::from_env(),
        }
    }
}
