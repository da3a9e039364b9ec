use crate::auth::jwt::JwtConfig;

/// Deployment environment, from `APP_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Dev,
    Test,
    Production,
}

impl AppEnv {
    fn parse(value: &str) -> Self {
        match value {
            "production" => AppEnv::Production,
            "test" => AppEnv::Test,
            _ => AppEnv::Dev,
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development. Third-party
/// credentials are optional; the matching feature is disabled without them.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    pub shutdown_timeout_secs: u64,
    pub app_env: AppEnv,
    /// Web client base URL, used for checkout redirects.
    pub client_url: String,
    pub redis_url: Option<String>,
    pub stripe_webhook_secret: Option<String>,
    pub stripe_secret_key: Option<String>,
    pub tmdb_access_token: Option<String>,
    pub mal_client_id: Option<String>,
    pub jwt: JwtConfig,
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `3333`                  |
    /// | `CORS_ORIGINS`          | `http://localhost:3000` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                    |
    /// | `APP_ENV`               | `dev`                   |
    /// | `CLIENT_URL`            | `http://localhost:3000` |
    ///
    /// `REDIS_URL`, `STRIPE_WEBHOOK_SECRET`, `STRIPE_SECRET_KEY`,
    /// `TMDB_ACCESS_TOKEN` and `MAL_CLIENT_ID` are optional.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3333".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let app_env = AppEnv::parse(&std::env::var("APP_ENV").unwrap_or_default());
        let client_url =
            std::env::var("CLIENT_URL").unwrap_or_else(|_| "http://localhost:3000".into());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            app_env,
            client_url,
            redis_url: optional_env("REDIS_URL"),
            stripe_webhook_secret: optional_env("STRIPE_WEBHOOK_SECRET"),
            stripe_secret_key: optional_env("STRIPE_SECRET_KEY"),
            tmdb_access_token: optional_env("TMDB_ACCESS_TOKEN"),
            mal_client_id: optional_env("MAL_CLIENT_ID"),
            jwt: JwtConfig::from_env(),
        }
    }
}
