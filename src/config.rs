use std::env;
use std::net::IpAddr;
use thiserror::Error;

/// Table queried when `SUPABASE_TABLE` is not set.
pub const DEFAULT_TABLE: &str = "students";
/// Port used when neither `SERVER_PORT` nor `--port` is provided.
pub const DEFAULT_PORT: u16 = 5000;
/// Frontend origins allowed by default (Vite dev server and preview).
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://localhost:4173"];

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the student API server.
///
/// Built once at startup and handed to the store client and router; nothing reads the
/// environment after that.
#[derive(Clone)]
pub struct Config {
    /// Base URL of the hosted database project.
    pub supabase_url: String,
    /// Access key sent with every request to the database.
    pub supabase_key: String,
    /// Table that backs the `/api/students` resource.
    pub supabase_table: String,
    /// Address the HTTP server binds to.
    pub server_host: IpAddr,
    /// Port the HTTP server binds to.
    pub server_port: u16,
    /// Origins permitted by the CORS layer.
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            supabase_url: load_env("SUPABASE_URL")?,
            supabase_key: load_env("SUPABASE_KEY")?,
            supabase_table: load_env_optional("SUPABASE_TABLE")
                .unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            server_host: load_env_optional("SERVER_HOST")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_HOST".into()))
                })
                .transpose()?
                .unwrap_or(IpAddr::from([127, 0, 0, 1])),
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?
                .unwrap_or(DEFAULT_PORT),
            allowed_origins: load_env_optional("CORS_ALLOWED_ORIGINS")
                .map(|value| parse_origins(&value))
                .transpose()?
                .unwrap_or_else(default_origins),
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

// `*` cannot be combined with credentialed CORS.
fn parse_origins(raw: &str) -> Result<Vec<String>, ConfigError> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect();
    if origins.iter().any(|origin| origin == "*") {
        return Err(ConfigError::InvalidValue("CORS_ALLOWED_ORIGINS".into()));
    }
    Ok(origins)
}

fn default_origins() -> Vec<String> {
    DEFAULT_ALLOWED_ORIGINS
        .iter()
        .map(|origin| origin.to_string())
        .collect()
}

/// Build the configuration from the process environment and log the non-secret parts.
///
/// Callers that want `.env` support should run `dotenvy::dotenv()` first.
pub fn load_config() -> Result<Config, ConfigError> {
    let config = Config::from_env()?;
    tracing::debug!(
        supabase_url = %config.supabase_url,
        table = %config.supabase_table,
        host = %config.server_host,
        port = config.server_port,
        origins = ?config.allowed_origins,
        "Loaded configuration"
    );
    Ok(config)
}
