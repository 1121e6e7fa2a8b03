use common::secret::SecretString;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_APP_NAME: &str = "auth-service";
pub const DEFAULT_ENVIRONMENT: &str = "dev";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8081";

pub const DEFAULT_JWT_ISSUER: &str = "fintech-auth";
pub const DEFAULT_JWT_AUDIENCE: &str = "fintech-platform";

/// Access token lifetime (15 minutes).
pub const DEFAULT_ACCESS_TOKEN_TTL_SECONDS: i64 = 900;

/// Refresh token lifetime (7 days).
pub const DEFAULT_REFRESH_TOKEN_TTL_SECONDS: i64 = 604_800;

/// Longest accepted lifetime for either token (365 days).
pub const MAX_TOKEN_TTL_SECONDS: i64 = 31_536_000;

/// Mounted secret path tried before falling back to `JWT_PRIVATE_KEY`.
pub const DEFAULT_JWT_PRIVATE_KEY_PATH: &str = "/var/run/secrets/jwt/jwt_private.pem";

/// Upper bound on any single store call.
pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 3000;
pub const MIN_STORE_TIMEOUT_MS: u64 = 100;
pub const MAX_STORE_TIMEOUT_MS: u64 = 10_000;

pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_DB_SSLMODE: &str = "require";

/// Bcrypt cost factor (2^12 iterations, roughly 200ms per hash).
pub const DEFAULT_BCRYPT_COST: u32 = 12;
/// Below 10 is too weak for password storage.
pub const MIN_BCRYPT_COST: u32 = 10;
/// Above 14 pushes login latency past a second.
pub const MAX_BCRYPT_COST: u32 = 14;

pub const DEFAULT_HEALTH_CHECK_INTERVAL_SECONDS: u64 = 5;

/// Where the relational store lives.
#[derive(Debug, Clone)]
pub enum DatabaseConfig {
    /// A full connection URL from `DATABASE_URL`.
    Url(SecretString),
    /// Individual `DB_*` parameters.
    Parts {
        host: String,
        port: u16,
        name: String,
        user: String,
        password: SecretString,
        ssl_mode: String,
    },
}

impl DatabaseConfig {
    /// Build sqlx connect options without ever formatting the password into a string.
    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        use common::secret::ExposeSecret;

        match self {
            DatabaseConfig::Url(url) => PgConnectOptions::from_str(url.expose_secret())
                .map_err(|e| ConfigError::InvalidValue {
                    var: "DATABASE_URL".to_string(),
                    reason: e.to_string(),
                }),
            DatabaseConfig::Parts {
                host,
                port,
                name,
                user,
                password,
                ssl_mode,
            } => {
                let ssl_mode =
                    PgSslMode::from_str(ssl_mode).map_err(|e| ConfigError::InvalidValue {
                        var: "DB_SSLMODE".to_string(),
                        reason: e.to_string(),
                    })?;
                Ok(PgConnectOptions::new()
                    .host(host)
                    .port(*port)
                    .database(name)
                    .username(user)
                    .password(password.expose_secret())
                    .ssl_mode(ssl_mode))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub app_name: String,
    pub environment: String,
    pub bind_address: String,
    pub database: DatabaseConfig,
    pub db_max_connections: u32,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub access_token_ttl_seconds: i64,
    pub refresh_token_ttl_seconds: i64,
    /// RSA private key PEM (PKCS#1 or PKCS#8). Never logged.
    pub jwt_private_key_pem: SecretString,
    /// RSA public key PEM (PKIX).
    pub jwt_public_key_pem: String,
    pub store_timeout: Duration,
    pub bcrypt_cost: u32,
    pub health_check_interval: Duration,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let app_name = non_empty(vars, "APP_NAME").unwrap_or_else(|| DEFAULT_APP_NAME.to_string());
        let environment =
            non_empty(vars, "ENVIRONMENT").unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());

        let bind_address = match (non_empty(vars, "BIND_ADDRESS"), non_empty(vars, "PORT")) {
            (Some(addr), _) => addr,
            (None, Some(port)) => {
                let port: u16 = port.parse().map_err(|_| ConfigError::InvalidValue {
                    var: "PORT".to_string(),
                    reason: format!("'{port}' is not a valid port"),
                })?;
                format!("0.0.0.0:{port}")
            }
            (None, None) => DEFAULT_BIND_ADDRESS.to_string(),
        };

        let database = load_database_config(vars)?;

        let db_max_connections =
            parse_or_default(vars, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?;
        if db_max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                var: "DB_MAX_CONNECTIONS".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let jwt_issuer =
            non_empty(vars, "JWT_ISSUER").unwrap_or_else(|| DEFAULT_JWT_ISSUER.to_string());
        let jwt_audience =
            non_empty(vars, "JWT_AUDIENCE").unwrap_or_else(|| DEFAULT_JWT_AUDIENCE.to_string());

        let access_token_ttl_seconds = parse_positive_seconds(
            vars,
            "ACCESS_TOKEN_TTL_SECONDS",
            DEFAULT_ACCESS_TOKEN_TTL_SECONDS,
        )?;
        let refresh_token_ttl_seconds = parse_positive_seconds(
            vars,
            "REFRESH_TOKEN_TTL_SECONDS",
            DEFAULT_REFRESH_TOKEN_TTL_SECONDS,
        )?;

        let jwt_private_key_pem = load_private_key_pem(vars)?;
        let jwt_public_key_pem = non_empty(vars, "JWT_PUBLIC_KEY")
            .ok_or_else(|| ConfigError::MissingEnvVar("JWT_PUBLIC_KEY".to_string()))?;

        let store_timeout_ms = parse_or_default(vars, "STORE_TIMEOUT_MS", DEFAULT_STORE_TIMEOUT_MS)?;
        if !(MIN_STORE_TIMEOUT_MS..=MAX_STORE_TIMEOUT_MS).contains(&store_timeout_ms) {
            return Err(ConfigError::InvalidValue {
                var: "STORE_TIMEOUT_MS".to_string(),
                reason: format!(
                    "{store_timeout_ms} is outside {MIN_STORE_TIMEOUT_MS}-{MAX_STORE_TIMEOUT_MS}"
                ),
            });
        }

        let bcrypt_cost = parse_or_default(vars, "BCRYPT_COST", DEFAULT_BCRYPT_COST)?;
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&bcrypt_cost) {
            return Err(ConfigError::InvalidValue {
                var: "BCRYPT_COST".to_string(),
                reason: format!("{bcrypt_cost} is outside {MIN_BCRYPT_COST}-{MAX_BCRYPT_COST}"),
            });
        }

        let health_check_interval_seconds = parse_or_default(
            vars,
            "HEALTH_CHECK_INTERVAL_SECONDS",
            DEFAULT_HEALTH_CHECK_INTERVAL_SECONDS,
        )?;
        if health_check_interval_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                var: "HEALTH_CHECK_INTERVAL_SECONDS".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Config {
            app_name,
            environment,
            bind_address,
            database,
            db_max_connections,
            jwt_issuer,
            jwt_audience,
            access_token_ttl_seconds,
            refresh_token_ttl_seconds,
            jwt_private_key_pem,
            jwt_public_key_pem,
            store_timeout: Duration::from_millis(store_timeout_ms),
            bcrypt_cost,
            health_check_interval: Duration::from_secs(health_check_interval_seconds),
        })
    }
}

fn non_empty(vars: &HashMap<String, String>, key: &str) -> Option<String> {
    vars.get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

fn parse_or_default<T: FromStr>(
    vars: &HashMap<String, String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match non_empty(vars, key) {
        Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
            var: key.to_string(),
            reason: format!("'{raw}' is not a valid number"),
        }),
        None => Ok(default),
    }
}

fn parse_positive_seconds(
    vars: &HashMap<String, String>,
    key: &str,
    default: i64,
) -> Result<i64, ConfigError> {
    let value: i64 = parse_or_default(vars, key, default)?;
    if value <= 0 {
        return Err(ConfigError::InvalidValue {
            var: key.to_string(),
            reason: format!("{value} must be a positive number of seconds"),
        });
    }
    if value > MAX_TOKEN_TTL_SECONDS {
        return Err(ConfigError::InvalidValue {
            var: key.to_string(),
            reason: format!("{value} exceeds the maximum of {MAX_TOKEN_TTL_SECONDS} seconds"),
        });
    }
    Ok(value)
}

/// `DATABASE_URL` wins; otherwise every `DB_*` part without a default must be set.
fn load_database_config(vars: &HashMap<String, String>) -> Result<DatabaseConfig, ConfigError> {
    if let Some(url) = non_empty(vars, "DATABASE_URL") {
        return Ok(DatabaseConfig::Url(SecretString::from(url)));
    }

    let host = non_empty(vars, "DB_HOST");
    let name = non_empty(vars, "DB_NAME");
    let user = non_empty(vars, "DB_USER");
    let password = non_empty(vars, "DB_PASSWORD");

    match (host, name, user, password) {
        (Some(host), Some(name), Some(user), Some(password)) => {
            let port = parse_or_default(vars, "DB_PORT", DEFAULT_DB_PORT)?;
            let ssl_mode =
                non_empty(vars, "DB_SSLMODE").unwrap_or_else(|| DEFAULT_DB_SSLMODE.to_string());
            PgSslMode::from_str(&ssl_mode).map_err(|e| ConfigError::InvalidValue {
                var: "DB_SSLMODE".to_string(),
                reason: e.to_string(),
            })?;
            Ok(DatabaseConfig::Parts {
                host,
                port,
                name,
                user,
                password: SecretString::from(password),
                ssl_mode,
            })
        }
        (host, name, user, password) => {
            let missing: Vec<&str> = [
                ("DB_HOST", host.is_none()),
                ("DB_NAME", name.is_none()),
                ("DB_USER", user.is_none()),
                ("DB_PASSWORD", password.is_none()),
            ]
            .into_iter()
            .filter_map(|(key, is_missing)| is_missing.then_some(key))
            .collect();
            Err(ConfigError::MissingEnvVar(format!(
                "DATABASE_URL or {}",
                missing.join(", ")
            )))
        }
    }
}

/// The mounted file takes precedence; an unreadable or empty file falls back
/// to `JWT_PRIVATE_KEY`.
fn load_private_key_pem(vars: &HashMap<String, String>) -> Result<SecretString, ConfigError> {
    let path = non_empty(vars, "JWT_PRIVATE_KEY_PATH")
        .unwrap_or_else(|| DEFAULT_JWT_PRIVATE_KEY_PATH.to_string());

    match std::fs::read_to_string(&path) {
        Ok(contents) if !contents.trim().is_empty() => {
            return Ok(SecretString::from(contents));
        }
        Ok(_) => {
            tracing::warn!(path = %path, "Private key file is empty, falling back to JWT_PRIVATE_KEY");
        }
        Err(e) => {
            tracing::warn!(
                path = %path,
                error = %e,
                "Private key file unreadable, falling back to JWT_PRIVATE_KEY"
            );
        }
    }

    non_empty(vars, "JWT_PRIVATE_KEY")
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::MissingEnvVar("JWT_PRIVATE_KEY".to_string()))
}
