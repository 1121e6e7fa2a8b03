use common::jwt::TokenVerifier;
use std::collections::HashMap;
use std::env;
use thiserror::Error;

pub const DEFAULT_APP_NAME: &str = "api-gateway";
pub const DEFAULT_ENVIRONMENT: &str = "prod";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_JWT_ISSUER: &str = "fintech-auth";
pub const DEFAULT_JWT_AUDIENCE: &str = "fintech-platform";

/// Gateway configuration. Holds no private key material.
#[derive(Debug, Clone)]
pub struct Config {
    pub app_name: String,
    pub environment: String,
    pub port: u16,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub jwt_public_key_pem: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Build from an explicit variable map.
    ///
    /// `JWT_PUBLIC_KEY` is required and must parse as an RSA public key.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str, default: &str| {
            vars.get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
                .to_string()
        };

        let port = match vars.get("PORT").map(|v| v.trim()).filter(|v| !v.is_empty()) {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                var: "PORT".to_string(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let jwt_public_key_pem = vars
            .get("JWT_PUBLIC_KEY")
            .filter(|v| !v.trim().is_empty())
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnvVar("JWT_PUBLIC_KEY".to_string()))?;

        let config = Config {
            app_name: get("APP_NAME", DEFAULT_APP_NAME),
            environment: get("ENVIRONMENT", DEFAULT_ENVIRONMENT),
            port,
            jwt_issuer: get("JWT_ISSUER", DEFAULT_JWT_ISSUER),
            jwt_audience: get("JWT_AUDIENCE", DEFAULT_JWT_AUDIENCE),
            jwt_public_key_pem,
        };

        // Fail at startup rather than on the first request
        config.verifier()?;
        Ok(config)
    }

    pub fn verifier(&self) -> Result<TokenVerifier, ConfigError> {
        TokenVerifier::from_public_key_pem(
            &self.jwt_public_key_pem,
            &self.jwt_issuer,
            &self.jwt_audience,
        )
        .map_err(|e| ConfigError::InvalidValue {
            var: "JWT_PUBLIC_KEY".to_string(),
            reason: e.to_string(),
        })
    }
}
