//! Environment configuration for the gallery server.
//!
//! The server is configured entirely through environment variables. There
//! is no config file, and nothing to cascade:
//!
//! | Variable | Required | Meaning |
//! |----------|----------|---------|
//! | `GALLERY_PASSWORD` | yes | the shared login password |
//! | `GALLERY_SESSION_SECRET` | no | overrides the derived session secret |
//! | `GALLERY_PORT` | no | listen port, default 8080 |
//!
//! A missing or empty password is a startup failure: serving the gallery
//! without one would leave it wide open, so the process refuses to start.
//!
//! Lookup is injected as a closure so tests can supply values without
//! touching the process environment.

use thiserror::Error;

pub const PASSWORD_VAR: &str = "GALLERY_PASSWORD";
pub const SESSION_SECRET_VAR: &str = "GALLERY_SESSION_SECRET";
pub const PORT_VAR: &str = "GALLERY_PORT";

const DEFAULT_PORT: u16 = 8080;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{PASSWORD_VAR} must be set to a non-empty value")]
    MissingPassword,
    #[error("{PORT_VAR} is not a valid port: {0}")]
    InvalidPort(String),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub password: String,
    pub session_secret: Option<String>,
    pub port: u16,
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an injected lookup.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let password = lookup(PASSWORD_VAR)
            .filter(|p| !p.is_empty())
            .ok_or(ConfigError::MissingPassword)?;

        let session_secret = lookup(SESSION_SECRET_VAR).filter(|s| !s.is_empty());

        let port = match lookup(PORT_VAR) {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            password,
            session_secret,
            port,
        })
    }
}
