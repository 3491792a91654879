//! Server configuration module

use clap::Parser;
use thiserror::Error;

use crate::config::{
    auth::AuthConfig, db::DatabaseConfig, email::EmailConfig, jobs::JobsConfig,
    observability::LoggingConfig, server::ServerRuntimeConfig,
};

pub(crate) mod auth;
pub(crate) mod db;
pub(crate) mod email;
pub(crate) mod jobs;
pub(crate) mod observability;
pub(crate) mod server;

/// Configuration that parsed but cannot be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Flags or environment could not be parsed.
    #[error(transparent)]
    Args(#[from] clap::Error),

    /// The signing secret is unsafe for this environment.
    #[error("JWT_SECRET {0}")]
    WeakSecret(&'static str),

    /// Email delivery is enabled without a sender address.
    #[error("EMAILS_FROM_EMAIL is required when EMAILS_ENABLED is set")]
    MissingSender,
}

/// Tenantry JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "tenantry-json", about = "Tenantry JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Token signing and password hashing settings.
    #[command(flatten)]
    pub auth: AuthConfig,

    /// Outbound email settings.
    #[command(flatten)]
    pub email: EmailConfig,

    /// Background job settings.
    #[command(flatten)]
    pub jobs: JobsConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments.
    ///
    /// Returns the configuration together with warnings to log once logging is up.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed or is unsafe to run with.
    pub fn load() -> Result<(Self, Vec<String>), ConfigError> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        let config = Self::try_parse()?;
        let warnings = config.validate()?;

        Ok((config, warnings))
    }

    fn validate(&self) -> Result<Vec<String>, ConfigError> {
        let mut warnings = Vec::new();

        if let Some(warning) = self.auth.check_secret()? {
            warnings.push(warning);
        }

        self.email.check_sender()?;

        Ok(warnings)
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }
}
