//! Database Config

use std::time::Duration;

use clap::Args;
use tenantry_app::database::DatabaseSettings;

/// Database settings.
#[derive(Debug, Args)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,

    /// Connections kept open while idle
    #[arg(long, env = "DATABASE_MIN_CONNECTIONS", default_value_t = 5)]
    pub database_min_connections: u32,

    /// Upper bound on open connections
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 20)]
    pub database_max_connections: u32,

    /// Seconds after which a connection is recycled
    #[arg(long, env = "DATABASE_MAX_LIFETIME_SECONDS", default_value_t = 3_600)]
    pub database_max_lifetime_seconds: u64,

    /// Seconds to wait for a free connection before failing
    #[arg(long, env = "DATABASE_ACQUIRE_TIMEOUT_SECONDS", default_value_t = 30)]
    pub database_acquire_timeout_seconds: u64,
}

impl DatabaseConfig {
    #[must_use]
    pub fn settings(&self) -> DatabaseSettings {
        DatabaseSettings {
            url: self.database_url.clone(),
            min_connections: self.database_min_connections,
            max_connections: self.database_max_connections,
            max_lifetime: Duration::from_secs(self.database_max_lifetime_seconds),
            acquire_timeout: Duration::from_secs(self.database_acquire_timeout_seconds),
        }
    }
}
