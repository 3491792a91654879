//! Auth Config

use clap::{Args, ValueEnum};
use jiff::SignedDuration;
use tenantry_app::credentials::{PasswordHashError, PasswordHasher, TokenTtls};

use crate::config::ConfigError;

/// Shortest signing secret accepted without complaint.
const MIN_SECRET_LENGTH: usize = 64;

/// Placeholder shipped in example environment files.
const PLACEHOLDER_SECRET: &str = "changethis";

/// Deployment environment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Environment {
    /// Developer machine.
    Local,

    /// Pre-production.
    Staging,

    /// Production. Configuration warnings become errors.
    Production,
}

/// Token signing and password hashing settings.
#[derive(Debug, Args)]
pub struct AuthConfig {
    /// Secret used to sign tokens and seal provider credentials
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Deployment environment (local, staging, production)
    #[arg(long, env = "ENVIRONMENT", value_enum, default_value_t = Environment::Local)]
    pub environment: Environment,

    /// Access token lifetime in minutes
    #[arg(long, env = "ACCESS_TOKEN_TTL_MINUTES", default_value_t = 1_440)]
    pub access_token_ttl_minutes: i64,

    /// Refresh token lifetime in days
    #[arg(long, env = "REFRESH_TOKEN_TTL_DAYS", default_value_t = 30)]
    pub refresh_token_ttl_days: i64,

    /// Email verification token lifetime in hours
    #[arg(long, env = "EMAIL_VERIFICATION_TTL_HOURS", default_value_t = 24)]
    pub email_verification_ttl_hours: i64,

    /// Password reset token lifetime in minutes
    #[arg(long, env = "PASSWORD_RESET_TTL_MINUTES", default_value_t = 60)]
    pub password_reset_ttl_minutes: i64,

    /// Argon2id memory cost in KiB
    #[arg(long, env = "PASSWORD_HASH_MEMORY_KIB", default_value_t = 19_456)]
    pub password_hash_memory_kib: u32,

    /// Argon2id iteration count
    #[arg(long, env = "PASSWORD_HASH_ITERATIONS", default_value_t = 2)]
    pub password_hash_iterations: u32,
}

impl AuthConfig {
    /// Refuse unusable secrets; a short one only warns outside production.
    pub(super) fn check_secret(&self) -> Result<Option<String>, ConfigError> {
        if self.jwt_secret == PLACEHOLDER_SECRET {
            return Err(ConfigError::WeakSecret("must be changed from its placeholder value"));
        }

        if self.jwt_secret.len() >= MIN_SECRET_LENGTH {
            return Ok(None);
        }

        if self.environment == Environment::Production {
            return Err(ConfigError::WeakSecret("must be at least 64 characters long"));
        }

        Ok(Some(format!(
            "JWT_SECRET is shorter than {MIN_SECRET_LENGTH} characters; use a longer secret in production"
        )))
    }

    #[must_use]
    pub fn token_ttls(&self) -> TokenTtls {
        TokenTtls {
            access: SignedDuration::from_mins(self.access_token_ttl_minutes),
            refresh: SignedDuration::from_hours(self.refresh_token_ttl_days * 24),
            email_verification: SignedDuration::from_hours(self.email_verification_ttl_hours),
            password_reset: SignedDuration::from_mins(self.password_reset_ttl_minutes),
        }
    }

    /// Build the password hasher with the configured work factor.
    ///
    /// # Errors
    ///
    /// Returns an error when Argon2 rejects the parameters.
    pub fn password_hasher(&self) -> Result<PasswordHasher, PasswordHashError> {
        PasswordHasher::new(
            self.password_hash_memory_kib,
            self.password_hash_iterations,
            1,
        )
    }
}
