//! Auth service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::{
    cache::CacheError,
    credentials::{PasswordHashError, SecretError, TokenError},
    domain::refresh_tokens::RefreshTokenError,
};

/// Which limit a caller ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimit {
    ResendVerification,
    PasswordReset,
    OAuth,
}

impl RateLimit {
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ResendVerification => "Please wait 60 seconds before requesting another email",
            Self::PasswordReset => {
                "Too many password reset requests. Please try again in 1 hour."
            }
            Self::OAuth => "Too many OAuth requests. Please try again in 1 minute.",
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthServiceError {
    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },

    #[error("A user with this email already exists")]
    EmailTaken,

    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Inactive user")]
    InactiveUser,

    #[error("Email not verified. Please check your email for verification link.")]
    EmailNotVerified,

    #[error("Invalid or expired refresh token")]
    InvalidRefreshToken,

    #[error("Could not validate credentials")]
    Unauthenticated,

    #[error("User not found")]
    UserNotFound,

    /// A non-superuser without a tenant. Serving it would leave queries unscoped.
    #[error("User has no tenant association - data isolation cannot be guaranteed")]
    MissingTenant,

    #[error("Invalid or expired verification token")]
    InvalidToken,

    #[error("Invalid or expired reset token")]
    InvalidResetToken,

    #[error("This password reset link has already been used")]
    ResetTokenReused,

    #[error("{}", .0.message())]
    RateLimited(RateLimit),

    #[error("Invalid or expired state parameter. Please try again.")]
    InvalidOAuthState,

    #[error("storage error")]
    Sql(#[source] Error),

    #[error("password hashing error")]
    Hash(#[from] PasswordHashError),

    #[error("token issuing error")]
    Token(#[from] TokenError),

    #[error("secret sealing error")]
    Secret(#[from] SecretError),

    #[error("refresh token store error")]
    RefreshStore(#[source] RefreshTokenError),

    #[error("cache error")]
    Cache(#[from] CacheError),
}

/// Unique index on `lower(users.email)`.
const USERS_EMAIL_KEY: &str = "users_email_key";

impl From<Error> for AuthServiceError {
    fn from(error: Error) -> Self {
        // Two registrations racing on the same address. Other unique violations, such
        // as two OAuth callbacks linking one provider identity, stay storage errors.
        let email_taken = error.as_database_error().is_some_and(|db_error| {
            db_error.kind() == ErrorKind::UniqueViolation
                && db_error.constraint() == Some(USERS_EMAIL_KEY)
        });

        if email_taken {
            return Self::EmailTaken;
        }

        Self::Sql(error)
    }
}

impl From<RefreshTokenError> for AuthServiceError {
    fn from(error: RefreshTokenError) -> Self {
        match error {
            RefreshTokenError::Invalid => Self::InvalidRefreshToken,
            other => Self::RefreshStore(other),
        }
    }
}
