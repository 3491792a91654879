//! Refresh token store errors.

use thiserror::Error;

use crate::credentials::{PasswordHashError, TokenError};

#[derive(Debug, Error)]
pub enum RefreshTokenError {
    /// The token cannot be redeemed. Callers must not distinguish the underlying cause
    /// to clients.
    #[error("invalid or expired refresh token")]
    Invalid,

    #[error("failed to issue refresh token")]
    Token(#[source] TokenError),

    #[error("failed to hash refresh token")]
    Hash(#[from] PasswordHashError),

    #[error("storage error")]
    Sql(#[from] sqlx::Error),
}
