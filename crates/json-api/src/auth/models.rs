//! Auth request and response bodies shared across handlers.

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tenantry_app::{auth::TokenPair, domain::users::records::UserRecord};

/// Access and refresh tokens.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct TokenResponse {
    /// Bearer token for protected routes
    pub access_token: String,

    /// Single-use token for `/auth/refresh`
    pub refresh_token: String,

    /// Always `bearer`.
    pub token_type: String,
}

impl From<TokenPair> for TokenResponse {
    fn from(pair: TokenPair) -> Self {
        TokenResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: pair.token_type.to_string(),
        }
    }
}

/// Human-readable outcome.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct MessageResponse {
    /// Outcome message
    pub message: String,
}

impl MessageResponse {
    pub(crate) fn new(message: &str) -> Self {
        MessageResponse {
            message: message.to_string(),
        }
    }
}

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UserResponse {
    /// The unique identifier of the user
    pub uuid: Uuid,

    /// Login address
    pub email: String,

    /// Display name
    pub full_name: Option<String>,

    /// Absent for platform superusers.
    pub tenant_uuid: Option<Uuid>,

    /// Owner, Manager, Analyst or Viewer
    pub role: String,

    /// Inactive users cannot sign in
    pub is_active: bool,

    /// Platform administrator
    pub is_superuser: bool,

    /// Whether the email address has been confirmed
    pub is_verified: bool,
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        UserResponse {
            uuid: user.uuid.into(),
            email: user.email,
            full_name: user.full_name,
            tenant_uuid: user.tenant_uuid.map(Into::into),
            role: user.role.to_string(),
            is_active: user.is_active,
            is_superuser: user.is_superuser,
            is_verified: user.is_verified,
        }
    }
}

/// A bare email address, for flows that must not reveal whether it is registered.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct EmailRequest {
    /// Account email address
    pub email: String,
}
