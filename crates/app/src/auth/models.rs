//! Auth data models.

use jiff::Timestamp;

use crate::domain::{
    tenants::records::TenantUuid,
    users::records::{Role, UserRecord},
};

/// Shortest accepted password, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// The authenticated caller of a request.
///
/// Built from the current user row on every request, so role, tenant and active
/// status changes apply immediately rather than when the access token expires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user: UserRecord,

    /// `None` only for superusers.
    pub tenant: Option<TenantUuid>,

    pub role: Role,
    pub is_superuser: bool,
}

impl Principal {
    #[must_use]
    pub fn current_user(&self) -> &UserRecord {
        &self.user
    }
}

impl From<UserRecord> for Principal {
    fn from(user: UserRecord) -> Self {
        Self {
            tenant: user.tenant_uuid,
            role: user.role,
            is_superuser: user.is_superuser,
            user,
        }
    }
}

/// Access and refresh tokens issued together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
}

impl TokenPair {
    #[must_use]
    pub fn bearer(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "bearer",
        }
    }
}

/// Self-service sign-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRegistration {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    Verified,
    AlreadyVerified,
}

/// An identity already verified by an external provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthIdentity {
    pub provider: String,
    pub provider_user_id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_at: Option<Timestamp>,
}

/// Settings shaping user-facing side effects of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSettings {
    /// When disabled, tokens that would have been mailed are logged truncated instead.
    pub emails_enabled: bool,

    /// Base URL for links placed in emails.
    pub frontend_host: String,

    pub project_name: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            emails_enabled: false,
            frontend_host: "http://localhost:5173".to_string(),
            project_name: "Tenantry".to_string(),
        }
    }
}
