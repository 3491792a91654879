//! OAuth Account Records

use jiff::Timestamp;

use crate::{domain::users::records::UserUuid, uuids::TypedUuid};

/// OAuth Account UUID
pub type OAuthAccountUuid = TypedUuid<OAuthAccountRecord>;

/// OAuth Account Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthAccountRecord {
    pub uuid: OAuthAccountUuid,
    pub user_uuid: UserUuid,
    pub provider: String,
    pub provider_user_id: String,

    /// Sealed provider access token.
    pub access_token: Option<String>,

    /// Sealed provider refresh token.
    pub refresh_token: Option<String>,

    pub expires_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Sealed provider tokens to persist alongside a link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SealedProviderTokens {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_at: Option<Timestamp>,
}
