//! Signed bearer tokens.
//!
//! Tokens are HS256 JWTs. Each token kind has a closed claim shape and the kind is
//! carried in the `type` claim, so a cryptographically valid refresh token can never
//! be mistaken for an access token.

use std::fmt;

use jiff::{SignedDuration, Timestamp};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    tenants::records::TenantUuid,
    users::records::{Role, UserRecord, UserUuid},
};

const ACCESS_TOKEN_TTL: SignedDuration = SignedDuration::from_hours(24);
const REFRESH_TOKEN_TTL: SignedDuration = SignedDuration::from_hours(24 * 30);
const EMAIL_VERIFICATION_TTL: SignedDuration = SignedDuration::from_hours(24);
const PASSWORD_RESET_TTL: SignedDuration = SignedDuration::from_hours(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
    EmailVerification,
    PasswordReset,
}

impl TokenKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
            Self::EmailVerification => "email_verification",
            Self::PasswordReset => "password_reset",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("token signature is invalid")]
    BadSignature,

    #[error("token is malformed")]
    Malformed,

    #[error("expected a {expected} token, found {found}")]
    WrongKind {
        expected: TokenKind,
        found: TokenKind,
    },

    #[error("failed to sign token")]
    Encode(#[source] jsonwebtoken::errors::Error),
}

/// Short-lived token carrying authorization claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: Uuid,
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
    pub tenant_id: Option<Uuid>,
    pub role: Role,
    pub email: String,
}

impl AccessClaims {
    #[must_use]
    pub fn new(user: &UserRecord, ttl: SignedDuration) -> Self {
        let (iat, exp) = window(ttl);

        Self {
            sub: user.uuid.into_uuid(),
            jti: Uuid::now_v7(),
            iat,
            exp,
            tenant_id: user.tenant_uuid.map(TenantUuid::into_uuid),
            role: user.role,
            email: user.email.clone(),
        }
    }

    #[must_use]
    pub fn tenant_uuid(&self) -> Option<TenantUuid> {
        self.tenant_id.map(TenantUuid::from_uuid)
    }
}

/// Long-lived token that carries identity only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: Uuid,
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
}

impl RefreshClaims {
    #[must_use]
    pub fn new(user: UserUuid, ttl: SignedDuration) -> Self {
        let (iat, exp) = window(ttl);

        Self {
            sub: user.into_uuid(),
            jti: Uuid::now_v7(),
            iat,
            exp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailVerificationClaims {
    pub sub: Uuid,
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
}

impl EmailVerificationClaims {
    #[must_use]
    pub fn new(user: UserUuid, ttl: SignedDuration) -> Self {
        let (iat, exp) = window(ttl);

        Self {
            sub: user.into_uuid(),
            jti: Uuid::now_v7(),
            iat,
            exp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordResetClaims {
    pub sub: Uuid,
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
    pub email: String,
}

impl PasswordResetClaims {
    #[must_use]
    pub fn new(user: UserUuid, email: &str, ttl: SignedDuration) -> Self {
        let (iat, exp) = window(ttl);

        Self {
            sub: user.into_uuid(),
            jti: Uuid::now_v7(),
            iat,
            exp,
            email: email.to_owned(),
        }
    }
}

/// Claims of any token kind, tagged on the wire by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Claims {
    Access(AccessClaims),
    Refresh(RefreshClaims),
    EmailVerification(EmailVerificationClaims),
    PasswordReset(PasswordResetClaims),
}

impl Claims {
    #[must_use]
    pub const fn kind(&self) -> TokenKind {
        match self {
            Self::Access(_) => TokenKind::Access,
            Self::Refresh(_) => TokenKind::Refresh,
            Self::EmailVerification(_) => TokenKind::EmailVerification,
            Self::PasswordReset(_) => TokenKind::PasswordReset,
        }
    }

    #[must_use]
    pub const fn subject(&self) -> UserUuid {
        let sub = match self {
            Self::Access(claims) => claims.sub,
            Self::Refresh(claims) => claims.sub,
            Self::EmailVerification(claims) => claims.sub,
            Self::PasswordReset(claims) => claims.sub,
        };

        UserUuid::from_uuid(sub)
    }

    /// Expiry as a unix timestamp in seconds.
    #[must_use]
    pub const fn expires_at(&self) -> i64 {
        match self {
            Self::Access(claims) => claims.exp,
            Self::Refresh(claims) => claims.exp,
            Self::EmailVerification(claims) => claims.exp,
            Self::PasswordReset(claims) => claims.exp,
        }
    }

    pub fn into_access(self) -> Result<AccessClaims, TokenError> {
        match self {
            Self::Access(claims) => Ok(claims),
            other => Err(other.wrong_kind(TokenKind::Access)),
        }
    }

    pub fn into_refresh(self) -> Result<RefreshClaims, TokenError> {
        match self {
            Self::Refresh(claims) => Ok(claims),
            other => Err(other.wrong_kind(TokenKind::Refresh)),
        }
    }

    pub fn into_email_verification(self) -> Result<EmailVerificationClaims, TokenError> {
        match self {
            Self::EmailVerification(claims) => Ok(claims),
            other => Err(other.wrong_kind(TokenKind::EmailVerification)),
        }
    }

    pub fn into_password_reset(self) -> Result<PasswordResetClaims, TokenError> {
        match self {
            Self::PasswordReset(claims) => Ok(claims),
            other => Err(other.wrong_kind(TokenKind::PasswordReset)),
        }
    }

    fn wrong_kind(&self, expected: TokenKind) -> TokenError {
        TokenError::WrongKind {
            expected,
            found: self.kind(),
        }
    }
}

/// Lifetimes for each token kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenTtls {
    pub access: SignedDuration,
    pub refresh: SignedDuration,
    pub email_verification: SignedDuration,
    pub password_reset: SignedDuration,
}

impl Default for TokenTtls {
    fn default() -> Self {
        Self {
            access: ACCESS_TOKEN_TTL,
            refresh: REFRESH_TOKEN_TTL,
            email_verification: EMAIL_VERIFICATION_TTL,
            password_reset: PASSWORD_RESET_TTL,
        }
    }
}

/// Issues and decodes signed tokens with a single deployment secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttls: TokenTtls,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("keys", &"**redacted**")
            .field("ttls", &self.ttls)
            .finish()
    }
}

impl TokenCodec {
    #[must_use]
    pub fn new(secret: &[u8], ttls: TokenTtls) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);

        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttls,
        }
    }

    #[must_use]
    pub const fn ttls(&self) -> TokenTtls {
        self.ttls
    }

    /// Sign arbitrary claims.
    ///
    /// # Errors
    ///
    /// Returns an error when the claims cannot be serialised or signed.
    pub fn issue(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding).map_err(TokenError::Encode)
    }

    pub fn issue_access(&self, user: &UserRecord) -> Result<String, TokenError> {
        self.issue(&Claims::Access(AccessClaims::new(user, self.ttls.access)))
    }

    pub fn issue_refresh(&self, user: UserUuid) -> Result<String, TokenError> {
        self.issue(&Claims::Refresh(RefreshClaims::new(user, self.ttls.refresh)))
    }

    pub fn issue_email_verification(&self, user: UserUuid) -> Result<String, TokenError> {
        self.issue(&Claims::EmailVerification(EmailVerificationClaims::new(
            user,
            self.ttls.email_verification,
        )))
    }

    pub fn issue_password_reset(&self, user: UserUuid, email: &str) -> Result<String, TokenError> {
        self.issue(&Claims::PasswordReset(PasswordResetClaims::new(
            user,
            email,
            self.ttls.password_reset,
        )))
    }

    /// Verify a token's signature and expiry and return its claims.
    ///
    /// Callers must still check the kind via one of the `Claims::into_*` methods.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Expired`], [`TokenError::BadSignature`] or
    /// [`TokenError::Malformed`].
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|error| match error.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed,
            })
    }
}

/// Lowercase hex SHA-256 of a raw token, used where a token has to be remembered
/// without being stored.
#[must_use]
pub fn token_fingerprint(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

fn window(ttl: SignedDuration) -> (i64, i64) {
    let iat = Timestamp::now().as_second();

    (iat, iat.saturating_add(ttl.as_secs()))
}
