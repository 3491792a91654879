//! Auth service.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use jiff::Timestamp;
use mockall::automock;
use rand::{RngCore, rngs::OsRng};
use sqlx::PgPool;
use tracing::{error, info, warn};

use crate::{
    auth::{
        AuthServiceError, AuthSettings, MIN_PASSWORD_LENGTH, NewRegistration, OAuthIdentity,
        Principal, RateLimit, TokenPair, VerificationOutcome,
        emails::{self, Email},
        rate_limit::RateLimiter,
    },
    cache::Cache,
    credentials::{Claims, PasswordHasher, SecretBox, TokenCodec, token_fingerprint},
    domain::{
        oauth_accounts::{records::SealedProviderTokens, repository::PgOAuthAccountsRepository},
        refresh_tokens::{PgRefreshTokenStore, RefreshTokenStore},
        tenants::repository::PgTenantsRepository,
        users::{
            data::NewUser,
            records::{Role, UserRecord, UserUuid},
            repository::PgUsersRepository,
        },
    },
    mailer::Mailer,
};

const RESEND_VERIFICATION_COOLDOWN: Duration = Duration::from_secs(60);
const PASSWORD_RESET_LIMIT: i64 = 3;
const PASSWORD_RESET_WINDOW: Duration = Duration::from_secs(3600);
const OAUTH_LIMIT: i64 = 10;
const OAUTH_WINDOW: Duration = Duration::from_secs(60);
const OAUTH_STATE_TTL: Duration = Duration::from_secs(300);
const OAUTH_STATE_BYTES: usize = 32;

/// Characters of an undelivered token kept in the log.
const LOGGED_TOKEN_PREFIX: usize = 30;

/// Credential primitives shared by the pipeline.
#[derive(Debug, Clone)]
pub struct AuthCredentials {
    pub codec: TokenCodec,
    pub hasher: PasswordHasher,
    pub secrets: SecretBox,
}

#[derive(Clone)]
pub struct PgAuthService {
    pool: PgPool,
    users: PgUsersRepository,
    tenants: PgTenantsRepository,
    oauth_accounts: PgOAuthAccountsRepository,
    codec: TokenCodec,
    hasher: PasswordHasher,
    secrets: SecretBox,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    cache: Arc<dyn Cache>,
    limiter: RateLimiter,
    mailer: Arc<dyn Mailer>,
    settings: AuthSettings,
}

impl PgAuthService {
    #[must_use]
    pub fn new(
        pool: PgPool,
        credentials: AuthCredentials,
        cache: Arc<dyn Cache>,
        mailer: Arc<dyn Mailer>,
        settings: AuthSettings,
    ) -> Self {
        let AuthCredentials {
            codec,
            hasher,
            secrets,
        } = credentials;

        let refresh_tokens =
            PgRefreshTokenStore::new(pool.clone(), codec.clone(), hasher.clone());

        Self {
            users: PgUsersRepository::new(pool.clone()),
            tenants: PgTenantsRepository::new(),
            oauth_accounts: PgOAuthAccountsRepository::new(pool.clone()),
            refresh_tokens: Arc::new(refresh_tokens),
            limiter: RateLimiter::new(cache.clone()),
            pool,
            codec,
            hasher,
            secrets,
            cache,
            mailer,
            settings,
        }
    }

    /// Replace the refresh token store.
    #[must_use]
    pub fn with_refresh_tokens(mut self, refresh_tokens: Arc<dyn RefreshTokenStore>) -> Self {
        self.refresh_tokens = refresh_tokens;
        self
    }

    #[must_use]
    pub fn refresh_tokens(&self) -> Arc<dyn RefreshTokenStore> {
        self.refresh_tokens.clone()
    }

    /// Create a verified platform administrator with no tenant.
    ///
    /// # Errors
    ///
    /// Returns [`AuthServiceError::EmailTaken`] when the address is in use, or an error
    /// when validation, hashing or storage fails.
    pub async fn create_superuser(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserRecord, AuthServiceError> {
        validate_email(email)?;
        validate_password(password)?;

        let hashed_password = self.hasher.hash(password).await?;

        let user = self
            .users
            .create_user(
                &self.pool,
                NewUser {
                    uuid: UserUuid::new(),
                    email: email.to_string(),
                    hashed_password: Some(hashed_password),
                    full_name: None,
                    tenant_uuid: None,
                    role: Role::Owner,
                    is_superuser: true,
                    is_verified: true,
                },
            )
            .await?;

        info!(user_uuid = %user.uuid, "superuser created");

        Ok(user)
    }

    async fn issue_token_pair(&self, user: &UserRecord) -> Result<TokenPair, AuthServiceError> {
        let access_token = self.codec.issue_access(user)?;
        let refresh_token = self.refresh_tokens.issue_and_store(user.uuid).await?;

        Ok(TokenPair::bearer(access_token, refresh_token))
    }

    /// Deliver an email without letting a delivery failure fail the caller.
    async fn deliver(&self, to: &str, email: Email) {
        if let Err(error) = self.mailer.send(to, &email.subject, &email.html).await {
            error!(%error, to, subject = email.subject, "email delivery failed");
        }
    }

    async fn send_verification(&self, user: &UserRecord) -> Result<(), AuthServiceError> {
        let token = self.codec.issue_email_verification(user.uuid)?;

        if self.settings.emails_enabled {
            self.deliver(
                &user.email,
                emails::verification_email(&self.settings, &user.email, &token),
            )
            .await;
        } else {
            warn!(
                user_uuid = %user.uuid,
                token_prefix = truncate_token(&token),
                "emails disabled; verification token not delivered"
            );
        }

        Ok(())
    }

    fn seal(&self, identity: &OAuthIdentity) -> Result<SealedProviderTokens, AuthServiceError> {
        let access_token = identity
            .access_token
            .as_deref()
            .map(|token| self.secrets.encrypt_secret(token))
            .transpose()?;

        let refresh_token = identity
            .refresh_token
            .as_deref()
            .map(|token| self.secrets.encrypt_secret(token))
            .transpose()?;

        Ok(SealedProviderTokens {
            access_token,
            refresh_token,
            expires_at: identity.expires_at,
        })
    }

    async fn consume_oauth_state(&self, state: &str) -> Result<(), AuthServiceError> {
        match self.cache.delete(&oauth_state_key(state)).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(AuthServiceError::InvalidOAuthState),
            Err(error) => {
                warn!(%error, "OAuth state cannot be verified; cache unavailable");

                Err(AuthServiceError::InvalidOAuthState)
            }
        }
    }

    /// Resolve the local user for an external identity, linking or creating as needed.
    async fn resolve_oauth_user(
        &self,
        identity: &OAuthIdentity,
        tokens: SealedProviderTokens,
    ) -> Result<UserRecord, AuthServiceError> {
        if let Some(account) = self
            .oauth_accounts
            .find_oauth_account(&identity.provider, &identity.provider_user_id)
            .await?
        {
            self.oauth_accounts
                .update_oauth_tokens(account.uuid, tokens)
                .await?;

            return self
                .users
                .find_user(account.user_uuid)
                .await?
                .ok_or(AuthServiceError::UserNotFound);
        }

        if let Some(mut user) = self.users.find_user_by_email(&identity.email).await? {
            self.oauth_accounts
                .create_oauth_account(
                    &self.pool,
                    user.uuid,
                    &identity.provider,
                    &identity.provider_user_id,
                    tokens,
                )
                .await?;

            // The provider vouches for the address.
            if self.users.mark_user_verified(user.uuid).await? {
                user.is_verified = true;
            }

            info!(user_uuid = %user.uuid, provider = identity.provider, "OAuth account linked");

            return Ok(user);
        }

        let mut tx = self.pool.begin().await?;

        let tenant = self
            .tenants
            .create_tenant(&mut *tx)
            .await?;

        let user = self
            .users
            .create_user(
                &mut *tx,
                NewUser {
                    uuid: UserUuid::new(),
                    email: identity.email.clone(),
                    hashed_password: None,
                    full_name: identity.full_name.clone(),
                    tenant_uuid: Some(tenant.uuid),
                    role: Role::Owner,
                    is_superuser: false,
                    is_verified: true,
                },
            )
            .await?;

        self.oauth_accounts
            .create_oauth_account(
                &mut *tx,
                user.uuid,
                &identity.provider,
                &identity.provider_user_id,
                tokens,
            )
            .await?;

        tx.commit().await?;

        info!(
            user_uuid = %user.uuid,
            tenant_uuid = %tenant.uuid,
            provider = identity.provider,
            "user created via OAuth"
        );

        Ok(user)
    }
}

#[async_trait]
impl AuthService for PgAuthService {
    async fn register(&self, registration: NewRegistration) -> Result<UserRecord, AuthServiceError> {
        validate_email(&registration.email)?;
        validate_password(&registration.password)?;

        if self
            .users
            .find_user_by_email(&registration.email)
            .await?
            .is_some()
        {
            return Err(AuthServiceError::EmailTaken);
        }

        let hashed_password = self.hasher.hash(&registration.password).await?;

        let mut tx = self.pool.begin().await?;

        let tenant = self
            .tenants
            .create_tenant(&mut *tx)
            .await?;

        let user = self
            .users
            .create_user(
                &mut *tx,
                NewUser {
                    uuid: UserUuid::new(),
                    email: registration.email,
                    hashed_password: Some(hashed_password),
                    full_name: registration.full_name,
                    tenant_uuid: Some(tenant.uuid),
                    role: Role::Owner,
                    is_superuser: false,
                    is_verified: false,
                },
            )
            .await?;

        tx.commit().await?;

        info!(user_uuid = %user.uuid, tenant_uuid = %tenant.uuid, "user registered");

        self.send_verification(&user).await?;

        Ok(user)
    }

    async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthServiceError> {
        let user = self.users.find_user_by_email(email).await?;

        let stored_hash = user.as_ref().and_then(|user| user.hashed_password.as_deref());

        let verified = match stored_hash {
            Some(hash) => self.hasher.verify(password, hash).await,
            None => false,
        };

        let Some(user) = user.filter(|_found| verified) else {
            warn!(email, "failed login attempt");

            return Err(AuthServiceError::InvalidCredentials);
        };

        if !user.is_active {
            warn!(user_uuid = %user.uuid, "login attempt by inactive user");

            return Err(AuthServiceError::InactiveUser);
        }

        if !user.is_verified {
            warn!(user_uuid = %user.uuid, "login attempt with unverified email");

            return Err(AuthServiceError::EmailNotVerified);
        }

        if user
            .hashed_password
            .as_deref()
            .is_some_and(|hash| self.hasher.needs_rehash(hash))
        {
            match self.hasher.hash(password).await {
                Ok(rehashed) => {
                    if let Err(error) = self.users.update_user_password(user.uuid, &rehashed).await
                    {
                        warn!(%error, user_uuid = %user.uuid, "password rehash not stored");
                    }
                }
                Err(error) => warn!(%error, user_uuid = %user.uuid, "password rehash failed"),
            }
        }

        let tokens = self.issue_token_pair(&user).await?;

        info!(user_uuid = %user.uuid, "user logged in");

        Ok(tokens)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthServiceError> {
        let user = self.refresh_tokens.redeem(refresh_token).await?;

        // Claims come from the current row, not from the presented token.
        let tokens = self.issue_token_pair(&user).await?;

        if !self.refresh_tokens.mark_used(refresh_token).await? {
            // A concurrent rotation consumed the token first; withdraw this one.
            self.refresh_tokens
                .mark_revoked(&tokens.refresh_token)
                .await?;

            warn!(user_uuid = %user.uuid, "refresh token consumed concurrently");

            return Err(AuthServiceError::InvalidRefreshToken);
        }

        Ok(tokens)
    }

    async fn logout(&self, user: UserUuid) -> Result<u64, AuthServiceError> {
        let revoked = self.refresh_tokens.revoke_all(user).await?;

        info!(user_uuid = %user, revoked, "user logged out");

        Ok(revoked)
    }

    async fn authenticate(&self, access_token: &str) -> Result<Principal, AuthServiceError> {
        let claims = self
            .codec
            .decode(access_token)
            .and_then(Claims::into_access)
            .map_err(|_rejected| AuthServiceError::Unauthenticated)?;

        let user_uuid = UserUuid::from_uuid(claims.sub);

        let user = self
            .users
            .find_user(user_uuid)
            .await?
            .ok_or(AuthServiceError::UserNotFound)?;

        if !user.is_active {
            return Err(AuthServiceError::InactiveUser);
        }

        if user.tenant_uuid.is_none() && !user.is_superuser {
            error!(user_uuid = %user.uuid, "user has no tenant association");

            return Err(AuthServiceError::MissingTenant);
        }

        Ok(Principal::from(user))
    }

    async fn verify_email(&self, token: &str) -> Result<VerificationOutcome, AuthServiceError> {
        let claims = self
            .codec
            .decode(token)
            .and_then(Claims::into_email_verification)
            .map_err(|_rejected| AuthServiceError::InvalidToken)?;

        let user = self
            .users
            .find_user(UserUuid::from_uuid(claims.sub))
            .await?
            .ok_or(AuthServiceError::UserNotFound)?;

        if user.is_verified || !self.users.mark_user_verified(user.uuid).await? {
            return Ok(VerificationOutcome::AlreadyVerified);
        }

        info!(user_uuid = %user.uuid, "email verified");

        Ok(VerificationOutcome::Verified)
    }

    async fn resend_verification(&self, email: &str) -> Result<(), AuthServiceError> {
        let key = format!("resend_verification:{}", email.to_lowercase());

        if !self
            .limiter
            .cooldown(&key, RESEND_VERIFICATION_COOLDOWN)
            .await
        {
            return Err(AuthServiceError::RateLimited(RateLimit::ResendVerification));
        }

        if let Some(user) = self.users.find_user_by_email(email).await?
            && !user.is_verified
        {
            self.send_verification(&user).await?;

            info!(user_uuid = %user.uuid, "verification email resent");
        }

        Ok(())
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), AuthServiceError> {
        let key = format!("password_reset:{}", email.to_lowercase());

        if !self
            .limiter
            .within_limit(&key, PASSWORD_RESET_LIMIT, PASSWORD_RESET_WINDOW)
            .await
        {
            return Err(AuthServiceError::RateLimited(RateLimit::PasswordReset));
        }

        let Some(user) = self.users.find_user_by_email(email).await? else {
            info!("password reset requested for unknown email");

            return Ok(());
        };

        let token = self.codec.issue_password_reset(user.uuid, &user.email)?;

        if self.settings.emails_enabled {
            self.deliver(
                &user.email,
                emails::password_reset_email(&self.settings, &user.email, &token),
            )
            .await;
        } else {
            warn!(
                user_uuid = %user.uuid,
                token_prefix = truncate_token(&token),
                "emails disabled; password reset token not delivered"
            );
        }

        info!(user_uuid = %user.uuid, "password reset requested");

        Ok(())
    }

    async fn confirm_password_reset(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<(), AuthServiceError> {
        validate_password(new_password)?;

        let blacklist_key = format!("reset_token_used:{}", token_fingerprint(token));

        match self.cache.get(&blacklist_key).await {
            Ok(Some(_)) => {
                warn!("password reset token replayed");

                return Err(AuthServiceError::ResetTokenReused);
            }
            Ok(None) => {}
            Err(error) => warn!(%error, "reset token blacklist unavailable"),
        }

        let claims = self
            .codec
            .decode(token)
            .and_then(Claims::into_password_reset)
            .map_err(|_rejected| AuthServiceError::InvalidResetToken)?;

        let user = self
            .users
            .find_user(UserUuid::from_uuid(claims.sub))
            .await?
            .ok_or(AuthServiceError::UserNotFound)?;

        let hashed_password = self.hasher.hash(new_password).await?;

        self.users
            .update_user_password(user.uuid, &hashed_password)
            .await?;

        let revoked = self.refresh_tokens.revoke_all(user.uuid).await?;

        let remaining = claims.exp.saturating_sub(Timestamp::now().as_second());

        if let Ok(remaining) = u64::try_from(remaining)
            && remaining > 0
            && let Err(error) = self
                .cache
                .set(&blacklist_key, "1", Duration::from_secs(remaining))
                .await
        {
            warn!(%error, user_uuid = %user.uuid, "reset token not blacklisted");
        }

        if self.settings.emails_enabled {
            self.deliver(
                &user.email,
                emails::password_changed_email(&self.settings, &user.email),
            )
            .await;
        }

        info!(user_uuid = %user.uuid, revoked, "password reset completed");

        Ok(())
    }
}

#[async_trait]
impl OAuthService for PgAuthService {
    async fn begin_oauth(&self, client_key: &str) -> Result<String, AuthServiceError> {
        if !self
            .limiter
            .within_limit(&oauth_rate_key(client_key), OAUTH_LIMIT, OAUTH_WINDOW)
            .await
        {
            return Err(AuthServiceError::RateLimited(RateLimit::OAuth));
        }

        let mut bytes = [0_u8; OAUTH_STATE_BYTES];

        OsRng.fill_bytes(&mut bytes);

        let state = URL_SAFE_NO_PAD.encode(bytes);

        // Without a stored state the callback could never be accepted.
        self.cache
            .set(&oauth_state_key(&state), "1", OAUTH_STATE_TTL)
            .await?;

        Ok(state)
    }

    async fn complete_oauth(
        &self,
        state: &str,
        identity: OAuthIdentity,
        client_key: &str,
    ) -> Result<TokenPair, AuthServiceError> {
        if !self
            .limiter
            .within_limit(
                &format!("oauth_callback_rate_limit:{client_key}"),
                OAUTH_LIMIT,
                OAUTH_WINDOW,
            )
            .await
        {
            return Err(AuthServiceError::RateLimited(RateLimit::OAuth));
        }

        self.consume_oauth_state(state).await?;

        validate_email(&identity.email)?;

        let tokens = self.seal(&identity)?;

        let user = self.resolve_oauth_user(&identity, tokens).await?;

        if !user.is_active {
            return Err(AuthServiceError::InactiveUser);
        }

        self.issue_token_pair(&user).await
    }
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create a tenant and its owner. The owner must verify their email before logging in.
    async fn register(&self, registration: NewRegistration) -> Result<UserRecord, AuthServiceError>;

    /// Exchange email and password for a token pair.
    async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthServiceError>;

    /// Rotate a refresh token. The presented token cannot be used again.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthServiceError>;

    /// Revoke every refresh token of the user.
    async fn logout(&self, user: UserUuid) -> Result<u64, AuthServiceError>;

    /// Resolve an access token into the current principal.
    async fn authenticate(&self, access_token: &str) -> Result<Principal, AuthServiceError>;

    async fn verify_email(&self, token: &str) -> Result<VerificationOutcome, AuthServiceError>;

    /// Succeeds whether or not the address is known.
    async fn resend_verification(&self, email: &str) -> Result<(), AuthServiceError>;

    /// Succeeds whether or not the address is known.
    async fn request_password_reset(&self, email: &str) -> Result<(), AuthServiceError>;

    /// Set a new password from a reset token and sign out every session.
    async fn confirm_password_reset(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<(), AuthServiceError>;
}

/// Linking of identities verified by an external provider.
#[automock]
#[async_trait]
pub trait OAuthService: Send + Sync {
    /// Mint a single-use state value for an authorization round trip.
    async fn begin_oauth(&self, client_key: &str) -> Result<String, AuthServiceError>;

    /// Consume `state` and log in the local user for `identity`.
    async fn complete_oauth(
        &self,
        state: &str,
        identity: OAuthIdentity,
        client_key: &str,
    ) -> Result<TokenPair, AuthServiceError>;
}

fn validate_email(email: &str) -> Result<(), AuthServiceError> {
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());

    if valid {
        Ok(())
    } else {
        Err(AuthServiceError::Validation {
            field: "email",
            message: "value is not a valid email address",
        })
    }
}

fn validate_password(password: &str) -> Result<(), AuthServiceError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthServiceError::Validation {
            field: "password",
            message: "Password must be at least 8 characters long",
        });
    }

    Ok(())
}

fn truncate_token(token: &str) -> &str {
    token.get(..LOGGED_TOKEN_PREFIX).unwrap_or(token)
}

fn oauth_state_key(state: &str) -> String {
    format!("oauth_state:{state}")
}

fn oauth_rate_key(client_key: &str) -> String {
    format!("oauth_rate_limit:{client_key}")
}
