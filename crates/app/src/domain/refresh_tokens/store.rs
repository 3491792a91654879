//! Refresh token store.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use sqlx::PgPool;
use tracing::{debug, warn};

use crate::{
    credentials::{Claims, PasswordHasher, RefreshClaims, TokenCodec, TokenError},
    domain::{
        refresh_tokens::{
            errors::RefreshTokenError, records::RefreshTokenRecord,
            repository::PgRefreshTokensRepository,
        },
        users::{
            records::{UserRecord, UserUuid},
            repository::PgUsersRepository,
        },
    },
};

#[derive(Debug, Clone)]
pub struct PgRefreshTokenStore {
    codec: TokenCodec,
    hasher: PasswordHasher,
    repository: PgRefreshTokensRepository,
    users: PgUsersRepository,
}

impl PgRefreshTokenStore {
    #[must_use]
    pub fn new(pool: PgPool, codec: TokenCodec, hasher: PasswordHasher) -> Self {
        Self {
            codec,
            hasher,
            repository: PgRefreshTokensRepository::new(pool.clone()),
            users: PgUsersRepository::new(pool),
        }
    }

    /// Find the live ledger row matching `raw`, if any.
    ///
    /// Undecodable tokens and tokens of another kind simply have no row.
    async fn locate(
        &self,
        raw: &str,
    ) -> Result<Option<(UserUuid, RefreshTokenRecord)>, RefreshTokenError> {
        let Ok(claims) = self.codec.decode(raw).and_then(Claims::into_refresh) else {
            return Ok(None);
        };

        let user = UserUuid::from_uuid(claims.sub);

        let candidates = self.repository.list_live_refresh_tokens(user).await?;

        let hashes = candidates
            .iter()
            .map(|candidate| candidate.token_hash.clone())
            .collect();

        let found = self
            .hasher
            .position(raw, hashes)
            .await
            .and_then(|index| candidates.into_iter().nth(index));

        Ok(found.map(|record| (user, record)))
    }
}

#[async_trait]
impl RefreshTokenStore for PgRefreshTokenStore {
    async fn issue_and_store(&self, user: UserUuid) -> Result<String, RefreshTokenError> {
        let claims = RefreshClaims::new(user, self.codec.ttls().refresh);

        let expires_at = Timestamp::from_second(claims.exp)
            .map_err(|_range| RefreshTokenError::Token(TokenError::Malformed))?;

        let raw = self
            .codec
            .issue(&Claims::Refresh(claims))
            .map_err(RefreshTokenError::Token)?;

        let token_hash = self.hasher.hash(&raw).await?;

        let record = self
            .repository
            .insert_refresh_token(user, &token_hash, expires_at)
            .await?;

        debug!(user_uuid = %user, token_uuid = %record.uuid, "refresh token stored");

        Ok(raw)
    }

    async fn redeem(&self, raw: &str) -> Result<UserRecord, RefreshTokenError> {
        let claims = match self.codec.decode(raw).and_then(Claims::into_refresh) {
            Ok(claims) => claims,
            Err(error) => {
                warn!(%error, "refresh token rejected");

                return Err(RefreshTokenError::Invalid);
            }
        };

        let user_uuid = UserUuid::from_uuid(claims.sub);

        let Some(user) = self.users.find_user(user_uuid).await? else {
            warn!(user_uuid = %user_uuid, "refresh token subject no longer exists");

            return Err(RefreshTokenError::Invalid);
        };

        if !user.is_active {
            warn!(user_uuid = %user_uuid, "refresh token presented for inactive user");

            return Err(RefreshTokenError::Invalid);
        }

        let candidates = self.repository.list_live_refresh_tokens(user_uuid).await?;

        let hashes = candidates
            .into_iter()
            .map(|candidate| candidate.token_hash)
            .collect();

        if self.hasher.position(raw, hashes).await.is_none() {
            warn!(user_uuid = %user_uuid, "refresh token is used, revoked or unknown");

            return Err(RefreshTokenError::Invalid);
        }

        Ok(user)
    }

    async fn mark_used(&self, raw: &str) -> Result<bool, RefreshTokenError> {
        let Some((_user, record)) = self.locate(raw).await? else {
            return Ok(false);
        };

        let rows_affected = self.repository.mark_refresh_token_used(record.uuid).await?;

        Ok(rows_affected > 0)
    }

    async fn mark_revoked(&self, raw: &str) -> Result<bool, RefreshTokenError> {
        let Some((_user, record)) = self.locate(raw).await? else {
            return Ok(false);
        };

        let rows_affected = self
            .repository
            .mark_refresh_token_revoked(record.uuid)
            .await?;

        Ok(rows_affected > 0)
    }

    async fn revoke_all(&self, user: UserUuid) -> Result<u64, RefreshTokenError> {
        let revoked = self.repository.revoke_user_refresh_tokens(user).await?;

        debug!(user_uuid = %user, revoked, "refresh tokens revoked");

        Ok(revoked)
    }

    async fn sweep_expired(&self) -> Result<u64, RefreshTokenError> {
        Ok(self.repository.delete_expired_refresh_tokens().await?)
    }
}

#[automock]
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Issue a refresh token for `user`, store its hash and return the raw token.
    async fn issue_and_store(&self, user: UserUuid) -> Result<String, RefreshTokenError>;

    /// Validate a raw refresh token against the ledger and return its owner.
    ///
    /// Does not consume the token; rotation marks it used separately once the
    /// replacement is stored.
    async fn redeem(&self, raw: &str) -> Result<UserRecord, RefreshTokenError>;

    /// Mark a live token used. Returns whether a row changed.
    async fn mark_used(&self, raw: &str) -> Result<bool, RefreshTokenError>;

    /// Mark a live token revoked. Returns whether a row changed.
    async fn mark_revoked(&self, raw: &str) -> Result<bool, RefreshTokenError>;

    /// Revoke every unrevoked token of `user`.
    async fn revoke_all(&self, user: UserUuid) -> Result<u64, RefreshTokenError>;

    /// Delete every token past its expiry, whatever its state.
    async fn sweep_expired(&self) -> Result<u64, RefreshTokenError>;
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;
    use sqlx::query;
    use testresult::TestResult;

    use crate::{credentials::TokenTtls, test::TestContext};

    use super::*;

    #[tokio::test]
    async fn issued_token_redeems_to_its_owner() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("owner@example.com", "password123").await;

        let raw = ctx.refresh_tokens.issue_and_store(user.uuid).await?;
        let redeemed = ctx.refresh_tokens.redeem(&raw).await?;

        assert_eq!(redeemed.uuid, user.uuid);

        Ok(())
    }

    #[tokio::test]
    async fn ledger_stores_hash_not_raw_token() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("owner@example.com", "password123").await;

        let raw = ctx.refresh_tokens.issue_and_store(user.uuid).await?;

        let hashes: Vec<String> =
            sqlx::query_scalar("SELECT token_hash FROM refresh_tokens WHERE user_uuid = $1")
                .bind(user.uuid.into_uuid())
                .fetch_all(ctx.db.pool())
                .await?;

        assert_eq!(hashes.len(), 1);
        assert_ne!(hashes[0], raw);
        assert!(hashes[0].starts_with("$argon2id$"), "hash: {}", hashes[0]);

        Ok(())
    }

    #[tokio::test]
    async fn used_token_cannot_be_redeemed() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("owner@example.com", "password123").await;

        let raw = ctx.refresh_tokens.issue_and_store(user.uuid).await?;

        assert!(ctx.refresh_tokens.mark_used(&raw).await?);

        let result = ctx.refresh_tokens.redeem(&raw).await;

        assert!(
            matches!(result, Err(RefreshTokenError::Invalid)),
            "expected Invalid, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn marking_is_idempotent_once_either_flag_is_set() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("owner@example.com", "password123").await;

        let raw = ctx.refresh_tokens.issue_and_store(user.uuid).await?;

        assert!(ctx.refresh_tokens.mark_revoked(&raw).await?);
        assert!(!ctx.refresh_tokens.mark_revoked(&raw).await?, "second revoke");
        assert!(!ctx.refresh_tokens.mark_used(&raw).await?, "use after revoke");

        Ok(())
    }

    #[tokio::test]
    async fn revoke_all_invalidates_every_token_of_user() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("owner@example.com", "password123").await;
        let other = ctx.create_user("other@example.com", "password123").await;

        let first = ctx.refresh_tokens.issue_and_store(user.uuid).await?;
        let second = ctx.refresh_tokens.issue_and_store(user.uuid).await?;
        let unrelated = ctx.refresh_tokens.issue_and_store(other.uuid).await?;

        assert_eq!(ctx.refresh_tokens.revoke_all(user.uuid).await?, 2);

        assert!(ctx.refresh_tokens.redeem(&first).await.is_err(), "first");
        assert!(ctx.refresh_tokens.redeem(&second).await.is_err(), "second");
        assert_eq!(
            ctx.refresh_tokens.redeem(&unrelated).await?.uuid,
            other.uuid,
            "other users keep their tokens"
        );

        Ok(())
    }

    #[tokio::test]
    async fn inactive_user_cannot_redeem() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("owner@example.com", "password123").await;

        let raw = ctx.refresh_tokens.issue_and_store(user.uuid).await?;

        query("UPDATE users SET is_active = FALSE WHERE uuid = $1")
            .bind(user.uuid.into_uuid())
            .execute(ctx.db.pool())
            .await?;

        let result = ctx.refresh_tokens.redeem(&raw).await;

        assert!(
            matches!(result, Err(RefreshTokenError::Invalid)),
            "expected Invalid, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn access_token_is_not_a_refresh_token() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("owner@example.com", "password123").await;

        let access = ctx.codec.issue_access(&user)?;

        let result = ctx.refresh_tokens.redeem(&access).await;

        assert!(
            matches!(result, Err(RefreshTokenError::Invalid)),
            "expected Invalid, got {result:?}"
        );
        assert!(!ctx.refresh_tokens.mark_used(&access).await?);

        Ok(())
    }

    #[tokio::test]
    async fn expired_token_is_rejected_and_swept() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("owner@example.com", "password123").await;

        let expired_codec = TokenCodec::new(
            TestContext::JWT_SECRET,
            TokenTtls {
                refresh: SignedDuration::from_secs(-60),
                ..TokenTtls::default()
            },
        );

        let expired_store =
            PgRefreshTokenStore::new(ctx.app_pool.clone(), expired_codec, ctx.hasher.clone());

        let expired = expired_store.issue_and_store(user.uuid).await?;
        let live = ctx.refresh_tokens.issue_and_store(user.uuid).await?;

        let result = ctx.refresh_tokens.redeem(&expired).await;

        assert!(
            matches!(result, Err(RefreshTokenError::Invalid)),
            "expected Invalid, got {result:?}"
        );

        assert_eq!(ctx.refresh_tokens.sweep_expired().await?, 1);
        assert_eq!(ctx.refresh_tokens.redeem(&live).await?.uuid, user.uuid);

        Ok(())
    }

    #[tokio::test]
    async fn sweep_removes_expired_rows_regardless_of_state() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("owner@example.com", "password123").await;

        let used = ctx.refresh_tokens.issue_and_store(user.uuid).await?;
        let revoked = ctx.refresh_tokens.issue_and_store(user.uuid).await?;
        ctx.refresh_tokens.issue_and_store(user.uuid).await?;

        ctx.refresh_tokens.mark_used(&used).await?;
        ctx.refresh_tokens.mark_revoked(&revoked).await?;

        query("UPDATE refresh_tokens SET expires_at = now() - interval '1 minute'")
            .execute(ctx.db.pool())
            .await?;

        assert_eq!(ctx.refresh_tokens.sweep_expired().await?, 3);
        assert_eq!(ctx.refresh_tokens.sweep_expired().await?, 0);

        Ok(())
    }
}
