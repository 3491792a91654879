//! Refresh Tokens Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query, query_as};

use crate::domain::{
    refresh_tokens::records::{RefreshTokenRecord, RefreshTokenUuid},
    users::records::UserUuid,
};

const INSERT_REFRESH_TOKEN_SQL: &str = include_str!("sql/insert_refresh_token.sql");
const LIST_LIVE_REFRESH_TOKENS_SQL: &str = include_str!("sql/list_live_refresh_tokens.sql");
const MARK_REFRESH_TOKEN_USED_SQL: &str = include_str!("sql/mark_refresh_token_used.sql");
const MARK_REFRESH_TOKEN_REVOKED_SQL: &str = include_str!("sql/mark_refresh_token_revoked.sql");
const REVOKE_USER_REFRESH_TOKENS_SQL: &str = include_str!("sql/revoke_user_refresh_tokens.sql");
const DELETE_EXPIRED_REFRESH_TOKENS_SQL: &str =
    include_str!("sql/delete_expired_refresh_tokens.sql");

#[derive(Debug, Clone)]
pub(crate) struct PgRefreshTokensRepository {
    pool: PgPool,
}

impl PgRefreshTokensRepository {
    #[must_use]
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(crate) async fn insert_refresh_token(
        &self,
        user: UserUuid,
        token_hash: &str,
        expires_at: Timestamp,
    ) -> Result<RefreshTokenRecord, sqlx::Error> {
        query_as::<Postgres, RefreshTokenRecord>(INSERT_REFRESH_TOKEN_SQL)
            .bind(RefreshTokenUuid::new().into_uuid())
            .bind(user.into_uuid())
            .bind(token_hash)
            .bind(SqlxTimestamp::from(expires_at))
            .fetch_one(&self.pool)
            .await
    }

    pub(crate) async fn list_live_refresh_tokens(
        &self,
        user: UserUuid,
    ) -> Result<Vec<RefreshTokenRecord>, sqlx::Error> {
        query_as::<Postgres, RefreshTokenRecord>(LIST_LIVE_REFRESH_TOKENS_SQL)
            .bind(user.into_uuid())
            .fetch_all(&self.pool)
            .await
    }

    pub(crate) async fn mark_refresh_token_used(
        &self,
        token: RefreshTokenUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(MARK_REFRESH_TOKEN_USED_SQL)
            .bind(token.into_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn mark_refresh_token_revoked(
        &self,
        token: RefreshTokenUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(MARK_REFRESH_TOKEN_REVOKED_SQL)
            .bind(token.into_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn revoke_user_refresh_tokens(&self, user: UserUuid) -> Result<u64, sqlx::Error> {
        let rows_affected = query(REVOKE_USER_REFRESH_TOKENS_SQL)
            .bind(user.into_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn delete_expired_refresh_tokens(&self) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_EXPIRED_REFRESH_TOKENS_SQL)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for RefreshTokenRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: RefreshTokenUuid::from_uuid(row.try_get("uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            token_hash: row.try_get("token_hash")?,
            expires_at: row.try_get::<SqlxTimestamp, _>("expires_at")?.to_jiff(),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            used_at: row
                .try_get::<Option<SqlxTimestamp>, _>("used_at")?
                .map(SqlxTimestamp::to_jiff),
            revoked_at: row
                .try_get::<Option<SqlxTimestamp>, _>("revoked_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}
