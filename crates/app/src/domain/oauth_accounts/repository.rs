//! OAuth Accounts Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{Executor, FromRow, PgPool, Postgres, Row, postgres::PgRow, query, query_as};

use crate::domain::{
    oauth_accounts::records::{OAuthAccountRecord, OAuthAccountUuid, SealedProviderTokens},
    users::records::UserUuid,
};

const FIND_OAUTH_ACCOUNT_SQL: &str = include_str!("sql/find_oauth_account.sql");
const CREATE_OAUTH_ACCOUNT_SQL: &str = include_str!("sql/create_oauth_account.sql");
const UPDATE_OAUTH_TOKENS_SQL: &str = include_str!("sql/update_oauth_tokens.sql");

#[derive(Debug, Clone)]
pub(crate) struct PgOAuthAccountsRepository {
    pool: PgPool,
}

impl PgOAuthAccountsRepository {
    #[must_use]
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(crate) async fn find_oauth_account(
        &self,
        provider: &str,
        provider_user_id: &str,
    ) -> Result<Option<OAuthAccountRecord>, sqlx::Error> {
        query_as::<Postgres, OAuthAccountRecord>(FIND_OAUTH_ACCOUNT_SQL)
            .bind(provider)
            .bind(provider_user_id)
            .fetch_optional(&self.pool)
            .await
    }

    pub(crate) async fn create_oauth_account<'e, E>(
        &self,
        executor: E,
        user: UserUuid,
        provider: &str,
        provider_user_id: &str,
        tokens: SealedProviderTokens,
    ) -> Result<OAuthAccountRecord, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        query_as::<Postgres, OAuthAccountRecord>(CREATE_OAUTH_ACCOUNT_SQL)
            .bind(OAuthAccountUuid::new().into_uuid())
            .bind(user.into_uuid())
            .bind(provider)
            .bind(provider_user_id)
            .bind(tokens.access_token)
            .bind(tokens.refresh_token)
            .bind(tokens.expires_at.map(SqlxTimestamp::from))
            .fetch_one(executor)
            .await
    }

    pub(crate) async fn update_oauth_tokens(
        &self,
        account: OAuthAccountUuid,
        tokens: SealedProviderTokens,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(UPDATE_OAUTH_TOKENS_SQL)
            .bind(account.into_uuid())
            .bind(tokens.access_token)
            .bind(tokens.refresh_token)
            .bind(tokens.expires_at.map(SqlxTimestamp::from))
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for OAuthAccountRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: OAuthAccountUuid::from_uuid(row.try_get("uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            provider: row.try_get("provider")?,
            provider_user_id: row.try_get("provider_user_id")?,
            access_token: row.try_get("access_token")?,
            refresh_token: row.try_get("refresh_token")?,
            expires_at: row
                .try_get::<Option<SqlxTimestamp>, _>("expires_at")?
                .map(SqlxTimestamp::to_jiff),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
