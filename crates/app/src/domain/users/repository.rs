//! Users Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{Executor, FromRow, PgPool, Postgres, Row, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::domain::{
    tenants::records::TenantUuid,
    users::{
        data::NewUser,
        records::{Role, UserRecord, UserUuid},
    },
};

const FIND_USER_SQL: &str = include_str!("sql/find_user.sql");
const FIND_USER_BY_EMAIL_SQL: &str = include_str!("sql/find_user_by_email.sql");
const CREATE_USER_SQL: &str = include_str!("sql/create_user.sql");
const MARK_USER_VERIFIED_SQL: &str = include_str!("sql/mark_user_verified.sql");
const UPDATE_USER_PASSWORD_SQL: &str = include_str!("sql/update_user_password.sql");

/// Users are resolved before any tenant is known, so this repository works on the
/// pool directly rather than on a tenant-bound transaction.
#[derive(Debug, Clone)]
pub(crate) struct PgUsersRepository {
    pool: PgPool,
}

impl PgUsersRepository {
    #[must_use]
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(crate) async fn find_user(&self, user: UserUuid) -> Result<Option<UserRecord>, sqlx::Error> {
        query_as::<Postgres, UserRecord>(FIND_USER_SQL)
            .bind(user.into_uuid())
            .fetch_optional(&self.pool)
            .await
    }

    pub(crate) async fn find_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserRecord>, sqlx::Error> {
        query_as::<Postgres, UserRecord>(FIND_USER_BY_EMAIL_SQL)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    pub(crate) async fn create_user<'e, E>(
        &self,
        executor: E,
        user: NewUser,
    ) -> Result<UserRecord, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        query_as::<Postgres, UserRecord>(CREATE_USER_SQL)
            .bind(user.uuid.into_uuid())
            .bind(user.email.to_lowercase())
            .bind(user.hashed_password)
            .bind(user.full_name)
            .bind(user.tenant_uuid.map(TenantUuid::into_uuid))
            .bind(user.role.as_str())
            .bind(user.is_superuser)
            .bind(user.is_verified)
            .fetch_one(executor)
            .await
    }

    /// Returns whether the flag changed; `false` when already verified.
    pub(crate) async fn mark_user_verified(&self, user: UserUuid) -> Result<bool, sqlx::Error> {
        let rows_affected = query(MARK_USER_VERIFIED_SQL)
            .bind(user.into_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    pub(crate) async fn update_user_password(
        &self,
        user: UserUuid,
        hashed_password: &str,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(UPDATE_USER_PASSWORD_SQL)
            .bind(user.into_uuid())
            .bind(hashed_password)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for UserRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let role: String = row.try_get("role")?;

        let role = role.parse::<Role>().map_err(|e| sqlx::Error::ColumnDecode {
            index: "role".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            uuid: UserUuid::from_uuid(row.try_get("uuid")?),
            email: row.try_get("email")?,
            hashed_password: row.try_get("hashed_password")?,
            full_name: row.try_get("full_name")?,
            tenant_uuid: row
                .try_get::<Option<Uuid>, _>("tenant_uuid")?
                .map(TenantUuid::from_uuid),
            role,
            is_active: row.try_get("is_active")?,
            is_superuser: row.try_get("is_superuser")?,
            is_verified: row.try_get("is_verified")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
