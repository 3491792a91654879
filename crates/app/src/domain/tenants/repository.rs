//! Tenants Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, PgExecutor, Postgres, Row, postgres::PgRow, query_as};

use crate::domain::tenants::records::{TenantRecord, TenantUuid};

const CREATE_TENANT_SQL: &str = include_str!("sql/create_tenant.sql");

/// Tenants carry no data of their own; the row only anchors ownership.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PgTenantsRepository;

impl PgTenantsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Insert a tenant with a freshly generated identifier.
    ///
    /// Run inside the transaction that creates its first user, so a failed sign-up
    /// never leaves an orphan tenant behind.
    pub(crate) async fn create_tenant<'e>(
        &self,
        executor: impl PgExecutor<'e>,
    ) -> Result<TenantRecord, sqlx::Error> {
        query_as::<Postgres, TenantRecord>(CREATE_TENANT_SQL)
            .bind(TenantUuid::new().into_uuid())
            .fetch_one(executor)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for TenantRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let created_at: SqlxTimestamp = row.try_get("created_at")?;
        let updated_at: SqlxTimestamp = row.try_get("updated_at")?;

        Ok(Self {
            uuid: TenantUuid::from_uuid(row.try_get("uuid")?),
            created_at: created_at.to_jiff(),
            updated_at: updated_at.to_jiff(),
        })
    }
}
