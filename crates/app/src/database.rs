//! Database connection management

use std::time::Duration;

use sqlx::{PgPool, Postgres, Transaction, postgres::PgPoolOptions, query, query_as};
use thiserror::Error;
use tracing::info;

use crate::domain::tenants::records::TenantUuid;

/// SQL used to bind the tenant for row-level security. The third argument makes the
/// setting local to the current transaction.
pub const SET_TENANT_CONTEXT_SQL: &str = "SELECT set_config('app.current_tenant', $1, true)";

const ROLE_PRIVILEGES_SQL: &str =
    "SELECT current_user::text, rolsuper, rolbypassrls FROM pg_roles WHERE rolname = current_user";

/// Pool sizing and connection lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub url: String,
    pub min_connections: u32,
    pub max_connections: u32,

    /// Connections older than this are closed and replaced.
    pub max_lifetime: Duration,

    /// How long a caller waits for a free connection before failing.
    pub acquire_timeout: Duration,
}

impl DatabaseSettings {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            min_connections: 5,
            max_connections: 20,
            max_lifetime: Duration::from_secs(3600),
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Error)]
pub enum RoleCheckError {
    #[error("database role {role} is a superuser and would bypass row-level security")]
    Superuser { role: String },

    #[error("database role {role} has BYPASSRLS and would bypass row-level security")]
    BypassRls { role: String },

    #[error("failed to inspect database role")]
    Sql(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Begin a transaction and bind the tenant for RLS policies.
    ///
    /// The binding lives exactly as long as the transaction. It is discarded on commit
    /// or rollback, so the connection returns to the pool with no tenant bound.
    ///
    /// # Errors
    ///
    /// Returns an error when starting the transaction or binding the tenant fails.
    pub async fn begin_tenant_transaction(
        &self,
        tenant: TenantUuid,
    ) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        bind_tenant_context(&mut tx, tenant).await?;

        Ok(tx)
    }

    /// Begin a transaction with no tenant bound.
    ///
    /// Reads of tenant data return nothing inside it. Inserts are allowed, which is what
    /// bootstrap and seed paths rely on.
    ///
    /// # Errors
    ///
    /// Returns an error when starting the transaction fails.
    pub async fn begin_unscoped_transaction(
        &self,
    ) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }
}

/// Bind `tenant` to the transaction's connection.
///
/// # Errors
///
/// Returns an error when the `set_config` call fails.
pub async fn bind_tenant_context(
    tx: &mut Transaction<'_, Postgres>,
    tenant: TenantUuid,
) -> Result<(), sqlx::Error> {
    query(SET_TENANT_CONTEXT_SQL)
        .bind(tenant.into_uuid().to_string())
        .execute(&mut **tx)
        .await?;

    Ok(())
}

/// Connect to `PostgreSQL` with the given pool settings.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(settings: &DatabaseSettings) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .min_connections(settings.min_connections)
        .max_connections(settings.max_connections)
        .max_lifetime(settings.max_lifetime)
        .acquire_timeout(settings.acquire_timeout)
        .connect(&settings.url)
        .await
}

/// Refuse roles that would silently skip row-level security.
///
/// # Errors
///
/// Returns an error when the connected role is a superuser, holds `BYPASSRLS`, or
/// cannot be inspected.
pub async fn ensure_rls_enforced_role(pool: &PgPool) -> Result<(), RoleCheckError> {
    let (role, is_superuser, bypasses_rls): (String, bool, bool) =
        query_as(ROLE_PRIVILEGES_SQL).fetch_one(pool).await?;

    if is_superuser {
        return Err(RoleCheckError::Superuser { role });
    }

    if bypasses_rls {
        return Err(RoleCheckError::BypassRls { role });
    }

    info!(role, "database role enforces row-level security");

    Ok(())
}

#[cfg(test)]
mod tests {
    use sqlx::query_scalar;
    use testresult::TestResult;

    use crate::test::{TestContext, TestDb};

    use super::*;

    const CURRENT_TENANT_SQL: &str = "SELECT current_setting('app.current_tenant', true)";

    #[test]
    fn default_pool_settings() {
        let settings = DatabaseSettings::new("postgres://localhost/app");

        assert_eq!(settings.min_connections, 5);
        assert_eq!(settings.max_connections, 20);
        assert_eq!(settings.max_lifetime, Duration::from_secs(3600));
        assert_eq!(settings.acquire_timeout, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn tenant_binding_is_visible_inside_the_transaction() -> TestResult {
        let ctx = TestContext::new().await;
        let db = Db::new(ctx.app_pool.clone());

        let mut tx = db.begin_tenant_transaction(ctx.tenant_uuid).await?;

        let bound: Option<String> = query_scalar(CURRENT_TENANT_SQL)
            .fetch_one(&mut *tx)
            .await?;

        assert_eq!(bound, Some(ctx.tenant_uuid.to_string()));

        tx.rollback().await?;

        Ok(())
    }

    #[tokio::test]
    async fn tenant_binding_does_not_survive_commit() -> TestResult {
        let ctx = TestContext::new().await;

        // A single-connection pool guarantees the next borrower reuses the connection.
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_with(ctx.app_pool.connect_options().as_ref().clone())
            .await?;

        let db = Db::new(pool.clone());

        let tx = db.begin_tenant_transaction(ctx.tenant_uuid).await?;

        tx.commit().await?;

        let bound: Option<String> = query_scalar(CURRENT_TENANT_SQL).fetch_one(&pool).await?;

        assert!(
            bound.as_deref().is_none_or(str::is_empty),
            "tenant leaked to next borrower: {bound:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn tenant_binding_does_not_survive_rollback() -> TestResult {
        let ctx = TestContext::new().await;

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_with(ctx.app_pool.connect_options().as_ref().clone())
            .await?;

        let db = Db::new(pool.clone());

        let tx = db.begin_tenant_transaction(ctx.tenant_uuid).await?;

        tx.rollback().await?;

        let bound: Option<String> = query_scalar(CURRENT_TENANT_SQL).fetch_one(&pool).await?;

        assert!(
            bound.as_deref().is_none_or(str::is_empty),
            "tenant leaked to next borrower: {bound:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn rebinding_replaces_the_tenant() -> TestResult {
        let ctx = TestContext::new().await;
        let other = ctx.create_tenant().await;
        let db = Db::new(ctx.app_pool.clone());

        let mut tx = db.begin_tenant_transaction(ctx.tenant_uuid).await?;

        bind_tenant_context(&mut tx, other).await?;

        let bound: Option<String> = query_scalar(CURRENT_TENANT_SQL)
            .fetch_one(&mut *tx)
            .await?;

        assert_eq!(bound, Some(other.to_string()));

        Ok(())
    }

    #[tokio::test]
    async fn superuser_role_is_refused() {
        let test_db = TestDb::new().await;

        let result = ensure_rls_enforced_role(test_db.pool()).await;

        assert!(
            matches!(result, Err(RoleCheckError::Superuser { .. })),
            "expected Superuser, got {result:?}"
        );
    }

    #[tokio::test]
    async fn application_role_is_accepted() -> TestResult {
        let ctx = TestContext::new().await;

        ensure_rls_enforced_role(&ctx.app_pool).await?;

        Ok(())
    }
}
