//! Companies service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        companies::{
            data::{CompanyUpdate, NewCompany},
            errors::CompaniesServiceError,
            records::{CompanyRecord, CompanyUuid},
            repository::PgCompaniesRepository,
        },
        tenants::records::TenantUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgCompaniesService {
    db: Db,
    repository: PgCompaniesRepository,
}

impl PgCompaniesService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCompaniesRepository::new(),
        }
    }

    /// Insert a company for `tenant` without binding any tenant to the transaction.
    ///
    /// Used by administrative seeding, which runs before any user of the tenant
    /// exists. The row cannot be read back inside this transaction.
    ///
    /// # Errors
    ///
    /// Returns an error when the insert is rejected or storage fails.
    pub async fn seed_company_unscoped(
        &self,
        tenant: TenantUuid,
        company: NewCompany,
    ) -> Result<CompanyUuid, CompaniesServiceError> {
        let uuid = company.uuid;

        let mut tx = self.db.begin_unscoped_transaction().await?;

        self.repository
            .insert_company(&mut tx, tenant, company)
            .await?;

        tx.commit().await?;

        info!(tenant_uuid = %tenant, company_uuid = %uuid, "seeded company");

        Ok(uuid)
    }
}

#[async_trait]
impl CompaniesService for PgCompaniesService {
    async fn list_companies(
        &self,
        tenant: TenantUuid,
    ) -> Result<Vec<CompanyRecord>, CompaniesServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let companies = self.repository.list_companies(&mut tx).await?;

        tx.commit().await?;

        Ok(companies)
    }

    async fn get_company(
        &self,
        tenant: TenantUuid,
        company: CompanyUuid,
    ) -> Result<CompanyRecord, CompaniesServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let company = self.repository.get_company(&mut tx, company).await?;

        tx.commit().await?;

        Ok(company)
    }

    async fn create_company(
        &self,
        tenant: TenantUuid,
        company: NewCompany,
    ) -> Result<CompanyRecord, CompaniesServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let created = self
            .repository
            .create_company(&mut tx, tenant, company)
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn update_company(
        &self,
        tenant: TenantUuid,
        company: CompanyUuid,
        update: CompanyUpdate,
    ) -> Result<CompanyRecord, CompaniesServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let updated = self
            .repository
            .update_company(&mut tx, company, update)
            .await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn delete_company(
        &self,
        tenant: TenantUuid,
        company: CompanyUuid,
    ) -> Result<(), CompaniesServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let rows_affected = self.repository.delete_company(&mut tx, company).await?;

        if rows_affected == 0 {
            return Err(CompaniesServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait CompaniesService: Send + Sync {
    /// Companies visible to the tenant.
    async fn list_companies(
        &self,
        tenant: TenantUuid,
    ) -> Result<Vec<CompanyRecord>, CompaniesServiceError>;

    /// Retrieve a single company. Another tenant's company is not found.
    async fn get_company(
        &self,
        tenant: TenantUuid,
        company: CompanyUuid,
    ) -> Result<CompanyRecord, CompaniesServiceError>;

    /// Create a company owned by the tenant.
    async fn create_company(
        &self,
        tenant: TenantUuid,
        company: NewCompany,
    ) -> Result<CompanyRecord, CompaniesServiceError>;

    /// Replace a company's editable fields.
    async fn update_company(
        &self,
        tenant: TenantUuid,
        company: CompanyUuid,
        update: CompanyUpdate,
    ) -> Result<CompanyRecord, CompaniesServiceError>;

    /// Delete a company and, by cascade, its locations.
    async fn delete_company(
        &self,
        tenant: TenantUuid,
        company: CompanyUuid,
    ) -> Result<(), CompaniesServiceError>;
}

#[cfg(test)]
mod tests {
    use sqlx::{query, query_scalar};
    use testresult::TestResult;

    use crate::{database::Db, test::TestContext};

    use super::*;

    fn new_company(name: &str) -> NewCompany {
        NewCompany {
            uuid: CompanyUuid::new(),
            name: name.to_string(),
            identifier: Some("76.123.456-7".to_string()),
            country: "CL".to_string(),
            industry: None,
            timezone: None,
            opt_in_benchmarking: None,
            is_demo: false,
        }
    }

    fn update(name: &str) -> CompanyUpdate {
        CompanyUpdate {
            name: name.to_string(),
            identifier: None,
            country: "CL".to_string(),
            industry: Some("Retail".to_string()),
            timezone: "America/Santiago".to_string(),
            opt_in_benchmarking: false,
        }
    }

    #[tokio::test]
    async fn create_company_applies_defaults() -> TestResult {
        let ctx = TestContext::new().await;

        let company = ctx
            .companies
            .create_company(ctx.tenant_uuid, new_company("Acme"))
            .await?;

        assert_eq!(company.tenant_uuid, ctx.tenant_uuid);
        assert_eq!(company.timezone, "America/Santiago");
        assert!(company.opt_in_benchmarking);
        assert!(!company.is_demo);

        Ok(())
    }

    #[tokio::test]
    async fn tenant_sees_only_its_own_companies() -> TestResult {
        let ctx = TestContext::new().await;
        let other_tenant = ctx.create_tenant().await;

        let own = ctx
            .companies
            .create_company(ctx.tenant_uuid, new_company("Own"))
            .await?;

        let foreign = ctx
            .companies
            .create_company(other_tenant, new_company("Foreign"))
            .await?;

        let listed = ctx.companies.list_companies(ctx.tenant_uuid).await?;

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].uuid, own.uuid);

        let result = ctx.companies.get_company(ctx.tenant_uuid, foreign.uuid).await;

        assert!(
            matches!(result, Err(CompaniesServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn foreign_company_cannot_be_updated_or_deleted() -> TestResult {
        let ctx = TestContext::new().await;
        let other_tenant = ctx.create_tenant().await;

        let foreign = ctx
            .companies
            .create_company(other_tenant, new_company("Foreign"))
            .await?;

        let updated = ctx
            .companies
            .update_company(ctx.tenant_uuid, foreign.uuid, update("Hijacked"))
            .await;

        assert!(
            matches!(updated, Err(CompaniesServiceError::NotFound)),
            "expected NotFound, got {updated:?}"
        );

        let deleted = ctx
            .companies
            .delete_company(ctx.tenant_uuid, foreign.uuid)
            .await;

        assert!(
            matches!(deleted, Err(CompaniesServiceError::NotFound)),
            "expected NotFound, got {deleted:?}"
        );

        let unchanged = ctx.companies.get_company(other_tenant, foreign.uuid).await?;

        assert_eq!(unchanged.name, "Foreign");

        Ok(())
    }

    #[tokio::test]
    async fn update_company_replaces_fields() -> TestResult {
        let ctx = TestContext::new().await;

        let company = ctx
            .companies
            .create_company(ctx.tenant_uuid, new_company("Acme"))
            .await?;

        let updated = ctx
            .companies
            .update_company(ctx.tenant_uuid, company.uuid, update("Acme SpA"))
            .await?;

        assert_eq!(updated.name, "Acme SpA");
        assert_eq!(updated.identifier, None);
        assert_eq!(updated.industry.as_deref(), Some("Retail"));
        assert!(!updated.opt_in_benchmarking);

        Ok(())
    }

    #[tokio::test]
    async fn delete_company_removes_it() -> TestResult {
        let ctx = TestContext::new().await;

        let company = ctx
            .companies
            .create_company(ctx.tenant_uuid, new_company("Acme"))
            .await?;

        ctx.companies
            .delete_company(ctx.tenant_uuid, company.uuid)
            .await?;

        let result = ctx.companies.get_company(ctx.tenant_uuid, company.uuid).await;

        assert!(
            matches!(result, Err(CompaniesServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn bound_tenant_cannot_insert_for_another_tenant() -> TestResult {
        let ctx = TestContext::new().await;
        let other_tenant = ctx.create_tenant().await;
        let db = Db::new(ctx.app_pool.clone());
        let repository = PgCompaniesRepository::new();

        let mut tx = db.begin_tenant_transaction(ctx.tenant_uuid).await?;

        let result = repository
            .insert_company(&mut tx, other_tenant, new_company("Smuggled"))
            .await
            .map_err(CompaniesServiceError::from);

        assert!(
            matches!(result, Err(CompaniesServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn unbound_transaction_reads_nothing() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.companies
            .create_company(ctx.tenant_uuid, new_company("Acme"))
            .await?;

        let count: i64 = query_scalar("SELECT count(*) FROM companies")
            .fetch_one(&ctx.app_pool)
            .await?;

        assert_eq!(count, 0);

        Ok(())
    }

    #[tokio::test]
    async fn emptied_tenant_setting_reads_nothing() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.companies
            .create_company(ctx.tenant_uuid, new_company("Acme"))
            .await?;

        let mut tx = ctx.app_pool.begin().await?;

        query("SELECT set_config('app.current_tenant', '', true)")
            .execute(&mut *tx)
            .await?;

        let count: i64 = query_scalar("SELECT count(*) FROM companies")
            .fetch_one(&mut *tx)
            .await?;

        assert_eq!(count, 0);

        Ok(())
    }

    #[tokio::test]
    async fn seed_company_unscoped_is_visible_to_its_tenant() -> TestResult {
        let ctx = TestContext::new().await;

        let seeded = ctx
            .companies
            .seed_company_unscoped(ctx.tenant_uuid, new_company("Seeded"))
            .await?;

        let company = ctx.companies.get_company(ctx.tenant_uuid, seeded).await?;

        assert_eq!(company.name, "Seeded");
        assert_eq!(company.tenant_uuid, ctx.tenant_uuid);

        Ok(())
    }
}
