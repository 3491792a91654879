//! Locations service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        companies::{
            CompaniesServiceError, records::CompanyUuid, repository::PgCompaniesRepository,
        },
        locations::{
            data::NewLocation,
            errors::LocationsServiceError,
            records::{LocationRecord, LocationUuid},
            repository::PgLocationsRepository,
        },
        tenants::records::TenantUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgLocationsService {
    db: Db,
    companies: PgCompaniesRepository,
    repository: PgLocationsRepository,
}

impl PgLocationsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            companies: PgCompaniesRepository::new(),
            repository: PgLocationsRepository::new(),
        }
    }
}

#[async_trait]
impl LocationsService for PgLocationsService {
    async fn list_locations(
        &self,
        tenant: TenantUuid,
        company: CompanyUuid,
    ) -> Result<Vec<LocationRecord>, LocationsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        // An invisible company and a company without locations must not look alike.
        self.companies
            .get_company(&mut tx, company)
            .await
            .map_err(CompaniesServiceError::from)?;

        let locations = self.repository.list_locations(&mut tx, company).await?;

        tx.commit().await?;

        Ok(locations)
    }

    async fn create_location(
        &self,
        tenant: TenantUuid,
        company: CompanyUuid,
        location: NewLocation,
    ) -> Result<LocationRecord, LocationsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        self.companies
            .get_company(&mut tx, company)
            .await
            .map_err(CompaniesServiceError::from)?;

        let created = self
            .repository
            .create_location(&mut tx, company, location)
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn delete_location(
        &self,
        tenant: TenantUuid,
        location: LocationUuid,
    ) -> Result<(), LocationsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let rows_affected = self
            .repository
            .soft_delete_location(&mut tx, location)
            .await?;

        if rows_affected == 0 {
            return Err(LocationsServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait LocationsService: Send + Sync {
    /// Active locations of a company visible to the tenant.
    async fn list_locations(
        &self,
        tenant: TenantUuid,
        company: CompanyUuid,
    ) -> Result<Vec<LocationRecord>, LocationsServiceError>;

    /// Add a location to one of the tenant's companies.
    async fn create_location(
        &self,
        tenant: TenantUuid,
        company: CompanyUuid,
        location: NewLocation,
    ) -> Result<LocationRecord, LocationsServiceError>;

    /// Soft-delete a location. Deleted locations stop being listed.
    async fn delete_location(
        &self,
        tenant: TenantUuid,
        location: LocationUuid,
    ) -> Result<(), LocationsServiceError>;
}
