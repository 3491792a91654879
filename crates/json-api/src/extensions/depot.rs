//! Depot helper extensions.

use std::any::Any;

use salvo::prelude::{Depot, StatusError};

use tenantry_app::{auth::Principal, domain::tenants::records::TenantUuid};

use crate::observability::REQUEST_ID_DEPOT_KEY;

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;

    fn insert_principal(&mut self, principal: Principal);

    /// The caller resolved by the auth middleware.
    fn principal_or_401(&self) -> Result<&Principal, StatusError>;

    /// The tenant every tenant-scoped query must be bound to.
    ///
    /// A superuser without a tenant has no tenant data to act on.
    fn tenant_or_403(&self) -> Result<TenantUuid, StatusError>;

    fn request_id(&self) -> Option<&str>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>()
            .map_err(|_ignored| StatusError::internal_server_error())
    }

    fn insert_principal(&mut self, principal: Principal) {
        self.inject(principal);
    }

    fn principal_or_401(&self) -> Result<&Principal, StatusError> {
        self.obtain::<Principal>()
            .map_err(|_ignored| StatusError::unauthorized().brief("Could not validate credentials"))
    }

    fn tenant_or_403(&self) -> Result<TenantUuid, StatusError> {
        self.principal_or_401()?
            .tenant
            .ok_or_else(|| StatusError::forbidden().brief("No tenant associated with this user"))
    }

    fn request_id(&self) -> Option<&str> {
        self.get::<String>(REQUEST_ID_DEPOT_KEY)
            .ok()
            .map(String::as_str)
    }
}
