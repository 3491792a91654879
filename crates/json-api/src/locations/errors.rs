//! Location Errors

use salvo::http::StatusError;
use tracing::error;

use tenantry_app::domain::locations::LocationsServiceError;

pub(crate) fn into_status_error(error: LocationsServiceError) -> StatusError {
    match error {
        LocationsServiceError::AlreadyExists => {
            StatusError::conflict().brief("Location already exists")
        }
        LocationsServiceError::NotFound => StatusError::not_found().brief("Location not found"),
        LocationsServiceError::CompanyNotFound => {
            StatusError::not_found().brief("Company not found")
        }
        LocationsServiceError::MissingRequiredData => {
            StatusError::bad_request().brief("Invalid location payload")
        }
        LocationsServiceError::Sql(source) => {
            error!("location storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
