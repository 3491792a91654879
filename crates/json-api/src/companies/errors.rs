//! Company Errors

use salvo::http::StatusError;
use tracing::error;

use tenantry_app::domain::companies::CompaniesServiceError;

/// Another tenant's company renders exactly like a missing one.
pub(crate) fn into_status_error(error: CompaniesServiceError) -> StatusError {
    match error {
        CompaniesServiceError::AlreadyExists => {
            StatusError::conflict().brief("Company already exists")
        }
        CompaniesServiceError::NotFound => StatusError::not_found().brief("Company not found"),
        CompaniesServiceError::InvalidReference
        | CompaniesServiceError::MissingRequiredData
        | CompaniesServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid company payload")
        }
        CompaniesServiceError::Sql(source) => {
            error!("company storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
