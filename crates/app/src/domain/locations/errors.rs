//! Locations service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::domain::companies::{CompaniesServiceError, errors::INSUFFICIENT_PRIVILEGE};

#[derive(Debug, Error)]
pub enum LocationsServiceError {
    #[error("location already exists")]
    AlreadyExists,

    #[error("location not found")]
    NotFound,

    #[error("company not found")]
    CompanyNotFound,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for LocationsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        if error
            .as_database_error()
            .and_then(DatabaseError::code)
            .is_some_and(|code| code == INSUFFICIENT_PRIVILEGE)
        {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::CompanyNotFound,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}

impl From<CompaniesServiceError> for LocationsServiceError {
    fn from(error: CompaniesServiceError) -> Self {
        match error {
            CompaniesServiceError::NotFound | CompaniesServiceError::InvalidReference => {
                Self::CompanyNotFound
            }
            CompaniesServiceError::AlreadyExists => Self::AlreadyExists,
            CompaniesServiceError::MissingRequiredData | CompaniesServiceError::InvalidData => {
                Self::MissingRequiredData
            }
            CompaniesServiceError::Sql(error) => Self::Sql(error),
        }
    }
}
