//! Location Records

use jiff::Timestamp;

use crate::{domain::companies::records::CompanyUuid, uuids::TypedUuid};

/// Location UUID
pub type LocationUuid = TypedUuid<LocationRecord>;

/// Location Record
///
/// Belongs to a tenant only through its company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationRecord {
    pub uuid: LocationUuid,
    pub company_uuid: CompanyUuid,
    pub name: String,
    pub address: Option<String>,
    pub website: Option<String>,
    pub is_primary: bool,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
