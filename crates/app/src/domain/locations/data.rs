//! Locations Data

use crate::domain::locations::records::LocationUuid;

/// New Location Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLocation {
    pub uuid: LocationUuid,
    pub name: String,
    pub address: Option<String>,
    pub website: Option<String>,
    pub is_primary: bool,
}
