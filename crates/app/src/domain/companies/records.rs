//! Company Records

use jiff::Timestamp;

use crate::{domain::tenants::records::TenantUuid, uuids::TypedUuid};

/// Company UUID
pub type CompanyUuid = TypedUuid<CompanyRecord>;

/// Company Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyRecord {
    pub uuid: CompanyUuid,
    pub tenant_uuid: TenantUuid,
    pub name: String,

    /// Tax or registry identifier.
    pub identifier: Option<String>,

    pub country: String,
    pub industry: Option<String>,

    /// IANA zone name.
    pub timezone: String,

    pub opt_in_benchmarking: bool,
    pub is_demo: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
