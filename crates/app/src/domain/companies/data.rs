//! Companies Data

use crate::domain::companies::records::CompanyUuid;

pub const DEFAULT_TIMEZONE: &str = "America/Santiago";

/// New Company Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCompany {
    pub uuid: CompanyUuid,
    pub name: String,
    pub identifier: Option<String>,
    pub country: String,
    pub industry: Option<String>,

    /// Falls back to [`DEFAULT_TIMEZONE`].
    pub timezone: Option<String>,

    /// Defaults to opted in.
    pub opt_in_benchmarking: Option<bool>,

    pub is_demo: bool,
}

/// Company Update Data
///
/// Replaces every editable column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyUpdate {
    pub name: String,
    pub identifier: Option<String>,
    pub country: String,
    pub industry: Option<String>,
    pub timezone: String,
    pub opt_in_benchmarking: bool,
}
