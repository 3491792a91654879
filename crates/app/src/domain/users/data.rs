//! Users Data

use crate::domain::{
    tenants::records::TenantUuid,
    users::records::{Role, UserUuid},
};

/// New User Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub uuid: UserUuid,
    pub email: String,
    pub hashed_password: Option<String>,
    pub full_name: Option<String>,
    pub tenant_uuid: Option<TenantUuid>,
    pub role: Role,
    pub is_superuser: bool,
    pub is_verified: bool,
}
