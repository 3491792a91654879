//! User Records

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{domain::tenants::records::TenantUuid, uuids::TypedUuid};

/// User UUID
pub type UserUuid = TypedUuid<UserRecord>;

/// User Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub uuid: UserUuid,

    /// Stored lowercased; unique across all tenants.
    pub email: String,

    /// Argon2 PHC string. `None` for accounts created through an OAuth provider.
    pub hashed_password: Option<String>,

    pub full_name: Option<String>,

    /// `None` only for platform superusers.
    pub tenant_uuid: Option<TenantUuid>,

    pub role: Role,
    pub is_active: bool,
    pub is_superuser: bool,
    pub is_verified: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Role of a user within its tenant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[default]
    Owner,
    Manager,
    Analyst,
    Viewer,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "Owner",
            Self::Manager => "Manager",
            Self::Analyst => "Analyst",
            Self::Viewer => "Viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Owner" => Ok(Self::Owner),
            "Manager" => Ok(Self::Manager),
            "Analyst" => Ok(Self::Analyst),
            "Viewer" => Ok(Self::Viewer),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn role_parses_its_own_name() -> TestResult {
        for role in [Role::Owner, Role::Manager, Role::Analyst, Role::Viewer] {
            assert_eq!(role.as_str().parse::<Role>()?, role);
        }

        Ok(())
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!("owner".parse::<Role>().is_err(), "roles are case-sensitive");
    }

    #[test]
    fn role_serialises_as_name() -> TestResult {
        assert_eq!(serde_json::to_string(&Role::Analyst)?, "\"Analyst\"");

        Ok(())
    }
}
