//! Domain records, repositories and services.

pub mod companies;
pub mod locations;
pub mod oauth_accounts;
pub mod refresh_tokens;
pub mod tenants;
pub mod users;
