//! OAuth Accounts
//!
//! Links between local users and identities at external providers. Provider tokens
//! are stored sealed by [`crate::credentials::SecretBox`].

pub mod records;
pub(crate) mod repository;
