//! Refresh Tokens
//!
//! Server-side ledger of issued refresh tokens. Only Argon2 hashes are stored; a raw
//! token is located by verifying it against each live candidate of its subject.

pub mod errors;
pub mod records;
mod repository;
pub mod store;

pub use errors::RefreshTokenError;
pub use store::*;
