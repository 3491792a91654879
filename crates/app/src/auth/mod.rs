//! Authentication
//!
//! Registration, login, token rotation, email verification, password reset and OAuth
//! account linking, plus resolution of a bearer token into a tenant-bound principal.

mod emails;
mod errors;
mod models;
mod rate_limit;
mod service;

pub use errors::*;
pub use models::*;
pub use service::*;
