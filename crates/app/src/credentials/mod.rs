//! Credential and token codecs.
//!
//! Everything that turns a secret into a verifiable artifact lives here: password
//! hashes, signed bearer tokens and the symmetric box used for third-party secrets
//! at rest.

mod password;
mod secrets;
mod tokens;

pub use password::*;
pub use secrets::*;
pub use tokens::*;
