//! Authentication routes and the bearer token middleware.

pub(crate) mod errors;
mod handlers;
pub(crate) mod middleware;
pub(crate) mod models;

pub(crate) use handlers::*;
