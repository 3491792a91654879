//! Tenantry core: credentials, tenant isolation and the authentication pipeline.

pub mod auth;
pub mod cache;
pub mod context;
pub mod credentials;
pub mod database;
pub mod domain;
pub mod mailer;


mod uuids;
