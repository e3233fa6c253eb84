//! Shared application domain, persistence, media and auth modules.

pub mod auth;
pub mod context;
pub mod database;
pub mod domain;
pub mod labels;
pub mod media;


mod uuids;

pub use uuids::TypedUuid;
