//! Sessions
//!
//! Quiz sessions keyed by a display name that only one live session may hold.

pub mod data;
mod errors;
pub mod presence;
pub mod records;
mod repository;
pub mod service;

pub use errors::SessionsServiceError;
