//! Messages
//!
//! Contact form inbox.

pub mod data;
mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::{MessageValidationError, MessagesServiceError};
