//! Promotions
//!
//! Ad campaigns sharing an hourly time budget per placement.

pub mod capacity;
pub mod data;
mod errors;
pub mod records;
mod repository;
pub mod rotation;
pub mod schedule;
pub mod service;

pub use errors::{PromotionValidationError, PromotionsServiceError};
pub use repository::PromotionRevision;
