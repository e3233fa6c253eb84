//! Questions
//!
//! The question bank and the sampler that builds quiz attempts from it.

pub mod data;
mod errors;
pub mod records;
mod repository;
pub mod sampler;
pub mod service;

pub use errors::{QuestionValidationError, QuestionsServiceError};
