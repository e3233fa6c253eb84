//! Umutoza Domain Concerns

pub mod messages;
pub mod promotions;
pub mod questions;
pub mod sessions;
