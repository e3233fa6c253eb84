//! Admin authentication

mod errors;
mod handlers;
pub(crate) mod middleware;

pub(crate) use handlers::*;
