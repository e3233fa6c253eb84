//! Session Handlers

pub(crate) mod delete;
pub(crate) mod heartbeat;
pub(crate) mod index;
pub(crate) mod rename;
pub(crate) mod start;
