//! Auth Handlers

pub(crate) mod login;
