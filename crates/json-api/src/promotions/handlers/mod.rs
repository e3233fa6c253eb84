//! Promotion Handlers

pub(crate) mod click;
pub(crate) mod create;
pub(crate) mod delete;
pub(crate) mod get;
pub(crate) mod impression;
pub(crate) mod index;
pub(crate) mod public;
pub(crate) mod selection;
pub(crate) mod toggle;
pub(crate) mod update;
