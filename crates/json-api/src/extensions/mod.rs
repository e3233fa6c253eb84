//! Extension traits shared by the handlers.
//!
//! Glob-import this module to bring the methods into scope.

mod depot;
mod point_in_time;

pub(crate) use depot::DepotExt as _;
pub(crate) use point_in_time::PointInTimeExt as _;
