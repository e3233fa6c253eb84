//! Point-in-time query parsing helpers.

use jiff::Timestamp;
use salvo::oapi::extract::QueryParam;

use crate::errors::ApiError;

/// Resolve the optional `at` query parameter used to preview campaign
/// schedules, defaulting to the current time.
pub(crate) trait PointInTimeExt {
    fn into_point_in_time(self) -> Result<Timestamp, ApiError>;
}

impl PointInTimeExt for QueryParam<String, false> {
    fn into_point_in_time(self) -> Result<Timestamp, ApiError> {
        match self.into_inner() {
            Some(value) => value.parse::<Timestamp>().map_err(|source| {
                ApiError::validation(format!(
                    "could not parse \"at\" query parameter as an RFC 3339 timestamp: {source}"
                ))
            }),
            None => Ok(Timestamp::now()),
        }
    }
}
