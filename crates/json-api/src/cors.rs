//! Cross-origin access for the browser front end.

use salvo::{
    cors::{AllowOrigin, Cors, CorsHandler},
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
};
use tracing::warn;

const MAX_AGE_SECS: usize = 60 * 60;

/// Build the CORS handler from a comma-separated origin list; `*` allows
/// any origin.
pub(crate) fn handler(origins: &str) -> CorsHandler {
    Cors::new()
        .allow_origin(allow_origin(origins))
        .allow_methods(vec![
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(vec![AUTHORIZATION, CONTENT_TYPE])
        .max_age(MAX_AGE_SECS)
        .into_handler()
}

fn allow_origin(origins: &str) -> AllowOrigin {
    if origins.trim() == "*" {
        return AllowOrigin::any();
    }

    AllowOrigin::list(parse_origins(origins))
}

fn parse_origins(origins: &str) -> Vec<HeaderValue> {
    origins
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| {
            HeaderValue::from_str(origin)
                .inspect_err(|_invalid| warn!(origin, "ignoring invalid CORS origin"))
                .ok()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_split_and_trimmed() {
        let origins = parse_origins("https://umutoza.rw, http://localhost:5173,,");

        assert_eq!(
            origins,
            vec![
                HeaderValue::from_static("https://umutoza.rw"),
                HeaderValue::from_static("http://localhost:5173"),
            ],
            "origins"
        );
    }
}
