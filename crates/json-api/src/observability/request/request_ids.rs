//! Request ID resolution and response header helpers.

use salvo::{
    http::{StatusCode, header::HeaderValue},
    prelude::Response,
};
use tracing::warn;
use uuid::Uuid;

pub(super) const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_REQUEST_ID_LEN: usize = 128;

/// Reuse a caller-supplied id when it is short printable ASCII, otherwise
/// mint a fresh one.
pub(super) fn resolve_request_id(header_value: Option<String>) -> String {
    header_value
        .map(|value| value.trim().to_owned())
        .filter(|value| {
            !value.is_empty()
                && value.len() <= MAX_REQUEST_ID_LEN
                && value.bytes().all(|byte| byte.is_ascii_graphic())
        })
        .unwrap_or_else(|| Uuid::now_v7().to_string())
}

pub(super) fn set_request_id_header(res: &mut Response, request_id: &str) {
    match HeaderValue::from_str(request_id) {
        Ok(value) => {
            res.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        Err(source) => {
            warn!(
                request_id,
                "could not encode request id for response header: {source}"
            );
        }
    }
}

pub(super) fn response_status_or_ok(status_code: Option<StatusCode>) -> StatusCode {
    status_code.unwrap_or(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_ids_are_kept_when_printable() {
        assert_eq!(
            resolve_request_id(Some(" req-42 ".to_owned())),
            "req-42",
            "trimmed caller id"
        );
    }

    #[test]
    fn missing_or_unusable_ids_are_replaced() {
        for header in [None, Some(String::new()), Some("a b".to_owned()), Some("x".repeat(200))] {
            let resolved = resolve_request_id(header);

            assert!(
                Uuid::parse_str(&resolved).is_ok(),
                "expected a generated uuid, got {resolved}"
            );
        }
    }
}
