//! Route templates for span names and metric labels.

use uuid::Uuid;

const UPLOADS_PREFIX: &str = "/uploads/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct RequestSpanName {
    pub(super) route: String,
    pub(super) span_name: String,
}

pub(super) fn request_span_name(method: &str, path: &str) -> RequestSpanName {
    let route = route_template(path);
    let span_name = format!("{method} {route}");

    RequestSpanName { route, span_name }
}

/// Collapse ids and uploaded file names so every request to the same handler
/// shares one label.
fn route_template(path: &str) -> String {
    if path.starts_with(UPLOADS_PREFIX) {
        return "/uploads/{file}".to_owned();
    }

    let segments: Vec<&str> = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            if Uuid::parse_str(segment).is_ok() {
                "{id}"
            } else {
                segment
            }
        })
        .collect();

    format!("/{}", segments.join("/"))
}
