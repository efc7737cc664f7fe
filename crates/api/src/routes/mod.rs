//! HTTP route handlers.

pub mod audits;
pub mod auth;
pub mod controls;
pub mod evidence;
pub mod frameworks;
pub mod health;
pub mod organizations;
pub mod policies;
pub mod tasks;

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::Response,
};

use crate::error::ApiError;

/// Streams `body` as a file download named `file_name`.
pub(crate) fn attachment(
    file_name: &str,
    content_type: &str,
    size: u64,
    body: Body,
) -> Result<Response, ApiError> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, size)
        .header(header::CONTENT_DISPOSITION, content_disposition(file_name))
        .body(body)
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}

fn content_disposition(file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .map(|c| if c == '"' || c.is_control() { '_' } else { c })
        .collect();
    format!("attachment; filename=\"{}\"", safe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_quotes_name() {
        assert_eq!(
            content_disposition("audit_export_x.zip"),
            "attachment; filename=\"audit_export_x.zip\""
        );
        assert_eq!(
            content_disposition("bad\"name\n.pdf"),
            "attachment; filename=\"bad_name_.pdf\""
        );
    }

    #[test]
    fn test_attachment_headers() {
        let response = attachment("r.html", "application/octet-stream", 3, Body::from("abc")).unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "3");
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/octet-stream"
        );
    }
}
