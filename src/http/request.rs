//! Request identification.
//!
//! # Responsibilities
//! - Reuse the caller's request ID or generate a UUID v4
//! - Expose the ID to handlers as a request header
//! - Echo the ID on the response
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Invalid inbound IDs are replaced, never rejected

use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Request ID of an inbound request, if it carries a usable one.
pub fn request_id<B>(request: &Request<B>) -> Option<&str> {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

/// Axum middleware tagging every request and response with an ID.
pub async fn request_id_middleware(mut request: Request<Body>, next: Next) -> Response {
    let value = request_id(&request)
        .and_then(|id| HeaderValue::from_str(id).ok())
        .unwrap_or_else(|| {
            // UUIDs are always valid header values
            HeaderValue::from_str(&Uuid::new_v4().to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("unknown"))
        });

    request.headers_mut().insert(X_REQUEST_ID, value.clone());
    let mut response = next.run(request).await;
    response.headers_mut().insert(X_REQUEST_ID, value);
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_ignores_empty_header() {
        let request = Request::builder()
            .header(X_REQUEST_ID, "")
            .body(())
            .unwrap();
        assert_eq!(request_id(&request), None);

        let request = Request::builder()
            .header(X_REQUEST_ID, "abc-123")
            .body(())
            .unwrap();
        assert_eq!(request_id(&request), Some("abc-123"));
    }
}
