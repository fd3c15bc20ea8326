//! [`Context`] over an axum request.
//!
//! # Responsibilities
//! - Extract path params, query string, headers and the buffered body
//! - Collect the response written by the handler chain
//! - Convert the collected response into an axum `Response`

use std::collections::HashMap;

use axum::{
    body::{Body, Bytes},
    extract::{FromRequestParts, Query, RawPathParams},
    http::{header::HeaderName, HeaderMap, HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::handler::context::{Context, HandlerError};
use crate::handler::local::ResponseBody;

/// Request-scoped context handed to every step of a handler chain.
pub struct HttpContext {
    method: String,
    path: String,
    params: Vec<(String, String)>,
    query: HashMap<String, String>,
    headers: HeaderMap,
    body: Bytes,
    values: HashMap<String, Value>,
    aborted: bool,
    status: u16,
    response_headers: Vec<(String, String)>,
    response_body: ResponseBody,
}

impl HttpContext {
    /// Buffer the request body (up to `body_limit` bytes) and capture the
    /// request. Oversized bodies are answered with 413 directly.
    pub async fn from_request(request: Request<Body>, body_limit: usize) -> Result<Self, Response> {
        let (mut parts, body) = request.into_parts();

        let params = match RawPathParams::from_request_parts(&mut parts, &()).await {
            Ok(raw) => raw
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            Err(_) => Vec::new(),
        };
        let query = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .map(|Query(q)| q)
            .unwrap_or_default();

        let body = axum::body::to_bytes(body, body_limit).await.map_err(|e| {
            tracing::warn!(error = %e, limit = body_limit, "Request body rejected");
            (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(json!({ "error": "request body too large" })),
            )
                .into_response()
        })?;

        Ok(Self {
            method: parts.method.to_string(),
            path: parts.uri.path().to_string(),
            params,
            query,
            headers: parts.headers,
            body,
            values: HashMap::new(),
            aborted: false,
            status: 200,
            response_headers: Vec::new(),
            response_body: ResponseBody::Empty,
        })
    }

    /// Answer with the error's status and a JSON error body.
    pub fn fail(&mut self, err: &HandlerError) {
        self.json(err.status_code(), json!({ "error": err.message() }));
        self.abort();
    }

    pub fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = match self.response_body {
            ResponseBody::Empty => status.into_response(),
            ResponseBody::Json(value) => (status, Json(value)).into_response(),
            ResponseBody::Text(text) => (status, text).into_response(),
        };

        for (key, value) in self.response_headers {
            match (HeaderName::try_from(key.as_str()), HeaderValue::try_from(value.as_str())) {
                (Ok(name), Ok(value)) => {
                    response.headers_mut().insert(name, value);
                }
                _ => tracing::warn!(header = %key, "Dropping invalid response header"),
            }
        }
        response
    }
}

impl Context for HttpContext {
    fn method(&self) -> &str {
        &self.method
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    fn body(&self) -> &[u8] {
        &self.body
    }

    fn json(&mut self, status: u16, body: Value) {
        self.status = status;
        self.response_body = ResponseBody::Json(body);
    }

    fn string(&mut self, status: u16, body: String) {
        self.status = status;
        self.response_body = ResponseBody::Text(body);
    }

    fn status(&mut self, status: u16) {
        self.status = status;
    }

    fn set_header(&mut self, key: &str, value: &str) {
        self.response_headers.push((key.to_string(), value.to_string()));
    }

    fn abort(&mut self) {
        self.aborted = true;
    }

    fn is_aborted(&self) -> bool {
        self.aborted
    }

    fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_from_request_captures_query_headers_and_body() {
        let request = Request::builder()
            .method("POST")
            .uri("http://localhost/users?page=2")
            .header("X-Tenant", "acme")
            .body(Body::from(r#"{"name":"ada"}"#))
            .unwrap();

        let ctx = HttpContext::from_request(request, 1024).await.unwrap();
        assert_eq!(ctx.method(), "POST");
        assert_eq!(ctx.path(), "/users");
        assert_eq!(ctx.query("page"), Some("2"));
        assert_eq!(ctx.header("x-tenant"), Some("acme"));
        assert_eq!(ctx.body(), br#"{"name":"ada"}"#);
        assert_eq!(ctx.param("id"), None);
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let request = Request::builder()
            .uri("http://localhost/upload")
            .body(Body::from(vec![0u8; 64]))
            .unwrap();

        let response = HttpContext::from_request(request, 16).await.err().unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_into_response_applies_status_and_headers() {
        let request = Request::builder().uri("http://localhost/").body(Body::empty()).unwrap();
        let mut ctx = HttpContext::from_request(request, 16).await.unwrap();
        ctx.set_header("x-served-by", "route-binder");
        ctx.string(202, "accepted".into());

        let response = ctx.into_response();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(response.headers()["x-served-by"], "route-binder");
    }

    #[tokio::test]
    async fn test_fail_uses_error_status() {
        let request = Request::builder().uri("http://localhost/").body(Body::empty()).unwrap();
        let mut ctx = HttpContext::from_request(request, 16).await.unwrap();
        ctx.fail(&HandlerError::status(404, "no such user"));

        assert!(ctx.is_aborted());
        assert_eq!(ctx.into_response().status(), StatusCode::NOT_FOUND);
    }
}
