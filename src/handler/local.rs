//! In-memory [`Context`] for driving handlers without a transport.

use std::collections::HashMap;

use serde_json::Value;

use crate::handler::context::Context;

/// Response body written through a context.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Empty,
    Json(Value),
    Text(String),
}

/// A self-contained request plus the response written to it.
#[derive(Debug, Clone)]
pub struct LocalContext {
    method: String,
    path: String,
    params: HashMap<String, String>,
    query: HashMap<String, String>,
    headers: HashMap<String, String>,
    body: Vec<u8>,
    values: HashMap<String, Value>,
    aborted: bool,
    status: u16,
    response_headers: Vec<(String, String)>,
    response_body: ResponseBody,
}

impl LocalContext {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            params: HashMap::new(),
            query: HashMap::new(),
            headers: HashMap::new(),
            body: Vec::new(),
            values: HashMap::new(),
            aborted: false,
            status: 200,
            response_headers: Vec::new(),
            response_body: ResponseBody::Empty,
        }
    }

    pub fn with_param(mut self, name: &str, value: &str) -> Self {
        self.params.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_query(mut self, name: &str, value: &str) -> Self {
        self.query.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn response_status(&self) -> u16 {
        self.status
    }

    pub fn response_body(&self) -> &ResponseBody {
        &self.response_body
    }

    pub fn response_headers(&self) -> &[(String, String)] {
        &self.response_headers
    }
}

impl Context for LocalContext {
    fn method(&self) -> &str {
        &self.method
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
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
