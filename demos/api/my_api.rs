//! Annotated handlers served by the hello_server demo.
//!
//! This file is compiled into the demo and also scanned at startup; the
//! `@route` lines below are what the binder turns into routes.

use std::sync::atomic::{AtomicU64, Ordering};

use route_binder::{Context, ContextExt, HandlerError};
use serde::Deserialize;
use serde_json::json;

pub struct MyApiHandler {
    greeting: String,
    greeted: AtomicU64,
}

#[derive(Deserialize)]
struct EchoRequest {
    message: String,
}

impl MyApiHandler {
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            greeting: greeting.into(),
            greeted: AtomicU64::new(0),
        }
    }

    /// Reply with the configured greeting.
    ///
    /// @route GET /say-hi
    pub fn say_hi(&self, ctx: &mut dyn Context) {
        let count = self.greeted.fetch_add(1, Ordering::Relaxed) + 1;
        ctx.json(200, json!({ "message": self.greeting, "count": count }));
    }

    /// @route GET /users/:id
    pub fn get_user(&self, ctx: &mut dyn Context) -> Result<(), HandlerError> {
        let id: u64 = ctx
            .param("id")
            .and_then(|id| id.parse().ok())
            .ok_or_else(|| HandlerError::status(400, "user id must be a number"))?;
        if id == 0 {
            return Err(HandlerError::status(404, "no such user"));
        }
        ctx.json(200, json!({ "id": id, "name": format!("user-{}", id) }));
        Ok(())
    }

    /// @route POST /echo
    pub fn echo(&self, ctx: &mut dyn Context) -> Result<(), HandlerError> {
        let request: EchoRequest = ctx.bind()?;
        ctx.json(200, json!({ "echo": request.message }));
        Ok(())
    }

    /// Not registered with the binder, so this route is reported as
    /// HandlerNotFound at startup.
    ///
    /// @route GET /stats
    pub fn stats(&self, ctx: &mut dyn Context) {
        ctx.json(200, json!({ "greeted": self.greeted.load(Ordering::Relaxed) }));
    }
}
