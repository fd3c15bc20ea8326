//! Handler instances: opaque objects known only by their named members.

use std::fmt;
use std::sync::Arc;

use crate::handler::context::{Context, HandlerError, RouteConfig};
use crate::handler::member::{Member, Signature};

/// A caller-registered object exposing named callable members.
///
/// The binding core only looks members up by name and never mutates the
/// instance.
pub trait HandlerInstance: Send + Sync {
    /// Concrete type name, used in diagnostics.
    fn type_name(&self) -> &str;

    /// First member registered under `name`, if any. Names are case-sensitive.
    fn member(&self, name: &str) -> Option<&Member>;

    fn members(&self) -> &[Member];

    /// Routes the instance declares explicitly rather than through annotations.
    fn routes(&self) -> Vec<RouteConfig> {
        Vec::new()
    }
}

/// Builder-made [`HandlerInstance`].
#[derive(Clone)]
pub struct HandlerObject {
    type_name: String,
    members: Vec<Member>,
    routes: Vec<RouteConfig>,
}

impl HandlerObject {
    pub fn builder(type_name: impl Into<String>) -> HandlerObjectBuilder {
        HandlerObjectBuilder {
            object: HandlerObject {
                type_name: type_name.into(),
                members: Vec::new(),
                routes: Vec::new(),
            },
        }
    }

    /// Builder named after `T`, without its module path.
    pub fn for_type<T: ?Sized>() -> HandlerObjectBuilder {
        Self::builder(short_type_name::<T>())
    }
}

impl HandlerInstance for HandlerObject {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name() == name)
    }

    fn members(&self) -> &[Member] {
        &self.members
    }

    fn routes(&self) -> Vec<RouteConfig> {
        self.routes.clone()
    }
}

impl fmt::Debug for HandlerObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerObject")
            .field("type_name", &self.type_name)
            .field("members", &self.members)
            .field("routes", &self.routes)
            .finish()
    }
}

pub struct HandlerObjectBuilder {
    object: HandlerObject,
}

impl HandlerObjectBuilder {
    pub fn member(mut self, member: Member) -> Self {
        self.object.members.push(member);
        self
    }

    /// Register a `fn(&mut dyn Context)` closure.
    pub fn handler<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut dyn Context) + Send + Sync + 'static,
    {
        self.member(Member::plain(name, f))
    }

    /// Register a `fn(&mut dyn Context) -> Result<(), HandlerError>` closure.
    pub fn fallible<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut dyn Context) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.member(Member::fallible(name, f))
    }

    /// Register a method of a shared receiver.
    pub fn bind<T>(self, name: impl Into<String>, target: &Arc<T>, method: fn(&T, &mut dyn Context)) -> Self
    where
        T: Send + Sync + 'static,
    {
        let target = Arc::clone(target);
        self.handler(name, move |ctx| method(&target, ctx))
    }

    /// Register a fallible method of a shared receiver.
    pub fn bind_fallible<T>(
        self,
        name: impl Into<String>,
        target: &Arc<T>,
        method: fn(&T, &mut dyn Context) -> Result<(), HandlerError>,
    ) -> Self
    where
        T: Send + Sync + 'static,
    {
        let target = Arc::clone(target);
        self.fallible(name, move |ctx| method(&target, ctx))
    }

    /// Describe a member that exists but is not a handler.
    pub fn opaque(self, name: impl Into<String>, signature: Signature) -> Self {
        self.member(Member::opaque(name, signature))
    }

    /// Declare an explicit route.
    pub fn route(mut self, route: RouteConfig) -> Self {
        self.object.routes.push(route);
        self
    }

    pub fn build(self) -> HandlerObject {
        self.object
    }
}

fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    // Keep generic arguments intact, strip the path of the outer type only.
    let head_end = full.find('<').unwrap_or(full.len());
    let start = full[..head_end].rfind("::").map(|i| i + 2).unwrap_or(0);
    full[start..].to_string()
}
