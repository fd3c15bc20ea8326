//! Ordered registry of handler instances.
//!
//! # Design Decisions
//! - Registration order is significant: resolution is first-match-wins
//! - No de-duplication and no removal

use std::fmt;
use std::sync::Arc;

use crate::handler::context::RouteConfig;
use crate::handler::instance::HandlerInstance;

/// Handler instances in registration order.
#[derive(Clone, Default)]
pub struct HandlerPool {
    instances: Vec<Arc<dyn HandlerInstance>>,
}

impl HandlerPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H>(&mut self, instance: H) -> &mut Self
    where
        H: HandlerInstance + 'static,
    {
        self.instances.push(Arc::new(instance));
        self
    }

    pub fn register_arc(&mut self, instance: Arc<dyn HandlerInstance>) -> &mut Self {
        self.instances.push(instance);
        self
    }

    pub fn extend<I>(&mut self, instances: I) -> &mut Self
    where
        I: IntoIterator<Item = Arc<dyn HandlerInstance>>,
    {
        self.instances.extend(instances);
        self
    }

    /// All instances, in registration order.
    pub fn all(&self) -> &[Arc<dyn HandlerInstance>] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Explicit routes of every instance, in registration order.
    pub fn provided_routes(&self) -> Vec<RouteConfig> {
        self.instances.iter().flat_map(|i| i.routes()).collect()
    }
}

impl fmt::Debug for HandlerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.instances.iter().map(|i| i.type_name()))
            .finish()
    }
}
