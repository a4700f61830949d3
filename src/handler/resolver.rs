//! Resolution of named controller actions.

use std::collections::HashMap;
use std::sync::Arc;

use super::{Outcome, RequestContext, RequestHandler};

/// Looks up a controller action by the name used in a route file.
///
/// Returning `None` fails the route table build.
pub trait HandlerResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Option<Arc<dyn RequestHandler>>;
}

impl<F> HandlerResolver for F
where
    F: Fn(&str) -> Option<Arc<dyn RequestHandler>> + Send + Sync,
{
    fn resolve(&self, name: &str) -> Option<Arc<dyn RequestHandler>> {
        self(name)
    }
}

/// Resolver that accepts every name. The handler answers with the action
/// name itself, which is enough to check where requests would land.
pub fn placeholder_action(name: &str) -> Option<Arc<dyn RequestHandler>> {
    let name = name.to_string();
    Some(Arc::new(move |_: &RequestContext| Outcome::Text(name.clone())))
}

/// Map-backed resolver.
#[derive(Default, Clone)]
pub struct ActionRegistry {
    actions: HashMap<String, Arc<dyn RequestHandler>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`, replacing any previous action.
    pub fn register<H>(&mut self, name: impl Into<String>, handler: H) -> &mut Self
    where
        H: RequestHandler + 'static,
    {
        self.actions.insert(name.into(), Arc::new(handler));
        self
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }
}

impl HandlerResolver for ActionRegistry {
    fn resolve(&self, name: &str) -> Option<Arc<dyn RequestHandler>> {
        self.actions.get(name).cloned()
    }
}
