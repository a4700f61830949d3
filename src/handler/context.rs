//! Request-scoped state handed to handlers.

use std::collections::HashMap;

use crate::routing::HttpMethod;

/// Key-value context for one request.
///
/// The dispatcher writes query parameters first and path parameters
/// second, so a path parameter wins over a query parameter of the same name.
#[derive(Debug, Clone)]
pub struct RequestContext {
    method: HttpMethod,
    path: String,
    params: HashMap<String, String>,
    body: String,
    remainder: Option<String>,
}

impl RequestContext {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: HashMap::new(),
            body: String::new(),
            remainder: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Bind a parameter, replacing any earlier value.
    pub fn param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.insert(name.into(), value.into());
    }

    pub fn get_param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Path tail beyond a prefix route, set by the dispatcher.
    pub fn remainder(&self) -> Option<&str> {
        self.remainder.as_deref()
    }

    pub(crate) fn set_remainder(&mut self, remainder: Option<String>) {
        self.remainder = remainder;
    }
}
