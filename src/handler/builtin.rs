//! Built-in handlers available to every route file.

use std::path::{Component, Path, PathBuf};

use super::{Outcome, RequestContext};

/// Responds with a fixed message (`echo: <text>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Echo {
    message: String,
}

impl Echo {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn handle(&self, _ctx: &RequestContext) -> Outcome {
        Outcome::Text(self.message.clone())
    }
}

/// Serves files below a base directory (`staticDir:<dir>`).
///
/// The file is the base joined with the request path beyond the route's
/// own prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticDir {
    base: PathBuf,
}

impl StaticDir {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn handle(&self, ctx: &RequestContext) -> Outcome {
        match ctx.remainder().and_then(|rest| self.locate(rest)) {
            Some(path) => Outcome::File(path),
            None => Outcome::NotFound,
        }
    }

    /// Join `remainder` onto the base. Empty remainders and anything that
    /// is not a plain relative path yield `None`.
    pub fn locate(&self, remainder: &str) -> Option<PathBuf> {
        let relative = Path::new(remainder);
        let plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if remainder.is_empty() || !plain {
            return None;
        }
        Some(self.base.join(relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::HttpMethod;

    #[test]
    fn test_echo_returns_message() {
        let echo = Echo::new("Hello world!");
        let ctx = RequestContext::new(HttpMethod::Get, "/magic_words");
        assert_eq!(echo.handle(&ctx), Outcome::Text("Hello world!".into()));
    }

    #[test]
    fn test_static_dir_locate() {
        let dir = StaticDir::new("/public");
        assert_eq!(
            dir.locate("css/site.css"),
            Some(PathBuf::from("/public/css/site.css"))
        );
        assert_eq!(dir.locate(""), None);
        assert_eq!(dir.locate("../etc/passwd"), None);
        assert_eq!(dir.locate("a/../../b"), None);
    }

    #[test]
    fn test_static_dir_without_remainder_is_not_found() {
        let dir = StaticDir::new("/public");
        let ctx = RequestContext::new(HttpMethod::Get, "/public");
        assert_eq!(dir.handle(&ctx), Outcome::NotFound);
    }
}
