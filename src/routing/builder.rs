//! Route table construction from route-definition lines.
//!
//! Each line is `METHOD PATH TARGET`:
//!
//! ```text
//! # comment
//! GET     /                       Application.index
//! *       /somewhere              Application.foo
//! GET     /service/{<[0-9]{3}>id} Services.show
//! GET     /public                 staticDir:/var/www/public
//! GET     /magic_words            echo: Hello world!
//! ```
//!
//! Only the first two tokens are structural; the rest of the line is the
//! target, so `echo:` payloads may contain blanks.
//!
//! A relative `staticDir:` path is joined onto the builder's base
//! directory. When building from a routes file that is the file's own
//! directory, unless a base was set explicitly.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::handler::{Echo, Handler, HandlerResolver, StaticDir};
use crate::routing::method::{MethodFilter, UnsupportedMethod};
use crate::routing::pattern::{PathPattern, PatternError};
use crate::routing::table::{Route, RouteTable};

const STATIC_DIR_PREFIX: &str = "staticDir:";
const ECHO_PREFIX: &str = "echo:";

/// Errors that abort a route table build. Line numbers are 1-based.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to read routes file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("line {line}: {source}")]
    Method {
        line: usize,
        #[source]
        source: UnsupportedMethod,
    },

    #[error("line {line}: {source}")]
    Pattern {
        line: usize,
        #[source]
        source: PatternError,
    },

    #[error("line {line}: cannot resolve action '{name}'")]
    UnresolvedAction { line: usize, name: String },
}

/// Parses route-definition lines into a [`RouteTable`].
#[derive(Clone)]
pub struct RouteTableBuilder<'r> {
    resolver: &'r dyn HandlerResolver,
    base_dir: Option<PathBuf>,
}

impl<'r> RouteTableBuilder<'r> {
    pub fn new(resolver: &'r dyn HandlerResolver) -> Self {
        Self {
            resolver,
            base_dir: None,
        }
    }

    /// Resolve relative `staticDir:` paths against `dir`.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Build from a sequence of lines. The first failing line aborts the
    /// whole build.
    pub fn build<I, S>(&self, lines: I) -> Result<RouteTable, BuildError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut routes = Vec::new();
        for (index, line) in lines.into_iter().enumerate() {
            if let Some(route) = self.parse_line(index + 1, line.as_ref())? {
                routes.push(route);
            }
        }

        tracing::debug!(routes = routes.len(), "Route table built");
        Ok(RouteTable::new(routes))
    }

    /// Build from the text of a routes file.
    pub fn build_str(&self, source: &str) -> Result<RouteTable, BuildError> {
        self.build(source.lines())
    }

    /// Build from an optional routes file followed by extra inline lines.
    /// Line numbers continue across both sources.
    pub fn build_sources(&self, file: Option<&Path>, inline: &[String]) -> Result<RouteTable, BuildError> {
        let content = match file {
            Some(path) => fs::read_to_string(path).map_err(|source| BuildError::Io {
                path: path.to_path_buf(),
                source,
            })?,
            None => String::new(),
        };

        let lines = content.lines().chain(inline.iter().map(String::as_str));
        match file.and_then(Path::parent) {
            Some(dir) if self.base_dir.is_none() => self.clone().with_base_dir(dir).build(lines),
            _ => self.build(lines),
        }
    }

    /// Parse one line. Blank lines and `#` comments yield `Ok(None)`.
    pub fn parse_line(&self, line: usize, text: &str) -> Result<Option<Route>, BuildError> {
        let text = text.trim();
        if text.is_empty() || text.starts_with('#') {
            return Ok(None);
        }

        let (method, rest) = split_token(text);
        let (path, target) = split_token(rest);
        if path.is_empty() || target.is_empty() {
            return Err(BuildError::Malformed {
                line,
                reason: format!("expected 'METHOD PATH TARGET', got '{text}'"),
            });
        }

        let method: MethodFilter = method
            .parse()
            .map_err(|source| BuildError::Method { line, source })?;
        let pattern = PathPattern::parse(path).map_err(|source| BuildError::Pattern { line, source })?;
        let handler = self.parse_target(line, target)?;

        Ok(Some(Route::new(method, pattern, handler)))
    }

    fn parse_target(&self, line: usize, target: &str) -> Result<Handler, BuildError> {
        if let Some(message) = target.strip_prefix(ECHO_PREFIX) {
            return Ok(Handler::Echo(Echo::new(message.trim_start())));
        }

        if target.split_whitespace().nth(1).is_some() {
            return Err(BuildError::Malformed {
                line,
                reason: format!("unexpected tokens after target: '{target}'"),
            });
        }

        if let Some(dir) = target.strip_prefix(STATIC_DIR_PREFIX) {
            if dir.is_empty() {
                return Err(BuildError::Malformed {
                    line,
                    reason: "staticDir requires a directory".to_string(),
                });
            }
            let dir = Path::new(dir);
            let base = match &self.base_dir {
                Some(root) if dir.is_relative() => root.join(dir),
                _ => dir.to_path_buf(),
            };
            return Ok(Handler::StaticDir(StaticDir::new(base)));
        }

        let handler = self
            .resolver
            .resolve(target)
            .ok_or_else(|| BuildError::UnresolvedAction {
                line,
                name: target.to_string(),
            })?;

        Ok(Handler::Action {
            name: target.to_string(),
            handler,
        })
    }
}

/// Split off the first whitespace-delimited token.
fn split_token(text: &str) -> (&str, &str) {
    match text.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail.trim_start()),
        None => (text, ""),
    }
}
