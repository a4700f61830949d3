//! HTTP verbs understood by the route table.

use std::fmt;
use std::str::FromStr;

use axum::http::Method;
use thiserror::Error;

/// A supported HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    /// Every method a `*` route answers to.
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
        HttpMethod::Head,
        HttpMethod::Options,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a method token is not one of [`HttpMethod::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported HTTP method: {0}")]
pub struct UnsupportedMethod(pub String);

impl FromStr for HttpMethod {
    type Err = UnsupportedMethod;

    /// Route files are matched case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnsupportedMethod(s.to_string()))
    }
}

impl TryFrom<&Method> for HttpMethod {
    type Error = UnsupportedMethod;

    fn try_from(method: &Method) -> Result<Self, Self::Error> {
        HttpMethod::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == method.as_str())
            .ok_or_else(|| UnsupportedMethod(method.to_string()))
    }
}

/// Which methods a route answers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodFilter {
    /// `*` in a route file: every supported method.
    Any,
    Only(HttpMethod),
}

impl MethodFilter {
    pub fn matches(&self, method: HttpMethod) -> bool {
        match self {
            MethodFilter::Any => true,
            MethodFilter::Only(m) => *m == method,
        }
    }
}

impl fmt::Display for MethodFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodFilter::Any => f.write_str("*"),
            MethodFilter::Only(m) => fmt::Display::fmt(m, f),
        }
    }
}

impl FromStr for MethodFilter {
    type Err = UnsupportedMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "*" {
            Ok(MethodFilter::Any)
        } else {
            s.parse().map(MethodFilter::Only)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("Delete".parse::<HttpMethod>().unwrap(), HttpMethod::Delete);
        assert!("TRACE".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_wildcard_filter_matches_every_method() {
        let filter: MethodFilter = "*".parse().unwrap();
        assert!(HttpMethod::ALL.iter().all(|m| filter.matches(*m)));

        let get: MethodFilter = "GET".parse().unwrap();
        assert!(get.matches(HttpMethod::Get));
        assert!(!get.matches(HttpMethod::Post));
    }

    #[test]
    fn test_from_axum_method() {
        assert_eq!(HttpMethod::try_from(&Method::PUT).unwrap(), HttpMethod::Put);
        let err = HttpMethod::try_from(&Method::TRACE).unwrap_err();
        assert_eq!(err.to_string(), "unsupported HTTP method: TRACE");
    }
}
