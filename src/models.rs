// Core data models for authprobe

use std::fmt;
use std::str::FromStr;

use crate::probe::ProbeOutcome;

/// Supported HTTP methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    OPTIONS,
    HEAD,
    TRACE,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::PATCH => "PATCH",
            Method::OPTIONS => "OPTIONS",
            Method::HEAD => "HEAD",
            Method::TRACE => "TRACE",
        }
    }

    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            Method::GET => reqwest::Method::GET,
            Method::POST => reqwest::Method::POST,
            Method::PUT => reqwest::Method::PUT,
            Method::DELETE => reqwest::Method::DELETE,
            Method::PATCH => reqwest::Method::PATCH,
            Method::OPTIONS => reqwest::Method::OPTIONS,
            Method::HEAD => reqwest::Method::HEAD,
            Method::TRACE => reqwest::Method::TRACE,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive; anything that is not an HTTP verb is rejected so path-item
/// keys like `parameters` or `summary` can be skipped by the parser.
impl FromStr for Method {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(Method::GET),
            "POST" => Ok(Method::POST),
            "PUT" => Ok(Method::PUT),
            "DELETE" => Ok(Method::DELETE),
            "PATCH" => Ok(Method::PATCH),
            "OPTIONS" => Ok(Method::OPTIONS),
            "HEAD" => Ok(Method::HEAD),
            "TRACE" => Ok(Method::TRACE),
            _ => Err(()),
        }
    }
}

/// A declared API operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub method: Method,
    /// Path template as declared, e.g. `/users/{id}`
    pub path: String,
    /// Absolute URL: base URL + path template
    pub url: String,
}

impl Endpoint {
    pub fn new(method: Method, path: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            url: url.into(),
        }
    }
}

/// Output of spec ingestion: the resolved base URL and every declared operation
#[derive(Debug, Clone)]
pub struct ParsedSpec {
    pub base_url: String,
    pub endpoints: Vec<Endpoint>,
}

/// One probe attempt as reported: a label (URL, optionally suffixed with the
/// header-set name) and its outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultEntry {
    pub label: String,
    pub outcome: ProbeOutcome,
}

impl ResultEntry {
    pub fn new(label: impl Into<String>, outcome: ProbeOutcome) -> Self {
        Self {
            label: label.into(),
            outcome,
        }
    }
}

impl fmt::Display for ResultEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.label, self.outcome)
    }
}

/// Everything one run produces. Only appended to while the run is in flight.
#[derive(Debug, Clone, Default)]
pub struct Results {
    pub unauthenticated: Vec<ResultEntry>,
    pub authenticated: Vec<ResultEntry>,
    /// One entry per endpoint x header-set, in catalog order within an endpoint
    pub bypass: Vec<ResultEntry>,
    pub idor_candidates: Vec<String>,
    pub bypass_hits: Vec<String>,
}

impl Results {
    pub fn summary(&self) -> Summary {
        Summary {
            bypass_hit_count: self.bypass_hits.len(),
            idor_candidate_count: self.idor_candidates.len(),
        }
    }
}

/// Terminal event of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Summary {
    pub bypass_hit_count: usize,
    pub idor_candidate_count: usize,
}
