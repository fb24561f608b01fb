// Probe outcomes and the transport seam the runner drives

use std::fmt;
use std::future::Future;

use crate::models::Method;

/// Reduced result of one HTTP attempt.
#[derive(Debug, Clone, Eq)]
pub enum ProbeOutcome {
    Status { code: u16, text: String },
    /// Timeout, refused connection, DNS failure or a request that could not be built
    TransportError,
}

impl ProbeOutcome {
    /// Status outcome carrying the standard reason phrase for `code`
    pub fn status(code: u16) -> Self {
        let text = reqwest::StatusCode::from_u16(code)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("")
            .to_string();
        ProbeOutcome::Status { code, text }
    }

    pub fn code(&self) -> Option<u16> {
        match self {
            ProbeOutcome::Status { code, .. } => Some(*code),
            ProbeOutcome::TransportError => None,
        }
    }

    pub fn is_transport_error(&self) -> bool {
        matches!(self, ProbeOutcome::TransportError)
    }
}

/// Outcomes compare by status code alone; the reason phrase never matters.
impl PartialEq for ProbeOutcome {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ProbeOutcome::Status { code: a, .. }, ProbeOutcome::Status { code: b, .. }) => a == b,
            (ProbeOutcome::TransportError, ProbeOutcome::TransportError) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::Status { code, text } if text.is_empty() => write!(f, "{}", code),
            ProbeOutcome::Status { code, text } => write!(f, "{} {}", code, text),
            ProbeOutcome::TransportError => f.write_str("ERR"),
        }
    }
}

/// Issues a single request and classifies it. Implementations must not fail:
/// every transport problem becomes `ProbeOutcome::TransportError`.
pub trait Prober {
    fn probe(
        &self,
        method: Method,
        url: &str,
        headers: &[(&str, &str)],
    ) -> impl Future<Output = ProbeOutcome> + Send;
}
