// Error types for authprobe
// Only pre-flight surfaces fail: spec loading, client setup and report writing.
// A failed probe is a ProbeOutcome, never an Error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid spec: {0}")]
    Spec(String),

    #[error("You must provide either --token or --cookie for authenticated probes")]
    MissingCredential,

    #[error("Report error: {0}")]
    Report(String),
}

pub type Result<T> = std::result::Result<T, Error>;
