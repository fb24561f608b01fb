// Run configuration for authprobe, filled in from the command line

use std::path::PathBuf;
use std::time::Duration;

use crate::auth::AuthCredential;
use crate::engine::DEFAULT_TIMEOUT;
use crate::error::{Error, Result};
use crate::progress::DEFAULT_PROGRESS_CAPACITY;

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub spec_path: PathBuf,
    pub base_url: Option<String>,
    pub credential: Option<AuthCredential>,
    pub outdir: PathBuf,
    /// Progress bar on a separate task instead of per-probe log lines
    pub interactive: bool,
    pub timeout: Duration,
    pub progress_capacity: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            spec_path: PathBuf::new(),
            base_url: None,
            credential: None,
            outdir: PathBuf::from("reports"),
            interactive: true,
            timeout: DEFAULT_TIMEOUT,
            progress_capacity: DEFAULT_PROGRESS_CAPACITY,
        }
    }
}

impl ScanConfig {
    /// Pre-flight checks that must pass before any probing starts
    pub fn validate(&self) -> Result<()> {
        if self.credential.is_none() {
            return Err(Error::MissingCredential);
        }
        if self.timeout.is_zero() {
            return Err(Error::Spec("timeout must be greater than zero".to_string()));
        }
        Ok(())
    }
}
