// Progress stream between the runner and a display
// A bounded channel: when it is full the runner waits before its next probe.

use std::fmt;

use tokio::sync::mpsc;

use crate::models::{Method, Summary};

pub const DEFAULT_PROGRESS_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unauth,
    Auth,
    Bypass(&'static str),
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Unauth => f.write_str("unauth"),
            Phase::Auth => f.write_str("auth"),
            Phase::Bypass(name) => write!(f, "bypass:{}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    /// 1-based
    pub current_index: usize,
    pub total: usize,
    pub method: Method,
    pub url: String,
    pub phase: Phase,
}

/// What travels on the stream. `Summary` is always last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressMessage {
    Progress(ProgressEvent),
    Summary(Summary),
}

pub type ProgressSender = mpsc::Sender<ProgressMessage>;
pub type ProgressReceiver = mpsc::Receiver<ProgressMessage>;

pub fn progress_channel(capacity: usize) -> (ProgressSender, ProgressReceiver) {
    mpsc::channel(capacity.max(1))
}
