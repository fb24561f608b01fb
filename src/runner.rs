// Probe runner for authprobe
// For every endpoint: a baseline probe with no headers, one with the caller's
// credential, then one per bypass header-set. A bypass probe whose outcome
// differs from the baseline is a hit.

use tracing::{debug, error, info, warn};

use crate::auth::AuthCredential;
use crate::bypass::bypass_header_sets;
use crate::idor::is_idor_candidate;
use crate::models::{Endpoint, ResultEntry, Results};
use crate::probe::Prober;
use crate::progress::{Phase, ProgressEvent, ProgressMessage, ProgressSender};

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Log every probe at info level. Turned off while a progress display owns the terminal.
    pub log_probes: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { log_probes: true }
    }
}

pub struct ProbeRunner<P> {
    prober: P,
    options: RunOptions,
}

/// Forwards events to an optional sink. Once the receiver is gone the sink is
/// dropped and probing carries on.
struct Emitter<'a> {
    sink: Option<&'a ProgressSender>,
}

impl Emitter<'_> {
    async fn send(&mut self, msg: ProgressMessage) {
        if let Some(tx) = self.sink {
            if tx.send(msg).await.is_err() {
                debug!("Progress receiver closed, continuing without display");
                self.sink = None;
            }
        }
    }
}

impl<P: Prober> ProbeRunner<P> {
    pub fn new(prober: P, options: RunOptions) -> Self {
        Self { prober, options }
    }

    pub fn prober(&self) -> &P {
        &self.prober
    }

    /// Probe every endpoint in order and return the collected results.
    ///
    /// Never fails: transport problems are recorded as outcomes. With no
    /// credential the authenticated phase sends no auth header at all. When a
    /// sink is given it receives one event per probe and a final `Summary`.
    pub async fn run(
        &self,
        endpoints: &[Endpoint],
        credential: Option<&AuthCredential>,
        sink: Option<&ProgressSender>,
    ) -> Results {
        let mut results = Results::default();
        let mut emitter = Emitter { sink };
        let total = endpoints.len();
        let header_sets = bypass_header_sets();

        if self.options.log_probes {
            info!("Starting probes against API...");
            info!("Total endpoints discovered: {}", total);
        }

        let auth_header = credential.map(|c| c.header());
        let auth_headers: Vec<(&str, &str)> = auth_header
            .iter()
            .map(|(name, value)| (*name, value.as_str()))
            .collect();
        match credential {
            Some(c) if self.options.log_probes => info!("Using {} authentication", c.kind()),
            Some(_) => {}
            None => debug!("No credential supplied, authenticated probes carry no auth header"),
        }

        for (i, ep) in endpoints.iter().enumerate() {
            let event = |phase| {
                ProgressMessage::Progress(ProgressEvent {
                    current_index: i + 1,
                    total,
                    method: ep.method,
                    url: ep.url.clone(),
                    phase,
                })
            };
            if self.options.log_probes {
                info!("[{}/{}] Testing endpoint: {} {}", i + 1, total, ep.method, ep.url);
            }

            emitter.send(event(Phase::Unauth)).await;
            let baseline = self.prober.probe(ep.method, &ep.url, &[]).await;
            if self.options.log_probes {
                info!("  [Unauth] -> {}", baseline);
            }
            results.unauthenticated.push(ResultEntry::new(ep.url.clone(), baseline.clone()));

            // Recorded for the reports only; never compared against the baseline.
            emitter.send(event(Phase::Auth)).await;
            let authed = self.prober.probe(ep.method, &ep.url, &auth_headers).await;
            if self.options.log_probes {
                info!("  [Auth]   -> {}", authed);
            }
            results.authenticated.push(ResultEntry::new(ep.url.clone(), authed));

            for set in header_sets {
                emitter.send(event(Phase::Bypass(set.name))).await;
                let outcome = self.prober.probe(ep.method, &ep.url, set.headers).await;
                if self.options.log_probes {
                    info!("  [Bypass {}] -> {}", set.name, outcome);
                }

                if outcome != baseline {
                    results.bypass_hits.push(format!(
                        "{} {} ({}) -> baseline={}, bypass={}",
                        ep.method, ep.url, set.name, baseline, outcome
                    ));
                }
                results
                    .bypass
                    .push(ResultEntry::new(format!("{} ({})", ep.url, set.name), outcome));
            }

            if is_idor_candidate(&ep.path) {
                if self.options.log_probes {
                    warn!("Potential IDOR candidate: {}", ep.url);
                }
                results.idor_candidates.push(ep.url.clone());
            }
        }

        if self.options.log_probes {
            log_findings(&results);
        }

        emitter.send(ProgressMessage::Summary(results.summary())).await;
        results
    }
}

/// Final report lines of a run. Interactive runs call this once the display is done.
pub fn log_findings(results: &Results) {
    info!("Finished probing all endpoints");
    if results.bypass_hits.is_empty() {
        info!("No auth bypasses detected");
    } else {
        for hit in &results.bypass_hits {
            error!("AUTH BYPASS FOUND - {}", hit);
        }
    }
}
