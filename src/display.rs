// Terminal progress display for interactive runs
// Consumes the progress stream until the terminal Summary arrives

use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use crate::auth::AuthCredential;
use crate::error::{Error, Result};
use crate::models::{Endpoint, Results, Summary};
use crate::probe::Prober;
use crate::progress::{progress_channel, ProgressMessage, ProgressReceiver};
use crate::runner::{log_findings, ProbeRunner};

/// Run the probes on a worker task while this task draws the progress bar.
/// Findings are logged only after the bar is finished.
pub async fn run_interactive<P>(
    runner: ProbeRunner<P>,
    endpoints: Vec<Endpoint>,
    credential: Option<AuthCredential>,
    capacity: usize,
) -> Result<Results>
where
    P: Prober + Send + Sync + 'static,
{
    let (tx, rx) = progress_channel(capacity);
    let worker = tokio::spawn(async move {
        runner.run(&endpoints, credential.as_ref(), Some(&tx)).await
    });

    if render_progress(rx).await.is_none() {
        warn!("Progress display ended early");
    }
    let results = worker
        .await
        .map_err(|e| Error::Report(format!("probe worker failed: {}", e)))?;
    log_findings(&results);
    Ok(results)
}

/// Render progress until the summary (or a closed stream) and return the
/// summary if one was received.
pub async fn render_progress(mut updates: ProgressReceiver) -> Option<Summary> {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} Testing {pos}/{len} [{bar:40.cyan/blue}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    pb.set_message("Starting...");

    while let Some(msg) = updates.recv().await {
        match msg {
            ProgressMessage::Progress(event) => {
                pb.set_length(event.total as u64);
                pb.set_position(event.current_index as u64);
                pb.set_message(format!("{} {} [{}]", event.method, event.url, event.phase));
            }
            ProgressMessage::Summary(summary) => {
                pb.finish_with_message(format!(
                    "Done: {} bypass hits, {} IDOR candidates",
                    summary.bypass_hit_count, summary.idor_candidate_count
                ));
                return Some(summary);
            }
        }
    }

    pb.abandon_with_message("Probe stream closed before completion");
    None
}
