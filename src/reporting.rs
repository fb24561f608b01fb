// Reporting and output for authprobe
// Plain-text lists, one `<label> [<outcome>]` line per probe, plus a JSON summary

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;
use tracing::info;

use crate::bypass::bypass_header_sets;
use crate::error::{Error, Result};
use crate::models::{ResultEntry, Results, Summary};

pub const UNAUTH_REPORT: &str = "unauth_report.txt";
pub const AUTH_REPORT: &str = "auth_report.txt";
pub const BYPASS_REPORT: &str = "bypass_report.txt";
pub const IDOR_REPORT: &str = "idor_candidates.txt";
pub const HITS_REPORT: &str = "bypass_hits.txt";
pub const SUMMARY_REPORT: &str = "summary.json";

#[derive(Debug, Serialize)]
struct SummaryReport<'a> {
    generated_at: String,
    base_url: &'a str,
    endpoints: usize,
    header_sets: usize,
    #[serde(flatten)]
    summary: Summary,
    bypass_hits: &'a [String],
}

/// Write every report into `outdir` (created if missing) and return the files written.
pub fn write_reports(results: &Results, base_url: &str, outdir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(outdir)
        .map_err(|e| Error::Report(format!("cannot create {}: {}", outdir.display(), e)))?;

    let mut written = Vec::new();
    for (name, entries) in [
        (UNAUTH_REPORT, &results.unauthenticated),
        (AUTH_REPORT, &results.authenticated),
        (BYPASS_REPORT, &results.bypass),
    ] {
        let path = outdir.join(name);
        write_entries(&path, entries)?;
        written.push(path);
    }

    for (name, lines) in [
        (IDOR_REPORT, &results.idor_candidates),
        (HITS_REPORT, &results.bypass_hits),
    ] {
        let path = outdir.join(name);
        write_lines(&path, lines.iter())?;
        written.push(path);
    }

    let summary = SummaryReport {
        generated_at: Local::now().to_rfc3339(),
        base_url,
        endpoints: results.unauthenticated.len(),
        header_sets: bypass_header_sets().len(),
        summary: results.summary(),
        bypass_hits: &results.bypass_hits,
    };
    let path = outdir.join(SUMMARY_REPORT);
    fs::write(&path, serde_json::to_string_pretty(&summary)?)?;
    written.push(path);

    info!("Reports written to {}", outdir.display());
    info!("{} endpoints to be tested for IDOR", results.idor_candidates.len());
    Ok(written)
}

fn write_entries(path: &Path, entries: &[ResultEntry]) -> Result<()> {
    write_lines(path, entries.iter())
}

fn write_lines<T: std::fmt::Display>(path: &Path, lines: impl Iterator<Item = T>) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    for line in lines {
        writeln!(file, "{}", line)?;
    }
    file.flush()?;
    Ok(())
}
