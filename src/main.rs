// Main CLI entry point for authprobe
// Uses clap for argument parsing

use std::path::PathBuf;
use std::time::Duration;

use clap::{Arg, ArgMatches, Command};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use authprobe::auth::AuthCredential;
use authprobe::config::ScanConfig;
use authprobe::display::run_interactive;
use authprobe::engine::HttpEngine;
use authprobe::error::{Error, Result};
use authprobe::parsers::OpenApiParser;
use authprobe::reporting::write_reports;
use authprobe::runner::{ProbeRunner, RunOptions};

fn cli() -> Command {
    Command::new("authprobe")
        .version(clap::crate_version!())
        .about("Probes every operation of an OpenAPI spec unauthenticated, authenticated and with spoofed headers")
        .after_help("EXAMPLES:\n  authprobe --spec openapi.json --token eyJhbGciOi...\n  authprobe -s api.yaml -b https://staging.example.com -c 'session=abc' --no-tui -o out/")
        .arg(Arg::new("spec")
            .short('s')
            .long("spec")
            .required(true)
            .num_args(1)
            .help("Path to OpenAPI spec (JSON or YAML)"))
        .arg(Arg::new("base_url")
            .short('b')
            .long("base-url")
            .num_args(1)
            .help("Base URL of the API (optional, overrides spec)"))
        .arg(Arg::new("token")
            .short('t')
            .long("token")
            .num_args(1)
            .help("Valid JWT token for authenticated probes"))
        .arg(Arg::new("cookie")
            .short('c')
            .long("cookie")
            .num_args(1)
            .help("Valid session cookie for authenticated probes"))
        .arg(Arg::new("outdir")
            .short('o')
            .long("outdir")
            .num_args(1)
            .default_value("reports")
            .help("Directory to write reports"))
        .arg(Arg::new("timeout")
            .long("timeout")
            .num_args(1)
            .default_value("5")
            .value_parser(clap::value_parser!(u64))
            .help("Per-request timeout in seconds"))
        .arg(Arg::new("no_tui")
            .long("no-tui")
            .action(clap::ArgAction::SetTrue)
            .help("Disable the interactive progress display (enabled by default)"))
        .arg(Arg::new("quiet")
            .short('q')
            .long("quiet")
            .action(clap::ArgAction::SetTrue)
            .help("Only log warnings and errors"))
        .arg(Arg::new("debug")
            .long("debug")
            .action(clap::ArgAction::SetTrue)
            .conflicts_with("quiet")
            .help("Log transport errors and other debug detail"))
}

fn init_logging(matches: &ArgMatches) {
    let level = if matches.get_flag("debug") {
        "debug"
    } else if matches.get_flag("quiet") {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("authprobe={},reqwest=warn,hyper=warn", level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn config_from_matches(matches: &ArgMatches) -> ScanConfig {
    let credential = AuthCredential::from_flags(
        matches.get_one::<String>("token").map(String::as_str),
        matches.get_one::<String>("cookie").map(String::as_str),
    );
    let defaults = ScanConfig::default();

    ScanConfig {
        spec_path: matches.get_one::<String>("spec").map(PathBuf::from).unwrap_or_default(),
        base_url: matches.get_one::<String>("base_url").cloned(),
        credential,
        outdir: matches
            .get_one::<String>("outdir")
            .map(PathBuf::from)
            .unwrap_or(defaults.outdir),
        interactive: !matches.get_flag("no_tui"),
        timeout: matches
            .get_one::<u64>("timeout")
            .map(|s| Duration::from_secs(*s))
            .unwrap_or(defaults.timeout),
        progress_capacity: defaults.progress_capacity,
    }
}

async fn run(config: ScanConfig) -> Result<()> {
    let parsed = OpenApiParser.parse(&config.spec_path, config.base_url.as_deref())?;
    if parsed.endpoints.is_empty() {
        return Err(Error::Spec("no endpoints found in spec".to_string()));
    }
    info!("Using base URL: {}", parsed.base_url);

    if let Some(subject) = config.credential.as_ref().and_then(AuthCredential::subject) {
        info!("Token subject: {}", subject);
    }

    let engine = HttpEngine::new(config.timeout)?;

    let results = if config.interactive {
        let runner = ProbeRunner::new(engine, RunOptions { log_probes: false });
        run_interactive(
            runner,
            parsed.endpoints.clone(),
            config.credential.clone(),
            config.progress_capacity,
        )
        .await?
    } else {
        let runner = ProbeRunner::new(engine, RunOptions::default());
        runner
            .run(&parsed.endpoints, config.credential.as_ref(), None)
            .await
    };

    write_reports(&results, &parsed.base_url, &config.outdir)?;
    Ok(())
}

#[tokio::main]
async fn main() {
    let matches = cli().get_matches();
    init_logging(&matches);

    let config = config_from_matches(&matches);
    if let Err(e) = config.validate() {
        eprintln!("{}", e);
        std::process::exit(2);
    }

    if let Err(e) = run(config).await {
        error!("{}", e);
        std::process::exit(1);
    }
}
