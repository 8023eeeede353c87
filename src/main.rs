//! x-radar - read-only X scouting CLI
//!
//! Prints exactly one JSON document to stdout. Exit codes: 0 on success, 2 on
//! invalid arguments, 1 on any runtime or internal failure. Logs go to stderr.

use std::any::Any;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};

use chrono::Utc;
use futures::FutureExt;
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use x_radar::api::{Fetcher, HttpTransport};
use x_radar::cache::{CacheStore, DiskCache, NoopCache};
use x_radar::cli::{self, Cli, Invocation};
use x_radar::config::Settings;
use x_radar::envelope::{Envelope, ErrorEnvelope};
use x_radar::ops::Radar;
use x_radar::RadarError;

/// Env var holding an EnvFilter directive for stderr logging
const LOG_ENV: &str = "X_RADAR_LOG";

/// Routes panics to the log; the JSON error envelope is printed by `main`.
fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        tracing::error!(panic = %panic_info, "internal failure");
    }));
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Writes `value` as pretty JSON to stdout
fn write_json<T: Serialize>(value: &T) -> Result<(), RadarError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| RadarError::Internal(format!("failed to serialize output: {e}")))?;
    let mut stdout = io::stdout().lock();
    // A closed stdout leaves nothing to report to
    let _ = writeln!(stdout, "{json}");
    Ok(())
}

/// Prints the error envelope and returns the exit code
fn report(err: &RadarError) -> i32 {
    if let Err(e) = write_json(&ErrorEnvelope::from(err)) {
        tracing::error!(error = %e, "could not print error envelope");
    }
    err.exit_code()
}

async fn run(cli: Cli) -> Result<Envelope, RadarError> {
    let settings = Settings::from_env()?;

    let cache: Box<dyn CacheStore> = match &settings.cache_dir {
        Some(dir) => Box::new(DiskCache::new(dir)),
        None => {
            tracing::warn!("no cache directory available, caching disabled");
            Box::new(NoopCache)
        }
    };
    let transport = HttpTransport::new(settings.timeout)
        .map_err(|e| RadarError::Internal(format!("failed to build HTTP client: {e}")))?;

    let radar = Radar::new(
        Fetcher::new(cache, transport, settings.bearer_token.clone()),
        settings.api_base.clone(),
    );

    cli.command.execute(&radar, Utc::now()).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = match cli::parse_invocation(std::env::args_os()) {
        Invocation::Run(cli) => cli,
        Invocation::Display(info) => {
            let _ = info.print();
            std::process::exit(0);
        }
        Invocation::Invalid(err) => std::process::exit(report(&err)),
    };

    init_logging(cli.verbose);
    setup_panic_hook();

    let result = match AssertUnwindSafe(run(cli)).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(RadarError::Internal(format!(
            "unexpected failure: {}",
            panic_message(payload)
        ))),
    };

    let exit_code = match result.and_then(|envelope| write_json(&envelope)) {
        Ok(()) => 0,
        Err(err) => {
            tracing::debug!(code = err.code(), error = %err, "operation failed");
            report(&err)
        }
    };

    std::process::exit(exit_code);
}
