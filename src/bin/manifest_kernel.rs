//! Manifest Kernel Binary
//!
//! Resolves a workspace plan and writes package and workspace manifests.
//!
//! ## Configuration
//!
//! Arguments:
//! - `[PLAN]`: path to a JSON workspace plan (default: the reference plan)
//!
//! Environment variables:
//! - `MANIFEST_KERNEL_CONFIG`: path to a TOML config file (default: built-in defaults)
//! - `MANIFEST_KERNEL_OUT`: output directory (default: generated)
//! - `MANIFEST_KERNEL_FALLBACK`, `MANIFEST_KERNEL_BASE_VERSION`: config overrides
//! - `RUST_LOG`: Log level filter (default: manifest_kernel=info)
//! - `LOG_FORMAT`: "json" for structured logs, "pretty" for development (default: json)
//!
//! ## Usage
//!
//! ```bash
//! LOG_FORMAT=pretty cargo run --bin manifest_kernel -- plan.json
//! ```
//!
//! Exits non-zero when any package failed. Healthy packages are still
//! written, after the whole pass has rendered in memory. A failed package
//! stays in the workspace member list without a `Cargo.toml`, so the
//! written workspace does not load in cargo until the failure is fixed;
//! its files from an earlier run in the same output directory are removed.
//! Other leftovers (packages renamed or dropped from the plan) are not
//! tracked, so point `MANIFEST_KERNEL_OUT` at a fresh directory when the
//! package table changes.

use std::path::PathBuf;
use std::process::ExitCode;

use tracing::{debug, error, info, warn};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use manifest_kernel::{generate, KernelConfig, WorkspacePlan};

/// Initialize the tracing subscriber with JSON or pretty format
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "manifest_kernel=info".into());

    if log_format == "pretty" {
        // Pretty format for local development
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .flatten_event(true)
            )
            .init();
    }
}

fn run() -> Result<bool, Box<dyn std::error::Error>> {
    let mut config = match std::env::var("MANIFEST_KERNEL_CONFIG") {
        Ok(path) => {
            info!(path = %path, "loading config");
            KernelConfig::load(&path)?
        }
        Err(_) => KernelConfig::default(),
    };
    config.apply_env_overrides()?;

    let plan = match std::env::args().nth(1) {
        Some(path) => {
            info!(path = %path, "loading plan");
            WorkspacePlan::load(&path)?
        }
        None => {
            info!("no plan given, using the reference plan");
            WorkspacePlan::reference()
        }
    };

    let out_dir = PathBuf::from(
        std::env::var("MANIFEST_KERNEL_OUT").unwrap_or_else(|_| "generated".to_string()),
    );

    let generation = generate(&plan, &config)?;

    for failure in &generation.report.failures {
        warn!(package = %failure.package, error = %failure.error, "package skipped");
    }

    generation.artifacts.write_to(&out_dir)?;
    for (path, digest) in generation.artifacts.digests() {
        debug!(path = path, digest = digest, "artifact written");
    }

    info!(
        out_dir = %out_dir.display(),
        artifacts = generation.artifacts.len(),
        report_hash = %generation.report.report_hash,
        "manifests written"
    );

    Ok(generation.report.is_success())
}

fn main() -> ExitCode {
    init_tracing();

    let version = env!("CARGO_PKG_VERSION");
    info!(version = version, "Starting Manifest Kernel");

    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            error!(error = %e, "generation failed");
            ExitCode::FAILURE
        }
    }
}
