//! schema-migrate
//!
//! Rewrites declarative provider configuration and its paired state
//! snapshots from one schema version to another, one directory at a time.

use std::process::ExitCode;

use clap::Parser;
use migrate_core::diagnostics::Severity;
use tracing::{error, info, warn};

use schema_migrate::{cli::Cli, config::Settings, run, setup_tracing};


fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = setup_tracing(&cli.log_level, cli.log_format.as_deref()) {
        eprintln!("Failed to setup tracing: {e}");
        return ExitCode::FAILURE;
    }

    let mut settings = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(source_version) = cli.source_version.clone() {
        settings.source_version = source_version;
    }
    if let Some(target_version) = cli.target_version.clone() {
        settings.target_version = target_version;
    }

    let Some(dir) = cli.dir.as_deref() else {
        error!("no directory provided; pass --dir or set SCHEMA_MIGRATE_DIR");
        return ExitCode::FAILURE;
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        source = settings.source_version,
        target = settings.target_version,
        dir = %dir.display(),
        dry_run = cli.dry_run,
        "Starting schema-migrate"
    );

    let report = match run::run(dir, &settings, cli.dry_run) {
        Ok(report) => report,
        Err(e) => {
            error!("Migration run failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    for file in &report.files {
        for diagnostic in &file.diagnostics {
            match diagnostic.severity {
                Severity::Warning => warn!(file = %file.path.display(), "{diagnostic}"),
                Severity::Error => error!(file = %file.path.display(), "{diagnostic}"),
            }
        }
    }

    if report.has_errors() {
        error!("migration completed with errors");
        return ExitCode::FAILURE;
    }

    info!(files = report.files.len(), "migration complete");
    ExitCode::SUCCESS
}
