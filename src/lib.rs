//! schema-migrate
//!
//! Rewrites Terraform-style declarative configuration and its paired state
//! snapshots from one provider schema version to another: renamed
//! resources get `moved` directives, restructured attributes get folded or
//! hoisted, and every managed instance's state is carried forward with its
//! unknown fields intact.
//!
//! The extensional contract — the registry, the transformer trait, and the
//! per-file transform context — lives in [`migrate_core`], kept deliberately
//! thin. Everything that turns that contract into a working migration tool
//! — the HCL and JSON-state primitives, the concrete migrators, the two
//! pipelines that drive a file through them, CLI parsing, configuration
//! loading, and file discovery — lives here.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod hcl;
pub mod json_state;
pub mod migrators;
pub mod pipeline;
pub mod run;

pub use error::{Error, Result};

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Set up the global tracing subscriber from a log level and optional
/// format (`"json"` for structured output, anything else for text).
///
/// # Errors
///
/// This never actually fails today — it mirrors the `Result`-returning
/// shape of the rest of the setup path so a future fallible subscriber
/// backend doesn't need a signature change.
pub fn setup_tracing(level: &str, format: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        Some("json") => {
            subscriber.with(fmt::layer().json()).init();
        }
        _ => {
            subscriber.with(fmt::layer()).init();
        }
    }

    Ok(())
}
