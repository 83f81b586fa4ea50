//! Command-line interface

use std::path::PathBuf;

use clap::Parser;

/// Migrate Terraform-style configuration and state files between provider
/// schema versions
#[derive(Parser, Debug)]
#[command(name = "schema-migrate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short, long, env = "SCHEMA_MIGRATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory containing `.tf`/`.tf.json` configuration and state files
    #[arg(short, long, env = "SCHEMA_MIGRATE_DIR")]
    pub dir: Option<PathBuf>,

    /// Source schema version
    #[arg(long, env = "SCHEMA_MIGRATE_SOURCE_VERSION")]
    pub source_version: Option<String>,

    /// Target schema version
    #[arg(long, env = "SCHEMA_MIGRATE_TARGET_VERSION")]
    pub target_version: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "SCHEMA_MIGRATE_LOG_LEVEL")]
    pub log_level: String,

    /// Log format (text, json)
    #[arg(long, env = "SCHEMA_MIGRATE_LOG_FORMAT")]
    pub log_format: Option<String>,

    /// Report what would change without writing files
    #[arg(long)]
    pub dry_run: bool,
}
