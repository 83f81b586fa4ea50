//! Orchestrates the configuration and state pipelines across every
//! discovered file pair.

use std::fs;
use std::path::{Path, PathBuf};

use migrate_core::context::TransformContext;
use migrate_core::diagnostics::{Diagnostic, Severity};
use migrate_core::registry::Registry;
use migrate_core::version::VersionId;

use crate::config::Settings;
use crate::discovery::{self, FilePair};
use crate::migrators;
use crate::pipeline::{ConfigPipeline, StatePipeline};
use crate::{Error, Result};

/// One file's outcome.
pub struct FileReport {
    /// Path this report is for.
    pub path: PathBuf,
    /// Diagnostics raised while transforming this file.
    pub diagnostics: Vec<Diagnostic>,
}

/// Result of a full run across a directory.
pub struct RunReport {
    /// Per-file reports: each configuration file immediately followed by
    /// its paired state file, if one was found.
    pub files: Vec<FileReport>,
}

impl RunReport {
    /// `true` if any file raised an error-severity diagnostic.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.files
            .iter()
            .any(|f| f.diagnostics.iter().any(|d| d.severity == Severity::Error))
    }
}

/// Discover every file pair under `dir` and run both pipelines over them.
/// With `dry_run`, nothing is written back to disk; the report is the only
/// observable effect.
///
/// # Errors
///
/// Returns an error if `dir` cannot be walked, a file cannot be read, or
/// (when `dry_run` is `false`) a transformed file cannot be written back.
pub fn run(dir: &Path, settings: &Settings, dry_run: bool) -> Result<RunReport> {
    let source = VersionId::from(settings.source_version.as_str());
    let target = VersionId::from(settings.target_version.as_str());

    let mut registry = Registry::new();
    migrators::register_all(&mut registry, source.clone(), target.clone(), |resource_type| {
        settings.migrator_enabled(resource_type)
    });

    let pairs = discovery::discover(dir)?;
    let mut files = Vec::with_capacity(pairs.len() * 2);

    for pair in pairs {
        files.push(run_config_file(&registry, &pair, &source, &target, dry_run)?);
        if let Some(state_path) = &pair.state {
            files.push(run_state_file(&registry, state_path, &source, &target, dry_run)?);
        }
    }

    Ok(RunReport { files })
}

fn run_config_file(
    registry: &Registry,
    pair: &FilePair,
    source: &VersionId,
    target: &VersionId,
    dry_run: bool,
) -> Result<FileReport> {
    let raw = fs::read_to_string(&pair.config)?;
    let mut ctx = TransformContext::new(pair.config.display().to_string(), raw, source.clone(), target.clone());
    if let Some(state_path) = &pair.state {
        ctx = ctx.with_state_json(fs::read_to_string(state_path)?);
    }

    ConfigPipeline::new().run(registry, &mut ctx).map_err(|e| Error::Parse {
        filename: pair.config.display().to_string(),
        detail: e.to_string(),
    })?;

    if !dry_run {
        if let Some(output) = &ctx.output {
            fs::write(&pair.config, output)?;
        }
    }

    Ok(FileReport {
        path: pair.config.clone(),
        diagnostics: ctx.diagnostics.into_iter().collect(),
    })
}

fn run_state_file(
    registry: &Registry,
    state_path: &Path,
    source: &VersionId,
    target: &VersionId,
    dry_run: bool,
) -> Result<FileReport> {
    let state_text = fs::read_to_string(state_path)?;
    let mut ctx =
        TransformContext::new(state_path.display().to_string(), "", source.clone(), target.clone()).with_state_json(state_text);

    StatePipeline::new()
        .run(registry, &mut ctx)
        .map_err(|e| Error::Internal(format!("{}: {e}", state_path.display())))?;

    if !dry_run {
        if let Some(output) = &ctx.output {
            fs::write(state_path, output)?;
        }
    }

    Ok(FileReport {
        path: state_path.to_path_buf(),
        diagnostics: ctx.diagnostics.into_iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// End-to-end smoke test: a config plus its paired state
    /// file both get rewritten and the run reports no errors.
    #[test]
    fn rewrites_a_config_and_its_paired_state_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join("main.tf"),
            "resource \"cloudflare_load_balancer_pool\" \"p\" {\n  default_pool_ids = [\"a\"]\n}\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("terraform.tfstate"),
            r#"{"resources":[{"mode":"managed","type":"cloudflare_load_balancer_pool","name":"p","instances":[{"attributes":{"default_pool_ids":["a"]}}]}]}"#,
        )
        .unwrap();

        let settings = Settings::default();
        let report = run(dir.path(), &settings, false).expect("run succeeds");
        assert_eq!(report.files.len(), 2);
        assert!(!report.has_errors());

        let rewritten_config = fs::read_to_string(dir.path().join("main.tf")).unwrap();
        assert!(rewritten_config.contains("default_pools"));

        let rewritten_state = fs::read_to_string(dir.path().join("terraform.tfstate")).unwrap();
        assert!(rewritten_state.contains("default_pools"));
    }

    #[test]
    fn dry_run_leaves_files_untouched() {
        let dir = tempfile::tempdir().expect("tempdir");
        let original = "resource \"cloudflare_load_balancer_pool\" \"p\" {\n  default_pool_ids = [\"a\"]\n}\n";
        fs::write(dir.path().join("main.tf"), original).unwrap();

        let settings = Settings::default();
        run(dir.path(), &settings, true).expect("run succeeds");

        let untouched = fs::read_to_string(dir.path().join("main.tf")).unwrap();
        assert_eq!(untouched, original);
    }

    /// An unparseable configuration file surfaces as `Error::Parse`, naming
    /// the offending file, rather than the generic internal-error variant.
    #[test]
    fn unparseable_config_surfaces_as_a_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("main.tf"), "resource \"cloudflare_record\" \"a\" {\n").unwrap();

        let settings = Settings::default();
        let err = run(dir.path(), &settings, false).expect_err("malformed HCL fails the run");
        assert!(matches!(err, Error::Parse { .. }));
    }
}
