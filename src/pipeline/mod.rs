//! Chain-of-responsibility pipelines that drive a [`TransformContext`]
//! through the configuration and state migration stages.
//!
//! Each [`Handler`] runs sequentially against one file's context. A
//! terminal error stops the file but the diagnostics accumulated so far
//! stay on the context — callers still get a report even for a file that
//! failed to parse.

mod config_transform;
mod format;
mod parse;
mod preprocess;
mod state_format;
mod state_transform;

pub use config_transform::ConfigTransformHandler;
pub use format::FormatHandler;
pub use parse::ParseHandler;
pub use preprocess::PreprocessHandler;
pub use state_format::StateFormatHandler;
pub use state_transform::StateTransformHandler;

use std::fmt;

use migrate_core::context::TransformContext;
use migrate_core::registry::Registry;

/// Terminal failure of a single pipeline handler.
///
/// Unlike a per-resource [`migrate_core::transformer::TransformError`], this stops
/// the whole file: a parse failure or an internal invariant violation
/// (missing tree, missing state document) leaves nothing sensible for
/// later handlers to act on.
#[derive(Debug, Clone)]
pub struct PipelineError(pub String);

impl PipelineError {
    /// Build an error from anything displayable.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for PipelineError {}

/// One stage of a pipeline. Forwarding to the next handler on success is
/// the caller's job (the [`ConfigPipeline`]/[`StatePipeline`] runners);
/// a handler only ever reports whether *it* succeeded.
pub trait Handler: Send + Sync {
    /// Run this stage against `ctx`, mutating it in place.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError`] that is terminal for the file; the
    /// caller stops running further handlers but keeps the diagnostics
    /// already recorded on `ctx`.
    fn handle(&self, registry: &Registry, ctx: &mut TransformContext) -> Result<(), PipelineError>;
}

/// `Preprocess -> Parse -> ConfigTransform -> Format`.
pub struct ConfigPipeline {
    handlers: Vec<Box<dyn Handler>>,
}

impl Default for ConfigPipeline {
    fn default() -> Self {
        Self {
            handlers: vec![
                Box::new(PreprocessHandler),
                Box::new(ParseHandler),
                Box::new(ConfigTransformHandler),
                Box::new(FormatHandler),
            ],
        }
    }
}

impl ConfigPipeline {
    /// The standard configuration pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every handler in order against `ctx`, stopping at the first
    /// terminal error. `ctx.output` holds the serialized result on success.
    ///
    /// # Errors
    ///
    /// Returns the first handler's [`PipelineError`], if any.
    pub fn run(&self, registry: &Registry, ctx: &mut TransformContext) -> Result<(), PipelineError> {
        for handler in &self.handlers {
            handler.handle(registry, ctx)?;
        }
        Ok(())
    }
}

/// `StateTransform -> StateFormat`.
pub struct StatePipeline {
    handlers: Vec<Box<dyn Handler>>,
}

impl Default for StatePipeline {
    fn default() -> Self {
        Self {
            handlers: vec![Box::new(StateTransformHandler), Box::new(StateFormatHandler)],
        }
    }
}

impl StatePipeline {
    /// The standard state pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every handler in order against `ctx`.
    ///
    /// # Errors
    ///
    /// Returns the first handler's [`PipelineError`], if any.
    pub fn run(&self, registry: &Registry, ctx: &mut TransformContext) -> Result<(), PipelineError> {
        for handler in &self.handlers {
            handler.handle(registry, ctx)?;
        }
        Ok(())
    }
}
