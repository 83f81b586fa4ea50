//! `Format` handler (normalized two-space indentation
//! and comment preservation are properties of [`hcl_edit`]'s writer, not of
//! this handler).

use super::{Handler, PipelineError};
use migrate_core::context::TransformContext;
use migrate_core::registry::Registry;

/// Serializes `ctx.tree` into `ctx.output`. The only handler downstream of
/// `ConfigTransform` — formatting imposes normalized whitespace, but every
/// comment and untouched block survives because `hcl_edit` threads them
/// through its "decor" rather than this handler re-deriving them.
pub struct FormatHandler;

impl Handler for FormatHandler {
    fn handle(&self, _registry: &Registry, ctx: &mut TransformContext) -> Result<(), PipelineError> {
        let tree = ctx
            .tree
            .as_ref()
            .ok_or_else(|| PipelineError::new("format handler ran with no parsed tree"))?;
        ctx.output = Some(tree.to_string());
        Ok(())
    }
}
