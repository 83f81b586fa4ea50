//! `Parse` handler.

use super::{Handler, PipelineError};
use migrate_core::context::TransformContext;
use crate::hcl;
use migrate_core::registry::Registry;

/// Parses `ctx.raw` into a writable tree. A parse failure is terminal for
/// the file: a diagnostic is recorded and the handler returns an error so
/// the pipeline stops before `ConfigTransform` ever sees an absent tree.
pub struct ParseHandler;

impl Handler for ParseHandler {
    fn handle(&self, _registry: &Registry, ctx: &mut TransformContext) -> Result<(), PipelineError> {
        match hcl::parse_body(&ctx.raw) {
            Ok(body) => {
                ctx.tree = Some(body);
                Ok(())
            }
            Err(detail) => {
                ctx.diagnostics.push_error("failed to parse configuration", format!("{}: {detail}", ctx.filename));
                Err(PipelineError::new(detail))
            }
        }
    }
}
