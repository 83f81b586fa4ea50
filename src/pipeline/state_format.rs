//! `StateFormat` handler: serializes state back out as pretty JSON.

use super::{Handler, PipelineError};
use migrate_core::context::TransformContext;
use migrate_core::registry::Registry;

/// Serializes `ctx.state` into `ctx.output` as pretty-printed JSON.
pub struct StateFormatHandler;

impl Handler for StateFormatHandler {
    fn handle(&self, _registry: &Registry, ctx: &mut TransformContext) -> Result<(), PipelineError> {
        let state = ctx
            .state
            .as_ref()
            .ok_or_else(|| PipelineError::new("state format handler ran with no state document"))?;
        let rendered = serde_json::to_string_pretty(state)
            .map_err(|e| PipelineError::new(format!("failed to serialize state: {e}")))?;
        ctx.output = Some(rendered);
        Ok(())
    }
}
