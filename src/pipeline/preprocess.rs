//! `Preprocess` handler.

use super::{Handler, PipelineError};
use migrate_core::context::TransformContext;
use migrate_core::registry::Registry;

/// Applies every registered migrator's [`preprocess`](crate::ResourceTransformer::preprocess)
/// to the file text, in registration order, before parsing.
///
/// Each preprocessor must be a pure string transform; the contract is that
/// they do not overlap, so composing them sequentially is commutative in
/// practice even though this handler does not (and cannot) verify that.
pub struct PreprocessHandler;

impl Handler for PreprocessHandler {
    fn handle(&self, registry: &Registry, ctx: &mut TransformContext) -> Result<(), PipelineError> {
        let mut text = std::mem::take(&mut ctx.raw);
        for transformer in registry.preprocessors() {
            text = transformer.preprocess(&text);
        }
        ctx.raw = text;
        Ok(())
    }
}
