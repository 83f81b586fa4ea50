//! The resource-transformer contract every migrator implements.

use std::fmt;

use hcl_edit::structure::Block;
use serde_json::Value;

use crate::context::TransformContext;

/// Error returned by a single migrator invocation.
///
/// Deliberately string-based and `Send + Sync` rather than an enum: the
/// engine never branches on *why* a migrator failed, only on *whether* it
/// did, so a richer error type would add ceremony without adding behavior.
#[derive(Debug, Clone)]
pub struct TransformError(pub String);

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for TransformError {}

impl TransformError {
    /// Build an error from anything displayable.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// The result of rewriting one configuration block.
#[derive(Debug, Default)]
pub struct ConfigTransformOutcome {
    /// Zero or more blocks to place in the output.
    ///
    /// When [`remove_original`](Self::remove_original) is `false`, this is
    /// typically empty: the migrator mutated the original block in place
    /// and the pipeline keeps it where it was. When `true`, these blocks
    /// (the rewritten resource plus any companion `moved` directive) are
    /// appended at file scope and the original is deleted.
    pub blocks: Vec<Block>,
    /// If `true`, the original block is deleted and `blocks` are appended
    /// at file scope instead of replacing it in place.
    pub remove_original: bool,
}

impl ConfigTransformOutcome {
    /// The common case: the block was mutated in place, nothing to append.
    #[must_use]
    pub fn in_place() -> Self {
        Self::default()
    }

    /// Replace the original with a fresh set of file-scope blocks.
    #[must_use]
    pub fn replace_with(blocks: Vec<Block>) -> Self {
        Self {
            blocks,
            remove_original: true,
        }
    }
}

/// The polymorphic unit of migration: one `(resource_type, source, target)`
/// schema diff, expressed over both the configuration tree and the JSON
/// state document.
pub trait ResourceTransformer: Send + Sync + fmt::Debug {
    /// Declares whether this instance applies to a given old type name.
    fn can_handle(&self, resource_type: &str) -> bool;

    /// The new type name (may equal the old one).
    fn target_type(&self) -> &str;

    /// The canonical rename pair; both empty if this migrator does not
    /// rename the resource type.
    fn rename(&self) -> (&str, &str) {
        ("", "")
    }

    /// String-level rewrite applied to the whole file before parsing.
    ///
    /// An escape hatch for constructs the configuration parser cannot
    /// represent. Must be a pure function of its input; the pipeline
    /// composes every registered migrator's preprocessor in registration
    /// order, so preprocessors must not overlap.
    fn preprocess(&self, text: &str) -> String {
        text.to_string()
    }

    /// Rewrite one declaration block.
    ///
    /// # Errors
    ///
    /// Returns an error if the block cannot be migrated; the pipeline
    /// records this as a diagnostic and retains the original block.
    fn transform_config(
        &self,
        ctx: &mut TransformContext,
        block: &mut Block,
    ) -> Result<ConfigTransformOutcome, TransformError>;

    /// Produce the transformed JSON for one state instance.
    ///
    /// The empty string is a sentinel meaning "delete this instance".
    ///
    /// # Errors
    ///
    /// Returns an error if the instance cannot be migrated; the pipeline
    /// records this as a diagnostic and retains the original instance.
    fn transform_state(
        &self,
        ctx: &mut TransformContext,
        instance: &Value,
        path: &str,
        name: &str,
    ) -> Result<String, TransformError>;

    /// If `true`, [`transform_state`](Self::transform_state) is a no-op and
    /// downstream provider logic performs the state migration; the
    /// migrator still rewrites configuration and may still emit a `moved`
    /// directive.
    fn uses_provider_state_upgrader(&self) -> bool {
        false
    }
}
