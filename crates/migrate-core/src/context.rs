//! Per-file mutable state threaded through the pipeline.

use std::collections::HashMap;

use hcl_edit::structure::Body;
use serde_json::Value;

use crate::diagnostics::Diagnostics;
use crate::version::VersionId;

/// Free-form counters and dynamic hints accumulated during a run.
///
/// Kept as a JSON value bag rather than a fixed struct so individual
/// migrators can stash whatever bookkeeping they need without changing the
/// shared context type.
pub type Metadata = HashMap<String, Value>;

/// Per-file mutable state flowing through the configuration and state
/// pipelines.
///
/// One context is created per file and discarded after serialization; trees
/// and JSON documents it owns never outlive it.
#[derive(Debug)]
pub struct TransformContext {
    /// Name of the file being processed, for diagnostics.
    pub filename: String,
    /// Raw input text (pre-preprocess).
    pub raw: String,
    /// Parsed configuration tree, set by the `Parse` handler.
    pub tree: Option<Body>,
    /// Parsed state document, when a state file accompanies this context.
    pub state: Option<Value>,
    /// The paired state document as text, so config transformers can read
    /// values (e.g. a computed-only field that became optional) without the
    /// config pipeline owning a parsed copy of it.
    pub state_json: Option<String>,
    /// Schema version this file is migrating from.
    pub source_version: VersionId,
    /// Schema version this file is migrating to.
    pub target_version: VersionId,
    /// Append-only diagnostics collected while processing this file.
    pub diagnostics: Diagnostics,
    /// Counters and dynamic rename hints.
    pub metadata: Metadata,
    /// Dynamic retype decisions made during instance-level inspection,
    /// keyed `"{old_type}.{name}"`, applied to the resource's `type` field
    /// after all of its instances have been transformed.
    pub state_type_renames: HashMap<String, String>,
    /// Serialized output produced by the pipeline's final `Format`/
    /// `StateFormat` handler.
    pub output: Option<String>,
}

impl TransformContext {
    /// Start a new context for one file.
    pub fn new(
        filename: impl Into<String>,
        raw: impl Into<String>,
        source_version: VersionId,
        target_version: VersionId,
    ) -> Self {
        Self {
            filename: filename.into(),
            raw: raw.into(),
            tree: None,
            state: None,
            state_json: None,
            source_version,
            target_version,
            diagnostics: Diagnostics::new(),
            metadata: Metadata::new(),
            state_type_renames: HashMap::new(),
            output: None,
        }
    }

    /// Attach the paired state document, both parsed and as text.
    #[must_use]
    pub fn with_state_json(mut self, state_json: impl Into<String>) -> Self {
        let text = state_json.into();
        self.state = serde_json::from_str(&text).ok();
        self.state_json = Some(text);
        self
    }

    /// Increment a named counter in the metadata bag, starting at zero.
    pub fn increment_counter(&mut self, name: &str) {
        let count = self
            .metadata
            .get(name)
            .and_then(Value::as_u64)
            .unwrap_or(0);
        self.metadata
            .insert(name.to_string(), Value::from(count + 1));
    }

    /// Record a dynamic retype decision for a managed resource instance.
    pub fn record_type_rename(&mut self, resource_type: &str, name: &str, new_type: impl Into<String>) {
        self.state_type_renames
            .insert(format!("{resource_type}.{name}"), new_type.into());
    }
}
