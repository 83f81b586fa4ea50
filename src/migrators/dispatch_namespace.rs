//! `cloudflare_workers_for_platforms_dispatch_namespace` ->
//! `cloudflare_dispatch_namespace`: a resource-type rename with a `moved`
//! directive, paired with the provider's own state upgrader rather than a
//! configuration-driven state rewrite. The new provider schema version
//! ships an `UpgradeState` implementation for this resource; duplicating
//! that logic here would drift the moment the provider changes it, so
//! [`uses_provider_state_upgrader`] makes `transform_state` a pure
//! pass-through and leaves attribute restructuring to the provider. The
//! resource still runs through the ordinary per-instance state loop, so it
//! still gets its type renamed and its `schema_version` baseline bumped.

use hcl_edit::structure::Block;
use serde_json::Value;

use migrate_core::context::TransformContext;
use crate::hcl;
use migrate_core::transformer::{ConfigTransformOutcome, ResourceTransformer, TransformError};

const OLD_TYPE: &str = "cloudflare_workers_for_platforms_dispatch_namespace";
const NEW_TYPE: &str = "cloudflare_dispatch_namespace";

#[derive(Debug, Default)]
pub struct DispatchNamespaceMigrator;

impl ResourceTransformer for DispatchNamespaceMigrator {
    fn can_handle(&self, resource_type: &str) -> bool {
        resource_type == OLD_TYPE
    }

    fn target_type(&self) -> &str {
        NEW_TYPE
    }

    fn rename(&self) -> (&str, &str) {
        (OLD_TYPE, NEW_TYPE)
    }

    fn transform_config(
        &self,
        _ctx: &mut TransformContext,
        block: &mut Block,
    ) -> Result<ConfigTransformOutcome, TransformError> {
        let name = hcl::get_resource_name(block).unwrap_or_default();
        hcl::rename_resource_type(block, OLD_TYPE, NEW_TYPE);
        let moved = hcl::create_moved_block(&format!("{OLD_TYPE}.{name}"), &format!("{NEW_TYPE}.{name}"));
        Ok(ConfigTransformOutcome::replace_with(vec![block.clone(), moved]))
    }

    fn transform_state(
        &self,
        _ctx: &mut TransformContext,
        instance: &Value,
        _path: &str,
        _name: &str,
    ) -> Result<String, TransformError> {
        Ok(instance.to_string())
    }

    fn uses_provider_state_upgrader(&self) -> bool {
        true
    }
}
