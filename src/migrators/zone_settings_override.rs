//! `cloudflare_zone_settings_override`: `status` became a required
//! configuration attribute but was previously computed-only. When a
//! declaration omits it, read the value out of the paired state document
//! and write it back into the block so the rewritten configuration still
//! applies cleanly, a conditional field preservation.

use hcl_edit::structure::Block;
use serde_json::Value;

use migrate_core::context::TransformContext;
use crate::hcl;
use migrate_core::transformer::{ConfigTransformOutcome, ResourceTransformer, TransformError};

#[derive(Debug, Default)]
pub struct ZoneSettingsOverrideMigrator;

fn paired_status(ctx: &TransformContext, name: &str) -> Option<String> {
    let state: Value = serde_json::from_str(ctx.state_json.as_deref()?).ok()?;
    state
        .get("resources")?
        .as_array()?
        .iter()
        .find(|r| {
            r.get("type").and_then(Value::as_str) == Some("cloudflare_zone_settings_override")
                && r.get("name").and_then(Value::as_str) == Some(name)
        })
        .and_then(|r| r.get("instances")?.as_array()?.first())
        .and_then(|instance| instance.get("attributes")?.get("status"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

impl ResourceTransformer for ZoneSettingsOverrideMigrator {
    fn can_handle(&self, resource_type: &str) -> bool {
        resource_type == "cloudflare_zone_settings_override"
    }

    fn target_type(&self) -> &str {
        "cloudflare_zone_settings_override"
    }

    fn transform_config(
        &self,
        ctx: &mut TransformContext,
        block: &mut Block,
    ) -> Result<ConfigTransformOutcome, TransformError> {
        if hcl::get_attribute(&block.body, "status").is_none() {
            let name = hcl::get_resource_name(block).unwrap_or_default();
            if let Some(status) = paired_status(ctx, &name) {
                hcl::ensure_attribute(&mut block.body, "status", &format!("{status:?}"));
            }
        }
        Ok(ConfigTransformOutcome::in_place())
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
}
