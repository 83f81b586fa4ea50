//! `data.cloudflare_zone`: no config changes at all, a schema-version bump
//! is the only state change.

use hcl_edit::structure::Block;
use serde_json::Value;

use migrate_core::context::TransformContext;
use migrate_core::transformer::{ConfigTransformOutcome, ResourceTransformer, TransformError};

#[derive(Debug, Default)]
pub struct ZoneDatasourceMigrator;

impl ResourceTransformer for ZoneDatasourceMigrator {
    fn can_handle(&self, resource_type: &str) -> bool {
        resource_type == "cloudflare_zone"
    }

    fn target_type(&self) -> &str {
        "cloudflare_zone"
    }

    fn transform_config(
        &self,
        _ctx: &mut TransformContext,
        _block: &mut Block,
    ) -> Result<ConfigTransformOutcome, TransformError> {
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
