//! `cloudflare_zone_dnssec`: an integer field promoted to float64, a status
//! enum normalized to the new vocabulary, and a modification timestamp
//! converted from RFC-1123 to RFC-3339. Configuration is unaffected; both
//! languages express these fields as opaque strings/numbers the provider
//! validates, not HCL types that differ between schema versions.

use hcl_edit::structure::Block;
use serde_json::Value;

use migrate_core::context::TransformContext;
use crate::json_state;
use migrate_core::transformer::{ConfigTransformOutcome, ResourceTransformer, TransformError};

#[derive(Debug, Default)]
pub struct ZoneDnssecMigrator;

fn normalize_status(raw: &str) -> Option<&'static str> {
    match raw {
        "pending" => Some("active"),
        "pending-disabled" => Some("disabled"),
        _ => None,
    }
}

impl ResourceTransformer for ZoneDnssecMigrator {
    fn can_handle(&self, resource_type: &str) -> bool {
        resource_type == "cloudflare_zone_dnssec"
    }

    fn target_type(&self) -> &str {
        "cloudflare_zone_dnssec"
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
        name: &str,
    ) -> Result<String, TransformError> {
        let mut instance = instance.clone();
        let Some(attrs) = instance.get_mut("attributes") else {
            return Ok(instance.to_string());
        };

        json_state::convert_to_float64(attrs, "algorithm");
        json_state::convert_to_float64(attrs, "digest_type");
        json_state::convert_to_float64(attrs, "key_tag");

        if let Some(status) = json_state::get_field(attrs, "status").and_then(Value::as_str) {
            let normalized = normalize_status(status).map_or(Value::Null, |s| Value::String(s.to_string()));
            json_state::set_field(attrs, "status", normalized);
        }

        json_state::convert_date_to_rfc3339(attrs, "modified_on")
            .map_err(|e| TransformError::new(format!("cloudflare_zone_dnssec.{name}: {e}")))?;

        Ok(instance.to_string())
    }
}
