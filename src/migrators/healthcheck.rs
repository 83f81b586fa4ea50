//! `cloudflare_healthcheck`: flat fields restructure into `http_config` or
//! `tcp_config` depending on the `type` discriminant, with a set-of-objects
//! `header` block folded into a map, and a dynamic per-instance retype
//! recorded for the state pipeline.

use hcl_edit::structure::Block;
use serde_json::{Map, Value};

use migrate_core::context::TransformContext;
use crate::hcl;
use crate::json_state;
use migrate_core::transformer::{ConfigTransformOutcome, ResourceTransformer, TransformError};

const HTTP_FIELDS: &[&str] = &["port", "path", "method", "expected_body", "expected_codes", "allow_insecure", "follow_redirects", "header"];
const TCP_FIELDS: &[&str] = &["port", "method"];

#[derive(Debug, Default)]
pub struct HealthcheckMigrator;

fn is_tcp(discriminant: Option<&str>) -> bool {
    discriminant.is_some_and(|t| t.eq_ignore_ascii_case("tcp"))
}

impl ResourceTransformer for HealthcheckMigrator {
    fn can_handle(&self, resource_type: &str) -> bool {
        resource_type == "cloudflare_healthcheck"
    }

    fn target_type(&self) -> &str {
        "cloudflare_healthcheck"
    }

    fn transform_config(
        &self,
        _ctx: &mut TransformContext,
        block: &mut Block,
    ) -> Result<ConfigTransformOutcome, TransformError> {
        let discriminant = hcl::get_attribute(&block.body, "type").and_then(hcl::extract_string_from_attribute);

        hcl::convert_blocks_to_attribute(&mut block.body, "header", "header", |header_block| {
            let key = hcl::get_attribute(&header_block.body, "header")
                .and_then(hcl::extract_string_from_attribute)
                .unwrap_or_default();
            let values = hcl::get_attribute(&header_block.body, "values")
                .map(|attr| attr.value.clone())
                .unwrap_or_else(|| hcl::tokens_for_identifier("[]"));
            (key, values)
        });

        let (nested_name, fields) = if is_tcp(discriminant.as_deref()) {
            ("tcp_config", TCP_FIELDS)
        } else {
            ("http_config", HTTP_FIELDS)
        };
        hcl::move_attributes_to_nested_object(&mut block.body, nested_name, fields);

        Ok(ConfigTransformOutcome::in_place())
    }

    fn transform_state(
        &self,
        ctx: &mut TransformContext,
        instance: &Value,
        _path: &str,
        name: &str,
    ) -> Result<String, TransformError> {
        let mut instance = instance.clone();
        let Some(attrs) = instance.get_mut("attributes") else {
            return Ok(instance.to_string());
        };

        let discriminant = json_state::get_field(attrs, "type").and_then(Value::as_str).map(str::to_string);
        let tcp = is_tcp(discriminant.as_deref());

        if let Some(headers) = json_state::get_field(attrs, "header").and_then(Value::as_array).cloned() {
            let mut map = Map::new();
            for entry in headers {
                let key = entry.get("header").and_then(Value::as_str).map(str::to_string);
                let values = entry.get("values").cloned();
                if let (Some(key), Some(values)) = (key, values) {
                    map.insert(key, values);
                }
            }
            json_state::set_field(attrs, "header", Value::Object(map));
        }

        let (nested_name, fields) = if tcp { ("tcp_config", TCP_FIELDS) } else { ("http_config", HTTP_FIELDS) };
        let mut nested = Map::new();
        for field in fields {
            if let Some(value) = json_state::get_field(attrs, field).cloned() {
                nested.insert((*field).to_string(), value);
            }
        }
        json_state::remove_fields(attrs, "", fields);
        json_state::set_field(attrs, nested_name, Value::Object(nested));

        let new_type = if tcp { "cloudflare_healthcheck_tcp" } else { "cloudflare_healthcheck_http" };
        ctx.record_type_rename("cloudflare_healthcheck", name, new_type);

        Ok(instance.to_string())
    }
}
