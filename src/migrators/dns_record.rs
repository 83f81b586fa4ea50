//! `cloudflare_record` -> `cloudflare_dns_record`: a resource-type rename
//! with a `moved` directive, layered with per-type restructuring driven by
//! the record's own `type` discriminant. MX and URI hoist their nested
//! `data.priority` to the root and drop it from the nested object, SRV
//! hoists but keeps it, CAA synthesizes a `content` string from
//! `data.flags`/`data.tag`/`data.value`, and everything else just renames
//! bare `value` to `content`.

use hcl_edit::structure::Block;
use serde_json::Value;

use migrate_core::context::TransformContext;
use crate::hcl;
use crate::json_state::{self, ArrayToObjectOptions};
use migrate_core::transformer::{ConfigTransformOutcome, ResourceTransformer, TransformError};

const OLD_TYPE: &str = "cloudflare_record";
const NEW_TYPE: &str = "cloudflare_dns_record";

#[derive(Debug, Default)]
pub struct DnsRecordMigrator;

impl ResourceTransformer for DnsRecordMigrator {
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
        let discriminant = hcl::get_attribute(&block.body, "type").and_then(hcl::extract_string_from_attribute);
        hcl::ensure_attribute(&mut block.body, "ttl", "1");

        match discriminant.as_deref() {
            Some("MX") | Some("URI") => {
                if let Some(priority) = hcl::hoist_attribute_from_block(&block.body, "data", "priority") {
                    hcl::set_attribute_expr(&mut block.body, "priority", priority);
                }
                if let Some(data) = hcl::find_block_by_type_mut(&mut block.body, "data") {
                    hcl::remove_attribute(&mut data.body, "priority");
                }
                hcl::convert_single_block_to_attribute(&mut block.body, "data", "data");
            }
            Some("SRV") => {
                if let Some(priority) = hcl::hoist_attribute_from_block(&block.body, "data", "priority") {
                    hcl::set_attribute_expr(&mut block.body, "priority", priority);
                }
                hcl::convert_single_block_to_attribute(&mut block.body, "data", "data");
            }
            Some("CAA") => {
                let flags = hcl::hoist_attribute_from_block(&block.body, "data", "flags").map(|e| e.to_string());
                let tag = hcl::hoist_attribute_from_block(&block.body, "data", "tag").and_then(|e| match e {
                    hcl_edit::expr::Expression::String(s) => Some(s.to_string()),
                    _ => None,
                });
                let value = hcl::hoist_attribute_from_block(&block.body, "data", "value").and_then(|e| match e {
                    hcl_edit::expr::Expression::String(s) => Some(s.to_string()),
                    _ => None,
                });
                if let (Some(flags), Some(tag), Some(value)) = (flags, tag, value) {
                    let content = format!("{} {tag} \"{value}\"", flags.trim());
                    hcl::set_attribute_expr(&mut block.body, "content", hcl::expr_from_str(&format!("{content:?}")));
                }
                hcl::convert_single_block_to_attribute(&mut block.body, "data", "data");
            }
            _ => {
                hcl::rename_attribute(&mut block.body, "value", "content");
                hcl::convert_single_block_to_attribute(&mut block.body, "data", "data");
            }
        }

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
        let mut instance = instance.clone();
        let Some(attrs) = instance.get_mut("attributes") else {
            return Ok(instance.to_string());
        };

        json_state::ensure_field(attrs, "ttl", Value::from(1));
        let discriminant = json_state::get_field(attrs, "type").and_then(Value::as_str).map(str::to_string);
        let data_first = json_state::get_field(attrs, "data").and_then(Value::as_array).and_then(|a| a.first()).cloned();

        match discriminant.as_deref() {
            Some("MX") | Some("URI") => {
                let priority = data_first.as_ref().and_then(|o| o.get("priority")).cloned();
                let options = ArrayToObjectOptions {
                    skip_fields: &["priority"],
                    ..ArrayToObjectOptions::default()
                };
                json_state::transform_data_field_array_to_object(attrs, "data", "", &options);
                if let Some(priority) = priority {
                    json_state::set_field(attrs, "priority", priority);
                }
            }
            Some("SRV") => {
                let priority = data_first.as_ref().and_then(|o| o.get("priority")).cloned();
                json_state::transform_data_field_array_to_object(attrs, "data", "", &ArrayToObjectOptions::default());
                if let Some(priority) = priority {
                    json_state::set_field(attrs, "priority", priority);
                }
            }
            Some("CAA") => {
                let flags = data_first.as_ref().and_then(|o| o.get("flags")).and_then(Value::as_i64);
                let tag = data_first.as_ref().and_then(|o| o.get("tag")).and_then(Value::as_str).map(str::to_string);
                let value = data_first.as_ref().and_then(|o| o.get("value")).and_then(Value::as_str).map(str::to_string);
                json_state::transform_data_field_array_to_object(attrs, "data", "", &ArrayToObjectOptions::default());
                if let (Some(flags), Some(tag), Some(value)) = (flags, tag, value) {
                    json_state::set_field(attrs, "content", Value::String(format!("{flags} {tag} \"{value}\"")));
                }
            }
            _ => {
                json_state::rename_field(attrs, "", "value", "content");
                json_state::transform_data_field_array_to_object(attrs, "data", "", &ArrayToObjectOptions::default());
            }
        }

        Ok(instance.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migrate_core::version::VersionId;
    use serde_json::json;

    fn ctx() -> TransformContext {
        TransformContext::new("f.tf", "", VersionId::from("v4"), VersionId::from("v5"))
    }

    fn first_block(body: &mut hcl_edit::structure::Body) -> &mut Block {
        let hcl_edit::structure::Structure::Block(block) = body.iter_mut().next().unwrap() else {
            panic!("expected block");
        };
        block
    }

    /// An A record renames its resource type, emits a `moved` block,
    /// and renames bare `value` to `content`.
    #[test]
    fn simple_record_renames_type_and_value_and_emits_moved() {
        let mut body = hcl::parse_body(
            "resource \"cloudflare_record\" \"root\" {\n  zone_id = \"z\"\n  name = \"@\"\n  type = \"A\"\n  value = \"192.0.2.1\"\n}\n",
        )
        .unwrap();
        let block = first_block(&mut body);
        let mut ctx = ctx();
        let outcome = DnsRecordMigrator.transform_config(&mut ctx, block).expect("transform succeeds");

        assert!(outcome.remove_original);
        assert_eq!(outcome.blocks.len(), 2);
        let rendered: String = outcome.blocks.iter().map(ToString::to_string).collect();
        assert!(rendered.contains("cloudflare_dns_record"));
        assert!(rendered.contains("content"));
        assert!(!rendered.contains("\"value\""));
        assert!(rendered.contains("moved {"));
        assert!(rendered.contains("from = cloudflare_record.root"));
        assert!(rendered.contains("to = cloudflare_dns_record.root"));
    }

    /// An MX record hoists `data.priority` to the root and drops it
    /// from the nested `data` object.
    #[test]
    fn mx_record_hoists_priority_out_of_the_data_block() {
        let mut body = hcl::parse_body(
            "resource \"cloudflare_record\" \"mail\" {\n  type = \"MX\"\n  data {\n    priority = 10\n    target = \"mail.example.com\"\n  }\n}\n",
        )
        .unwrap();
        let block = first_block(&mut body);
        let mut ctx = ctx();
        let outcome = DnsRecordMigrator.transform_config(&mut ctx, block).expect("transform succeeds");
        let rendered: String = outcome.blocks.iter().map(ToString::to_string).collect();
        assert!(rendered.contains("priority"));
        assert!(rendered.contains("target"));
        let occurrences = rendered.matches("priority").count();
        assert_eq!(occurrences, 1, "priority should only appear hoisted to the root, not inside data");
    }

    /// A CAA record's `content` is synthesized from flags/tag/value.
    #[test]
    fn caa_record_synthesizes_content_from_nested_fields() {
        let mut body = hcl::parse_body(
            "resource \"cloudflare_record\" \"caa\" {\n  type = \"CAA\"\n  data {\n    flags = 0\n    tag = \"issue\"\n    value = \"letsencrypt.org\"\n  }\n}\n",
        )
        .unwrap();
        let block = first_block(&mut body);
        let mut ctx = ctx();
        let outcome = DnsRecordMigrator.transform_config(&mut ctx, block).expect("transform succeeds");
        let rendered: String = outcome.blocks.iter().map(ToString::to_string).collect();
        assert!(rendered.contains("0 issue \\\"letsencrypt.org\\\""));
    }

    #[test]
    fn state_hoists_srv_priority_and_keeps_nested_data() {
        let instance = json!({
            "attributes": {
                "type": "SRV",
                "data": [{"priority": 5, "weight": 1, "port": 443, "target": "svc.example.com"}]
            }
        });
        let mut ctx = ctx();
        let result = DnsRecordMigrator
            .transform_state(&mut ctx, &instance, "/resources/0/instances/0", "svc")
            .expect("transform succeeds");
        let new_instance: Value = serde_json::from_str(&result).unwrap();
        assert_eq!(new_instance["attributes"]["priority"], json!(5));
        assert_eq!(new_instance["attributes"]["data"]["weight"], json!(1));
    }

    #[test]
    fn state_synthesizes_caa_content() {
        let instance = json!({
            "attributes": {
                "type": "CAA",
                "data": [{"flags": 0, "tag": "issue", "value": "letsencrypt.org"}]
            }
        });
        let mut ctx = ctx();
        let result = DnsRecordMigrator
            .transform_state(&mut ctx, &instance, "/resources/0/instances/0", "caa")
            .expect("transform succeeds");
        let new_instance: Value = serde_json::from_str(&result).unwrap();
        assert_eq!(new_instance["attributes"]["content"], json!("0 issue \"letsencrypt.org\""));
    }
}
