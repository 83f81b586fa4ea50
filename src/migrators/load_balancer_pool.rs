//! `cloudflare_load_balancer_pool`: an attribute rename plus a
//! multiple-block-to-map collapse.

use hcl_edit::structure::Block;
use serde_json::{Map, Value};

use migrate_core::context::TransformContext;
use crate::hcl;
use crate::json_state;
use migrate_core::transformer::{ConfigTransformOutcome, ResourceTransformer, TransformError};

#[derive(Debug, Default)]
pub struct LoadBalancerPoolMigrator;

impl ResourceTransformer for LoadBalancerPoolMigrator {
    fn can_handle(&self, resource_type: &str) -> bool {
        resource_type == "cloudflare_load_balancer_pool"
    }

    fn target_type(&self) -> &str {
        "cloudflare_load_balancer_pool"
    }

    fn transform_config(
        &self,
        _ctx: &mut TransformContext,
        block: &mut Block,
    ) -> Result<ConfigTransformOutcome, TransformError> {
        hcl::rename_attribute(&mut block.body, "default_pool_ids", "default_pools");

        hcl::convert_blocks_to_attribute(&mut block.body, "region_pools", "region_pools", |region_block| {
            let region = hcl::get_attribute(&region_block.body, "region")
                .and_then(hcl::extract_string_from_attribute)
                .unwrap_or_default();
            let pool_ids = hcl::get_attribute(&region_block.body, "pool_ids")
                .map(|attr| attr.value.clone())
                .unwrap_or_else(|| hcl::tokens_for_identifier("[]"));
            (region, pool_ids)
        });

        Ok(ConfigTransformOutcome::in_place())
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

        json_state::rename_field(attrs, "", "default_pool_ids", "default_pools");

        if let Some(region_pools) = json_state::get_field(attrs, "region_pools").and_then(Value::as_array).cloned() {
            let mut map = Map::new();
            for entry in region_pools {
                let region = entry.get("region").and_then(Value::as_str).map(str::to_string);
                let pool_ids = entry.get("pool_ids").cloned();
                if let (Some(region), Some(pool_ids)) = (region, pool_ids) {
                    map.insert(region, pool_ids);
                }
            }
            json_state::set_field(attrs, "region_pools", Value::Object(map));
        }

        Ok(instance.to_string())
    }
}
