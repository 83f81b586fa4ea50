//! `ConfigTransform` handler.

use hcl_edit::structure::{Block, Structure};

use super::{Handler, PipelineError};
use migrate_core::context::TransformContext;
use crate::hcl;
use migrate_core::registry::Registry;

fn lookup_type(block_kind: &str, type_label: &str) -> String {
    if block_kind == "data" {
        format!("data.{type_label}")
    } else {
        type_label.to_string()
    }
}

/// Walks every top-level `resource`/`data` block in document order, looks
/// up a migrator by `(type, source, target)`, and rewrites it in place.
///
/// Blocks the migrator asks to replace wholesale (`remove_original`) are
/// queued and applied after the walk completes, so indices into the tree
/// stay valid while earlier blocks are still being visited.
pub struct ConfigTransformHandler;

impl Handler for ConfigTransformHandler {
    fn handle(&self, registry: &Registry, ctx: &mut TransformContext) -> Result<(), PipelineError> {
        let mut tree = ctx
            .tree
            .take()
            .ok_or_else(|| PipelineError::new("config transform ran with no parsed tree"))?;

        let source = ctx.source_version.clone();
        let target = ctx.target_version.clone();

        let mut to_delete: Vec<usize> = Vec::new();
        let mut to_append: Vec<Block> = Vec::new();

        for i in 0..tree.len() {
            let (kind, type_label) = match &tree[i] {
                Structure::Block(block) => {
                    let kind = block.ident.to_string();
                    if kind != "resource" && kind != "data" {
                        continue;
                    }
                    let Some(label) = hcl::resource_type_label(block) else {
                        continue;
                    };
                    (kind, label)
                }
                Structure::Attribute(_) => continue,
            };

            let registry_key = lookup_type(&kind, &type_label);
            let Some(migrator) = registry.lookup(&registry_key, &source, &target) else {
                continue;
            };

            let Structure::Block(block) = &mut tree[i] else {
                unreachable!("index {i} was matched as a block above")
            };

            match migrator.transform_config(ctx, block) {
                Ok(outcome) => {
                    if outcome.remove_original {
                        to_delete.push(i);
                        to_append.extend(outcome.blocks);
                    }
                }
                Err(err) => {
                    ctx.diagnostics.push_error(
                        "resource transform failed",
                        format!("{registry_key} ({}): {err}", hcl::get_resource_name(block).unwrap_or_default()),
                    );
                }
            }

            ctx.increment_counter(&type_label);
        }

        to_delete.sort_unstable_by(|a, b| b.cmp(a));
        to_delete.dedup();
        for index in to_delete {
            tree.remove(index);
        }
        for block in to_append {
            tree.push(Structure::Block(block));
        }

        ctx.tree = Some(tree);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::Value;

    use super::*;
    use migrate_core::transformer::{ConfigTransformOutcome, ResourceTransformer, TransformError};
    use migrate_core::version::VersionId;

    #[derive(Debug)]
    struct RenameAttr;

    impl ResourceTransformer for RenameAttr {
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
            Ok(ConfigTransformOutcome::in_place())
        }

        fn transform_state(
            &self,
            _ctx: &mut TransformContext,
            _instance: &Value,
            _path: &str,
            _name: &str,
        ) -> Result<String, TransformError> {
            Ok(String::new())
        }
    }

    #[derive(Debug)]
    struct RenameType;

    impl ResourceTransformer for RenameType {
        fn can_handle(&self, resource_type: &str) -> bool {
            resource_type == "cloudflare_record"
        }

        fn target_type(&self) -> &str {
            "cloudflare_dns_record"
        }

        fn rename(&self) -> (&str, &str) {
            ("cloudflare_record", "cloudflare_dns_record")
        }

        fn transform_config(
            &self,
            _ctx: &mut TransformContext,
            block: &mut Block,
        ) -> Result<ConfigTransformOutcome, TransformError> {
            let name = hcl::get_resource_name(block).unwrap_or_default();
            hcl::rename_resource_type(block, "cloudflare_record", "cloudflare_dns_record");
            let moved = hcl::create_moved_block(
                &format!("cloudflare_record.{name}"),
                &format!("cloudflare_dns_record.{name}"),
            );
            Ok(ConfigTransformOutcome::replace_with(vec![block.clone(), moved]))
        }

        fn transform_state(
            &self,
            _ctx: &mut TransformContext,
            _instance: &Value,
            _path: &str,
            _name: &str,
        ) -> Result<String, TransformError> {
            Ok(String::new())
        }
    }

    #[derive(Debug)]
    struct AlwaysFails;

    impl ResourceTransformer for AlwaysFails {
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
            Err(TransformError::new("boom"))
        }

        fn transform_state(
            &self,
            _ctx: &mut TransformContext,
            _instance: &Value,
            _path: &str,
            _name: &str,
        ) -> Result<String, TransformError> {
            Ok(String::new())
        }
    }

    fn ctx_with(text: &str) -> TransformContext {
        let mut ctx = TransformContext::new("f.tf", text, VersionId::from("v4"), VersionId::from("v5"));
        ctx.tree = Some(hcl::parse_body(text).expect("valid fixture"));
        ctx
    }

    #[test]
    fn mutates_block_in_place_without_touching_unrelated_blocks() {
        let mut registry = Registry::new();
        registry.register("cloudflare_load_balancer_pool", "v4", "v5", Arc::new(RenameAttr));
        let mut ctx = ctx_with(
            "resource \"cloudflare_load_balancer_pool\" \"p\" {\n  default_pool_ids = [\"a\"]\n}\nresource \"cloudflare_zone\" \"z\" {\n  zone_id = \"1\"\n}\n",
        );
        ConfigTransformHandler.handle(&registry, &mut ctx).expect("handler succeeds");
        let rendered = ctx.tree.unwrap().to_string();
        assert!(rendered.contains("default_pools"));
        assert!(rendered.contains("cloudflare_zone"));
        assert!(ctx.metadata.contains_key("cloudflare_load_balancer_pool"));
    }

    /// A rename migrator emits the rewritten block plus a `moved` directive.
    #[test]
    fn rename_emits_exactly_one_moved_block() {
        let mut registry = Registry::new();
        registry.register("cloudflare_record", "v4", "v5", Arc::new(RenameType));
        let mut ctx = ctx_with("resource \"cloudflare_record\" \"a\" {\n  type = \"A\"\n}\n");
        ConfigTransformHandler.handle(&registry, &mut ctx).expect("handler succeeds");
        let rendered = ctx.tree.unwrap().to_string();
        assert_eq!(rendered.matches("moved {").count(), 1);
        assert!(rendered.contains("from = cloudflare_record.a"));
        assert!(rendered.contains("to = cloudflare_dns_record.a"));
        assert!(rendered.contains("cloudflare_dns_record"));
    }

    #[test]
    fn failed_transform_leaves_original_block_and_records_a_diagnostic() {
        let mut registry = Registry::new();
        registry.register("cloudflare_zone_dnssec", "v4", "v5", Arc::new(AlwaysFails));
        let mut ctx = ctx_with("resource \"cloudflare_zone_dnssec\" \"d\" {\n  zone_id = \"1\"\n}\n");
        ConfigTransformHandler.handle(&registry, &mut ctx).expect("handler itself does not abort");
        assert!(ctx.diagnostics.has_errors());
        assert!(ctx.tree.unwrap().to_string().contains("cloudflare_zone_dnssec"));
    }

    #[test]
    fn unregistered_type_is_left_untouched_without_a_warning() {
        let registry = Registry::new();
        let mut ctx = ctx_with("resource \"cloudflare_zone\" \"z\" {\n  zone_id = \"1\"\n}\n");
        ConfigTransformHandler.handle(&registry, &mut ctx).expect("handler succeeds");
        assert!(ctx.diagnostics.is_empty());
    }
}
