//! `StateTransform` handler.

use serde_json::Value;

use super::{Handler, PipelineError};
use migrate_core::context::TransformContext;
use migrate_core::registry::Registry;

enum Removal {
    /// Datasource with no registered migrator.
    UnmigratableDatasource,
    /// Every instance of this resource was deleted.
    EmptyInstances,
}

fn resources_len(state: &Value) -> usize {
    state
        .get("resources")
        .and_then(Value::as_array)
        .map(Vec::len)
        .unwrap_or(0)
}

fn string_field(state: &Value, path: &str) -> String {
    state.pointer(path).and_then(Value::as_str).unwrap_or_default().to_string()
}

/// Mutates the `resources` array of the paired state document via JSON
/// pointers, never deserializing it into typed structs so unknown fields
/// round-trip unchanged.
pub struct StateTransformHandler;

impl Handler for StateTransformHandler {
    fn handle(&self, registry: &Registry, ctx: &mut TransformContext) -> Result<(), PipelineError> {
        let mut state = ctx
            .state
            .take()
            .ok_or_else(|| PipelineError::new("state transform ran with no state document"))?;

        let source = ctx.source_version.clone();
        let target = ctx.target_version.clone();
        let mut removals: Vec<(usize, Removal)> = Vec::new();
        let mut transformed_instances: u64 = 0;

        for i in 0..resources_len(&state) {
            let base = format!("/resources/{i}");
            let mode = string_field(&state, &format!("{base}/mode"));
            let resource_type = string_field(&state, &format!("{base}/type"));
            let name = string_field(&state, &format!("{base}/name"));

            if resource_type.is_empty() {
                continue;
            }

            let lookup_key = if mode == "data" {
                format!("data.{resource_type}")
            } else {
                resource_type.clone()
            };

            let Some(migrator) = registry.lookup(&lookup_key, &source, &target) else {
                if mode == "data" {
                    removals.push((i, Removal::UnmigratableDatasource));
                } else {
                    ctx.diagnostics.push_warning(
                        "no migrator for managed resource",
                        format!("{resource_type}:{source}:{target}"),
                    );
                }
                continue;
            };

            if migrator.can_handle(&resource_type) && migrator.target_type() != resource_type {
                if let Some(slot) = state.pointer_mut(&format!("{base}/type")) {
                    *slot = Value::String(migrator.target_type().to_string());
                }
            }

            let instances_path = format!("{base}/instances");
            let instance_count = state.pointer(&instances_path).and_then(Value::as_array).map(Vec::len).unwrap_or(0);
            let mut instances_to_delete: Vec<usize> = Vec::new();

            for j in 0..instance_count {
                let instance_path = format!("{instances_path}/{j}");
                let Some(instance) = state.pointer(&instance_path).cloned() else {
                    continue;
                };

                match migrator.transform_state(ctx, &instance, &instance_path, &name) {
                    Ok(raw) if raw.is_empty() => instances_to_delete.push(j),
                    Ok(raw) => match serde_json::from_str::<Value>(&raw) {
                        Ok(mut new_instance) => {
                            ensure_schema_version_baseline(&mut new_instance);
                            if let Some(slot) = state.pointer_mut(&instance_path) {
                                *slot = new_instance;
                            }
                            transformed_instances += 1;
                        }
                        Err(parse_err) => {
                            ctx.diagnostics.push_error(
                                "migrator produced invalid JSON",
                                format!("{resource_type}.{name}[{j}]: {parse_err}"),
                            );
                        }
                    },
                    Err(err) => {
                        ctx.diagnostics
                            .push_error("instance transform failed", format!("{resource_type}.{name}[{j}]: {err}"));
                    }
                }
            }

            instances_to_delete.sort_unstable_by(|a, b| b.cmp(a));
            for j in instances_to_delete {
                if let Some(arr) = state.pointer_mut(&instances_path).and_then(Value::as_array_mut) {
                    if j < arr.len() {
                        arr.remove(j);
                    }
                }
            }

            let remaining = state.pointer(&instances_path).and_then(Value::as_array).map(Vec::len).unwrap_or(0);
            if remaining == 0 {
                removals.push((i, Removal::EmptyInstances));
            }

            if let Some(new_type) = ctx.state_type_renames.get(&format!("{resource_type}.{name}")) {
                if !new_type.is_empty() && *new_type != resource_type {
                    if let Some(slot) = state.pointer_mut(&format!("{base}/type")) {
                        *slot = Value::String(new_type.clone());
                    }
                }
            }
        }

        // Descending order so earlier indices stay valid as later ones are removed.
        removals.sort_unstable_by(|a, b| b.0.cmp(&a.0));

        let mut datasources_removed: u64 = 0;
        let mut resources_removed: u64 = 0;
        for (index, reason) in removals {
            if let Some(arr) = state.get_mut("resources").and_then(Value::as_array_mut) {
                if index < arr.len() {
                    arr.remove(index);
                    match reason {
                        Removal::UnmigratableDatasource => datasources_removed += 1,
                        Removal::EmptyInstances => resources_removed += 1,
                    }
                }
            }
        }

        ctx.metadata.insert("state_transformations".to_string(), Value::from(transformed_instances));
        ctx.metadata.insert("datasources_removed".to_string(), Value::from(datasources_removed));
        ctx.metadata.insert("resources_removed".to_string(), Value::from(resources_removed));

        ctx.state = Some(state);
        Ok(())
    }
}

/// Every migrated instance's `schema_version` is the target baseline (0)
/// unless the migrator explicitly set a different value in the JSON it
/// returned.
fn ensure_schema_version_baseline(instance: &mut Value) {
    if let Some(obj) = instance.as_object_mut() {
        obj.entry("schema_version").or_insert(Value::from(0));
    }
}
