//! JSON-state manipulation primitives.
//!
//! The state document is never deserialized into typed structs — doing so
//! would drop fields no migrator knows about (hard requirement, preserving
//! unknown fields across transformation). Every function here edits a
//! `serde_json::Value` in place through dotted-path navigation.

use chrono::{DateTime, Utc};
use serde_json::{Map, Number, Value};

/// A single segment in a parsed dotted/bracketed JSON path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonPathSegment {
    /// Object key: `"foo"`.
    Key(String),
    /// Array wildcard: `"[]"`.
    ArrayWildcard,
    /// Array index: `"[0]"`.
    ArrayIndex(usize),
}

/// A parsed JSON path such as `"header[].values"`.
pub type JsonPath = Vec<JsonPathSegment>;

/// Parse a dot-separated JSON path string into segments.
#[must_use]
pub fn parse_json_path(path: &str) -> JsonPath {
    let mut segments = Vec::new();
    for part in path.split('.') {
        if part.is_empty() {
            continue;
        }
        if let Some(before_bracket) = part.strip_suffix("[]") {
            if !before_bracket.is_empty() {
                segments.push(JsonPathSegment::Key(before_bracket.to_string()));
            }
            segments.push(JsonPathSegment::ArrayWildcard);
        } else if let Some(idx_start) = part.find('[') {
            let key = &part[..idx_start];
            if !key.is_empty() {
                segments.push(JsonPathSegment::Key(key.to_string()));
            }
            let idx_str = &part[idx_start + 1..part.len() - 1];
            if let Ok(idx) = idx_str.parse::<usize>() {
                segments.push(JsonPathSegment::ArrayIndex(idx));
            }
        } else {
            segments.push(JsonPathSegment::Key(part.to_string()));
        }
    }
    segments
}

/// Resolve a parsed path against a value, collecting every matched leaf.
#[must_use]
pub fn resolve_path(value: &Value, path: &[JsonPathSegment]) -> Vec<Value> {
    if path.is_empty() {
        return vec![value.clone()];
    }
    match &path[0] {
        JsonPathSegment::Key(key) => match value.get(key.as_str()) {
            Some(child) => resolve_path(child, &path[1..]),
            None => vec![],
        },
        JsonPathSegment::ArrayWildcard => match value.as_array() {
            Some(arr) => arr.iter().flat_map(|v| resolve_path(v, &path[1..])).collect(),
            None => vec![],
        },
        JsonPathSegment::ArrayIndex(idx) => match value.as_array() {
            Some(arr) => match arr.get(*idx) {
                Some(child) => resolve_path(child, &path[1..]),
                None => vec![],
            },
            None => vec![],
        },
    }
}

/// Resolve a path to a single value, returning `Value::Null` if there is
/// not exactly one match.
#[must_use]
pub fn resolve_path_single(value: &Value, path: &[JsonPathSegment]) -> Value {
    let mut results = resolve_path(value, path);
    if results.len() == 1 {
        results.pop().unwrap_or(Value::Null)
    } else {
        Value::Null
    }
}

fn join(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{base}.{name}")
    }
}

fn navigate<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }
    let mut current = value;
    for part in path.split('.') {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

/// Read a field by dotted path (e.g. `"settings.status"`).
#[must_use]
pub fn get_field<'a>(attrs: &'a Value, path: &str) -> Option<&'a Value> {
    navigate(attrs, path)
}

/// Write a field by dotted path, creating intermediate objects as needed.
pub fn set_field(attrs: &mut Value, path: &str, new_value: Value) {
    if path.is_empty() {
        *attrs = new_value;
        return;
    }
    let mut parts: Vec<&str> = path.split('.').collect();
    let Some(last) = parts.pop() else { return };
    let mut current = attrs;
    for part in parts {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        current = current
            .as_object_mut()
            .expect("just ensured object")
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    current
        .as_object_mut()
        .expect("just ensured object")
        .insert(last.to_string(), new_value);
}

/// Remove a field by dotted path, returning its prior value if present.
pub fn remove_field(attrs: &mut Value, path: &str) -> Option<Value> {
    let mut parts: Vec<&str> = path.split('.').collect();
    let last = parts.pop()?;
    let mut current = attrs;
    for part in parts {
        current = current.as_object_mut()?.get_mut(part)?;
    }
    current.as_object_mut()?.remove(last)
}

/// Delete `path` if it resolves to an empty object, empty array, or null.
pub fn cleanup_empty_field(attrs: &mut Value, path: &str) {
    let is_empty = navigate(attrs, path).is_some_and(|v| match v {
        Value::Null => true,
        Value::Object(m) => m.is_empty(),
        Value::Array(a) => a.is_empty(),
        _ => false,
    });
    if is_empty {
        remove_field(attrs, path);
    }
}

/// Delete the object at `path` if every field in `fields` is absent or null.
pub fn remove_object_if_all_null(attrs: &mut Value, path: &str, fields: &[&str]) {
    let all_null = navigate(attrs, path).is_some_and(|v| {
        v.as_object().is_some_and(|m| {
            fields
                .iter()
                .all(|f| matches!(m.get(*f), None | Some(Value::Null)))
        })
    });
    if all_null {
        remove_field(attrs, path);
    }
}

/// Ensure a field is present, writing `default` if it is missing.
pub fn ensure_field(attrs: &mut Value, path: &str, default: Value) {
    if get_field(attrs, path).is_none() {
        set_field(attrs, path, default);
    }
}

/// Ensure `created_on` and `modified_on` are present under `base_path`
/// (pass `""` for the top-level attributes object), defaulting to `default`.
pub fn ensure_timestamps(attrs: &mut Value, base_path: &str, default: &str) {
    ensure_field(attrs, &join(base_path, "created_on"), Value::String(default.to_string()));
    ensure_field(attrs, &join(base_path, "modified_on"), Value::String(default.to_string()));
}

/// Rename `old` to `new` under `base_path`. If `old` is present and `new`
/// is absent, `new` takes `old`'s value; if both are present, `new` is
/// kept. Either way `old` is deleted.
pub fn rename_field(attrs: &mut Value, base_path: &str, old: &str, new: &str) {
    let old_path = join(base_path, old);
    let new_path = join(base_path, new);
    if let Some(old_value) = get_field(attrs, &old_path).cloned() {
        if get_field(attrs, &new_path).is_none() {
            set_field(attrs, &new_path, old_value);
        }
        remove_field(attrs, &old_path);
    }
}

/// Remove several fields under `base_path`.
pub fn remove_fields(attrs: &mut Value, base_path: &str, names: &[&str]) {
    for name in names {
        remove_field(attrs, &join(base_path, name));
    }
}

/// Coerce an integer field to a floating-point JSON number in place.
/// Returns `false` if the field is absent or not a number.
pub fn convert_to_float64(attrs: &mut Value, path: &str) -> bool {
    let Some(as_f64) = get_field(attrs, path).and_then(Value::as_f64) else {
        return false;
    };
    let Some(number) = Number::from_f64(as_f64) else {
        return false;
    };
    set_field(attrs, path, Value::Number(number));
    true
}

/// Identity coercion hook: the seam `field_transforms` plug into when a
/// field needs no rewriting beyond being carried across the pivot in
/// [`transform_data_field_array_to_object`].
#[must_use]
pub fn convert_gjson_value(value: &Value) -> Value {
    value.clone()
}

/// Options controlling [`transform_data_field_array_to_object`].
#[derive(Default)]
pub struct ArrayToObjectOptions<'a> {
    /// Fields to drop from the collapsed object.
    pub skip_fields: &'a [&'a str],
    /// Per-field value transforms, applied before renaming.
    pub field_transforms: &'a [(&'a str, fn(Value) -> Value)],
    /// Per-field key renames, applied after transforms.
    pub rename_fields: &'a [(&'a str, &'a str)],
    /// Fields to inject with a default if absent after the above.
    pub default_fields: &'a [(&'a str, Value)],
}

/// Pivot an array-of-one-object field into a single object in place.
///
/// Returns `false` if `path` is absent, not an array, or empty.
pub fn transform_data_field_array_to_object(
    attrs: &mut Value,
    path: &str,
    _record_type: &str,
    options: &ArrayToObjectOptions,
) -> bool {
    let Some(first) = get_field(attrs, path)
        .and_then(Value::as_array)
        .and_then(|a| a.first())
        .cloned()
    else {
        return false;
    };
    let Value::Object(mut obj) = first else {
        return false;
    };

    for field in options.skip_fields {
        obj.remove(*field);
    }
    for (name, transform) in options.field_transforms {
        if let Some(v) = obj.remove(*name) {
            obj.insert((*name).to_string(), transform(v));
        }
    }
    for (old, new) in options.rename_fields {
        if let Some(v) = obj.remove(*old) {
            obj.insert((*new).to_string(), v);
        }
    }
    for (name, default) in options.default_fields {
        obj.entry((*name).to_string()).or_insert_with(|| default.clone());
    }

    set_field(attrs, path, Value::Object(obj));
    true
}

/// Rewrite an RFC-1123/RFC-2822-style date string (`"Tue, 04 Nov 2025
/// 21:52:44 +0000"`) at `path` into RFC-3339 Zulu form
/// (`"2025-11-04T21:52:44Z"`) in place. A missing field is not an error.
///
/// # Errors
///
/// Returns the parser's error message if the field is present but not a
/// valid RFC-2822 date string.
pub fn convert_date_to_rfc3339(attrs: &mut Value, path: &str) -> Result<(), String> {
    let Some(raw) = get_field(attrs, path).and_then(Value::as_str).map(str::to_string) else {
        return Ok(());
    };
    let parsed = DateTime::parse_from_rfc2822(&raw).map_err(|e| e.to_string())?;
    let rfc3339 = parsed.with_timezone(&Utc).format("%Y-%m-%dT%H:%M:%SZ").to_string();
    set_field(attrs, path, Value::String(rfc3339));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_array_wildcard_path() {
        let path = parse_json_path("header[].values");
        assert_eq!(
            path,
            vec![
                JsonPathSegment::Key("header".to_string()),
                JsonPathSegment::ArrayWildcard,
                JsonPathSegment::Key("values".to_string()),
            ]
        );
    }

    #[test]
    fn resolve_array_wildcard_flattens_matches() {
        let data = json!({"header": [{"values": ["a"]}, {"values": ["b"]}]});
        let path = parse_json_path("header[].values");
        assert_eq!(resolve_path(&data, &path), vec![json!(["a"]), json!(["b"])]);
    }

    #[test]
    fn set_and_get_nested_field_creates_intermediate_objects() {
        let mut attrs = json!({});
        set_field(&mut attrs, "settings.status", json!("active"));
        assert_eq!(get_field(&attrs, "settings.status"), Some(&json!("active")));
    }

    #[test]
    fn rename_field_moves_value_and_deletes_old() {
        let mut attrs = json!({"default_pool_ids": ["a", "b"]});
        rename_field(&mut attrs, "", "default_pool_ids", "default_pools");
        assert!(get_field(&attrs, "default_pool_ids").is_none());
        assert_eq!(get_field(&attrs, "default_pools"), Some(&json!(["a", "b"])));
    }

    #[test]
    fn rename_field_keeps_new_value_when_both_present() {
        let mut attrs = json!({"old": "stale", "new": "fresh"});
        rename_field(&mut attrs, "", "old", "new");
        assert!(get_field(&attrs, "old").is_none());
        assert_eq!(get_field(&attrs, "new"), Some(&json!("fresh")));
    }

    #[test]
    fn ensure_timestamps_only_fills_missing_fields() {
        let mut attrs = json!({"created_on": "2020-01-01T00:00:00Z"});
        ensure_timestamps(&mut attrs, "", "2025-01-01T00:00:00Z");
        assert_eq!(get_field(&attrs, "created_on"), Some(&json!("2020-01-01T00:00:00Z")));
        assert_eq!(get_field(&attrs, "modified_on"), Some(&json!("2025-01-01T00:00:00Z")));
    }

    /// Zone datasource instance gets `schema_version = 0` injected.
    #[test]
    fn ensure_field_injects_schema_version() {
        let mut instance = json!({"id": "z1", "name": "example.com"});
        ensure_field(&mut instance, "schema_version", json!(0));
        assert_eq!(instance, json!({"id": "z1", "name": "example.com", "schema_version": 0}));
    }

    #[test]
    fn cleanup_empty_field_removes_empty_object_but_not_populated_one() {
        let mut attrs = json!({"empty": {}, "full": {"a": 1}});
        cleanup_empty_field(&mut attrs, "empty");
        cleanup_empty_field(&mut attrs, "full");
        assert!(get_field(&attrs, "empty").is_none());
        assert!(get_field(&attrs, "full").is_some());
    }

    #[test]
    fn remove_object_if_all_null_checks_every_listed_field() {
        let mut attrs = json!({"geo": {"lat": null, "lon": null}});
        remove_object_if_all_null(&mut attrs, "geo", &["lat", "lon"]);
        assert!(get_field(&attrs, "geo").is_none());

        let mut attrs = json!({"geo": {"lat": 1.0, "lon": null}});
        remove_object_if_all_null(&mut attrs, "geo", &["lat", "lon"]);
        assert!(get_field(&attrs, "geo").is_some());
    }

    #[test]
    fn convert_to_float64_turns_integer_into_float_json_number() {
        let mut attrs = json!({"algorithm": 13});
        assert!(convert_to_float64(&mut attrs, "algorithm"));
        let rendered = serde_json::to_string(get_field(&attrs, "algorithm").unwrap()).unwrap();
        assert_eq!(rendered, "13.0");
    }

    /// RFC-1123 to RFC-3339 date conversion.
    #[test]
    fn convert_date_to_rfc3339_matches_seed_scenario() {
        let mut attrs = json!({"modified_on": "Tue, 04 Nov 2025 21:52:44 +0000"});
        convert_date_to_rfc3339(&mut attrs, "modified_on").expect("valid date");
        assert_eq!(get_field(&attrs, "modified_on"), Some(&json!("2025-11-04T21:52:44Z")));
    }

    #[test]
    fn convert_date_to_rfc3339_is_a_noop_when_field_is_absent() {
        let mut attrs = json!({});
        convert_date_to_rfc3339(&mut attrs, "modified_on").expect("missing field is not an error");
        assert!(get_field(&attrs, "modified_on").is_none());
    }

    /// A single-element array collapsed into an object.
    #[test]
    fn transform_data_field_array_to_object_pivots_and_applies_options() {
        let mut attrs = json!({
            "data": [{"priority": 10, "target": "mail.example.com", "internal_id": "x"}]
        });
        let options = ArrayToObjectOptions {
            skip_fields: &["internal_id"],
            rename_fields: &[("target", "value")],
            default_fields: &[("weight", json!(0))],
            field_transforms: &[],
        };
        assert!(transform_data_field_array_to_object(&mut attrs, "data", "MX", &options));
        let data = get_field(&attrs, "data").unwrap();
        assert_eq!(data["priority"], json!(10));
        assert_eq!(data["value"], json!("mail.example.com"));
        assert_eq!(data["weight"], json!(0));
        assert!(data.get("target").is_none());
        assert!(data.get("internal_id").is_none());
    }
}
