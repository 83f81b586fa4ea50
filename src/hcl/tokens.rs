//! Lower-level expression builders used by the primitives in [`super`].
//!
//! Both functions round-trip through the parser rather than calling
//! `hcl_edit`'s expression-builder API directly — see the module doc on
//! [`super`] for why.

use hcl_edit::expr::Expression;

use super::expr_from_str;

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Build a bare identifier/traversal expression, e.g. `var.region` or
/// `cloudflare_record.a.id`.
#[must_use]
pub fn tokens_for_identifier(name: &str) -> Expression {
    expr_from_str(name)
}

/// Build an object expression from `(key, value)` pairs.
///
/// `quote_keys = true` renders `"key" = value` (for map-like collapses whose
/// keys come from data, e.g. DNS region names or HTTP header names, which
/// are not guaranteed to be valid bare identifiers). `quote_keys = false`
/// renders `key = value` (for fixed schema field names).
#[must_use]
pub fn tokens_for_object(fields: &[(String, Expression)], quote_keys: bool) -> Expression {
    let mut src = String::from("{\n");
    for (key, value) in fields {
        if quote_keys {
            src.push_str(&format!("  \"{}\" = {}\n", escape(key), value));
        } else {
            src.push_str(&format!("  {key} = {value}\n"));
        }
    }
    src.push('}');
    expr_from_str(&src)
}
