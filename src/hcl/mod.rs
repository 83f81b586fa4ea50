//! HCL tree manipulation primitives.
//!
//! Every migrator is expressed in terms of the functions below; they are the
//! extensional definition of what the tree API must support.
//! Built on [`hcl_edit`], whose `Body`/`Block`/`Attribute` types preserve
//! comments and surrounding whitespace (its "decor") through mutation —
//! callers here never need to think about formatting until the final
//! `Format` handler serializes the tree.
//!
//! A few helpers (`expr_from_str`, `attribute_from_str`) build new AST nodes
//! by parsing a throwaway snippet rather than poking at `hcl_edit`'s
//! expression-builder internals directly. That keeps this module's surface
//! area small: everything above this file only ever sees `Body`/`Block`/
//! `Expression`, never `Object`/`ObjectKey`/`Array` construction details.

use hcl_edit::expr::Expression;
use hcl_edit::structure::{Attribute, Block, BlockLabel, Body, Structure};
use hcl_edit::Decorated;

pub mod tokens;

pub use tokens::{tokens_for_identifier, tokens_for_object};

/// Parse configuration text into an editable tree.
///
/// # Errors
///
/// Returns the parser's error message if `text` is not valid HCL.
pub fn parse_body(text: &str) -> Result<Body, String> {
    text.parse::<Body>().map_err(|e| e.to_string())
}

fn label_str(label: &BlockLabel) -> String {
    match label {
        BlockLabel::String(s) => s.to_string(),
        BlockLabel::Ident(i) => i.to_string(),
    }
}

/// First label of a `resource`/`data` block: the (old) resource type.
#[must_use]
pub fn resource_type_label(block: &Block) -> Option<String> {
    block.labels.first().map(label_str)
}

/// Second label of a `resource`/`data` block: the declared name.
#[must_use]
pub fn get_resource_name(block: &Block) -> Option<String> {
    block.labels.get(1).map(label_str)
}

/// `true` if this block's keyword (`resource`, `data`, `moved`, ...) matches.
#[must_use]
pub fn block_kind_is(block: &Block, kind: &str) -> bool {
    block.ident.to_string() == kind
}

/// Swap the first label of a block iff it currently equals `old`.
pub fn rename_resource_type(block: &mut Block, old: &str, new: &str) -> bool {
    if let Some(label) = block.labels.first_mut() {
        if label_str(label) == old {
            *label = BlockLabel::String(Decorated::new(new.to_string()));
            return true;
        }
    }
    false
}

/// Replace an attribute's name, preserving its expression tokens exactly.
pub fn rename_attribute(body: &mut Body, old: &str, new: &str) -> bool {
    for structure in body.iter_mut() {
        if let Structure::Attribute(attr) = structure {
            if attr.key.to_string() == old {
                attr.key = attribute_from_str(new, "null").key;
                return true;
            }
        }
    }
    false
}

/// Set `name = default` iff the attribute is not already present.
pub fn ensure_attribute(body: &mut Body, name: &str, default_expr_src: &str) {
    if get_attribute(body, name).is_none() {
        body.push(Structure::Attribute(attribute_from_str(name, default_expr_src)));
    }
}

/// Set `name` to `expr` verbatim, replacing any existing attribute with
/// that name. Used to hoist an expression already read from elsewhere in
/// the tree (e.g. SRV/MX/URI `data.priority`) onto the outer body.
pub fn set_attribute_expr(body: &mut Body, name: &str, expr: Expression) {
    remove_attribute(body, name);
    body.push(Structure::Attribute(Attribute::new(hcl_edit::Ident::new(name), expr)));
}

/// Find an attribute by name.
#[must_use]
pub fn get_attribute<'a>(body: &'a Body, name: &str) -> Option<&'a Attribute> {
    body.iter().find_map(|s| match s {
        Structure::Attribute(attr) if attr.key.to_string() == name => Some(attr),
        _ => None,
    })
}

/// Remove an attribute by name. Idempotent: a missing attribute is a no-op.
pub fn remove_attribute(body: &mut Body, name: &str) -> bool {
    let index = body.iter().position(|s| matches!(
        s,
        Structure::Attribute(attr) if attr.key.to_string() == name
    ));
    if let Some(index) = index {
        body.remove(index);
        true
    } else {
        false
    }
}

/// Remove several attributes by name. Idempotent.
pub fn remove_attributes(body: &mut Body, names: &[&str]) {
    for name in names {
        remove_attribute(body, name);
    }
}

/// If the expression is a bare string literal, return its value; otherwise
/// (variables, function calls, interpolations) return `None` — callers must
/// treat this as "type unknown" and fall back to a conservative branch.
#[must_use]
pub fn extract_string_from_attribute(attr: &Attribute) -> Option<String> {
    match &attr.value {
        Expression::String(s) => Some(s.to_string()),
        _ => None,
    }
}

/// All nested blocks with the given block-keyword (e.g. `"header"`).
#[must_use]
pub fn find_blocks_by_type<'a>(body: &'a Body, name: &str) -> Vec<&'a Block> {
    body.iter()
        .filter_map(|s| match s {
            Structure::Block(b) if b.ident.to_string() == name => Some(b),
            _ => None,
        })
        .collect()
}

/// The first nested block with the given block-keyword, if any.
#[must_use]
pub fn find_block_by_type<'a>(body: &'a Body, name: &str) -> Option<&'a Block> {
    find_blocks_by_type(body, name).into_iter().next()
}

/// Mutable variant of [`find_block_by_type`], for primitives (notably the
/// SRV/MX/URI priority hoist) that need to edit a nested block in place
/// rather than replace it wholesale.
pub fn find_block_by_type_mut<'a>(body: &'a mut Body, name: &str) -> Option<&'a mut Block> {
    body.iter_mut().find_map(|s| match s {
        Structure::Block(b) if b.ident.to_string() == name => Some(b),
        _ => None,
    })
}

/// Remove and return every nested block with the given block-keyword.
pub fn remove_blocks_by_type(body: &mut Body, name: &str) -> Vec<Block> {
    let mut removed = Vec::new();
    let mut i = 0;
    while i < body.len() {
        let is_match = matches!(
            &body[i],
            Structure::Block(b) if b.ident.to_string() == name
        );
        if is_match {
            if let Structure::Block(b) = body.remove(i) {
                removed.push(b);
            }
        } else {
            i += 1;
        }
    }
    removed
}

/// Collapse a single `blockName { a = X  b = Y }` into
/// `attrName = { a = X, b = Y }`, preserving each field's expression tokens.
/// Returns `false` if no such block exists.
pub fn convert_single_block_to_attribute(body: &mut Body, block_name: &str, attr_name: &str) -> bool {
    let blocks = remove_blocks_by_type(body, block_name);
    let Some(block) = blocks.into_iter().next() else {
        return false;
    };
    let fields: Vec<(String, Expression)> = block
        .body
        .iter()
        .filter_map(|s| match s {
            Structure::Attribute(a) => Some((a.key.to_string(), a.value.clone())),
            Structure::Block(_) => None,
        })
        .collect();
    set_nested_object(body, attr_name, &fields, false);
    true
}

/// Fold every `blockName { ... }` occurrence into a single
/// `attrName = { key = value, ... }` map attribute. `per_block` derives the
/// map key and value expression for each block (run before folding, so it
/// can branch on the block's own attributes — e.g. using the block's
/// `region` attribute as the map key and its `pool_ids` as the value).
pub fn convert_blocks_to_attribute<F>(
    body: &mut Body,
    block_name: &str,
    attr_name: &str,
    per_block: F,
) -> bool
where
    F: Fn(&Block) -> (String, Expression),
{
    let blocks = remove_blocks_by_type(body, block_name);
    if blocks.is_empty() {
        return false;
    }
    let fields: Vec<(String, Expression)> = blocks.iter().map(|b| per_block(b)).collect();
    set_nested_object(body, attr_name, &fields, true);
    true
}

/// Copy `blockName.attr` to the outer body, leaving the block untouched.
/// Used to hoist a nested field (e.g. SRV/MX `data.priority`) to the root.
#[must_use]
pub fn hoist_attribute_from_block(body: &Body, block_name: &str, attr: &str) -> Option<Expression> {
    find_block_by_type(body, block_name).and_then(|b| get_attribute(&b.body, attr)).map(|a| a.value.clone())
}

/// Build `attrName = { k = v, ... }` from pre-tokenized field expressions,
/// using identifier (unquoted) keys.
pub fn create_nested_attribute_from_fields(body: &mut Body, attr_name: &str, fields: &[(String, Expression)]) {
    set_nested_object(body, attr_name, fields, false);
}

/// Collect `names` from the body into a single nested object attribute,
/// removing the originals.
pub fn move_attributes_to_nested_object(body: &mut Body, attr_name: &str, names: &[&str]) {
    let fields: Vec<(String, Expression)> = names
        .iter()
        .filter_map(|name| get_attribute(body, name).map(|a| ((*name).to_string(), a.value.clone())))
        .collect();
    remove_attributes(body, names);
    set_nested_object(body, attr_name, &fields, false);
}

/// Build a file-scope `moved { from = <from>  to = <to> }` relocation block.
#[must_use]
pub fn create_moved_block(from: &str, to: &str) -> Block {
    let src = format!("moved {{\n  from = {from}\n  to = {to}\n}}\n");
    let mut body = parse_body(&src).expect("moved block is always well-formed");
    match body.remove(0) {
        Structure::Block(b) => b,
        Structure::Attribute(_) => unreachable!("moved is always a block"),
    }
}

/// Replace (or insert) `attrName` with an object built from `fields`.
///
/// `quote_keys` controls whether map keys are rendered as quoted strings
/// (`"WNAM" = [...]`, for arbitrary data-derived keys like region names or
/// header names) or bare identifiers (`port = 80`, for fixed schema fields).
fn set_nested_object(body: &mut Body, attr_name: &str, fields: &[(String, Expression)], quote_keys: bool) {
    let expr = tokens_for_object(fields, quote_keys);
    remove_attribute(body, attr_name);
    body.push(Structure::Attribute(Attribute::new(
        hcl_edit::Ident::new(attr_name),
        expr,
    )));
}

/// Parse a standalone expression by wrapping it in a throwaway attribute.
pub(crate) fn expr_from_str(src: &str) -> Expression {
    attribute_from_str("_value", src).value
}

/// Parse a standalone attribute (`name = src`) by round-tripping through the
/// parser, so callers never need to reach for `hcl_edit`'s expression
/// builders directly.
pub(crate) fn attribute_from_str(name: &str, src: &str) -> Attribute {
    let wrapper = format!("{name} = {src}\n");
    let body = parse_body(&wrapper).expect("attribute literal must be valid HCL");
    for structure in body.into_iter() {
        if let Structure::Attribute(attr) = structure {
            return attr;
        }
    }
    unreachable!("wrapper always produces exactly one attribute")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Body {
        parse_body(src).expect("valid test fixture")
    }

    #[test]
    fn rename_attribute_preserves_expression_tokens() {
        let mut body = parse("value = \"192.0.2.1\" # keep me\n");
        assert!(rename_attribute(&mut body, "value", "content"));
        let rendered = body.to_string();
        assert!(rendered.contains("content"));
        assert!(rendered.contains("192.0.2.1"));
        assert!(rendered.contains("keep me"));
    }

    #[test]
    fn ensure_attribute_is_a_noop_when_present() {
        let mut body = parse("ttl = 300\n");
        ensure_attribute(&mut body, "ttl", "1");
        let ttl = get_attribute(&body, "ttl").expect("ttl present");
        assert_eq!(ttl.value.to_string().trim(), "300");
    }

    #[test]
    fn ensure_attribute_sets_default_when_absent() {
        let mut body = parse("name = \"a\"\n");
        ensure_attribute(&mut body, "ttl", "1");
        let ttl = get_attribute(&body, "ttl").expect("ttl inserted");
        assert_eq!(ttl.value.to_string().trim(), "1");
    }

    #[test]
    fn remove_attributes_is_idempotent() {
        let mut body = parse("a = 1\nb = 2\n");
        remove_attributes(&mut body, &["a", "b", "c"]);
        assert!(get_attribute(&body, "a").is_none());
        assert!(get_attribute(&body, "b").is_none());
    }

    #[test]
    fn extract_string_from_attribute_rejects_non_literals() {
        let body = parse("type = \"CAA\"\nother = var.x\n");
        let typ = get_attribute(&body, "type").unwrap();
        assert_eq!(extract_string_from_attribute(typ), Some("CAA".to_string()));
        let other = get_attribute(&body, "other").unwrap();
        assert_eq!(extract_string_from_attribute(other), None);
    }

    #[test]
    fn convert_single_block_to_attribute_collapses_fields() {
        let mut body = parse("data {\n  target = \"mail.example.com\"\n  priority = 10\n}\n");
        assert!(convert_single_block_to_attribute(&mut body, "data", "data"));
        assert!(find_block_by_type(&body, "data").is_none());
        let data = get_attribute(&body, "data").expect("collapsed attribute");
        let rendered = data.value.to_string();
        assert!(rendered.contains("target"));
        assert!(rendered.contains("priority"));
    }

    #[test]
    fn convert_blocks_to_attribute_builds_a_map_from_many_blocks() {
        let mut body = parse(
            "region_pools {\n  region = \"WNAM\"\n  pool_ids = [\"a\", \"b\"]\n}\nregion_pools {\n  region = \"ENAM\"\n  pool_ids = [\"c\"]\n}\n",
        );
        let ok = convert_blocks_to_attribute(&mut body, "region_pools", "region_pools", |block| {
            let region = get_attribute(&block.body, "region")
                .and_then(extract_string_from_attribute)
                .unwrap_or_default();
            let pool_ids = get_attribute(&block.body, "pool_ids").unwrap().value.clone();
            (region, pool_ids)
        });
        assert!(ok);
        assert!(find_blocks_by_type(&body, "region_pools").is_empty());
        let rendered = get_attribute(&body, "region_pools").unwrap().value.to_string();
        assert!(rendered.contains("WNAM"));
        assert!(rendered.contains("ENAM"));
    }

    #[test]
    fn hoist_attribute_from_block_reads_without_mutating() {
        let body = parse("data {\n  priority = 10\n  target = \"mail.example.com\"\n}\n");
        let hoisted = hoist_attribute_from_block(&body, "data", "priority").expect("priority present");
        assert_eq!(hoisted.to_string().trim(), "10");
        assert!(find_block_by_type(&body, "data").is_some());
    }

    #[test]
    fn move_attributes_to_nested_object_removes_originals() {
        let mut body = parse("port = 80\npath = \"/health\"\nmethod = \"GET\"\nunrelated = true\n");
        move_attributes_to_nested_object(&mut body, "http_config", &["port", "path", "method"]);
        assert!(get_attribute(&body, "port").is_none());
        assert!(get_attribute(&body, "path").is_none());
        assert!(get_attribute(&body, "unrelated").is_some());
        let nested = get_attribute(&body, "http_config").unwrap().value.to_string();
        assert!(nested.contains("80"));
        assert!(nested.contains("/health"));
    }

    #[test]
    fn create_moved_block_renders_from_and_to() {
        let block = create_moved_block("cloudflare_record.a", "cloudflare_dns_record.a");
        assert!(block_kind_is(&block, "moved"));
        let rendered = block.to_string();
        assert!(rendered.contains("cloudflare_record.a"));
        assert!(rendered.contains("cloudflare_dns_record.a"));
    }

    #[test]
    fn find_block_by_type_mut_allows_editing_a_nested_block() {
        let mut body = parse("data {\n  priority = 10\n  target = \"mail.example.com\"\n}\n");
        let data = find_block_by_type_mut(&mut body, "data").expect("data block present");
        assert!(remove_attribute(&mut data.body, "priority"));
        assert!(get_attribute(&find_block_by_type(&body, "data").unwrap().body, "priority").is_none());
    }

    #[test]
    fn set_attribute_expr_replaces_an_existing_attribute() {
        let mut body = parse("priority = 5\n");
        set_attribute_expr(&mut body, "priority", expr_from_str("10"));
        assert_eq!(get_attribute(&body, "priority").unwrap().value.to_string().trim(), "10");
    }

    #[test]
    fn rename_resource_type_only_swaps_matching_label() {
        let src = "resource \"cloudflare_record\" \"a\" {\n  type = \"A\"\n}\n";
        let mut body = parse(src);
        if let Structure::Block(block) = body.iter_mut().next().unwrap() {
            assert!(rename_resource_type(block, "cloudflare_record", "cloudflare_dns_record"));
            assert!(!rename_resource_type(block, "cloudflare_record", "other"));
        }
        assert!(body.to_string().contains("cloudflare_dns_record"));
    }
}
