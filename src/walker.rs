//! Traversal over the structural children of a schema node.
//!
//! Children are visited in a fixed order: `properties` values, `oneOf`,
//! `allOf` and `anyOf` branches, `items`, `not`, and `additionalProperties`
//! when it is a sub-schema. Boolean schemas have nothing to visit and are
//! skipped.
//!
//! [`walk_subschemas`] covers every applicator keyword instead and is used
//! where a check must hold anywhere in the document.

use serde_json::{Map, Value};

const BRANCH_KEYWORDS: &[&str] = &["oneOf", "allOf", "anyOf"];

/// Keywords holding a single sub-schema.
const SINGLE_SUBSCHEMA_KEYWORDS: &[&str] = &[
    "not",
    "if",
    "then",
    "else",
    "contains",
    "propertyNames",
    "additionalProperties",
    "additionalItems",
    "unevaluatedProperties",
    "unevaluatedItems",
    "contentSchema",
];

/// Keywords holding an array of sub-schemas.
const ARRAY_SUBSCHEMA_KEYWORDS: &[&str] = &["oneOf", "allOf", "anyOf", "prefixItems"];

/// Keywords holding a map from names to sub-schemas. Array-valued
/// `dependencies` entries are property lists and are skipped.
const MAP_SUBSCHEMA_KEYWORDS: &[&str] = &[
    "properties",
    "patternProperties",
    "$defs",
    "definitions",
    "dependentSchemas",
    "dependencies",
];

/// Visit `node` and every node reachable from it, depth first.
///
/// The visitor receives the JSON Pointer of each node relative to `node`.
/// The first error returned by the visitor stops the walk.
pub fn walk<E, F>(node: &Map<String, Value>, visit: &mut F) -> Result<(), E>
where
    F: FnMut(&str, &Map<String, Value>) -> Result<(), E>,
{
    walk_at(node, "", visit)
}

fn walk_at<E, F>(node: &Map<String, Value>, path: &str, visit: &mut F) -> Result<(), E>
where
    F: FnMut(&str, &Map<String, Value>) -> Result<(), E>,
{
    visit(path, node)?;

    if let Some(Value::Object(props)) = node.get("properties") {
        for (name, prop) in props {
            if let Value::Object(child) = prop {
                let child_path = format!("{}/properties/{}", path, escape(name));
                walk_at(child, &child_path, visit)?;
            }
        }
    }

    for keyword in BRANCH_KEYWORDS {
        if let Some(Value::Array(branches)) = node.get(*keyword) {
            for (i, branch) in branches.iter().enumerate() {
                if let Value::Object(child) = branch {
                    walk_at(child, &format!("{}/{}/{}", path, keyword, i), visit)?;
                }
            }
        }
    }

    match node.get("items") {
        Some(Value::Object(child)) => walk_at(child, &format!("{}/items", path), visit)?,
        Some(Value::Array(tuple)) => {
            for (i, item) in tuple.iter().enumerate() {
                if let Value::Object(child) = item {
                    walk_at(child, &format!("{}/items/{}", path, i), visit)?;
                }
            }
        }
        _ => {}
    }

    if let Some(Value::Object(child)) = node.get("not") {
        walk_at(child, &format!("{}/not", path), visit)?;
    }

    if let Some(Value::Object(child)) = node.get("additionalProperties") {
        walk_at(child, &format!("{}/additionalProperties", path), visit)?;
    }

    Ok(())
}

/// Mutating counterpart of [`walk`].
///
/// The visitor runs on a node before its children are visited, so changes it
/// makes to child keywords are seen by the rest of the walk.
pub fn walk_mut<F>(node: &mut Map<String, Value>, visit: &mut F)
where
    F: FnMut(&mut Map<String, Value>),
{
    visit(node);

    if let Some(Value::Object(props)) = node.get_mut("properties") {
        for prop in props.values_mut() {
            if let Value::Object(child) = prop {
                walk_mut(child, visit);
            }
        }
    }

    for keyword in BRANCH_KEYWORDS {
        if let Some(Value::Array(branches)) = node.get_mut(*keyword) {
            for branch in branches.iter_mut() {
                if let Value::Object(child) = branch {
                    walk_mut(child, visit);
                }
            }
        }
    }

    match node.get_mut("items") {
        Some(Value::Object(child)) => walk_mut(child, visit),
        Some(Value::Array(tuple)) => {
            for item in tuple.iter_mut() {
                if let Value::Object(child) = item {
                    walk_mut(child, visit);
                }
            }
        }
        _ => {}
    }

    if let Some(Value::Object(child)) = node.get_mut("not") {
        walk_mut(child, visit);
    }

    if let Some(Value::Object(child)) = node.get_mut("additionalProperties") {
        walk_mut(child, visit);
    }
}

/// Visit `node` and every sub-schema beneath it, under any keyword that holds
/// one.
///
/// Unlike [`walk`], this also descends into `patternProperties`,
/// `prefixItems`, `if`/`then`/`else`, `$defs` and the other applicator
/// keywords. Value-bearing keywords (`enum`, `const`, `default`, `examples`)
/// are never entered.
pub(crate) fn walk_subschemas<E, F>(node: &Map<String, Value>, visit: &mut F) -> Result<(), E>
where
    F: FnMut(&str, &Map<String, Value>) -> Result<(), E>,
{
    walk_subschemas_at(node, "", visit)
}

fn walk_subschemas_at<E, F>(node: &Map<String, Value>, path: &str, visit: &mut F) -> Result<(), E>
where
    F: FnMut(&str, &Map<String, Value>) -> Result<(), E>,
{
    visit(path, node)?;

    for keyword in MAP_SUBSCHEMA_KEYWORDS {
        if let Some(Value::Object(entries)) = node.get(*keyword) {
            for (name, entry) in entries {
                if let Value::Object(child) = entry {
                    let child_path = format!("{}/{}/{}", path, escape(keyword), escape(name));
                    walk_subschemas_at(child, &child_path, visit)?;
                }
            }
        }
    }

    for keyword in ARRAY_SUBSCHEMA_KEYWORDS {
        if let Some(Value::Array(branches)) = node.get(*keyword) {
            for (i, branch) in branches.iter().enumerate() {
                if let Value::Object(child) = branch {
                    walk_subschemas_at(child, &format!("{}/{}/{}", path, keyword, i), visit)?;
                }
            }
        }
    }

    match node.get("items") {
        Some(Value::Object(child)) => {
            walk_subschemas_at(child, &format!("{}/items", path), visit)?
        }
        Some(Value::Array(tuple)) => {
            for (i, item) in tuple.iter().enumerate() {
                if let Value::Object(child) = item {
                    walk_subschemas_at(child, &format!("{}/items/{}", path, i), visit)?;
                }
            }
        }
        _ => {}
    }

    for keyword in SINGLE_SUBSCHEMA_KEYWORDS {
        if let Some(Value::Object(child)) = node.get(*keyword) {
            walk_subschemas_at(child, &format!("{}/{}", path, keyword), visit)?;
        }
    }

    Ok(())
}

/// Escape a property name for use in a JSON Pointer (~ → ~0, / → ~1).
fn escape(name: &str) -> String {
    name.replace('~', "~0").replace('/', "~1")
}
