//! Structural predicates over a schema node.
//!
//! All predicates read the current state of the node. Nothing is cached, since
//! any algebra operation may change the answer.

use serde_json::{Map, Value};

use crate::types::{declared_types, SchemaType, COMBINATORS};

/// Whether the node describes an object.
///
/// True when `type` names `"object"`, or when there is no `type` at all and
/// the node declares `properties`.
pub fn is_object_schema(node: &Map<String, Value>) -> bool {
    if node.contains_key("type") {
        declared_types(node).contains(&SchemaType::Object)
    } else {
        node.contains_key("properties")
    }
}

/// Whether properties beyond `properties` are admitted.
///
/// Only an explicit `additionalProperties: false` disables them.
pub fn has_additional_properties(node: &Map<String, Value>) -> bool {
    !matches!(node.get("additionalProperties"), Some(Value::Bool(false)))
}

/// Whether any of `oneOf`, `allOf`, `anyOf` or `not` is present.
pub fn has_combinators(node: &Map<String, Value>) -> bool {
    COMBINATORS.iter().any(|k| node.contains_key(*k))
}

/// Object schema with additional properties disabled and no combinators.
pub fn is_simple_object_schema(node: &Map<String, Value>) -> bool {
    is_object_schema(node) && !has_additional_properties(node) && !has_combinators(node)
}
