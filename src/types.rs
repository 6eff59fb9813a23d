//! Core types and keyword tables for schema building and validation.

use serde_json::Value;

/// Combinator keywords. `oneOf`/`allOf`/`anyOf` hold arrays, `not` a single node.
pub const COMBINATORS: &[&str] = &["oneOf", "allOf", "anyOf", "not"];

/// Keywords whose presence means the document was not fully dereferenced.
pub const REFERENCE_KEYWORDS: &[&str] = &["$ref", "$dynamicRef", "$recursiveRef"];

/// Definition name used by the list wrapper schema to point at the item schema.
pub const LIST_ITEM_DEFINITION: &str = "item";

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Primitive `type` keyword values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaType {
    Object,
    Array,
    String,
    Number,
    Integer,
    Boolean,
    Null,
}

impl SchemaType {
    /// Parse a `type` keyword value.
    ///
    /// Returns `None` for unknown names.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "object" => Some(SchemaType::Object),
            "array" => Some(SchemaType::Array),
            "string" => Some(SchemaType::String),
            "number" => Some(SchemaType::Number),
            "integer" => Some(SchemaType::Integer),
            "boolean" => Some(SchemaType::Boolean),
            "null" => Some(SchemaType::Null),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaType::Object => "object",
            SchemaType::Array => "array",
            SchemaType::String => "string",
            SchemaType::Number => "number",
            SchemaType::Integer => "integer",
            SchemaType::Boolean => "boolean",
            SchemaType::Null => "null",
        }
    }

    /// Whether `value` already is an instance of this type.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (SchemaType::Object, Value::Object(_))
            | (SchemaType::Array, Value::Array(_))
            | (SchemaType::String, Value::String(_))
            | (SchemaType::Number, Value::Number(_))
            | (SchemaType::Boolean, Value::Bool(_))
            | (SchemaType::Null, Value::Null) => true,
            (SchemaType::Integer, Value::Number(n)) => {
                n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
            }
            _ => false,
        }
    }
}

/// Read the `type` keyword of a node as a list of known types.
///
/// Accepts both the string form and the array form; unknown names are skipped.
pub fn declared_types(node: &serde_json::Map<String, Value>) -> Vec<SchemaType> {
    match node.get("type") {
        Some(Value::String(s)) => SchemaType::parse(s).into_iter().collect(),
        Some(Value::Array(arr)) => arr
            .iter()
            .filter_map(|v| v.as_str().and_then(SchemaType::parse))
            .collect(),
        _ => Vec::new(),
    }
}

/// Options controlling how values are prepared before validation.
///
/// All three are on by default, matching the behavior of a validator
/// configured with type coercion, default population and removal of
/// additional properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorOptions {
    /// Convert scalar values toward the declared `type` when they don't match.
    pub coerce_types: bool,
    /// Fill missing properties from their schema's `default`.
    pub use_defaults: bool,
    /// Drop properties not allowed by `additionalProperties: false`.
    pub remove_additional: bool,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            coerce_types: true,
            use_defaults: true,
            remove_additional: true,
        }
    }
}

impl ValidatorOptions {
    /// Options that leave values untouched (plain validation).
    pub fn strict() -> Self {
        Self {
            coerce_types: false,
            use_defaults: false,
            remove_additional: false,
        }
    }

    pub fn coerce_types(mut self, enabled: bool) -> Self {
        self.coerce_types = enabled;
        self
    }

    pub fn use_defaults(mut self, enabled: bool) -> Self {
        self.use_defaults = enabled;
        self
    }

    pub fn remove_additional(mut self, enabled: bool) -> Self {
        self.remove_additional = enabled;
        self
    }

    /// True when no preparation pass is needed.
    pub(crate) fn is_passthrough(&self) -> bool {
        !(self.coerce_types || self.use_defaults || self.remove_additional)
    }
}
