//! The schema builder: an exclusively owned, mutable JSON Schema node.
//!
//! Construction goes through a primitive factory ([`SchemaBuilder::object`],
//! [`SchemaBuilder::string`], ...), a combinator ([`SchemaBuilder::one_of`],
//! ...), or [`SchemaBuilder::from_schema`] for an already dereferenced
//! document. Property-level operations live in `algebra.rs`.

use std::sync::OnceLock;

use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::warn;

use crate::classify;
use crate::error::{BuilderError, ValidateError};
use crate::types::{json_type_name, ValidatorOptions, REFERENCE_KEYWORDS};
use crate::validator::CompiledValidator;
use crate::walker::walk_subschemas;

/// Builder over a single schema document.
///
/// Operations mutate the document in place and return `&mut Self` so they can
/// be chained with `?`. Use [`Clone`] to branch a schema; clones never share
/// state.
///
/// Validators are compiled lazily on first use of [`validate`](Self::validate)
/// or [`validate_list`](Self::validate_list) and cached for the lifetime of
/// the builder. Mutating the schema afterwards does not recompile them.
pub struct SchemaBuilder {
    pub(crate) schema: Map<String, Value>,
    options: ValidatorOptions,
    single: OnceLock<CompiledValidator>,
    list: OnceLock<CompiledValidator>,
}

impl SchemaBuilder {
    fn wrap(schema: Map<String, Value>) -> Self {
        Self {
            schema,
            options: ValidatorOptions::default(),
            single: OnceLock::new(),
            list: OnceLock::new(),
        }
    }

    fn typed(type_name: &str) -> Self {
        let mut schema = Map::new();
        schema.insert("type".to_string(), Value::String(type_name.to_string()));
        Self::wrap(schema)
    }

    /// Wrap an already dereferenced schema document.
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::NotAnObject` for anything other than a JSON
    /// object, and `BuilderError::UnresolvedReference` if any node reachable
    /// from the root still carries a `$ref` style marker.
    pub fn from_schema(schema: Value) -> Result<Self, BuilderError> {
        match schema {
            Value::Object(map) => {
                ensure_dereferenced(&map)?;
                Ok(Self::wrap(map))
            }
            other => Err(BuilderError::NotAnObject {
                actual: json_type_name(&other).to_string(),
            }),
        }
    }

    /// Empty object schema that admits no additional properties.
    pub fn object() -> Self {
        let mut builder = Self::typed("object");
        builder
            .schema
            .insert("properties".to_string(), Value::Object(Map::new()));
        builder
            .schema
            .insert("additionalProperties".to_string(), Value::Bool(false));
        builder
    }

    pub fn string() -> Self {
        Self::typed("string")
    }

    pub fn number() -> Self {
        Self::typed("number")
    }

    pub fn integer() -> Self {
        Self::typed("integer")
    }

    pub fn boolean() -> Self {
        Self::typed("boolean")
    }

    pub fn null() -> Self {
        Self::typed("null")
    }

    /// Schema accepting exactly one of the listed values.
    pub fn enum_of<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        let mut schema = Map::new();
        schema.insert("enum".to_string(), Value::Array(values));
        Self::wrap(schema)
    }

    /// Schema accepting exactly `value`.
    pub fn constant(value: impl Into<Value>) -> Self {
        let mut schema = Map::new();
        schema.insert("const".to_string(), value.into());
        Self::wrap(schema)
    }

    /// Array whose elements all match `items`.
    ///
    /// Children are builders, so they are already known to be dereferenced.
    /// Wrap raw JSON with [`from_schema`](Self::from_schema) first.
    pub fn array(items: SchemaBuilder) -> Self {
        let mut builder = Self::typed("array");
        builder.schema.insert("items".to_string(), items.into_value());
        builder
    }

    /// Exactly one of `schemas` must match.
    pub fn one_of<I>(schemas: I) -> Self
    where
        I: IntoIterator<Item = SchemaBuilder>,
    {
        Self::combinator("oneOf", schemas)
    }

    /// Every one of `schemas` must match.
    pub fn all_of<I>(schemas: I) -> Self
    where
        I: IntoIterator<Item = SchemaBuilder>,
    {
        Self::combinator("allOf", schemas)
    }

    /// At least one of `schemas` must match.
    pub fn any_of<I>(schemas: I) -> Self
    where
        I: IntoIterator<Item = SchemaBuilder>,
    {
        Self::combinator("anyOf", schemas)
    }

    /// `schema` must not match.
    pub fn not(schema: SchemaBuilder) -> Self {
        let mut map = Map::new();
        map.insert("not".to_string(), schema.into_value());
        Self::wrap(map)
    }

    fn combinator<I>(keyword: &str, schemas: I) -> Self
    where
        I: IntoIterator<Item = SchemaBuilder>,
    {
        let branches: Vec<Value> = schemas.into_iter().map(SchemaBuilder::into_value).collect();
        let mut map = Map::new();
        map.insert(keyword.to_string(), Value::Array(branches));
        Self::wrap(map)
    }

    /// Set the `title` annotation.
    pub fn title(&mut self, title: impl Into<String>) -> &mut Self {
        self.schema
            .insert("title".to_string(), Value::String(title.into()));
        self
    }

    /// Set the `description` annotation.
    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.schema
            .insert("description".to_string(), Value::String(description.into()));
        self
    }

    /// Use `options` for value preparation. Drops any compiled validators.
    pub fn with_validator_options(mut self, options: ValidatorOptions) -> Self {
        self.options = options;
        self.single = OnceLock::new();
        self.list = OnceLock::new();
        self
    }

    pub fn validator_options(&self) -> ValidatorOptions {
        self.options
    }

    /// Deep copy with the top-level keys of `overlay` written over the copy.
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::UnresolvedReference` if the overlay introduces a
    /// reference marker.
    pub fn clone_with(&self, overlay: Map<String, Value>) -> Result<Self, BuilderError> {
        let mut schema = self.schema.clone();
        for (key, value) in overlay {
            schema.insert(key, value);
        }
        ensure_dereferenced(&schema)?;
        Ok(Self::wrap(schema).with_validator_options(self.options))
    }

    // --- Structural predicates ---

    pub fn is_object_schema(&self) -> bool {
        classify::is_object_schema(&self.schema)
    }

    pub fn has_additional_properties(&self) -> bool {
        classify::has_additional_properties(&self.schema)
    }

    pub fn has_combinators(&self) -> bool {
        classify::has_combinators(&self.schema)
    }

    pub fn is_simple_object_schema(&self) -> bool {
        classify::is_simple_object_schema(&self.schema)
    }

    // --- Accessors ---

    /// Declared property names, in declaration order.
    pub fn property_names(&self) -> Vec<&str> {
        self.schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| props.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Schema of a declared property.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.schema.get("properties")?.get(name)
    }

    /// Names listed in `required`.
    pub fn required_names(&self) -> Vec<&str> {
        self.schema
            .get("required")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required_names().contains(&name)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.schema
    }

    /// Copy of the schema document.
    pub fn to_value(&self) -> Value {
        Value::Object(self.schema.clone())
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.schema)
    }

    // --- Validation ---

    /// Validate one value, returning it after coercion, default population
    /// and removal of disallowed properties.
    ///
    /// # Errors
    ///
    /// Returns `ValidateError::Invalid` with every violation, or
    /// `ValidateError::InvalidSchema` if the schema cannot be compiled.
    pub fn validate(&self, value: Value) -> Result<Value, ValidateError> {
        self.single_validator()?.validate(value)
    }

    /// Validate a non-empty list of values, each against this schema.
    ///
    /// An empty list is always rejected.
    pub fn validate_list(&self, values: Vec<Value>) -> Result<Vec<Value>, ValidateError> {
        self.list_validator()?.validate_list(values)
    }

    /// [`validate`](Self::validate), then deserialize into `T`.
    ///
    /// `T` is declared by the caller; nothing ties it to the schema at compile
    /// time, so a mismatch is reported as `ValidateError::Deserialize`.
    pub fn validate_as<T: DeserializeOwned>(&self, value: Value) -> Result<T, ValidateError> {
        let value = self.validate(value)?;
        serde_json::from_value(value).map_err(|source| ValidateError::Deserialize { source })
    }

    /// [`validate_list`](Self::validate_list), then deserialize each element into `T`.
    pub fn validate_list_as<T: DeserializeOwned>(
        &self,
        values: Vec<Value>,
    ) -> Result<Vec<T>, ValidateError> {
        self.validate_list(values)?
            .into_iter()
            .map(|v| serde_json::from_value(v).map_err(|source| ValidateError::Deserialize { source }))
            .collect()
    }

    fn single_validator(&self) -> Result<&CompiledValidator, ValidateError> {
        if let Some(validator) = self.single.get() {
            return Ok(validator);
        }
        let compiled = CompiledValidator::single(&self.to_value(), self.options)?;
        Ok(self.single.get_or_init(|| compiled))
    }

    fn list_validator(&self) -> Result<&CompiledValidator, ValidateError> {
        if let Some(validator) = self.list.get() {
            return Ok(validator);
        }
        let compiled = CompiledValidator::list(&self.to_value(), self.options)?;
        Ok(self.list.get_or_init(|| compiled))
    }
}

impl Clone for SchemaBuilder {
    /// Deep copy of the schema. Compiled validators are not carried over.
    fn clone(&self) -> Self {
        Self::wrap(self.schema.clone()).with_validator_options(self.options)
    }
}

impl std::fmt::Debug for SchemaBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaBuilder")
            .field("schema", &self.schema)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Display for SchemaBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = serde_json::to_string(&self.schema).map_err(|_| std::fmt::Error)?;
        f.write_str(&text)
    }
}

impl PartialEq for SchemaBuilder {
    fn eq(&self, other: &Self) -> bool {
        self.schema == other.schema
    }
}

impl Serialize for SchemaBuilder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.schema.serialize(serializer)
    }
}

impl From<SchemaBuilder> for Value {
    fn from(builder: SchemaBuilder) -> Self {
        builder.into_value()
    }
}

impl From<&SchemaBuilder> for Value {
    fn from(builder: &SchemaBuilder) -> Self {
        builder.to_value()
    }
}

impl TryFrom<Value> for SchemaBuilder {
    type Error = BuilderError;

    fn try_from(schema: Value) -> Result<Self, Self::Error> {
        Self::from_schema(schema)
    }
}

/// Check a child schema handed to a builder operation: booleans pass, objects
/// must be dereferenced, anything else is not a schema.
pub(crate) fn ensure_schema(schema: &Value) -> Result<(), BuilderError> {
    match schema {
        Value::Bool(_) => Ok(()),
        Value::Object(node) => ensure_dereferenced(node),
        other => Err(BuilderError::NotASchema {
            actual: json_type_name(other).to_string(),
        }),
    }
}

/// Fail on the first reference marker anywhere beneath `node`.
pub(crate) fn ensure_dereferenced(node: &Map<String, Value>) -> Result<(), BuilderError> {
    walk_subschemas(node, &mut |path: &str, child: &Map<String, Value>| {
        match REFERENCE_KEYWORDS.iter().find(|k| child.contains_key(**k)) {
            Some(keyword) => {
                let path = format!("{}/{}", path, keyword);
                warn!(%path, "Rejected schema with unresolved reference");
                Err(BuilderError::UnresolvedReference { path })
            }
            None => Ok(()),
        }
    })
}
