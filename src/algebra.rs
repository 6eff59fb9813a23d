//! Property-level operations on a [`SchemaBuilder`].
//!
//! Each operation checks its precondition against the current schema, then
//! verifies every named property before the first write. A failing call
//! leaves the schema exactly as it was.
//!
//! | Operation | Precondition |
//! |-----------|--------------|
//! | `add_property`, `add_optional_property` | object |
//! | `add_additional_properties` | object, additional properties disabled |
//! | `pick_properties` | object, no combinators |
//! | `pick_additional_properties` | object, additional properties enabled, no combinators |
//! | everything else that edits properties | simple object |
//! | `to_optionals`, `to_deep_optionals` | none |

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::builder::{ensure_schema, SchemaBuilder};
use crate::error::BuilderError;
use crate::walker::walk_mut;

impl SchemaBuilder {
    /// Add a required property.
    ///
    /// # Errors
    ///
    /// Fails if the schema is not an object schema or `name` already exists.
    pub fn add_property(
        &mut self,
        name: &str,
        schema: impl Into<Value>,
    ) -> Result<&mut Self, BuilderError> {
        self.insert_property("add_property", name, schema.into(), true)
    }

    /// Add a property without marking it required.
    pub fn add_optional_property(
        &mut self,
        name: &str,
        schema: impl Into<Value>,
    ) -> Result<&mut Self, BuilderError> {
        self.insert_property("add_optional_property", name, schema.into(), false)
    }

    /// Allow properties beyond the declared ones, optionally constrained by
    /// `schema`.
    ///
    /// # Errors
    ///
    /// Fails if the schema is not an object schema or already admits
    /// additional properties.
    pub fn add_additional_properties(
        &mut self,
        schema: Option<Value>,
    ) -> Result<&mut Self, BuilderError> {
        self.require_object("add_additional_properties")?;
        if self.has_additional_properties() {
            return Err(BuilderError::AdditionalPropertiesEnabled);
        }
        let schema = schema.unwrap_or(Value::Bool(true));
        ensure_schema(&schema)?;
        self.schema
            .insert("additionalProperties".to_string(), schema);
        Ok(self)
    }

    /// Remove a property and its `required` entry.
    pub fn remove_property(&mut self, name: &str) -> Result<&mut Self, BuilderError> {
        self.require_simple("remove_property")?;
        self.require_properties(&[name])?;
        properties_mut(&mut self.schema).shift_remove(name);
        self.unmark_required(name);
        debug!(property = name, "Removed property");
        Ok(self)
    }

    /// Make the listed properties optional and every other property required.
    ///
    /// Names that are not declared are ignored.
    pub fn set_optional_properties(&mut self, names: &[&str]) -> Result<&mut Self, BuilderError> {
        self.require_simple("set_optional_properties")?;
        let required = self
            .property_names()
            .into_iter()
            .filter(|p| !names.contains(p))
            .map(String::from)
            .collect();
        self.write_required(required);
        Ok(self)
    }

    /// Add the listed properties to `required`.
    ///
    /// # Errors
    ///
    /// Fails with `PropertyMissing` if a name is not declared.
    pub fn set_required_properties(&mut self, names: &[&str]) -> Result<&mut Self, BuilderError> {
        self.require_simple("set_required_properties")?;
        self.require_properties(names)?;
        for name in names {
            self.mark_required(name);
        }
        Ok(self)
    }

    /// Drop `required` from the top level.
    pub fn to_optionals(&mut self) -> &mut Self {
        self.schema.shift_remove("required");
        self
    }

    /// Drop `required` from every node in the tree.
    ///
    /// Reaches through properties, combinator branches, items, `not` and
    /// sub-schema additional properties. There is no way back.
    pub fn to_deep_optionals(&mut self) -> &mut Self {
        walk_mut(&mut self.schema, &mut |node: &mut Map<String, Value>| {
            node.shift_remove("required");
        });
        self
    }

    /// Rename a property, making the new name required.
    ///
    /// Renaming a property that does not exist does nothing.
    ///
    /// # Errors
    ///
    /// Fails if the schema is not a simple object schema or `new` already exists.
    pub fn rename_property(&mut self, old: &str, new: &str) -> Result<&mut Self, BuilderError> {
        self.rename("rename_property", old, new, true)
    }

    /// Rename a property, making the new name optional.
    pub fn rename_optional_property(
        &mut self,
        old: &str,
        new: &str,
    ) -> Result<&mut Self, BuilderError> {
        self.rename("rename_optional_property", old, new, false)
    }

    /// Keep exactly the listed properties, in the listed order.
    ///
    /// `required` is filtered to the survivors. `additionalProperties` is not
    /// touched.
    ///
    /// # Errors
    ///
    /// Fails for a non-object schema, a schema with combinators, or a name that
    /// is not declared.
    pub fn pick_properties(&mut self, names: &[&str]) -> Result<&mut Self, BuilderError> {
        self.require_object("pick_properties")?;
        self.require_no_combinators("pick_properties")?;
        self.require_properties(names)?;
        self.pick(names);
        Ok(self)
    }

    /// Pick properties on a schema that admits additional properties, then
    /// decide what happens to them.
    ///
    /// - `None`: additional properties are disabled.
    /// - `Some(&[])`: the previous `additionalProperties` is kept (`true` if
    ///   it was unset).
    /// - `Some(extras)`: each extra name becomes a required property typed by
    ///   the previous `additionalProperties` sub-schema, or unconstrained when
    ///   it was `true` or unset. Additional properties are then disabled.
    ///
    /// # Errors
    ///
    /// Fails unless the schema is an object schema admitting additional
    /// properties without combinators, when a picked name is not declared, or
    /// when an extra name collides with a picked one.
    pub fn pick_additional_properties(
        &mut self,
        names: &[&str],
        keep_additional: Option<&[&str]>,
    ) -> Result<&mut Self, BuilderError> {
        const OP: &str = "pick_additional_properties";
        self.require_object(OP)?;
        if !self.has_additional_properties() {
            return Err(BuilderError::AdditionalPropertiesDisabled { operation: OP });
        }
        self.require_no_combinators(OP)?;
        self.require_properties(names)?;
        if let Some(extra) = keep_additional
            .unwrap_or_default()
            .iter()
            .find(|e| names.contains(e))
        {
            return Err(BuilderError::PropertyExists {
                name: extra.to_string(),
            });
        }

        let previous = self.schema.get("additionalProperties").cloned();
        self.pick(names);

        let additional = match keep_additional {
            None => Value::Bool(false),
            Some([]) => previous.unwrap_or(Value::Bool(true)),
            Some(extras) => {
                let extra_schema = match previous {
                    Some(schema @ Value::Object(_)) => schema,
                    _ => json!({}),
                };
                let props = properties_mut(&mut self.schema);
                for name in extras {
                    props.insert(name.to_string(), extra_schema.clone());
                }
                for name in extras {
                    self.mark_required(name);
                }
                Value::Bool(false)
            }
        };
        self.schema
            .insert("additionalProperties".to_string(), additional);
        Ok(self)
    }

    /// Remove the listed properties. Names that are not declared are ignored.
    pub fn omit_properties(&mut self, names: &[&str]) -> Result<&mut Self, BuilderError> {
        self.require_simple("omit_properties")?;
        let keep: Vec<String> = self
            .property_names()
            .into_iter()
            .filter(|p| !names.contains(p))
            .map(String::from)
            .collect();
        let keep: Vec<&str> = keep.iter().map(String::as_str).collect();
        self.pick(&keep);
        Ok(self)
    }

    /// Let each listed property also accept `alternative`.
    ///
    /// The property schema becomes `{"oneOf": [original, alternative]}`.
    pub fn transform_properties(
        &mut self,
        alternative: impl Into<Value>,
        names: &[&str],
    ) -> Result<&mut Self, BuilderError> {
        self.require_simple("transform_properties")?;
        self.require_properties(names)?;
        let alternative = alternative.into();
        ensure_schema(&alternative)?;
        let props = properties_mut(&mut self.schema);
        for name in dedup(names) {
            if let Some(slot) = props.get_mut(name) {
                let original = slot.take();
                *slot = json!({ "oneOf": [original, alternative.clone()] });
            }
        }
        Ok(self)
    }

    /// Let each listed property (all properties when `None`) also accept an
    /// array of its original schema.
    pub fn transform_properties_to_array(
        &mut self,
        names: Option<&[&str]>,
    ) -> Result<&mut Self, BuilderError> {
        self.require_simple("transform_properties_to_array")?;
        let names: Vec<String> = match names {
            Some(names) => {
                self.require_properties(names)?;
                dedup(names).into_iter().map(String::from).collect()
            }
            None => self.property_names().into_iter().map(String::from).collect(),
        };
        let props = properties_mut(&mut self.schema);
        for name in &names {
            if let Some(slot) = props.get_mut(name) {
                let original = slot.take();
                *slot = json!({
                    "oneOf": [original.clone(), { "type": "array", "items": original }]
                });
            }
        }
        Ok(self)
    }

    /// Bring in the properties of `other`.
    ///
    /// New properties keep their required-ness from `other`. A property
    /// declared on both sides accepts either schema (`anyOf`) and becomes
    /// required.
    pub fn merge_properties(&mut self, other: &SchemaBuilder) -> Result<&mut Self, BuilderError> {
        self.require_simple("merge_properties")?;
        for (name, theirs) in other_properties(other) {
            let props = properties_mut(&mut self.schema);
            match props.get_mut(&name) {
                Some(slot) => {
                    let mine = slot.take();
                    *slot = json!({ "anyOf": [mine, theirs] });
                    self.mark_required(&name);
                }
                None => {
                    props.insert(name.clone(), theirs);
                    if other.is_required(&name) {
                        self.mark_required(&name);
                    }
                }
            }
        }
        debug!(count = other.property_names().len(), "Merged properties");
        Ok(self)
    }

    /// Bring in the properties of `other`, replacing any declared on both
    /// sides. Required-ness always follows `other`.
    pub fn overwrite_properties(
        &mut self,
        other: &SchemaBuilder,
    ) -> Result<&mut Self, BuilderError> {
        self.require_simple("overwrite_properties")?;
        for (name, theirs) in other_properties(other) {
            properties_mut(&mut self.schema).insert(name.clone(), theirs);
            if other.is_required(&name) {
                self.mark_required(&name);
            } else {
                self.unmark_required(&name);
            }
        }
        debug!(count = other.property_names().len(), "Overwrote properties");
        Ok(self)
    }

    // --- Internal helpers ---

    fn insert_property(
        &mut self,
        operation: &'static str,
        name: &str,
        schema: Value,
        required: bool,
    ) -> Result<&mut Self, BuilderError> {
        self.require_object(operation)?;
        if self.property(name).is_some() {
            return Err(BuilderError::PropertyExists {
                name: name.to_string(),
            });
        }
        ensure_schema(&schema)?;
        properties_mut(&mut self.schema).insert(name.to_string(), schema);
        if required {
            self.mark_required(name);
        }
        debug!(property = name, required, "Added property");
        Ok(self)
    }

    fn rename(
        &mut self,
        operation: &'static str,
        old: &str,
        new: &str,
        required: bool,
    ) -> Result<&mut Self, BuilderError> {
        self.require_simple(operation)?;
        if self.property(new).is_some() {
            return Err(BuilderError::PropertyExists {
                name: new.to_string(),
            });
        }
        if self.property(old).is_none() {
            return Ok(self);
        }

        let props = properties_mut(&mut self.schema);
        *props = std::mem::take(props)
            .into_iter()
            .map(|(k, v)| if k == old { (new.to_string(), v) } else { (k, v) })
            .collect();

        let mut names = self.required_list();
        names.retain(|n| n != new);
        match names.iter().position(|n| n == old) {
            Some(i) if required => names[i] = new.to_string(),
            Some(i) => {
                names.remove(i);
            }
            None if required => names.push(new.to_string()),
            None => {}
        }
        self.write_required(names);
        debug!(from = old, to = new, required, "Renamed property");
        Ok(self)
    }

    /// Replace `properties` with exactly `names`. Names must exist.
    fn pick(&mut self, names: &[&str]) {
        let props = properties_mut(&mut self.schema);
        let mut current = std::mem::take(props);
        for name in names {
            if let Some(schema) = current.shift_remove(*name) {
                props.insert(name.to_string(), schema);
            }
        }

        let mut required = self.required_list();
        required.retain(|r| names.contains(&r.as_str()));
        self.write_required(required);
    }

    fn require_object(&self, operation: &'static str) -> Result<(), BuilderError> {
        if self.is_object_schema() {
            Ok(())
        } else {
            Err(BuilderError::NotObjectSchema { operation })
        }
    }

    fn require_no_combinators(&self, operation: &'static str) -> Result<(), BuilderError> {
        if self.has_combinators() {
            Err(BuilderError::HasCombinators { operation })
        } else {
            Ok(())
        }
    }

    fn require_simple(&self, operation: &'static str) -> Result<(), BuilderError> {
        if self.is_simple_object_schema() {
            Ok(())
        } else {
            Err(BuilderError::NotSimpleObjectSchema { operation })
        }
    }

    fn require_properties(&self, names: &[&str]) -> Result<(), BuilderError> {
        match names.iter().find(|n| self.property(n).is_none()) {
            Some(missing) => Err(BuilderError::PropertyMissing {
                name: missing.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn required_list(&self) -> Vec<String> {
        self.required_names().into_iter().map(String::from).collect()
    }

    /// Store `required`, removing the keyword when the list is empty.
    fn write_required(&mut self, names: Vec<String>) {
        if names.is_empty() {
            self.schema.shift_remove("required");
        } else {
            let names = names.into_iter().map(Value::String).collect();
            self.schema
                .insert("required".to_string(), Value::Array(names));
        }
    }

    fn mark_required(&mut self, name: &str) {
        let mut names = self.required_list();
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
            self.write_required(names);
        }
    }

    fn unmark_required(&mut self, name: &str) {
        let mut names = self.required_list();
        let before = names.len();
        names.retain(|n| n != name);
        if names.len() != before {
            self.write_required(names);
        }
    }
}

/// The `properties` map of a node, created empty if missing or malformed.
fn properties_mut(schema: &mut Map<String, Value>) -> &mut Map<String, Value> {
    let slot = schema
        .entry("properties")
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(props) => props,
        _ => unreachable!("properties slot was just set to an object"),
    }
}

/// `names` without repeats, first occurrence wins.
fn dedup<'a>(names: &[&'a str]) -> Vec<&'a str> {
    let mut unique: Vec<&'a str> = Vec::with_capacity(names.len());
    for &name in names {
        if !unique.contains(&name) {
            unique.push(name);
        }
    }
    unique
}

fn other_properties(other: &SchemaBuilder) -> Vec<(String, Value)> {
    other
        .as_map()
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| props.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> SchemaBuilder {
        let mut builder = SchemaBuilder::object();
        builder
            .add_property("name", SchemaBuilder::string())
            .unwrap()
            .add_property("age", SchemaBuilder::integer())
            .unwrap()
            .add_optional_property("email", SchemaBuilder::string())
            .unwrap();
        builder
    }

    #[test]
    fn add_property_tracks_required() {
        let builder = person();
        assert_eq!(builder.property_names(), vec!["name", "age", "email"]);
        assert_eq!(builder.required_names(), vec!["name", "age"]);
    }

    #[test]
    fn add_property_rejects_duplicates() {
        let mut builder = person();
        let err = builder.add_property("name", SchemaBuilder::number()).unwrap_err();
        assert!(matches!(err, BuilderError::PropertyExists { name } if name == "name"));
        assert_eq!(builder.property("name"), Some(&json!({ "type": "string" })));
    }

    #[test]
    fn add_property_works_on_open_objects() {
        let mut builder = SchemaBuilder::from_schema(json!({ "type": "object" })).unwrap();
        builder.add_property("a", SchemaBuilder::string()).unwrap();
        assert_eq!(builder.required_names(), vec!["a"]);

        let mut builder = SchemaBuilder::string();
        assert!(matches!(
            builder.add_property("a", SchemaBuilder::string()),
            Err(BuilderError::NotObjectSchema { .. })
        ));
    }

    #[test]
    fn add_property_rejects_reference_children() {
        let mut builder = SchemaBuilder::object();
        assert!(matches!(
            builder.add_property("a", json!({ "$ref": "#/$defs/a" })),
            Err(BuilderError::UnresolvedReference { .. })
        ));
        assert!(builder.property_names().is_empty());
    }

    #[test]
    fn add_property_rejects_non_schema_values() {
        let mut builder = SchemaBuilder::object();
        for value in [json!(5), json!("string"), json!([{}]), json!(null)] {
            assert!(matches!(
                builder.add_property("a", value),
                Err(BuilderError::NotASchema { .. })
            ));
        }
        assert!(matches!(
            builder.add_additional_properties(Some(json!(1))),
            Err(BuilderError::NotASchema { .. })
        ));
        assert_eq!(builder, SchemaBuilder::object());

        builder.add_optional_property("anything", json!(true)).unwrap();
        assert_eq!(builder.property("anything"), Some(&json!(true)));
    }

    #[test]
    fn add_additional_properties_only_once() {
        let mut builder = SchemaBuilder::object();
        builder
            .add_additional_properties(Some(json!({ "type": "number" })))
            .unwrap();
        assert_eq!(builder.as_map()["additionalProperties"], json!({ "type": "number" }));
        assert!(!builder.is_simple_object_schema());
        assert!(matches!(
            builder.add_additional_properties(None),
            Err(BuilderError::AdditionalPropertiesEnabled)
        ));

        let mut builder = SchemaBuilder::object();
        builder.add_additional_properties(None).unwrap();
        assert_eq!(builder.as_map()["additionalProperties"], json!(true));
    }

    #[test]
    fn remove_property_drops_required_entry() {
        let mut builder = person();
        builder.remove_property("age").unwrap();
        assert_eq!(builder.property_names(), vec!["name", "email"]);
        assert_eq!(builder.required_names(), vec!["name"]);
        assert!(matches!(
            builder.remove_property("age"),
            Err(BuilderError::PropertyMissing { .. })
        ));
    }

    #[test]
    fn set_optional_makes_the_rest_required() {
        let mut builder = person();
        builder.set_optional_properties(&["name"]).unwrap();
        assert_eq!(builder.required_names(), vec!["age", "email"]);

        builder
            .set_optional_properties(&["name", "age", "email"])
            .unwrap();
        assert!(!builder.as_map().contains_key("required"));
    }

    #[test]
    fn set_required_is_a_union() {
        let mut builder = person();
        builder.set_required_properties(&["email", "name"]).unwrap();
        assert_eq!(builder.required_names(), vec!["name", "age", "email"]);

        assert!(matches!(
            builder.set_required_properties(&["missing"]),
            Err(BuilderError::PropertyMissing { name }) if name == "missing"
        ));
    }

    #[test]
    fn to_optionals_is_shallow() {
        let mut builder = person();
        let mut address = SchemaBuilder::object();
        address.add_property("city", SchemaBuilder::string()).unwrap();
        builder.add_property("address", address).unwrap();

        builder.to_optionals();
        assert!(builder.required_names().is_empty());
        assert_eq!(builder.property("address").unwrap()["required"], json!(["city"]));
    }

    #[test]
    fn to_deep_optionals_ignores_combinators() {
        let mut builder = SchemaBuilder::from_schema(json!({
            "type": "object",
            "required": ["a"],
            "properties": {
                "a": { "type": "object", "required": ["b"], "properties": { "b": {} } }
            },
            "anyOf": [{ "required": ["a"] }]
        }))
        .unwrap();
        builder.to_deep_optionals();
        assert!(!builder.to_string().contains("required"));
    }

    #[test]
    fn rename_keeps_position() {
        let mut builder = person();
        builder.rename_property("age", "years").unwrap();
        assert_eq!(builder.property_names(), vec!["name", "years", "email"]);
        assert_eq!(builder.required_names(), vec!["name", "years"]);
    }

    #[test]
    fn rename_required_variant_requires_new_name() {
        let mut builder = person();
        builder.rename_property("email", "mail").unwrap();
        assert!(builder.is_required("mail"));
    }

    #[test]
    fn rename_optional_variant_drops_required() {
        let mut builder = person();
        builder.rename_optional_property("name", "full_name").unwrap();
        assert!(!builder.is_required("full_name"));
        assert!(!builder.is_required("name"));
        assert_eq!(builder.required_names(), vec!["age"]);
    }

    #[test]
    fn rename_missing_is_a_no_op() {
        let mut builder = person();
        let before = builder.to_value();
        builder.rename_property("nope", "other").unwrap();
        assert_eq!(builder.to_value(), before);
    }

    #[test]
    fn rename_onto_existing_fails() {
        let mut builder = person();
        assert!(matches!(
            builder.rename_property("name", "age"),
            Err(BuilderError::PropertyExists { name }) if name == "age"
        ));
    }

    #[test]
    fn rename_requires_simple_object() {
        let mut builder = SchemaBuilder::from_schema(json!({
            "type": "object",
            "properties": { "a": {} }
        }))
        .unwrap();
        assert!(matches!(
            builder.rename_property("a", "b"),
            Err(BuilderError::NotSimpleObjectSchema { operation: "rename_property" })
        ));
    }

    #[test]
    fn pick_orders_by_request() {
        let mut builder = person();
        builder.pick_properties(&["email", "name"]).unwrap();
        assert_eq!(builder.property_names(), vec!["email", "name"]);
        assert_eq!(builder.required_names(), vec!["name"]);
        assert_eq!(builder.as_map()["additionalProperties"], json!(false));
    }

    #[test]
    fn pick_removes_empty_required() {
        let mut builder = person();
        builder.pick_properties(&["email"]).unwrap();
        assert!(!builder.as_map().contains_key("required"));
    }

    #[test]
    fn pick_fails_without_partial_application() {
        let mut builder = person();
        let before = builder.to_value();
        assert!(matches!(
            builder.pick_properties(&["name", "ghost"]),
            Err(BuilderError::PropertyMissing { name }) if name == "ghost"
        ));
        assert_eq!(builder.to_value(), before);
    }

    #[test]
    fn pick_allows_open_objects_but_not_combinators() {
        let mut open = SchemaBuilder::from_schema(json!({
            "type": "object",
            "properties": { "a": {}, "b": {} }
        }))
        .unwrap();
        open.pick_properties(&["b"]).unwrap();
        assert_eq!(open.property_names(), vec!["b"]);

        let mut combined = SchemaBuilder::from_schema(json!({
            "type": "object",
            "properties": { "a": {} },
            "oneOf": [{}]
        }))
        .unwrap();
        assert!(matches!(
            combined.pick_properties(&["a"]),
            Err(BuilderError::HasCombinators { .. })
        ));
    }

    fn open_person(additional: Option<Value>) -> SchemaBuilder {
        let mut schema = json!({
            "type": "object",
            "properties": { "name": { "type": "string" }, "age": { "type": "integer" } },
            "required": ["name", "age"]
        });
        if let Some(additional) = additional {
            schema["additionalProperties"] = additional;
        }
        SchemaBuilder::from_schema(schema).unwrap()
    }

    #[test]
    fn pick_additional_none_closes_object() {
        let mut builder = open_person(None);
        builder.pick_additional_properties(&["name"], None).unwrap();
        assert_eq!(builder.property_names(), vec!["name"]);
        assert_eq!(builder.as_map()["additionalProperties"], json!(false));
        assert!(builder.is_simple_object_schema());
    }

    #[test]
    fn pick_additional_empty_keeps_previous_value() {
        let mut builder = open_person(None);
        builder.pick_additional_properties(&["name"], Some(&[][..])).unwrap();
        assert_eq!(builder.as_map()["additionalProperties"], json!(true));

        let mut builder = open_person(Some(json!({ "type": "number" })));
        builder.pick_additional_properties(&["name"], Some(&[][..])).unwrap();
        assert_eq!(builder.as_map()["additionalProperties"], json!({ "type": "number" }));
    }

    #[test]
    fn pick_additional_materializes_extras() {
        let mut builder = open_person(Some(json!({ "type": "number" })));
        builder
            .pick_additional_properties(&["name"], Some(&["score"][..]))
            .unwrap();
        assert_eq!(builder.property_names(), vec!["name", "score"]);
        assert_eq!(builder.property("score"), Some(&json!({ "type": "number" })));
        assert_eq!(builder.required_names(), vec!["name", "score"]);
        assert_eq!(builder.as_map()["additionalProperties"], json!(false));

        // Boolean `true` falls back to an unconstrained schema.
        let mut builder = open_person(Some(json!(true)));
        builder
            .pick_additional_properties(&[], Some(&["extra"][..]))
            .unwrap();
        assert_eq!(builder.property("extra"), Some(&json!({})));
    }

    #[test]
    fn pick_additional_preconditions() {
        let mut closed = person();
        assert!(matches!(
            closed.pick_additional_properties(&["name"], None),
            Err(BuilderError::AdditionalPropertiesDisabled { .. })
        ));

        let mut builder = open_person(None);
        let before = builder.to_value();
        assert!(matches!(
            builder.pick_additional_properties(&["name"], Some(&["name"][..])),
            Err(BuilderError::PropertyExists { .. })
        ));
        assert_eq!(builder.to_value(), before);
    }

    #[test]
    fn omit_ignores_unknown_names() {
        let mut builder = person();
        builder.omit_properties(&["age", "ghost"]).unwrap();
        assert_eq!(builder.property_names(), vec!["name", "email"]);
        assert_eq!(builder.required_names(), vec!["name"]);
    }

    #[test]
    fn transform_properties_builds_union() {
        let mut builder = person();
        builder
            .transform_properties(SchemaBuilder::null(), &["email"])
            .unwrap();
        assert_eq!(
            builder.property("email"),
            Some(&json!({ "oneOf": [{ "type": "string" }, { "type": "null" }] }))
        );
        assert!(matches!(
            builder.transform_properties(SchemaBuilder::null(), &["ghost"]),
            Err(BuilderError::PropertyMissing { .. })
        ));
    }

    #[test]
    fn transform_properties_rejects_bad_alternatives() {
        let mut builder = person();
        let before = builder.to_value();
        assert!(matches!(
            builder.transform_properties(json!(5), &["email"]),
            Err(BuilderError::NotASchema { .. })
        ));
        assert!(matches!(
            builder.transform_properties(json!({ "$ref": "#/x" }), &["email"]),
            Err(BuilderError::UnresolvedReference { .. })
        ));
        assert_eq!(builder.to_value(), before);
    }

    #[test]
    fn transform_wraps_repeated_names_once() {
        let mut builder = person();
        builder
            .transform_properties(SchemaBuilder::null(), &["email", "email"])
            .unwrap();
        assert_eq!(
            builder.property("email"),
            Some(&json!({ "oneOf": [{ "type": "string" }, { "type": "null" }] }))
        );

        builder
            .transform_properties_to_array(Some(&["age", "age"][..]))
            .unwrap();
        assert_eq!(
            builder.property("age"),
            Some(&json!({
                "oneOf": [{ "type": "integer" }, { "type": "array", "items": { "type": "integer" } }]
            }))
        );
    }

    #[test]
    fn transform_to_array_defaults_to_all() {
        let mut builder = person();
        builder.transform_properties_to_array(None).unwrap();
        for name in ["name", "age", "email"] {
            let slot = builder.property(name).unwrap();
            assert_eq!(slot["oneOf"][1]["type"], "array");
            assert_eq!(slot["oneOf"][0], slot["oneOf"][1]["items"]);
        }
    }

    #[test]
    fn transform_to_array_selected() {
        let mut builder = person();
        builder.transform_properties_to_array(Some(&["age"][..])).unwrap();
        assert_eq!(
            builder.property("age"),
            Some(&json!({
                "oneOf": [{ "type": "integer" }, { "type": "array", "items": { "type": "integer" } }]
            }))
        );
        assert_eq!(builder.property("name"), Some(&json!({ "type": "string" })));
    }

    #[test]
    fn merge_unions_overlaps_and_requires_them() {
        let mut left = SchemaBuilder::object();
        left.add_optional_property("a", SchemaBuilder::string()).unwrap();

        let mut right = SchemaBuilder::object();
        right
            .add_optional_property("a", SchemaBuilder::number())
            .unwrap()
            .add_property("b", SchemaBuilder::boolean())
            .unwrap()
            .add_optional_property("c", SchemaBuilder::null())
            .unwrap();

        left.merge_properties(&right).unwrap();
        assert_eq!(left.property_names(), vec!["a", "b", "c"]);
        assert_eq!(
            left.property("a"),
            Some(&json!({ "anyOf": [{ "type": "string" }, { "type": "number" }] }))
        );
        assert_eq!(left.required_names(), vec!["a", "b"]);
    }

    #[test]
    fn overwrite_follows_other() {
        let mut left = SchemaBuilder::object();
        left.add_property("a", SchemaBuilder::string()).unwrap();

        let mut right = SchemaBuilder::object();
        right
            .add_optional_property("a", SchemaBuilder::number())
            .unwrap()
            .add_property("b", SchemaBuilder::boolean())
            .unwrap();

        left.overwrite_properties(&right).unwrap();
        assert_eq!(left.property("a"), Some(&json!({ "type": "number" })));
        assert_eq!(left.required_names(), vec!["b"]);
    }

    #[test]
    fn merge_requires_simple_receiver() {
        let mut open = SchemaBuilder::from_schema(json!({ "type": "object" })).unwrap();
        assert!(matches!(
            open.merge_properties(&SchemaBuilder::object()),
            Err(BuilderError::NotSimpleObjectSchema { .. })
        ));
        assert!(matches!(
            open.overwrite_properties(&SchemaBuilder::object()),
            Err(BuilderError::NotSimpleObjectSchema { .. })
        ));
    }
}
