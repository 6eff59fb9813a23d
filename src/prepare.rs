//! Value preparation ahead of engine validation.
//!
//! Applies, in this order for each schema node: scalar type coercion,
//! default population for missing properties, and removal of properties not
//! permitted by `additionalProperties: false`. Recurses through
//! `properties`, sub-schema `additionalProperties`, `items` and `allOf`.
//! `oneOf`, `anyOf` and `not` branches are left to the engine.

use serde_json::{Map, Number, Value};

use crate::types::{declared_types, SchemaType, ValidatorOptions};

/// Prepare `value` in place against `schema`.
pub(crate) fn prepare(schema: &Value, value: &mut Value, options: &ValidatorOptions) {
    let Value::Object(node) = schema else {
        return;
    };

    if options.coerce_types {
        coerce(node, value);
    }

    match value {
        Value::Object(obj) => prepare_object(node, obj, options),
        Value::Array(arr) => prepare_array(node, arr, options),
        _ => {}
    }

    if let Some(Value::Array(branches)) = node.get("allOf") {
        for branch in branches {
            prepare(branch, value, options);
        }
    }
}

fn prepare_object(node: &Map<String, Value>, obj: &mut Map<String, Value>, options: &ValidatorOptions) {
    let props = node.get("properties").and_then(Value::as_object);

    if options.use_defaults {
        if let Some(props) = props {
            for (name, prop) in props {
                if obj.contains_key(name) {
                    continue;
                }
                if let Some(default) = prop.get("default") {
                    obj.insert(name.clone(), default.clone());
                }
            }
        }
    }

    let additional = node.get("additionalProperties");

    if options.remove_additional
        && matches!(additional, Some(Value::Bool(false)))
        && !node.contains_key("patternProperties")
    {
        obj.retain(|key, _| props.is_some_and(|p| p.contains_key(key)));
    }

    for (key, child) in obj.iter_mut() {
        match props.and_then(|p| p.get(key)) {
            Some(prop) => prepare(prop, child, options),
            None => {
                if let Some(extra @ Value::Object(_)) = additional {
                    prepare(extra, child, options);
                }
            }
        }
    }
}

fn prepare_array(node: &Map<String, Value>, arr: &mut [Value], options: &ValidatorOptions) {
    match node.get("items") {
        Some(items @ Value::Object(_)) => {
            for item in arr.iter_mut() {
                prepare(items, item, options);
            }
        }
        Some(Value::Array(tuple)) => {
            for (item, schema) in arr.iter_mut().zip(tuple) {
                prepare(schema, item, options);
            }
        }
        _ => {}
    }
}

/// Coerce a scalar toward the node's declared type(s).
///
/// A value that already matches one of the types is left alone; otherwise the
/// types are tried in declaration order and the first successful conversion
/// wins.
fn coerce(node: &Map<String, Value>, value: &mut Value) {
    let types = declared_types(node);
    if types.is_empty() || types.iter().any(|t| t.matches(value)) {
        return;
    }

    if let Some(coerced) = types.iter().find_map(|t| coerce_to(*t, value)) {
        *value = coerced;
    }
}

fn coerce_to(target: SchemaType, value: &Value) -> Option<Value> {
    match (target, value) {
        (SchemaType::String, Value::Number(n)) => Some(Value::String(n.to_string())),
        (SchemaType::String, Value::Bool(b)) => Some(Value::String(b.to_string())),
        (SchemaType::String, Value::Null) => Some(Value::String(String::new())),

        (SchemaType::Number, Value::String(s)) => parse_number(s),
        (SchemaType::Integer, Value::String(s)) => parse_integer(s),
        (SchemaType::Number | SchemaType::Integer, Value::Bool(b)) => {
            Some(Value::Number(Number::from(u8::from(*b))))
        }
        (SchemaType::Number | SchemaType::Integer, Value::Null) => Some(Value::Number(0.into())),
        (SchemaType::Integer, Value::Number(n)) => integral(n.as_f64()?),

        (SchemaType::Boolean, Value::String(s)) => match s.as_str() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        (SchemaType::Boolean, Value::Number(n)) => match n.as_f64() {
            Some(f) if f == 0.0 => Some(Value::Bool(false)),
            Some(f) if f == 1.0 => Some(Value::Bool(true)),
            _ => None,
        },
        (SchemaType::Boolean, Value::Null) => Some(Value::Bool(false)),

        (SchemaType::Null, Value::String(s)) if s.is_empty() => Some(Value::Null),
        (SchemaType::Null, Value::Number(n)) if n.as_f64() == Some(0.0) => Some(Value::Null),
        (SchemaType::Null, Value::Bool(false)) => Some(Value::Null),

        _ => None,
    }
}

fn parse_number(s: &str) -> Option<Value> {
    if let Ok(i) = s.parse::<i64>() {
        return Some(Value::Number(i.into()));
    }
    if let Ok(u) = s.parse::<u64>() {
        return Some(Value::Number(u.into()));
    }
    let f = s.parse::<f64>().ok()?;
    Number::from_f64(f).map(Value::Number)
}

fn parse_integer(s: &str) -> Option<Value> {
    match parse_number(s)? {
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(Value::Number(n)),
        Value::Number(n) => integral(n.as_f64()?),
        _ => None,
    }
}

fn integral(f: f64) -> Option<Value> {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(Value::Number((f as i64).into()))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(schema: Value, mut value: Value) -> Value {
        prepare(&schema, &mut value, &ValidatorOptions::default());
        value
    }

    #[test]
    fn coerces_scalars_toward_declared_type() {
        assert_eq!(run(json!({ "type": "number" }), json!("42")), json!(42));
        assert_eq!(run(json!({ "type": "number" }), json!("1.5")), json!(1.5));
        assert_eq!(run(json!({ "type": "integer" }), json!("7")), json!(7));
        assert_eq!(run(json!({ "type": "integer" }), json!(true)), json!(1));
        assert_eq!(run(json!({ "type": "string" }), json!(12)), json!("12"));
        assert_eq!(run(json!({ "type": "string" }), json!(null)), json!(""));
        assert_eq!(run(json!({ "type": "boolean" }), json!("false")), json!(false));
        assert_eq!(run(json!({ "type": "boolean" }), json!(1)), json!(true));
        assert_eq!(run(json!({ "type": "null" }), json!("")), json!(null));
    }

    #[test]
    fn integral_stays_within_i64() {
        // i64::MAX as f64 rounds up to 2^63, which does not fit.
        assert_eq!(integral(9_223_372_036_854_775_808.0), None);
        assert_eq!(integral(i64::MIN as f64), Some(json!(i64::MIN)));
        assert_eq!(integral(-3.0), Some(json!(-3)));
        assert_eq!(integral(2.5), None);
    }

    #[test]
    fn leaves_unconvertible_values_for_the_engine() {
        assert_eq!(run(json!({ "type": "integer" }), json!("1.5")), json!("1.5"));
        assert_eq!(run(json!({ "type": "number" }), json!("abc")), json!("abc"));
        assert_eq!(run(json!({ "type": "number" }), json!("")), json!(""));
        assert_eq!(run(json!({ "type": "boolean" }), json!("yes")), json!("yes"));
        assert_eq!(run(json!({ "type": "string" }), json!([1])), json!([1]));
    }

    #[test]
    fn multi_type_keeps_matching_value() {
        let schema = json!({ "type": ["string", "number"] });
        assert_eq!(run(schema.clone(), json!("5")), json!("5"));
        assert_eq!(run(schema, json!(true)), json!("true"));
    }

    #[test]
    fn fills_defaults_for_missing_properties() {
        let schema = json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "role": { "type": "string", "default": "user" }
            }
        });
        assert_eq!(
            run(schema.clone(), json!({ "name": "ann" })),
            json!({ "name": "ann", "role": "user" })
        );
        assert_eq!(
            run(schema, json!({ "name": "ann", "role": "admin" })),
            json!({ "name": "ann", "role": "admin" })
        );
    }

    #[test]
    fn strips_only_when_additional_properties_false() {
        let closed = json!({
            "type": "object",
            "properties": { "a": { "type": "string" } },
            "additionalProperties": false
        });
        assert_eq!(run(closed, json!({ "a": "x", "b": 1 })), json!({ "a": "x" }));

        let open = json!({
            "type": "object",
            "properties": { "a": { "type": "string" } }
        });
        assert_eq!(
            run(open, json!({ "a": "x", "b": 1 })),
            json!({ "a": "x", "b": 1 })
        );
    }

    #[test]
    fn recurses_into_nested_structures() {
        let schema = json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "tags": { "type": "array", "items": { "type": "string" } },
                "nested": {
                    "type": "object",
                    "additionalProperties": false,
                    "properties": { "n": { "type": "integer" } }
                }
            }
        });
        let value = json!({
            "tags": [1, true],
            "nested": { "n": "3", "junk": 0 },
            "junk": 0
        });
        assert_eq!(
            run(schema, value),
            json!({ "tags": ["1", "true"], "nested": { "n": 3 } })
        );
    }

    #[test]
    fn sub_schema_additional_properties_are_prepared() {
        let schema = json!({
            "type": "object",
            "additionalProperties": { "type": "number" }
        });
        assert_eq!(run(schema, json!({ "x": "2" })), json!({ "x": 2 }));
    }

    #[test]
    fn strict_options_leave_value_alone() {
        let schema = json!({
            "type": "object",
            "additionalProperties": false,
            "properties": { "a": { "type": "number", "default": 1 } }
        });
        let mut value = json!({ "b": "2" });
        prepare(&schema, &mut value, &ValidatorOptions::strict());
        assert_eq!(value, json!({ "b": "2" }));
    }
}
