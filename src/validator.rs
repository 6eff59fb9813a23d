//! Compiled validators over a schema snapshot.
//!
//! A [`CompiledValidator`] pairs a `jsonschema` validator with the schema it
//! was compiled from, so value preparation and engine validation always agree
//! even if the originating builder is mutated afterwards.

use serde_json::{json, Value};
use tracing::debug;

use crate::error::{SchemaError, ValidateError};
use crate::prepare::prepare;
use crate::types::{ValidatorOptions, LIST_ITEM_DEFINITION};

/// Validator for either a single value or a non-empty list of values.
pub struct CompiledValidator {
    /// Schema each value (or each list element) is prepared against.
    schema: Value,
    options: ValidatorOptions,
    engine: jsonschema::Validator,
}

impl CompiledValidator {
    /// Compile a validator for single values.
    ///
    /// # Errors
    ///
    /// Returns `ValidateError::InvalidSchema` if the engine rejects the schema.
    pub fn single(schema: &Value, options: ValidatorOptions) -> Result<Self, ValidateError> {
        let engine = compile(schema)?;
        debug!(?options, "Compiled single-value validator");
        Ok(Self {
            schema: schema.clone(),
            options,
            engine,
        })
    }

    /// Compile a validator for non-empty arrays whose elements match `schema`.
    ///
    /// The element schema is referenced from `$defs` rather than inlined under
    /// `items`.
    ///
    /// # Errors
    ///
    /// Returns `ValidateError::InvalidSchema` if the engine rejects the schema.
    pub fn list(schema: &Value, options: ValidatorOptions) -> Result<Self, ValidateError> {
        let engine = compile(&list_schema(schema))?;
        debug!(?options, "Compiled list validator");
        Ok(Self {
            schema: schema.clone(),
            options,
            engine,
        })
    }

    /// Prepare and validate one value, returning the prepared value.
    pub fn validate(&self, mut value: Value) -> Result<Value, ValidateError> {
        if !self.options.is_passthrough() {
            prepare(&self.schema, &mut value, &self.options);
        }
        self.check(&value)?;
        Ok(value)
    }

    /// Prepare every element, then validate the list as a whole.
    pub fn validate_list(&self, mut values: Vec<Value>) -> Result<Vec<Value>, ValidateError> {
        if !self.options.is_passthrough() {
            for value in values.iter_mut() {
                prepare(&self.schema, value, &self.options);
            }
        }
        let list = Value::Array(values);
        self.check(&list)?;
        match list {
            Value::Array(values) => Ok(values),
            _ => unreachable!("constructed as an array above"),
        }
    }

    fn check(&self, instance: &Value) -> Result<(), ValidateError> {
        let errors: Vec<SchemaError> = self
            .engine
            .iter_errors(instance)
            .map(|e| SchemaError {
                path: e.instance_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            debug!(count = errors.len(), "Validation failed");
            Err(ValidateError::invalid(errors))
        }
    }
}

impl std::fmt::Debug for CompiledValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledValidator")
            .field("schema", &self.schema)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Validate a value against a schema without preparation or caching.
///
/// Use this for a one-off check; builders keep their compiled validators.
pub fn validate_against_schema(schema: &Value, payload: &Value) -> Result<(), ValidateError> {
    CompiledValidator::single(schema, ValidatorOptions::strict())?.check(payload)
}

/// Wrapper schema for list validation.
fn list_schema(item: &Value) -> Value {
    json!({
        "type": "array",
        "minItems": 1,
        "items": { "$ref": format!("#/$defs/{}", LIST_ITEM_DEFINITION) },
        "$defs": { LIST_ITEM_DEFINITION: item }
    })
}

fn compile(schema: &Value) -> Result<jsonschema::Validator, ValidateError> {
    jsonschema::validator_for(schema).map_err(|e| ValidateError::InvalidSchema {
        message: e.to_string(),
    })
}
