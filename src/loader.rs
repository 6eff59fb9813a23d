//! Document loading from files and strings.
//!
//! Loading only parses JSON. Documents containing `$ref` pointers must be
//! dereferenced elsewhere before they can be wrapped in a
//! [`SchemaBuilder`](crate::SchemaBuilder).

use std::path::Path;

use serde_json::Value;

use crate::builder::SchemaBuilder;
use crate::error::{LoadBuilderError, LoadError};

/// Load a JSON document from a file path.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist,
/// or `LoadError::InvalidJson` if the file isn't valid JSON.
pub fn load_schema(path: &Path) -> Result<Value, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    load_schema_str(&content)
}

/// Load a JSON document from a string.
///
/// # Errors
///
/// Returns `LoadError::InvalidJson` if the string isn't valid JSON.
pub fn load_schema_str(content: &str) -> Result<Value, LoadError> {
    serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })
}

/// Load a schema file and wrap it in a builder.
pub fn load_builder(path: &Path) -> Result<SchemaBuilder, LoadBuilderError> {
    let schema = load_schema(path)?;
    Ok(SchemaBuilder::from_schema(schema)?)
}
