//! Error types for schema building, loading and validation.

use std::path::PathBuf;
use thiserror::Error;

/// Contract violations raised by the builder.
///
/// Every operation checks its preconditions before mutating, so an error
/// always leaves the schema untouched.
#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("schema document must be a JSON object, got {actual}")]
    NotAnObject { actual: String },

    #[error("expected a schema (object or boolean), got {actual}")]
    NotASchema { actual: String },

    #[error("unresolved reference at {path}: schema must be fully dereferenced")]
    UnresolvedReference { path: String },

    #[error("{operation} requires an object schema")]
    NotObjectSchema { operation: &'static str },

    #[error(
        "{operation} requires a simple object schema (additionalProperties: false, no oneOf/allOf/anyOf/not)"
    )]
    NotSimpleObjectSchema { operation: &'static str },

    #[error("{operation} is not allowed on a schema using oneOf/allOf/anyOf/not")]
    HasCombinators { operation: &'static str },

    #[error("{operation} requires additional properties to be enabled")]
    AdditionalPropertiesDisabled { operation: &'static str },

    #[error("additional properties are already enabled")]
    AdditionalPropertiesEnabled,

    #[error("property \"{name}\" already exists")]
    PropertyExists { name: String },

    #[error("property \"{name}\" does not exist")]
    PropertyMissing { name: String },
}

impl BuilderError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Errors while loading a schema or payload document.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            LoadError::InvalidJson { .. } => 2,
        }
    }
}

/// Errors from loading a schema file straight into a builder.
#[derive(Debug, Error)]
pub enum LoadBuilderError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Builder(#[from] BuilderError),
}

impl LoadBuilderError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadBuilderError::Load(e) => e.exit_code(),
            LoadBuilderError::Builder(e) => e.exit_code(),
        }
    }
}

/// Errors during validation.
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error("cannot compile schema: {message}")]
    InvalidSchema { message: String },

    #[error("validation failed: {message}")]
    Invalid {
        /// All errors flattened into one line.
        message: String,
        errors: Vec<SchemaError>,
    },

    #[error("validated value does not fit the requested type: {source}")]
    Deserialize {
        #[source]
        source: serde_json::Error,
    },
}

impl ValidateError {
    /// Build an `Invalid` error from the engine's error list.
    pub(crate) fn invalid(errors: Vec<SchemaError>) -> Self {
        let message = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        ValidateError::Invalid { message, errors }
    }

    /// Individual errors, empty unless the value was rejected.
    pub fn errors(&self) -> &[SchemaError] {
        match self {
            ValidateError::Invalid { errors, .. } => errors,
            _ => &[],
        }
    }

    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ValidateError::Invalid { .. } | ValidateError::Deserialize { .. } => 1,
            ValidateError::InvalidSchema { .. } => 2,
        }
    }
}

/// Single validation error with path context.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SchemaError {
    /// JSON Pointer (RFC 6901) to the invalid value. Empty for the root.
    pub path: String,
    /// Human-readable error message.
    pub message: String,
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}
