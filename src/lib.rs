//! Schema Algebra
//!
//! Build and transform JSON Schema documents programmatically, then validate
//! values against them.
//!
//! A [`SchemaBuilder`] exclusively owns one schema document. Property-level
//! operations (add, remove, rename, pick, omit, merge, overwrite, transform,
//! optional/required toggling) edit it in place and return `&mut Self`, so
//! calls chain with `?`. Every operation checks its structural precondition
//! first and fails without touching the schema.
//!
//! # Example
//!
//! ```
//! use schema_algebra::SchemaBuilder;
//! use serde_json::json;
//!
//! let mut user = SchemaBuilder::object();
//! user.add_property("name", SchemaBuilder::string())?
//!     .add_optional_property("nickname", SchemaBuilder::string())?
//!     .rename_property("name", "full_name")?;
//!
//! let value = user.validate(json!({ "full_name": "Ada", "extra": 1 }))?;
//! assert_eq!(value, json!({ "full_name": "Ada" }));
//!
//! assert!(user.validate(json!({ "name": "Ada" })).is_err());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Preconditions
//!
//! | Predicate | Meaning |
//! |-----------|---------|
//! | object schema | `type` names `"object"`, or no `type` and `properties` present |
//! | additional properties | `additionalProperties` is anything but `false` |
//! | combinators | any of `oneOf`, `allOf`, `anyOf`, `not` present |
//! | simple object schema | object, no additional properties, no combinators |
//!
//! [`SchemaBuilder::object`] starts out simple. Most edits require a simple
//! object schema; see the `algebra` table for exceptions.
//!
//! # Dereferenced input only
//!
//! Documents must already have every `$ref` inlined. Wrapping a document that
//! still contains `$ref`, `$dynamicRef` or `$recursiveRef` anywhere in its
//! structure fails with [`BuilderError::UnresolvedReference`].
//!
//! # No static shape tracking
//!
//! Edits are not reflected in any Rust type: nothing stops code from
//! expecting a property that was never added. [`SchemaBuilder::validate_as`]
//! lets a caller deserialize validated values into its own type, but the
//! agreement between that type and the schema is only checked at run time.
//!
//! # Validation
//!
//! [`SchemaBuilder::validate`] and [`SchemaBuilder::validate_list`] compile a
//! validator on first use and keep it. Values are prepared before validation
//! according to [`ValidatorOptions`]: scalar type coercion, default
//! population and removal of properties disallowed by
//! `additionalProperties: false` are all on by default.

mod algebra;
mod builder;
mod classify;
mod error;
mod loader;
mod prepare;
mod types;
mod validator;
mod walker;

pub use builder::SchemaBuilder;
pub use classify::{
    has_additional_properties, has_combinators, is_object_schema, is_simple_object_schema,
};
pub use error::{BuilderError, LoadBuilderError, LoadError, SchemaError, ValidateError};
pub use loader::{load_builder, load_schema, load_schema_str};
pub use types::{json_type_name, SchemaType, ValidatorOptions};
pub use validator::{validate_against_schema, CompiledValidator};
pub use walker::{walk, walk_mut};
