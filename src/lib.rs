//! Compile JSON Schema documents into immutable, typed validators.
//!
//! A schema document (any `serde_json::Value` tree) compiles once into a
//! `CompiledSchema`; each `validate` call is then a pure traversal returning
//! either success or a precisely-typed failure naming the violated
//! constraint. Malformed documents fail at compile time with `SchemaError`;
//! malformed *values* never error, they validate to a failure.
//!
//! ```no_run
//! use serde_json::json;
//!
//! let schema = json_vet::compile(&json!({
//!     "type": "integer", "minimum": 0, "multipleOf": 5
//! }))?;
//! assert!(schema.validate(&json!(25)).is_success());
//! assert!(schema.validate(&json!(23)).is_failure());
//! # Ok::<(), json_vet::SchemaError>(())
//! ```

pub mod compile;
pub mod num;
pub mod result;
pub mod schema;

pub use compile::{compile, compile_str, SchemaError};
pub use num::Num;
pub use result::{Kind, ValidateResult};
pub use schema::{CompiledSchema, SchemaNode};

use serde_json::Value;

/// One-shot convenience: compile, then validate a single value.
/// For repeated validation, compile once and reuse the `CompiledSchema`.
pub fn is_valid(schema: &Value, value: &Value) -> Result<bool, SchemaError> {
    Ok(compile::compile(schema)?.validate(value).is_success())
}
