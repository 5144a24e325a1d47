//! # FORZIUM VALIDATION MODULE
//!
//! **SCHEMA ENGINE SEAM WITH TRAIT-BASED VALIDATORS**
//!
//! The pipeline never validates a field itself. It hands each channel's schema and raw
//! data to a [`ValidationEngine`] and receives a [`ValidationResult`]: normalized data,
//! extra (unschemed) data and an ordered violation list.
//!
//! ## LAYERS
//!
//! 1. **ELEMENTS** - [`Element`] / [`Schema`] declare expected fields per channel
//! 2. **VALIDATORS** - single-purpose [`Validator`] implementations (type, range, length, buffer)
//! 3. **ENGINE** - [`SchemaEngine`] walks a schema and composes the validators
//!
//! ## USAGE
//!
//! ```rust
//! use forzium::validation::{Element, Schema, SchemaEngine, ValidationEngine};
//! use serde_json::json;
//!
//! let schema = Schema::new().field("id", Element::integer());
//! let result = SchemaEngine::new().validate(&schema, &json!({"id": 5})).unwrap();
//! assert!(result.is_valid());
//! ```

use crate::errors::EngineError;
use crate::types::JsonMap;
use serde::Serialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

pub mod element;
pub mod engine;
pub mod validators;

pub use element::{Element, ElementKind, ScalarType, Schema};
pub use engine::SchemaEngine;
pub use validators::{
    BufferValidator, LengthValidator, NumericRangeValidator, ScalarValidator, Utf8Validator,
};

/// Default body size limit (10MB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 10_485_760;

/// **CONSTRAINT FAILURE MESSAGE**
///
/// Returned by a [`Validator`]; the engine turns it into a [`Violation`] at the field's path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ConstraintViolation(pub String);

/// **CORE VALIDATOR TRAIT**
///
/// **MANDATE**: ALL single-value checks implement this trait.
/// **GUARANTEE**: MUST NOT panic. Every failure is a `ConstraintViolation`.
pub trait Validator {
    /// **INPUT TYPE** - Data type accepted by this validator
    type Input;

    /// **OUTPUT TYPE** - Validated (possibly coerced) data returned on success
    type Output;

    fn validate(&self, input: Self::Input) -> Result<Self::Output, ConstraintViolation>;
}

/// **FIELD VIOLATION**
///
/// One failed constraint: where, what value, and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub path: String,
    pub invalid_value: JsonValue,
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, invalid_value: JsonValue, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            invalid_value,
            message: message.into(),
        }
    }
}

/// **PER-CHANNEL VALIDATION RESULT**
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationResult {
    /// Schema fields, normalized to their declared types
    pub data: JsonMap,
    /// Fields present in the input but absent from the schema
    pub extra_data: JsonMap,
    /// Failed constraints in field declaration order
    pub violations: Vec<Violation>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// **VALIDATION ENGINE SEAM**
///
/// **CONTRACT**: `validate(schema, raw)` returns data/extra/violations, or
/// `EngineError::IncompatibleInput` when `raw` cannot be matched against `schema`
/// at all (e.g. a JSON array where an object was required). Field-level failures are
/// NEVER reported as errors.
pub trait ValidationEngine: Send + Sync {
    fn validate(&self, schema: &Schema, raw: &JsonValue) -> Result<ValidationResult, EngineError>;
}

/// JSON type name used in violation and error messages.
pub(crate) fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(n) if n.is_f64() => "number",
        JsonValue::Number(_) => "integer",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
