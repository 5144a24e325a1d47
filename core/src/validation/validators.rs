//! # CONCRETE VALIDATOR IMPLEMENTATIONS
//!
//! **CRITICAL**: Single-purpose validators implementing the core `Validator` trait.
//! The schema engine composes them per field; the extractor uses the buffer and UTF-8
//! validators on raw bodies.

use super::element::ScalarType;
use super::{json_type_name, ConstraintViolation, Validator, DEFAULT_MAX_BODY_SIZE};
use serde_json::{Number, Value as JsonValue};
use std::fmt::Display;
use std::ops::RangeInclusive;

// ================================================================================================
// BUFFER VALIDATOR - Body size validation
// ================================================================================================

/// **BUFFER VALIDATOR**
///
/// **PURPOSE**: Rejects bodies larger than the configured limit before any decoding.
/// **PERFORMANCE**: O(1), checks the byte length only.
#[derive(Debug, Clone)]
pub struct BufferValidator {
    /// **MAXIMUM ALLOWED SIZE** - Buffer size limit in bytes
    max_size: usize,
}

impl BufferValidator {
    pub fn new(max_size: usize) -> Self {
        Self { max_size }
    }
}

impl Default for BufferValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BODY_SIZE)
    }
}

impl Validator for BufferValidator {
    /// Byte length of the buffer
    type Input = usize;
    type Output = ();

    fn validate(&self, input: Self::Input) -> Result<Self::Output, ConstraintViolation> {
        if input > self.max_size {
            return Err(ConstraintViolation(format!(
                "Buffer size {} exceeds maximum allowed size {}",
                input, self.max_size
            )));
        }
        Ok(())
    }
}

// ================================================================================================
// UTF-8 VALIDATOR - Form body / header encoding validation
// ================================================================================================

/// **UTF-8 VALIDATOR**
///
/// **PURPOSE**: Validates byte sequences as UTF-8 and converts to String.
#[derive(Debug, Clone, Default)]
pub struct Utf8Validator;

impl Utf8Validator {
    pub fn new() -> Self {
        Self
    }
}

impl Validator for Utf8Validator {
    type Input = Vec<u8>;
    type Output = String;

    fn validate(&self, input: Self::Input) -> Result<Self::Output, ConstraintViolation> {
        String::from_utf8(input)
            .map_err(|e| ConstraintViolation(format!("Invalid UTF-8 sequence: {}", e.utf8_error())))
    }
}

// ================================================================================================
// SCALAR VALIDATOR - Type checking and coercion
// ================================================================================================

/// **SCALAR VALIDATOR**
///
/// **PURPOSE**: Checks a JSON value against a scalar type.
/// **STRICT**: exact JSON type required.
/// **NON-STRICT**: string input is coerced (`"42"` → `42`, `"true"` → `true`),
/// numbers and booleans are accepted for string fields.
#[derive(Debug, Clone)]
pub struct ScalarValidator {
    scalar: ScalarType,
    strict: bool,
}

impl ScalarValidator {
    pub fn new(scalar: ScalarType, strict: bool) -> Self {
        Self { scalar, strict }
    }

    fn mismatch(&self) -> ConstraintViolation {
        ConstraintViolation(format!(
            "This value should be of type {}.",
            self.scalar.name()
        ))
    }

    fn coerce(&self, input: &JsonValue) -> Option<JsonValue> {
        match (self.scalar, input) {
            (ScalarType::Integer, JsonValue::String(s)) => {
                s.trim().parse::<i64>().ok().map(JsonValue::from)
            }
            (ScalarType::Integer, JsonValue::Number(n)) => n
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| JsonValue::from(f as i64)),
            (ScalarType::Number, JsonValue::String(s)) => {
                let s = s.trim();
                if let Ok(i) = s.parse::<i64>() {
                    return Some(JsonValue::from(i));
                }
                s.parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(JsonValue::Number)
            }
            (ScalarType::Boolean, JsonValue::String(s)) => {
                match s.trim().to_ascii_lowercase().as_str() {
                    "true" | "1" | "on" | "yes" => Some(JsonValue::Bool(true)),
                    "false" | "0" | "off" | "no" | "" => Some(JsonValue::Bool(false)),
                    _ => None,
                }
            }
            (ScalarType::Boolean, JsonValue::Number(n)) => match n.as_i64() {
                Some(1) => Some(JsonValue::Bool(true)),
                Some(0) => Some(JsonValue::Bool(false)),
                _ => None,
            },
            (ScalarType::String, JsonValue::Number(n)) => Some(JsonValue::String(n.to_string())),
            (ScalarType::String, JsonValue::Bool(b)) => Some(JsonValue::String(b.to_string())),
            _ => None,
        }
    }
}

impl Validator for ScalarValidator {
    type Input = JsonValue;
    type Output = JsonValue;

    fn validate(&self, input: Self::Input) -> Result<Self::Output, ConstraintViolation> {
        let matches = match (&input, self.scalar) {
            (JsonValue::String(_), ScalarType::String) => true,
            (JsonValue::Number(n), ScalarType::Integer) => n.is_i64() || n.is_u64(),
            (JsonValue::Number(_), ScalarType::Number) => true,
            (JsonValue::Bool(_), ScalarType::Boolean) => true,
            _ => false,
        };

        if matches {
            return Ok(input);
        }
        if self.strict {
            return Err(self.mismatch());
        }
        self.coerce(&input).ok_or_else(|| self.mismatch())
    }
}

// ================================================================================================
// NUMERIC RANGE VALIDATOR - Minimum / maximum constraints
// ================================================================================================

/// **NUMERIC RANGE VALIDATOR**
///
/// **PURPOSE**: Validates numeric values against an inclusive range.
#[derive(Debug, Clone)]
pub struct NumericRangeValidator<T> {
    /// **VALID RANGE** - Inclusive range of acceptable values
    range: RangeInclusive<T>,
}

impl<T> NumericRangeValidator<T>
where
    T: PartialOrd + Copy + Display,
{
    pub fn new(range: RangeInclusive<T>) -> Self {
        Self { range }
    }
}

impl NumericRangeValidator<f64> {
    /// **OPTIONAL BOUNDS CONSTRUCTOR** - Missing bounds are unbounded
    pub fn bounds(minimum: Option<f64>, maximum: Option<f64>) -> Self {
        Self::new(minimum.unwrap_or(f64::NEG_INFINITY)..=maximum.unwrap_or(f64::INFINITY))
    }
}

impl<T> Validator for NumericRangeValidator<T>
where
    T: PartialOrd + Copy + Display,
{
    type Input = T;
    type Output = T;

    fn validate(&self, input: Self::Input) -> Result<Self::Output, ConstraintViolation> {
        if input < *self.range.start() {
            Err(ConstraintViolation(format!(
                "This value should be greater than or equal to {}.",
                self.range.start()
            )))
        } else if input > *self.range.end() {
            Err(ConstraintViolation(format!(
                "This value should be less than or equal to {}.",
                self.range.end()
            )))
        } else {
            Ok(input)
        }
    }
}

// ================================================================================================
// LENGTH VALIDATOR - String length constraint
// ================================================================================================

/// **LENGTH VALIDATOR**
///
/// **PURPOSE**: Limits string length, counted in characters.
#[derive(Debug, Clone)]
pub struct LengthValidator {
    max_length: usize,
}

impl LengthValidator {
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }
}

impl Validator for LengthValidator {
    type Input = String;
    type Output = String;

    fn validate(&self, input: Self::Input) -> Result<Self::Output, ConstraintViolation> {
        let length = input.chars().count();
        if length > self.max_length {
            return Err(ConstraintViolation(format!(
                "This value is too long. It should have {} characters or less.",
                self.max_length
            )));
        }
        Ok(input)
    }
}

/// Describes a value for messages when no validator is specific enough.
pub(crate) fn type_mismatch(expected: &str, value: &JsonValue) -> ConstraintViolation {
    ConstraintViolation(format!(
        "This value should be of type {}, {} given.",
        expected,
        json_type_name(value)
    ))
}

// ================================================================================================
// UNIT TESTS
// ================================================================================================
