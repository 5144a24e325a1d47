use super::element::{Element, ElementKind, Schema};
use super::validators::{type_mismatch, LengthValidator, NumericRangeValidator, ScalarValidator};
use super::{json_type_name, ValidationEngine, ValidationResult, Validator, Violation};
use crate::errors::EngineError;
use crate::types::JsonMap;
use serde_json::Value as JsonValue;

const MISSING: &str = "This field is missing.";
const NOT_NULL: &str = "This value should not be null.";

/// **REFERENCE SCHEMA ENGINE**
///
/// **PURPOSE**: Default [`ValidationEngine`] used by the pipeline.
/// **GUARANTEE**: Fields are checked in declaration order, every failure is collected
/// (no early termination), unknown keys land in `extra_data`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaEngine;

impl SchemaEngine {
    pub fn new() -> Self {
        Self
    }
}

impl ValidationEngine for SchemaEngine {
    fn validate(&self, schema: &Schema, raw: &JsonValue) -> Result<ValidationResult, EngineError> {
        let object = raw.as_object().ok_or_else(|| {
            EngineError::IncompatibleInput(format!(
                "expected a JSON object, {} given",
                json_type_name(raw)
            ))
        })?;

        let mut result = ValidationResult::default();
        let mut walker = Walker {
            violations: &mut result.violations,
        };
        walker.object(schema, object, "", &mut result.data, &mut result.extra_data);
        Ok(result)
    }
}

// Output of validating one element: normalized value (absent on violation) and
// any unschemed keys found beneath it.
struct Normalized {
    value: Option<JsonValue>,
    extra: Option<JsonValue>,
}

struct Walker<'a> {
    violations: &'a mut Vec<Violation>,
}

impl Walker<'_> {
    fn object(
        &mut self,
        schema: &Schema,
        object: &JsonMap,
        prefix: &str,
        data: &mut JsonMap,
        extra: &mut JsonMap,
    ) {
        for (name, element) in schema.iter() {
            let path = join(prefix, name);
            match object.get(name) {
                Some(value) => {
                    let normalized = self.element(element, value, &path);
                    if let Some(value) = normalized.value {
                        data.insert(name.clone(), value);
                    }
                    if let Some(nested) = normalized.extra {
                        extra.insert(name.clone(), nested);
                    }
                }
                None if element.required => {
                    self.violations
                        .push(Violation::new(path, JsonValue::Null, MISSING));
                }
                None => {
                    if let Some(default) = &element.default {
                        data.insert(name.clone(), default.clone());
                    }
                }
            }
        }

        for (name, value) in object {
            if !schema.contains(name) {
                extra.insert(name.clone(), value.clone());
            }
        }
    }

    fn element(&mut self, element: &Element, value: &JsonValue, path: &str) -> Normalized {
        let before = self.violations.len();

        if value.is_null() {
            if !element.nullable {
                self.fail(path, value, NOT_NULL);
            }
            return Normalized {
                value: element.nullable.then_some(JsonValue::Null),
                extra: None,
            };
        }

        let mut extra = None;
        let normalized = match &element.kind {
            ElementKind::Scalar(scalar) => {
                match ScalarValidator::new(*scalar, element.strict).validate(value.clone()) {
                    Ok(coerced) => self.constraints(element, coerced, path),
                    Err(violation) => {
                        self.fail(path, value, violation.0);
                        None
                    }
                }
            }
            ElementKind::Collection(items) => {
                let list = match value {
                    JsonValue::Array(list) => Some(list.clone()),
                    JsonValue::Object(_) => None,
                    scalar if !element.strict => Some(vec![scalar.clone()]),
                    _ => None,
                };
                match list {
                    Some(list) => {
                        let mut out = Vec::with_capacity(list.len());
                        let mut item_extra = JsonMap::new();
                        for (index, item) in list.iter().enumerate() {
                            let item_path = format!("{path}[{index}]");
                            let normalized = self.element(items, item, &item_path);
                            if let Some(value) = normalized.value {
                                out.push(value);
                            }
                            if let Some(nested) = normalized.extra {
                                item_extra.insert(index.to_string(), nested);
                            }
                        }
                        if !item_extra.is_empty() {
                            extra = Some(JsonValue::Object(item_extra));
                        }
                        Some(JsonValue::Array(out))
                    }
                    None => {
                        self.fail(path, value, type_mismatch("array", value).0);
                        None
                    }
                }
            }
            ElementKind::Object(schema) => match value {
                JsonValue::Object(object) => {
                    let mut data = JsonMap::new();
                    let mut nested_extra = JsonMap::new();
                    self.object(schema, object, path, &mut data, &mut nested_extra);
                    if !nested_extra.is_empty() {
                        extra = Some(JsonValue::Object(nested_extra));
                    }
                    Some(JsonValue::Object(data))
                }
                _ => {
                    self.fail(path, value, type_mismatch("object", value).0);
                    None
                }
            },
        };

        Normalized {
            value: normalized.filter(|_| self.violations.len() == before),
            extra,
        }
    }

    // Range and length checks on an already type-checked scalar.
    fn constraints(&mut self, element: &Element, value: JsonValue, path: &str) -> Option<JsonValue> {
        if element.minimum.is_some() || element.maximum.is_some() {
            if let Some(number) = value.as_f64() {
                let range = NumericRangeValidator::bounds(element.minimum, element.maximum);
                if let Err(violation) = range.validate(number) {
                    self.fail(path, &value, violation.0);
                    return None;
                }
            }
        }

        if let (Some(max_length), JsonValue::String(s)) = (element.max_length, &value) {
            if let Err(violation) = LengthValidator::new(max_length).validate(s.clone()) {
                self.fail(path, &value, violation.0);
                return None;
            }
        }

        Some(value)
    }

    fn fail(&mut self, path: &str, value: &JsonValue, message: impl Into<String>) {
        self.violations
            .push(Violation::new(path, value.clone(), message));
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}
