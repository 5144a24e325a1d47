//! Schema element definitions.
//!
//! Elements deserialize from the same JSON shape endpoints are configured with:
//!
//! ```json
//! {"type": "integer", "required": false, "default": 1, "minimum": 0}
//! {"type": "array", "items": {"type": "string"}}
//! {"type": "object", "fields": {"city": {"type": "string"}}}
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// **SCALAR ELEMENT TYPES**
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    String,
    Integer,
    Number,
    Boolean,
}

impl ScalarType {
    pub fn name(self) -> &'static str {
        match self {
            ScalarType::String => "string",
            ScalarType::Integer => "integer",
            ScalarType::Number => "number",
            ScalarType::Boolean => "boolean",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Scalar(ScalarType),
    Collection(Box<Element>),
    Object(Schema),
}

/// **ELEMENT DEFINITION**
///
/// **PURPOSE**: Expected type, presence and constraints of one field.
/// **DEFAULTS**: required, strict (no type coercion), not nullable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ElementDef", into = "ElementDef")]
pub struct Element {
    pub kind: ElementKind,
    pub required: bool,
    pub strict: bool,
    pub nullable: bool,
    pub default: Option<JsonValue>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub max_length: Option<usize>,
}

impl Element {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            required: true,
            strict: true,
            nullable: false,
            default: None,
            minimum: None,
            maximum: None,
            max_length: None,
        }
    }

    pub fn scalar(scalar: ScalarType) -> Self {
        Self::new(ElementKind::Scalar(scalar))
    }

    pub fn string() -> Self {
        Self::scalar(ScalarType::String)
    }

    pub fn integer() -> Self {
        Self::scalar(ScalarType::Integer)
    }

    pub fn number() -> Self {
        Self::scalar(ScalarType::Number)
    }

    pub fn boolean() -> Self {
        Self::scalar(ScalarType::Boolean)
    }

    pub fn collection(items: Element) -> Self {
        Self::new(ElementKind::Collection(Box::new(items)))
    }

    pub fn object(schema: Schema) -> Self {
        Self::new(ElementKind::Object(schema))
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Allows coercion of string input to the declared type, items included.
    pub fn non_strict(mut self) -> Self {
        self.relax();
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Value inserted when the field is absent. Implies optional.
    pub fn with_default(mut self, value: JsonValue) -> Self {
        self.required = false;
        self.default = Some(value);
        self
    }

    pub fn range(mut self, minimum: Option<f64>, maximum: Option<f64>) -> Self {
        self.minimum = minimum;
        self.maximum = maximum;
        self
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self.kind, ElementKind::Scalar(_))
    }

    /// Scalar, or a collection whose items are scalar.
    pub fn is_scalar_or_collection(&self) -> bool {
        match &self.kind {
            ElementKind::Scalar(_) => true,
            ElementKind::Collection(items) => items.is_scalar(),
            ElementKind::Object(_) => false,
        }
    }

    pub(crate) fn relax(&mut self) {
        self.strict = false;
        if let ElementKind::Collection(items) = &mut self.kind {
            items.relax();
        }
    }
}

/// **CHANNEL SCHEMA**
///
/// Ordered field name → element mapping. Declaration order is the order
/// fields are validated and violations reported in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema(IndexMap<String, Element>);

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// **ADD FIELD**
    pub fn field(mut self, name: impl Into<String>, element: Element) -> Self {
        self.0.insert(name.into(), element);
        self
    }

    /// **ADD REQUIRED SCALAR FIELD**
    pub fn require_field(self, name: impl Into<String>, scalar: ScalarType) -> Self {
        self.field(name, Element::scalar(scalar))
    }

    /// **ADD OPTIONAL SCALAR FIELD**
    pub fn optional_field(self, name: impl Into<String>, scalar: ScalarType) -> Self {
        self.field(name, Element::scalar(scalar).optional())
    }

    pub fn get(&self, name: &str) -> Option<&Element> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Element)> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut Element)> {
        self.0.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Rebuilds the schema with every key passed through `f`, order kept.
    pub fn map_keys(self, f: impl Fn(&str) -> String) -> Self {
        Self(self.0.into_iter().map(|(k, v)| (f(&k), v)).collect())
    }
}

impl FromIterator<(String, Element)> for Schema {
    fn from_iter<I: IntoIterator<Item = (String, Element)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// Wire shape of an element.
#[derive(Serialize, Deserialize)]
struct ElementDef {
    #[serde(flatten)]
    kind: KindDef,
    #[serde(default = "yes")]
    required: bool,
    #[serde(default = "yes")]
    strict: bool,
    #[serde(default)]
    nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    maximum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_length: Option<usize>,
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum KindDef {
    String,
    Integer,
    Number,
    Boolean,
    Array { items: Box<Element> },
    Object { fields: Schema },
}

fn yes() -> bool {
    true
}

impl From<ElementDef> for Element {
    fn from(def: ElementDef) -> Self {
        let kind = match def.kind {
            KindDef::String => ElementKind::Scalar(ScalarType::String),
            KindDef::Integer => ElementKind::Scalar(ScalarType::Integer),
            KindDef::Number => ElementKind::Scalar(ScalarType::Number),
            KindDef::Boolean => ElementKind::Scalar(ScalarType::Boolean),
            KindDef::Array { items } => ElementKind::Collection(items),
            KindDef::Object { fields } => ElementKind::Object(fields),
        };
        Self {
            kind,
            // a declared default makes the field optional
            required: def.required && def.default.is_none(),
            strict: def.strict,
            nullable: def.nullable,
            default: def.default,
            minimum: def.minimum,
            maximum: def.maximum,
            max_length: def.max_length,
        }
    }
}

impl From<Element> for ElementDef {
    fn from(element: Element) -> Self {
        let kind = match element.kind {
            ElementKind::Scalar(ScalarType::String) => KindDef::String,
            ElementKind::Scalar(ScalarType::Integer) => KindDef::Integer,
            ElementKind::Scalar(ScalarType::Number) => KindDef::Number,
            ElementKind::Scalar(ScalarType::Boolean) => KindDef::Boolean,
            ElementKind::Collection(items) => KindDef::Array { items },
            ElementKind::Object(fields) => KindDef::Object { fields },
        };
        Self {
            kind,
            required: element.required,
            strict: element.strict,
            nullable: element.nullable,
            default: element.default,
            minimum: element.minimum,
            maximum: element.maximum,
            max_length: element.max_length,
        }
    }
}
