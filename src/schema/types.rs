//! Parameter schema types
//!
//! A stored query declares its parameters with a JSON-schema subset:
//! - type: one type name or a union (e.g. `[integer, "null"]`)
//! - items: element definition for array types
//! - default, maximum, minimum, enum
//! - title, description, examples (documentation only)

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Parameter type names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
    Null,
}

impl ParamType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::Array => "array",
            ParamType::Object => "object",
            ParamType::Null => "null",
        }
    }

    /// Checks whether a JSON value is an instance of this type.
    ///
    /// `integer` only accepts integral JSON numbers; `number` accepts both.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Integer => value.is_i64() || value.is_u64(),
            ParamType::Number => value.is_number(),
            ParamType::Boolean => value.is_boolean(),
            ParamType::Array => value.is_array(),
            ParamType::Object => value.is_object(),
            ParamType::Null => value.is_null(),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeSpec {
    One(ParamType),
    Many(Vec<ParamType>),
}

/// Declared type union. An empty set accepts any value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TypeSpec", into = "TypeSpec")]
pub struct TypeSet {
    types: Vec<ParamType>,
}

impl From<TypeSpec> for TypeSet {
    fn from(spec: TypeSpec) -> Self {
        match spec {
            TypeSpec::One(ty) => Self { types: vec![ty] },
            TypeSpec::Many(types) => Self { types },
        }
    }
}

impl From<TypeSet> for TypeSpec {
    fn from(set: TypeSet) -> Self {
        match set.types.as_slice() {
            [single] => TypeSpec::One(*single),
            _ => TypeSpec::Many(set.types),
        }
    }
}

impl TypeSet {
    /// Create a union of the given types
    pub fn of(types: &[ParamType]) -> Self {
        Self {
            types: types.to_vec(),
        }
    }

    /// Returns true if no type constraint is declared
    pub fn is_any(&self) -> bool {
        self.types.is_empty()
    }

    pub fn contains(&self, ty: ParamType) -> bool {
        self.types.contains(&ty)
    }

    /// Returns the first declared type the value is an instance of
    pub fn matching(&self, value: &Value) -> Option<ParamType> {
        self.types.iter().copied().find(|ty| ty.matches(value))
    }

    /// Human-readable union, e.g. "integer | null"
    pub fn describe(&self) -> String {
        if self.types.is_empty() {
            return "any".into();
        }
        self.types
            .iter()
            .map(|ty| ty.type_name())
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// Definition of a single parameter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamDef {
    #[serde(rename = "type", default)]
    pub types: TypeSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ParamDef>>,
    /// Value used when the parameter is absent. Absent and `null` both mean null.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Value>,
}

impl ParamDef {
    /// Create a definition accepting any of the given types
    pub fn of(types: &[ParamType]) -> Self {
        Self {
            types: TypeSet::of(types),
            ..Self::default()
        }
    }

    pub fn string() -> Self {
        Self::of(&[ParamType::String])
    }

    pub fn nullable_integer() -> Self {
        Self::of(&[ParamType::Integer, ParamType::Null])
    }

    /// A `[string, array, "null"]` parameter with string items
    pub fn string_or_list() -> Self {
        Self::of(&[ParamType::String, ParamType::Array, ParamType::Null])
            .with_items(Self::string())
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_maximum(mut self, maximum: f64) -> Self {
        self.maximum = Some(maximum);
        self
    }

    pub fn with_minimum(mut self, minimum: f64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    pub fn with_items(mut self, items: ParamDef) -> Self {
        self.items = Some(Box::new(items));
        self
    }

    pub fn with_enum(mut self, allowed: Vec<Value>) -> Self {
        self.allowed = Some(allowed);
        self
    }

    /// Returns the value to use when the parameter is absent
    pub fn default_value(&self) -> Value {
        self.default.clone().unwrap_or(Value::Null)
    }
}

fn default_true() -> bool {
    true
}

/// Parameter contract of a stored query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSchema {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, ParamDef>,
    #[serde(rename = "additionalProperties", default = "default_true")]
    pub additional_properties: bool,
}

impl Default for ParamSchema {
    fn default() -> Self {
        Self {
            kind: Some("object".into()),
            required: Vec::new(),
            properties: BTreeMap::new(),
            additional_properties: true,
        }
    }
}

impl ParamSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a parameter
    pub fn property(mut self, name: impl Into<String>, def: ParamDef) -> Self {
        self.properties.insert(name.into(), def);
        self
    }

    /// Declare a required parameter
    pub fn required_property(mut self, name: impl Into<String>, def: ParamDef) -> Self {
        let name = name.into();
        if !self.required.contains(&name) {
            self.required.push(name.clone());
        }
        self.properties.insert(name, def);
        self
    }

    /// Reject parameters that are not declared
    pub fn deny_additional(mut self) -> Self {
        self.additional_properties = false;
        self
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    pub fn declares(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }
}

/// A validated parameter value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Integer(i64),
    Number(f64),
    String(String),
    Array(Vec<ParamValue>),
    Object(Map<String, Value>),
}

impl ParamValue {
    /// Returns false for null, false, 0 and the empty string
    pub fn is_truthy(&self) -> bool {
        match self {
            ParamValue::Null => false,
            ParamValue::Bool(b) => *b,
            ParamValue::Integer(i) => *i != 0,
            ParamValue::Number(n) => *n != 0.0,
            ParamValue::String(s) => !s.is_empty(),
            ParamValue::Array(_) | ParamValue::Object(_) => true,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ParamValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[ParamValue]> {
        match self {
            ParamValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Null => "null",
            ParamValue::Bool(_) => "boolean",
            ParamValue::Integer(_) => "integer",
            ParamValue::Number(_) => "number",
            ParamValue::String(_) => "string",
            ParamValue::Array(_) => "array",
            ParamValue::Object(_) => "object",
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ParamValue::Null => Value::Null,
            ParamValue::Bool(b) => Value::Bool(*b),
            ParamValue::Integer(i) => Value::from(*i),
            ParamValue::Number(n) => Value::from(*n),
            ParamValue::String(s) => Value::String(s.clone()),
            ParamValue::Array(items) => Value::Array(items.iter().map(|v| v.to_json()).collect()),
            ParamValue::Object(map) => Value::Object(map.clone()),
        }
    }
}

impl From<&Value> for ParamValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => ParamValue::Null,
            Value::Bool(b) => ParamValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ParamValue::Integer(i),
                None => ParamValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => ParamValue::String(s.clone()),
            Value::Array(items) => ParamValue::Array(items.iter().map(ParamValue::from).collect()),
            Value::Object(map) => ParamValue::Object(map.clone()),
        }
    }
}

/// Parameters that passed validation, with defaults applied
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidatedParams {
    values: BTreeMap<String, ParamValue>,
}

impl ValidatedParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ParamValue) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, ParamValue> {
        self.values
    }
}
