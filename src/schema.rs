//! JSON Schema input model.
//!
//! [`Schema`] is read-only input: the compiler borrows it for the lifetime
//! of one conversion and never mutates it. [`classify`] is the single place
//! that decides which compiler a node is routed to.
mod de;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Number, Value};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// One schema fragment: `true` / `false` or a keyword-bearing object.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    Bool(bool),
    Object(Box<SchemaObject>),
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchemaObject {
    // identity
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    #[serde(rename = "$id")]
    pub id: Option<String>,
    #[serde(rename = "$schema")]
    pub meta_schema: Option<String>,

    // annotations
    pub title: Option<String>,
    pub description: Option<String>,

    #[serde(rename = "type")]
    pub type_: Option<TypeSet>,

    // string
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<String>,
    pub format: Option<String>,

    // number / integer
    pub minimum: Option<Number>,
    pub maximum: Option<Number>,
    pub exclusive_minimum: Option<Exclusive>,
    pub exclusive_maximum: Option<Exclusive>,
    pub multiple_of: Option<Number>,

    // array
    pub items: Option<Items>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    pub unique_items: Option<bool>,

    // object
    pub properties: Option<IndexMap<String, Schema>>,
    pub required: Option<Vec<String>>,
    pub additional_properties: Option<Box<Schema>>,

    // composition
    pub all_of: Option<Vec<Schema>>,
    pub any_of: Option<Vec<Schema>>,
    pub one_of: Option<Vec<Schema>>,
    pub not: Option<Box<Schema>>,

    // value
    /// Tracked by presence: `"const": null` is `Some(Value::Null)`.
    #[serde(rename = "const", deserialize_with = "de::present")]
    pub const_: Option<Value>,
    #[serde(rename = "enum")]
    pub enum_: Option<Vec<Value>>,

    // definitions
    pub definitions: Option<IndexMap<String, Schema>>,
    #[serde(rename = "$defs")]
    pub defs: Option<IndexMap<String, Schema>>,

    pub nullable: Option<bool>,
}

/// `type` as written: one tag or a list of tags.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TypeSet {
    Single(TypeTag),
    Many(Vec<TypeTag>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeTag {
    Null,
    Boolean,
    Object,
    Array,
    Number,
    Integer,
    String,
    /// Anything outside the seven JSON Schema tags, kept for diagnostics.
    Unknown(String),
}

/// `exclusiveMinimum` / `exclusiveMaximum`: draft-06+ bound or draft-04 flag.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Exclusive {
    Flag(bool),
    Bound(Number),
}

/// `items`: one schema for every element, or per-position schemas.
#[derive(Debug, Clone, PartialEq)]
pub enum Items {
    Single(Box<Schema>),
    Tuple(Vec<Schema>),
}

// ————————————————————————————————————————————————————————————————————————————
// CLASSIFICATION
// ————————————————————————————————————————————————————————————————————————————

/// Keyword precedence, highest first. Only the first keyword present on a
/// node is honored; [`classify`] implements exactly this order.
pub const PRECEDENCE: [&str; 9] = [
    "$ref", "allOf", "anyOf", "oneOf", "not", "const", "enum", "nullable", "type",
];

/// Which compiler a node is routed to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape<'a> {
    Boolean(bool),
    Reference(&'a str),
    AllOf(&'a [Schema]),
    AnyOf(&'a [Schema]),
    OneOf(&'a [Schema]),
    Not(&'a SchemaObject),
    Const(&'a Value),
    Enum(&'a [Value]),
    Nullable(&'a SchemaObject),
    Typed(&'a SchemaObject, &'a TypeTag),
    TypeUnion(&'a SchemaObject, &'a [TypeTag]),
    Untyped,
}

pub fn classify(schema: &Schema) -> Shape<'_> {
    let obj = match schema {
        Schema::Bool(b) => return Shape::Boolean(*b),
        Schema::Object(obj) => obj.as_ref(),
    };
    if let Some(reference) = &obj.reference {
        return Shape::Reference(reference);
    }
    if let Some(xs) = &obj.all_of {
        return Shape::AllOf(xs);
    }
    if let Some(xs) = &obj.any_of {
        return Shape::AnyOf(xs);
    }
    if let Some(xs) = &obj.one_of {
        return Shape::OneOf(xs);
    }
    if obj.not.is_some() {
        return Shape::Not(obj);
    }
    if let Some(value) = &obj.const_ {
        return Shape::Const(value);
    }
    if let Some(values) = &obj.enum_ {
        return Shape::Enum(values);
    }
    if obj.nullable == Some(true) {
        return Shape::Nullable(obj);
    }
    classify_type(obj)
}

static OBJECT: TypeTag = TypeTag::Object;

/// The `type`-only tail of [`classify`], also used to compile the base of a
/// nullable node. A node without `type` that declares `properties` or
/// `additionalProperties` is read as an object.
pub fn classify_type(obj: &SchemaObject) -> Shape<'_> {
    match &obj.type_ {
        Some(TypeSet::Single(tag)) => Shape::Typed(obj, tag),
        Some(TypeSet::Many(tags)) => Shape::TypeUnion(obj, tags),
        None if obj.properties.is_some() || obj.additional_properties.is_some() => Shape::Typed(obj, &OBJECT),
        None => Shape::Untyped,
    }
}

// ————————————————————————————————————————————————————————————————————————————
// HELPERS
// ————————————————————————————————————————————————————————————————————————————

impl Schema {
    pub fn as_object(&self) -> Option<&SchemaObject> {
        match self {
            Schema::Object(obj) => Some(obj),
            Schema::Bool(_) => None,
        }
    }

    pub fn description(&self) -> Option<&str> {
        self.as_object().and_then(|o| o.description.as_deref())
    }

    /// `type: "object"` or carries `properties`.
    pub fn is_object_shaped(&self) -> bool {
        self.as_object().is_some_and(|o| {
            matches!(o.type_, Some(TypeSet::Single(TypeTag::Object))) || o.properties.is_some()
        })
    }
}

impl SchemaObject {
    pub fn is_required(&self, key: &str) -> bool {
        self.required.as_ref().is_some_and(|r| r.iter().any(|k| k == key))
    }
}

impl From<String> for TypeTag {
    fn from(s: String) -> Self {
        match s.as_str() {
            "null" => TypeTag::Null,
            "boolean" => TypeTag::Boolean,
            "object" => TypeTag::Object,
            "array" => TypeTag::Array,
            "number" => TypeTag::Number,
            "integer" => TypeTag::Integer,
            "string" => TypeTag::String,
            _ => TypeTag::Unknown(s),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
