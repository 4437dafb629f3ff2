//! JSON Schema representation as Rust ADT
//!
//! A [`JsonSchema`] is one schema fragment. Keywords are grouped by the
//! vocabulary they belong to (string, numeric, array, object, composition)
//! and each group is flattened into the fragment when serialized, so a
//! fragment serializes to exactly the keywords that were set.
//!
//! Unlike a type-discriminated model, any keyword can sit next to any other:
//! the converter attaches `not` to a `$ref`, appends `allOf` to a string
//! schema, and lets post-processing hooks add arbitrary keywords.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};

/// The `$schema` URI of JSON Schema draft 2020-12.
pub const DRAFT_2020_12: &str = "https://json-schema.org/draft/2020-12/schema";

/// Common metadata fields for all schema types
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SchemaMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Value of the `type` keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    Array,
    Boolean,
    Integer,
    Null,
    Number,
    Object,
    String,
}

/// A position that accepts either a schema or a boolean schema
/// (`items`, `additionalProperties`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SubSchema {
    Bool(bool),
    Schema(Box<JsonSchema>),
}

impl From<JsonSchema> for SubSchema {
    fn from(schema: JsonSchema) -> Self {
        SubSchema::Schema(Box::new(schema))
    }
}

/// String keywords
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StringKeywords {
    #[serde(rename = "minLength", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,

    #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// Numeric keywords
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct NumericKeywords {
    #[serde(rename = "multipleOf", skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<Number>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,

    #[serde(rename = "exclusiveMinimum", skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<Number>,

    #[serde(rename = "exclusiveMaximum", skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<Number>,
}

/// Array keywords
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ArrayKeywords {
    #[serde(rename = "prefixItems", skip_serializing_if = "Option::is_none")]
    pub prefix_items: Option<Vec<JsonSchema>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<SubSchema>,

    #[serde(rename = "minItems", skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,

    #[serde(rename = "maxItems", skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,

    #[serde(rename = "uniqueItems", skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,
}

/// Object keywords
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ObjectKeywords {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, JsonSchema>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,

    #[serde(rename = "additionalProperties", skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<SubSchema>,

    #[serde(rename = "propertyNames", skip_serializing_if = "Option::is_none")]
    pub property_names: Option<Box<JsonSchema>>,
}

/// Composition keywords
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CompositionKeywords {
    #[serde(rename = "allOf", skip_serializing_if = "Option::is_none")]
    pub all_of: Option<Vec<JsonSchema>>,

    #[serde(rename = "anyOf", skip_serializing_if = "Option::is_none")]
    pub any_of: Option<Vec<JsonSchema>>,

    #[serde(rename = "oneOf", skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<JsonSchema>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub not: Option<Box<JsonSchema>>,
}

/// A JSON Schema fragment
///
/// The default value is the empty schema `{}`, which accepts anything.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(remote = "Self")]
pub struct JsonSchema {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(rename = "const", skip_serializing_if = "Option::is_none")]
    pub const_value: Option<Value>,

    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,

    #[serde(flatten)]
    pub string: StringKeywords,

    #[serde(flatten)]
    pub numeric: NumericKeywords,

    #[serde(flatten)]
    pub array: ArrayKeywords,

    #[serde(flatten)]
    pub object: ObjectKeywords,

    #[serde(flatten)]
    pub composition: CompositionKeywords,

    #[serde(flatten)]
    pub metadata: SchemaMetadata,

    /// Extra keywords, e.g. added by hooks. An extension replaces the
    /// modelled keyword of the same name.
    #[serde(skip)]
    pub extensions: IndexMap<String, Value>,
}

impl Serialize for JsonSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.extensions.is_empty() {
            return JsonSchema::serialize(self, serializer);
        }

        let keywords = JsonSchema::serialize(self, serde_json::value::Serializer)
            .map_err(<S::Error as serde::ser::Error>::custom)?;
        let mut keywords = match keywords {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for (key, value) in &self.extensions {
            keywords.insert(key.clone(), value.clone());
        }
        keywords.serialize(serializer)
    }
}

impl JsonSchema {
    /// A `$ref` schema
    pub fn reference(reference: impl Into<String>) -> Self {
        Self {
            reference: Some(reference.into()),
            ..Default::default()
        }
    }

    /// A schema with only the `type` keyword
    pub fn typed(schema_type: SchemaType) -> Self {
        Self {
            schema_type: Some(schema_type),
            ..Default::default()
        }
    }

    /// A schema with only the `const` keyword
    pub fn constant(value: Value) -> Self {
        Self {
            const_value: Some(value),
            ..Default::default()
        }
    }

    /// The schema that rejects everything, `{"not": {}}`
    pub fn never() -> Self {
        Self {
            composition: CompositionKeywords {
                not: Some(Box::new(JsonSchema::default())),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}
