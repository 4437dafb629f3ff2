//! Top-level document output and the conversion entry points

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use shape_graph::{ShapeGraph, ShapeId};
use tracing::debug;

use crate::error::ConversionError;
use crate::json_schema::JsonSchema;
use crate::options::ConvertOptions;
use crate::shape_to_json_schema::Converter;

const DIALECT_KEY: &str = "$schema";

/// A complete JSON Schema document
///
/// Serializes as `$schema` (when set), then the root keywords, then the
/// definitions container under `definitions_key` (when non-empty).
#[derive(Debug, Clone, PartialEq)]
pub struct JsonSchemaDocument {
    pub dialect: Option<String>,
    pub root: JsonSchema,
    pub definitions_key: String,
    /// Named definitions in discovery order.
    pub definitions: IndexMap<String, JsonSchema>,
}

impl JsonSchemaDocument {
    pub fn definition(&self, name: &str) -> Option<&JsonSchema> {
        self.definitions.get(name)
    }

    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

impl Serialize for JsonSchemaDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let root = self
            .root
            .to_value()
            .map_err(<S::Error as serde::ser::Error>::custom)?;
        let root = match root {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        // Each key is written once: `$schema` wins over everything, the
        // definitions container wins over a root keyword of the same name.
        let dialect = self.dialect.as_deref();
        let definitions_key = (!self.definitions.is_empty())
            .then_some(self.definitions_key.as_str())
            .filter(|key| dialect.is_none() || *key != DIALECT_KEY);

        let mut map = serializer.serialize_map(None)?;
        if let Some(dialect) = dialect {
            map.serialize_entry(DIALECT_KEY, dialect)?;
        }
        for (key, value) in &root {
            let shadowed = (dialect.is_some() && key == DIALECT_KEY)
                || definitions_key.is_some_and(|definitions_key| key == definitions_key);
            if !shadowed {
                map.serialize_entry(key, value)?;
            }
        }
        if let Some(key) = definitions_key {
            map.serialize_entry(key, &self.definitions)?;
        }
        map.end()
    }
}

/// Convert the shape at `root` into a JSON Schema document.
pub fn shape_to_json_schema(
    graph: &ShapeGraph,
    root: ShapeId,
    options: &ConvertOptions,
) -> Result<JsonSchemaDocument, ConversionError> {
    debug!(root = root.0, nodes = graph.len(), "converting shape graph");
    let mut converter = Converter::new(graph, options);
    let schema = converter.convert(root)?;
    converter.finish(schema)
}

/// Convert several named shapes into one document.
///
/// Every root becomes a definition under its name and the document root is
/// the empty schema. All roots are registered before any of them is
/// converted, so roots that refer to each other produce `$ref`s.
pub fn shapes_to_json_schema<K: Into<String>>(
    graph: &ShapeGraph,
    roots: impl IntoIterator<Item = (K, ShapeId)>,
    options: &ConvertOptions,
) -> Result<JsonSchemaDocument, ConversionError> {
    let roots: Vec<(String, ShapeId)> = roots
        .into_iter()
        .map(|(name, id)| (name.into(), id))
        .collect();
    debug!(roots = roots.len(), nodes = graph.len(), "converting shape graph");

    let mut converter = Converter::new(graph, options);
    for (name, id) in &roots {
        converter.add_definition(name.clone(), *id);
    }
    for (_, id) in &roots {
        converter.convert(*id)?;
    }
    converter.finish(JsonSchema::default())
}
