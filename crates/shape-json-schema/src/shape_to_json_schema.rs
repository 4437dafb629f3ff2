//! Conversion from a shape graph to JSON Schema
//!
//! [`Converter`] walks the graph depth-first. Shapes are inlined by default; a
//! shape becomes a named definition only when the caller named it, or when the
//! walk reaches it again while it is still being expanded. Shapes that are
//! merely shared (reachable on several paths without a cycle) are expanded
//! once per path.

use std::cmp::Ordering;

use indexmap::{IndexMap, IndexSet};
use serde_json::{Number, Value};
use shape_graph::check::NUMBER_INTEGER;
use shape_graph::{Check, KeysMode, Literal, ShapeGraph, ShapeId, ShapeKind, ShapeNode};
use tracing::{debug, trace};

use crate::document::JsonSchemaDocument;
use crate::error::ConversionError;
use crate::json_schema::*;
use crate::options::ConvertOptions;
use crate::registry::DefinitionRegistry;

/// A single conversion run over one graph.
///
/// The registry and the active path live as long as the converter, so every
/// shape converted through the same converter shares definitions.
pub struct Converter<'a> {
    graph: &'a ShapeGraph,
    options: &'a ConvertOptions,
    definitions_path: String,
    registry: DefinitionRegistry,
    /// Shapes currently being expanded, outermost first.
    active: IndexSet<ShapeId>,
}

impl<'a> Converter<'a> {
    /// Create a converter with the definitions from `options` pre-registered.
    pub fn new(graph: &'a ShapeGraph, options: &'a ConvertOptions) -> Self {
        let mut registry = DefinitionRegistry::new();
        for (name, id) in &options.definitions {
            registry.add_explicit(name.clone(), *id);
        }

        Self {
            graph,
            options,
            definitions_path: options.definitions_path(),
            registry,
            active: IndexSet::new(),
        }
    }

    /// Name a shape so that every use of it becomes a `$ref`.
    pub fn add_definition(&mut self, name: impl Into<String>, id: ShapeId) {
        self.registry.add_explicit(name, id);
    }

    fn get_node(&self, id: ShapeId) -> Result<&'a ShapeNode, ConversionError> {
        let graph = self.graph;
        graph.node(id).ok_or(ConversionError::InvalidNode(id.0))
    }

    fn reference(&self, name: &str) -> JsonSchema {
        JsonSchema::reference(format!("{}{}", self.definitions_path, name))
    }

    /// Convert a shape to a schema fragment.
    ///
    /// Returns a `$ref` for named and cyclic shapes; their expanded schema is
    /// kept in the registry and emitted by [`Converter::finish`].
    pub fn convert(&mut self, id: ShapeId) -> Result<JsonSchema, ConversionError> {
        let node = self.get_node(id)?;

        if let Some(name) = self.registry.explicit_name(id) {
            if let Some(entry) = self.registry.entry(id) {
                return Ok(self.reference(&entry.name));
            }
            let name = name.to_string();
            debug!(shape = id.0, name = %name, "expanding named definition");
            self.registry.open(id, name);
        } else if let Some(entry) = self.registry.entry(id) {
            return Ok(self.reference(&entry.name));
        } else if self.active.contains(&id) {
            let name = self.registry.mint_name();
            debug!(
                shape = id.0,
                name = %name,
                depth = self.active.len(),
                "cycle detected"
            );
            self.registry.open(id, name.clone());
            return Ok(self.reference(&name));
        }

        self.active.insert(id);
        let result = self.convert_node(id, node);
        self.active.pop();
        let schema = result?;

        match self.registry.finalize(id, schema) {
            Ok(name) => Ok(self.reference(&name)),
            Err(schema) => Ok(schema),
        }
    }

    fn convert_all(&mut self, ids: &[ShapeId]) -> Result<Vec<JsonSchema>, ConversionError> {
        ids.iter().map(|id| self.convert(*id)).collect()
    }

    /// Build the fragment for one shape.
    fn convert_node(
        &mut self,
        id: ShapeId,
        node: &'a ShapeNode,
    ) -> Result<JsonSchema, ConversionError> {
        trace!(shape = id.0, kind = node.kind.name(), "converting shape");

        let mut schema = match &node.kind {
            // Wrappers have no schema of their own.
            ShapeKind::Lazy { shape } => return self.convert(*shape),
            ShapeKind::Pipe { input, .. } => return self.convert(*input),
            ShapeKind::Catch { base, .. } | ShapeKind::Transform { base } => {
                return self.convert(*base);
            }

            ShapeKind::Any => JsonSchema::default(),
            ShapeKind::Never => JsonSchema::never(),
            ShapeKind::Boolean => JsonSchema::typed(SchemaType::Boolean),
            ShapeKind::BigInteger => JsonSchema::typed(SchemaType::Integer).with_format("int64"),
            ShapeKind::Date => JsonSchema::typed(SchemaType::String).with_format("date-time"),
            ShapeKind::Promise | ShapeKind::Instance => JsonSchema::typed(SchemaType::Object),
            ShapeKind::Symbol => {
                return Err(ConversionError::UnrepresentableKind(node.kind.name()));
            }
            ShapeKind::Const { value } => self.convert_const(value),
            ShapeKind::Enum { values } => JsonSchema {
                enum_values: Some(values.clone()),
                ..Default::default()
            },
            ShapeKind::Number => convert_number(node),
            ShapeKind::String => convert_string(node),
            ShapeKind::Union { shapes } => JsonSchema {
                composition: CompositionKeywords {
                    any_of: Some(self.convert_all(shapes)?),
                    ..Default::default()
                },
                ..Default::default()
            },
            ShapeKind::Intersection { shapes } => JsonSchema {
                composition: CompositionKeywords {
                    all_of: Some(self.convert_all(shapes)?),
                    ..Default::default()
                },
                ..Default::default()
            },
            ShapeKind::Object {
                properties,
                rest,
                keys_mode,
            } => self.convert_object(properties, *rest, *keys_mode)?,
            ShapeKind::Record { key, value } => self.convert_record(*key, *value)?,
            ShapeKind::Array { shapes, rest } => self.convert_array(node, shapes, *rest)?,
            ShapeKind::Set { value } => self.convert_set(node, *value)?,
            ShapeKind::Map { key, value } => self.convert_map(*key, *value)?,
            ShapeKind::Replace { base, input, .. } => self.convert_replace(*base, input)?,
            ShapeKind::Deny { base, denied } => {
                let mut schema = self.convert(*base)?;
                if let Some(denied) = denied.as_value() {
                    attach_not(&mut schema, self.literal(denied));
                }
                schema
            }
            ShapeKind::Exclude { base, excluded } => {
                let mut schema = self.convert(*base)?;
                let excluded = self.convert(*excluded)?;
                attach_not(&mut schema, excluded);
                schema
            }
        };

        self.annotate(id, node, &mut schema);
        Ok(schema)
    }

    /// Attach title and description, then run the post-processing hook.
    fn annotate(&self, id: ShapeId, node: &ShapeNode, schema: &mut JsonSchema) {
        if let Some(title) = self.options.title_of(node).filter(|t| !t.is_empty()) {
            schema.metadata.title = Some(title);
        }
        if let Some(description) = self
            .options
            .description_of(node)
            .filter(|d| !d.is_empty())
        {
            schema.metadata.description = Some(description);
        }
        if let Some(hook) = &self.options.postprocess {
            hook(id, node, schema);
        }
    }

    /// `{"const": value}`, or `{"enum": [value]}` when configured.
    fn literal(&self, value: &Value) -> JsonSchema {
        if self.options.const_as_enum {
            JsonSchema {
                enum_values: Some(vec![value.clone()]),
                ..Default::default()
            }
        } else {
            JsonSchema::constant(value.clone())
        }
    }

    fn convert_const(&self, value: &Literal) -> JsonSchema {
        match value.as_value() {
            Some(value) if !value.is_null() => self.literal(value),
            _ => JsonSchema::typed(SchemaType::Null),
        }
    }

    fn convert_replace(
        &mut self,
        base: ShapeId,
        input: &Literal,
    ) -> Result<JsonSchema, ConversionError> {
        if input.is_absent() {
            return self.convert(base);
        }

        let replaced = self.convert_const(input);
        let base = self.convert(base)?;
        Ok(JsonSchema {
            composition: CompositionKeywords {
                one_of: Some(vec![replaced, base]),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    fn convert_object(
        &mut self,
        properties: &IndexMap<String, ShapeId>,
        rest: Option<ShapeId>,
        keys_mode: KeysMode,
    ) -> Result<JsonSchema, ConversionError> {
        let mut converted = IndexMap::new();
        let mut required = Vec::new();

        for (key, &child) in properties {
            if !self.graph.accepts_absent(child) {
                required.push(key.clone());
            }
            converted.insert(key.clone(), self.convert(child)?);
        }

        let additional_properties = match rest {
            Some(rest) => Some(self.convert(rest)?.into()),
            None if keys_mode == KeysMode::Exact => Some(SubSchema::Bool(false)),
            None => None,
        };

        Ok(JsonSchema {
            object: ObjectKeywords {
                properties: (!converted.is_empty()).then_some(converted),
                required: (!required.is_empty()).then_some(required),
                additional_properties,
                property_names: None,
            },
            ..JsonSchema::typed(SchemaType::Object)
        })
    }

    fn convert_record(
        &mut self,
        key: Option<ShapeId>,
        value: ShapeId,
    ) -> Result<JsonSchema, ConversionError> {
        let additional_properties = self.convert(value)?;
        let property_names = key.map(|key| self.convert(key)).transpose()?;

        Ok(JsonSchema {
            object: ObjectKeywords {
                additional_properties: Some(additional_properties.into()),
                property_names: property_names.map(Box::new),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    fn convert_array(
        &mut self,
        node: &ShapeNode,
        shapes: &[ShapeId],
        rest: Option<ShapeId>,
    ) -> Result<JsonSchema, ConversionError> {
        let prefix_items = if shapes.is_empty() {
            None
        } else {
            Some(self.convert_all(shapes)?)
        };
        let items = match rest {
            Some(rest) => self.convert(rest)?.into(),
            None => SubSchema::Bool(false),
        };

        let mut array = ArrayKeywords {
            prefix_items,
            items: Some(items),
            ..Default::default()
        };
        for check in &node.checks {
            match check {
                Check::ArrayMinLength(n) => raise(&mut array.min_items, *n),
                Check::ArrayMaxLength(n) => lower(&mut array.max_items, *n),
                _ => {}
            }
        }

        Ok(JsonSchema {
            array,
            ..JsonSchema::typed(SchemaType::Array)
        })
    }

    fn convert_set(
        &mut self,
        node: &ShapeNode,
        value: ShapeId,
    ) -> Result<JsonSchema, ConversionError> {
        let mut array = ArrayKeywords {
            items: Some(self.convert(value)?.into()),
            unique_items: Some(true),
            ..Default::default()
        };
        for check in &node.checks {
            match check {
                Check::SetMinSize(n) => raise(&mut array.min_items, *n),
                Check::SetMaxSize(n) => lower(&mut array.max_items, *n),
                _ => {}
            }
        }

        Ok(JsonSchema {
            array,
            ..JsonSchema::typed(SchemaType::Array)
        })
    }

    /// A map is a list of `[key, value]` pairs.
    fn convert_map(&mut self, key: ShapeId, value: ShapeId) -> Result<JsonSchema, ConversionError> {
        let key = self.convert(key)?;
        let value = self.convert(value)?;

        let entry = JsonSchema {
            array: ArrayKeywords {
                prefix_items: Some(vec![key, value]),
                items: Some(SubSchema::Bool(false)),
                ..Default::default()
            },
            ..JsonSchema::typed(SchemaType::Array)
        };

        Ok(JsonSchema {
            array: ArrayKeywords {
                items: Some(entry.into()),
                ..Default::default()
            },
            ..JsonSchema::typed(SchemaType::Array)
        })
    }

    /// Assemble the final document around `root`.
    ///
    /// With `unused_definitions` set, every pre-registered definition is
    /// converted first so that it is emitted even if nothing references it.
    pub fn finish(mut self, root: JsonSchema) -> Result<JsonSchemaDocument, ConversionError> {
        let options = self.options;
        if options.unused_definitions {
            for &id in options.definitions.values() {
                self.convert(id)?;
            }
        }

        let definitions = self.registry.into_definitions()?;
        debug!(count = definitions.len(), "conversion finished");
        Ok(JsonSchemaDocument {
            dialect: options.dialect.clone(),
            root,
            definitions_key: options.definitions_key.clone(),
            definitions,
        })
    }
}

/// Put `not` on a schema, moving into `allOf` when `not` is already taken.
fn attach_not(schema: &mut JsonSchema, not: JsonSchema) {
    if schema.composition.not.is_none() {
        schema.composition.not = Some(Box::new(not));
        return;
    }
    schema
        .composition
        .all_of
        .get_or_insert_with(Vec::new)
        .push(JsonSchema {
            composition: CompositionKeywords {
                not: Some(Box::new(not)),
                ..Default::default()
            },
            ..Default::default()
        });
}

fn convert_number(node: &ShapeNode) -> JsonSchema {
    let schema_type = if node.checks_of(NUMBER_INTEGER).next().is_some() {
        SchemaType::Integer
    } else {
        SchemaType::Number
    };

    let mut numeric = NumericKeywords::default();
    for check in &node.checks {
        match check {
            Check::NumberMultipleOf(n) => numeric.multiple_of = Some(n.clone()),
            Check::NumberGreaterThanOrEqual(n) => raise_number(&mut numeric.minimum, n),
            Check::NumberLessThanOrEqual(n) => lower_number(&mut numeric.maximum, n),
            Check::NumberGreaterThan(n) => raise_number(&mut numeric.exclusive_minimum, n),
            Check::NumberLessThan(n) => lower_number(&mut numeric.exclusive_maximum, n),
            _ => {}
        }
    }

    JsonSchema {
        numeric,
        ..JsonSchema::typed(schema_type)
    }
}

fn convert_string(node: &ShapeNode) -> JsonSchema {
    let mut schema = JsonSchema::typed(SchemaType::String);

    for check in &node.checks {
        match check {
            Check::StringMinLength(n) => raise(&mut schema.string.min_length, *n),
            Check::StringMaxLength(n) => lower(&mut schema.string.max_length, *n),
            Check::StringPattern(pattern) if schema.string.pattern.is_none() => {
                schema.string.pattern = Some(pattern.clone());
            }
            Check::StringPattern(pattern) => {
                schema
                    .composition
                    .all_of
                    .get_or_insert_with(Vec::new)
                    .push(JsonSchema {
                        string: StringKeywords {
                            pattern: Some(pattern.clone()),
                            ..Default::default()
                        },
                        ..Default::default()
                    });
            }
            _ => {}
        }
    }

    schema
}

// Bound folding: a lower bound only moves up, an upper bound only moves down.

fn raise(slot: &mut Option<u64>, value: u64) {
    if slot.is_none_or(|current| value > current) {
        *slot = Some(value);
    }
}

fn lower(slot: &mut Option<u64>, value: u64) {
    if slot.is_none_or(|current| value < current) {
        *slot = Some(value);
    }
}

fn raise_number(slot: &mut Option<Number>, value: &Number) {
    if slot
        .as_ref()
        .is_none_or(|current| compare_numbers(value, current) == Ordering::Greater)
    {
        *slot = Some(value.clone());
    }
}

fn lower_number(slot: &mut Option<Number>, value: &Number) {
    if slot
        .as_ref()
        .is_none_or(|current| compare_numbers(value, current) == Ordering::Less)
    {
        *slot = Some(value.clone());
    }
}

fn compare_numbers(a: &Number, b: &Number) -> Ordering {
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        return a.cmp(&b);
    }
    if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
        return a.cmp(&b);
    }
    a.as_f64()
        .partial_cmp(&b.as_f64())
        .unwrap_or(Ordering::Equal)
}
