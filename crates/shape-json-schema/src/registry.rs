//! Definition registry
//!
//! Tracks which shapes are emitted as named definitions. A shape gets an entry
//! either because the caller named it up front, or because the converter found
//! it on its own expansion path (a cycle) and had to give it a synthetic name.
//!
//! Entries are created pending and finalized exactly once.

use ahash::{AHashMap, AHashSet};
use indexmap::IndexMap;
use shape_graph::ShapeId;

use crate::error::ConversionError;
use crate::json_schema::JsonSchema;

/// Prefix of names minted for cyclic shapes without an explicit name.
pub const SYNTHETIC_NAME_PREFIX: &str = "shape";

#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionEntry {
    pub name: String,
    /// `None` while the shape is still being expanded.
    pub schema: Option<JsonSchema>,
}

#[derive(Debug, Default)]
pub struct DefinitionRegistry {
    /// Entries in discovery order.
    entries: IndexMap<ShapeId, DefinitionEntry>,
    explicit: AHashMap<ShapeId, String>,
    used_names: AHashSet<String>,
    counter: usize,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name a shape up front. Naming the same shape again replaces its name,
    /// but both names stay reserved.
    pub fn add_explicit(&mut self, name: impl Into<String>, id: ShapeId) {
        let name = name.into();
        self.used_names.insert(name.clone());
        self.explicit.insert(id, name);
    }

    pub fn explicit_name(&self, id: ShapeId) -> Option<&str> {
        self.explicit.get(&id).map(String::as_str)
    }

    pub fn entry(&self, id: ShapeId) -> Option<&DefinitionEntry> {
        self.entries.get(&id)
    }

    pub fn is_used(&self, name: &str) -> bool {
        self.used_names.contains(name)
    }

    /// Create a pending entry for `id` under `name`.
    pub fn open(&mut self, id: ShapeId, name: impl Into<String>) {
        let name = name.into();
        self.used_names.insert(name.clone());
        self.entries.entry(id).or_insert(DefinitionEntry { name, schema: None });
    }

    /// Produce a name that no other definition uses.
    pub fn mint_name(&mut self) -> String {
        loop {
            self.counter += 1;
            let name = format!("{SYNTHETIC_NAME_PREFIX}{}", self.counter);
            if !self.used_names.contains(&name) {
                return name;
            }
        }
    }

    /// Store the schema of a pending entry. Returns the entry name, or hands
    /// the schema back when `id` has no entry.
    pub fn finalize(&mut self, id: ShapeId, schema: JsonSchema) -> Result<String, JsonSchema> {
        match self.entries.get_mut(&id) {
            Some(entry) => {
                entry.schema = Some(schema);
                Ok(entry.name.clone())
            }
            None => Err(schema),
        }
    }

    /// Consume the registry, yielding definitions in discovery order.
    pub fn into_definitions(self) -> Result<IndexMap<String, JsonSchema>, ConversionError> {
        self.entries
            .into_values()
            .map(|entry| match entry.schema {
                Some(schema) => Ok((entry.name, schema)),
                None => Err(ConversionError::PendingDefinition(entry.name)),
            })
            .collect()
    }
}
