#![doc = include_str!("../README.md")]

mod document;
mod error;
pub mod json_schema;
mod options;
mod registry;
mod shape_to_json_schema;

pub use document::{JsonSchemaDocument, shape_to_json_schema, shapes_to_json_schema};
pub use error::ConversionError;
pub use json_schema::JsonSchema;
pub use options::{AnnotationFn, ConvertOptions, PostProcessFn};
pub use registry::{DefinitionEntry, DefinitionRegistry, SYNTHETIC_NAME_PREFIX};
pub use shape_to_json_schema::Converter;
