//! Validation shape graph
//!
//! This crate provides the arena-backed graph of validation shapes that
//! `shape-json-schema` converts. It only describes shapes; it never validates
//! data against them.

pub mod check;
mod error;
mod graph;
mod shape;

pub use check::Check;
pub use error::GraphError;
pub use graph::ShapeGraph;
pub use shape::{Annotations, KeysMode, Literal, ShapeId, ShapeKind, ShapeNode};
