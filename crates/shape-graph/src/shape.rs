//! Shape node representation
//!
//! A shape is one node of a validation graph. The graph is an arena, so every
//! child reference is a [`ShapeId`] and identity is index identity: two shapes
//! with identical content are still distinct nodes.

use indexmap::IndexMap;
use serde_json::Value;

use crate::check::Check;

/// Index of a shape inside a [`ShapeGraph`](crate::ShapeGraph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(pub usize);

/// A literal carried by const, replace and deny shapes.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Literal {
    /// The missing value (a key that is not present at all).
    #[default]
    Absent,
    Value(Value),
}

impl Literal {
    pub fn is_absent(&self) -> bool {
        matches!(self, Literal::Absent)
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Literal::Absent => None,
            Literal::Value(value) => Some(value),
        }
    }
}

impl From<Value> for Literal {
    fn from(value: Value) -> Self {
        Literal::Value(value)
    }
}

/// How an object shape treats keys that are not declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeysMode {
    /// Unknown keys are kept as-is.
    #[default]
    Preserved,
    /// Unknown keys are dropped from the output.
    Stripped,
    /// Unknown keys are rejected.
    Exact,
}

/// Human-facing annotations attached to a shape.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Annotations {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Arbitrary user annotations, in insertion order.
    pub extra: IndexMap<String, Value>,
}

/// A node in the shape graph
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeNode {
    pub kind: ShapeKind,
    /// Constraints in declaration order.
    pub checks: Vec<Check>,
    pub annotations: Annotations,
}

impl ShapeNode {
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            checks: Vec::new(),
            annotations: Annotations::default(),
        }
    }

    /// Iterate over checks whose kind tag equals `kind`.
    pub fn checks_of<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Check> + 'a {
        self.checks.iter().filter(move |check| check.kind() == kind)
    }
}

/// Content types for shape nodes
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    /// Accepts anything.
    Any,
    /// Accepts nothing.
    Never,
    Const {
        value: Literal,
    },
    Boolean,
    /// Integer-ness and bounds are expressed as checks.
    Number,
    BigInteger,
    /// Lengths and patterns are expressed as checks.
    String,
    Enum {
        values: Vec<Value>,
    },
    Union {
        shapes: Vec<ShapeId>,
    },
    Intersection {
        shapes: Vec<ShapeId>,
    },
    Object {
        properties: IndexMap<String, ShapeId>,
        /// Shape for keys that are not declared in `properties`.
        rest: Option<ShapeId>,
        keys_mode: KeysMode,
    },
    Record {
        key: Option<ShapeId>,
        value: ShapeId,
    },
    Array {
        /// Positional (tuple) elements.
        shapes: Vec<ShapeId>,
        /// Shape of elements past the positional ones.
        rest: Option<ShapeId>,
    },
    Set {
        value: ShapeId,
    },
    Map {
        key: ShapeId,
        value: ShapeId,
    },
    Date,
    Promise,
    Instance,
    /// An opaque primitive with no JSON representation.
    Symbol,
    /// Replaces `input` with `output` before handing the value to `base`.
    Replace {
        base: ShapeId,
        input: Literal,
        output: Literal,
    },
    Deny {
        base: ShapeId,
        denied: Literal,
    },
    Exclude {
        base: ShapeId,
        excluded: ShapeId,
    },
    /// Deferred reference, used to close cycles.
    Lazy {
        shape: ShapeId,
    },
    Pipe {
        input: ShapeId,
        output: ShapeId,
    },
    Catch {
        base: ShapeId,
        fallback: Value,
    },
    Transform {
        base: ShapeId,
    },
}

impl ShapeKind {
    /// Stable name of the kind, used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Any => "any",
            ShapeKind::Never => "never",
            ShapeKind::Const { .. } => "const",
            ShapeKind::Boolean => "boolean",
            ShapeKind::Number => "number",
            ShapeKind::BigInteger => "bigint",
            ShapeKind::String => "string",
            ShapeKind::Enum { .. } => "enum",
            ShapeKind::Union { .. } => "union",
            ShapeKind::Intersection { .. } => "intersection",
            ShapeKind::Object { .. } => "object",
            ShapeKind::Record { .. } => "record",
            ShapeKind::Array { .. } => "array",
            ShapeKind::Set { .. } => "set",
            ShapeKind::Map { .. } => "map",
            ShapeKind::Date => "date",
            ShapeKind::Promise => "promise",
            ShapeKind::Instance => "instance",
            ShapeKind::Symbol => "symbol",
            ShapeKind::Replace { .. } => "replace",
            ShapeKind::Deny { .. } => "deny",
            ShapeKind::Exclude { .. } => "exclude",
            ShapeKind::Lazy { .. } => "lazy",
            ShapeKind::Pipe { .. } => "pipe",
            ShapeKind::Catch { .. } => "catch",
            ShapeKind::Transform { .. } => "transform",
        }
    }

    /// Child shapes in the order the converter visits them. Records list the
    /// value before the key.
    pub fn children(&self) -> Vec<ShapeId> {
        match self {
            ShapeKind::Any
            | ShapeKind::Never
            | ShapeKind::Const { .. }
            | ShapeKind::Boolean
            | ShapeKind::Number
            | ShapeKind::BigInteger
            | ShapeKind::String
            | ShapeKind::Enum { .. }
            | ShapeKind::Date
            | ShapeKind::Promise
            | ShapeKind::Instance
            | ShapeKind::Symbol => Vec::new(),
            ShapeKind::Union { shapes } | ShapeKind::Intersection { shapes } => shapes.clone(),
            ShapeKind::Object {
                properties, rest, ..
            } => properties.values().copied().chain(*rest).collect(),
            ShapeKind::Record { key, value } => [*value].into_iter().chain(*key).collect(),
            ShapeKind::Array { shapes, rest } => shapes.iter().copied().chain(*rest).collect(),
            ShapeKind::Set { value } => vec![*value],
            ShapeKind::Map { key, value } => vec![*key, *value],
            ShapeKind::Replace { base, .. }
            | ShapeKind::Deny { base, .. }
            | ShapeKind::Catch { base, .. }
            | ShapeKind::Transform { base } => vec![*base],
            ShapeKind::Exclude { base, excluded } => vec![*base, *excluded],
            ShapeKind::Lazy { shape } => vec![*shape],
            ShapeKind::Pipe { input, output } => vec![*input, *output],
        }
    }
}
