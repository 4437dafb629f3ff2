//! Arena of shape nodes
//!
//! [`ShapeGraph`] owns every node and hands out [`ShapeId`]s. Cycles are built
//! by reserving a slot first and filling it once the nodes that point back at
//! it exist:
//!
//! ```
//! use shape_graph::{ShapeGraph, ShapeKind};
//! use indexmap::IndexMap;
//!
//! let mut graph = ShapeGraph::new();
//! let tree = graph.reserve();
//! let children = graph.lazy(tree);
//! let children = graph.array_of(children);
//! let mut properties = IndexMap::new();
//! properties.insert("children".to_string(), children);
//! graph.set(tree, ShapeKind::Object {
//!     properties,
//!     rest: None,
//!     keys_mode: Default::default(),
//! }).unwrap();
//! ```

use ahash::AHashSet;
use indexmap::IndexMap;
use serde_json::Value;

use crate::check::Check;
use crate::error::GraphError;
use crate::shape::{Annotations, KeysMode, Literal, ShapeId, ShapeKind, ShapeNode};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeGraph {
    nodes: Vec<ShapeNode>,
}

impl ShapeGraph {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: ShapeId) -> Option<&ShapeNode> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: ShapeId) -> Result<&mut ShapeNode, GraphError> {
        self.nodes
            .get_mut(id.0)
            .ok_or(GraphError::UnknownShape(id.0))
    }

    pub fn ids(&self) -> impl Iterator<Item = ShapeId> {
        (0..self.nodes.len()).map(ShapeId)
    }

    /// Append a node with the given kind and no checks or annotations.
    pub fn add(&mut self, kind: ShapeKind) -> ShapeId {
        self.add_node(ShapeNode::new(kind))
    }

    pub fn add_node(&mut self, node: ShapeNode) -> ShapeId {
        let id = ShapeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Reserve a slot, returning its ID.
    ///
    /// The slot holds `Any` until it is filled with [`ShapeGraph::set`].
    pub fn reserve(&mut self) -> ShapeId {
        self.add(ShapeKind::Any)
    }

    /// Replace the kind of an existing node, keeping its checks and annotations.
    pub fn set(&mut self, id: ShapeId, kind: ShapeKind) -> Result<(), GraphError> {
        self.node_mut(id)?.kind = kind;
        Ok(())
    }

    pub fn push_check(&mut self, id: ShapeId, check: Check) -> Result<ShapeId, GraphError> {
        self.node_mut(id)?.checks.push(check);
        Ok(id)
    }

    pub fn annotate(
        &mut self,
        id: ShapeId,
        annotations: Annotations,
    ) -> Result<ShapeId, GraphError> {
        self.node_mut(id)?.annotations = annotations;
        Ok(id)
    }

    pub fn set_title(
        &mut self,
        id: ShapeId,
        title: impl Into<String>,
    ) -> Result<ShapeId, GraphError> {
        self.node_mut(id)?.annotations.title = Some(title.into());
        Ok(id)
    }

    pub fn set_description(
        &mut self,
        id: ShapeId,
        description: impl Into<String>,
    ) -> Result<ShapeId, GraphError> {
        self.node_mut(id)?.annotations.description = Some(description.into());
        Ok(id)
    }

    /// Whether the shape accepts a missing value, i.e. whether an object key
    /// holding this shape may be left out.
    ///
    /// A shape reached again through a cycle answers `false`.
    pub fn accepts_absent(&self, id: ShapeId) -> bool {
        let mut visiting = AHashSet::new();
        self.accepts_absent_inner(id, &mut visiting)
    }

    fn accepts_absent_inner(&self, id: ShapeId, visiting: &mut AHashSet<ShapeId>) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        if !visiting.insert(id) {
            return false;
        }

        let accepts = match &node.kind {
            ShapeKind::Any | ShapeKind::Catch { .. } => true,
            ShapeKind::Const { value } => value.is_absent(),
            ShapeKind::Replace { base, input, .. } => {
                input.is_absent() || self.accepts_absent_inner(*base, visiting)
            }
            ShapeKind::Deny { base, denied } => {
                !denied.is_absent() && self.accepts_absent_inner(*base, visiting)
            }
            ShapeKind::Exclude { base, excluded } => {
                self.accepts_absent_inner(*base, visiting)
                    && !self.accepts_absent_inner(*excluded, visiting)
            }
            ShapeKind::Union { shapes } => shapes
                .iter()
                .any(|shape| self.accepts_absent_inner(*shape, visiting)),
            ShapeKind::Intersection { shapes } => shapes
                .iter()
                .all(|shape| self.accepts_absent_inner(*shape, visiting)),
            ShapeKind::Lazy { shape } => self.accepts_absent_inner(*shape, visiting),
            ShapeKind::Pipe { input, .. } => self.accepts_absent_inner(*input, visiting),
            ShapeKind::Transform { base } => self.accepts_absent_inner(*base, visiting),
            _ => false,
        };

        visiting.remove(&id);
        accepts
    }
}

// ============================================================================
// Constructors for common shapes
// ============================================================================

impl ShapeGraph {
    pub fn any(&mut self) -> ShapeId {
        self.add(ShapeKind::Any)
    }

    pub fn never(&mut self) -> ShapeId {
        self.add(ShapeKind::Never)
    }

    pub fn boolean(&mut self) -> ShapeId {
        self.add(ShapeKind::Boolean)
    }

    pub fn string(&mut self) -> ShapeId {
        self.add(ShapeKind::String)
    }

    pub fn number(&mut self) -> ShapeId {
        self.add(ShapeKind::Number)
    }

    /// A number shape carrying the integer check.
    pub fn integer(&mut self) -> ShapeId {
        self.add_node(ShapeNode {
            kind: ShapeKind::Number,
            checks: vec![Check::Integer],
            annotations: Annotations::default(),
        })
    }

    pub fn const_value(&mut self, value: impl Into<Value>) -> ShapeId {
        self.add(ShapeKind::Const {
            value: Literal::Value(value.into()),
        })
    }

    pub fn enumeration(&mut self, values: impl IntoIterator<Item = Value>) -> ShapeId {
        self.add(ShapeKind::Enum {
            values: values.into_iter().collect(),
        })
    }

    pub fn union(&mut self, shapes: impl IntoIterator<Item = ShapeId>) -> ShapeId {
        self.add(ShapeKind::Union {
            shapes: shapes.into_iter().collect(),
        })
    }

    pub fn intersection(&mut self, shapes: impl IntoIterator<Item = ShapeId>) -> ShapeId {
        self.add(ShapeKind::Intersection {
            shapes: shapes.into_iter().collect(),
        })
    }

    /// An object with the given keys, in the given order.
    pub fn object<K: Into<String>>(
        &mut self,
        properties: impl IntoIterator<Item = (K, ShapeId)>,
    ) -> ShapeId {
        self.add(ShapeKind::Object {
            properties: collect_properties(properties),
            rest: None,
            keys_mode: KeysMode::Preserved,
        })
    }

    /// An object that rejects undeclared keys.
    pub fn exact_object<K: Into<String>>(
        &mut self,
        properties: impl IntoIterator<Item = (K, ShapeId)>,
    ) -> ShapeId {
        self.add(ShapeKind::Object {
            properties: collect_properties(properties),
            rest: None,
            keys_mode: KeysMode::Exact,
        })
    }

    pub fn array_of(&mut self, item: ShapeId) -> ShapeId {
        self.add(ShapeKind::Array {
            shapes: Vec::new(),
            rest: Some(item),
        })
    }

    pub fn tuple(&mut self, shapes: impl IntoIterator<Item = ShapeId>) -> ShapeId {
        self.add(ShapeKind::Array {
            shapes: shapes.into_iter().collect(),
            rest: None,
        })
    }

    pub fn lazy(&mut self, shape: ShapeId) -> ShapeId {
        self.add(ShapeKind::Lazy { shape })
    }

    /// Allow the value to be missing.
    pub fn optional(&mut self, base: ShapeId) -> ShapeId {
        self.add(ShapeKind::Replace {
            base,
            input: Literal::Absent,
            output: Literal::Absent,
        })
    }

    /// Allow the value to be `null`.
    pub fn nullable(&mut self, base: ShapeId) -> ShapeId {
        self.add(ShapeKind::Replace {
            base,
            input: Literal::Value(Value::Null),
            output: Literal::Value(Value::Null),
        })
    }
}

fn collect_properties<K: Into<String>>(
    properties: impl IntoIterator<Item = (K, ShapeId)>,
) -> IndexMap<String, ShapeId> {
    properties
        .into_iter()
        .map(|(key, id)| (key.into(), id))
        .collect()
}
