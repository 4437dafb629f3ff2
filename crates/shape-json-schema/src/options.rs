use std::fmt;

use indexmap::IndexMap;
use shape_graph::{ShapeId, ShapeNode};

use crate::json_schema::JsonSchema;

/// Reads an annotation (title or description) from a shape.
pub type AnnotationFn = Box<dyn Fn(&ShapeNode) -> Option<String>>;

/// Invoked with every fragment built for a shape, after annotations are applied.
pub type PostProcessFn = Box<dyn Fn(ShapeId, &ShapeNode, &mut JsonSchema)>;

/// Options for shape to JSON Schema conversion
pub struct ConvertOptions {
    /// Shapes that are always emitted as named definitions.
    pub definitions: IndexMap<String, ShapeId>,
    /// The key under which definitions are stored.
    pub definitions_key: String,
    /// Prefix of every `$ref`.
    pub base_path: String,
    /// Value of `$schema`. Omitted from the output when `None`.
    pub dialect: Option<String>,
    /// Emit entries of `definitions` even when nothing references them.
    pub unused_definitions: bool,
    /// Render `const` as a one-element `enum`.
    pub const_as_enum: bool,
    pub title: Option<AnnotationFn>,
    pub description: Option<AnnotationFn>,
    pub postprocess: Option<PostProcessFn>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            definitions: IndexMap::new(),
            definitions_key: "definitions".to_string(),
            base_path: "#".to_string(),
            dialect: None,
            unused_definitions: false,
            const_as_enum: false,
            title: None,
            description: None,
            postprocess: None,
        }
    }
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_definition(mut self, name: impl Into<String>, shape: ShapeId) -> Self {
        self.definitions.insert(name.into(), shape);
        self
    }

    pub fn with_definitions_key(mut self, key: impl Into<String>) -> Self {
        self.definitions_key = key.into();
        self
    }

    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    pub fn with_dialect(mut self, dialect: impl Into<String>) -> Self {
        self.dialect = Some(dialect.into());
        self
    }

    pub fn with_unused_definitions(mut self, enabled: bool) -> Self {
        self.unused_definitions = enabled;
        self
    }

    pub fn with_const_as_enum(mut self, enabled: bool) -> Self {
        self.const_as_enum = enabled;
        self
    }

    pub fn with_title(mut self, accessor: impl Fn(&ShapeNode) -> Option<String> + 'static) -> Self {
        self.title = Some(Box::new(accessor));
        self
    }

    pub fn with_description(
        mut self,
        accessor: impl Fn(&ShapeNode) -> Option<String> + 'static,
    ) -> Self {
        self.description = Some(Box::new(accessor));
        self
    }

    pub fn with_postprocess(
        mut self,
        hook: impl Fn(ShapeId, &ShapeNode, &mut JsonSchema) + 'static,
    ) -> Self {
        self.postprocess = Some(Box::new(hook));
        self
    }

    /// Prefix shared by every definition reference, ending with `/`.
    pub fn definitions_path(&self) -> String {
        format!("{}/{}/", self.base_path, self.definitions_key)
    }

    pub(crate) fn title_of(&self, node: &ShapeNode) -> Option<String> {
        match &self.title {
            Some(accessor) => accessor(node),
            None => node.annotations.title.clone(),
        }
    }

    pub(crate) fn description_of(&self, node: &ShapeNode) -> Option<String> {
        match &self.description {
            Some(accessor) => accessor(node),
            None => node.annotations.description.clone(),
        }
    }
}

impl fmt::Debug for ConvertOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConvertOptions")
            .field("definitions", &self.definitions)
            .field("definitions_key", &self.definitions_key)
            .field("base_path", &self.base_path)
            .field("dialect", &self.dialect)
            .field("unused_definitions", &self.unused_definitions)
            .field("const_as_enum", &self.const_as_enum)
            .field("title", &self.title.is_some())
            .field("description", &self.description.is_some())
            .field("postprocess", &self.postprocess.is_some())
            .finish()
    }
}
