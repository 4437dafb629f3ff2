use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use shape_graph::{Annotations, Check, ShapeGraph, ShapeId, ShapeKind};
use shape_json_schema::json_schema::{DRAFT_2020_12, JsonSchema};
use shape_json_schema::{ConvertOptions, shape_to_json_schema, shapes_to_json_schema};

fn convert_with(graph: &ShapeGraph, root: ShapeId, options: &ConvertOptions) -> Value {
    shape_to_json_schema(graph, root, options)
        .unwrap()
        .to_value()
        .unwrap()
}

fn self_referencing(graph: &mut ShapeGraph) -> ShapeId {
    let id = graph.reserve();
    let next = graph.lazy(id);
    graph
        .set(
            id,
            ShapeKind::Object {
                properties: [("next".to_string(), next)].into_iter().collect(),
                rest: None,
                keys_mode: Default::default(),
            },
        )
        .unwrap();
    id
}

#[test]
fn base_path_and_definitions_key_shape_references() {
    let mut graph = ShapeGraph::new();
    let root = self_referencing(&mut graph);
    let options = ConvertOptions::new()
        .with_base_path("https://example.com/schema.json#")
        .with_definitions_key("$defs");

    assert_eq!(
        convert_with(&graph, root, &options),
        json!({
            "$ref": "https://example.com/schema.json#/$defs/shape1",
            "$defs": {
                "shape1": {
                    "type": "object",
                    "properties": {
                        "next": {"$ref": "https://example.com/schema.json#/$defs/shape1"}
                    },
                    "required": ["next"]
                }
            }
        })
    );
}

#[test]
fn dialect_is_emitted_first() {
    let mut graph = ShapeGraph::new();
    let root = graph.boolean();
    let options = ConvertOptions::new().with_dialect(DRAFT_2020_12);

    let document = shape_to_json_schema(&graph, root, &options).unwrap();
    assert_eq!(
        serde_json::to_string(&document).unwrap(),
        r#"{"$schema":"https://json-schema.org/draft/2020-12/schema","type":"boolean"}"#
    );
}

#[test]
fn dialect_is_absent_by_default() {
    let mut graph = ShapeGraph::new();
    let root = graph.boolean();

    let value = convert_with(&graph, root, &ConvertOptions::default());
    assert_eq!(value, json!({"type": "boolean"}));
}

#[test]
fn const_as_enum_applies_to_every_literal() {
    let mut graph = ShapeGraph::new();
    let fixed = graph.const_value("on");
    let base = graph.string();
    let denied = graph.add(ShapeKind::Deny {
        base,
        denied: json!("off").into(),
    });
    let replaced = graph.add(ShapeKind::Replace {
        base,
        input: json!(0).into(),
        output: json!("zero").into(),
    });
    let root = graph.tuple([fixed, denied, replaced]);
    let options = ConvertOptions::new().with_const_as_enum(true);

    assert_eq!(
        convert_with(&graph, root, &options),
        json!({
            "type": "array",
            "prefixItems": [
                {"enum": ["on"]},
                {"type": "string", "not": {"enum": ["off"]}},
                {"oneOf": [{"enum": [0]}, {"type": "string"}]}
            ],
            "items": false
        })
    );
}

#[test]
fn annotations_become_title_and_description() {
    let mut graph = ShapeGraph::new();
    let name = graph.string();
    graph.set_title(name, "Name").unwrap();
    graph.set_description(name, "Full name of the user").unwrap();
    let root = graph.object([("name", name)]);
    graph.set_title(root, "User").unwrap();

    assert_eq!(
        convert_with(&graph, root, &ConvertOptions::default()),
        json!({
            "type": "object",
            "title": "User",
            "properties": {
                "name": {
                    "type": "string",
                    "title": "Name",
                    "description": "Full name of the user"
                }
            },
            "required": ["name"]
        })
    );
}

#[test]
fn empty_annotations_are_skipped() {
    let mut graph = ShapeGraph::new();
    let root = graph.string();
    graph.set_title(root, "").unwrap();

    assert_eq!(
        convert_with(&graph, root, &ConvertOptions::default()),
        json!({"type": "string"})
    );
}

#[test]
fn custom_annotation_accessors() {
    let mut graph = ShapeGraph::new();
    let root = graph.number();
    let mut annotations = Annotations::default();
    annotations.extra.insert("label".to_string(), json!("Amount"));
    annotations.extra.insert("help".to_string(), json!("In cents"));
    annotations.title = Some("ignored".to_string());
    graph.annotate(root, annotations).unwrap();

    let options = ConvertOptions::new()
        .with_title(|node| {
            node.annotations
                .extra
                .get("label")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .with_description(|node| {
            node.annotations
                .extra
                .get("help")
                .and_then(Value::as_str)
                .map(str::to_string)
        });

    assert_eq!(
        convert_with(&graph, root, &options),
        json!({"type": "number", "title": "Amount", "description": "In cents"})
    );
}

#[test]
fn postprocess_sees_every_built_fragment() {
    let mut graph = ShapeGraph::new();
    let name = graph.string();
    let tag = graph.string();
    graph.push_check(tag, Check::custom("tag", json!(null))).unwrap();
    let tags = graph.array_of(tag);
    let lazy = graph.lazy(name);
    let root = graph.object([("name", lazy), ("tags", tags)]);

    let seen = Rc::new(RefCell::new(Vec::new()));
    let recorder = Rc::clone(&seen);
    let options = ConvertOptions::new().with_postprocess(move |id, node, schema| {
        recorder.borrow_mut().push(id);
        if node.checks.iter().any(|check| check.kind() == "tag") {
            schema
                .extensions
                .insert("x-tag".to_string(), json!(true));
        }
    });

    assert_eq!(
        convert_with(&graph, root, &options),
        json!({
            "type": "object",
            "properties": {
                "name": {"type": "string"},
                "tags": {"type": "array", "items": {"type": "string", "x-tag": true}}
            },
            "required": ["name", "tags"]
        })
    );
    // The lazy wrapper builds no fragment of its own.
    assert_eq!(*seen.borrow(), vec![name, tag, tags, root]);
}

#[test]
fn postprocess_runs_after_annotations() {
    let mut graph = ShapeGraph::new();
    let root = graph.string();
    graph.set_title(root, "Original").unwrap();

    let options = ConvertOptions::new().with_postprocess(|_, _, schema: &mut JsonSchema| {
        let title = schema.metadata.title.take().unwrap_or_default();
        schema.metadata.title = Some(title.to_uppercase());
    });

    assert_eq!(
        convert_with(&graph, root, &options),
        json!({"type": "string", "title": "ORIGINAL"})
    );
}

#[test]
fn postprocess_extension_replaces_built_keyword() {
    let mut graph = ShapeGraph::new();
    let root = graph.string();
    let options = ConvertOptions::new().with_postprocess(|_, _, schema: &mut JsonSchema| {
        schema
            .extensions
            .insert("type".to_string(), json!("number"));
    });

    let document = shape_to_json_schema(&graph, root, &options).unwrap();
    assert_eq!(
        serde_json::to_string(&document).unwrap(),
        r#"{"type":"number"}"#
    );
}

#[test]
fn definitions_key_shadowing_a_root_keyword() {
    let mut graph = ShapeGraph::new();
    let cyclic = self_referencing(&mut graph);
    let root = graph.object([("a", cyclic)]);
    let options = ConvertOptions::new().with_definitions_key("properties");

    let document = shape_to_json_schema(&graph, root, &options).unwrap();
    assert_eq!(
        serde_json::to_string(&document).unwrap(),
        concat!(
            r##"{"type":"object","required":["a"],"properties":{"shape1":"##,
            r##"{"type":"object","properties":{"next":{"$ref":"#/properties/shape1"}},"##,
            r##""required":["next"]}}}"##
        )
    );
}

#[test]
fn named_roots_force_unused_definitions() {
    let mut graph = ShapeGraph::new();
    let root = graph.string();
    let extra = graph.number();
    let options = ConvertOptions::new()
        .with_definition("extra", extra)
        .with_unused_definitions(true)
        .with_definitions_key("$defs");

    let document = shapes_to_json_schema(&graph, [("root", root)], &options).unwrap();
    assert_eq!(
        document.to_value().unwrap(),
        json!({
            "$defs": {
                "root": {"type": "string"},
                "extra": {"type": "number"}
            }
        })
    );
    assert!(document.definition("extra").is_some());
}
