use json_valibot::{convert_value, DiagnosticKind, ModuleKind, Options};
use proptest::prelude::*;
use serde_json::{json, Value};

fn code(doc: &Value, options: &Options) -> String {
    convert_value(doc, options).unwrap().code
}

fn code_default(doc: Value) -> String {
    code(&doc, &Options::default())
}

// ————————————————————————————————————————————————————————————————————————————
// SCENARIOS
// ————————————————————————————————————————————————————————————————————————————

#[test]
fn object_with_required_and_optional_fields() {
    let out = code_default(json!({
        "type": "object",
        "properties": {"name": {"type": "string"}, "age": {"type": "number"}},
        "required": ["name"],
    }));
    assert!(out.contains("import * as v from 'valibot';"));
    assert!(out.contains("export const schema = v.object({"));
    assert!(out.contains("\"name\": v.string()"));
    assert!(out.contains("\"age\": v.optional(v.number())"));
}

#[test]
fn string_enum_becomes_picklist() {
    let out = code_default(json!({"enum": ["red", "green", "blue"]}));
    assert!(out.contains("export const schema = v.picklist([\"red\", \"green\", \"blue\"]);"));
}

#[test]
fn self_referential_definition() {
    let doc = json!({
        "type": "object",
        "properties": {"root": {"$ref": "#/definitions/Node"}},
        "definitions": {
            "Node": {
                "type": "object",
                "properties": {"value": {"type": "string"}, "child": {"$ref": "#/definitions/Node"}},
            }
        },
    });
    let out = code_default(doc.clone());
    assert!(out.contains("export type Node = { value?: string; child?: Node };"), "{out}");
    assert!(out.contains("export const NodeSchema: v.GenericSchema<Node> = v.object({"));
    assert!(out.contains("\"child\": v.optional(v.lazy(() => NodeSchema))"));
    assert!(out.contains("\"root\": v.optional(NodeSchema)"));

    for max_depth in [0, 1, 10, 1_000] {
        let options = Options { max_depth, ..Options::default() };
        assert!(code(&doc, &options).contains("export type Node = "), "max_depth {max_depth}");
    }
}

#[test]
fn closed_object_without_type() {
    let out = code_default(json!({"additionalProperties": false, "properties": {"id": {"type": "string"}}}));
    assert!(out.contains("export const schema = v.strictObject({\n  \"id\": v.optional(v.string())\n});"), "{out}");
}

#[test]
fn binary_tree() {
    let doc = json!({
        "type": "object",
        "properties": {"tree": {"$ref": "#/definitions/BinaryTree"}},
        "definitions": {
            "BinaryTree": {
                "type": "object",
                "properties": {
                    "value": {"type": "number"},
                    "left": {"anyOf": [{"$ref": "#/definitions/BinaryTree"}, {"type": "null"}]},
                    "right": {"anyOf": [{"$ref": "#/definitions/BinaryTree"}, {"type": "null"}]},
                },
                "required": ["value"],
            }
        },
    });
    let out = code_default(doc);
    assert!(out.contains("export type BinaryTree = { value: number; left?: BinaryTree | null; right?: BinaryTree | null };"));
    assert!(out.contains("export const BinaryTreeSchema: v.GenericSchema<BinaryTree> = v.object({"));
    assert!(out.contains("\"left\": v.optional(v.union([v.lazy(() => BinaryTreeSchema), v.null_()]))"));
    assert!(out.contains("\"value\": v.number()"));
    let def = out.find("export const BinaryTreeSchema").unwrap();
    let root = out.find("export const schema").unwrap();
    assert!(def < root);
}

#[test]
fn module_styles_and_names() {
    let doc = json!({"type": "string"});
    let cjs = code(&doc, &Options { module: ModuleKind::Cjs, ..Options::default() });
    assert!(cjs.contains("const v = require('valibot');"));
    assert!(cjs.contains("module.exports = { schema };"));

    let none = code(&doc, &Options { module: ModuleKind::None, ..Options::default() });
    assert!(!none.contains("import") && !none.contains("require"));
    assert!(none.contains("const schema = v.string();"));

    let named = code(&doc, &Options { name: "customSchema".into(), ..Options::default() });
    assert!(named.contains("export const customSchema = v.string();"));
}

#[test]
fn definitions_can_stay_private() {
    let doc = json!({
        "type": "object",
        "properties": {"profile": {"$ref": "#/$defs/Profile"}},
        "$defs": {"Profile": {"type": "object", "properties": {"bio": {"type": "string"}}}},
    });
    let out = code(&doc, &Options { export_definitions: false, ..Options::default() });
    assert!(out.contains("\nconst Profile = v.object({"));
    assert!(!out.contains("export const Profile"));
    assert!(out.contains("\"profile\": v.optional(Profile)"));
}

#[test]
fn types_and_docs_together() {
    let doc = json!({
        "description": "A user record.",
        "type": "object",
        "properties": {"tags": {"type": "array", "items": {"type": "string"}}},
    });
    let options = Options { with_types: true, with_js_doc: true, name: "User".into(), ..Options::default() };
    let out = code(&doc, &options);
    assert!(out.contains("/**\n * A user record.\n */\nexport const User = v.object({"));
    assert!(out.contains("export type UserType = { tags?: string[] };"));
}

#[test]
fn resolution_gaps_are_reported_not_fatal() {
    let conversion = convert_value(
        &json!({"type": "object", "properties": {"a": {"$ref": "#/definitions/Nope"}, "b": {"$ref": "other.json#/x"}}}),
        &Options::default(),
    )
    .unwrap();
    assert!(conversion.code.contains("\"a\": v.optional(v.any())"));
    let kinds: Vec<_> = conversion.diagnostics.iter().map(|d| d.kind).collect();
    assert_eq!(kinds, [DiagnosticKind::UnresolvedRef, DiagnosticKind::UnsupportedRef]);
    assert_eq!(conversion.diagnostics[0].path, "#/properties/a");
}

#[test]
fn non_schema_input_is_rejected() {
    assert!(convert_value(&json!({"anyOf": [null]}), &Options::default()).is_err());
    assert!(convert_value(&json!(42), &Options::default()).is_err());
}

// ————————————————————————————————————————————————————————————————————————————
// PROPERTIES
// ————————————————————————————————————————————————————————————————————————————

fn arb_primitive() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        (-1.0e6..1.0e6f64).prop_map(Value::from),
        "[a-zA-Z0-9 _\"\\\\-]{0,12}".prop_map(Value::from),
    ]
}

/// Ref-free schemas without `allOf`.
fn arb_schema() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(json!(true)),
        Just(json!(false)),
        (0u8..5).prop_map(|n| json!({"type": "string", "minLength": n})),
        Just(json!({"type": "integer", "minimum": 0})),
        Just(json!({"type": ["string", "null"]})),
        "[a-z]{1,6}".prop_map(|s| json!({"const": s})),
        Just(json!({"enum": [1, 2, 3]})),
    ];
    leaf.prop_recursive(4, 24, 3, |inner| {
        prop_oneof![
            inner.clone().prop_map(|s| json!({"type": "array", "items": s})),
            (inner.clone(), inner.clone())
                .prop_map(|(a, b)| json!({"type": "object", "properties": {"a": a, "b": b}, "required": ["a"]})),
            inner.clone().prop_map(|s| json!({"type": "object", "additionalProperties": s})),
            prop::collection::vec(inner.clone(), 1..4).prop_map(|xs| json!({"anyOf": xs})),
            inner.clone().prop_map(|s| json!({"not": s})),
            inner.prop_map(|s| json!({"oneOf": [s, {"type": "null"}]})),
        ]
    })
}

/// Replace every sub-schema nested deeper than `max` with `{}`.
fn truncate(schema: &Value, depth: usize, max: usize) -> Value {
    if depth > max {
        return json!({});
    }
    let Value::Object(map) = schema else { return schema.clone() };
    let mut out = map.clone();
    for (key, value) in out.iter_mut() {
        match key.as_str() {
            "properties" => {
                if let Value::Object(props) = value {
                    for prop in props.values_mut() {
                        *prop = truncate(prop, depth + 1, max);
                    }
                }
            }
            "anyOf" | "oneOf" => {
                if let Value::Array(members) = value {
                    for member in members.iter_mut() {
                        *member = truncate(member, depth + 1, max);
                    }
                }
            }
            // `additionalProperties: false` is a policy, not a sub-schema.
            "additionalProperties" if value.is_object() => *value = truncate(value, depth + 1, max),
            "items" | "not" => *value = truncate(value, depth + 1, max),
            _ => {}
        }
    }
    Value::Object(out)
}

proptest! {
    #[test]
    fn const_matches_single_value_enum(x in arb_primitive()) {
        let options = Options::default();
        prop_assert_eq!(code(&json!({"const": x.clone()}), &options), code(&json!({"enum": [x]}), &options));
    }

    #[test]
    fn any_of_strings_collapses(n in 1usize..6) {
        let doc = json!({"anyOf": vec![json!({"type": "string"}); n]});
        let out = code_default(doc);
        prop_assert!(out.contains("export const schema = v.string();"), "{}", out);
        prop_assert!(!out.contains("v.union"));
    }

    #[test]
    fn singleton_all_of_is_transparent(s in arb_schema()) {
        let options = Options { with_types: true, ..Options::default() };
        prop_assert_eq!(code(&json!({"allOf": [s.clone()]}), &options), code(&s, &options));
    }

    #[test]
    fn depth_cutoff_drops_everything_below_it(s in arb_schema(), d1 in 0usize..4, extra in 1usize..4) {
        let shallow = Options { max_depth: d1, ..Options::default() };
        let deep = Options { max_depth: d1 + extra, ..Options::default() };
        prop_assert_eq!(code(&s, &shallow), code(&truncate(&s, 0, d1), &deep));
    }
}
