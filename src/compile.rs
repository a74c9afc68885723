//! Recursive schema → Valibot compiler.
//!
//! [`Compiler::parse_schema`] is the dispatcher: it classifies a node (see
//! [`crate::schema::classify`]) and routes it to one of the keyword
//! compilers, which recurse back into it for nested schemas. Every call
//! returns a [`ParseResult`]; all shared state (the reference table and the
//! diagnostics list) lives on the `Compiler`, and only the [`Cursor`]
//! (depth and path) is threaded by value.
pub mod arr;
pub mod compose;
pub mod literal;
pub mod num;
pub mod obj;
pub mod str;

use tracing::{debug, trace, warn};

use crate::ir::{Diagnostic, DiagnosticKind, ParseResult};
use crate::refs::RefTable;
use crate::schema::{classify, classify_type, Schema, SchemaObject, Shape, TypeTag};

// ————————————————————————————————————————————————————————————————————————————
// CURSOR
// ————————————————————————————————————————————————————————————————————————————

/// Position of the node being compiled. `depth` grows by one per descent
/// into a sub-schema; `path` is for diagnostics only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cursor {
    pub depth: usize,
    pub path: Vec<String>,
}

impl Cursor {
    pub fn root() -> Self {
        Self::default()
    }

    /// Start of a named definition: depth 0, path at the definition.
    pub fn definition(pointer: &str) -> Self {
        let path = pointer
            .trim_start_matches('#')
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| s.replace("~1", "/").replace("~0", "~"))
            .collect();
        Self { depth: 0, path }
    }

    /// One level down, under `key`.
    pub fn descend(&self, key: &str) -> Self {
        let mut path = self.path.clone();
        path.push(key.to_string());
        Self { depth: self.depth + 1, path }
    }

    /// One level down, under `keyword/<index>`.
    pub fn descend_index(&self, keyword: &str, index: usize) -> Self {
        let mut next = self.descend(keyword);
        next.path.push(index.to_string());
        next
    }

    /// One level down, under `keyword/<key>`.
    pub fn descend_key(&self, keyword: &str, key: &str) -> Self {
        let mut next = self.descend(keyword);
        next.path.push(key.to_string());
        next
    }

    /// `path` as a JSON pointer fragment, e.g. `#/properties/a~1b`.
    pub fn pointer(&self) -> String {
        let mut out = String::from("#");
        for segment in &self.path {
            out.push('/');
            out.push_str(&segment.replace('~', "~0").replace('/', "~1"));
        }
        out
    }
}

// ————————————————————————————————————————————————————————————————————————————
// COMPILER
// ————————————————————————————————————————————————————————————————————————————

pub struct Compiler<'s> {
    refs: RefTable<'s>,
    max_depth: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'s> Compiler<'s> {
    /// Pre-scan `root`'s definitions and detect cycles. `reserved` names
    /// are kept away from definition bindings.
    pub fn new(root: &'s Schema, max_depth: usize, reserved: &[&str]) -> Self {
        Self { refs: RefTable::build(root, reserved), max_depth, diagnostics: Vec::new() }
    }

    pub fn refs(&self) -> &RefTable<'s> {
        &self.refs
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn finish(self) -> (RefTable<'s>, Vec<Diagnostic>) {
        (self.refs, self.diagnostics)
    }

    pub(crate) fn diagnose(&mut self, kind: DiagnosticKind, cx: &Cursor, message: String) {
        let diagnostic = Diagnostic { kind, path: cx.pointer(), message };
        debug!(%diagnostic, "diagnostic");
        self.diagnostics.push(diagnostic);
    }

    // ------------------------------- Dispatch ------------------------------- //

    pub fn parse_schema(&mut self, schema: &'s Schema, cx: &Cursor) -> ParseResult {
        if cx.depth > self.max_depth {
            trace!(path = %cx.pointer(), depth = cx.depth, "depth cutoff");
            return ParseResult::any();
        }
        match classify(schema) {
            Shape::Boolean(true) => ParseResult::any(),
            Shape::Boolean(false) => ParseResult::never(),
            Shape::Reference(pointer) => self.resolve_ref(pointer, cx),
            Shape::AllOf(xs) => self.compile_all_of(xs, cx),
            Shape::AnyOf(xs) => self.compile_any_of(xs, "anyOf", cx),
            Shape::OneOf(xs) => self.compile_one_of(xs, cx),
            Shape::Not(obj) => self.compile_not(obj, cx),
            Shape::Const(value) => literal::compile_const(value),
            Shape::Enum(values) => literal::compile_enum(values),
            Shape::Nullable(obj) => {
                let base = self.parse_type(classify_type(obj), cx);
                nullable(base)
            }
            shape => self.parse_type(shape, cx),
        }
    }

    /// Route on `type` alone.
    fn parse_type(&mut self, shape: Shape<'s>, cx: &Cursor) -> ParseResult {
        match shape {
            Shape::Typed(obj, tag) => self.parse_tag(obj, tag, cx),
            Shape::TypeUnion(obj, tags) if !tags.is_empty() => {
                let results = tags.iter().map(|tag| self.parse_tag(obj, tag, cx)).collect();
                compose::union_of(results)
            }
            _ => ParseResult::any(),
        }
    }

    fn parse_tag(&mut self, obj: &'s SchemaObject, tag: &TypeTag, cx: &Cursor) -> ParseResult {
        match tag {
            TypeTag::String => str::compile_string(obj),
            TypeTag::Number => num::compile_number(obj, false),
            TypeTag::Integer => num::compile_number(obj, true),
            TypeTag::Boolean => ParseResult::new("v.boolean()", ["boolean"], Some("boolean".into())),
            TypeTag::Null => ParseResult::new("v.null_()", ["null_"], Some("null".into())),
            TypeTag::Array => self.compile_array(obj, cx),
            TypeTag::Object => self.compile_object(obj, cx),
            TypeTag::Unknown(name) => {
                self.diagnose(DiagnosticKind::UnknownType, cx, format!("unknown type `{name}`; using v.any()"));
                ParseResult::any()
            }
        }
    }

    // ------------------------------ References ------------------------------ //

    /// Resolve a `$ref` to a binding name, a lazy self-reference, or
    /// `v.any()` when nothing matches.
    pub fn resolve_ref(&mut self, pointer: &str, cx: &Cursor) -> ParseResult {
        let Some(idx) = self.refs.lookup(pointer) else {
            let kind = if pointer.starts_with('#') {
                DiagnosticKind::UnresolvedRef
            } else {
                DiagnosticKind::UnsupportedRef
            };
            self.diagnose(kind, cx, format!("cannot resolve `$ref` {pointer}; using v.any()"));
            return ParseResult::any();
        };

        if self.refs.entry(idx).processing {
            self.refs.mark_recursive(idx);
            let entry = self.refs.entry(idx);
            return ParseResult::new(
                format!("v.lazy(() => {})", entry.binding),
                ["lazy"],
                Some(entry.name.clone()),
            );
        }

        if self.refs.entry(idx).generated.is_none() {
            self.generate_entry(idx);
        }

        let entry = self.refs.entry(idx);
        let ty = if entry.recursive {
            Some(entry.name.clone())
        } else {
            entry.generated.as_ref().and_then(|g| g.ty.clone())
        };
        ParseResult::new(entry.binding.clone(), [], ty)
    }

    /// Generate every definition that has not been generated on demand.
    pub fn generate_definitions(&mut self) {
        for idx in 0..self.refs.len() {
            if self.refs.entry(idx).generated.is_none() {
                self.generate_entry(idx);
            }
        }
    }

    fn generate_entry(&mut self, idx: usize) {
        let entry = self.refs.entry(idx);
        let (schema, pointer) = (entry.schema, entry.pointer.clone());
        let cx = Cursor::definition(&pointer);
        if entry.processing {
            warn!(%pointer, "definition re-entered while generating; using v.any()");
            self.diagnose(
                DiagnosticKind::ReentrantDefinition,
                &cx,
                format!("definition {pointer} re-entered while generating; using v.any()"),
            );
            return;
        }
        debug!(%pointer, "generating definition");
        self.refs.begin(idx);
        let result = self.parse_schema(schema, &cx);
        self.refs.finish(idx, result);
    }
}

/// `v.nullable(base)`, widening the projected type with `null`.
pub fn nullable(base: ParseResult) -> ParseResult {
    let ParseResult { code, imports, ty } = base;
    ParseResult { code: format!("v.nullable({code})"), imports, ty: ty.map(|t| format!("{t} | null")) }
        .with_import("nullable")
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::{json, Value};

    pub(crate) fn parse(v: Value) -> Schema {
        crate::path_de::from_value_with_path(&v).unwrap()
    }

    /// Compile `doc` as a root schema with definitions generated first.
    pub(crate) fn compile_with(doc: Value, max_depth: usize) -> (ParseResult, Vec<Diagnostic>) {
        let root = parse(doc);
        let mut compiler = Compiler::new(&root, max_depth, &["v", "schema"]);
        compiler.generate_definitions();
        let result = compiler.parse_schema(&root, &Cursor::root());
        let (_, diagnostics) = compiler.finish();
        (result, diagnostics)
    }

    pub(crate) fn compile(doc: Value) -> ParseResult {
        compile_with(doc, 10).0
    }

    #[test]
    fn boolean_schemas() {
        assert_eq!(compile(json!(true)).code, "v.any()");
        assert_eq!(compile(json!(false)).code, "v.never()");
        assert_eq!(compile(json!({})).code, "v.any()");
    }

    #[test]
    fn primitive_types() {
        let r = compile(json!({"type": "boolean"}));
        assert_eq!(r.code, "v.boolean()");
        assert_eq!(r.ty.as_deref(), Some("boolean"));
        let r = compile(json!({"type": "null"}));
        assert_eq!(r.code, "v.null_()");
        assert!(r.imports.contains("null_"));
    }

    #[test]
    fn nullable_wraps_and_widens_type() {
        let r = compile(json!({"type": "string", "nullable": true}));
        assert_eq!(r.code, "v.nullable(v.string())");
        assert_eq!(r.ty.as_deref(), Some("string | null"));
        assert!(r.imports.contains("nullable") && r.imports.contains("string"));
    }

    #[test]
    fn type_list_is_a_union() {
        let r = compile(json!({"type": ["string", "number"]}));
        assert_eq!(r.code, "v.union([v.string(), v.number()])");
        assert_eq!(r.ty.as_deref(), Some("string | number"));
        assert!(r.imports.contains("union"));
    }

    #[test]
    fn type_list_narrows_each_tag() {
        let r = compile(json!({"type": ["string", "null"], "minLength": 2}));
        assert_eq!(r.code, "v.union([v.pipe(v.string(), v.minLength(2)), v.null_()])");
    }

    #[test]
    fn unknown_type_degrades_with_diagnostic() {
        let (r, diags) = compile_with(json!({"properties": {"x": {"type": "any"}}, "type": "object"}), 10);
        assert!(r.code.contains("\"x\": v.optional(v.any())"));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::UnknownType);
        assert_eq!(diags[0].path, "#/properties/x");
    }

    #[test]
    fn depth_cutoff_substitutes_any() {
        let doc = json!({"type": "array", "items": {"type": "array", "items": {"type": "string"}}});
        assert_eq!(compile_with(doc.clone(), 10).0.code, "v.array(v.array(v.string()))");
        assert_eq!(compile_with(doc.clone(), 1).0.code, "v.array(v.array(v.any()))");
        assert_eq!(compile_with(doc, 0).0.code, "v.array(v.any())");
    }

    #[test]
    fn ref_to_plain_definition_uses_binding() {
        let r = compile(json!({
            "$ref": "#/definitions/User",
            "definitions": {"User": {"type": "string"}},
        }));
        assert_eq!(r.code, "User");
        assert!(r.imports.is_empty());
        assert_eq!(r.ty.as_deref(), Some("string"));
    }

    #[test]
    fn ref_to_recursive_definition_uses_schema_binding() {
        let r = compile(json!({
            "$ref": "#/definitions/Node",
            "definitions": {
                "Node": {"type": "object", "properties": {"next": {"$ref": "#/definitions/Node"}}}
            },
        }));
        assert_eq!(r.code, "NodeSchema");
        assert_eq!(r.ty.as_deref(), Some("Node"));
    }

    #[test]
    fn self_reference_inside_definition_is_lazy() {
        let root = parse(json!({
            "definitions": {
                "Node": {"type": "object", "properties": {"next": {"$ref": "#/definitions/Node"}}}
            }
        }));
        let mut compiler = Compiler::new(&root, 10, &[]);
        compiler.generate_definitions();
        let entry = compiler.refs().get("#/definitions/Node").unwrap();
        let code = &entry.generated.as_ref().unwrap().code;
        assert!(code.contains("\"next\": v.optional(v.lazy(() => NodeSchema))"), "{code}");
        assert!(!entry.processing);
    }

    #[test]
    fn on_demand_generation_orders_dependencies_first() {
        let root = parse(json!({
            "definitions": {
                "Outer": {"type": "object", "properties": {"inner": {"$ref": "#/definitions/Inner"}}},
                "Inner": {"type": "string"},
            }
        }));
        let mut compiler = Compiler::new(&root, 10, &[]);
        compiler.generate_definitions();
        let order: Vec<_> = compiler.refs().completed().map(|e| e.name.as_str()).collect();
        assert_eq!(order, ["Inner", "Outer"]);
    }

    #[test]
    fn mutual_recursion_terminates() {
        let root = parse(json!({
            "definitions": {
                "A": {"type": "object", "properties": {"b": {"$ref": "#/definitions/B"}}},
                "B": {"type": "object", "properties": {"a": {"$ref": "#/definitions/A"}}},
            }
        }));
        let mut compiler = Compiler::new(&root, 10, &[]);
        compiler.generate_definitions();
        let refs = compiler.refs();
        let b = &refs.get("#/definitions/B").unwrap().generated.as_ref().unwrap().code;
        assert!(b.contains("v.lazy(() => ASchema)"), "{b}");
        let a = &refs.get("#/definitions/A").unwrap().generated.as_ref().unwrap().code;
        assert!(a.contains("\"b\": v.optional(BSchema)"), "{a}");
        let order: Vec<_> = refs.completed().map(|e| e.name.as_str()).collect();
        assert_eq!(order, ["B", "A"]);
    }

    #[test]
    fn unresolved_and_external_refs_fall_back() {
        let (r, diags) = compile_with(json!({"$ref": "#/definitions/Missing"}), 10);
        assert_eq!(r.code, "v.any()");
        assert_eq!(diags[0].kind, DiagnosticKind::UnresolvedRef);
        let (r, diags) = compile_with(json!({"$ref": "https://example.com/schema.json"}), 10);
        assert_eq!(r.code, "v.any()");
        assert_eq!(diags[0].kind, DiagnosticKind::UnsupportedRef);
    }

    #[test]
    fn cursor_pointer_escapes_segments() {
        let cx = Cursor::root().descend_key("properties", "a/b").descend("items");
        assert_eq!(cx.depth, 2);
        assert_eq!(cx.pointer(), "#/properties/a~1b/items");
        let def = Cursor::definition("#/definitions/a~1b");
        assert_eq!(def.path, ["definitions", "a/b"]);
        assert_eq!(def.depth, 0);
    }
}
