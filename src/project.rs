//! TypeScript type projection.
//!
//! Two consumers share the rendering helpers below: the compiler, which
//! builds the `ty` of every [`ParseResult`](crate::ir::ParseResult) as it
//! goes, and [`Projector`], which derives a type straight from a schema
//! tree for the emitted `type` declarations. Both follow the same keyword
//! precedence, so the two always agree.
use crate::ident::type_key;
use crate::refs::RefTable;
use crate::schema::{classify, classify_type, Items, Schema, SchemaObject, Shape, TypeTag};
use serde_json::Value;

pub const ANY: &str = "any";
pub const NEVER: &str = "never";
pub const UNKNOWN: &str = "unknown";

// ————————————————————————————————————————————————————————————————————————————
// RENDERING
// ————————————————————————————————————————————————————————————————————————————

/// One member of a record type.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: String,
    pub ty: String,
    pub optional: bool,
}

/// `{ a: T; b?: U; [key: string]: X }`, `Record<string, X>` when only the
/// index signature is present, `{}` when nothing is.
pub fn record_type(fields: &[Field], index: Option<&str>) -> String {
    if fields.is_empty() {
        return match index {
            Some(ty) => format!("Record<string, {ty}>"),
            None => "{}".to_string(),
        };
    }
    let mut members: Vec<String> = fields
        .iter()
        .map(|f| format!("{}{}: {}", type_key(&f.key), if f.optional { "?" } else { "" }, f.ty))
        .collect();
    if let Some(ty) = index {
        members.push(format!("[key: string]: {ty}"));
    }
    format!("{{ {} }}", members.join("; "))
}

/// `T[]`, parenthesised when `T` is a union or an intersection.
pub fn array_type(item: &str) -> String {
    if has_top_level(item, '|') || has_top_level(item, '&') {
        format!("({item})[]")
    } else {
        format!("{item}[]")
    }
}

/// `A | B`, each distinct member once.
pub fn join_union<I, S>(types: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut members: Vec<String> = Vec::new();
    for t in types {
        let t = t.as_ref();
        if !members.iter().any(|m| m == t) {
            members.push(t.to_string());
        }
    }
    members.join(" | ")
}

/// `A & B`; union members are parenthesised.
pub fn join_intersection<I, S>(types: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    types
        .into_iter()
        .map(|t| {
            let t = t.as_ref();
            if has_top_level(t, '|') { format!("({t})") } else { t.to_string() }
        })
        .collect::<Vec<_>>()
        .join(" & ")
}

/// Type of a literal value: JSON text for primitives, a tuple or record
/// type for compound values.
pub fn literal_type(value: &Value) -> String {
    match value {
        Value::Array(items) => {
            format!("[{}]", items.iter().map(literal_type).collect::<Vec<_>>().join(", "))
        }
        Value::Object(map) => {
            let fields: Vec<Field> = map
                .iter()
                .map(|(key, value)| Field { key: key.clone(), ty: literal_type(value), optional: false })
                .collect();
            record_type(&fields, None)
        }
        primitive => primitive.to_string(),
    }
}

/// Whether `op` occurs outside brackets and string literals.
fn has_top_level(ty: &str, op: char) -> bool {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    for c in ty.chars() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' | '>' => depth -= 1,
            _ if c == op && depth == 0 => return true,
            _ => {}
        }
    }
    false
}

// ————————————————————————————————————————————————————————————————————————————
// PROJECTOR
// ————————————————————————————————————————————————————————————————————————————

/// Derives a structural type from a schema without generating code.
///
/// Recursive definitions project to their type name; other definitions are
/// inlined.
pub struct Projector<'a, 's> {
    refs: &'a RefTable<'s>,
    max_depth: usize,
}

impl<'a, 's> Projector<'a, 's> {
    pub fn new(refs: &'a RefTable<'s>, max_depth: usize) -> Self {
        Self { refs, max_depth }
    }

    pub fn project(&self, schema: &Schema, depth: usize) -> String {
        if depth > self.max_depth {
            return ANY.into();
        }
        match classify(schema) {
            Shape::Boolean(true) => ANY.into(),
            Shape::Boolean(false) => NEVER.into(),
            Shape::Reference(pointer) => match self.refs.get(pointer) {
                Some(entry) if entry.recursive => entry.name.clone(),
                Some(entry) => self.project(entry.schema, 0),
                None => ANY.into(),
            },
            Shape::AllOf(xs) => self.all_of(xs, depth),
            Shape::AnyOf(xs) | Shape::OneOf(xs) => self.any_of(xs, depth),
            Shape::Not(_) => UNKNOWN.into(),
            Shape::Const(value) => literal_type(value),
            Shape::Enum([]) => ANY.into(),
            Shape::Enum(values) => join_union(values.iter().map(literal_type)),
            Shape::Nullable(obj) => format!("{} | null", self.project_type(classify_type(obj), depth)),
            shape => self.project_type(shape, depth),
        }
    }

    fn project_type(&self, shape: Shape<'_>, depth: usize) -> String {
        match shape {
            Shape::Typed(obj, tag) => self.project_tag(obj, tag, depth),
            Shape::TypeUnion(obj, tags) if !tags.is_empty() => {
                join_union(tags.iter().map(|tag| self.project_tag(obj, tag, depth)))
            }
            _ => ANY.into(),
        }
    }

    fn project_tag(&self, obj: &SchemaObject, tag: &TypeTag, depth: usize) -> String {
        match tag {
            TypeTag::String => "string".into(),
            TypeTag::Number | TypeTag::Integer => "number".into(),
            TypeTag::Boolean => "boolean".into(),
            TypeTag::Null => "null".into(),
            TypeTag::Array => {
                let item = match &obj.items {
                    Some(Items::Single(item)) => Some(item.as_ref()),
                    Some(Items::Tuple(items)) => items.first(),
                    None => None,
                };
                array_type(&item.map_or_else(|| ANY.into(), |item| self.project(item, depth + 1)))
            }
            TypeTag::Object => {
                let fields: Vec<Field> = obj
                    .properties
                    .iter()
                    .flatten()
                    .map(|(key, prop)| Field {
                        key: key.clone(),
                        ty: self.project(prop, depth + 1),
                        optional: !obj.is_required(key),
                    })
                    .collect();
                let index = match obj.additional_properties.as_deref() {
                    Some(Schema::Bool(false)) | None => None,
                    Some(Schema::Bool(true)) => Some(ANY.to_string()),
                    Some(extra) => Some(self.project(extra, depth + 1)),
                };
                record_type(&fields, index.as_deref())
            }
            TypeTag::Unknown(_) => ANY.into(),
        }
    }

    fn all_of(&self, xs: &[Schema], depth: usize) -> String {
        match xs {
            [] => ANY.into(),
            [only] => self.project(only, depth + 1),
            _ => {
                let types: Vec<String> = xs.iter().map(|x| self.project(x, depth + 1)).collect();
                if xs.iter().all(Schema::is_object_shaped) {
                    return join_intersection(&types);
                }
                if types.iter().any(|t| t == NEVER) {
                    return NEVER.into();
                }
                intersect_known(&types)
            }
        }
    }

    fn any_of(&self, xs: &[Schema], depth: usize) -> String {
        match xs {
            [] => ANY.into(),
            [only] => self.project(only, depth + 1),
            _ => {
                let types: Vec<String> =
                    xs.iter().map(|x| self.project(x, depth + 1)).filter(|t| t != NEVER).collect();
                if types.is_empty() { NEVER.into() } else { join_union(&types) }
            }
        }
    }
}

/// `&`-join of every type that is not `any`; `any` when none is left.
pub(crate) fn intersect_known<S: AsRef<str>>(types: &[S]) -> String {
    let known: Vec<&str> = types.iter().map(AsRef::as_ref).filter(|t| *t != ANY).collect();
    if known.is_empty() { ANY.into() } else { join_intersection(known) }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::tests::{compile, parse};
    use serde_json::json;

    fn project(doc: Value) -> String {
        let root = parse(doc);
        let refs = RefTable::build(&root, &["v", "schema"]);
        Projector::new(&refs, 10).project(&root, 0)
    }

    #[test]
    fn record_rendering() {
        let fields = [
            Field { key: "id".into(), ty: "string".into(), optional: false },
            Field { key: "first-name".into(), ty: "string".into(), optional: true },
        ];
        assert_eq!(record_type(&fields, None), "{ id: string; \"first-name\"?: string }");
        assert_eq!(record_type(&fields[..1], Some("number")), "{ id: string; [key: string]: number }");
        assert_eq!(record_type(&[], Some("number")), "Record<string, number>");
        assert_eq!(record_type(&[], None), "{}");
    }

    #[test]
    fn arrays_parenthesise_compound_items() {
        assert_eq!(array_type("string"), "string[]");
        assert_eq!(array_type("string | null"), "(string | null)[]");
        assert_eq!(array_type("{ a: string | null }"), "{ a: string | null }[]");
        assert_eq!(array_type("\"a | b\""), "\"a | b\"[]");
    }

    #[test]
    fn unions_drop_repeats() {
        assert_eq!(join_union(["string", "null", "string"]), "string | null");
    }

    #[test]
    fn intersections_parenthesise_unions() {
        assert_eq!(join_intersection(["A", "B | C"]), "A & (B | C)");
        assert_eq!(intersect_known(&["any", "string"]), "string");
        assert_eq!(intersect_known(&["any"]), "any");
    }

    #[test]
    fn literal_types() {
        assert_eq!(literal_type(&json!("red")), "\"red\"");
        assert_eq!(literal_type(&json!(null)), "null");
        assert_eq!(literal_type(&json!([1, "a"])), "[1, \"a\"]");
        assert_eq!(literal_type(&json!({"k": true, "a-b": 1})), "{ k: true; \"a-b\": 1 }");
    }

    #[test]
    fn recursive_refs_project_to_their_name() {
        let ty = project(json!({
            "$ref": "#/definitions/Tree",
            "definitions": {
                "Tree": {
                    "type": "object",
                    "properties": {
                        "value": {"type": "number"},
                        "left": {"anyOf": [{"$ref": "#/definitions/Tree"}, {"type": "null"}]},
                    },
                    "required": ["value"],
                }
            }
        }));
        assert_eq!(ty, "Tree");
    }

    #[test]
    fn plain_refs_are_inlined() {
        let ty = project(json!({
            "type": "array",
            "items": {"$ref": "#/$defs/Id"},
            "$defs": {"Id": {"type": ["string", "integer"]}},
        }));
        assert_eq!(ty, "(string | number)[]");
    }

    #[test]
    fn agrees_with_compiled_types() {
        let docs = [
            json!({"type": "object", "properties": {"name": {"type": "string"}, "age": {"type": "number"}}, "required": ["name"]}),
            json!({"type": "object", "additionalProperties": {"type": "boolean"}}),
            json!({"type": "object", "properties": {"a": true}, "additionalProperties": true}),
            json!({"properties": {"id": {"type": "string"}}, "additionalProperties": false}),
            json!({"type": "array", "items": [{"type": "string"}, {"type": "number"}]}),
            json!({"type": "array", "items": {"anyOf": [{"type": "string"}, {"type": "null"}]}}),
            json!({"anyOf": [false, {"type": "string"}, {"type": "number"}]}),
            json!({"oneOf": [false, false]}),
            json!({"allOf": [{"type": "string"}, {"minLength": 1}]}),
            json!({"allOf": [{"type": "object"}, {"properties": {"x": {"type": "integer"}}}]}),
            json!({"allOf": [true, {}]}),
            json!({"not": {"type": "string"}}),
            json!({"enum": ["a", 1, null, [1]]}),
            json!({"const": {"k": [true]}}),
            json!({"type": ["string", "null"], "nullable": true}),
            json!({"type": "wat"}),
            json!({"anyOf": [{"type": "string", "minLength": 1}, {"type": "string"}]}),
            json!({
                "$ref": "#/definitions/User",
                "definitions": {"User": {"type": "object", "properties": {"tags": {"type": "array", "items": {"type": "string"}}}}},
            }),
        ];
        for doc in docs {
            let compiled = compile(doc.clone());
            assert_eq!(compiled.ty.as_deref(), Some(project(doc.clone()).as_str()), "{doc}");
        }
    }

    #[test]
    fn depth_guard() {
        let root = parse(json!({"type": "array", "items": {"type": "array", "items": {"type": "string"}}}));
        let refs = RefTable::build(&root, &[]);
        assert_eq!(Projector::new(&refs, 10).project(&root, 0), "string[][]");
        assert_eq!(Projector::new(&refs, 1).project(&root, 0), "any[][]");
    }
}
