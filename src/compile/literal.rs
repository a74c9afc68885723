use serde_json::Value;

use super::compose::union_of;
use super::obj::render_entries;
use crate::ident::quote;
use crate::ir::{Imports, ParseResult};
use crate::project::{join_union, literal_type};

/// Exact-value match for `const`.
pub fn compile_const(value: &Value) -> ParseResult {
    let ty = Some(literal_type(value));
    match value {
        Value::Null => ParseResult::new("v.null_()", ["null_"], ty),
        Value::Array(items) => {
            let parts: Vec<ParseResult> = items.iter().map(compile_const).collect();
            let mut imports: Imports = parts.iter().flat_map(|p| p.imports.iter().copied()).collect();
            imports.insert("strictTuple");
            let codes: Vec<&str> = parts.iter().map(|p| p.code.as_str()).collect();
            ParseResult { code: format!("v.strictTuple([{}])", codes.join(", ")), imports, ty }
        }
        Value::Object(map) => {
            let mut imports = Imports::from(["strictObject"]);
            let entries: Vec<(String, String)> = map
                .iter()
                .map(|(key, value)| {
                    let part = compile_const(value);
                    imports.extend(part.imports);
                    (quote(key), part.code)
                })
                .collect();
            ParseResult { code: format!("v.strictObject({})", render_entries(&entries)), imports, ty }
        }
        primitive => ParseResult::new(format!("v.literal({primitive})"), ["literal"], ty),
    }
}

/// `enum`: a picklist when every value is a string or a number, otherwise a
/// union of `const` matches.
pub fn compile_enum(values: &[Value]) -> ParseResult {
    match values {
        [] => ParseResult::any(),
        [only] => compile_const(only),
        _ if values.iter().all(|v| v.is_string() || v.is_number()) => {
            let options: Vec<String> = values.iter().map(Value::to_string).collect();
            ParseResult::new(
                format!("v.picklist([{}])", options.join(", ")),
                ["picklist"],
                Some(join_union(values.iter().map(literal_type))),
            )
        }
        _ => union_of(values.iter().map(compile_const).collect()),
    }
}
