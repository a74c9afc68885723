use super::{Compiler, Cursor};
use crate::ident::quote;
use crate::ir::{Imports, ParseResult};
use crate::project::{record_type, Field, ANY};
use crate::schema::{Schema, SchemaObject};

/// Policy for keys beyond the declared `properties`.
enum Rest {
    /// `additionalProperties` absent or `true`.
    Open { index: bool },
    /// `additionalProperties: false`.
    Closed,
    /// `additionalProperties: <schema>`.
    Schema(ParseResult),
}

impl<'s> Compiler<'s> {
    pub(crate) fn compile_object(&mut self, obj: &'s SchemaObject, cx: &Cursor) -> ParseResult {
        let mut imports = Imports::new();
        let mut entries = Vec::new();
        let mut fields = Vec::new();

        for (key, prop) in obj.properties.iter().flatten() {
            let result = self.parse_schema(prop, &cx.descend_key("properties", key));
            imports.extend(result.imports.iter().copied());
            let optional = !obj.is_required(key);
            let ty = result.ty_or_any().to_string();
            let code = if optional {
                imports.insert("optional");
                format!("v.optional({})", result.code)
            } else {
                result.code
            };
            fields.push(Field { key: key.clone(), ty, optional });
            entries.push((quote(key), code));
        }

        let rest = match obj.additional_properties.as_deref() {
            None => Rest::Open { index: false },
            Some(Schema::Bool(true)) => Rest::Open { index: true },
            Some(Schema::Bool(false)) => Rest::Closed,
            Some(extra) => Rest::Schema(self.parse_schema(extra, &cx.descend("additionalProperties"))),
        };

        let shape = render_entries(&entries);
        let (code, index) = match rest {
            Rest::Open { index } => {
                imports.insert("object");
                (format!("v.object({shape})"), index.then(|| ANY.to_string()))
            }
            Rest::Closed => {
                imports.insert("strictObject");
                (format!("v.strictObject({shape})"), None)
            }
            Rest::Schema(extra) => {
                imports.extend(extra.imports.iter().copied());
                let index = extra.ty_or_any().to_string();
                if entries.is_empty() {
                    imports.extend(["record", "string"]);
                    (format!("v.record(v.string(), {})", extra.code), Some(index))
                } else {
                    imports.insert("objectWithRest");
                    (format!("v.objectWithRest({shape}, {})", extra.code), Some(index))
                }
            }
        };

        ParseResult { code, imports, ty: Some(record_type(&fields, index.as_deref())) }
    }
}

/// Object literal for validator entries: one `key: code` per line, two
/// spaces in, nested lines shifted along with their entry. Keys are
/// written as given.
pub(crate) fn render_entries(entries: &[(String, String)]) -> String {
    if entries.is_empty() {
        return "{}".to_string();
    }
    let body: Vec<String> = entries
        .iter()
        .map(|(key, code)| format!("  {key}: {}", code.replace('\n', "\n  ")))
        .collect();
    format!("{{\n{}\n}}", body.join(",\n"))
}
