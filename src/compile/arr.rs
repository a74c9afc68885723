use super::str::pipe;
use super::{Compiler, Cursor};
use crate::ir::ParseResult;
use crate::project::array_type;
use crate::schema::{Items, SchemaObject};

const UNIQUE_CHECK: &str = r#"v.check((input) => new Set(input).size === input.length, "Items must be unique")"#;

impl<'s> Compiler<'s> {
    /// `v.array(item)`. A tuple-form `items` contributes only its first
    /// position as the element schema.
    pub(crate) fn compile_array(&mut self, obj: &'s SchemaObject, cx: &Cursor) -> ParseResult {
        let item = match &obj.items {
            Some(Items::Single(item)) => self.parse_schema(item, &cx.descend("items")),
            Some(Items::Tuple(items)) => match items.first() {
                Some(first) => self.parse_schema(first, &cx.descend_index("items", 0)),
                None => ParseResult::any(),
            },
            None => ParseResult::any(),
        };

        let mut actions = Vec::new();
        let mut imports: Vec<&'static str> = item.imports.iter().copied().collect();
        imports.push("array");

        if let Some(n) = obj.min_items {
            actions.push(format!("v.minLength({n})"));
            imports.push("minLength");
        }
        if let Some(n) = obj.max_items {
            actions.push(format!("v.maxLength({n})"));
            imports.push("maxLength");
        }
        if obj.unique_items == Some(true) {
            actions.push(UNIQUE_CHECK.to_string());
            imports.push("check");
        }

        let ty = array_type(item.ty_or_any());
        pipe(&format!("v.array({})", item.code), actions, imports, &ty)
    }
}
