//! `allOf` / `anyOf` / `oneOf` / `not`, and the union builder shared with
//! type lists and enums.
use std::collections::HashSet;

use tracing::trace;

use super::{Compiler, Cursor};
use crate::ir::{Imports, ParseResult};
use crate::project::{intersect_known, join_intersection, join_union, UNKNOWN};
use crate::schema::{Schema, SchemaObject};

impl<'s> Compiler<'s> {
    fn compile_each(&mut self, xs: &'s [Schema], keyword: &str, cx: &Cursor) -> Vec<ParseResult> {
        xs.iter()
            .enumerate()
            .map(|(i, x)| self.parse_schema(x, &cx.descend_index(keyword, i)))
            .collect()
    }

    /// Object-shaped members intersect. Anything else keeps the first
    /// member that constrains at all; the remaining members only widen the
    /// imports and narrow the type.
    pub(crate) fn compile_all_of(&mut self, xs: &'s [Schema], cx: &Cursor) -> ParseResult {
        match xs {
            [] => ParseResult::any(),
            [only] => self.parse_schema(only, &cx.descend_index("allOf", 0)),
            _ => {
                let results = self.compile_each(xs, "allOf", cx);
                if xs.iter().all(Schema::is_object_shaped) {
                    let types = present_types(&results);
                    let mut imports = merged_imports(&results);
                    imports.insert("intersect");
                    return ParseResult {
                        code: format!("v.intersect([{}])", join_codes(&results)),
                        imports,
                        ty: types.map(join_intersection),
                    };
                }
                if results.iter().any(ParseResult::is_never) {
                    return ParseResult::never();
                }
                let Some(first) = results.iter().find(|r| !r.is_any()) else {
                    return ParseResult::any();
                };
                trace!(path = %cx.pointer(), "allOf over mixed members keeps the first constraining member");
                ParseResult {
                    code: first.code.clone(),
                    imports: merged_imports(&results),
                    ty: present_types(&results).map(|types| intersect_known(&types)),
                }
            }
        }
    }

    pub(crate) fn compile_any_of(&mut self, xs: &'s [Schema], keyword: &str, cx: &Cursor) -> ParseResult {
        match xs {
            [] => ParseResult::any(),
            [only] => self.parse_schema(only, &cx.descend_index(keyword, 0)),
            _ => {
                let survivors: Vec<ParseResult> =
                    self.compile_each(xs, keyword, cx).into_iter().filter(|r| !r.is_never()).collect();
                if survivors.is_empty() {
                    ParseResult::never()
                } else {
                    union_of(survivors)
                }
            }
        }
    }

    /// Same as `anyOf`: exclusivity is not enforced.
    pub(crate) fn compile_one_of(&mut self, xs: &'s [Schema], cx: &Cursor) -> ParseResult {
        self.compile_any_of(xs, "oneOf", cx)
    }

    pub(crate) fn compile_not(&mut self, obj: &'s SchemaObject, cx: &Cursor) -> ParseResult {
        let Some(negated) = &obj.not else { return ParseResult::any() };
        let inner = self.parse_schema(negated, &cx.descend("not"));
        let mut imports = inner.imports;
        imports.extend(["custom", "is"]);
        ParseResult {
            code: format!(
                "v.custom((input) => !v.is({}, input), \"Value must not match the specified schema\")",
                inner.code
            ),
            imports,
            ty: Some(UNKNOWN.into()),
        }
    }
}

/// `v.union([...])` over `results` with repeated members dropped, or the
/// single remaining result itself.
pub fn union_of(mut results: Vec<ParseResult>) -> ParseResult {
    let mut seen = HashSet::new();
    results.retain(|r| seen.insert(r.code.clone()));
    if results.len() == 1 {
        return results.remove(0);
    }
    if results.is_empty() {
        return ParseResult::any();
    }
    let mut imports = merged_imports(&results);
    imports.insert("union");
    ParseResult {
        code: format!("v.union([{}])", join_codes(&results)),
        imports,
        ty: present_types(&results).map(join_union),
    }
}

fn merged_imports(results: &[ParseResult]) -> Imports {
    results.iter().flat_map(|r| r.imports.iter().copied()).collect()
}

fn join_codes(results: &[ParseResult]) -> String {
    results.iter().map(|r| r.code.as_str()).collect::<Vec<_>>().join(", ")
}

/// Every member's type, or `None` if any member has none.
fn present_types(results: &[ParseResult]) -> Option<Vec<String>> {
    results.iter().map(|r| r.ty.clone()).collect()
}
