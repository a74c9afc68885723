use serde_json::Number;

use super::str::pipe;
use crate::ir::ParseResult;
use crate::schema::{Exclusive, SchemaObject};

/// `number` and `integer`. Both share `v.number()`; `integer` leads the
/// pipe with `v.integer()`.
pub fn compile_number(obj: &SchemaObject, integer: bool) -> ParseResult {
    let mut actions = Vec::<String>::new();
    let mut imports = vec!["number"];

    if integer {
        actions.push("v.integer()".into());
        imports.push("integer");
    }

    // ---- Lower bound ---- //
    if let Some(min) = &obj.minimum {
        if obj.exclusive_minimum == Some(Exclusive::Flag(true)) {
            actions.push(format!("v.gtValue({min})"));
            imports.push("gtValue");
        } else {
            actions.push(format!("v.minValue({min})"));
            imports.push("minValue");
        }
    }
    if let Some(bound) = exclusive_bound(&obj.exclusive_minimum) {
        actions.push(format!("v.gtValue({bound})"));
        imports.push("gtValue");
    }

    // ---- Upper bound ---- //
    if let Some(max) = &obj.maximum {
        if obj.exclusive_maximum == Some(Exclusive::Flag(true)) {
            actions.push(format!("v.ltValue({max})"));
            imports.push("ltValue");
        } else {
            actions.push(format!("v.maxValue({max})"));
            imports.push("maxValue");
        }
    }
    if let Some(bound) = exclusive_bound(&obj.exclusive_maximum) {
        actions.push(format!("v.ltValue({bound})"));
        imports.push("ltValue");
    }

    if let Some(step) = &obj.multiple_of {
        actions.push(format!("v.multipleOf({step})"));
        imports.push("multipleOf");
    }

    pipe("v.number()", actions, imports, "number")
}

/// The numeric (draft-06+) form only; the boolean flag is read alongside
/// `minimum` / `maximum`.
fn exclusive_bound(value: &Option<Exclusive>) -> Option<&Number> {
    match value {
        Some(Exclusive::Bound(n)) => Some(n),
        _ => None,
    }
}
