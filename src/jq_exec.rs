//! jq pre-filtering of the input document, via `jaq`.
use jaq_core::{compile::Undefined, load, Compiler, Ctx, RcIter};
use jaq_json::Val;
use serde_json::Value;

use crate::error::{ConvertError, Result};

/// Run `filter_src` over `input` and collect every output as JSON.
pub fn run_jaq(filter_src: &str, input: &Value) -> Result<Vec<Value>> {
    let arena = load::Arena::default();
    let loader = load::Loader::new(jaq_std::defs().chain(jaq_json::defs()));
    let modules = loader
        .load(&arena, load::File { code: filter_src, path: () })
        .map_err(format_parse_errors)?;
    let filter = Compiler::default()
        .with_funs(jaq_std::funs().chain(jaq_json::funs()))
        .compile(modules)
        .map_err(format_undefined_errors)?;

    let no_more_inputs = RcIter::new(core::iter::empty());
    filter
        .run((Ctx::new([], &no_more_inputs), Val::from(input.clone())))
        .map(|item| -> Result<Value> {
            let val = item.map_err(|e| ConvertError::Jq(format!("jq runtime error: {e:?}")))?;
            // Val renders as JSON text.
            Ok(serde_json::from_str(&val.to_string())?)
        })
        .collect()
}

/// Like [`run_jaq`], but the filter must yield exactly one document.
pub fn run_jaq_single(filter_src: &str, input: &Value) -> Result<Value> {
    let mut outputs = run_jaq(filter_src, input)?;
    match outputs.len() {
        1 => Ok(outputs.remove(0)),
        n => Err(ConvertError::Jq(format!("expected exactly one output document, got {n}"))),
    }
}

type Failed<'a, E> = Vec<(load::File<&'a str, ()>, E)>;

/// One line per syntax error, all reported against `--jq-expr`.
fn format_parse_errors(errs: Failed<'_, load::Error<&str>>) -> ConvertError {
    let lines: Vec<String> = errs
        .into_iter()
        .map(|(file, err)| format!("cannot parse jq program `{}`: {err:?}", file.code))
        .collect();
    ConvertError::Jq(lines.join("; "))
}

fn format_undefined_errors(errs: Failed<'_, Vec<(&str, Undefined)>>) -> ConvertError {
    let names: Vec<String> = errs
        .into_iter()
        .flat_map(|(_, list)| list)
        .map(|(name, undef)| format!("`{name}` ({undef:?})"))
        .collect();
    ConvertError::Jq(format!("jq program uses undefined names: {}", names.join(", ")))
}
