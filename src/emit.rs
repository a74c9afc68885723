//! Module assembly: header, definitions, root binding, types, exports.
use serde_json::Value;
use tracing::{debug, info};

use crate::compile::{Compiler, Cursor};
use crate::error::Result;
use crate::ident::sanitize_identifier;
use crate::ir::{Diagnostic, Imports};
use crate::options::{ModuleKind, Options};
use crate::path_de;
use crate::project::Projector;
use crate::schema::Schema;

/// Output of one conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    /// Generated module text.
    pub code: String,
    /// Every validator symbol referenced anywhere in `code`.
    pub imports: Imports,
    pub diagnostics: Vec<Diagnostic>,
}

pub fn convert_str(source: &str, options: &Options) -> Result<Conversion> {
    let schema: Schema = path_de::from_str_with_path(source)?;
    Ok(convert(&schema, options))
}

pub fn convert_value(value: &Value, options: &Options) -> Result<Conversion> {
    let schema: Schema = path_de::from_value_with_path(value)?;
    Ok(convert(&schema, options))
}

pub fn convert(schema: &Schema, options: &Options) -> Conversion {
    let name = sanitize_identifier(&options.name);
    let type_name = format!("{name}Type");
    let mut compiler = Compiler::new(schema, options.max_depth, &["v", name.as_str(), type_name.as_str()]);

    compiler.generate_definitions();
    let root = compiler.parse_schema(schema, &Cursor::root());
    let (refs, diagnostics) = compiler.finish();
    let projector = Projector::new(&refs, options.max_depth);

    let esm = options.module == ModuleKind::Esm;
    let export_defs = if esm && options.export_definitions { "export " } else { "" };
    let export_root = if esm { "export " } else { "" };

    let mut out = String::new();
    let mut imports = root.imports.clone();
    let mut exported = Vec::new();

    match options.module {
        ModuleKind::Esm => out.push_str("import * as v from 'valibot';\n\n"),
        ModuleKind::Cjs => out.push_str("const v = require('valibot');\n\n"),
        ModuleKind::None => {}
    }

    // ---- Definitions ---- //
    for entry in refs.completed() {
        let Some(generated) = &entry.generated else { continue };
        imports.extend(generated.imports.iter().copied());
        if options.with_js_doc {
            out.push_str(&js_doc(entry.schema.description()));
        }
        if entry.recursive {
            let ty = projector.project(entry.schema, 0);
            out.push_str(&format!("{export_defs}type {} = {ty};\n", entry.name));
            out.push_str(&format!(
                "{export_defs}const {}: v.GenericSchema<{}> = {};\n\n",
                entry.binding, entry.name, generated.code
            ));
        } else {
            out.push_str(&format!("{export_defs}const {} = {};\n\n", entry.binding, generated.code));
        }
        exported.push(entry.binding.clone());
    }

    // ---- Root ---- //
    if options.with_js_doc {
        out.push_str(&js_doc(schema.description()));
    }
    out.push_str(&format!("{export_root}const {name} = {};\n", root.code));

    if options.with_types {
        let ty = projector.project(schema, 0);
        out.push_str(&format!("\n{export_root}type {type_name} = {ty};\n"));
    }

    if options.module == ModuleKind::Cjs {
        if !options.export_definitions {
            exported.clear();
        }
        exported.push(name);
        out.push_str(&format!("\nmodule.exports = {{ {} }};\n", exported.join(", ")));
    }

    debug!(definitions = refs.len(), symbols = imports.len(), "assembled module");
    if !diagnostics.is_empty() {
        info!(count = diagnostics.len(), "conversion produced diagnostics");
    }
    Conversion { code: out, imports, diagnostics }
}

/// `/** ... */` block for a description, one ` * ` line per input line.
fn js_doc(description: Option<&str>) -> String {
    let Some(text) = description else { return String::new() };
    let mut out = String::from("/**\n");
    for line in text.lines() {
        let line = line.replace("*/", "*\\/");
        if line.is_empty() {
            out.push_str(" *\n");
        } else {
            out.push_str(&format!(" * {line}\n"));
        }
    }
    out.push_str(" */\n");
    out
}
