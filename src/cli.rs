//! Command line: schema in (file | inline JSON | stdin) → Valibot module out.
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser};
use colored::Colorize;
use serde_json::Value;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use json_valibot::{convert_str, convert_value, jq_exec, Conversion, ConvertError, ModuleKind, Options};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// convert a JSON Schema document into Valibot validator code
#[derive(Parser, Debug)]
#[command(name = "json-valibot", version, about)]
pub struct CommandLineInterface {
    /// schema file path, inline JSON (starting with `{` or `[`), or '-' for stdin (the default)
    #[arg(short, long)]
    input: Option<String>,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// binding name of the root schema
    #[arg(short, long, default_value = "schema")]
    name: String,

    /// module style: esm, cjs or none
    #[arg(short, long, default_value_t = ModuleKind::Esm)]
    module: ModuleKind,

    /// also emit the root's TypeScript type
    #[arg(short = 't', long)]
    types: bool,

    /// copy `description` keywords into JSDoc comments
    #[arg(short = 'd', long)]
    jsdoc: bool,

    /// nesting depth beyond which sub-schemas become `v.any()`
    #[arg(long, default_value_t = 10)]
    depth: usize,

    /// keep definition bindings private to the module
    #[arg(long)]
    no_export_definitions: bool,

    /// JSON Pointer selecting the schema inside the input (e.g. /components/schemas/User)
    #[arg(long)]
    json_pointer: Option<String>,

    /// jq filter applied to the input before conversion; must yield exactly one document
    #[arg(long)]
    jq_expr: Option<String>,

    /// exit non-zero when the conversion produced diagnostics
    #[arg(long)]
    strict: bool,

    /// more logging, repeatable (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    /// `RUST_LOG` wins; otherwise the `-v` count picks the level.
    pub fn init_tracing(&self) {
        let level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    pub fn options(&self) -> Options {
        Options {
            name: self.name.clone(),
            module: self.module,
            with_types: self.types,
            with_js_doc: self.jsdoc,
            max_depth: self.depth,
            export_definitions: !self.no_export_definitions,
        }
    }

    pub fn run(&self) -> anyhow::Result<ExitCode> {
        let source = self.read_source()?;
        let conversion = self.convert(&source)?;

        for diagnostic in &conversion.diagnostics {
            warn!(kind = %diagnostic.kind, path = %diagnostic.path, "{}", diagnostic.message);
        }

        match self.output.as_ref() {
            Some(out) => {
                if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("failed to create {}", parent.display()))?;
                }
                std::fs::write(out, &conversion.code)
                    .with_context(|| format!("failed to write {}", out.display()))?;
                eprintln!("{} wrote {}", "✓".green(), out.display());
            }
            None => print!("{}", conversion.code),
        }

        if self.strict && !conversion.diagnostics.is_empty() {
            eprintln!("{} {} diagnostic(s) in strict mode", "✗".red(), conversion.diagnostics.len());
            return Ok(ExitCode::FAILURE);
        }
        Ok(ExitCode::SUCCESS)
    }

    fn read_source(&self) -> anyhow::Result<String> {
        match self.input.as_deref() {
            None | Some("-") => {
                debug!("reading schema from stdin");
                let mut source = String::new();
                std::io::stdin().read_to_string(&mut source).context("failed to read schema from stdin")?;
                Ok(source)
            }
            Some(inline) if is_inline_json(inline) => Ok(inline.to_string()),
            Some(path) => {
                debug!(%path, "reading schema file");
                std::fs::read_to_string(path).with_context(|| format!("failed to read schema file `{path}`"))
            }
        }
    }

    fn convert(&self, source: &str) -> Result<Conversion, ConvertError> {
        let options = self.options();
        if self.json_pointer.is_none() && self.jq_expr.is_none() {
            return convert_str(source, &options);
        }
        let mut value: Value = serde_json::from_str(source)?;
        if let Some(pointer) = self.json_pointer.as_deref() {
            value = value.pointer(pointer).cloned().ok_or_else(|| ConvertError::Pointer(pointer.to_string()))?;
        }
        if let Some(jq_expr) = self.jq_expr.as_deref() {
            value = jq_exec::run_jaq_single(jq_expr, &value)?;
        }
        convert_value(&value, &options)
    }
}

fn is_inline_json(input: &str) -> bool {
    input.trim_start().starts_with(['{', '['])
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
