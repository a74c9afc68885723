use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ConvertError;

/// Import/export statement style of the emitted module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    /// `import * as v from 'valibot'` and `export` bindings.
    #[default]
    Esm,
    /// `require('valibot')` and a trailing `module.exports`.
    Cjs,
    /// No import or export statements.
    None,
}

/// Conversion settings. Every field has a default, so a partial JSON
/// document (camelCase keys) is a valid configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    /// Binding name of the root schema.
    pub name: String,
    pub module: ModuleKind,
    /// Emit the root's projected type as `<name>Type`.
    pub with_types: bool,
    /// Copy `description` keywords into JSDoc comments.
    pub with_js_doc: bool,
    /// Nesting level beyond which sub-schemas compile to `v.any()`.
    pub max_depth: usize,
    /// Whether definition bindings carry `export` (esm) or appear in
    /// `module.exports` (cjs).
    pub export_definitions: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            name: "schema".into(),
            module: ModuleKind::Esm,
            with_types: false,
            with_js_doc: false,
            max_depth: 10,
            export_definitions: true,
        }
    }
}

impl FromStr for ModuleKind {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "esm" => Ok(ModuleKind::Esm),
            "cjs" => Ok(ModuleKind::Cjs),
            "none" => Ok(ModuleKind::None),
            other => Err(ConvertError::InvalidModule(other.to_string())),
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ModuleKind::Esm => "esm",
            ModuleKind::Cjs => "cjs",
            ModuleKind::None => "none",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_kind_parses_known_values_only() {
        assert_eq!("cjs".parse::<ModuleKind>().unwrap(), ModuleKind::Cjs);
        assert!(matches!("amd".parse::<ModuleKind>(), Err(ConvertError::InvalidModule(m)) if m == "amd"));
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let opts: Options = serde_json::from_str(r#"{"name": "User", "module": "none", "withTypes": true}"#).unwrap();
        assert_eq!(opts.name, "User");
        assert_eq!(opts.module, ModuleKind::None);
        assert!(opts.with_types);
        assert_eq!(opts.max_depth, 10);
        assert!(opts.export_definitions);
    }
}
