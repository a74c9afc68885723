// Values that flow up and out of the compiler. No schema input here.

use std::collections::BTreeSet;
use std::fmt;

/// Validator-library symbols referenced by a piece of generated code.
pub type Imports = BTreeSet<&'static str>;

/// What every compiler returns: validator code, the symbols it uses, and
/// the projected TypeScript type when one can be determined.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseResult {
    pub code: String,
    pub imports: Imports,
    pub ty: Option<String>,
}

impl ParseResult {
    pub fn new(code: impl Into<String>, imports: impl IntoIterator<Item = &'static str>, ty: Option<String>) -> Self {
        Self { code: code.into(), imports: imports.into_iter().collect(), ty }
    }

    /// `v.any()`: accepts every input.
    pub fn any() -> Self {
        Self::new("v.any()", ["any"], Some("any".into()))
    }

    /// `v.never()`: accepts nothing.
    pub fn never() -> Self {
        Self::new("v.never()", ["never"], Some("never".into()))
    }

    pub fn is_any(&self) -> bool {
        self.code == "v.any()"
    }

    pub fn is_never(&self) -> bool {
        self.code == "v.never()"
    }

    pub fn with_import(mut self, symbol: &'static str) -> Self {
        self.imports.insert(symbol);
        self
    }

    /// Type string with `any` standing in for "undetermined".
    pub fn ty_or_any(&self) -> &str {
        self.ty.as_deref().unwrap_or("any")
    }
}

// ————————————————————————————————————————————————————————————————————————————
// DIAGNOSTICS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A local `$ref` that names no registered definition.
    UnresolvedRef,
    /// A `$ref` into another document or a network location.
    UnsupportedRef,
    /// A definition was dequeued for generation while already in progress.
    ReentrantDefinition,
    /// A `type` tag outside the JSON Schema set.
    UnknownType,
}

/// A non-fatal finding. The affected node compiled to a fallback validator.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// JSON pointer of the node, relative to the schema being compiled.
    pub path: String,
    pub message: String,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiagnosticKind::UnresolvedRef => "unresolved-ref",
            DiagnosticKind::UnsupportedRef => "unsupported-ref",
            DiagnosticKind::ReentrantDefinition => "reentrant-definition",
            DiagnosticKind::UnknownType => "unknown-type",
        })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.path, self.message)
    }
}
