//! Identifier handling for emitted code.
use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

static INVALID_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_$]").unwrap());
static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap());

/// Words that cannot name a binding in a strict-mode module, plus the
/// builtin type names a `type` alias may not take.
const RESERVED: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do",
    "else", "enum", "export", "extends", "false", "finally", "for", "function", "if", "import", "in",
    "instanceof", "new", "null", "return", "super", "switch", "this", "throw", "true", "try", "typeof",
    "var", "void", "while", "with", "yield", "let", "static", "implements", "interface", "package",
    "private", "protected", "public", "arguments", "eval", "any", "unknown", "never", "string", "number",
    "boolean", "symbol", "object", "bigint", "undefined",
];

/// Turn an arbitrary definition key into a valid identifier.
///
/// Every character outside `[A-Za-z0-9_$]` becomes `_`, a leading digit
/// or a reserved word gets a `_` prefix, and the empty string becomes `_`.
pub fn sanitize_identifier(name: &str) -> String {
    let mut out = INVALID_CHARS.replace_all(name, "_").into_owned();
    if out.starts_with(|c: char| c.is_ascii_digit()) || RESERVED.contains(&out.as_str()) {
        out.insert(0, '_');
    }
    if out.is_empty() {
        out.push('_');
    }
    out
}

pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// Property key as written in a projected record type: bare when it is an
/// identifier, JSON-quoted otherwise.
pub fn type_key(key: &str) -> String {
    if is_identifier(key) { key.to_string() } else { quote(key) }
}

/// JSON string literal, which is also a valid JS string literal.
pub fn quote(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

/// Hands out binding names that are unique within one output module.
#[derive(Debug, Default)]
pub struct NameAllocator {
    taken: HashSet<String>,
}

impl NameAllocator {
    /// `reserved` names are never handed out (e.g. the `v` namespace and
    /// the root binding).
    pub fn new<'a>(reserved: impl IntoIterator<Item = &'a str>) -> Self {
        Self { taken: reserved.into_iter().map(str::to_string).collect() }
    }

    /// `base` if free, otherwise `base_2`, `base_3`, ...
    pub fn allocate(&mut self, base: &str) -> String {
        let mut candidate = base.to_string();
        let mut n = 2;
        while self.taken.contains(&candidate) {
            candidate = format!("{base}_{n}");
            n += 1;
        }
        self.taken.insert(candidate.clone());
        candidate
    }
}
