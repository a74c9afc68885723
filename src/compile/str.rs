use tracing::trace;

use crate::ir::ParseResult;
use crate::schema::SchemaObject;

/// Named formats with a dedicated Valibot action. Anything else is ignored.
const FORMATS: &[(&str, &str, &str)] = &[
    ("email", "v.email()", "email"),
    ("uri", "v.url()", "url"),
    ("url", "v.url()", "url"),
    ("uuid", "v.uuid()", "uuid"),
    ("date", "v.isoDate()", "isoDate"),
    ("date-time", "v.isoDateTime()", "isoDateTime"),
    ("time", "v.isoTime()", "isoTime"),
    ("ipv4", "v.ipv4()", "ipv4"),
    ("ipv6", "v.ipv6()", "ipv6"),
];

pub fn compile_string(obj: &SchemaObject) -> ParseResult {
    let mut actions = Vec::<String>::new();
    let mut imports = vec!["string"];

    if let Some(n) = obj.min_length {
        actions.push(format!("v.minLength({n})"));
        imports.push("minLength");
    }
    if let Some(n) = obj.max_length {
        actions.push(format!("v.maxLength({n})"));
        imports.push("maxLength");
    }
    // `//` would open a line comment; an empty pattern matches everything anyway.
    if let Some(pattern) = obj.pattern.as_deref().filter(|p| !p.is_empty()) {
        actions.push(format!("v.regex({})", regex_literal(pattern)));
        imports.push("regex");
    }
    if let Some(format) = &obj.format {
        match FORMATS.iter().find(|(name, _, _)| *name == format.as_str()) {
            Some((_, code, symbol)) => {
                actions.push(code.to_string());
                imports.push(*symbol);
            }
            None => trace!(%format, "ignoring unsupported string format"),
        }
    }

    pipe("v.string()", actions, imports, "string")
}

/// `base` alone, or `v.pipe(base, actions...)` when there are actions.
pub(crate) fn pipe(base: &str, actions: Vec<String>, mut imports: Vec<&'static str>, ty: &str) -> ParseResult {
    let code = if actions.is_empty() {
        base.to_string()
    } else {
        imports.push("pipe");
        format!("v.pipe({base}, {})", actions.join(", "))
    };
    ParseResult::new(code, imports, Some(ty.to_string()))
}

/// Embed a pattern as a JS regex literal. The pattern text is kept as is,
/// except that a bare `/` and line terminators are escaped so the literal
/// stays well-formed.
fn regex_literal(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 2);
    out.push('/');
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            // An escaped line terminator means the terminator itself.
            '\\' => match chars.next() {
                Some(next) => match line_terminator_escape(next) {
                    Some(escape) => out.push_str(escape),
                    None => {
                        out.push('\\');
                        out.push(next);
                    }
                },
                // A trailing lone backslash would swallow the closing `/`.
                None => out.push_str("\\\\"),
            },
            '/' => out.push_str("\\/"),
            _ => match line_terminator_escape(c) {
                Some(escape) => out.push_str(escape),
                None => out.push(c),
            },
        }
    }
    out.push('/');
    out
}

fn line_terminator_escape(c: char) -> Option<&'static str> {
    match c {
        '\n' => Some("\\n"),
        '\r' => Some("\\r"),
        '\u{2028}' => Some("\\u2028"),
        '\u{2029}' => Some("\\u2029"),
        _ => None,
    }
}
