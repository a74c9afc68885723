//! Hard failures: inputs that cannot be interpreted as schema data at all.
//!
//! Everything softer (unresolvable refs, unknown type tags, depth cutoffs)
//! degrades to a fallback validator and is reported through
//! [`crate::ir::Diagnostic`] instead.

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// The input text is not JSON.
    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),

    /// The input is JSON but not a schema document.
    #[error("invalid schema at {path}: {message}")]
    Schema { path: String, message: String },

    #[error("module must be one of: esm, cjs, none (got `{0}`)")]
    InvalidModule(String),

    /// A JSON pointer did not select anything in the input document.
    #[error("JSON pointer `{0}` does not select a value in the input")]
    Pointer(String),

    /// The jq pre-filter failed or did not produce exactly one document.
    #[error("jq pre-filter failed: {0}")]
    Jq(String),
}

pub type Result<T, E = ConvertError> = std::result::Result<T, E>;
