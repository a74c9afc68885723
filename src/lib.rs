//! JSON Schema → Valibot validator code.
//!
//! ```text
//! schema text ─► path_de ─► Schema ─► Compiler (+ RefTable) ─► ParseResult
//!                                          │
//!                              emit::convert ─► module text
//! ```
pub mod compile;
pub mod emit;
pub mod error;
pub mod ident;
pub mod ir;
pub mod jq_exec;
pub mod options;
pub mod path_de;
pub mod project;
pub mod refs;
pub mod schema;

pub use emit::{convert, convert_str, convert_value, Conversion};
pub use error::{ConvertError, Result};
pub use ir::{Diagnostic, DiagnosticKind, ParseResult};
pub use options::{ModuleKind, Options};
pub use schema::Schema;
