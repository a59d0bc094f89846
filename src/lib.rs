//! Variable resolution for templates: a chain of scopes that resolves dotted
//! paths against keyed mappings and structured objects.

pub mod accessor;
pub mod context;
pub mod errors;
pub mod path;
pub mod value;

pub use accessor::{AccessError, Accessible, MemberAccess, Object};
pub use context::{AccessErrorPolicy, Context, ContextBuilder, ContextOptions};
pub use errors::{ContextError, Result};
pub use path::PathExpr;
pub use value::{Map, Value};

/// Convenience: resolve `path` against a fresh root context over `model`.
pub fn resolve(model: impl Into<Value>, path: &str) -> Result<Value> {
    Context::new(model)?.get(path)
}

/// Like `resolve`, but any error yields `Null`.
pub fn resolve_or_null(model: impl Into<Value>, path: &str) -> Value {
    resolve(model, path).unwrap_or(Value::Null)
}
