use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, trace};

use crate::accessor::{AccessError, Accessible, MemberAccess};
use crate::errors::{ContextError, Result};
use crate::path::PathExpr;
use crate::value::{Map, Value};

/// What to do when an accessor fails while a path is resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessErrorPolicy {
    /// Return `ContextError::PropertyAccess` to the caller.
    #[default]
    Propagate,
    /// Log the failure and resolve the path as absent.
    Absent,
}

/// Resolution knobs. Children inherit their parent's options unless the
/// builder sets new ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContextOptions {
    pub access_errors: AccessErrorPolicy,
}

/// A resolution scope: a model, optional local bindings and an optional
/// parent consulted for names this scope does not define.
///
/// Cloning is cheap and shares the scope; a Context is never mutated after
/// it is built.
#[derive(Clone)]
pub struct Context {
    scope: Arc<Scope>,
}

struct Scope {
    model: Value,
    bindings: Map,
    parent: Option<Context>,
    options: ContextOptions,
    depth: usize,
}

impl Context {
    /// Root context over `model`.
    pub fn new(model: impl Into<Value>) -> Result<Context> {
        Context::builder(model).build()
    }

    /// Child context layering `extension` over `parent`.
    pub fn child(parent: Option<&Context>, extension: impl Into<Value>) -> Result<Context> {
        let parent = parent.ok_or(ContextError::MissingParent)?;
        Context::builder(extension).parent(parent).build()
    }

    /// Same as `Context::child(Some(self), extension)`.
    pub fn extend(&self, extension: impl Into<Value>) -> Result<Context> {
        Context::child(Some(self), extension)
    }

    pub fn builder(model: impl Into<Value>) -> ContextBuilder {
        ContextBuilder {
            model: model.into(),
            parent: None,
            bindings: Map::new(),
            options: None,
        }
    }

    pub fn model(&self) -> &Value {
        &self.scope.model
    }

    pub fn parent(&self) -> Option<&Context> {
        self.scope.parent.as_ref()
    }

    pub fn options(&self) -> ContextOptions {
        self.scope.options
    }

    /// Number of ancestors; 0 for a root context.
    pub fn depth(&self) -> usize {
        self.scope.depth
    }

    /// Resolve `path`. Absent names and explicit nulls both yield `Null`.
    pub fn get(&self, path: &str) -> Result<Value> {
        Ok(self.lookup(path)?.unwrap_or_default())
    }

    /// Resolve `path`, keeping absent (`None`) apart from a present null.
    pub fn lookup(&self, path: &str) -> Result<Option<Value>> {
        let expr = PathExpr::parse(path)?;
        self.lookup_expr(&expr)
    }

    pub fn has(&self, path: &str) -> Result<bool> {
        Ok(self.lookup(path)?.is_some())
    }

    /// Resolve an already parsed path.
    pub fn lookup_expr(&self, expr: &PathExpr) -> Result<Option<Value>> {
        let segments = match expr {
            PathExpr::This => return Ok(Some(self.scope.model.clone())),
            PathExpr::Segments(segments) => segments,
        };
        let Some((head, rest)) = segments.split_first() else {
            return Ok(None);
        };

        // Only the first segment walks the parent chain.
        let Some(mut current) = self.resolve_head(head, expr)? else {
            trace!(path = %expr, "unresolved");
            return Ok(None);
        };
        for segment in rest {
            match self.access(&current, segment, expr)? {
                Some(next) => current = next,
                None => {
                    trace!(path = %expr, segment = %segment, "unresolved member");
                    return Ok(None);
                }
            }
        }
        Ok(Some(current))
    }

    fn ancestors(&self) -> impl Iterator<Item = &Context> {
        std::iter::successors(Some(self), |c| c.parent())
    }

    fn resolve_head(&self, name: &str, expr: &PathExpr) -> Result<Option<Value>> {
        for scope in self.ancestors() {
            if let Some(value) = scope.scope.bindings.get(name) {
                trace!(segment = name, depth = scope.depth(), "found in bindings");
                return Ok(Some(value.clone()));
            }
            if let Some(value) = self.access(&scope.scope.model, name, expr)? {
                trace!(segment = name, depth = scope.depth(), "found in model");
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    fn access(&self, source: &Value, segment: &str, expr: &PathExpr) -> Result<Option<Value>> {
        match source.member(segment) {
            Ok(value) => Ok(value),
            Err(err) => match self.scope.options.access_errors {
                AccessErrorPolicy::Propagate => Err(ContextError::PropertyAccess {
                    path: expr.to_string(),
                    segment: segment.to_string(),
                    source: err,
                }),
                AccessErrorPolicy::Absent => {
                    debug!(path = %expr, segment, error = %err, "accessor failed, treating as absent");
                    Ok(None)
                }
            },
        }
    }
}

/// Contexts can travel inside other models as data; a member read on one
/// resolves a single segment through its whole chain.
impl Accessible for Context {
    fn property(&self, name: &str) -> std::result::Result<Option<Value>, AccessError> {
        let expr = PathExpr::Segments(vec![name.to_string()]);
        self.lookup_expr(&expr).map_err(AccessError::new)
    }

    fn property_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.scope.bindings.keys().cloned().collect();
        if let Value::Map(m) = &self.scope.model {
            names.extend(m.keys().filter(|k| !self.scope.bindings.contains_key(*k)).cloned());
        }
        names
    }
}

impl From<Context> for Value {
    fn from(context: Context) -> Self {
        Value::object(context)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("model", &self.scope.model)
            .field("bindings", &self.scope.bindings)
            .field("depth", &self.scope.depth)
            .finish()
    }
}

/// Builds a Context with local bindings, a parent and options.
#[derive(Debug)]
pub struct ContextBuilder {
    model: Value,
    parent: Option<Context>,
    bindings: Map,
    options: Option<ContextOptions>,
}

impl ContextBuilder {
    pub fn parent(mut self, parent: &Context) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    /// Local binding, consulted before the model.
    pub fn bind(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.bindings.insert(name.into(), value.into());
        self
    }

    pub fn options(mut self, options: ContextOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn build(self) -> Result<Context> {
        check_model(&self.model)?;
        let depth = self.parent.as_ref().map_or(0, |p| p.depth() + 1);
        let options = self
            .options
            .or_else(|| self.parent.as_ref().map(Context::options))
            .unwrap_or_default();
        Ok(Context {
            scope: Arc::new(Scope {
                model: self.model,
                bindings: self.bindings,
                parent: self.parent,
                options,
                depth,
            }),
        })
    }
}

fn check_model(model: &Value) -> Result<()> {
    match model {
        Value::Null => Err(ContextError::invalid_model("model must not be null")),
        Value::Object(o) if o.downcast_ref::<Context>().is_some() => Err(ContextError::invalid_model(
            "a context cannot be the model of another context",
        )),
        _ => Ok(()),
    }
}
