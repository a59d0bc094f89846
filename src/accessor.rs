use std::any::Any;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::value::{Map, Value};

/// Failure raised by an accessor while reading a member.
#[derive(Debug)]
pub struct AccessError(Box<dyn Error + Send + Sync>);

impl AccessError {
    pub fn new<E: Into<Box<dyn Error + Send + Sync>>>(err: E) -> Self {
        AccessError(err.into())
    }

    pub fn msg(msg: impl fmt::Display) -> Self {
        AccessError(msg.to_string().into())
    }
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Error for AccessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.0.source()
    }
}

#[doc(hidden)]
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A structured object whose members are read through named accessors.
///
/// Lookup always goes through the trait object, so the accessor that runs is
/// the one of the value's concrete type. A type that extends another embeds
/// it, answers the names it overrides and delegates everything else:
///
/// ```
/// use handlebars_context::{AccessError, Accessible, Value};
///
/// struct Base;
/// impl Accessible for Base {
///     fn property(&self, name: &str) -> Result<Option<Value>, AccessError> {
///         Ok(match name {
///             "baseProperty" | "childProperty" => Some("baseProperty".into()),
///             _ => None,
///         })
///     }
/// }
///
/// struct Child(Base);
/// impl Accessible for Child {
///     fn property(&self, name: &str) -> Result<Option<Value>, AccessError> {
///         match name {
///             "childProperty" => Ok(Some("childProperty".into())),
///             _ => self.0.property(name),
///         }
///     }
/// }
/// ```
pub trait Accessible: AsAny + Send + Sync {
    /// `Ok(None)` when the object has no member called `name`.
    fn property(&self, name: &str) -> Result<Option<Value>, AccessError>;

    /// Names advertised for materialization (`Value::to_json`).
    fn property_names(&self) -> Vec<String> {
        Vec::new()
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Shared handle to a structured object.
#[derive(Clone)]
pub struct Object(Arc<dyn Accessible>);

impl Object {
    pub fn new<T: Accessible>(object: T) -> Self {
        Object(Arc::new(object))
    }

    /// Wrap an existing handle, typically typed as a base trait object.
    pub fn from_arc(object: Arc<dyn Accessible>) -> Self {
        Object(object)
    }

    pub fn property(&self, name: &str) -> Result<Option<Value>, AccessError> {
        self.0.property(name)
    }

    pub fn property_names(&self) -> Vec<String> {
        self.0.property_names()
    }

    pub fn type_name(&self) -> &'static str {
        self.0.type_name()
    }

    /// Concrete runtime type check, used to reject nested Contexts.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        AsAny::as_any(&*self.0).downcast_ref::<T>()
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.0) as *const (),
            Arc::as_ptr(&other.0) as *const (),
        )
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Object").field(&self.type_name()).finish()
    }
}

/// Capability of a data source to answer a single member name.
pub trait MemberAccess {
    fn member(&self, name: &str) -> Result<Option<Value>, AccessError>;
}

impl MemberAccess for Map {
    fn member(&self, name: &str) -> Result<Option<Value>, AccessError> {
        Ok(self.get(name).cloned())
    }
}

impl MemberAccess for Object {
    fn member(&self, name: &str) -> Result<Option<Value>, AccessError> {
        self.property(name)
    }
}

impl MemberAccess for Value {
    // Primitives and arrays have no named members.
    fn member(&self, name: &str) -> Result<Option<Value>, AccessError> {
        match self {
            Value::Map(m) => m.member(name),
            Value::Object(o) => o.member(name),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Point {
        x: i64,
        y: i64,
    }

    impl Accessible for Point {
        fn property(&self, name: &str) -> Result<Option<Value>, AccessError> {
            Ok(match name {
                "x" => Some(self.x.into()),
                "y" => Some(self.y.into()),
                _ => None,
            })
        }

        fn property_names(&self) -> Vec<String> {
            vec!["x".into(), "y".into()]
        }
    }

    struct Broken;

    impl Accessible for Broken {
        fn property(&self, name: &str) -> Result<Option<Value>, AccessError> {
            Err(AccessError::msg(format!("cannot read {name}")))
        }
    }

    #[test]
    fn map_member_is_key_lookup() {
        let mut map = Map::new();
        map.insert("simple".into(), "value".into());
        map.insert("empty".into(), Value::Null);
        assert_eq!(map.member("simple").unwrap(), Some(Value::from("value")));
        assert_eq!(map.member("empty").unwrap(), Some(Value::Null));
        assert_eq!(map.member("missing").unwrap(), None);
    }

    #[test]
    fn object_member_dispatches_to_accessor() {
        let point = Value::object(Point { x: 1, y: 2 });
        assert_eq!(point.member("y").unwrap(), Some(Value::from(2)));
        assert_eq!(point.member("z").unwrap(), None);
        assert_eq!(point.to_json(), serde_json::json!({"x": 1, "y": 2}));
    }

    #[test]
    fn primitives_have_no_members() {
        assert_eq!(Value::from("text").member("len").unwrap(), None);
        assert_eq!(Value::from(vec![Value::from(1)]).member("0").unwrap(), None);
    }

    #[test]
    fn accessor_failure_is_returned() {
        let err = Value::object(Broken).member("x").unwrap_err();
        assert_eq!(err.to_string(), "cannot read x");
    }

    #[test]
    fn object_identity_and_downcast() {
        let a = Object::new(Point { x: 0, y: 0 });
        let b = a.clone();
        assert_eq!(a, b);
        assert_ne!(a, Object::new(Point { x: 0, y: 0 }));
        assert!(a.downcast_ref::<Point>().is_some());
        assert!(a.downcast_ref::<Broken>().is_none());
        assert!(a.type_name().ends_with("Point"));
    }
}
