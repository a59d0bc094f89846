use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Number;

use crate::accessor::{Accessible, Object};
use crate::errors::Result;

/// Keyed mapping model: lookups treat each key as a member name.
pub type Map = BTreeMap<String, Value>;

/// Any value a Context can wrap or a path can resolve to.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Map(Map),
    Object(Object),
}

impl Value {
    /// Wrap a structured object; members are read through its accessors.
    pub fn object<T: Accessible>(object: T) -> Self {
        Value::Object(Object::new(object))
    }

    /// Convert any `Serialize` type into a model. Struct fields become mapping
    /// keys, so they resolve like directly-named members.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(serde_json::to_value(value)?.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Render as JSON. Objects are materialized through the property names
    /// they advertise; a failing accessor renders as `null`.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Number(n) => Json::Number(n.clone()),
            Value::String(s) => Json::String(s.clone()),
            Value::Array(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(m) => Json::Object(m.iter().map(|(k, v)| (k.clone(), v.to_json())).collect()),
            Value::Object(o) => Json::Object(
                o.property_names()
                    .into_iter()
                    .map(|name| {
                        let value = match o.property(&name) {
                            Ok(Some(v)) => v.to_json(),
                            _ => Json::Null,
                        };
                        (name, value)
                    })
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => Value::Number(n),
            Json::String(s) => Value::String(s),
            Json::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Json::Object(m) => Value::Map(m.into_iter().map(|(k, v)| (k, Value::from(v))).collect()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! from_integer {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(n: $t) -> Self {
                Value::Number(Number::from(n))
            }
        })*
    };
}

from_integer!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl From<f64> for Value {
    /// Non-finite floats have no JSON number form and become `Null`.
    fn from(f: f64) -> Self {
        Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Map> for Value {
    fn from(m: Map) -> Self {
        Value::Map(m)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn json_objects_become_maps() {
        let value = Value::from(json!({"nested": {"simple": "value"}, "n": 1}));
        let nested = value.as_map().and_then(|m| m.get("nested")).and_then(Value::as_map);
        assert_eq!(nested.and_then(|m| m.get("simple")), Some(&Value::from("value")));
        assert_eq!(value.to_json(), json!({"nested": {"simple": "value"}, "n": 1}));
    }

    #[test]
    fn serialize_structs_into_maps() {
        #[derive(Serialize)]
        struct Person {
            name: &'static str,
            age: u32,
        }
        let value = Value::from_serialize(&Person { name: "Ada", age: 36 }).unwrap();
        assert_eq!(value.to_json(), json!({"name": "Ada", "age": 36}));
    }

    #[test]
    fn non_finite_float_is_null() {
        assert!(Value::from(f64::NAN).is_null());
        assert_eq!(Value::from(1.5).to_json(), json!(1.5));
    }

    #[test]
    fn option_none_is_null() {
        assert_eq!(Value::from(None::<&str>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::from("x"));
    }
}
