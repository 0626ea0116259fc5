//! Payload: the dynamically-typed value crossing the bridge
//!
//! Every argument list and every result travels as a [`Payload`]. The shape is
//! exactly the JSON data model, with numbers split into an integer and a float
//! variant so integral values survive a round trip unchanged.
//!
//! ```text
//! Payload = Null
//!         | Bool(bool)
//!         | Int(i64)        -- "number"
//!         | Float(f64)      -- "number"
//!         | String(String)
//!         | List(Vec<Payload>)
//!         | Map(BTreeMap<String, Payload>)
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Dynamically-typed, self-describing value used for all cross-boundary data.
///
/// Serializes untagged, so a payload is written as its plain JSON shape.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    /// Absent value
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// Integral number
    Int(i64),
    /// Floating-point number
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Ordered list
    List(Vec<Payload>),
    /// String-keyed mapping
    Map(BTreeMap<String, Payload>),
}

impl Payload {
    /// Build a map payload from key/value pairs
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Payload)>,
    {
        Payload::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build a list payload
    pub fn list(items: impl IntoIterator<Item = Payload>) -> Self {
        Payload::List(items.into_iter().collect())
    }

    /// Check if this is null
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Payload::Null)
    }

    /// Get as bool if this is a bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Payload::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as i64. Floats with no fractional part inside the i64 range convert.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Payload::Int(i) => Some(*i),
            Payload::Float(f)
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 =>
            {
                Some(*f as i64)
            }
            _ => None,
        }
    }

    /// Get as f64 (any number)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Payload::Int(i) => Some(*i as f64),
            Payload::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get as string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Payload::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Get as list slice
    pub fn as_list(&self) -> Option<&[Payload]> {
        match self {
            Payload::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Get as map
    pub fn as_map(&self) -> Option<&BTreeMap<String, Payload>> {
        match self {
            Payload::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up a key if this is a map
    pub fn get(&self, key: &str) -> Option<&Payload> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// Type name for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Payload::Null => "null",
            Payload::Bool(_) => "bool",
            Payload::Int(_) => "int",
            Payload::Float(_) => "float",
            Payload::String(_) => "string",
            Payload::List(_) => "list",
            Payload::Map(_) => "map",
        }
    }
}

// Numbers compare by value regardless of representation, so a result that
// went through a float-only transport still equals the integral original.
impl PartialEq for Payload {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Payload::Null, Payload::Null) => true,
            (Payload::Bool(a), Payload::Bool(b)) => a == b,
            (Payload::Int(a), Payload::Int(b)) => a == b,
            (Payload::Float(a), Payload::Float(b)) => a == b,
            // Exact: the float must be integral and convert back to the same i64
            (Payload::Int(i), Payload::Float(f)) | (Payload::Float(f), Payload::Int(i)) => {
                Payload::Float(*f).as_i64() == Some(*i)
            }
            (Payload::String(a), Payload::String(b)) => a == b,
            (Payload::List(a), Payload::List(b)) => a == b,
            (Payload::Map(a), Payload::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Null => write!(f, "Payload::Null"),
            Payload::Bool(b) => write!(f, "Payload::Bool({})", b),
            Payload::Int(i) => write!(f, "Payload::Int({})", i),
            Payload::Float(x) => write!(f, "Payload::Float({})", x),
            Payload::String(s) => write!(f, "Payload::String({:?})", s),
            Payload::List(items) => f.debug_list().entries(items).finish(),
            Payload::Map(entries) => f.debug_map().entries(entries).finish(),
        }
    }
}

/// Compact JSON rendering
impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json: serde_json::Value = self.clone().into();
        write!(f, "{}", json)
    }
}

// ============================================================================
// serde_json interop (transport boundary)
// ============================================================================

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Payload::Null,
            Value::Bool(b) => Payload::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Payload::Int(i),
                None => Payload::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Payload::String(s),
            Value::Array(items) => Payload::List(items.into_iter().map(Payload::from).collect()),
            Value::Object(entries) => {
                Payload::Map(entries.into_iter().map(|(k, v)| (k, Payload::from(v))).collect())
            }
        }
    }
}

impl From<Payload> for serde_json::Value {
    fn from(payload: Payload) -> Self {
        use serde_json::Value;
        match payload {
            Payload::Null => Value::Null,
            Payload::Bool(b) => Value::Bool(b),
            Payload::Int(i) => Value::from(i),
            // JSON has no NaN/Infinity
            Payload::Float(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Payload::String(s) => Value::String(s),
            Payload::List(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Payload::Map(entries) => {
                Value::Object(entries.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numbers_compare_by_value() {
        assert_eq!(Payload::Int(5), Payload::Float(5.0));
        assert_ne!(Payload::Int(5), Payload::Float(5.5));
        assert_ne!(Payload::Int(1), Payload::Bool(true));
    }

    #[test]
    fn test_int_float_equality_is_exact_past_2_pow_53() {
        let big = 1i64 << 53;
        assert_eq!(Payload::Int(big), Payload::Float(big as f64));
        assert_eq!(Payload::Float(big as f64), Payload::Int(big));
        assert_ne!(Payload::Int(big + 1), Payload::Float(big as f64));
        assert_ne!(Payload::Float(big as f64), Payload::Int(big + 1));
        assert_ne!(Payload::Int(i64::MAX), Payload::Float(i64::MAX as f64));
    }

    #[test]
    fn test_as_i64_accepts_integral_floats() {
        assert_eq!(Payload::Float(3.0).as_i64(), Some(3));
        assert_eq!(Payload::Float(3.5).as_i64(), None);
        assert_eq!(Payload::Float(f64::NAN).as_i64(), None);
        assert_eq!(Payload::Int(-7).as_f64(), Some(-7.0));
    }

    #[test]
    fn test_json_conversion_keeps_nesting() {
        let json = json!({
            "name": "tether",
            "tags": ["a", "b"],
            "nested": { "depth": 2, "ratio": 0.5, "missing": null, "on": true }
        });
        let payload = Payload::from(json.clone());

        assert_eq!(payload.get("name").and_then(Payload::as_str), Some("tether"));
        let nested = payload.get("nested").unwrap();
        assert_eq!(nested.get("depth"), Some(&Payload::Int(2)));
        assert_eq!(nested.get("ratio"), Some(&Payload::Float(0.5)));
        assert!(nested.get("missing").unwrap().is_null());

        let back: serde_json::Value = payload.into();
        assert_eq!(back, json);
    }

    #[test]
    fn test_non_finite_float_becomes_json_null() {
        let json: serde_json::Value = Payload::Float(f64::INFINITY).into();
        assert!(json.is_null());
    }

    #[test]
    fn test_serde_is_untagged() {
        let payload = Payload::map([
            ("a", Payload::Int(2)),
            ("b", Payload::list([Payload::Null, Payload::Bool(false)])),
        ]);
        let text = serde_json::to_string(&payload).unwrap();
        assert_eq!(text, r#"{"a":2,"b":[null,false]}"#);

        let parsed: Payload = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, payload);

        let float: Payload = serde_json::from_str("2.25").unwrap();
        assert!(matches!(float, Payload::Float(f) if f == 2.25));
    }

    #[test]
    fn test_display_is_compact_json() {
        let payload = Payload::map([("event", Payload::String("x".into()))]);
        assert_eq!(payload.to_string(), r#"{"event":"x"}"#);
    }
}
