//! Conversions between [`Payload`] and Rust argument/result types.
//!
//! `FromPayload` is used for arguments, `IntoPayload` for results. Both are
//! total over the payload shapes they accept: a mismatch is a
//! [`NativeError`] value, never a panic.

use std::collections::{BTreeMap, HashMap};

use crate::error::{NativeError, NativeResult};
use crate::value::Payload;

/// Convert a payload into a Rust type.
pub trait FromPayload: Sized {
    /// Convert, returning a marshaling error if the shape doesn't match
    fn from_payload(value: &Payload) -> NativeResult<Self>;
}

/// Convert a Rust type into a payload.
pub trait IntoPayload {
    /// Convert to a payload
    fn into_payload(self) -> Payload;
}

// ============================================================================
// Payload itself
// ============================================================================

impl FromPayload for Payload {
    fn from_payload(value: &Payload) -> NativeResult<Self> {
        Ok(value.clone())
    }
}

impl IntoPayload for Payload {
    fn into_payload(self) -> Payload {
        self
    }
}

impl FromPayload for serde_json::Value {
    fn from_payload(value: &Payload) -> NativeResult<Self> {
        Ok(value.clone().into())
    }
}

impl IntoPayload for serde_json::Value {
    fn into_payload(self) -> Payload {
        Payload::from(self)
    }
}

// ============================================================================
// Scalars
// ============================================================================

impl FromPayload for bool {
    fn from_payload(value: &Payload) -> NativeResult<Self> {
        value
            .as_bool()
            .ok_or_else(|| NativeError::mismatch("bool", value.type_name()))
    }
}

impl IntoPayload for bool {
    fn into_payload(self) -> Payload {
        Payload::Bool(self)
    }
}

impl FromPayload for i64 {
    fn from_payload(value: &Payload) -> NativeResult<Self> {
        value
            .as_i64()
            .ok_or_else(|| NativeError::mismatch("integer", value.type_name()))
    }
}

impl IntoPayload for i64 {
    fn into_payload(self) -> Payload {
        Payload::Int(self)
    }
}

macro_rules! narrow_int {
    ($($ty:ty),*) => {$(
        impl FromPayload for $ty {
            fn from_payload(value: &Payload) -> NativeResult<Self> {
                let wide = i64::from_payload(value)?;
                <$ty>::try_from(wide).map_err(|_| {
                    NativeError::Malformed(format!(
                        "{} is out of range for {}",
                        wide,
                        stringify!($ty)
                    ))
                })
            }
        }

        impl IntoPayload for $ty {
            fn into_payload(self) -> Payload {
                Payload::Int(i64::from(self))
            }
        }
    )*};
}

narrow_int!(i8, i16, i32, u8, u16, u32);

impl FromPayload for u64 {
    fn from_payload(value: &Payload) -> NativeResult<Self> {
        let wide = i64::from_payload(value)?;
        u64::try_from(wide)
            .map_err(|_| NativeError::Malformed(format!("{} is out of range for u64", wide)))
    }
}

impl IntoPayload for u64 {
    fn into_payload(self) -> Payload {
        match i64::try_from(self) {
            Ok(i) => Payload::Int(i),
            Err(_) => Payload::Float(self as f64),
        }
    }
}

impl FromPayload for usize {
    fn from_payload(value: &Payload) -> NativeResult<Self> {
        let wide = i64::from_payload(value)?;
        usize::try_from(wide)
            .map_err(|_| NativeError::Malformed(format!("{} is out of range for usize", wide)))
    }
}

impl IntoPayload for usize {
    fn into_payload(self) -> Payload {
        match i64::try_from(self) {
            Ok(i) => Payload::Int(i),
            Err(_) => Payload::Float(self as f64),
        }
    }
}

impl FromPayload for f64 {
    fn from_payload(value: &Payload) -> NativeResult<Self> {
        value
            .as_f64()
            .ok_or_else(|| NativeError::mismatch("number", value.type_name()))
    }
}

impl IntoPayload for f64 {
    fn into_payload(self) -> Payload {
        Payload::Float(self)
    }
}

impl FromPayload for f32 {
    fn from_payload(value: &Payload) -> NativeResult<Self> {
        f64::from_payload(value).map(|f| f as f32)
    }
}

impl IntoPayload for f32 {
    fn into_payload(self) -> Payload {
        Payload::Float(f64::from(self))
    }
}

impl FromPayload for String {
    fn from_payload(value: &Payload) -> NativeResult<Self> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| NativeError::mismatch("string", value.type_name()))
    }
}

impl IntoPayload for String {
    fn into_payload(self) -> Payload {
        Payload::String(self)
    }
}

impl IntoPayload for &str {
    fn into_payload(self) -> Payload {
        Payload::String(self.to_string())
    }
}

// Unit type (for methods that return nothing)
impl IntoPayload for () {
    fn into_payload(self) -> Payload {
        Payload::Null
    }
}

// ============================================================================
// Containers
// ============================================================================

impl<T: FromPayload> FromPayload for Option<T> {
    fn from_payload(value: &Payload) -> NativeResult<Self> {
        match value {
            Payload::Null => Ok(None),
            other => T::from_payload(other).map(Some),
        }
    }
}

impl<T: IntoPayload> IntoPayload for Option<T> {
    fn into_payload(self) -> Payload {
        match self {
            Some(v) => v.into_payload(),
            None => Payload::Null,
        }
    }
}

impl<T: FromPayload> FromPayload for Vec<T> {
    fn from_payload(value: &Payload) -> NativeResult<Self> {
        let items = value
            .as_list()
            .ok_or_else(|| NativeError::mismatch("list", value.type_name()))?;
        items.iter().map(T::from_payload).collect()
    }
}

impl<T: IntoPayload> IntoPayload for Vec<T> {
    fn into_payload(self) -> Payload {
        Payload::List(self.into_iter().map(IntoPayload::into_payload).collect())
    }
}

impl<T: FromPayload> FromPayload for BTreeMap<String, T> {
    fn from_payload(value: &Payload) -> NativeResult<Self> {
        let entries = value
            .as_map()
            .ok_or_else(|| NativeError::mismatch("map", value.type_name()))?;
        entries
            .iter()
            .map(|(k, v)| T::from_payload(v).map(|v| (k.clone(), v)))
            .collect()
    }
}

impl<T: IntoPayload> IntoPayload for BTreeMap<String, T> {
    fn into_payload(self) -> Payload {
        Payload::Map(self.into_iter().map(|(k, v)| (k, v.into_payload())).collect())
    }
}

impl<T: FromPayload> FromPayload for HashMap<String, T> {
    fn from_payload(value: &Payload) -> NativeResult<Self> {
        BTreeMap::<String, T>::from_payload(value).map(|m| m.into_iter().collect())
    }
}

impl<T: IntoPayload> IntoPayload for HashMap<String, T> {
    fn into_payload(self) -> Payload {
        Payload::Map(self.into_iter().map(|(k, v)| (k, v.into_payload())).collect())
    }
}
