use std::{
    collections::{BTreeMap, HashMap},
    rc::Rc,
    sync::Arc,
};

use indexmap::IndexMap;

use crate::value::{MapKey, Value};

/// Conversion of typed Rust data into an inspectable [`Value`].
///
/// Every call builds fresh containers, so converted data never aliases the
/// source. Self-referential graphs have to be assembled on [`Value`] directly.
/// Structs get an implementation from `#[derive(Inspect)]`.
pub trait ToValue {
    fn to_value(&self) -> Value;
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (*self).to_value()
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::Str(self.to_string())
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl ToValue for i64 {
    fn to_value(&self) -> Value {
        Value::Int(*self)
    }
}

macro_rules! impl_lossless_int {
    ($($ty:ty),*) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Value {
                    Value::Int(i64::from(*self))
                }
            }
        )*
    };
}

impl_lossless_int!(i8, i16, i32, u8, u16, u32);

macro_rules! impl_wide_int {
    ($($ty:ty),*) => {
        $(
            impl ToValue for $ty {
                /// Values outside the `i64` range are shown as their decimal string.
                fn to_value(&self) -> Value {
                    match i64::try_from(*self) {
                        Ok(value) => Value::Int(value),
                        Err(_) => Value::Str(self.to_string()),
                    }
                }
            }
        )*
    };
}

impl_wide_int!(isize, usize, u64, i128, u128);

impl ToValue for f32 {
    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl ToValue for char {
    fn to_value(&self) -> Value {
        Value::Str(self.to_string())
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(value) => value.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Value {
        Value::seq(self.iter().map(ToValue::to_value))
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

impl<K, T> ToValue for HashMap<K, T>
where
    K: Clone + Into<MapKey>,
    T: ToValue,
{
    fn to_value(&self) -> Value {
        Value::map(self.iter().map(|(key, value)| (key.clone(), value.to_value())))
    }
}

impl<K, T> ToValue for BTreeMap<K, T>
where
    K: Clone + Into<MapKey>,
    T: ToValue,
{
    fn to_value(&self) -> Value {
        Value::map(self.iter().map(|(key, value)| (key.clone(), value.to_value())))
    }
}

impl<K, T> ToValue for IndexMap<K, T>
where
    K: Clone + Into<MapKey>,
    T: ToValue,
{
    fn to_value(&self) -> Value {
        Value::map(self.iter().map(|(key, value)| (key.clone(), value.to_value())))
    }
}

impl<T: ToValue + ?Sized> ToValue for Box<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue + ?Sized> ToValue for Rc<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue + ?Sized> ToValue for Arc<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl ToValue for serde_json::Value {
    fn to_value(&self) -> Value {
        match self {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(value) => Value::Bool(*value),
            serde_json::Value::Number(number) => match number.as_i64() {
                Some(value) => Value::Int(value),
                None => number
                    .as_f64()
                    .map(Value::Float)
                    .unwrap_or_else(|| Value::Str(number.to_string())),
            },
            serde_json::Value::String(text) => Value::Str(text.clone()),
            serde_json::Value::Array(items) => Value::seq(items.iter().map(ToValue::to_value)),
            serde_json::Value::Object(entries) => Value::map(
                entries
                    .iter()
                    .map(|(key, value)| (key.as_str(), value.to_value())),
            ),
        }
    }
}
