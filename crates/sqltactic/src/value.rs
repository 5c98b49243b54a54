//! Values carried by parameters, filter literals and result rows.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use uuid::Uuid;

use crate::error::PropertyError;

/// A database value.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL
    #[default]
    Null,
    /// Boolean value
    Bool(bool),
    /// Signed 32-bit integer
    I32(i32),
    /// Signed 64-bit integer
    I64(i64),
    /// Double precision float
    F64(f64),
    /// Exact decimal
    Decimal(Decimal),
    /// Text
    String(String),
    /// Binary data
    Bytes(Vec<u8>),
    /// UUID / uniqueidentifier
    Uuid(Uuid),
    /// Timestamp in UTC
    DateTime(DateTime<Utc>),
    /// JSON document
    Json(serde_json::Value),
}

impl Value {
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the variant, used in type mismatch diagnostics.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::F64(_) => "f64",
            Self::Decimal(_) => "decimal",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Uuid(_) => "uuid",
            Self::DateTime(_) => "datetime",
            Self::Json(_) => "json",
        }
    }

    /// Read an integer, widening `I32` and accepting integral decimals.
    ///
    /// Identity functions such as `SCOPE_IDENTITY()` return `numeric`, so a
    /// generated key usually arrives as a decimal.
    pub fn to_i64(&self) -> Result<i64, PropertyError> {
        match self {
            Self::I32(v) => Ok(i64::from(*v)),
            Self::I64(v) => Ok(*v),
            Self::Decimal(d) if d.fract().is_zero() => d
                .to_i64()
                .ok_or_else(|| PropertyError::Other(format!("{d} out of range for i64"))),
            other => Err(PropertyError::mismatch("i64", other.kind())),
        }
    }

    pub fn to_i32(&self) -> Result<i32, PropertyError> {
        let wide = self
            .to_i64()
            .map_err(|_| PropertyError::mismatch("i32", self.kind()))?;
        i32::try_from(wide).map_err(|_| PropertyError::Other(format!("{wide} out of range for i32")))
    }

    pub fn to_string_value(&self) -> Result<String, PropertyError> {
        match self {
            Self::String(s) => Ok(s.clone()),
            other => Err(PropertyError::mismatch("string", other.kind())),
        }
    }

    pub fn to_decimal(&self) -> Result<Decimal, PropertyError> {
        match self {
            Self::Decimal(d) => Ok(*d),
            Self::I32(v) => Ok(Decimal::from(*v)),
            Self::I64(v) => Ok(Decimal::from(*v)),
            other => Err(PropertyError::mismatch("decimal", other.kind())),
        }
    }

    pub fn to_bool(&self) -> Result<bool, PropertyError> {
        match self {
            Self::Bool(b) => Ok(*b),
            other => Err(PropertyError::mismatch("bool", other.kind())),
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    i32 => I32,
    i64 => I64,
    f64 => F64,
    Decimal => Decimal,
    String => String,
    Vec<u8> => Bytes,
    Uuid => Uuid,
    DateTime<Utc> => DateTime,
    serde_json::Value => Json,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
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

    #[test]
    fn option_none_is_null() {
        assert!(Value::from(None::<i32>).is_null());
        assert_eq!(Value::from(Some(5i64)), Value::I64(5));
    }

    #[test]
    fn identity_decimal_reads_as_integer() {
        let v = Value::Decimal(Decimal::new(42, 0));
        assert_eq!(v.to_i64(), Ok(42));
        assert_eq!(v.to_i32(), Ok(42));
    }

    #[test]
    fn fractional_decimal_is_not_an_integer() {
        let v = Value::Decimal(Decimal::new(125, 2));
        assert!(v.to_i64().is_err());
    }

    #[test]
    fn mismatch_names_both_kinds() {
        let err = Value::Bool(true).to_string_value().unwrap_err();
        assert_eq!(err, PropertyError::mismatch("string", "bool"));
    }
}
