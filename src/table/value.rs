use std::fmt;

use arrow_schema::DataType;

/// A single nullable cell of a [`Table`][super::Table].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Int32(i32),
    Float32(f32),
    Float64(f64),
    Binary(Vec<u8>),
    Utf8(String),
    Int64(i64),
    Boolean(bool),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The column type this value naturally belongs to, or `None` for [`Value::Null`].
    pub fn data_type(&self) -> Option<DataType> {
        let data_type = match self {
            Self::Null => return None,
            Self::Int32(_) => DataType::Int32,
            Self::Float32(_) => DataType::Float32,
            Self::Float64(_) => DataType::Float64,
            Self::Binary(_) => DataType::Binary,
            Self::Utf8(_) => DataType::Utf8,
            Self::Int64(_) => DataType::Int64,
            Self::Boolean(_) => DataType::Boolean,
        };
        Some(data_type)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Utf8(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Binary(b) => Some(b.as_slice()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Float32(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Binary(bytes) => {
                for byte in bytes {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
            Self::Utf8(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Boolean(v) => write!(f, "{v}"),
        }
    }
}

macro_rules! impl_from {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Self::$variant(value)
            }
        }
    };
}

impl_from!(i32, Int32);
impl_from!(f32, Float32);
impl_from!(f64, Float64);
impl_from!(Vec<u8>, Binary);
impl_from!(String, Utf8);
impl_from!(i64, Int64);
impl_from!(bool, Boolean);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Utf8(value.to_string())
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Self::Binary(value.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}
