//! Tagged values produced by coercion, and the mapping from Rust field
//! types onto them.

use std::fmt;
use std::time::Duration;

use crate::error::ValueError;

/// Declared type of a record field, as seen by the coercion engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    Str,
    Bool,
    /// Signed integer of the given bit width.
    Int(u32),
    /// Unsigned integer of the given bit width.
    Uint(u32),
    /// Floating point of the given bit width.
    Float(u32),
    Duration,
    List(Box<Kind>),
    /// A type no parser exists for.
    Other(&'static str),
}

impl Kind {
    pub fn is_list(&self) -> bool {
        matches!(self, Kind::List(_))
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Str => f.write_str("String"),
            Kind::Bool => f.write_str("bool"),
            Kind::Int(bits) => write!(f, "i{bits}"),
            Kind::Uint(bits) => write!(f, "u{bits}"),
            Kind::Float(bits) => write!(f, "f{bits}"),
            Kind::Duration => f.write_str("Duration"),
            Kind::List(elem) => write!(f, "Vec<{elem}>"),
            Kind::Other(name) => f.write_str(name),
        }
    }
}

/// A coerced command-line value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Duration(Duration),
    List(Vec<Value>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
            Value::Int(_) => "signed integer",
            Value::Uint(_) => "unsigned integer",
            Value::Float(_) => "float",
            Value::Duration(_) => "duration",
            Value::List(_) => "list",
        }
    }

    /// Whether this is the zero value of its type. Zero-valued fields get
    /// no "(default ...)" suffix in flag usage.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Str(s) => s.is_empty(),
            Value::Bool(b) => !b,
            Value::Int(i) => *i == 0,
            Value::Uint(u) => *u == 0,
            Value::Float(x) => *x == 0.0,
            Value::Duration(d) => d.is_zero(),
            Value::List(items) => items.is_empty(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Uint(u) => write!(f, "{u}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Duration(d) => write!(f, "{}", humantime::format_duration(*d)),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

/// A Rust type that can back a flag or positional argument.
pub trait FieldType: Sized {
    fn kind() -> Kind;
    fn to_value(&self) -> Value;
    fn from_value(value: Value) -> Result<Self, ValueError>;
}

fn mismatch<T: FieldType>(found: &Value) -> ValueError {
    ValueError::Mismatch {
        expected: T::kind(),
        found: found.type_name(),
    }
}

impl FieldType for String {
    fn kind() -> Kind {
        Kind::Str
    }

    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Str(s) => Ok(s),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FieldType for bool {
    fn kind() -> Kind {
        Kind::Bool
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

macro_rules! integer_field {
    ($variant:ident, $wide:ty => $($t:ty),+) => {
        $(
            impl FieldType for $t {
                fn kind() -> Kind {
                    Kind::$variant(<$t>::BITS)
                }

                fn to_value(&self) -> Value {
                    Value::$variant(*self as $wide)
                }

                fn from_value(value: Value) -> Result<Self, ValueError> {
                    match value {
                        Value::$variant(v) => <$t>::try_from(v).map_err(|_| ValueError::OutOfRange {
                            value: v.to_string(),
                            kind: Self::kind(),
                        }),
                        other => Err(mismatch::<Self>(&other)),
                    }
                }
            }
        )+
    };
}

integer_field!(Int, i64 => i8, i16, i32, i64, isize);
integer_field!(Uint, u64 => u8, u16, u32, u64, usize);

impl FieldType for f32 {
    fn kind() -> Kind {
        Kind::Float(32)
    }

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Float(x) => Ok(x as f32),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FieldType for f64 {
    fn kind() -> Kind {
        Kind::Float(64)
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Float(x) => Ok(x),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FieldType for Duration {
    fn kind() -> Kind {
        Kind::Duration
    }

    fn to_value(&self) -> Value {
        Value::Duration(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Duration(d) => Ok(d),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl<T: FieldType> FieldType for Vec<T> {
    fn kind() -> Kind {
        Kind::List(Box::new(T::kind()))
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(FieldType::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}
