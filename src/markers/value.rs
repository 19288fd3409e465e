use crate::{
    markers::hash::{
        array_hash, bool_hash, double_bits, double_hash, float_bits,
        float_hash, long_hash, string_hash,
    },
    Marker, MarkerError, ServiceInfo,
};
use std::fmt::{Display, Formatter};

/// The value of a declared marker member.
#[derive(Clone, Debug)]
pub enum MemberValue {
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(char),
    Str(String),
    Type(ServiceInfo),
    Marker(Marker),
    Bools(Vec<bool>),
    Bytes(Vec<i8>),
    Shorts(Vec<i16>),
    Ints(Vec<i32>),
    Longs(Vec<i64>),
    Floats(Vec<f32>),
    Doubles(Vec<f64>),
    Chars(Vec<char>),
    /// An array of strings, types, markers or nested arrays.
    Array(Vec<MemberValue>),
}

impl MemberValue {
    /// Compares two member values. Arrays are compared element-wise and
    /// floating point values by their bit patterns, so `NaN` equals itself.
    /// Fails only if a nested marker is malformed.
    pub fn try_eq(&self, other: &MemberValue) -> Result<bool, MarkerError> {
        let equal = match (self, other) {
            (MemberValue::Bool(a), MemberValue::Bool(b)) => a == b,
            (MemberValue::Byte(a), MemberValue::Byte(b)) => a == b,
            (MemberValue::Short(a), MemberValue::Short(b)) => a == b,
            (MemberValue::Int(a), MemberValue::Int(b)) => a == b,
            (MemberValue::Long(a), MemberValue::Long(b)) => a == b,
            (MemberValue::Float(a), MemberValue::Float(b)) => {
                float_bits(*a) == float_bits(*b)
            }
            (MemberValue::Double(a), MemberValue::Double(b)) => {
                double_bits(*a) == double_bits(*b)
            }
            (MemberValue::Char(a), MemberValue::Char(b)) => a == b,
            (MemberValue::Str(a), MemberValue::Str(b)) => a == b,
            (MemberValue::Type(a), MemberValue::Type(b)) => a == b,
            (MemberValue::Marker(a), MemberValue::Marker(b)) => a.try_eq(b)?,
            (MemberValue::Bools(a), MemberValue::Bools(b)) => a == b,
            (MemberValue::Bytes(a), MemberValue::Bytes(b)) => a == b,
            (MemberValue::Shorts(a), MemberValue::Shorts(b)) => a == b,
            (MemberValue::Ints(a), MemberValue::Ints(b)) => a == b,
            (MemberValue::Longs(a), MemberValue::Longs(b)) => a == b,
            (MemberValue::Floats(a), MemberValue::Floats(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|(a, b)| float_bits(*a) == float_bits(*b))
            }
            (MemberValue::Doubles(a), MemberValue::Doubles(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|(a, b)| double_bits(*a) == double_bits(*b))
            }
            (MemberValue::Chars(a), MemberValue::Chars(b)) => a == b,
            (MemberValue::Array(a), MemberValue::Array(b)) => {
                if a.len() != b.len() {
                    return Ok(false);
                }
                for (a, b) in a.iter().zip(b) {
                    if !a.try_eq(b)? {
                        return Ok(false);
                    }
                }
                true
            }
            _ => false,
        };

        Ok(equal)
    }

    /// Computes the hash code of this value. Arrays hash their elements.
    #[allow(clippy::cast_possible_wrap)]
    pub fn hash_code(&self) -> Result<i32, MarkerError> {
        let hash = match self {
            MemberValue::Bool(value) => bool_hash(*value),
            MemberValue::Byte(value) => i32::from(*value),
            MemberValue::Short(value) => i32::from(*value),
            MemberValue::Int(value) => *value,
            MemberValue::Long(value) => long_hash(*value),
            MemberValue::Float(value) => float_hash(*value),
            MemberValue::Double(value) => double_hash(*value),
            MemberValue::Char(value) => *value as i32,
            MemberValue::Str(value) => string_hash(value),
            MemberValue::Type(value) => string_hash(value.name()),
            MemberValue::Marker(value) => value.hash_code()?,
            MemberValue::Bools(values) => {
                array_hash(values.iter().map(|v| bool_hash(*v)))
            }
            MemberValue::Bytes(values) => {
                array_hash(values.iter().map(|v| i32::from(*v)))
            }
            MemberValue::Shorts(values) => {
                array_hash(values.iter().map(|v| i32::from(*v)))
            }
            MemberValue::Ints(values) => array_hash(values.iter().copied()),
            MemberValue::Longs(values) => {
                array_hash(values.iter().map(|v| long_hash(*v)))
            }
            MemberValue::Floats(values) => {
                array_hash(values.iter().map(|v| float_hash(*v)))
            }
            MemberValue::Doubles(values) => {
                array_hash(values.iter().map(|v| double_hash(*v)))
            }
            MemberValue::Chars(values) => {
                array_hash(values.iter().map(|v| *v as i32))
            }
            MemberValue::Array(values) => array_hash(
                values
                    .iter()
                    .map(MemberValue::hash_code)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
        };

        Ok(hash)
    }
}

impl Display for MemberValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MemberValue::Bool(value) => write!(f, "{}", value),
            MemberValue::Byte(value) => write!(f, "{}", value),
            MemberValue::Short(value) => write!(f, "{}", value),
            MemberValue::Int(value) => write!(f, "{}", value),
            MemberValue::Long(value) => write!(f, "{}", value),
            MemberValue::Float(value) => write!(f, "{}", value),
            MemberValue::Double(value) => write!(f, "{}", value),
            MemberValue::Char(value) => write!(f, "{:?}", value),
            MemberValue::Str(value) => write!(f, "{:?}", value),
            MemberValue::Type(value) => write!(f, "{}", value),
            MemberValue::Marker(value) => write!(f, "{}", value),
            MemberValue::Bools(values) => write!(f, "{:?}", values),
            MemberValue::Bytes(values) => write!(f, "{:?}", values),
            MemberValue::Shorts(values) => write!(f, "{:?}", values),
            MemberValue::Ints(values) => write!(f, "{:?}", values),
            MemberValue::Longs(values) => write!(f, "{:?}", values),
            MemberValue::Floats(values) => write!(f, "{:?}", values),
            MemberValue::Doubles(values) => write!(f, "{:?}", values),
            MemberValue::Chars(values) => write!(f, "{:?}", values),
            MemberValue::Array(values) => {
                write!(f, "[")?;
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Converts a marker field into the value it exposes as a member.
pub trait IntoMemberValue {
    /// Performs the conversion.
    fn into_member_value(self) -> MemberValue;
}

impl IntoMemberValue for MemberValue {
    fn into_member_value(self) -> MemberValue {
        self
    }
}

macro_rules! into_member_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl IntoMemberValue for $ty {
                fn into_member_value(self) -> MemberValue {
                    MemberValue::$variant(self.into())
                }
            }
        )*
    };
}

into_member_value!(
    bool => Bool,
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    char => Char,
    String => Str,
    &str => Str,
    ServiceInfo => Type,
    Marker => Marker,
    Vec<bool> => Bools,
    Vec<i8> => Bytes,
    Vec<i16> => Shorts,
    Vec<i32> => Ints,
    Vec<i64> => Longs,
    Vec<f32> => Floats,
    Vec<f64> => Doubles,
    Vec<char> => Chars,
    Vec<MemberValue> => Array,
);

impl IntoMemberValue for Vec<String> {
    fn into_member_value(self) -> MemberValue {
        MemberValue::Array(self.into_iter().map(MemberValue::Str).collect())
    }
}

impl IntoMemberValue for Vec<ServiceInfo> {
    fn into_member_value(self) -> MemberValue {
        MemberValue::Array(self.into_iter().map(MemberValue::Type).collect())
    }
}
