//! Structural cache keys.
//!
//! Arguments are flattened into a sequence of [`KeyPart`]s. Sequences are
//! prefixed with their length so nesting stays unambiguous. In typed mode
//! every value is preceded by a type tag.
//!
//! Untyped keys compare numbers by value: an integral float is stored as an
//! integer, so `1` and `1.0` produce the same key.

use serde_json::Value;
use thiserror::Error;

/// Error for arguments that cannot form a cache key.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum KeyError {
    /// The value has no usable equality.
    #[error("arguments not usable as a cache key: {0}")]
    Unhashable(String),
}

/// One atom of a flattened key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyPart {
    /// Type tag, only emitted in typed mode.
    Type(&'static str),
    /// A value without content (`()`, `None`, JSON `null`).
    Unit,
    /// A boolean.
    Bool(bool),
    /// An integer, or an integral float in untyped mode.
    Int(i128),
    /// Bit pattern of a non-NaN float, with `-0.0` folded into `0.0`.
    Float(u64),
    /// A string.
    Str(Box<str>),
    /// Start of a sequence of the given length.
    Seq(usize),
}

/// Accumulates the [`KeyPart`]s for one call.
#[derive(Debug)]
pub struct KeyBuilder {
    typed: bool,
    parts: Vec<KeyPart>,
}

impl KeyBuilder {
    /// Creates an empty builder.
    pub fn new(typed: bool) -> Self {
        Self {
            typed,
            parts: Vec::with_capacity(4),
        }
    }

    /// Whether type tags are being recorded.
    pub fn is_typed(&self) -> bool {
        self.typed
    }

    fn tag(&mut self, ty: &'static str) {
        if self.typed {
            self.parts.push(KeyPart::Type(ty));
        }
    }

    /// Writes a contentless value.
    pub fn unit(&mut self, ty: &'static str) {
        self.tag(ty);
        self.parts.push(KeyPart::Unit);
    }

    /// Writes a boolean.
    pub fn bool(&mut self, ty: &'static str, value: bool) {
        self.tag(ty);
        self.parts.push(KeyPart::Bool(value));
    }

    /// Writes an integer.
    pub fn int(&mut self, ty: &'static str, value: i128) {
        self.tag(ty);
        self.parts.push(KeyPart::Int(value));
    }

    /// Writes a float. `NaN` is rejected since it never equals itself.
    pub fn float(&mut self, ty: &'static str, value: f64) -> Result<(), KeyError> {
        if value.is_nan() {
            return Err(KeyError::Unhashable("NaN is not equal to itself".into()));
        }
        self.tag(ty);

        let integral = value.fract() == 0.0 && value >= i128::MIN as f64 && value < i128::MAX as f64;
        if !self.typed && integral {
            self.parts.push(KeyPart::Int(value as i128));
        } else {
            let value = if value == 0.0 { 0.0 } else { value };
            self.parts.push(KeyPart::Float(value.to_bits()));
        }
        Ok(())
    }

    /// Writes a string.
    pub fn str(&mut self, ty: &'static str, value: &str) {
        self.tag(ty);
        self.parts.push(KeyPart::Str(value.into()));
    }

    /// Starts a sequence; the caller writes `len` elements next.
    pub fn seq(&mut self, ty: &'static str, len: usize) {
        self.tag(ty);
        self.parts.push(KeyPart::Seq(len));
    }

    /// Returns the accumulated parts.
    pub fn finish(self) -> Vec<KeyPart> {
        self.parts
    }
}

/// Values usable as memoized-function arguments.
pub trait CacheKey {
    /// Writes this value's key parts.
    fn write_key(&self, key: &mut KeyBuilder) -> Result<(), KeyError>;

    /// Flattens this value into a complete key.
    fn to_key(&self, typed: bool) -> Result<Vec<KeyPart>, KeyError> {
        let mut builder = KeyBuilder::new(typed);
        self.write_key(&mut builder)?;
        Ok(builder.finish())
    }
}

macro_rules! int_key {
    ($($ty:ty),*) => {
        $(
            impl CacheKey for $ty {
                fn write_key(&self, key: &mut KeyBuilder) -> Result<(), KeyError> {
                    key.int(stringify!($ty), i128::from(*self));
                    Ok(())
                }
            }
        )*
    };
}

int_key!(i8, i16, i32, i64, i128, u8, u16, u32, u64);

impl CacheKey for isize {
    fn write_key(&self, key: &mut KeyBuilder) -> Result<(), KeyError> {
        key.int("isize", *self as i128);
        Ok(())
    }
}

impl CacheKey for usize {
    fn write_key(&self, key: &mut KeyBuilder) -> Result<(), KeyError> {
        key.int("usize", *self as i128);
        Ok(())
    }
}

impl CacheKey for f32 {
    fn write_key(&self, key: &mut KeyBuilder) -> Result<(), KeyError> {
        key.float("f32", f64::from(*self))
    }
}

impl CacheKey for f64 {
    fn write_key(&self, key: &mut KeyBuilder) -> Result<(), KeyError> {
        key.float("f64", *self)
    }
}

impl CacheKey for bool {
    fn write_key(&self, key: &mut KeyBuilder) -> Result<(), KeyError> {
        key.bool("bool", *self);
        Ok(())
    }
}

impl CacheKey for char {
    fn write_key(&self, key: &mut KeyBuilder) -> Result<(), KeyError> {
        let mut buf = [0u8; 4];
        key.str("char", self.encode_utf8(&mut buf));
        Ok(())
    }
}

impl CacheKey for str {
    fn write_key(&self, key: &mut KeyBuilder) -> Result<(), KeyError> {
        key.str("str", self);
        Ok(())
    }
}

impl CacheKey for String {
    fn write_key(&self, key: &mut KeyBuilder) -> Result<(), KeyError> {
        self.as_str().write_key(key)
    }
}

impl CacheKey for () {
    fn write_key(&self, key: &mut KeyBuilder) -> Result<(), KeyError> {
        key.unit("()");
        Ok(())
    }
}

impl<T: CacheKey + ?Sized> CacheKey for &T {
    fn write_key(&self, key: &mut KeyBuilder) -> Result<(), KeyError> {
        (**self).write_key(key)
    }
}

impl<T: CacheKey + ?Sized> CacheKey for Box<T> {
    fn write_key(&self, key: &mut KeyBuilder) -> Result<(), KeyError> {
        (**self).write_key(key)
    }
}

impl<T: CacheKey> CacheKey for Option<T> {
    fn write_key(&self, key: &mut KeyBuilder) -> Result<(), KeyError> {
        match self {
            None => {
                key.unit("None");
                Ok(())
            }
            Some(value) => {
                key.seq("Some", 1);
                value.write_key(key)
            }
        }
    }
}

impl<T: CacheKey> CacheKey for [T] {
    fn write_key(&self, key: &mut KeyBuilder) -> Result<(), KeyError> {
        key.seq("seq", self.len());
        self.iter().try_for_each(|item| item.write_key(key))
    }
}

impl<T: CacheKey, const N: usize> CacheKey for [T; N] {
    fn write_key(&self, key: &mut KeyBuilder) -> Result<(), KeyError> {
        self.as_slice().write_key(key)
    }
}

impl<T: CacheKey> CacheKey for Vec<T> {
    fn write_key(&self, key: &mut KeyBuilder) -> Result<(), KeyError> {
        self.as_slice().write_key(key)
    }
}

macro_rules! tuple_key {
    ($len:expr => $($name:ident),+) => {
        impl<$($name: CacheKey),+> CacheKey for ($($name,)+) {
            #[allow(non_snake_case)]
            fn write_key(&self, key: &mut KeyBuilder) -> Result<(), KeyError> {
                let ($($name,)+) = self;
                key.seq("tuple", $len);
                $($name.write_key(key)?;)+
                Ok(())
            }
        }
    };
}

tuple_key!(1 => A);
tuple_key!(2 => A, B);
tuple_key!(3 => A, B, C);
tuple_key!(4 => A, B, C, D);
tuple_key!(5 => A, B, C, D, E);
tuple_key!(6 => A, B, C, D, E, F);

/// Dynamic JSON arguments. Numbers are tagged `"int"` or `"float"` by how
/// they were written; objects are rejected like any other mapping.
impl CacheKey for Value {
    fn write_key(&self, key: &mut KeyBuilder) -> Result<(), KeyError> {
        match self {
            Value::Null => key.unit("null"),
            Value::Bool(b) => key.bool("bool", *b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    key.int("int", i128::from(i));
                } else if let Some(u) = n.as_u64() {
                    key.int("int", i128::from(u));
                } else if let Some(f) = n.as_f64() {
                    key.float("float", f)?;
                } else {
                    return Err(KeyError::Unhashable(format!("unrepresentable number {n}")));
                }
            }
            Value::String(s) => key.str("str", s),
            Value::Array(items) => {
                key.seq("list", items.len());
                for item in items {
                    item.write_key(key)?;
                }
            }
            Value::Object(_) => {
                return Err(KeyError::Unhashable("JSON objects are mappings".into()));
            }
        }
        Ok(())
    }
}
