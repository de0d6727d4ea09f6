//! Raw store reply values.
//!
//! A [`Value`] is the untyped reply the execution core hands back for a single
//! command. It mirrors the RESP2/RESP3 type set one-to-one:
//!
//! - Simple String: `+OK\r\n`
//! - Error: `-ERR message\r\n`
//! - Integer: `:1000\r\n`
//! - Bulk String: `$6\r\nfoobar\r\n`
//! - Null: `$-1\r\n`, `*-1\r\n` or `_\r\n`
//! - Array: `*2\r\n...`
//! - Boolean, Double, Big Number, Bulk Error, Verbatim String, Map, Set, Push (RESP3)
//!
//! Decoding bytes into a `Value` is the core's job; this crate only models the
//! result and lets callers ask what shape it has via [`Value::kind`].

use std::fmt;

use bytes::Bytes;

/// Runtime shape of a [`Value`], used for type checks and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    SimpleString,
    Error,
    Integer,
    BulkString,
    Null,
    Array,
    Boolean,
    Double,
    BigNumber,
    BulkError,
    VerbatimString,
    Map,
    Set,
    Push,
}

impl ValueKind {
    /// Human-readable name, as used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::SimpleString => "simple string",
            ValueKind::Error => "error",
            ValueKind::Integer => "integer",
            ValueKind::BulkString => "bulk string",
            ValueKind::Null => "null",
            ValueKind::Array => "array",
            ValueKind::Boolean => "boolean",
            ValueKind::Double => "double",
            ValueKind::BigNumber => "big number",
            ValueKind::BulkError => "bulk error",
            ValueKind::VerbatimString => "verbatim string",
            ValueKind::Map => "map",
            ValueKind::Set => "set",
            ValueKind::Push => "push",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An untyped reply value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Simple string: `+OK\r\n`
    SimpleString(Bytes),
    /// Error: `-ERR message\r\n`
    Error(Bytes),
    /// Integer: `:1000\r\n`
    Integer(i64),
    /// Bulk string: `$6\r\nfoobar\r\n`
    BulkString(Bytes),
    /// Null value.
    Null,
    /// Array: `*2\r\n...`
    Array(Vec<Value>),
    /// Boolean: `#t\r\n` or `#f\r\n`
    Boolean(bool),
    /// Double-precision floating point: `,3.14159\r\n`
    Double(f64),
    /// Big number, stored as its decimal string.
    BigNumber(Bytes),
    /// Bulk error: `!<len>\r\n<error>\r\n`
    BulkError(Bytes),
    /// Verbatim string with its 3-byte format tag (e.g. `txt`).
    VerbatimString { format: [u8; 3], data: Bytes },
    /// Map: `%<len>\r\n<key><val>...`
    Map(Vec<(Value, Value)>),
    /// Set: `~<len>\r\n<elem>...`
    Set(Vec<Value>),
    /// Push message (server-initiated).
    Push(Vec<Value>),
}

impl Value {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a simple string value.
    #[inline]
    pub fn simple_string(s: impl AsRef<[u8]>) -> Self {
        Value::SimpleString(Bytes::copy_from_slice(s.as_ref()))
    }

    /// Create an error value.
    #[inline]
    pub fn error(msg: impl AsRef<[u8]>) -> Self {
        Value::Error(Bytes::copy_from_slice(msg.as_ref()))
    }

    /// Create a bulk string value.
    #[inline]
    pub fn bulk_string(data: impl AsRef<[u8]>) -> Self {
        Value::BulkString(Bytes::copy_from_slice(data.as_ref()))
    }

    /// The `+OK` reply.
    #[inline]
    pub fn okay() -> Self {
        Value::SimpleString(Bytes::from_static(b"OK"))
    }

    /// Create a map value from key/value pairs.
    #[inline]
    pub fn map(entries: Vec<(Value, Value)>) -> Self {
        Value::Map(entries)
    }

    // ========================================================================
    // Type checks
    // ========================================================================

    /// The runtime shape of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::SimpleString(_) => ValueKind::SimpleString,
            Value::Error(_) => ValueKind::Error,
            Value::Integer(_) => ValueKind::Integer,
            Value::BulkString(_) => ValueKind::BulkString,
            Value::Null => ValueKind::Null,
            Value::Array(_) => ValueKind::Array,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Double(_) => ValueKind::Double,
            Value::BigNumber(_) => ValueKind::BigNumber,
            Value::BulkError(_) => ValueKind::BulkError,
            Value::VerbatimString { .. } => ValueKind::VerbatimString,
            Value::Map(_) => ValueKind::Map,
            Value::Set(_) => ValueKind::Set,
            Value::Push(_) => ValueKind::Push,
        }
    }

    /// Returns true if this is a null value.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true for both simple and bulk errors.
    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_) | Value::BulkError(_))
    }

    /// Returns true for any string-like reply (simple, bulk or verbatim).
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            Value::SimpleString(_) | Value::BulkString(_) | Value::VerbatimString { .. }
        )
    }

    /// Returns true for sequence replies (array, set, push).
    #[inline]
    pub fn is_sequence(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Set(_) | Value::Push(_))
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Returns the payload of a string-like value.
    #[inline]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::SimpleString(s) | Value::BulkString(s) => Some(s),
            Value::VerbatimString { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Returns the payload of a string-like value if it is valid UTF-8.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Returns the message of a simple or bulk error.
    pub fn error_message(&self) -> Option<String> {
        match self {
            Value::Error(msg) | Value::BulkError(msg) => {
                Some(String::from_utf8_lossy(msg).into_owned())
            }
            _ => None,
        }
    }

    /// Returns the value as an integer.
    #[inline]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a double. Text replies holding a float (RESP2) are parsed.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            Value::Integer(i) => Some(*i as f64),
            _ => parse_float(self.as_str()?),
        }
    }

    /// Returns the value as a boolean. RESP2 integer replies `0`/`1` count as booleans.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            Value::Integer(0) => Some(false),
            Value::Integer(1) => Some(true),
            _ => None,
        }
    }

    /// Returns the elements of an array, set or push value.
    #[inline]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(arr) | Value::Set(arr) | Value::Push(arr) => Some(arr),
            _ => None,
        }
    }

    /// Returns the entries of a map value.
    #[inline]
    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Consumes a sequence value, returning its elements.
    pub fn into_sequence(self) -> Result<Vec<Value>, Value> {
        match self {
            Value::Array(arr) | Value::Set(arr) | Value::Push(arr) => Ok(arr),
            other => Err(other),
        }
    }

    /// Consumes a map-like value, returning its key/value pairs in reply order.
    ///
    /// A RESP3 map is returned as-is. A RESP2 reply encodes maps as a flat array
    /// of alternating keys and values; such an array must have even length.
    pub fn into_pairs(self) -> Result<Vec<(Value, Value)>, Value> {
        match self {
            Value::Map(entries) => Ok(entries),
            Value::Array(arr) if arr.len() % 2 == 0 => {
                let mut pairs = Vec::with_capacity(arr.len() / 2);
                let mut iter = arr.into_iter();
                while let (Some(k), Some(v)) = (iter.next(), iter.next()) {
                    pairs.push((k, v));
                }
                Ok(pairs)
            }
            other => Err(other),
        }
    }
}

/// Parse a float the way the store prints it, including `inf`/`-inf`.
fn parse_float(s: &str) -> Option<f64> {
    match s {
        "inf" | "+inf" => Some(f64::INFINITY),
        "-inf" => Some(f64::NEG_INFINITY),
        _ => s.parse().ok(),
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::bulk_string(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<Vec<Value>> for Value {
    fn from(arr: Vec<Value>) -> Self {
        Value::Array(arr)
    }
}
