//! Resource serializers
//!
//! Entries whose format is not `"bin"` are decoded through a serializer looked
//! up by format tag. Serializers exchange [`serde_json::Value`] so JSON-like
//! codecs plug in without the manager knowing their concrete types.

use super::error::{DczError, Result};
use alloc::{boxed::Box, vec::Vec};
use core::fmt;
use dcz_core::zone::{FormatTag, BIN_FORMAT};
use heapless::FnvIndexMap;
use serde_json::Value;

/// Maximum number of registered serializers
pub const MAX_SERIALIZERS: usize = 8;

/// Format tag of [`JsonSerializer`]
pub const JSON_FORMAT: &str = "json";

/// Format tag of [`StrSerializer`]
pub const STR_FORMAT: &str = "str";

/// Serializer failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializerError {
    /// Value could not be encoded
    Encode,
    /// Bytes could not be decoded
    Decode,
    /// Value has a shape this serializer does not handle
    UnsupportedValue,
}

impl fmt::Display for SerializerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerializerError::Encode => write!(f, "encode failed"),
            SerializerError::Decode => write!(f, "decode failed"),
            SerializerError::UnsupportedValue => write!(f, "unsupported value"),
        }
    }
}

/// Codec for one resource format
pub trait Serializer {
    /// Encode `value` into the bytes stored on flash
    fn serialize(&self, value: &Value) -> core::result::Result<Vec<u8>, SerializerError>;

    /// Decode bytes read from flash
    fn deserialize(&self, bytes: &[u8]) -> core::result::Result<Value, SerializerError>;
}

/// JSON documents (`"json"`)
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn serialize(&self, value: &Value) -> core::result::Result<Vec<u8>, SerializerError> {
        serde_json::to_vec(value).map_err(|_| SerializerError::Encode)
    }

    fn deserialize(&self, bytes: &[u8]) -> core::result::Result<Value, SerializerError> {
        serde_json::from_slice(bytes).map_err(|_| SerializerError::Decode)
    }
}

/// UTF-8 text stored without quoting (`"str"`)
#[derive(Debug, Clone, Copy, Default)]
pub struct StrSerializer;

impl Serializer for StrSerializer {
    fn serialize(&self, value: &Value) -> core::result::Result<Vec<u8>, SerializerError> {
        match value {
            Value::String(text) => Ok(text.as_bytes().to_vec()),
            _ => Err(SerializerError::UnsupportedValue),
        }
    }

    fn deserialize(&self, bytes: &[u8]) -> core::result::Result<Value, SerializerError> {
        core::str::from_utf8(bytes)
            .map(|text| Value::String(text.into()))
            .map_err(|_| SerializerError::Decode)
    }
}

/// Format tag to serializer table, built once at startup
pub struct SerializerRegistry {
    serializers: FnvIndexMap<FormatTag, Box<dyn Serializer>, MAX_SERIALIZERS>,
}

impl SerializerRegistry {
    /// Create an empty registry (only `"bin"` resources can be decoded)
    pub fn new() -> Self {
        Self {
            serializers: FnvIndexMap::new(),
        }
    }

    /// Create a registry holding the built-in `"json"` and `"str"` serializers
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(JSON_FORMAT, Box::new(JsonSerializer)).ok();
        registry.register(STR_FORMAT, Box::new(StrSerializer)).ok();
        registry
    }

    /// Register `serializer` under `format`, replacing any previous one
    ///
    /// `"bin"` is reserved for raw payloads and cannot be registered.
    pub fn register(&mut self, format: &str, serializer: Box<dyn Serializer>) -> Result<()> {
        if format.is_empty() || format == BIN_FORMAT {
            return Err(DczError::InvalidArgument);
        }

        let tag = FormatTag::try_from(format).map_err(|_| DczError::InvalidArgument)?;
        self.serializers
            .insert(tag, serializer)
            .map_err(|_| DczError::InvalidArgument)?;
        Ok(())
    }

    /// Serializer registered for `format`
    pub fn get(&self, format: &str) -> Option<&dyn Serializer> {
        let tag = FormatTag::try_from(format).ok()?;
        self.serializers.get(&tag).map(|serializer| serializer.as_ref())
    }

    /// True if a serializer is registered for `format`
    pub fn contains(&self, format: &str) -> bool {
        self.get(format).is_some()
    }

    /// Registered format tags in registration order
    pub fn formats(&self) -> impl Iterator<Item = &str> {
        self.serializers.keys().map(|tag| tag.as_str())
    }
}

impl Default for SerializerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SerializerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.formats()).finish()
    }
}

/// Resource payload passed to `save` and returned by `load`
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceData {
    /// Raw bytes (`"bin"` resources, or serialization skipped)
    Bytes(Vec<u8>),
    /// Structured value handled by a serializer
    Value(Value),
}

impl ResourceData {
    /// Raw bytes, if this is a byte payload
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ResourceData::Bytes(bytes) => Some(bytes),
            ResourceData::Value(_) => None,
        }
    }

    /// Structured value, if this is a deserialized payload
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            ResourceData::Value(value) => Some(value),
            ResourceData::Bytes(_) => None,
        }
    }

    /// Consume into raw bytes, if this is a byte payload
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            ResourceData::Bytes(bytes) => Some(bytes),
            ResourceData::Value(_) => None,
        }
    }
}

impl From<Vec<u8>> for ResourceData {
    fn from(bytes: Vec<u8>) -> Self {
        ResourceData::Bytes(bytes)
    }
}

impl From<&[u8]> for ResourceData {
    fn from(bytes: &[u8]) -> Self {
        ResourceData::Bytes(bytes.to_vec())
    }
}

impl From<Value> for ResourceData {
    fn from(value: Value) -> Self {
        ResourceData::Value(value)
    }
}
