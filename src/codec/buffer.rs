//! In-memory field buffer: the codec realization records round-trip through.

#![allow(missing_docs)]

use std::collections::BTreeMap;

use crate::codec::fields::{FieldReader, FieldWriter, WireRecord};
use crate::core::errors::{ProbeError, Result};

/// One typed field slot.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Bool(bool),
    I32(i32),
    I64(i64),
    F64(f64),
    Str(String),
    Bytes(Vec<u8>),
}

impl FieldValue {
    #[must_use]
    pub const fn type_label(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::F64(_) => "f64",
            Self::Str(_) => "string",
            Self::Bytes(_) => "bytes",
        }
    }
}

/// Indexed field container implementing both halves of the codec contract.
///
/// Writes reject duplicate indices; reads reject missing or mistyped ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldBuffer {
    fields: BTreeMap<u32, FieldValue>,
}

impl FieldBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Occupied field indices, ascending.
    #[must_use]
    pub fn indices(&self) -> Vec<u32> {
        self.fields.keys().copied().collect()
    }

    /// Encode a record into a fresh buffer.
    pub fn encode<R: WireRecord>(record: &R) -> Result<Self> {
        let mut buffer = Self::new();
        record.write_fields(&mut buffer)?;
        Ok(buffer)
    }

    /// Decode a record from this buffer. Non-consuming.
    pub fn decode<R: WireRecord>(&self) -> Result<R> {
        let mut cursor = FieldCursor { buffer: self };
        R::read_fields(&mut cursor)
    }

    fn insert(&mut self, index: u32, value: FieldValue) -> Result<()> {
        if self.fields.contains_key(&index) {
            return Err(ProbeError::DuplicateField { index });
        }
        self.fields.insert(index, value);
        Ok(())
    }

    fn fetch(&self, index: u32) -> Result<&FieldValue> {
        self.fields
            .get(&index)
            .ok_or(ProbeError::MissingField { index })
    }
}

impl FieldWriter for FieldBuffer {
    fn write_bool(&mut self, index: u32, value: bool) -> Result<()> {
        self.insert(index, FieldValue::Bool(value))
    }

    fn write_i32(&mut self, index: u32, value: i32) -> Result<()> {
        self.insert(index, FieldValue::I32(value))
    }

    fn write_i64(&mut self, index: u32, value: i64) -> Result<()> {
        self.insert(index, FieldValue::I64(value))
    }

    fn write_f64(&mut self, index: u32, value: f64) -> Result<()> {
        self.insert(index, FieldValue::F64(value))
    }

    fn write_string(&mut self, index: u32, value: &str) -> Result<()> {
        self.insert(index, FieldValue::Str(value.to_string()))
    }

    fn write_bytes(&mut self, index: u32, value: &[u8]) -> Result<()> {
        self.insert(index, FieldValue::Bytes(value.to_vec()))
    }
}

/// Read-only view satisfying [`FieldReader`] over a buffer.
struct FieldCursor<'a> {
    buffer: &'a FieldBuffer,
}

impl FieldReader for FieldCursor<'_> {
    fn read_bool(&mut self, index: u32) -> Result<bool> {
        match self.buffer.fetch(index)? {
            FieldValue::Bool(value) => Ok(*value),
            other => Err(mistyped(index, "bool", other)),
        }
    }

    fn read_i32(&mut self, index: u32) -> Result<i32> {
        match self.buffer.fetch(index)? {
            FieldValue::I32(value) => Ok(*value),
            other => Err(mistyped(index, "i32", other)),
        }
    }

    fn read_i64(&mut self, index: u32) -> Result<i64> {
        match self.buffer.fetch(index)? {
            FieldValue::I64(value) => Ok(*value),
            other => Err(mistyped(index, "i64", other)),
        }
    }

    fn read_f64(&mut self, index: u32) -> Result<f64> {
        match self.buffer.fetch(index)? {
            FieldValue::F64(value) => Ok(*value),
            other => Err(mistyped(index, "f64", other)),
        }
    }

    fn read_string(&mut self, index: u32) -> Result<String> {
        match self.buffer.fetch(index)? {
            FieldValue::Str(value) => Ok(value.clone()),
            other => Err(mistyped(index, "string", other)),
        }
    }

    fn read_bytes(&mut self, index: u32) -> Result<Vec<u8>> {
        match self.buffer.fetch(index)? {
            FieldValue::Bytes(value) => Ok(value.clone()),
            other => Err(mistyped(index, "bytes", other)),
        }
    }
}

fn mistyped(index: u32, expected: &'static str, actual: &FieldValue) -> ProbeError {
    ProbeError::FieldType {
        index,
        expected,
        actual: actual.type_label(),
    }
}
