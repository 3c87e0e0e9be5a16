//! Field-indexed codec contracts: paired reads and writes keyed by index.
//!
//! The codec itself is opaque to the harness; what matters is the contract
//! shape: a record writes its fields through numbered slots and reads them
//! back through the same numbers, with the same types.

#![allow(missing_docs)]

use crate::core::errors::Result;

/// Writer half of the field-indexed contract.
pub trait FieldWriter {
    fn write_bool(&mut self, index: u32, value: bool) -> Result<()>;
    fn write_i32(&mut self, index: u32, value: i32) -> Result<()>;
    fn write_i64(&mut self, index: u32, value: i64) -> Result<()>;
    fn write_f64(&mut self, index: u32, value: f64) -> Result<()>;
    fn write_string(&mut self, index: u32, value: &str) -> Result<()>;
    fn write_bytes(&mut self, index: u32, value: &[u8]) -> Result<()>;
}

/// Reader half of the field-indexed contract.
pub trait FieldReader {
    fn read_bool(&mut self, index: u32) -> Result<bool>;
    fn read_i32(&mut self, index: u32) -> Result<i32>;
    fn read_i64(&mut self, index: u32) -> Result<i64>;
    fn read_f64(&mut self, index: u32) -> Result<f64>;
    fn read_string(&mut self, index: u32) -> Result<String>;
    fn read_bytes(&mut self, index: u32) -> Result<Vec<u8>>;
}

/// Value encodable through numbered fields.
///
/// `read_fields` must use the same indices and types `write_fields` used.
pub trait WireRecord: Sized {
    fn write_fields(&self, writer: &mut dyn FieldWriter) -> Result<()>;
    fn read_fields(reader: &mut dyn FieldReader) -> Result<Self>;
}
