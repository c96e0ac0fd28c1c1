//! Record identifiers and fixed-width record buffers.

use crate::catalog::Schema;
use crate::error::{HeapDbError, Result};
use crate::storage::page::PageNum;
use crate::types::{DataType, Value};

/// Record identifier: the data page and slot a record lives in.
///
/// A `Rid` is stable for the life of the record: records are never moved,
/// so the identifier returned by an insert stays valid until the record
/// is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rid {
    /// Data page number (always >= 1; page 0 holds the catalog).
    pub page: PageNum,
    /// Zero-based slot index within the page.
    pub slot: u32,
}

impl Rid {
    /// Creates a new record identifier.
    #[must_use]
    pub const fn new(page: PageNum, slot: u32) -> Self {
        Self { page, slot }
    }
}

impl std::fmt::Display for Rid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.page, self.slot)
    }
}

/// A fixed-width record buffer plus its identifier.
///
/// The payload length is always `schema.record_size()`; attribute values
/// live at offsets computed from the schema. The identifier is `None`
/// until the record has been inserted into a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    id: Option<Rid>,
    data: Vec<u8>,
}

impl Record {
    /// Creates a new zeroed record sized for the given schema.
    #[must_use]
    pub fn new(schema: &Schema) -> Self {
        Self {
            id: None,
            data: vec![0u8; schema.record_size()],
        }
    }

    /// Creates a record from raw payload bytes and an identifier.
    #[must_use]
    pub(crate) fn from_parts(id: Rid, data: Vec<u8>) -> Self {
        Self { id: Some(id), data }
    }

    /// Returns the record identifier, if the record has been inserted.
    #[must_use]
    pub fn id(&self) -> Option<Rid> {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: Rid) {
        self.id = Some(id);
    }

    /// Returns the raw payload bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns a mutable view of the raw payload bytes.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Reads a single attribute out of the payload as a boxed value.
    ///
    /// Strings are materialized up to the first zero byte of their
    /// fixed-width region.
    ///
    /// # Errors
    ///
    /// Returns an error if `attr_num` is out of range.
    pub fn get_attr(&self, schema: &Schema, attr_num: usize) -> Result<Value> {
        let attr = schema.attr(attr_num).ok_or_else(|| {
            HeapDbError::SchemaError(format!("Attribute index {attr_num} out of range"))
        })?;
        let offset = schema.attr_offset(attr_num);
        let field = self
            .data
            .get(offset..offset + attr.byte_size())
            .ok_or_else(|| {
                HeapDbError::SchemaError("Record buffer is shorter than the schema requires".into())
            })?;

        let value = match attr.data_type {
            DataType::Int => {
                let bytes: [u8; 4] = field.try_into().unwrap_or([0; 4]);
                Value::Int(i32::from_le_bytes(bytes))
            }
            DataType::Float => {
                let bytes: [u8; 4] = field.try_into().unwrap_or([0; 4]);
                Value::Float(f32::from_le_bytes(bytes))
            }
            DataType::Bool => Value::Bool(field[0] != 0),
            DataType::String => {
                let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
                Value::String(String::from_utf8_lossy(&field[..end]).into_owned())
            }
        };
        Ok(value)
    }

    /// Writes a single attribute into the payload.
    ///
    /// Strings are stored as fixed-width byte runs: values longer than the
    /// declared attribute length are **silently truncated**, shorter values
    /// are padded with zero bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if `attr_num` is out of range or the value's type
    /// does not match the attribute's declared type.
    pub fn set_attr(&mut self, schema: &Schema, attr_num: usize, value: &Value) -> Result<()> {
        let attr = schema.attr(attr_num).ok_or_else(|| {
            HeapDbError::SchemaError(format!("Attribute index {attr_num} out of range"))
        })?;
        if value.data_type() != attr.data_type {
            return Err(HeapDbError::TypeError {
                expected: attr.data_type.name().into(),
                actual: value.data_type().name().into(),
            });
        }
        let offset = schema.attr_offset(attr_num);
        let field = self
            .data
            .get_mut(offset..offset + attr.byte_size())
            .ok_or_else(|| {
                HeapDbError::SchemaError("Record buffer is shorter than the schema requires".into())
            })?;

        match value {
            Value::Int(i) => field.copy_from_slice(&i.to_le_bytes()),
            Value::Float(f) => field.copy_from_slice(&f.to_le_bytes()),
            Value::Bool(b) => field[0] = u8::from(*b),
            Value::String(s) => {
                field.fill(0);
                let n = s.len().min(field.len());
                field[..n].copy_from_slice(&s.as_bytes()[..n]);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Attribute;

    fn test_schema() -> Schema {
        Schema::new(
            vec![
                Attribute::new("id", DataType::Int, 0),
                Attribute::new("name", DataType::String, 8),
                Attribute::new("score", DataType::Float, 0),
                Attribute::new("active", DataType::Bool, 0),
            ],
            vec![0],
        )
        .unwrap()
    }

    #[test]
    fn test_rid_display() {
        assert_eq!(Rid::new(3, 7).to_string(), "(3, 7)");
    }

    #[test]
    fn test_new_record_is_zeroed() {
        let schema = test_schema();
        let record = Record::new(&schema);
        assert!(record.id().is_none());
        assert_eq!(record.data().len(), schema.record_size());
        assert!(record.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_set_get_roundtrip() {
        let schema = test_schema();
        let mut record = Record::new(&schema);

        record.set_attr(&schema, 0, &Value::Int(-17)).unwrap();
        record
            .set_attr(&schema, 1, &Value::String("ada".into()))
            .unwrap();
        record.set_attr(&schema, 2, &Value::Float(3.5)).unwrap();
        record.set_attr(&schema, 3, &Value::Bool(true)).unwrap();

        assert_eq!(record.get_attr(&schema, 0).unwrap(), Value::Int(-17));
        assert_eq!(
            record.get_attr(&schema, 1).unwrap(),
            Value::String("ada".into())
        );
        assert_eq!(record.get_attr(&schema, 2).unwrap(), Value::Float(3.5));
        assert_eq!(record.get_attr(&schema, 3).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_string_truncation_and_padding() {
        let schema = test_schema();
        let mut record = Record::new(&schema);

        // Longer than the declared 8 bytes: truncated
        record
            .set_attr(&schema, 1, &Value::String("abcdefghij".into()))
            .unwrap();
        assert_eq!(
            record.get_attr(&schema, 1).unwrap(),
            Value::String("abcdefgh".into())
        );

        // Shorter: padded with zero bytes, read back without the padding
        record
            .set_attr(&schema, 1, &Value::String("xy".into()))
            .unwrap();
        assert_eq!(
            record.get_attr(&schema, 1).unwrap(),
            Value::String("xy".into())
        );
    }

    #[test]
    fn test_set_attr_type_mismatch() {
        let schema = test_schema();
        let mut record = Record::new(&schema);
        let err = record.set_attr(&schema, 0, &Value::Bool(true)).unwrap_err();
        assert!(matches!(err, HeapDbError::TypeError { .. }));
    }

    #[test]
    fn test_attr_out_of_range() {
        let schema = test_schema();
        let record = Record::new(&schema);
        assert!(record.get_attr(&schema, 4).is_err());
    }
}
