//! Table schemas: attribute names, types, lengths, and key attributes.

use std::collections::HashSet;

use crate::error::{HeapDbError, Result};
use crate::types::DataType;

/// Definition of a single attribute in a table schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name.
    pub name: String,
    /// Attribute data type.
    pub data_type: DataType,
    /// Declared byte length for strings; 0 for the fixed-width types.
    pub length: usize,
}

impl Attribute {
    /// Creates a new attribute definition.
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: DataType, length: usize) -> Self {
        Self {
            name: name.into(),
            data_type,
            length,
        }
    }

    /// Returns the number of bytes this attribute occupies in a record.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        self.data_type.byte_size(self.length)
    }
}

/// Schema of a heap-file table.
///
/// Records are laid out as the concatenation of their attributes' on-disk
/// encodings, in declaration order; there is no per-record header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    attrs: Vec<Attribute>,
    key_attrs: Vec<usize>,
}

impl Schema {
    /// Creates a new schema with validation.
    ///
    /// # Errors
    ///
    /// Returns an error if the attribute list is empty, an attribute name
    /// is duplicated or empty, a string attribute declares a zero length,
    /// or a key index is out of range.
    pub fn new(attrs: Vec<Attribute>, key_attrs: Vec<usize>) -> Result<Self> {
        if attrs.is_empty() {
            return Err(HeapDbError::SchemaError(
                "Schema must have at least one attribute".into(),
            ));
        }

        let mut seen = HashSet::new();
        for attr in &attrs {
            if attr.name.is_empty() {
                return Err(HeapDbError::SchemaError(
                    "Attribute name cannot be empty".into(),
                ));
            }
            if !seen.insert(&attr.name) {
                return Err(HeapDbError::SchemaError(format!(
                    "Duplicate attribute name '{}'",
                    attr.name
                )));
            }
            if attr.data_type == DataType::String && attr.length == 0 {
                return Err(HeapDbError::SchemaError(format!(
                    "String attribute '{}' must declare a length",
                    attr.name
                )));
            }
        }

        for &key in &key_attrs {
            if key >= attrs.len() {
                return Err(HeapDbError::SchemaError(format!(
                    "Key attribute index {key} out of range"
                )));
            }
        }

        Ok(Self { attrs, key_attrs })
    }

    /// Returns the number of attributes.
    #[must_use]
    pub fn num_attrs(&self) -> usize {
        self.attrs.len()
    }

    /// Returns the attribute at the given index.
    #[must_use]
    pub fn attr(&self, index: usize) -> Option<&Attribute> {
        self.attrs.get(index)
    }

    /// Returns all attributes in declaration order.
    #[must_use]
    pub fn attrs(&self) -> &[Attribute] {
        &self.attrs
    }

    /// Returns the key attribute indices.
    #[must_use]
    pub fn key_attrs(&self) -> &[usize] {
        &self.key_attrs
    }

    /// Finds the index of an attribute by name.
    #[must_use]
    pub fn attr_index(&self, name: &str) -> Option<usize> {
        self.attrs.iter().position(|a| a.name == name)
    }

    /// Returns the fixed record size in bytes: the sum of all attribute
    /// byte sizes.
    #[must_use]
    pub fn record_size(&self) -> usize {
        self.attrs.iter().map(Attribute::byte_size).sum()
    }

    /// Returns the byte offset of an attribute within a record: the sum of
    /// the byte sizes of all preceding attributes.
    #[must_use]
    pub fn attr_offset(&self, index: usize) -> usize {
        self.attrs[..index].iter().map(Attribute::byte_size).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Schema {
        Schema::new(
            vec![
                Attribute::new("id", DataType::Int, 0),
                Attribute::new("name", DataType::String, 10),
                Attribute::new("salary", DataType::Float, 0),
                Attribute::new("active", DataType::Bool, 0),
            ],
            vec![0],
        )
        .unwrap()
    }

    #[test]
    fn test_record_size_and_offsets() {
        let schema = sample();
        // 4 + 10 + 4 + 1
        assert_eq!(schema.record_size(), 19);
        assert_eq!(schema.attr_offset(0), 0);
        assert_eq!(schema.attr_offset(1), 4);
        assert_eq!(schema.attr_offset(2), 14);
        assert_eq!(schema.attr_offset(3), 18);
    }

    #[test]
    fn test_attr_lookup() {
        let schema = sample();
        assert_eq!(schema.num_attrs(), 4);
        assert_eq!(schema.attr_index("salary"), Some(2));
        assert_eq!(schema.attr_index("missing"), None);
        assert_eq!(schema.attr(1).unwrap().length, 10);
        assert_eq!(schema.key_attrs(), &[0]);
    }

    #[test]
    fn test_empty_schema_rejected() {
        assert!(Schema::new(vec![], vec![]).is_err());
    }

    #[test]
    fn test_duplicate_attr_rejected() {
        let result = Schema::new(
            vec![
                Attribute::new("a", DataType::Int, 0),
                Attribute::new("a", DataType::Int, 0),
            ],
            vec![0],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_unsized_string_rejected() {
        let result = Schema::new(vec![Attribute::new("s", DataType::String, 0)], vec![0]);
        assert!(result.is_err());
    }

    #[test]
    fn test_key_out_of_range_rejected() {
        let result = Schema::new(vec![Attribute::new("a", DataType::Int, 0)], vec![1]);
        assert!(result.is_err());
    }
}
