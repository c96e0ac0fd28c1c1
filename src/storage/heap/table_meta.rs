//! Page-0 table catalog: bookkeeping counters plus the schema, as text.
//!
//! The catalog page holds:
//!
//! ```text
//! line 1:  num_tuples next_free_page      (next_free_page is -1 or >= 1)
//! line 2:  num_attrs
//! line 3+: type_code type_length name     (one line per attribute)
//! ```
//!
//! The rest of the page is zero-padded; parsing stops at the first zero
//! byte.

use crate::catalog::{Attribute, Schema};
use crate::error::{HeapDbError, Result};
use crate::storage::page::PageNum;
use crate::types::DataType;

/// Table-level bookkeeping persisted alongside the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableMeta {
    /// Number of live records across all data pages.
    pub num_tuples: u64,
    /// A data page known to have had a free slot, if any.
    pub next_free_page: Option<PageNum>,
}

impl TableMeta {
    /// Returns the metadata of a freshly created, empty table.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            num_tuples: 0,
            next_free_page: None,
        }
    }
}

/// Encodes the catalog into a page buffer, zero-padding the remainder.
///
/// # Errors
///
/// Returns an error if the rendered catalog does not fit in one page.
pub fn encode(meta: &TableMeta, schema: &Schema, page: &mut [u8]) -> Result<()> {
    let mut text = String::new();
    let next_free = meta.next_free_page.map_or(-1, i64::from);
    text.push_str(&format!("{} {}\n", meta.num_tuples, next_free));
    text.push_str(&format!("{}\n", schema.num_attrs()));
    for attr in schema.attrs() {
        text.push_str(&format!(
            "{} {} {}\n",
            attr.data_type.code(),
            attr.length,
            attr.name
        ));
    }

    if text.len() >= page.len() {
        return Err(HeapDbError::CatalogError(format!(
            "Catalog of {} bytes does not fit in one page",
            text.len()
        )));
    }

    page.fill(0);
    page[..text.len()].copy_from_slice(text.as_bytes());
    Ok(())
}

/// Parses the catalog out of a page buffer.
///
/// The persisted format stores no key attribute indices; a single key at
/// attribute 0 is assumed, matching what [`encode`] wrote it from.
///
/// # Errors
///
/// Returns an error if the page does not hold a well-formed catalog.
pub fn decode(page: &[u8]) -> Result<(TableMeta, Schema)> {
    let end = page.iter().position(|&b| b == 0).unwrap_or(page.len());
    let text = std::str::from_utf8(&page[..end])
        .map_err(|e| HeapDbError::CatalogError(format!("Catalog page is not UTF-8: {e}")))?;
    let mut lines = text.lines();

    let header = lines
        .next()
        .ok_or_else(|| HeapDbError::CatalogError("Catalog page is empty".into()))?;
    let mut fields = header.split_whitespace();
    let num_tuples: u64 = parse_field(fields.next(), "num_tuples")?;
    let next_free: i64 = parse_field(fields.next(), "next_free_page")?;
    let next_free_page = if next_free >= 1 {
        Some(next_free as PageNum)
    } else {
        None
    };

    let num_attrs: usize = parse_field(lines.next(), "attribute count")?;
    let mut attrs = Vec::with_capacity(num_attrs);
    for i in 0..num_attrs {
        let line = lines.next().ok_or_else(|| {
            HeapDbError::CatalogError(format!("Catalog ends before attribute {i}"))
        })?;
        let mut fields = line.split_whitespace();
        let code: u8 = parse_field(fields.next(), "type code")?;
        let length: usize = parse_field(fields.next(), "type length")?;
        let name = fields
            .next()
            .ok_or_else(|| HeapDbError::CatalogError(format!("Attribute {i} has no name")))?;
        let data_type = DataType::from_code(code)
            .ok_or_else(|| HeapDbError::CatalogError(format!("Unknown type code {code}")))?;
        attrs.push(Attribute::new(name, data_type, length));
    }

    let schema = Schema::new(attrs, vec![0])?;
    Ok((
        TableMeta {
            num_tuples,
            next_free_page,
        },
        schema,
    ))
}

fn parse_field<T: std::str::FromStr>(field: Option<&str>, what: &str) -> Result<T> {
    field
        .ok_or_else(|| HeapDbError::CatalogError(format!("Missing {what}")))?
        .parse()
        .map_err(|_| HeapDbError::CatalogError(format!("Malformed {what}")))
}
