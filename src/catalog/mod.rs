//! Schema definitions for heap-file tables.

mod schema;

pub use schema::{Attribute, Schema};
