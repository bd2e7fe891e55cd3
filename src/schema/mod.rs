//! # Schema Normalization
//!
//! Turns a header row plus data rows read from the backing store into
//! canonical [`ContactRecord`](crate::models::ContactRecord)s. Header labels
//! are matched through an explicit alias table, so every historical spelling
//! of a column ("Contact", " contact ", "Phone Number", ...) resolves to the
//! same canonical field.

pub mod alias;
pub mod layout;
pub mod normalizer;

pub use alias::{normalize_label, AliasTable, CanonicalField};
pub use layout::ColumnLayout;
pub use normalizer::{NormalizedSheet, SchemaNormalizer};
