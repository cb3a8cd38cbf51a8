//! # Blog Search Shared
//!
//! Domain types shared by the blog search crates: the indexed document,
//! its schema, the index descriptor and the supported query shapes.

pub mod descriptor;
pub mod document;
pub mod query;
pub mod schema;

pub use descriptor::IndexDescriptor;
pub use document::{IndexDocument, Post};
pub use query::QuerySpec;
pub use schema::{FieldType, Schema};
