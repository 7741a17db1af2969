//! JSON:API response documents
//!
//! Renders executed queries as top-level documents with `data`, `included`,
//! `meta.total` and pagination `links`.

mod compose;
mod links;

pub use compose::{Document, DocumentComposer, Meta};
pub use links::Links;
