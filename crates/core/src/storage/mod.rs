//! In-process storage: collections of points grouped by a database.
//!
//! Brute-force dense and sparse retrieval with explicit RRF fusion. It
//! implements the same query semantics as the external store and is used for
//! tests and for running the service without a Qdrant instance. Nothing is
//! persisted.

/// Collection and database data structures.
pub mod collection;

pub use collection::{Collection, Database, StoredPoint};
