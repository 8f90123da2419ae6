//! # hybridsearch-core
//!
//! Domain library for hybrid (dense + sparse) search over a startup corpus:
//! corpus records, vector types, payload filters, Reciprocal Rank Fusion,
//! embedding providers, and an in-process store with the same query
//! semantics as the external vector database.
//!
//! This crate has zero async dependencies. The HTTP façade, the Qdrant
//! client, and the loader live in `hybridsearch-server`.

/// Global configuration constants: model names, limits, and defaults.
pub mod config;
/// Corpus records and their JSON payloads.
pub mod document;
/// Dense + sparse embedding providers.
pub mod embedding;
/// Error taxonomy shared across the workspace.
pub mod error;
/// Payload filter types used by search and storage layers.
pub mod filter_types;
/// Search primitives: hybrid queries, scored points, filtering, and RRF fusion.
pub mod search;
/// In-process collections with brute-force hybrid retrieval.
pub mod storage;
/// Dense and sparse vectors and the collection schema.
pub mod vector;

pub use error::{Error, Result};
