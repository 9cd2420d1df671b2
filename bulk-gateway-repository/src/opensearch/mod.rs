//! OpenSearch implementation of the search engine interface.
//!
//! This module provides a concrete implementation of `SearchEngine`
//! using the OpenSearch Rust crate.

mod engine;

pub use engine::OpenSearchEngine;
