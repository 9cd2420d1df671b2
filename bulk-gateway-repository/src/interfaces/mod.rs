//! Interface definitions for the search engine backend.
//!
//! This module defines the abstract `SearchEngine` trait that the gateway drives,
//! allowing the OpenSearch transport to be swapped for test doubles.

mod search_engine;

pub use search_engine::SearchEngine;
