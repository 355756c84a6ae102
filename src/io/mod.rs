//! Input boundary: CSV spectrum ingest.

pub mod ingest;

pub use ingest::*;
