//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external collaborators. The import
//! pipeline depends only on these traits, not on concrete codecs or stores.

mod grid_reader;
mod record_sink;

pub use grid_reader::GridReader;
pub use record_sink::RecordSink;
