pub mod codec;
pub mod diagnostics;
pub mod document;
pub mod errors;
pub mod index_table;
pub mod mappings;
pub mod resolve;

pub use codec::{DeltaState, OriginalLocation, Segment, TableBounds};
pub use document::{MappedOriginal, MappedSegment, SourceMapDocument, merge};
pub use errors::{EnvelopeError, MappingError, SourceMapError};
pub use index_table::IndexTable;
pub use mappings::{Line, MappingsTable};
pub use resolve::UrlMapper;

/// Convenience function to parse a source map from its JSON text.
pub fn parse(json: &str) -> Result<SourceMapDocument, SourceMapError> {
    SourceMapDocument::from_json(json)
}
