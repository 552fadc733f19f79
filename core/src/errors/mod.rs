mod envelope_error;
mod mapping_error;

pub use envelope_error::EnvelopeError;
pub use mapping_error::MappingError;

use miette::Diagnostic;
use thiserror::Error;

/// Unified error type wrapping every failure a source map operation can raise.
#[derive(Debug, Error, Diagnostic)]
pub enum SourceMapError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Envelope(#[from] EnvelopeError),
}
