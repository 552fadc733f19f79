use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Failures raised while reading or writing the JSON envelope and the files around it.
#[derive(Debug, Error, Diagnostic)]
pub enum EnvelopeError {
    #[error("unsupported source map version {found}, only version 3 is supported")]
    UnsupportedVersion { found: String },

    #[error("invalid source map JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not access '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{}' is not a file", .path.display())]
    NotAFile { path: PathBuf },

    #[error("output directory '{}' does not exist", .path.display())]
    #[diagnostic(help("create the directory before saving into it"))]
    MissingDirectory { path: PathBuf },
}

impl EnvelopeError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
