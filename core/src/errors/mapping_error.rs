use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Failures raised while encoding or decoding the `mappings` string.
///
/// Spans are byte ranges inside the mappings text being decoded.
#[derive(Debug, Error, Diagnostic)]
pub enum MappingError {
    #[error("malformed VLQ: {reason}")]
    #[diagnostic(help("mappings may only contain base64 characters, ',' and ';'"))]
    MalformedVlq {
        reason: &'static str,

        #[label("here")]
        span: SourceSpan,
    },

    #[error("segment has {found} fields, expected 1, 4 or 5")]
    InvalidSegmentArity {
        found: usize,

        #[label("this segment")]
        span: SourceSpan,
    },

    #[error("source index {index} is out of range ({len} sources)")]
    SourceIndexOutOfRange {
        index: i64,
        len: usize,

        #[label("referenced here")]
        span: SourceSpan,
    },

    #[error("name index {index} is out of range ({len} names)")]
    NameIndexOutOfRange {
        index: i64,
        len: usize,

        #[label("referenced here")]
        span: SourceSpan,
    },

    #[error("original line went negative ({value})")]
    NegativeLine {
        value: i64,

        #[label("in this segment")]
        span: SourceSpan,
    },

    #[error("column went negative ({value})")]
    NegativeColumn {
        value: i64,

        #[label("in this segment")]
        span: SourceSpan,
    },

    #[error("index {index} is out of range (table holds {len} entries)")]
    IndexOutOfRange { index: u32, len: usize },
}

impl MappingError {
    pub fn malformed_vlq(reason: &'static str, offset: usize, length: usize) -> Self {
        Self::MalformedVlq {
            reason,
            span: (offset, length).into(),
        }
    }

    /// Byte range in the mappings text this error points at, if any.
    pub fn span(&self) -> Option<SourceSpan> {
        match self {
            Self::MalformedVlq { span, .. }
            | Self::InvalidSegmentArity { span, .. }
            | Self::SourceIndexOutOfRange { span, .. }
            | Self::NameIndexOutOfRange { span, .. }
            | Self::NegativeLine { span, .. }
            | Self::NegativeColumn { span, .. } => Some(*span),
            Self::IndexOutOfRange { .. } => None,
        }
    }
}
