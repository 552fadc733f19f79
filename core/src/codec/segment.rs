use tracing::trace;

use super::vlq;
use crate::errors::MappingError;

/// Where a segment points in the original sources.
///
/// The source, line and column travel together; a name only exists alongside them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OriginalLocation {
    pub source: u32,
    pub line: u32,
    pub column: u32,
    pub name: Option<u32>,
}

/// One mapping record for a column of a generated line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Segment {
    pub generated_column: u32,
    pub original: Option<OriginalLocation>,
}

impl Segment {
    /// A segment that maps to nothing (one field).
    pub fn unmapped(generated_column: u32) -> Self {
        Self {
            generated_column,
            original: None,
        }
    }

    /// A segment that maps to a source position (four fields).
    pub fn mapped(generated_column: u32, source: u32, line: u32, column: u32) -> Self {
        Self {
            generated_column,
            original: Some(OriginalLocation {
                source,
                line,
                column,
                name: None,
            }),
        }
    }

    /// Attach a name index. Has no effect on an unmapped segment.
    pub fn with_name(mut self, name: u32) -> Self {
        if let Some(original) = self.original.as_mut() {
            original.name = Some(name);
        }
        self
    }

    /// Number of VLQ fields this segment encodes to.
    pub fn field_count(&self) -> usize {
        match self.original {
            None => 1,
            Some(OriginalLocation { name: None, .. }) => 4,
            Some(OriginalLocation { name: Some(_), .. }) => 5,
        }
    }
}

/// The running absolute values every encoded field is a delta against.
///
/// `generated_column` restarts at zero on every generated line; the other four carry
/// over from the last segment that set them, across line boundaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeltaState {
    pub generated_column: u32,
    pub source: u32,
    pub original_line: u32,
    pub original_column: u32,
    pub name: u32,
}

impl DeltaState {
    pub fn start_line(&mut self) {
        self.generated_column = 0;
    }
}

/// Table sizes decoded source and name indices are checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableBounds {
    pub sources: usize,
    pub names: usize,
}

impl TableBounds {
    /// Bounds that accept any index; used when replaying text only to recover state.
    pub const UNCHECKED: Self = Self {
        sources: usize::MAX,
        names: usize::MAX,
    };

    pub fn new(sources: usize, names: usize) -> Self {
        Self { sources, names }
    }
}

/// Decode one segment token, advancing `state` field by field.
///
/// `offset` is where the token starts in the full mappings string, for error spans.
pub fn decode_segment(
    token: &str,
    offset: usize,
    state: &mut DeltaState,
    bounds: TableBounds,
) -> Result<Segment, MappingError> {
    let span = (offset, token.len());
    let values = vlq::decode_all_at(token, offset)?;
    trace!(token, ?values, "decoding segment");

    if !matches!(values.len(), 1 | 4 | 5) {
        return Err(MappingError::InvalidSegmentArity {
            found: values.len(),
            span: span.into(),
        });
    }

    let column = accumulate(state.generated_column, values[0]);
    if column < 0 {
        return Err(MappingError::NegativeColumn {
            value: column,
            span: span.into(),
        });
    }
    let generated_column = to_u32(column, span)?;
    state.generated_column = generated_column;

    let original = if values.len() >= 4 {
        let source = accumulate(state.source, values[1]);
        if source < 0 || source as u64 >= bounds.sources as u64 {
            return Err(MappingError::SourceIndexOutOfRange {
                index: source,
                len: bounds.sources,
                span: span.into(),
            });
        }
        let source = to_u32(source, span)?;
        state.source = source;

        let line = accumulate(state.original_line, values[2]);
        if line < 0 {
            return Err(MappingError::NegativeLine {
                value: line,
                span: span.into(),
            });
        }
        let line = to_u32(line, span)?;
        state.original_line = line;

        let column = accumulate(state.original_column, values[3]);
        if column < 0 {
            return Err(MappingError::NegativeColumn {
                value: column,
                span: span.into(),
            });
        }
        let column = to_u32(column, span)?;
        state.original_column = column;

        let name = match values.get(4) {
            Some(&delta) => {
                let name = accumulate(state.name, delta);
                if name < 0 || name as u64 >= bounds.names as u64 {
                    return Err(MappingError::NameIndexOutOfRange {
                        index: name,
                        len: bounds.names,
                        span: span.into(),
                    });
                }
                let name = to_u32(name, span)?;
                state.name = name;
                Some(name)
            }
            None => None,
        };

        Some(OriginalLocation {
            source,
            line,
            column,
            name,
        })
    } else {
        None
    };

    let segment = Segment {
        generated_column,
        original,
    };
    trace!(?segment, "decoded segment");
    Ok(segment)
}

/// Encode `segment` onto `out`, advancing `state` exactly as decoding it would.
pub fn encode_segment(segment: &Segment, state: &mut DeltaState, out: &mut String) {
    let start = out.len();

    vlq::encode_into(
        delta(segment.generated_column, state.generated_column),
        out,
    );
    state.generated_column = segment.generated_column;

    if let Some(original) = segment.original {
        vlq::encode_into(delta(original.source, state.source), out);
        state.source = original.source;

        vlq::encode_into(delta(original.line, state.original_line), out);
        state.original_line = original.line;

        vlq::encode_into(delta(original.column, state.original_column), out);
        state.original_column = original.column;

        if let Some(name) = original.name {
            vlq::encode_into(delta(name, state.name), out);
            state.name = name;
        }
    }

    trace!(?segment, token = &out[start..], "encoded segment");
}

/// Encode one segment to a fresh token.
pub fn encode(segment: &Segment, state: &mut DeltaState) -> String {
    let mut out = String::new();
    encode_segment(segment, state, &mut out);
    out
}

/// Decode one standalone token.
pub fn decode(
    token: &str,
    state: &mut DeltaState,
    bounds: TableBounds,
) -> Result<Segment, MappingError> {
    decode_segment(token, 0, state, bounds)
}

fn accumulate(previous: u32, delta: i64) -> i64 {
    i64::from(previous).saturating_add(delta)
}

fn delta(current: u32, previous: u32) -> i64 {
    i64::from(current) - i64::from(previous)
}

fn to_u32(value: i64, span: (usize, usize)) -> Result<u32, MappingError> {
    u32::try_from(value)
        .map_err(|_| MappingError::malformed_vlq("value does not fit in 32 bits", span.0, span.1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_count_follows_groups() {
        assert_eq!(Segment::unmapped(3).field_count(), 1);
        assert_eq!(Segment::mapped(0, 0, 0, 0).field_count(), 4);
        assert_eq!(Segment::mapped(0, 0, 0, 0).with_name(2).field_count(), 5);
        assert_eq!(Segment::unmapped(0).with_name(2).field_count(), 1);
    }

    #[test]
    fn decode_threads_state() {
        let mut state = DeltaState::default();
        let bounds = TableBounds::new(2, 1);
        let first = decode("AAAA", &mut state, bounds).unwrap();
        let second = decode("EACEA", &mut state, bounds).unwrap();
        assert_eq!(first, Segment::mapped(0, 0, 0, 0));
        assert_eq!(second, Segment::mapped(2, 0, 1, 2).with_name(0));
        assert_eq!(state.generated_column, 2);
        assert_eq!(state.original_line, 1);
    }
}
