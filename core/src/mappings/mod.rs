use tracing::trace;

use crate::codec::segment::{self, DeltaState, Segment, TableBounds};
use crate::errors::MappingError;

/// The segments of one generated line, in the order they were written.
pub type Line = Vec<Segment>;

/// Accumulated `mappings` text: `;` between generated lines, `,` between segments.
///
/// The table only ever appends. Decoding walks the text from the start every time,
/// so nothing decoded is cached.
#[derive(Debug, Clone, Default)]
pub struct MappingsTable {
    raw: String,
    line_count: usize,
    // State after the last appended segment. `None` until the imported text has
    // been replayed once.
    end_state: Option<DeltaState>,
}

impl MappingsTable {
    pub fn new() -> Self {
        Self {
            raw: String::new(),
            line_count: 0,
            end_state: Some(DeltaState::default()),
        }
    }

    pub fn from_raw(raw: &str) -> Self {
        let mut table = Self::new();
        table.import(raw);
        table
    }

    /// Replace the table with `raw`. Trailing `;` separators are dropped.
    pub fn import(&mut self, raw: &str) {
        let trimmed = raw.trim_end_matches(';');
        self.raw = trimmed.to_string();
        self.line_count = if trimmed.is_empty() {
            0
        } else {
            trimmed.split(';').count()
        };
        self.end_state = if trimmed.is_empty() {
            Some(DeltaState::default())
        } else {
            None
        };
    }

    /// The accumulated text, verbatim.
    pub fn export(&self) -> &str {
        &self.raw
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    pub fn is_empty(&self) -> bool {
        self.line_count == 0
    }

    /// Lazily decode the table line by line. Each call starts again from the first line.
    pub fn lines(&self, bounds: TableBounds) -> Lines<'_> {
        Lines {
            raw: &self.raw,
            pos: 0,
            remaining: self.line_count,
            state: DeltaState::default(),
            bounds,
        }
    }

    /// Decode every line, failing on the first malformed segment.
    pub fn decode(&self, bounds: TableBounds) -> Result<Vec<Line>, MappingError> {
        self.lines(bounds).collect()
    }

    /// Replay the imported text so appends continue from its final state.
    ///
    /// Called implicitly by [`MappingsTable::append_line`]; calling it up front surfaces
    /// a corrupt table before anything is mutated.
    pub fn prime(&mut self, bounds: TableBounds) -> Result<(), MappingError> {
        if self.end_state.is_some() {
            return Ok(());
        }
        let mut lines = self.lines(bounds);
        for line in lines.by_ref() {
            line?;
        }
        let state = lines.state();
        self.end_state = Some(state);
        Ok(())
    }

    /// Encode `segments` as a new generated line at the end of the table.
    pub fn append_line(&mut self, segments: &[Segment]) -> Result<(), MappingError> {
        self.prime(TableBounds::UNCHECKED)?;
        let mut state = self.end_state.unwrap_or_default();
        state.start_line();

        if self.line_count > 0 {
            self.raw.push(';');
        }
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                self.raw.push(',');
            }
            segment::encode_segment(segment, &mut state, &mut self.raw);
        }

        self.line_count += 1;
        self.end_state = Some(state);
        trace!(line = self.line_count - 1, segments = segments.len(), "appended line");
        Ok(())
    }

    /// Append empty lines until the table covers `lines` generated lines.
    pub fn pad_to(&mut self, lines: usize) {
        while self.line_count < lines {
            if self.line_count > 0 {
                self.raw.push(';');
            }
            self.line_count += 1;
        }
    }
}

/// Iterator over the decoded lines of a [`MappingsTable`].
pub struct Lines<'a> {
    raw: &'a str,
    pos: usize,
    remaining: usize,
    state: DeltaState,
    bounds: TableBounds,
}

impl Lines<'_> {
    /// Delta state after the last decoded segment.
    pub fn state(&self) -> DeltaState {
        self.state
    }

    fn decode_line(&mut self, start: usize, text: &str) -> Result<Line, MappingError> {
        self.state.start_line();
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let mut segments = Vec::new();
        let mut offset = start;
        for token in text.split(',') {
            segments.push(segment::decode_segment(
                token,
                offset,
                &mut self.state,
                self.bounds,
            )?);
            offset += token.len() + 1;
        }
        Ok(segments)
    }
}

impl Iterator for Lines<'_> {
    type Item = Result<Line, MappingError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let raw = self.raw;
        let start = self.pos.min(raw.len());
        let rest = &raw[start..];
        let text = match rest.find(';') {
            Some(end) => &rest[..end],
            None => rest,
        };
        self.pos = start + text.len() + 1;

        let line = self.decode_line(start, text);
        if line.is_err() {
            self.remaining = 0;
        }
        Some(line)
    }
}

/// Decode a complete mappings string.
pub fn decode_all(raw: &str, bounds: TableBounds) -> Result<Vec<Line>, MappingError> {
    MappingsTable::from_raw(raw).decode(bounds)
}

/// Encode complete lines into a mappings string.
pub fn encode_all(lines: &[Line]) -> Result<String, MappingError> {
    let mut table = MappingsTable::new();
    for line in lines {
        table.append_line(line)?;
    }
    Ok(table.raw)
}
