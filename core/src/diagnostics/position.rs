/// Human-facing location inside a mappings string. All fields are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingPos {
    /// Generated line the byte belongs to.
    pub line: usize,
    /// Segment within that line.
    pub segment: usize,
    /// Byte column within the line's text.
    pub col: usize,
}

/// Offsets of every generated line inside a mappings string.
#[derive(Debug, Clone)]
pub struct MappingsIndex {
    line_offsets: Vec<usize>,
    segment_breaks: Vec<usize>,
}

impl MappingsIndex {
    pub fn from_mappings(mappings: &str) -> Self {
        let mut line_offsets = vec![0];
        let mut segment_breaks = Vec::new();
        for (idx, byte) in mappings.bytes().enumerate() {
            match byte {
                b';' => line_offsets.push(idx + 1),
                b',' => segment_breaks.push(idx),
                _ => {}
            }
        }
        Self {
            line_offsets,
            segment_breaks,
        }
    }

    pub fn byte_to_pos(&self, byte: usize) -> MappingPos {
        let line_idx = match self.line_offsets.binary_search(&byte) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let line_start = self.line_offsets.get(line_idx).copied().unwrap_or(0);
        let before_line = self.segment_breaks.partition_point(|&b| b < line_start);
        let before_byte = self.segment_breaks.partition_point(|&b| b < byte);
        MappingPos {
            line: line_idx + 1,
            segment: before_byte - before_line + 1,
            col: byte.saturating_sub(line_start) + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locates_line_and_segment() {
        let index = MappingsIndex::from_mappings("AAAA,CAAC;;AACA,E!");
        assert_eq!(
            index.byte_to_pos(0),
            MappingPos {
                line: 1,
                segment: 1,
                col: 1
            }
        );
        assert_eq!(
            index.byte_to_pos(5),
            MappingPos {
                line: 1,
                segment: 2,
                col: 6
            }
        );
        assert_eq!(
            index.byte_to_pos(17),
            MappingPos {
                line: 3,
                segment: 2,
                col: 7
            }
        );
    }
}
