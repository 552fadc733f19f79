/// Byte-level reader over a slice of mapping text.
///
/// `base` is the offset of the slice inside the full mappings string, so positions
/// reported by [`Cursor::offset`] can be used directly as error spans.
pub struct Cursor<'src> {
    source: &'src [u8],
    base: usize,
    pos: usize,
}

impl<'src> Cursor<'src> {
    pub fn new(source: &'src str) -> Self {
        Self::at(source, 0)
    }

    pub fn at(source: &'src str, base: usize) -> Self {
        Self {
            source: source.as_bytes(),
            base,
            pos: 0,
        }
    }

    /// Current byte position in the slice.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Current byte position in the full mappings string.
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    /// Advance one byte and return it.
    pub fn advance(&mut self) -> Option<u8> {
        let byte = self.source.get(self.pos).copied()?;
        self.pos += 1;
        Some(byte)
    }

    /// Whether the cursor has reached the end.
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_includes_base() {
        let mut cursor = Cursor::at("gB", 10);
        assert_eq!(cursor.offset(), 10);
        assert_eq!(cursor.advance(), Some(b'g'));
        assert_eq!(cursor.offset(), 11);
        cursor.advance();
        assert!(cursor.is_at_end());
        assert_eq!(cursor.advance(), None);
    }
}
