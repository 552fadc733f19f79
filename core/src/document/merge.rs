use tracing::debug;

use super::SourceMapDocument;
use crate::errors::SourceMapError;

impl SourceMapDocument {
    /// Append `other` after this document, as if its generated file were concatenated
    /// onto this one.
    ///
    /// Donor lines are decoded to absolute positions and re-encoded here, so their
    /// sources and names re-resolve through this document's tables. Existing lines,
    /// sources and names keep their positions. Any `sourceMappingURL` is cleared since
    /// it no longer describes the merged file.
    ///
    /// Once either side carries a generated body, the body and the mappings are kept
    /// the same length: whichever is shorter is padded with empty lines, before and
    /// after the donor is appended.
    pub fn append_sourcemap(&mut self, other: &SourceMapDocument) -> Result<(), SourceMapError> {
        let donor_lines = other.mapped_lines()?;
        let bounds = self.bounds();
        self.mappings.prime(bounds)?;

        if other.generated.is_some() {
            self.generated.get_or_insert_with(String::new);
        }
        // Donor line N must land on the generated line its body line N lands on.
        self.align_generated_lines();

        let first_line = self.mappings.line_count();
        for line in &donor_lines {
            self.append_mapped_line(line)?;
        }

        if let Some(donor_body) = other.generated.as_deref() {
            self.generated
                .get_or_insert_with(String::new)
                .push_str(donor_body);
        }
        self.align_generated_lines();
        self.source_mapping_url = None;

        for (&index, contents) in &other.sources_content {
            let source = other.sources.from_index(index)?;
            self.add_original(source, contents.clone());
        }
        if other.include_originals || !other.sources_content.is_empty() {
            self.include_originals = true;
        }

        debug!(
            first_line,
            lines = donor_lines.len(),
            sources = self.sources.count(),
            names = self.names.count(),
            "appended source map"
        );
        Ok(())
    }

    /// Pad the body or the mappings so both cover the same number of lines.
    /// Without a body the mappings alone define the generated lines.
    fn align_generated_lines(&mut self) {
        let body_lines = self.generated_line_count();
        let lines = body_lines.max(self.mappings.line_count());
        let Some(body) = self.generated.as_mut() else {
            return;
        };
        body.extend(std::iter::repeat_n('\n', lines - body_lines));
        self.mappings.pad_to(lines);
    }
}

/// Concatenate documents in order into a fresh one.
pub fn merge<'a>(
    documents: impl IntoIterator<Item = &'a SourceMapDocument>,
) -> Result<SourceMapDocument, SourceMapError> {
    let mut merged = SourceMapDocument::new();
    for document in documents {
        merged.append_sourcemap(document)?;
    }
    Ok(merged)
}
