mod envelope;
mod generated;
mod merge;

pub use envelope::{common_source_root, strip_xssi_prefix};
pub use generated::{find_source_mapping_url, strip_source_mapping_urls};
pub use merge::merge;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::codec::{OriginalLocation, Segment, TableBounds};
use crate::errors::{EnvelopeError, MappingError, SourceMapError};
use crate::index_table::IndexTable;
use crate::mappings::{Line, MappingsTable};
use crate::resolve::UrlMapper;

/// The only source map version this crate reads or writes.
pub const VERSION: u32 = 3;

/// A segment whose source and name are spelled out instead of indexed.
///
/// This is the table-independent form used to move mappings between documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedSegment {
    pub generated_column: u32,
    pub original: Option<MappedOriginal>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedOriginal {
    pub source: String,
    pub line: u32,
    pub column: u32,
    pub name: Option<String>,
}

impl MappedSegment {
    pub fn unmapped(generated_column: u32) -> Self {
        Self {
            generated_column,
            original: None,
        }
    }

    pub fn mapped(generated_column: u32, source: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            generated_column,
            original: Some(MappedOriginal {
                source: source.into(),
                line,
                column,
                name: None,
            }),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        if let Some(original) = self.original.as_mut() {
            original.name = Some(name.into());
        }
        self
    }
}

/// A version 3 source map together with the generated file it describes.
#[derive(Debug, Clone)]
pub struct SourceMapDocument {
    file: Option<String>,
    source_root: Option<String>,
    sources: IndexTable,
    names: IndexTable,
    mappings: MappingsTable,
    sources_content: BTreeMap<u32, String>,
    include_originals: bool,
    source_mapping_url: Option<String>,
    generated: Option<String>,
    map_loaded: bool,
    url_mapper: UrlMapper,
}

impl Default for SourceMapDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceMapDocument {
    pub fn new() -> Self {
        Self {
            file: None,
            source_root: None,
            sources: IndexTable::new(),
            names: IndexTable::new(),
            mappings: MappingsTable::new(),
            sources_content: BTreeMap::new(),
            include_originals: false,
            source_mapping_url: None,
            generated: None,
            map_loaded: false,
            url_mapper: UrlMapper::new(),
        }
    }

    pub fn with_url_mapper(mut self, mapper: UrlMapper) -> Self {
        self.url_mapper = mapper;
        self
    }

    pub fn url_mapper(&self) -> &UrlMapper {
        &self.url_mapper
    }

    pub fn url_mapper_mut(&mut self) -> &mut UrlMapper {
        &mut self.url_mapper
    }

    pub fn version(&self) -> u32 {
        VERSION
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn set_file(&mut self, file: Option<String>) {
        self.file = file;
    }

    /// Preferred `sourceRoot` for saving. Loading always folds the root into the sources.
    pub fn source_root(&self) -> Option<&str> {
        self.source_root.as_deref()
    }

    pub fn set_source_root(&mut self, root: Option<String>) {
        self.source_root = root;
    }

    pub fn sources(&self) -> &IndexTable {
        &self.sources
    }

    pub fn names(&self) -> &IndexTable {
        &self.names
    }

    pub fn mappings(&self) -> &MappingsTable {
        &self.mappings
    }

    pub fn source_mapping_url(&self) -> Option<&str> {
        self.source_mapping_url.as_deref()
    }

    pub fn set_source_mapping_url(&mut self, url: Option<String>) {
        self.source_mapping_url = url;
    }

    /// Whether a source map has been parsed into this document.
    pub fn has_sourcemap(&self) -> bool {
        self.map_loaded
    }

    pub fn include_originals(&self) -> bool {
        self.include_originals
    }

    pub fn set_include_originals(&mut self, include: bool) {
        self.include_originals = include;
    }

    pub fn source_to_index(&mut self, source: &str) -> u32 {
        self.sources.to_index(source)
    }

    pub fn source_from_index(&self, index: u32) -> Result<&str, MappingError> {
        self.sources.from_index(index)
    }

    pub fn name_to_index(&mut self, name: &str) -> u32 {
        self.names.to_index(name)
    }

    pub fn name_from_index(&self, index: u32) -> Result<&str, MappingError> {
        self.names.from_index(index)
    }

    fn bounds(&self) -> TableBounds {
        TableBounds::new(self.sources.count(), self.names.count())
    }

    /// Decode the mappings, checking every index against this document's tables.
    pub fn decoded_lines(&self) -> Result<Vec<Line>, MappingError> {
        self.mappings.decode(self.bounds())
    }

    /// Decode the mappings with sources and names resolved to their strings.
    pub fn mapped_lines(&self) -> Result<Vec<Vec<MappedSegment>>, MappingError> {
        self.mappings
            .lines(self.bounds())
            .map(|line| -> Result<Vec<MappedSegment>, MappingError> {
                line?
                    .iter()
                    .map(|segment| self.resolve_segment(segment))
                    .collect()
            })
            .collect()
    }

    fn resolve_segment(&self, segment: &Segment) -> Result<MappedSegment, MappingError> {
        let original = match segment.original {
            Some(original) => Some(MappedOriginal {
                source: self.sources.from_index(original.source)?.to_string(),
                line: original.line,
                column: original.column,
                name: original
                    .name
                    .map(|name| self.names.from_index(name).map(str::to_string))
                    .transpose()?,
            }),
            None => None,
        };
        Ok(MappedSegment {
            generated_column: segment.generated_column,
            original,
        })
    }

    /// Append one generated line of index-based segments.
    ///
    /// Every index must already exist in this document's tables.
    pub fn append_line(&mut self, segments: &[Segment]) -> Result<(), MappingError> {
        for original in segments.iter().filter_map(|segment| segment.original) {
            self.sources.from_index(original.source)?;
            if let Some(name) = original.name {
                self.names.from_index(name)?;
            }
        }
        self.mappings.append_line(segments)
    }

    /// Append one generated line, registering any source or name not seen before.
    pub fn append_mapped_line(&mut self, segments: &[MappedSegment]) -> Result<(), MappingError> {
        let line: Vec<Segment> = segments
            .iter()
            .map(|segment| Segment {
                generated_column: segment.generated_column,
                original: segment.original.as_ref().map(|original| OriginalLocation {
                    source: self.sources.to_index(&original.source),
                    line: original.line,
                    column: original.column,
                    name: original
                        .name
                        .as_deref()
                        .map(|name| self.names.to_index(name)),
                }),
            })
            .collect();
        self.mappings.append_line(&line)
    }

    /// Store the original contents of `url`, registering it as a source.
    pub fn add_original(&mut self, url: &str, contents: impl Into<String>) -> u32 {
        let index = self.sources.to_index(url);
        self.sources_content.insert(index, contents.into());
        index
    }

    /// Contents of the original `url`, read from the local filesystem when not yet stored.
    ///
    /// Returns `None` for unknown sources and for contents that cannot be found locally.
    pub fn original(&mut self, url: &str) -> Option<&str> {
        let index = self.sources.get_index(url)?;
        if !self.sources_content.contains_key(&index) {
            let contents = self.fetch_local(url)?;
            self.sources_content.insert(index, contents);
        }
        self.sources_content.get(&index).map(String::as_str)
    }

    /// Stored original contents by source index.
    pub fn original_by_index(&self, index: u32) -> Option<&str> {
        self.sources_content.get(&index).map(String::as_str)
    }

    /// Read a local original. `url` defaults to the path's mapped URL, then to the path itself.
    pub fn load_original(
        &mut self,
        path: impl AsRef<Path>,
        url: Option<&str>,
    ) -> Result<u32, SourceMapError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| EnvelopeError::io(path, e))?;
        let url = match url {
            Some(url) => url.to_string(),
            None => self
                .url_mapper
                .local_path_to_url(path)
                .unwrap_or_else(|| path.display().to_string()),
        };
        debug!(%url, path = %path.display(), "loaded original source");
        Ok(self.add_original(&url, contents))
    }

    /// Fill in every missing original that can be read from the local filesystem.
    pub fn load_missing_originals(&mut self) {
        let missing: Vec<(u32, String)> = self
            .sources
            .iter()
            .filter(|(index, _)| !self.sources_content.contains_key(index))
            .map(|(index, url)| (index, url.to_string()))
            .collect();

        for (index, url) in missing {
            match self.fetch_local(&url) {
                Some(contents) => {
                    self.sources_content.insert(index, contents);
                }
                None => warn!(%url, "original source is not available locally"),
            }
        }
    }

    fn fetch_local(&self, url: &str) -> Option<String> {
        let path = self.url_mapper.url_to_local_path(url)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Some(contents),
            Err(err) => {
                warn!(%url, path = %path.display(), %err, "could not read original source");
                None
            }
        }
    }
}
