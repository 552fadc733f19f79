use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{SourceMapDocument, VERSION};
use crate::errors::{EnvelopeError, SourceMapError};
use crate::index_table::IndexTable;

/// Envelope as read from disk. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSourceMap {
    version: Option<serde_json::Value>,
    file: Option<String>,
    source_root: Option<String>,
    #[serde(default)]
    sources: Vec<Option<String>>,
    #[serde(default)]
    sources_content: Vec<Option<String>>,
    #[serde(default)]
    names: Vec<String>,
    mappings: Option<String>,
}

/// Envelope as written; field order is the serialized order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RawSourceMapOut<'a> {
    version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_root: Option<&'a str>,
    sources: Vec<&'a str>,
    names: &'a [String],
    mappings: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sources_content: Option<Vec<Option<&'a str>>>,
}

/// Drop a leading `)]}'` line, which exists only to break script inclusion of the map.
pub fn strip_xssi_prefix(json: &str) -> &str {
    if !json.starts_with(")]}'") {
        return json;
    }
    match json.find(['\r', '\n']) {
        Some(end) => {
            let rest = &json[end..];
            rest.strip_prefix("\r\n")
                .or_else(|| rest.strip_prefix('\n'))
                .or_else(|| rest.strip_prefix('\r'))
                .unwrap_or(rest)
        }
        None => "",
    }
}

/// Longest leading directory path shared by every source, ending in `/`.
///
/// Only factored out when there are at least two sources.
pub fn common_source_root(sources: &[String]) -> Option<String> {
    let (first, rest) = sources.split_first()?;
    if rest.is_empty() {
        return None;
    }

    let directories = |source: &str| -> Vec<String> {
        let mut parts: Vec<String> = source.split('/').map(str::to_string).collect();
        parts.pop();
        parts
    };

    let mut common = directories(first);
    for source in rest {
        let parts = directories(source);
        let shared = common
            .iter()
            .zip(&parts)
            .take_while(|(a, b)| a == b)
            .count();
        common.truncate(shared);
    }

    if common.is_empty() {
        None
    } else {
        Some(format!("{}/", common.join("/")))
    }
}

impl SourceMapDocument {
    /// Parse a source map, replacing this document's tables and mappings.
    pub fn set_sourcemap(&mut self, json: &str) -> Result<(), SourceMapError> {
        let raw: RawSourceMap =
            serde_json::from_str(strip_xssi_prefix(json)).map_err(EnvelopeError::from)?;

        match &raw.version {
            Some(version) if version.as_u64() == Some(u64::from(VERSION)) => {}
            Some(version) => {
                return Err(EnvelopeError::UnsupportedVersion {
                    found: version.to_string(),
                }
                .into());
            }
            None => {
                return Err(EnvelopeError::UnsupportedVersion {
                    found: "(missing)".to_string(),
                }
                .into());
            }
        }

        if raw.file.is_some() {
            self.file = raw.file;
        }

        let root = raw.source_root.unwrap_or_default();
        let sources: Vec<String> = raw
            .sources
            .into_iter()
            .map(|source| format!("{root}{}", source.unwrap_or_default()))
            .collect();
        self.source_root = None;
        self.sources = IndexTable::from_values(sources);
        self.names = IndexTable::from_values(raw.names);

        self.sources_content = raw
            .sources_content
            .into_iter()
            .enumerate()
            .filter_map(|(index, contents)| Some((index as u32, contents?)))
            .collect();
        if !self.sources_content.is_empty() {
            self.include_originals = true;
        }

        if self.sources.is_empty() {
            if let Some(file) = self.file.clone() {
                self.sources.to_index(&file);
            }
        }

        self.mappings.import(raw.mappings.as_deref().unwrap_or_default());
        self.map_loaded = true;

        debug!(
            sources = self.sources.count(),
            names = self.names.count(),
            lines = self.mappings.line_count(),
            "loaded source map"
        );
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, SourceMapError> {
        let mut document = Self::new();
        document.set_sourcemap(json)?;
        Ok(document)
    }

    /// Serialize the envelope.
    pub fn to_json(&self) -> Result<String, SourceMapError> {
        let sources = self.sources.values();
        let root = if sources.len() > 1 {
            self.source_root
                .clone()
                .filter(|root| sources.iter().all(|source| source.starts_with(root.as_str())))
                .or_else(|| common_source_root(sources))
        } else {
            None
        };

        let strip = root.as_deref().unwrap_or("");
        let sources_content = self.include_originals.then(|| {
            (0..sources.len() as u32)
                .map(|index| self.sources_content.get(&index).map(String::as_str))
                .collect()
        });

        let out = RawSourceMapOut {
            version: VERSION,
            file: self.file.as_deref(),
            source_root: root.as_deref(),
            sources: sources
                .iter()
                .map(|source| &source[strip.len()..])
                .collect(),
            names: self.names.values(),
            mappings: self.mappings.export(),
            sources_content,
        };
        Ok(serde_json::to_string(&out).map_err(EnvelopeError::from)?)
    }

    pub fn load_sourcemap(&mut self, path: impl AsRef<Path>) -> Result<(), SourceMapError> {
        let path = check_read_path(path.as_ref())?;
        let json = fs::read_to_string(&path).map_err(|e| EnvelopeError::io(&path, e))?;
        debug!(path = %path.display(), "reading source map");
        self.set_sourcemap(&json)
    }

    pub fn save_sourcemap(&mut self, path: impl AsRef<Path>) -> Result<(), SourceMapError> {
        let path = check_write_path(path.as_ref())?;
        if self.include_originals {
            self.load_missing_originals();
        }
        let json = self.to_json()?;
        fs::write(&path, json).map_err(|e| EnvelopeError::io(&path, e))?;
        debug!(path = %path.display(), "wrote source map");
        Ok(())
    }
}

pub(super) fn check_read_path(path: &Path) -> Result<PathBuf, EnvelopeError> {
    let path = fs::canonicalize(path).map_err(|e| EnvelopeError::io(path, e))?;
    if !path.is_file() {
        return Err(EnvelopeError::NotAFile { path });
    }
    Ok(path)
}

pub(super) fn check_write_path(path: &Path) -> Result<PathBuf, EnvelopeError> {
    if path.exists() {
        if !path.is_file() {
            return Err(EnvelopeError::NotAFile {
                path: path.to_path_buf(),
            });
        }
        return Ok(path.to_path_buf());
    }

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if !parent.is_dir() {
        return Err(EnvelopeError::MissingDirectory { path: parent });
    }
    Ok(path.to_path_buf())
}
