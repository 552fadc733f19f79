use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use super::SourceMapDocument;
use super::envelope::{check_read_path, check_write_path};
use crate::errors::{EnvelopeError, SourceMapError};

/// `//# sourceMappingURL=...` and the legacy `//@` form, with the line break that ends it.
static SOURCE_MAPPING_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^//[#@][ \t]*sourceMappingUrl[ \t]*=[ \t]*([^\r\n]*)(?:\r\n|\r|\n)?")
        .expect("sourceMappingURL pattern is valid")
});

/// Normalise a generated file body to end with exactly one line break.
fn normalise_body(text: &str) -> String {
    let mut body = text.trim_end_matches(['\r', '\n']).to_string();
    body.push('\n');
    body
}

/// The first `sourceMappingURL` value in `text`, if any.
pub fn find_source_mapping_url(text: &str) -> Option<String> {
    SOURCE_MAPPING_URL
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|url| url.as_str().trim().to_string())
}

/// `text` with every `sourceMappingURL` comment line removed.
pub fn strip_source_mapping_urls(text: &str) -> String {
    SOURCE_MAPPING_URL.replace_all(text, "").into_owned()
}

impl SourceMapDocument {
    /// Store the generated file body.
    ///
    /// With `autoload`, and no map loaded yet, a `sourceMappingURL` comment sets
    /// [`SourceMapDocument::source_mapping_url`] and loads the map when the URL maps to
    /// a local file.
    pub fn set_generated(&mut self, text: &str, autoload: bool) -> Result<(), SourceMapError> {
        let body = normalise_body(text);

        if autoload && !self.map_loaded {
            if let Some(url) = find_source_mapping_url(&body) {
                match self.url_mapper.url_to_local_path(&url) {
                    Some(path) => {
                        debug!(%url, path = %path.display(), "loading referenced source map");
                        self.load_sourcemap(&path)?;
                    }
                    None => warn!(%url, "referenced source map has no local path"),
                }
                self.source_mapping_url = Some(url);
            }
        }

        self.generated = Some(strip_source_mapping_urls(&body));
        Ok(())
    }

    /// The generated body, followed by a `sourceMappingURL` comment when requested and set.
    pub fn generated(&self, include_url: bool) -> String {
        let mut text = self.generated.clone().unwrap_or_default();
        if include_url {
            if let Some(url) = &self.source_mapping_url {
                text.push_str("//# sourceMappingURL=");
                text.push_str(url);
                text.push('\n');
            }
        }
        text
    }

    pub fn has_generated(&self) -> bool {
        self.generated.is_some()
    }

    /// Number of lines in the stored generated body.
    pub fn generated_line_count(&self) -> usize {
        self.generated
            .as_deref()
            .map_or(0, |body| body.matches('\n').count())
    }

    /// Read a generated file; `file` becomes its mapped URL.
    pub fn load_generated(&mut self, path: impl AsRef<Path>) -> Result<(), SourceMapError> {
        let path = check_read_path(path.as_ref())?;
        let text = fs::read_to_string(&path).map_err(|e| EnvelopeError::io(&path, e))?;
        self.file = self.url_mapper.local_path_to_url(&path);
        debug!(path = %path.display(), file = ?self.file, "reading generated file");
        self.set_generated(&text, true)
    }

    pub fn save_generated(
        &mut self,
        path: impl AsRef<Path>,
        include_url: bool,
    ) -> Result<(), SourceMapError> {
        let path = check_write_path(path.as_ref())?;
        self.file = self.url_mapper.local_path_to_url(&path);
        fs::write(&path, self.generated(include_url)).map_err(|e| EnvelopeError::io(&path, e))?;
        debug!(path = %path.display(), "wrote generated file");
        Ok(())
    }
}
