use std::path::{Path, PathBuf};

/// Table of `(local path prefix, URL prefix)` pairs.
///
/// Lookups in either direction pick the entry with the longest matching prefix.
#[derive(Debug, Clone, Default)]
pub struct UrlMapper {
    entries: Vec<(PathBuf, String)>,
}

impl UrlMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mapping(mut self, path: impl AsRef<Path>, url: impl Into<String>) -> Self {
        self.add_mapping(path, url);
        self
    }

    /// Register a prefix pair. The path is canonicalised when it exists.
    pub fn add_mapping(&mut self, path: impl AsRef<Path>, url: impl Into<String>) {
        let path = canonical(path.as_ref());
        let url = url.into();
        self.entries.retain(|(existing, _)| *existing != path);
        self.entries.push((path, url));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn url_to_local_path(&self, url: &str) -> Option<PathBuf> {
        let (path, prefix) = self
            .entries
            .iter()
            .filter(|(_, prefix)| url.starts_with(prefix.as_str()))
            .max_by_key(|(_, prefix)| prefix.len())?;

        let suffix = &url[prefix.len()..];
        Some(
            suffix
                .split('/')
                .filter(|part| !part.is_empty())
                .fold(path.clone(), |path, part| path.join(part)),
        )
    }

    pub fn local_path_to_url(&self, path: impl AsRef<Path>) -> Option<String> {
        let path = canonical(path.as_ref());
        let (suffix, url) = self
            .entries
            .iter()
            .filter_map(|(prefix, url)| {
                let suffix = path.strip_prefix(prefix).ok()?;
                Some((prefix.components().count(), suffix, url))
            })
            .max_by_key(|(depth, _, _)| *depth)
            .map(|(_, suffix, url)| (suffix, url))?;

        let parts: Vec<String> = suffix
            .components()
            .map(|part| part.as_os_str().to_string_lossy().into_owned())
            .collect();
        if parts.is_empty() {
            return Some(url.clone());
        }
        Some(format!("{}/{}", url.trim_end_matches('/'), parts.join("/")))
    }
}

fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
