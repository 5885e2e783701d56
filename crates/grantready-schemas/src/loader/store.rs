//! Document stores backing the schema loader
//!
//! A store is an opaque `name -> document` lookup. The loader never touches
//! the filesystem directly; it asks a store for the raw text of a document
//! and parses it itself.
//!
//! Copyright (c) 2026 GrantReady Team
//! Licensed under the Apache-2.0 license

use crate::loader::error::{LoaderError, LoaderResult};
use crate::loader::parser::{candidate_names, DocumentParser, Format};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

/// Raw document text as returned by a store
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    /// Concrete name the document was found under (with extension)
    pub name: String,
    /// Document text
    pub content: String,
    /// Format detected from the name
    pub format: Format,
    /// Last modification time, when the backend tracks one
    pub modified: Option<SystemTime>,
}

/// Key-value lookup of named documents
pub trait DocumentStore: fmt::Debug + Send + Sync {
    /// Read a document by identifier. Returns `Ok(None)` if nothing matches.
    fn read(&self, name: &str) -> LoaderResult<Option<StoredDocument>>;

    /// List the concrete document names held by this store, sorted
    fn list(&self) -> LoaderResult<Vec<String>>;

    /// Modification time of a document, if the backend tracks one
    fn modified(&self, _name: &str) -> LoaderResult<Option<SystemTime>> {
        Ok(None)
    }

    /// Short human-readable description used in logs
    fn describe(&self) -> String;
}

/// Reject identifiers that could escape the store root
pub(crate) fn check_name(name: &str) -> LoaderResult<()> {
    let path = Path::new(name);
    let escapes = path.is_absolute()
        || name.contains('\\')
        || path
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));

    if escapes || path.components().count() > 1 {
        Err(LoaderError::path_traversal(name))
    } else {
        Ok(())
    }
}

/// Store reading documents from a single directory (non-recursive)
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Create a store rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory this store reads from
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, name: &str) -> LoaderResult<Option<(String, PathBuf)>> {
        if name.is_empty() {
            return Ok(None);
        }
        check_name(name)?;

        Ok(candidate_names(name)
            .into_iter()
            .map(|candidate| {
                let path = self.root.join(&candidate);
                (candidate, path)
            })
            .find(|(_, path)| path.is_file()))
    }
}

impl DocumentStore for DirectoryStore {
    fn read(&self, name: &str) -> LoaderResult<Option<StoredDocument>> {
        let Some((concrete, path)) = self.resolve(name)? else {
            return Ok(None);
        };

        let bytes = std::fs::read(&path).map_err(|e| LoaderError::io_error(path.clone(), e))?;
        let content = String::from_utf8(bytes).map_err(|e| {
            LoaderError::io_error(
                path.clone(),
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })?;
        let modified = std::fs::metadata(&path).and_then(|m| m.modified()).ok();

        Ok(Some(StoredDocument {
            format: Format::from_name(&concrete)?,
            name: concrete,
            content,
            modified,
        }))
    }

    fn list(&self) -> LoaderResult<Vec<String>> {
        let entries = std::fs::read_dir(&self.root)
            .map_err(|e| LoaderError::io_error(self.root.clone(), e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| LoaderError::io_error(self.root.clone(), e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if Format::from_name(name).is_ok() {
                    names.push(name.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }

    fn modified(&self, name: &str) -> LoaderResult<Option<SystemTime>> {
        match self.resolve(name)? {
            Some((_, path)) => {
                let mtime = std::fs::metadata(&path)
                    .and_then(|m| m.modified())
                    .map_err(|e| LoaderError::io_error(path, e))?;
                Ok(Some(mtime))
            }
            None => Ok(None),
        }
    }

    fn describe(&self) -> String {
        format!("directory {}", self.root.display())
    }
}

/// In-memory store, used for bundled documents and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: BTreeMap<String, StoredDocument>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert document text. A name without extension is stored as JSON.
    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<String>) -> LoaderResult<()> {
        let name = name.into();
        check_name(&name)?;

        let (name, format) = match Format::from_name(&name) {
            Ok(format) => (name, format),
            Err(_) => (format!("{}.json", name), Format::Json),
        };

        self.documents.insert(
            name.clone(),
            StoredDocument {
                name,
                content: content.into(),
                format,
                modified: None,
            },
        );
        Ok(())
    }

    /// Insert a value, serialized in the format its name implies (JSON when
    /// the name has no extension)
    pub fn insert_value(&mut self, name: impl Into<String>, value: &Value) -> LoaderResult<()> {
        let name = name.into();
        let format = Format::from_name(&name).unwrap_or(Format::Json);
        let content = DocumentParser::new().serialize(value, format)?;
        self.insert(name, content)
    }

    /// Builder-style variant of [`MemoryStore::insert_value`]
    pub fn with_value(mut self, name: impl Into<String>, value: &Value) -> LoaderResult<Self> {
        self.insert_value(name, value)?;
        Ok(self)
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl DocumentStore for MemoryStore {
    fn read(&self, name: &str) -> LoaderResult<Option<StoredDocument>> {
        if name.is_empty() {
            return Ok(None);
        }
        check_name(name)?;

        Ok(candidate_names(name)
            .iter()
            .find_map(|candidate| self.documents.get(candidate))
            .cloned())
    }

    fn list(&self) -> LoaderResult<Vec<String>> {
        Ok(self.documents.keys().cloned().collect())
    }

    fn describe(&self) -> String {
        format!("memory ({} documents)", self.documents.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_check_name() {
        assert!(check_name("grant.json").is_ok());
        assert!(check_name("grant").is_ok());
        assert!(check_name("../grant.json").is_err());
        assert!(check_name("nested/grant.json").is_err());
        assert!(check_name("/etc/passwd").is_err());
        assert!(check_name("..").is_err());
    }

    #[test]
    fn test_directory_store_lookup() -> LoaderResult<()> {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("grant.json"), r#"{"type": "object"}"#).unwrap();
        fs::write(dir.path().join("audit.yaml"), "type: object\n").unwrap();
        fs::write(dir.path().join("README.md"), "not a schema").unwrap();

        let store = DirectoryStore::new(dir.path());

        let doc = store.read("grant")?.unwrap();
        assert_eq!(doc.name, "grant.json");
        assert_eq!(doc.format, Format::Json);
        assert!(doc.modified.is_some());

        let doc = store.read("audit")?.unwrap();
        assert_eq!(doc.format, Format::Yaml);

        assert!(store.read("grant.json")?.is_some());
        assert!(store.read("missing")?.is_none());
        assert!(store.read("../grant.json").is_err());

        assert_eq!(store.list()?, vec!["audit.yaml", "grant.json"]);
        Ok(())
    }

    #[test]
    fn test_directory_store_missing_root() {
        let store = DirectoryStore::new("/nonexistent/grantready/schemas");
        assert!(matches!(store.list(), Err(LoaderError::Io { .. })));
        assert!(store.read("grant").unwrap().is_none());
    }

    #[test]
    fn test_memory_store() -> LoaderResult<()> {
        let store = MemoryStore::new()
            .with_value("grant", &json!({"type": "object"}))?
            .with_value("grant-example.json", &json!({"grantId": "GRANT-1"}))?;

        assert_eq!(store.len(), 2);
        assert_eq!(store.list()?, vec!["grant-example.json", "grant.json"]);
        assert_eq!(store.read("grant")?.unwrap().name, "grant.json");
        assert!(store.read("grant-example")?.is_some());
        assert!(store.read("audit")?.is_none());
        Ok(())
    }

    #[test]
    fn test_memory_store_yaml_value() -> LoaderResult<()> {
        let mut store = MemoryStore::new();
        store.insert_value("amount.yaml", &json!({"type": "number"}))?;

        let doc = store.read("amount")?.unwrap();
        assert_eq!(doc.format, Format::Yaml);
        assert!(doc.content.contains("type: number"));
        Ok(())
    }
}
