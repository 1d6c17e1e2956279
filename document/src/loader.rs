//! Loading schema documents from disk.
//!
//! The format is chosen by file extension: `.json` is read with
//! `serde_json`, `.yaml`/`.yml` with `serde_yaml`.
//!
//! ```no_run
//! use argz_document::{DocumentSet, load_argument};
//!
//! // A single document, straight to a descriptor tree
//! let root = load_argument("schemas/deploy.yaml").unwrap();
//!
//! // Every document in a directory, keyed by file stem
//! let set = DocumentSet::from_dir("schemas/").unwrap();
//! for name in set.names() {
//!     println!("{name}");
//! }
//! ```

use std::collections::BTreeMap;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use argz_core::Argument;
use tracing::debug;

use crate::document::ArgumentDocument;
use crate::error::{DocumentError, Result};

/// Serialization format of a document file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// `.json`
    Json,
    /// `.yaml` or `.yml`
    Yaml,
}

impl DocumentFormat {
    /// Detects the format from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Some(Self::Json),
            Some("yaml" | "yml") => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Loads one document, choosing the format by extension.
///
/// # Errors
///
/// Returns [`DocumentError::UnsupportedFormat`] for unknown extensions,
/// [`DocumentError::IoError`] if the file cannot be read, and a JSON or YAML
/// error if parsing fails.
pub fn load_document(path: impl AsRef<Path>) -> Result<ArgumentDocument> {
    let path = path.as_ref();
    let format = DocumentFormat::from_path(path)
        .ok_or_else(|| DocumentError::UnsupportedFormat(path.to_path_buf()))?;

    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);
    let document: ArgumentDocument = match format {
        DocumentFormat::Json => serde_json::from_reader(reader)?,
        DocumentFormat::Yaml => serde_yaml::from_reader(reader)?,
    };
    debug!(path = %path.display(), format = ?format, "Loaded document");
    Ok(document)
}

/// Loads one document and builds its descriptor tree.
///
/// # Errors
///
/// Any error of [`load_document`] or
/// [`ArgumentDocument::into_argument`].
pub fn load_argument(path: impl AsRef<Path>) -> Result<Argument> {
    load_document(path)?.into_argument()
}

/// Documents loaded from a directory, keyed by file stem.
#[derive(Debug)]
pub struct DocumentSet {
    documents: BTreeMap<String, ArgumentDocument>,
    root: PathBuf,
}

impl DocumentSet {
    /// Loads every `.json`, `.yaml` and `.yml` file in `path`.
    ///
    /// Other files are skipped; subdirectories are not searched.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::IoError`] if the directory cannot be read, or
    /// the first loading error of any document.
    pub fn from_dir(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut documents = BTreeMap::new();

        for entry in std::fs::read_dir(path)? {
            let file_path = entry?.path();
            if !file_path.is_file() || DocumentFormat::from_path(&file_path).is_none() {
                debug!(path = %file_path.display(), "Skipping non-document entry");
                continue;
            }
            let Some(stem) = file_path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let document = load_document(&file_path)?;
            documents.insert(stem.to_string(), document);
        }

        Ok(Self {
            documents,
            root: path.to_path_buf(),
        })
    }

    /// The document stored under `name`.
    pub fn get(&self, name: &str) -> Option<&ArgumentDocument> {
        self.documents.get(name)
    }

    /// Returns `true` if a document named `name` was loaded.
    pub fn contains(&self, name: &str) -> bool {
        self.documents.contains_key(name)
    }

    /// Number of loaded documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns `true` if no documents were loaded.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Document names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    /// Directory the documents were loaded from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Consumes the set, yielding `(name, document)` pairs in sorted order.
    pub fn into_documents(self) -> impl Iterator<Item = (String, ArgumentDocument)> {
        self.documents.into_iter()
    }
}
