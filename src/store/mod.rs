//! Content stores for the thesaurus corpus.
//!
//! The corpus is an externally maintained tree of JSON files:
//!
//! ```text
//! meta_info.json                                   manifest
//! _meta/<structure>.json                           structure catalogs
//! <category>/<entry>/<version>/<structure>.json    concept files
//! ```
//!
//! Lookup and validation code only talks to the [`ContentStore`] trait, so the
//! directory tree ([`FsStore`]) can be swapped for an in-memory fixture
//! ([`MemoryStore`]) without touching either.

mod fs;
mod memory;

use std::sync::Arc;

use thiserror::Error;

pub use fs::FsStore;
pub use memory::MemoryStore;

/// Name of the manifest file at the content root.
pub const MANIFEST_FILE: &str = "meta_info.json";
/// Directory holding the shared structure catalogs.
pub const META_DIR: &str = "_meta";

pub type SharedStore = Arc<dyn ContentStore>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingKind {
    File,
    Dir,
}

/// One child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub name: String,
    pub kind: ListingKind,
}

impl Listing {
    pub fn is_dir(&self) -> bool {
        self.kind == ListingKind::Dir
    }

    pub fn is_file(&self) -> bool {
        self.kind == ListingKind::File
    }
}

/// Read-only access to the corpus, addressed by `/`-separated paths relative
/// to the content root. The empty path is the root itself.
pub trait ContentStore: Send + Sync + std::fmt::Debug {
    /// Children of the directory at `rel`, sorted by name.
    fn list_dir(&self, rel: &str) -> Result<Vec<Listing>, StoreError>;

    fn read_file(&self, rel: &str) -> Result<String, StoreError>;

    /// Human-readable location of `rel`, used in validator messages.
    fn describe(&self, rel: &str) -> String;

    fn read_manifest(&self) -> Result<String, StoreError> {
        self.read_file(MANIFEST_FILE)
    }

    fn read_meta_structure(&self, structure_key: &str) -> Result<String, StoreError> {
        self.read_file(&join(&[META_DIR, &format!("{structure_key}.json")]))
    }

    /// Category directories present on disk (everything but `_meta`).
    fn categories_on_disk(&self) -> Result<Vec<String>, StoreError> {
        Ok(self
            .list_dir("")?
            .into_iter()
            .filter(|l| l.is_dir() && l.name != META_DIR)
            .map(|l| l.name)
            .collect())
    }

    /// The category directory that holds `entry_key`, if any.
    fn entry_category(&self, entry_key: &str) -> Result<Option<String>, StoreError> {
        for category in self.categories_on_disk()? {
            let found = self
                .list_dir(&category)?
                .iter()
                .any(|l| l.is_dir() && l.name == entry_key);
            if found {
                return Ok(Some(category));
            }
        }
        Ok(None)
    }

    /// Version directories of an entry. Missing entry directory yields an empty list.
    fn list_versions(&self, category: &str, entry_key: &str) -> Result<Vec<String>, StoreError> {
        match self.list_dir(&join(&[category, entry_key])) {
            Ok(listing) => Ok(listing
                .into_iter()
                .filter(Listing::is_dir)
                .map(|l| l.name)
                .collect()),
            Err(StoreError::NotFound(_)) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    fn read_structure_file(
        &self,
        category: &str,
        entry_key: &str,
        version: &str,
        structure_key: &str,
    ) -> Result<String, StoreError> {
        self.read_file(&structure_file_path(category, entry_key, version, structure_key))
    }
}

/// Join path segments with `/`, skipping empty ones.
pub fn join(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("/")
}

pub fn structure_file_path(
    category: &str,
    entry_key: &str,
    version: &str,
    structure_key: &str,
) -> String {
    join(&[category, entry_key, version, &format!("{structure_key}.json")])
}
