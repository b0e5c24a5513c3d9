use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{ContentStore, Listing, ListingKind, StoreError};

/// A content store backed by a directory tree on the local file system.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, rel: &str) -> PathBuf {
        rel.split('/')
            .filter(|s| !s.is_empty())
            .fold(self.root.clone(), |path, segment| path.join(segment))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    if source.kind() == ErrorKind::NotFound {
        StoreError::NotFound(path.display().to_string())
    } else {
        StoreError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

impl ContentStore for FsStore {
    fn list_dir(&self, rel: &str) -> Result<Vec<Listing>, StoreError> {
        let path = self.resolve(rel);
        if !path.is_dir() {
            return Err(StoreError::NotFound(path.display().to_string()));
        }

        let mut listing = Vec::new();
        for entry in fs::read_dir(&path).map_err(|e| io_error(&path, e))? {
            let entry = entry.map_err(|e| io_error(&path, e))?;
            let kind = if entry.path().is_dir() {
                ListingKind::Dir
            } else {
                ListingKind::File
            };
            listing.push(Listing {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind,
            });
        }
        listing.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listing)
    }

    fn read_file(&self, rel: &str) -> Result<String, StoreError> {
        let path = self.resolve(rel);
        if !path.is_file() {
            return Err(StoreError::NotFound(path.display().to_string()));
        }
        tracing::trace!(path = %path.display(), "reading content file");
        fs::read_to_string(&path).map_err(|e| io_error(&path, e))
    }

    fn describe(&self, rel: &str) -> String {
        self.resolve(rel).display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_directories_sorted_and_typed() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("langs/python/3")).unwrap();
        fs::create_dir_all(dir.path().join("_meta")).unwrap();
        fs::write(dir.path().join("meta_info.json"), "{}").unwrap();

        let store = FsStore::new(dir.path());
        let names: Vec<_> = store
            .list_dir("")
            .unwrap()
            .into_iter()
            .map(|l| (l.name, l.kind))
            .collect();

        assert_eq!(
            names,
            vec![
                ("_meta".to_string(), ListingKind::Dir),
                ("langs".to_string(), ListingKind::Dir),
                ("meta_info.json".to_string(), ListingKind::File),
            ]
        );
    }

    #[test]
    fn missing_paths_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());

        assert!(matches!(store.list_dir("nope"), Err(StoreError::NotFound(_))));
        assert!(matches!(
            store.read_file("nope.json"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn versions_of_missing_entry_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        assert!(store.list_versions("langs", "python").unwrap().is_empty());
    }
}
