use std::collections::{BTreeMap, BTreeSet};

use super::{ContentStore, Listing, ListingKind, StoreError};

/// In-memory content store for tests and fixtures.
///
/// Directories are implied by file paths; empty directories must be added
/// explicitly with [`MemoryStore::with_dir`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    files: BTreeMap<String, String>,
    dirs: BTreeSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, rel: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(rel, content);
        self
    }

    pub fn with_dir(mut self, rel: impl Into<String>) -> Self {
        self.dirs.insert(normalize(&rel.into()));
        self
    }

    pub fn insert(&mut self, rel: impl Into<String>, content: impl Into<String>) {
        self.files.insert(normalize(&rel.into()), content.into());
    }

    pub fn remove(&mut self, rel: &str) -> Option<String> {
        self.files.remove(&normalize(rel))
    }

    fn is_dir(&self, rel: &str) -> bool {
        if rel.is_empty() || self.dirs.contains(rel) {
            return true;
        }
        let prefix = format!("{rel}/");
        self.files.keys().any(|k| k.starts_with(&prefix))
            || self.dirs.iter().any(|d| d.starts_with(&prefix))
    }
}

fn normalize(rel: &str) -> String {
    rel.split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

fn child_of<'a>(path: &'a str, prefix: &str) -> Option<(&'a str, bool)> {
    let rest = path.strip_prefix(prefix)?;
    match rest.split_once('/') {
        Some((name, _)) => Some((name, true)),
        None => Some((rest, false)),
    }
}

impl ContentStore for MemoryStore {
    fn list_dir(&self, rel: &str) -> Result<Vec<Listing>, StoreError> {
        let rel = normalize(rel);
        if !self.is_dir(&rel) {
            return Err(StoreError::NotFound(rel));
        }

        let prefix = if rel.is_empty() {
            String::new()
        } else {
            format!("{rel}/")
        };

        let mut children: BTreeMap<String, ListingKind> = BTreeMap::new();
        let file_children = self
            .files
            .keys()
            .filter_map(|k| child_of(k, &prefix))
            .map(|(name, nested)| (name, if nested { ListingKind::Dir } else { ListingKind::File }));
        let dir_children = self
            .dirs
            .iter()
            .filter_map(|d| child_of(d, &prefix))
            .map(|(name, _)| (name, ListingKind::Dir));

        for (name, kind) in file_children.chain(dir_children) {
            if name.is_empty() {
                continue;
            }
            children
                .entry(name.to_string())
                .and_modify(|existing| {
                    if kind == ListingKind::Dir {
                        *existing = ListingKind::Dir;
                    }
                })
                .or_insert(kind);
        }

        Ok(children
            .into_iter()
            .map(|(name, kind)| Listing { name, kind })
            .collect())
    }

    fn read_file(&self, rel: &str) -> Result<String, StoreError> {
        let rel = normalize(rel);
        self.files
            .get(&rel)
            .cloned()
            .ok_or(StoreError::NotFound(rel))
    }

    fn describe(&self, rel: &str) -> String {
        normalize(rel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with_file("meta_info.json", "{}")
            .with_file("_meta/data_types.json", "{}")
            .with_file("langs/python/3/data_types.json", "{}")
            .with_file("langs/python/2/data_types.json", "{}")
            .with_dir("databases/mysql")
    }

    #[test]
    fn root_listing_mixes_files_and_dirs() {
        let listing = store().list_dir("").unwrap();
        let names: Vec<_> = listing.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["_meta", "databases", "langs", "meta_info.json"]);
        assert!(listing[3].is_file());
        assert!(listing[2].is_dir());
    }

    #[test]
    fn explicit_empty_dirs_are_listed() {
        let listing = store().list_dir("databases").unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].name, "mysql");
        assert!(listing[0].is_dir());
        assert!(store().list_dir("databases/mysql").unwrap().is_empty());
    }

    #[test]
    fn provided_methods_walk_the_tree() {
        let store = store();
        assert_eq!(store.categories_on_disk().unwrap(), vec!["databases", "langs"]);
        assert_eq!(
            store.entry_category("python").unwrap(),
            Some("langs".to_string())
        );
        assert_eq!(store.entry_category("cobol").unwrap(), None);
        assert_eq!(store.list_versions("langs", "python").unwrap(), vec!["2", "3"]);
        assert!(store
            .read_structure_file("langs", "python", "3", "data_types")
            .is_ok());
    }

    #[test]
    fn missing_file_is_not_found() {
        assert!(matches!(
            store().read_file("langs/python/3/queries.json"),
            Err(StoreError::NotFound(_))
        ));
    }
}
