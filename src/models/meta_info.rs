use serde::{Deserialize, Serialize};

use super::{MetaStructure, Names, ThesaurusEntry};
use crate::error::{Result, ThesaurusError};
use crate::store::{SharedStore, MANIFEST_FILE};

/// On-disk shape of `meta_info.json`.
#[derive(Debug, Default, Deserialize)]
struct ManifestFile {
    #[serde(default)]
    categories: Names,
    #[serde(default, alias = "entries")]
    languages: Names,
    #[serde(default)]
    structures: Names,
    #[serde(default)]
    category_structures: serde_json::Map<String, serde_json::Value>,
}

/// The central registry of categories, entries and structures.
///
/// Parsed fresh from `meta_info.json` for every operation; never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct ThesaurusMetaInfo {
    pub categories: Names,
    pub entries: Names,
    /// Every structure known to any category.
    pub structures: Names,
    #[serde(serialize_with = "serialize_category_structures")]
    pub category_structures: Vec<(String, Names)>,
    #[serde(skip)]
    store: SharedStore,
}

fn serialize_category_structures<S: serde::Serializer>(
    value: &[(String, Names)],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_map(value.iter().map(|(category, names)| (category, names)))
}

impl ThesaurusMetaInfo {
    pub fn load(store: SharedStore) -> Result<Self> {
        let content = store.read_manifest()?;
        Self::from_json(store, &content).map_err(|source| ThesaurusError::Parse {
            path: MANIFEST_FILE.to_string(),
            source,
        })
    }

    pub fn from_json(store: SharedStore, content: &str) -> serde_json::Result<Self> {
        let file: ManifestFile = serde_json::from_str(content)?;

        let mut category_structures = Vec::with_capacity(file.category_structures.len());
        for (category, structures) in &file.category_structures {
            category_structures.push((category.clone(), Names::deserialize(structures)?));
        }

        let mut structures = file.structures;
        for (_, names) in &category_structures {
            for (key, name) in names.iter() {
                structures.insert(key, name);
            }
        }

        Ok(Self {
            categories: file.categories,
            entries: file.languages,
            structures,
            category_structures,
            store,
        })
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Structures declared for one category.
    pub fn structures_for_category(&self, category: &str) -> Option<&Names> {
        self.category_structures
            .iter()
            .find(|(c, _)| c == category)
            .map(|(_, names)| names)
    }

    pub fn entry_name(&self, key: &str) -> Result<&str> {
        self.entries
            .get(key)
            .ok_or_else(|| ThesaurusError::MissingEntry {
                key: key.to_string(),
            })
    }

    pub fn structure_name(&self, key: &str) -> Result<&str> {
        self.structures
            .get(key)
            .ok_or_else(|| ThesaurusError::UnknownStructure {
                key: key.to_string(),
            })
    }

    /// The entry bound to `key` and its display name. Concepts are not loaded.
    pub fn entry(&self, key: &str) -> Result<ThesaurusEntry> {
        let name = self.entry_name(key)?;
        Ok(ThesaurusEntry::new(self.store.clone(), key, name))
    }

    pub fn structure(&self, key: &str) -> Result<MetaStructure> {
        let name = self.structure_name(key)?;
        MetaStructure::load(self.store.as_ref(), key, name)
    }

    /// Resolve and load `(entry, version)` pairs for `structure`, in input order.
    ///
    /// A missing version defaults to the entry's first available version.
    /// Stops at the first unknown entry ([`ThesaurusError::MissingEntry`]) or
    /// absent concept file ([`ThesaurusError::MissingStructure`]).
    pub fn load_entries<K, V>(
        &self,
        pairs: &[(K, Option<V>)],
        structure: &MetaStructure,
    ) -> Result<Vec<ThesaurusEntry>>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut entries = Vec::with_capacity(pairs.len());

        for (key, version) in pairs {
            let key = key.as_ref();
            let mut entry = self.entry(key)?;

            let version = match version {
                Some(v) => Some(v.as_ref().to_string()),
                None => entry.versions()?.into_iter().next(),
            };

            let entry_name = entry.name.clone();
            let missing = |version: Option<String>| ThesaurusError::MissingStructure {
                structure: structure.key.clone(),
                structure_name: structure.name.clone(),
                entry_key: key.to_string(),
                entry_name,
                entry_version: version,
            };

            let Some(version) = version else {
                return Err(missing(None));
            };

            match entry.load_concepts(&structure.key, &version) {
                Ok(()) => {}
                Err(ThesaurusError::FileNotFound { path }) => {
                    tracing::debug!(%path, "structure file missing");
                    return Err(missing(Some(version)));
                }
                Err(e) => return Err(e),
            }
            entries.push(entry);
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::MemoryStore;

    const MANIFEST: &str = r#"{
        "categories": {"langs": "Programming Languages", "databases": "Databases"},
        "languages": {"python": "Python", "mysql": "MySQL"},
        "structures": {"data_types": "Data Types"},
        "category_structures": {
            "langs": {"data_types": "Data Types"},
            "databases": {"queries": "Queries"}
        }
    }"#;

    fn meta() -> ThesaurusMetaInfo {
        ThesaurusMetaInfo::from_json(Arc::new(MemoryStore::new()), MANIFEST).unwrap()
    }

    #[test]
    fn flattens_category_structures() {
        let meta = meta();
        assert!(meta.structures.contains("data_types"));
        assert!(meta.structures.contains("queries"));
        assert_eq!(meta.structures.len(), 2);
        assert!(meta
            .structures_for_category("databases")
            .unwrap()
            .contains("queries"));
        assert!(!meta
            .structures_for_category("databases")
            .unwrap()
            .contains("data_types"));
    }

    #[test]
    fn accepts_entries_alias() {
        let meta = ThesaurusMetaInfo::from_json(
            Arc::new(MemoryStore::new()),
            r#"{"entries": {"rust": "Rust"}}"#,
        )
        .unwrap();
        assert_eq!(meta.entry_name("rust").unwrap(), "Rust");
    }

    #[test]
    fn unknown_keys_are_typed_errors() {
        let meta = meta();
        assert!(matches!(
            meta.entry_name("cobol"),
            Err(ThesaurusError::MissingEntry { key }) if key == "cobol"
        ));
        assert!(matches!(
            meta.structure_name("boop"),
            Err(ThesaurusError::UnknownStructure { .. })
        ));
    }

    #[test]
    fn entry_is_not_loaded() {
        let entry = meta().entry("python").unwrap();
        assert_eq!(entry.name, "Python");
        assert!(!entry.is_loaded());
    }
}
