use serde_json::{json, Value};

use super::{Concept, ConceptMap};
use crate::error::{Result, ThesaurusError};
use crate::store::{join, structure_file_path, SharedStore};

/// Whether an entry's concept file has been read yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ConceptState {
    #[default]
    Unloaded,
    Loaded(ConceptMap),
}

/// One entry (a language, database, ...) of the thesaurus, optionally with
/// the concepts of one structure/version loaded.
///
/// Construction does no I/O; [`ThesaurusEntry::load_concepts`] reads
/// `<category>/<key>/<version>/<structure>.json` on demand.
#[derive(Debug, Clone)]
pub struct ThesaurusEntry {
    pub key: String,
    pub name: String,
    pub version: Option<String>,
    pub structure: Option<String>,
    concepts: ConceptState,
    store: SharedStore,
}

impl ThesaurusEntry {
    pub fn new(store: SharedStore, key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            version: None,
            structure: None,
            concepts: ConceptState::Unloaded,
            store,
        }
    }

    /// An entry whose concepts are already known, bypassing the store.
    pub fn with_concepts(
        store: SharedStore,
        key: impl Into<String>,
        name: impl Into<String>,
        concepts: ConceptMap,
    ) -> Self {
        Self {
            concepts: ConceptState::Loaded(concepts),
            ..Self::new(store, key, name)
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.concepts, ConceptState::Loaded(_))
    }

    pub fn concepts(&self) -> Option<&ConceptMap> {
        match &self.concepts {
            ConceptState::Loaded(map) => Some(map),
            ConceptState::Unloaded => None,
        }
    }

    /// `<category>/<key>`, if the entry has a directory in any category.
    pub fn entry_dir(&self) -> Result<Option<String>> {
        Ok(self
            .store
            .entry_category(&self.key)?
            .map(|category| join(&[&category, &self.key])))
    }

    /// Version directories available for this entry, sorted by name.
    pub fn versions(&self) -> Result<Vec<String>> {
        match self.store.entry_category(&self.key)? {
            Some(category) => Ok(self.store.list_versions(&category, &self.key)?),
            None => Ok(Vec::new()),
        }
    }

    /// Read the concept file for `structure_key` at `version`.
    ///
    /// Fails with [`ThesaurusError::FileNotFound`] when the entry, version
    /// directory or structure file does not exist.
    pub fn load_concepts(&mut self, structure_key: &str, version: &str) -> Result<()> {
        let Some(category) = self.store.entry_category(&self.key)? else {
            return Err(ThesaurusError::FileNotFound {
                path: structure_file_path("", &self.key, version, structure_key),
            });
        };

        let path = structure_file_path(&category, &self.key, version, structure_key);
        let content = self
            .store
            .read_structure_file(&category, &self.key, version, structure_key)?;
        let data: Value = serde_json::from_str(&content)
            .map_err(|source| ThesaurusError::Parse { path, source })?;

        let concepts = data
            .get("concepts")
            .and_then(Value::as_object)
            .map(ConceptMap::from_json)
            .unwrap_or_default();

        tracing::debug!(
            entry = %self.key,
            version,
            structure = structure_key,
            concepts = concepts.len(),
            "loaded concepts"
        );

        self.version = Some(version.to_string());
        self.structure = Some(structure_key.to_string());
        self.concepts = ConceptState::Loaded(concepts);
        Ok(())
    }

    fn record(&self, id: &str) -> Option<&Concept> {
        self.concepts().and_then(|map| map.get(id))
    }

    /// The record for `id`, or [`Concept::unknown`] if the entry lacks it.
    pub fn concept(&self, id: &str) -> Concept {
        self.record(id).cloned().unwrap_or_else(Concept::unknown)
    }

    pub fn concept_unknown(&self, id: &str) -> bool {
        self.record(id).is_none()
    }

    /// False only for records carrying a truthy `not-implemented` marker.
    ///
    /// Ids absent from the entry report `true`; check
    /// [`ThesaurusEntry::concept_unknown`] first.
    pub fn concept_implemented(&self, id: &str) -> bool {
        self.record(id).map_or(true, Concept::is_implemented)
    }

    pub fn concept_code(&self, id: &str) -> String {
        self.record(id).map(Concept::code).unwrap_or_default()
    }

    pub fn concept_comment(&self, id: &str) -> &str {
        self.record(id).map_or("", Concept::comment)
    }

    /// True if at least one of `concept_keys` exists and is implemented.
    pub fn has_any_implemented_in_category<S: AsRef<str>>(&self, concept_keys: &[S]) -> bool {
        concept_keys
            .iter()
            .map(|k| k.as_ref())
            .any(|id| !self.concept_unknown(id) && self.concept_implemented(id))
    }

    /// True if any of `concept_keys` has neither code nor a comment.
    pub fn is_category_incomplete<S: AsRef<str>>(&self, concept_keys: &[S]) -> bool {
        concept_keys
            .iter()
            .map(|k| k.as_ref())
            .any(|id| self.record(id).map_or(true, Concept::is_blank))
    }

    /// Load `structure_key` at `version` and serialize it for the reference API.
    pub fn load_filled_concepts(&mut self, structure_key: &str, version: &str) -> Result<String> {
        self.load_concepts(structure_key, version)?;

        let payload = json!({
            "meta": {
                "language": self.key,
                "language_name": self.name,
                "language_version": version,
                "structure": structure_key,
            },
            "concepts": self.concepts(),
        });
        serde_json::to_string(&payload).map_err(ThesaurusError::Serialize)
    }

    /// Load this entry and `other_key` for the same structure and serialize
    /// both sides for the comparison API.
    ///
    /// `other_version` defaults to the other entry's first available version.
    pub fn load_comparison(
        &mut self,
        structure_key: &str,
        other_key: &str,
        other_version: Option<&str>,
        version: &str,
    ) -> Result<String> {
        self.load_concepts(structure_key, version)?;

        let mut other = ThesaurusEntry::new(self.store.clone(), other_key, "");
        let other_version = match other_version {
            Some(v) => v.to_string(),
            None => other
                .versions()?
                .into_iter()
                .next()
                .ok_or_else(|| ThesaurusError::FileNotFound {
                    path: join(&[other_key, &format!("{structure_key}.json")]),
                })?,
        };
        other.load_concepts(structure_key, &other_version)?;

        let payload = json!({
            "meta": {
                "entry_1": self.key,
                "entry_1_version": version,
                "entry_2": other.key,
                "entry_2_version": other_version,
                "structure": structure_key,
            },
            "concepts1": self.concepts(),
            "concepts2": other.concepts(),
        });
        serde_json::to_string(&payload).map_err(ThesaurusError::Serialize)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::store::MemoryStore;

    fn dummy() -> ThesaurusEntry {
        let concepts = json!({
            "concept1": {"code": "abc"},
            "concept2": {"code": "abc", "comment": "My comment"},
            "concept3": {"not-implemented": "true"},
            "concept4": {"code": ["line1", "line2"]}
        });
        ThesaurusEntry::with_concepts(
            Arc::new(MemoryStore::new()),
            "abcdefg",
            "Alphabet language!",
            ConceptMap::from_json(concepts.as_object().unwrap()),
        )
    }

    #[test]
    fn new_entry_is_unloaded() {
        let entry = ThesaurusEntry::new(Arc::new(MemoryStore::new()), "python", "Python");
        assert!(!entry.is_loaded());
        assert!(entry.concepts().is_none());
        assert!(entry.concept_unknown("boolean"));
    }

    #[test]
    fn unknown_concept_is_canonical_empty_record() {
        assert_eq!(dummy().concept("12345"), Concept::unknown());
    }

    #[test]
    fn unknown_concept_reports_implemented() {
        let entry = dummy();
        assert!(entry.concept_unknown("12345"));
        assert!(entry.concept_implemented("12345"));
    }

    #[test]
    fn code_and_comment_accessors() {
        let entry = dummy();
        assert_eq!(entry.concept_code("concept1"), "abc");
        assert_eq!(entry.concept_code("concept3"), "");
        assert_eq!(entry.concept_code("concept4"), "line1\nline2");
        assert_eq!(entry.concept_code("12345"), "");
        assert_eq!(entry.concept_comment("concept2"), "My comment");
        assert_eq!(entry.concept_comment("concept1"), "");
        assert!(!entry.concept_implemented("concept3"));
    }

    #[test]
    fn category_predicates() {
        let entry = dummy();
        assert!(entry.has_any_implemented_in_category(&["concept1", "concept3"]));
        assert!(!entry.has_any_implemented_in_category(&["concept3", "missing"]));
        assert!(!entry.is_category_incomplete(&["concept1", "concept2", "concept4"]));
        assert!(entry.is_category_incomplete(&["concept1", "concept3"]));
        assert!(entry.is_category_incomplete(&["concept1", "missing"]));
    }

    #[test]
    fn loading_without_directory_is_file_not_found() {
        let mut entry = dummy();
        let err = entry.load_concepts("notastructure", "notaversion").unwrap_err();
        assert!(matches!(err, ThesaurusError::FileNotFound { .. }));
    }
}
