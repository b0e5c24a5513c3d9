use serde::{Deserialize, Serialize};

use super::Names;
use crate::error::{Result, ThesaurusError};
use crate::store::{ContentStore, StoreError, META_DIR};

/// A labelled group of concepts inside a structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub label: String,
    /// Concept id to concept display name, in catalog order.
    pub concepts: Names,
}

/// A structure catalog loaded from `_meta/<key>.json`.
///
/// Lists, per category, the concepts every entry of the structure is
/// expected to describe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetaStructure {
    pub key: String,
    pub name: String,
    pub categories: Vec<Category>,
}

#[derive(Debug, Deserialize)]
struct MetaStructureFile {
    #[serde(default)]
    categories: serde_json::Map<String, serde_json::Value>,
}

impl MetaStructure {
    pub fn load(store: &dyn ContentStore, key: &str, name: &str) -> Result<Self> {
        let path = format!("{META_DIR}/{key}.json");
        let content = store.read_meta_structure(key).map_err(|e| match e {
            StoreError::NotFound(_) => ThesaurusError::UnknownStructure {
                key: key.to_string(),
            },
            other => other.into(),
        })?;
        Self::from_json(key, name, &content).map_err(|source| ThesaurusError::Parse { path, source })
    }

    pub fn from_json(key: &str, name: &str, content: &str) -> serde_json::Result<Self> {
        let file: MetaStructureFile = serde_json::from_str(content)?;

        let mut categories = Vec::with_capacity(file.categories.len());
        for (label, concepts) in &file.categories {
            let concepts = Names::deserialize(concepts)?;
            categories.push(Category {
                label: label.clone(),
                concepts,
            });
        }

        let structure = Self {
            key: key.to_string(),
            name: name.to_string(),
            categories,
        };
        if let Some(id) = structure.duplicate_concept_ids().first() {
            tracing::warn!(structure = key, concept = %id, "concept id listed in more than one category");
        }
        Ok(structure)
    }

    /// Every concept id of the structure, in catalog order.
    pub fn concept_keys(&self) -> Vec<&str> {
        self.categories
            .iter()
            .flat_map(|c| c.concepts.keys())
            .collect()
    }

    pub fn concept_name(&self, id: &str) -> Option<&str> {
        self.categories.iter().find_map(|c| c.concepts.get(id))
    }

    /// Concept ids that appear in more than one category.
    pub fn duplicate_concept_ids(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut duplicates = Vec::new();
        for id in self.concept_keys() {
            if !seen.insert(id) && !duplicates.iter().any(|d| d == id) {
                duplicates.push(id.to_string());
            }
        }
        duplicates
    }
}
