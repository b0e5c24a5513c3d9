//! Skeleton files offered to contributors when content is missing.

use serde_json::{json, Map, Value};

use crate::error::{Result, ThesaurusError};
use crate::models::ThesaurusMetaInfo;

/// Display name used when the entry is not in the manifest yet.
pub const PLACEHOLDER_ENTRY_NAME: &str = "Human-Readable Name";

/// Generate a concept file for `entry_key` covering every concept of
/// `structure_key`, with empty code lines to fill in.
pub fn generate_entry_template(
    meta: &ThesaurusMetaInfo,
    entry_key: &str,
    structure_key: &str,
    version: Option<&str>,
) -> Result<String> {
    if !meta.structures.contains(structure_key) {
        return Err(ThesaurusError::UnknownStructure {
            key: structure_key.to_string(),
        });
    }
    let entry_name = meta.entries.get(entry_key).unwrap_or(PLACEHOLDER_ENTRY_NAME);

    let mut file_meta = Map::new();
    file_meta.insert("language".into(), entry_key.into());
    file_meta.insert("language_name".into(), entry_name.into());
    file_meta.insert("structure".into(), structure_key.into());
    if let Some(version) = version.filter(|v| !v.is_empty()) {
        file_meta.insert("language_version".into(), version.into());
    }

    let structure = meta.structure(structure_key)?;
    let concepts: Map<String, Value> = structure
        .categories
        .iter()
        .flat_map(|category| category.concepts.iter())
        .map(|(id, name)| (id.to_string(), json!({"name": name, "code": [""]})))
        .collect();

    serde_json::to_string_pretty(&json!({"meta": file_meta, "concepts": concepts}))
        .map_err(ThesaurusError::Serialize)
}

/// Generate a `_meta/<structure_key>.json` skeleton with example categories.
pub fn generate_meta_template(structure_key: &str, structure_name: &str) -> Result<String> {
    let template = json!({
        "meta": {
            "structure": structure_key,
            "structure_name": structure_name,
        },
        "categories": {
            "First Category Name": {
                "concept_id1": "Name of Concept 1",
                "concept_id2": "Name of Concept 2",
            },
            "Second Category Name": {
                "concept_id3": "Name of Concept 3",
                "concept_id4": "Name of Concept 4",
            },
        },
    });
    serde_json::to_string(&template).map_err(ThesaurusError::Serialize)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::MemoryStore;

    fn meta() -> ThesaurusMetaInfo {
        let store = MemoryStore::new()
            .with_file(
                "meta_info.json",
                r#"{"languages": {"python": "Python"}, "structures": {"data_types": "Data Types"}}"#,
            )
            .with_file(
                "_meta/data_types.json",
                r#"{"categories": {"Boolean": {"boolean": "Boolean"}, "Numbers": {"integer": "Integer"}}}"#,
            );
        ThesaurusMetaInfo::load(Arc::new(store)).unwrap()
    }

    #[test]
    fn entry_template_lists_every_concept() {
        let template = generate_entry_template(&meta(), "python", "data_types", Some("3")).unwrap();
        let value: Value = serde_json::from_str(&template).unwrap();

        assert_eq!(value["meta"]["language"], "python");
        assert_eq!(value["meta"]["language_name"], "Python");
        assert_eq!(value["meta"]["language_version"], "3");
        assert_eq!(value["concepts"]["boolean"]["name"], "Boolean");
        assert_eq!(value["concepts"]["integer"]["code"], json!([""]));
    }

    #[test]
    fn entry_template_for_unlisted_entry_uses_placeholder() {
        let template = generate_entry_template(&meta(), "zig", "data_types", None).unwrap();
        let value: Value = serde_json::from_str(&template).unwrap();

        assert_eq!(value["meta"]["language_name"], PLACEHOLDER_ENTRY_NAME);
        assert!(value["meta"].get("language_version").is_none());
    }

    #[test]
    fn empty_version_is_left_out() {
        let template = generate_entry_template(&meta(), "python", "data_types", Some("")).unwrap();
        let value: Value = serde_json::from_str(&template).unwrap();

        assert!(value["meta"].get("language_version").is_none());
    }

    #[test]
    fn entry_template_rejects_unknown_structure() {
        assert!(matches!(
            generate_entry_template(&meta(), "python", "boop", None),
            Err(ThesaurusError::UnknownStructure { .. })
        ));
    }

    #[test]
    fn meta_template_has_two_categories() {
        let value: Value =
            serde_json::from_str(&generate_meta_template("loops", "Loops").unwrap()).unwrap();
        assert_eq!(value["meta"]["structure"], "loops");
        assert_eq!(value["categories"].as_object().unwrap().len(), 2);
    }

    #[test]
    fn meta_template_is_compact() {
        let template = generate_meta_template("loops", "Loops").unwrap();
        assert!(!template.contains('\n'));
        assert!(template.starts_with(r#"{"meta":{"structure":"loops""#));
    }
}
