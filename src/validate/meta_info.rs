use std::collections::BTreeSet;

use super::ValidationReport;
use crate::models::{MetaStructure, ThesaurusMetaInfo};
use crate::store::{join, ContentStore, SharedStore, StoreError, MANIFEST_FILE, META_DIR};

/// Cross-check `meta_info.json` against the directory layout and `_meta`.
pub fn validate_meta_info(store: &SharedStore) -> Result<ValidationReport, StoreError> {
    let mut report = ValidationReport::new();

    let content = match store.read_manifest() {
        Ok(content) => content,
        Err(StoreError::NotFound(_)) => {
            report.error(format!(
                "`{}` was not found",
                store.describe(MANIFEST_FILE)
            ));
            return Ok(report);
        }
        Err(e) => {
            report.error(format!("Failed to parse `{MANIFEST_FILE}`: {e}"));
            return Ok(report);
        }
    };
    let meta = match ThesaurusMetaInfo::from_json(store.clone(), &content) {
        Ok(meta) => meta,
        Err(e) => {
            report.error(format!("Failed to parse `{MANIFEST_FILE}`: {e}"));
            return Ok(report);
        }
    };

    let store = store.as_ref();
    let meta_files = meta_file_names(store)?;

    check_category_directories(store, &meta, &mut report)?;
    check_entry_directories(store, &meta, &meta_files, &mut report)?;
    check_listed_entries(store, &meta, &mut report)?;
    check_structure_files(store, &meta, &meta_files, &mut report)?;

    tracing::info!(errors = report.error_count(), "validated manifest");
    Ok(report)
}

fn meta_file_names(store: &dyn ContentStore) -> Result<BTreeSet<String>, StoreError> {
    match store.list_dir(META_DIR) {
        Ok(listing) => Ok(listing
            .into_iter()
            .filter(|l| l.is_file())
            .map(|l| l.name)
            .collect()),
        Err(StoreError::NotFound(_)) => Ok(BTreeSet::new()),
        Err(e) => Err(e),
    }
}

fn is_dir(store: &dyn ContentStore, rel: &str) -> Result<bool, StoreError> {
    match store.list_dir(rel) {
        Ok(_) => Ok(true),
        Err(StoreError::NotFound(_)) => Ok(false),
        Err(e) => Err(e),
    }
}

fn check_category_directories(
    store: &dyn ContentStore,
    meta: &ThesaurusMetaInfo,
    report: &mut ValidationReport,
) -> Result<(), StoreError> {
    for category in store.categories_on_disk()? {
        if !meta.categories.contains(&category) {
            report.error(format!(
                "Directory `{}` exists but `{category}` is not listed as a category in `meta_info.json`",
                store.describe(&category)
            ));
        }
    }

    for category in meta.categories.keys() {
        if !is_dir(store, category)? {
            report.error(format!(
                "Category `{category}` is listed in `meta_info.json` but directory `{}` was not found",
                store.describe(category)
            ));
        }
    }
    Ok(())
}

fn check_entry_directories(
    store: &dyn ContentStore,
    meta: &ThesaurusMetaInfo,
    meta_files: &BTreeSet<String>,
    report: &mut ValidationReport,
) -> Result<(), StoreError> {
    for category in store.categories_on_disk()? {
        for entry in store.list_dir(&category)?.into_iter().filter(|l| l.is_dir()) {
            let entry_dir = join(&[&category, &entry.name]);
            if !meta.entries.contains(&entry.name) {
                report.error(format!(
                    "`{}` exists but {} is not listed as a language in `meta_info.json`",
                    store.describe(&entry_dir),
                    entry.name
                ));
            }

            for version in store.list_dir(&entry_dir)? {
                let version_dir = join(&[&entry_dir, &version.name]);
                if version.is_file() {
                    report.error(format!(
                        "`{}` is a file but a directory for a version was expected",
                        store.describe(&version_dir)
                    ));
                    continue;
                }

                for file in store.list_dir(&version_dir)? {
                    if !meta_files.contains(&file.name) {
                        report.error(format!(
                            "`{}` is not a valid concept filename",
                            store.describe(&join(&[&version_dir, &file.name]))
                        ));
                    }
                }
            }
        }
    }
    Ok(())
}

fn check_listed_entries(
    store: &dyn ContentStore,
    meta: &ThesaurusMetaInfo,
    report: &mut ValidationReport,
) -> Result<(), StoreError> {
    for (key, name) in meta.entries.iter() {
        if store.entry_category(key)?.is_none() {
            report.error(format!(
                "{name} is listed as a language in `meta_info.json` but no directory for it was found in any category"
            ));
        }
    }
    Ok(())
}

fn check_structure_files(
    store: &dyn ContentStore,
    meta: &ThesaurusMetaInfo,
    meta_files: &BTreeSet<String>,
    report: &mut ValidationReport,
) -> Result<(), StoreError> {
    for file in meta_files {
        let Some(key) = file.strip_suffix(".json") else {
            continue;
        };
        if !meta.structures.contains(key) {
            report.error(format!(
                "`{}` is not listed as a structure in `meta_info.json`",
                store.describe(&join(&[META_DIR, file]))
            ));
        }
    }

    for (key, name) in meta.structures.iter() {
        let file = format!("{key}.json");
        let rel = join(&[META_DIR, &file]);
        if !meta_files.contains(&file) {
            report.error(format!(
                "{key} is listed as a structure in `meta_info.json` but the `{}` file doesn't exist",
                store.describe(&rel)
            ));
            continue;
        }

        let content = match store.read_file(&rel) {
            Ok(content) => content,
            Err(e) => {
                report.error(format!("Failed to parse `{}`: {e}", store.describe(&rel)));
                continue;
            }
        };
        match MetaStructure::from_json(key, name, &content) {
            Ok(structure) => {
                for id in structure.duplicate_concept_ids() {
                    report.error(format!(
                        "`{}` lists concept `{id}` in more than one category",
                        store.describe(&rel)
                    ));
                }
            }
            Err(e) => report.error(format!("Failed to parse `{}`: {e}", store.describe(&rel))),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::MemoryStore;

    fn corpus() -> MemoryStore {
        MemoryStore::new()
            .with_file(
                "meta_info.json",
                r#"{
                    "categories": {"langs": "Programming Languages"},
                    "languages": {"python": "Python"},
                    "structures": {"data_types": "Data Types"}
                }"#,
            )
            .with_file(
                "_meta/data_types.json",
                r#"{"categories": {"Boolean": {"boolean": "Boolean"}}}"#,
            )
            .with_file("langs/python/3/data_types.json", "{}")
    }

    fn validate(store: MemoryStore) -> ValidationReport {
        let store: SharedStore = Arc::new(store);
        validate_meta_info(&store).unwrap()
    }

    #[test]
    fn consistent_corpus_is_clean() {
        assert!(validate(corpus()).is_clean());
    }

    #[test]
    fn unlisted_category_directory() {
        let report = validate(corpus().with_dir("snippets"));
        assert_eq!(report.error_count(), 1);
        assert!(report.findings[0].message.contains("`snippets` is not listed as a category"));
    }

    #[test]
    fn listed_entry_without_directory() {
        let mut store = corpus();
        store.insert(
            "meta_info.json",
            r#"{
                "categories": {"langs": "Programming Languages"},
                "languages": {"python": "Python", "rust": "Rust"},
                "structures": {"data_types": "Data Types"}
            }"#,
        );
        let report = validate(store);
        assert_eq!(report.error_count(), 1);
        assert!(report.findings[0].message.starts_with("Rust is listed as a language"));
    }

    #[test]
    fn version_file_and_bad_concept_filename() {
        let report = validate(
            corpus()
                .with_file("langs/python/README.md", "")
                .with_file("langs/python/3/loops.json", "{}"),
        );
        assert_eq!(report.error_count(), 2);
    }

    #[test]
    fn undeclared_and_missing_structure_files() {
        let mut store = corpus().with_file("_meta/loops.json", r#"{"categories": {}}"#);
        store.remove("_meta/data_types.json");
        let report = validate(store);
        let messages: Vec<_> = report.errors().map(|f| f.message.as_str()).collect();

        assert!(messages
            .iter()
            .any(|m| m.contains("_meta/loops.json` is not listed as a structure")));
        assert!(messages
            .iter()
            .any(|m| m.starts_with("data_types is listed as a structure")));
    }

    #[test]
    fn duplicate_concept_ids_are_errors() {
        let mut store = corpus();
        store.insert(
            "_meta/data_types.json",
            r#"{"categories": {"A": {"boolean": "Boolean"}, "B": {"boolean": "Bool"}}}"#,
        );
        let report = validate(store);
        assert_eq!(report.error_count(), 1);
        assert!(report.findings[0].message.contains("`boolean`"));
    }

    #[test]
    fn broken_manifest_stops_early() {
        let mut store = corpus();
        store.insert("meta_info.json", "{not json");
        let report = validate(store);
        assert_eq!(report.error_count(), 1);
        assert!(report.findings[0].message.contains("meta_info.json"));
    }
}
