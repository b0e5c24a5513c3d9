use serde_json::{Map, Value};

use super::ValidationReport;
use crate::models::is_truthy;
use crate::store::{join, ContentStore, StoreError};

const DEFAULT_LANGUAGE: &str = "language_id";
const DEFAULT_VERSION: &str = "version.number";
const DEFAULT_NAMES: [&str; 2] = [
    "Human-Friendly ThesaurusEntry Name",
    "Human-Readable ThesaurusEntry Name",
];
const ALLOWED_CONCEPT_KEYS: [&str; 6] = [
    "code",
    "comment",
    "not-implemented",
    "not_implemented",
    "name",
    "comments",
];

/// Check the shape of every concept file under
/// `<category>/<entry>/<version>/*.json`.
pub fn validate_entry_files(store: &dyn ContentStore) -> Result<ValidationReport, StoreError> {
    let mut report = ValidationReport::new();

    for category in store.categories_on_disk()? {
        for entry in store.list_dir(&category)?.into_iter().filter(|l| l.is_dir()) {
            let entry_dir = join(&[&category, &entry.name]);
            for version in store.list_dir(&entry_dir)?.into_iter().filter(|l| l.is_dir()) {
                let version_dir = join(&[&entry_dir, &version.name]);
                let files = store
                    .list_dir(&version_dir)?
                    .into_iter()
                    .filter(|l| l.is_file() && l.name.ends_with(".json"));
                for file in files {
                    let rel = join(&[&version_dir, &file.name]);
                    validate_entry_file(store, &rel, &entry.name, &mut report);
                }
            }
        }
    }

    tracing::info!(
        errors = report.error_count(),
        warnings = report.warning_count(),
        "validated concept files"
    );
    Ok(report)
}

fn validate_entry_file(
    store: &dyn ContentStore,
    rel: &str,
    entry_dir: &str,
    report: &mut ValidationReport,
) {
    let path = store.describe(rel);
    let content = match store.read_file(rel) {
        Ok(content) => content,
        Err(e) => {
            report.error(format!("Failed to parse `{path}`: {e}"));
            return;
        }
    };
    let data: Value = match serde_json::from_str(&content) {
        Ok(data) => data,
        Err(e) => {
            report.error(format!("Failed to parse `{path}`: {e}"));
            return;
        }
    };
    let Some(data) = data.as_object() else {
        report.error(format!("`{path}` should contain a JSON object"));
        return;
    };

    check_meta_section(data, &path, entry_dir, report);
    check_concepts(data, &path, report);
}

fn meta_text<'a>(meta: Option<&'a Map<String, Value>>, key: &str) -> &'a str {
    meta.and_then(|m| m.get(key))
        .and_then(Value::as_str)
        .unwrap_or("")
}

fn check_meta_section(
    data: &Map<String, Value>,
    rel: &str,
    entry_dir: &str,
    report: &mut ValidationReport,
) {
    let meta = data.get("meta").and_then(Value::as_object);

    let language = meta_text(meta, "language");
    if language.is_empty() {
        report.error(format!(
            "`{rel}` has an empty `language` attribute and needs to be updated"
        ));
    } else if language == DEFAULT_LANGUAGE {
        report.error(format!(
            "`{rel}` has the default `language` attribute and needs to be updated"
        ));
    } else if language != entry_dir {
        report.error(format!(
            "`{rel}` has a `language` attribute that should be `{entry_dir}` and needs to be updated"
        ));
    }

    let version = meta_text(meta, "language_version");
    if version.is_empty() {
        report.error(format!(
            "`{rel}` has an empty `language_version` attribute and needs to be updated"
        ));
    } else if version == DEFAULT_VERSION {
        report.error(format!(
            "`{rel}` has the default `language_version` attribute and needs to be updated"
        ));
    }

    let name = meta_text(meta, "language_name");
    if name.is_empty() {
        report.error(format!(
            "`{rel}` has an empty `language_name` attribute and needs to be updated"
        ));
    } else if DEFAULT_NAMES.contains(&name) {
        report.error(format!(
            "`{rel}` has the default `language_name` attribute and needs to be updated"
        ));
    }

    if data.contains_key("categories") {
        report.error(format!(
            "`{rel}` has a `categories` section in it, which is now deprecated"
        ));
    }
}

fn check_concepts(data: &Map<String, Value>, rel: &str, report: &mut ValidationReport) {
    let Some(concepts) = data.get("concepts").and_then(Value::as_object) else {
        return;
    };

    for (id, item) in concepts {
        let Some(item) = item.as_object() else {
            report.error(format!("`{rel}`, ID: `{id}` should be an object"));
            continue;
        };
        check_concept(item, rel, id, report);
    }
}

fn check_concept(item: &Map<String, Value>, rel: &str, id: &str, report: &mut ValidationReport) {
    let has_code = item.contains_key("code");
    let has_not_implemented = item.contains_key("not-implemented");
    let has_underscore = item.contains_key("not_implemented");

    if has_underscore {
        report.error(format!(
            "`{rel}`, ID: `{id}` has not_implemented (underscore) when it should use not-implemented (hyphen)"
        ));
    }

    if has_code && (has_not_implemented || has_underscore) {
        report.error(format!(
            "`{rel}`, ID: `{id}` should have `code` or `not-implemented`, not both"
        ));
    } else if !has_code && !has_not_implemented && !has_underscore {
        report.error(format!(
            "`{rel}`, ID: `{id}` is missing a needed `code` or `not-implemented` line"
        ));
    } else if has_code && !item.get("code").is_some_and(is_truthy) {
        report.error(format!(
            "`{rel}`, ID: `{id}` is confusing: `code` is empty but there's no `not-implemented` either"
        ));
    }

    if item.contains_key("comments") {
        report.error(format!(
            "`{rel}`, ID: `{id}` has `comments` (plural) that should be `comment` (singular) instead"
        ));
    }

    for key in item.keys() {
        if !ALLOWED_CONCEPT_KEYS.contains(&key.as_str()) {
            report.warning(format!("`{rel}`, ID: `{id}` has a line `{key}` that's unknown"));
        }
    }
}
