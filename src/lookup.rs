//! Lookup flow: query parameters in, comparison page model out.

use serde::{Deserialize, Serialize};

use crate::db::LookupLog;
use crate::error::{Result, ThesaurusError};
use crate::models::{
    CreateLookupInput, MetaStructure, MissingItemKind, Names, ThesaurusEntry, ThesaurusMetaInfo,
};
use crate::store::join;
use crate::templates::generate_entry_template;

pub const NO_STRUCTURE: &str = "The URL didn't specify a structure/concept to look up.";
pub const NO_ENTRIES: &str = "The URL didn't specify any languages to look up.";
pub const INVALID_STRUCTURE: &str =
    "The structure/concept isn't valid. Double-check your URL and try again.";
pub const UNKNOWN_CODE: &str = "Unknown";
pub const NOT_IMPLEMENTED_COMMENT: &str = "Not Implemented In This Language";

/// Cleaned lookup parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub structure: String,
    /// `(entry key, version)` pairs in request order.
    pub entries: Vec<(String, Option<String>)>,
}

/// Parse query pairs into a [`LookupRequest`].
///
/// Entries come from every `entry`/`lang` value followed by the legacy
/// `lang1` and `lang2`, each written `key` or `key;version`. On failure all
/// problems are returned at once.
pub fn clean_lookup_parameters(
    params: &[(String, String)],
) -> std::result::Result<LookupRequest, Vec<String>> {
    let mut raw: Vec<&str> = params
        .iter()
        .filter(|(k, _)| k == "entry" || k == "lang")
        .map(|(_, v)| v.as_str())
        .collect();
    raw.extend(first_value(params, "lang1"));
    raw.extend(first_value(params, "lang2"));

    let entries: Vec<(String, Option<String>)> = raw
        .into_iter()
        .filter_map(|value| {
            let cleaned = strip_tags(value);
            let mut parts = cleaned.split(';');
            let key = parts.next().unwrap_or_default().trim();
            if key.is_empty() {
                return None;
            }
            let version = parts
                .next()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string);
            Some((key.to_string(), version))
        })
        .collect();

    let structure = first_value(params, "concept")
        .map(|v| strip_tags(v).trim().to_string())
        .unwrap_or_default();

    let mut errors = Vec::new();
    if structure.is_empty() {
        errors.push(NO_STRUCTURE.to_string());
    }
    if entries.is_empty() {
        errors.push(NO_ENTRIES.to_string());
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(LookupRequest { structure, entries })
}

fn first_value<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

fn strip_tags(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_tag = false;
    for c in value.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

// ============================================================
// Page model
// ============================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonPage {
    pub title: String,
    pub structure: String,
    pub structure_name: String,
    pub entries: Vec<EntrySummary>,
    pub categories: Vec<CategoryRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntrySummary {
    pub key: String,
    pub version: Option<String>,
    pub name: String,
    pub is_incomplete: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRow {
    pub key: String,
    pub concepts: Vec<ConceptRow>,
    /// One flag per entry, in entry order.
    pub is_incomplete: Vec<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptRow {
    pub key: String,
    pub name: String,
    /// One cell per entry, in entry order.
    pub data: Vec<ConceptCell>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptCell {
    pub code: Option<String>,
    pub comment: String,
}

/// Code shown for `id`: "Unknown" when the entry lacks it, nothing when it
/// is marked not implemented.
pub fn format_code_for_display(entry: &ThesaurusEntry, id: &str) -> Option<String> {
    if entry.concept_unknown(id) {
        return Some(UNKNOWN_CODE.to_string());
    }
    entry.concept_implemented(id).then(|| entry.concept_code(id))
}

pub fn format_comment_for_display(entry: &ThesaurusEntry, id: &str) -> String {
    let comment = entry.concept_comment(id);
    if !entry.concept_implemented(id) && comment.is_empty() {
        return NOT_IMPLEMENTED_COMMENT.to_string();
    }
    comment.to_string()
}

fn title(structure: &MetaStructure, entries: &[ThesaurusEntry]) -> String {
    let labels: Vec<String> = entries
        .iter()
        .map(|e| format!("{} ({})", e.name, e.version.as_deref().unwrap_or_default()))
        .collect();
    match labels.as_slice() {
        [] => structure.name.clone(),
        [only] => format!("Reference for {only}"),
        [rest @ .., last] => format!("Comparing {} and {last}", rest.join(", ")),
    }
}

/// Lay out every concept of `structure` side by side for loaded `entries`.
///
/// Concepts an entry marks as not implemented are reported to `log`.
pub fn build_comparison(
    structure: &MetaStructure,
    entries: &[ThesaurusEntry],
    log: &LookupLog,
) -> ComparisonPage {
    let mut categories = Vec::with_capacity(structure.categories.len());

    for category in &structure.categories {
        let keys: Vec<&str> = category.concepts.keys().collect();

        let concepts = category
            .concepts
            .iter()
            .map(|(id, name)| ConceptRow {
                key: id.to_string(),
                name: name.to_string(),
                data: entries
                    .iter()
                    .map(|entry| {
                        if !entry.concept_implemented(id) {
                            log.missing(MissingItemKind::Concept, id, Some(&entry.key));
                        }
                        ConceptCell {
                            code: format_code_for_display(entry, id),
                            comment: format_comment_for_display(entry, id),
                        }
                    })
                    .collect(),
            })
            .collect();

        let is_incomplete = entries
            .iter()
            .map(|entry| {
                !entry.has_any_implemented_in_category(&keys) || entry.is_category_incomplete(&keys)
            })
            .collect();

        categories.push(CategoryRow {
            key: category.label.clone(),
            concepts,
            is_incomplete,
        });
    }

    let summaries = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| EntrySummary {
            key: entry.key.clone(),
            version: entry.version.clone(),
            name: entry.name.clone(),
            is_incomplete: categories.iter().any(|c| c.is_incomplete[i]),
        })
        .collect();

    ComparisonPage {
        title: title(structure, entries),
        structure: structure.key.clone(),
        structure_name: structure.name.clone(),
        entries: summaries,
        categories,
    }
}

// ============================================================
// Lookup flow
// ============================================================

/// What to offer when an entry exists but lacks the requested structure.
#[derive(Debug, Clone, Serialize)]
pub struct MissingStructurePage {
    pub key: String,
    pub name: String,
    pub entry: String,
    pub entry_name: String,
    pub version: Option<String>,
    pub template: String,
}

#[derive(Debug)]
pub enum LookupFailure {
    /// Bad parameters, unknown structure or unknown entries.
    Invalid(Vec<String>),
    MissingStructure(MissingStructurePage),
    Internal(ThesaurusError),
}

impl From<ThesaurusError> for LookupFailure {
    fn from(e: ThesaurusError) -> Self {
        Self::Internal(e)
    }
}

/// Resolve `request` against the corpus and build its page model.
pub fn run_lookup(
    meta: &ThesaurusMetaInfo,
    request: &LookupRequest,
    log: &LookupLog,
) -> std::result::Result<ComparisonPage, LookupFailure> {
    let structure = match meta.structure(&request.structure) {
        Ok(structure) => structure,
        Err(ThesaurusError::UnknownStructure { key }) => {
            tracing::debug!(%key, "unknown structure requested");
            return Err(LookupFailure::Invalid(vec![INVALID_STRUCTURE.to_string()]));
        }
        Err(e) => return Err(e.into()),
    };

    let entries = match meta.load_entries(&request.entries, &structure) {
        Ok(entries) => entries,
        Err(ThesaurusError::MissingEntry { key }) => {
            log.missing(MissingItemKind::Entry, &key, None);
            return Err(LookupFailure::Invalid(vec![format!(
                "The language \"{key}\" isn't valid. Double-check your URL and try again."
            )]));
        }
        Err(ThesaurusError::MissingStructure {
            structure,
            structure_name,
            entry_key,
            entry_name,
            entry_version,
        }) => {
            log.missing(MissingItemKind::Structure, &structure, Some(&entry_key));
            let template =
                generate_entry_template(meta, &entry_key, &structure, entry_version.as_deref())?;
            return Err(LookupFailure::MissingStructure(MissingStructurePage {
                key: structure,
                name: structure_name,
                entry: entry_key,
                entry_name,
                version: entry_version,
                template,
            }));
        }
        Err(e) => return Err(e.into()),
    };

    let side = |i: usize| {
        entries
            .get(i)
            .map(|e| (e.key.clone(), e.version.clone().unwrap_or_default()))
            .unwrap_or_default()
    };
    let (entry1, version1) = side(0);
    let (entry2, version2) = side(1);
    log.lookup(CreateLookupInput {
        entry1,
        version1,
        entry2,
        version2,
        structure: structure.key.clone(),
    });

    Ok(build_comparison(&structure, &entries, log))
}

// ============================================================
// Index listing
// ============================================================

#[derive(Debug, Clone, Serialize)]
pub struct IndexCategory {
    pub key: String,
    pub label: String,
    pub entries: Vec<IndexEntry>,
    pub structures: Names,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexEntry {
    pub key: String,
    pub name: String,
    pub versions: Vec<IndexVersion>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexVersion {
    pub version: String,
    /// Structures with a concept file in this version directory.
    pub structures: Vec<String>,
}

/// Every manifest category with the listed entries found in its directory.
pub fn index_listing(meta: &ThesaurusMetaInfo) -> Result<Vec<IndexCategory>> {
    let store = meta.store();
    let mut listing = Vec::with_capacity(meta.categories.len());

    for (category, label) in meta.categories.iter() {
        let on_disk: Vec<String> = match store.list_dir(category) {
            Ok(children) => children
                .into_iter()
                .filter(|l| l.is_dir())
                .map(|l| l.name)
                .collect(),
            Err(e) => {
                tracing::warn!(category, error = %e, "category directory unreadable");
                Vec::new()
            }
        };

        let mut entries = Vec::new();
        for (key, name) in meta.entries.iter().filter(|(k, _)| on_disk.iter().any(|d| d == k)) {
            let mut versions = Vec::new();
            for version in store.list_versions(category, key)? {
                let structures = store
                    .list_dir(&join(&[category, key, &version]))?
                    .into_iter()
                    .filter(|l| l.is_file())
                    .filter_map(|l| l.name.strip_suffix(".json").map(str::to_string))
                    .filter(|s| meta.structures.contains(s))
                    .collect();
                versions.push(IndexVersion { version, structures });
            }
            entries.push(IndexEntry {
                key: key.to_string(),
                name: name.to_string(),
                versions,
            });
        }

        listing.push(IndexCategory {
            key: category.to_string(),
            label: label.to_string(),
            entries,
            structures: meta
                .structures_for_category(category)
                .cloned()
                .unwrap_or_default(),
        });
    }

    Ok(listing)
}
