use axum::{
    extract::{Extension, Path, Query, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::{Database, LookupLog};
use crate::error::ThesaurusError;
use crate::lookup::{
    clean_lookup_parameters, index_listing, run_lookup, IndexCategory, LookupFailure,
};
use crate::models::*;
use crate::store::SharedStore;
use crate::templates::generate_entry_template;

/// Shared router state. The corpus is re-read on every request.
#[derive(Clone, Debug)]
pub struct AppState {
    pub store: SharedStore,
    pub db: Option<Database>,
}

impl AppState {
    pub fn new(store: SharedStore, db: Option<Database>) -> Self {
        Self { store, db }
    }

    fn meta(&self) -> Result<ThesaurusMetaInfo, ApiError> {
        ThesaurusMetaInfo::load(self.store.clone()).map_err(internal_error)
    }
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub errors: Vec<String>,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn not_found(errors: Vec<String>) -> ApiError {
    (StatusCode::NOT_FOUND, Json(ErrorBody { errors }))
}

/// Log an internal error and return a sanitized response to the client.
fn internal_error(e: impl std::fmt::Display) -> ApiError {
    tracing::error!("Internal error: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            errors: vec!["Internal server error".to_string()],
        }),
    )
}

fn thesaurus_error(e: ThesaurusError) -> ApiError {
    if e.is_not_found() {
        tracing::debug!("Not found: {}", e);
        return not_found(vec![e.to_string()]);
    }
    internal_error(e)
}

/// Concept payloads are serialized by the models; pass them through as-is.
type JsonText = ([(HeaderName, &'static str); 1], String);

fn json_text(body: String) -> JsonText {
    ([(header::CONTENT_TYPE, "application/json")], body)
}

/// Record whether `entry_key` is unknown on disk or just lacks `structure_key`.
fn record_missing(log: &LookupLog, entry: &ThesaurusEntry, structure_key: &str) {
    match entry.versions() {
        Ok(versions) if !versions.is_empty() => {
            log.missing(MissingItemKind::Structure, structure_key, Some(&entry.key))
        }
        _ => log.missing(MissingItemKind::Entry, &entry.key, None),
    }
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Manifest
// ============================================================

pub async fn get_meta(State(state): State<AppState>) -> Result<Json<ThesaurusMetaInfo>, ApiError> {
    state.meta().map(Json)
}

pub async fn list_entries(
    State(state): State<AppState>,
) -> Result<Json<Vec<IndexCategory>>, ApiError> {
    let meta = state.meta()?;
    index_listing(&meta).map(Json).map_err(internal_error)
}

pub async fn get_structure(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<MetaStructure>, ApiError> {
    let meta = state.meta()?;
    meta.structure(&key).map(Json).map_err(thesaurus_error)
}

// ============================================================
// Lookups
// ============================================================

pub async fn lookup(
    State(state): State<AppState>,
    Extension(log): Extension<LookupLog>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let request = match clean_lookup_parameters(&params) {
        Ok(request) => request,
        Err(errors) => return not_found(errors).into_response(),
    };
    let meta = match state.meta() {
        Ok(meta) => meta,
        Err(e) => return e.into_response(),
    };

    match run_lookup(&meta, &request, &log) {
        Ok(page) => Json(page).into_response(),
        Err(LookupFailure::Invalid(errors)) => not_found(errors).into_response(),
        Err(LookupFailure::MissingStructure(page)) => {
            (StatusCode::NOT_FOUND, Json(page)).into_response()
        }
        Err(LookupFailure::Internal(e)) => internal_error(e).into_response(),
    }
}

pub async fn reference(
    State(state): State<AppState>,
    Extension(log): Extension<LookupLog>,
    Path((structure_key, entry_key, version)): Path<(String, String, String)>,
) -> Result<JsonText, ApiError> {
    let meta = state.meta()?;
    let name = meta.entries.get(&entry_key).unwrap_or_default();
    let mut entry = ThesaurusEntry::new(state.store.clone(), &entry_key, name);

    match entry.load_filled_concepts(&structure_key, &version) {
        Ok(body) => {
            log.lookup(CreateLookupInput {
                entry1: entry_key,
                version1: version,
                entry2: String::new(),
                version2: String::new(),
                structure: structure_key,
            });
            Ok(json_text(body))
        }
        Err(e) if e.is_not_found() => {
            record_missing(&log, &entry, &structure_key);
            Err(thesaurus_error(e))
        }
        Err(e) => Err(internal_error(e)),
    }
}

pub async fn compare(
    State(state): State<AppState>,
    Extension(log): Extension<LookupLog>,
    Path((structure_key, entry1, version1, entry2, version2)): Path<(
        String,
        String,
        String,
        String,
        String,
    )>,
) -> Result<JsonText, ApiError> {
    let meta = state.meta()?;
    let name = meta.entries.get(&entry1).unwrap_or_default();
    let mut first = ThesaurusEntry::new(state.store.clone(), &entry1, name);

    let result = first.load_comparison(&structure_key, &entry2, Some(version2.as_str()), &version1);
    match result {
        Ok(body) => {
            log.lookup(CreateLookupInput {
                entry1,
                version1,
                entry2,
                version2,
                structure: structure_key,
            });
            Ok(json_text(body))
        }
        Err(e) if e.is_not_found() => {
            if first.is_loaded() {
                let second = ThesaurusEntry::new(state.store.clone(), &entry2, "");
                record_missing(&log, &second, &structure_key);
            } else {
                record_missing(&log, &first, &structure_key);
            }
            Err(thesaurus_error(e))
        }
        Err(e) => Err(internal_error(e)),
    }
}

// ============================================================
// Templates
// ============================================================

#[derive(Debug, Deserialize)]
pub struct TemplateQuery {
    pub version: Option<String>,
}

pub async fn entry_template(
    State(state): State<AppState>,
    Path((structure_key, entry_key)): Path<(String, String)>,
    Query(query): Query<TemplateQuery>,
) -> Result<JsonText, ApiError> {
    let meta = state.meta()?;
    generate_entry_template(&meta, &entry_key, &structure_key, query.version.as_deref())
        .map(json_text)
        .map_err(thesaurus_error)
}
