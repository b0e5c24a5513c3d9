use thiserror::Error;

use crate::store::StoreError;

/// Errors raised by runtime lookups against the thesaurus corpus.
///
/// `MissingEntry` and `MissingStructure` carry enough context for a caller to
/// render a "create this content" template instead of a bare 404.
#[derive(Debug, Error)]
pub enum ThesaurusError {
    #[error("entry `{key}` is not listed in the manifest")]
    MissingEntry { key: String },

    #[error("{entry_name} ({}) has no `{structure}` file", entry_version.as_deref().unwrap_or("no version"))]
    MissingStructure {
        structure: String,
        structure_name: String,
        entry_key: String,
        entry_name: String,
        entry_version: Option<String>,
    },

    #[error("structure `{key}` is not known")]
    UnknownStructure { key: String },

    #[error("file not found: {path}")]
    FileNotFound { path: String },

    #[error("failed to parse `{path}`: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize response: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ThesaurusError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(path) => Self::FileNotFound { path },
            other => Self::Store(other),
        }
    }
}

impl ThesaurusError {
    /// True for the "requested content does not exist" family of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::MissingEntry { .. }
                | Self::MissingStructure { .. }
                | Self::UnknownStructure { .. }
                | Self::FileNotFound { .. }
        )
    }
}

pub type Result<T, E = ThesaurusError> = std::result::Result<T, E>;
