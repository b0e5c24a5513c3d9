use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One request served by the site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteVisit {
    pub id: Uuid,
    pub url: String,
    pub user_agent: String,
    pub referer: String,
    pub date_time: DateTime<Utc>,
}

/// A successful reference or comparison lookup.
///
/// The second entry is empty for single-entry references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupData {
    pub id: Uuid,
    pub visit_id: Uuid,
    pub entry1: String,
    pub version1: String,
    pub entry2: String,
    pub version2: String,
    pub structure: String,
    pub date_time: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateLookupInput {
    pub entry1: String,
    pub version1: String,
    pub entry2: String,
    pub version2: String,
    pub structure: String,
}

/// Something a visitor asked for that the corpus does not have.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingLookup {
    pub id: Uuid,
    pub visit_id: Uuid,
    pub item_type: MissingItemKind,
    pub item_value: String,
    /// The entry the missing structure or concept was requested for.
    pub entry_context: Option<String>,
    pub date_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MissingItemKind {
    Entry,
    Structure,
    Concept,
}

impl MissingItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entry => "entry",
            Self::Structure => "structure",
            Self::Concept => "concept",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "entry" => Some(Self::Entry),
            "structure" => Some(Self::Structure),
            "concept" => Some(Self::Concept),
            _ => None,
        }
    }
}
