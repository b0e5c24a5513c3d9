use std::collections::HashMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Concept records of one entry file, keyed by id.
///
/// The raw records are kept as read (file order included) and are what the
/// reference and comparison payloads serialize; [`Concept`] is the parsed
/// view used for lookups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConceptMap {
    raw: Map<String, Value>,
    records: HashMap<String, Concept>,
}

impl ConceptMap {
    /// Build from the `concepts` object of a concept file.
    pub fn from_json(concepts: &Map<String, Value>) -> Self {
        let records = concepts
            .iter()
            .map(|(id, raw)| (id.clone(), Concept::from_value(raw)))
            .collect();
        Self {
            raw: concepts.clone(),
            records,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Concept> {
        self.records.get(id)
    }

    /// The record for `id` exactly as the concept file has it.
    pub fn raw(&self, id: &str) -> Option<&Value> {
        self.raw.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.raw.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.raw.keys().map(String::as_str)
    }
}

impl Serialize for ConceptMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

/// The code attached to an implemented concept.
///
/// Concept files store either a single string or a list of lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Code {
    Text(String),
    Lines(Vec<String>),
}

impl Code {
    /// The code as display text, lines joined with `\n`.
    pub fn text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Lines(lines) => lines.join("\n"),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Lines(lines) => lines.iter().all(String::is_empty),
        }
    }

    fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) => Self::Text(s.clone()),
            Value::Array(items) => Self::Lines(
                items
                    .iter()
                    .map(|v| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
            ),
            Value::Null => Self::Text(String::new()),
            other => Self::Text(other.to_string()),
        }
    }
}

impl Serialize for Code {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(s) => serializer.serialize_str(s),
            Self::Lines(lines) => lines.serialize(serializer),
        }
    }
}

/// One concept record of an entry.
///
/// A record either carries code or is explicitly marked `not-implemented`;
/// `comment` and `name` are optional in both cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Concept {
    Implemented {
        code: Code,
        comment: Option<String>,
        name: Option<String>,
    },
    /// `code` is kept when a file carries both; lookups still treat the
    /// concept as not implemented.
    NotImplemented {
        code: Option<Code>,
        comment: Option<String>,
        name: Option<String>,
    },
}

impl Concept {
    /// The record reported for ids absent from an entry.
    pub fn unknown() -> Self {
        Self::Implemented {
            code: Code::Text(String::new()),
            comment: Some(String::new()),
            name: None,
        }
    }

    /// Interpret a raw record from a concept file.
    ///
    /// Runtime lookups are lenient: a truthy `not-implemented` wins over any
    /// `code`, and a record with neither is an implemented concept with empty
    /// code. The validators report those shapes separately.
    pub fn from_value(value: &Value) -> Self {
        let Some(record) = value.as_object() else {
            return Self::Implemented {
                code: Code::from_value(value),
                comment: None,
                name: None,
            };
        };

        let comment = record.get("comment").map(value_text);
        let name = record.get("name").map(value_text);

        let code = record.get("code").map(Code::from_value);

        if record.get("not-implemented").is_some_and(is_truthy) {
            return Self::NotImplemented {
                code,
                comment,
                name,
            };
        }

        Self::Implemented {
            code: code.unwrap_or(Code::Text(String::new())),
            comment,
            name,
        }
    }

    pub fn is_implemented(&self) -> bool {
        matches!(self, Self::Implemented { .. })
    }

    /// The stored code text, whatever the marker says. Empty when absent.
    pub fn code(&self) -> String {
        match self {
            Self::Implemented { code, .. } => code.text(),
            Self::NotImplemented { code, .. } => code.as_ref().map(Code::text).unwrap_or_default(),
        }
    }

    pub fn comment(&self) -> &str {
        match self {
            Self::Implemented { comment, .. } | Self::NotImplemented { comment, .. } => {
                comment.as_deref().unwrap_or("")
            }
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Implemented { name, .. } | Self::NotImplemented { name, .. } => name.as_deref(),
        }
    }

    /// True when the record has neither code nor a comment to show.
    pub fn is_blank(&self) -> bool {
        let no_code = match self {
            Self::Implemented { code, .. } => code.is_empty(),
            Self::NotImplemented { code, .. } => code.as_ref().map_or(true, Code::is_empty),
        };
        no_code && self.comment().is_empty()
    }
}

/// A parsed record serializes to the concept-file shape. Unimplemented
/// concepts always carry `code` and `comment` (empty when absent) next to
/// `"not-implemented": true`.
impl Serialize for Concept {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match self {
            Self::Implemented {
                code,
                comment,
                name,
            } => {
                if let Some(name) = name {
                    map.serialize_entry("name", name)?;
                }
                map.serialize_entry("code", code)?;
                if let Some(comment) = comment {
                    map.serialize_entry("comment", comment)?;
                }
            }
            Self::NotImplemented {
                code,
                comment,
                name,
            } => {
                if let Some(name) = name {
                    map.serialize_entry("name", name)?;
                }
                match code {
                    Some(code) => map.serialize_entry("code", code)?,
                    None => map.serialize_entry("code", "")?,
                }
                map.serialize_entry("comment", comment.as_deref().unwrap_or(""))?;
                map.serialize_entry("not-implemented", &true)?;
            }
        }
        map.end()
    }
}

/// JSON truthiness as the corpus uses it: `"true"` marks a concept as not
/// implemented just like `true` does.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_code_is_implemented() {
        let concept = Concept::from_value(&json!({"code": "abc"}));
        assert!(concept.is_implemented());
        assert_eq!(concept.code(), "abc");
        assert_eq!(concept.comment(), "");
    }

    #[test]
    fn line_code_joins_with_newlines() {
        let concept = Concept::from_value(&json!({"code": ["line1", "line2"]}));
        assert_eq!(concept.code(), "line1\nline2");
    }

    #[test]
    fn string_true_marks_not_implemented() {
        let concept = Concept::from_value(&json!({"not-implemented": "true"}));
        assert!(!concept.is_implemented());
        assert_eq!(concept.code(), "");
    }

    #[test]
    fn false_marker_keeps_concept_implemented() {
        let concept = Concept::from_value(&json!({"code": "x", "not-implemented": false}));
        assert!(concept.is_implemented());
    }

    #[test]
    fn not_implemented_serializes_with_defaults() {
        let concept = Concept::from_value(&json!({"not-implemented": "true"}));
        assert_eq!(
            serde_json::to_value(&concept).unwrap(),
            json!({"code": "", "comment": "", "not-implemented": true})
        );
    }

    #[test]
    fn unknown_serializes_to_empty_code_and_comment() {
        assert_eq!(
            serde_json::to_value(Concept::unknown()).unwrap(),
            json!({"code": "", "comment": ""})
        );
    }

    #[test]
    fn concept_map_keeps_file_order() {
        let raw = json!({"zeta": {"code": "z"}, "alpha": {"not-implemented": true}});
        let map = ConceptMap::from_json(raw.as_object().unwrap());
        assert_eq!(map.ids().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
        assert!(map.contains("alpha"));
        assert!(!map.get("alpha").unwrap().is_implemented());
    }

    #[test]
    fn not_implemented_keeps_stored_code() {
        let concept = Concept::from_value(&json!({"code": "c = 'a'", "not-implemented": true}));
        assert!(!concept.is_implemented());
        assert_eq!(concept.code(), "c = 'a'");
        assert!(!concept.is_blank());
    }

    #[test]
    fn concept_map_serializes_raw_records() {
        let raw = json!({
            "char": {"code": "c = 'a'", "not-implemented": "true", "comment": "x"},
            "boolean": {"code": "True", "example": "y"}
        });
        let map = ConceptMap::from_json(raw.as_object().unwrap());
        assert_eq!(serde_json::to_value(&map).unwrap(), raw);
        assert_eq!(map.raw("boolean").unwrap()["example"], "y");
    }

    #[test]
    fn blank_requires_no_code_and_no_comment() {
        assert!(Concept::unknown().is_blank());
        assert!(Concept::from_value(&json!({"not-implemented": true})).is_blank());
        assert!(!Concept::from_value(&json!({"not-implemented": true, "comment": "n/a"})).is_blank());
        assert!(!Concept::from_value(&json!({"code": "x"})).is_blank());
    }
}
