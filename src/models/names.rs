use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// An ordered `key -> display name` table, as found throughout the manifest
/// and the structure catalogs. File order is preserved.
///
/// Every value is a JSON string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Names(Map<String, Value>);

impl Names {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Adds `key` unless it is already present.
    pub fn insert(&mut self, key: impl Into<String>, name: impl Into<String>) {
        let key = key.into();
        if !self.contains(&key) {
            self.0.insert(key, Value::String(name.into()));
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|name| (k.as_str(), name)))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn from_object(object: &Map<String, Value>) -> Result<Self, String> {
        if let Some((key, other)) = object.iter().find(|(_, v)| !v.is_string()) {
            return Err(format!("`{key}` should map to a string, found {other}"));
        }
        Ok(Self(object.clone()))
    }
}

impl Serialize for Names {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Names {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let object = Map::<String, Value>::deserialize(deserializer)?;
        Self::from_object(&object).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_in_file_order() {
        let names: Names =
            serde_json::from_str(r#"{"python": "Python", "c": "C", "java": "Java"}"#).unwrap();
        assert_eq!(names.keys().collect::<Vec<_>>(), vec!["python", "c", "java"]);
        assert_eq!(names.get("c"), Some("C"));
    }

    #[test]
    fn rejects_non_string_names() {
        assert!(serde_json::from_str::<Names>(r#"{"python": 3}"#).is_err());
    }

    #[test]
    fn first_insert_wins() {
        let mut names = Names::new();
        names.insert("queries", "Queries");
        names.insert("queries", "Other");
        assert_eq!(names.len(), 1);
        assert_eq!(names.get("queries"), Some("Queries"));
    }
}
