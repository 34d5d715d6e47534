use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::SearchEngineError;

/// Attribute name holding the record identifier
pub const ID_ATTRIBUTE: &str = "id";

/// Attribute map shared by records and results
pub type Attributes = BTreeMap<String, AttributeValue>;

/// A single attribute value.
///
/// Deserialization is untagged: JSON numbers become `Integer` or `Float` and
/// strings always stay `Text`. Dates come from typed columns only, see
/// [`Dataset`](crate::Dataset).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Date(DateTime<Utc>),
}

impl AttributeValue {
    /// Numeric view of the value, `None` for non-numbers and NaN
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Integer(i) => Some(*i as f64),
            AttributeValue::Float(f) if !f.is_nan() => Some(*f),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Boolean(b) => write!(f, "{}", b),
            AttributeValue::Integer(i) => write!(f, "{}", i),
            AttributeValue::Float(v) => write!(f, "{}", v),
            AttributeValue::Date(d) => write!(f, "{}", d.to_rfc3339()),
            AttributeValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Boolean(b)
    }
}

impl From<i64> for AttributeValue {
    fn from(i: i64) -> Self {
        AttributeValue::Integer(i)
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Float(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Text(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::Text(s)
    }
}

impl From<DateTime<Utc>> for AttributeValue {
    fn from(d: DateTime<Utc>) -> Self {
        AttributeValue::Date(d)
    }
}

/// An immutable dataset entry identified by its `id` attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Attributes", into = "Attributes")]
pub struct Record {
    id: String,
    attributes: Attributes,
}

impl Record {
    /// Build a record, requiring an integer or non-empty string `id`
    pub fn new(attributes: Attributes) -> Result<Self, SearchEngineError> {
        let id = match attributes.get(ID_ATTRIBUTE) {
            Some(AttributeValue::Integer(i)) => i.to_string(),
            Some(AttributeValue::Text(s)) if !s.is_empty() => s.clone(),
            Some(other) => {
                return Err(SearchEngineError::InvalidDataset(format!(
                    "record id must be a string or an integer, got {:?}",
                    other
                )))
            }
            None => {
                return Err(SearchEngineError::InvalidDataset(
                    "record has no id attribute".to_string(),
                ))
            }
        };

        Ok(Self { id, attributes })
    }

    /// Build a record from `(name, value)` pairs
    pub fn from_pairs<I, K>(pairs: I) -> Result<Self, SearchEngineError>
    where
        I: IntoIterator<Item = (K, AttributeValue)>,
        K: Into<String>,
    {
        Self::new(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Identifier compared as a string
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn get(&self, attribute: &str) -> Option<&AttributeValue> {
        self.attributes.get(attribute)
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl TryFrom<Attributes> for Record {
    type Error = SearchEngineError;

    fn try_from(attributes: Attributes) -> Result<Self, Self::Error> {
        Record::new(attributes)
    }
}

impl From<Record> for Attributes {
    fn from(record: Record) -> Self {
        record.attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_creation() {
        let record = Record::from_pairs([
            ("id", AttributeValue::from(6058560)),
            ("name", "London".into()),
            ("lat", 42.98339.into()),
        ])
        .unwrap();

        assert_eq!(record.id(), "6058560");
        assert_eq!(record.get("name").and_then(|v| v.as_text()), Some("London"));
        assert_eq!(record.get("lat").and_then(|v| v.as_f64()), Some(42.98339));
    }

    #[test]
    fn test_string_id() {
        let record = Record::from_pairs([("id", AttributeValue::from("abc"))]).unwrap();
        assert_eq!(record.id(), "abc");
    }

    #[test]
    fn test_missing_or_invalid_id() {
        let missing = Record::from_pairs([("name", AttributeValue::from("London"))]);
        assert!(matches!(missing, Err(SearchEngineError::InvalidDataset(_))));

        let float_id = Record::from_pairs([("id", AttributeValue::from(1.5))]);
        assert!(matches!(float_id, Err(SearchEngineError::InvalidDataset(_))));

        let empty_id = Record::from_pairs([("id", AttributeValue::from(""))]);
        assert!(matches!(empty_id, Err(SearchEngineError::InvalidDataset(_))));
    }

    #[test]
    fn test_numeric_view() {
        assert_eq!(AttributeValue::Integer(3).as_f64(), Some(3.0));
        assert_eq!(AttributeValue::Float(f64::NAN).as_f64(), None);
        assert_eq!(AttributeValue::from("43.7").as_f64(), None);
    }

    #[test]
    fn test_serialization() {
        let json = r#"{"id":1,"name":"London","lat":42.98,"capital":false}"#;
        let record = Record::from_json(json).unwrap();
        assert_eq!(record.id(), "1");
        assert_eq!(record.get("lat"), Some(&AttributeValue::Float(42.98)));
        assert_eq!(record.get("capital"), Some(&AttributeValue::Boolean(false)));

        let back = Record::from_json(&record.to_json().unwrap()).unwrap();
        assert_eq!(record, back);
    }

    #[test]
    fn test_date_like_strings_stay_text() {
        let record = Record::from_json(r#"{"id":1,"name":"2012-08-19T00:00:00Z"}"#).unwrap();
        assert_eq!(record.get("name"), Some(&AttributeValue::from("2012-08-19T00:00:00Z")));
    }

    #[test]
    fn test_deserialize_without_id_fails() {
        assert!(Record::from_json(r#"{"name":"London"}"#).is_err());
    }
}
