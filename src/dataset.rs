//! Dataset loading.
//!
//! Tab-separated files carry a header line naming the columns. Known columns
//! are coerced to typed values, the rest are kept as text:
//!
//! | columns                                               | type    | fallback  |
//! |-------------------------------------------------------|---------|-----------|
//! | `id`, `admin1`..`admin4`, `population`, `dem`         | integer | `0`       |
//! | `lat`, `long`                                         | float   | `0.0`     |
//! | `modified_at`                                         | date    | raw text  |

use chrono::{DateTime, NaiveDate, Utc};
use std::cmp::Ordering;
use std::path::Path;

use crate::core::record::ID_ATTRIBUTE;
use crate::core::{AttributeValue, Attributes, Record};
use crate::error::{Result, SearchEngineError};

/// How a column's raw text is coerced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Date,
    Text,
}

impl ColumnKind {
    pub fn for_column(name: &str) -> Self {
        match name {
            "id" | "admin1" | "admin2" | "admin3" | "admin4" | "population" | "dem" => ColumnKind::Integer,
            "lat" | "long" => ColumnKind::Float,
            "modified_at" => ColumnKind::Date,
            _ => ColumnKind::Text,
        }
    }

    pub fn coerce(self, raw: &str) -> AttributeValue {
        let trimmed = raw.trim();
        match self {
            ColumnKind::Integer => AttributeValue::Integer(parse_integer(trimmed).unwrap_or(0)),
            ColumnKind::Float => AttributeValue::Float(
                trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .unwrap_or(0.0),
            ),
            ColumnKind::Date => parse_date(trimmed)
                .map(AttributeValue::Date)
                .unwrap_or_else(|| AttributeValue::Text(raw.to_string())),
            ColumnKind::Text => AttributeValue::Text(raw.to_string()),
        }
    }
}

/// Integers, with decimal input truncated toward zero
fn parse_integer(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(|v| v.trunc() as i64)
    })
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc())
}

/// An in-memory record collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Read and parse a tab-separated file
    pub fn load_tsv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SearchEngineError::DatasetNotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        let dataset = Self::parse_tsv(&content)?;
        tracing::info!("📂 Loaded {} records from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    /// Parse tab-separated content whose first line is the header
    pub fn parse_tsv(content: &str) -> Result<Self> {
        let mut lines = content.lines();
        let header: Vec<&str> = match lines.next() {
            Some(line) if !line.trim().is_empty() => line.split('\t').map(str::trim).collect(),
            _ => {
                return Err(SearchEngineError::InvalidDataset(
                    "dataset content is empty or has no header".to_string(),
                ))
            }
        };
        if !header.contains(&ID_ATTRIBUTE) {
            return Err(SearchEngineError::InvalidDataset(format!(
                "header has no '{}' column",
                ID_ATTRIBUTE
            )));
        }

        let kinds: Vec<ColumnKind> = header.iter().map(|name| ColumnKind::for_column(name)).collect();

        let records = lines
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(row, line)| {
                let attributes: Attributes = header
                    .iter()
                    .zip(&kinds)
                    .zip(line.split('\t'))
                    .map(|((name, kind), raw)| (name.to_string(), kind.coerce(raw)))
                    .collect();

                Record::new(attributes).map_err(|e| match e {
                    SearchEngineError::InvalidDataset(message) => {
                        SearchEngineError::InvalidDataset(format!("line {}: {}", row + 2, message))
                    }
                    other => other,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(records))
    }

    /// Parse records from JSON: an array of objects, or a single object.
    ///
    /// Strings in date-typed columns are parsed as dates, the same way the
    /// tab-separated loader coerces them. Other columns keep their JSON type.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let items = match value {
            serde_json::Value::Array(items) => items,
            object @ serde_json::Value::Object(_) => vec![object],
            other => {
                return Err(SearchEngineError::InvalidDataset(format!(
                    "expected an array or an object, got {}",
                    other
                )))
            }
        };

        let records = items
            .into_iter()
            .enumerate()
            .map(|(position, item)| {
                let invalid = |message: String| {
                    SearchEngineError::InvalidDataset(format!("record {}: {}", position, message))
                };
                let attributes: Attributes = serde_json::from_value::<Attributes>(item)
                    .map_err(|e| invalid(e.to_string()))?
                    .into_iter()
                    .map(|(name, value)| {
                        let value = match (ColumnKind::for_column(&name), value) {
                            (ColumnKind::Date, AttributeValue::Text(raw)) => ColumnKind::Date.coerce(&raw),
                            (_, value) => value,
                        };
                        (name, value)
                    })
                    .collect();

                Record::new(attributes).map_err(|e| match e {
                    SearchEngineError::InvalidDataset(message) => invalid(message),
                    other => other,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(records))
    }

    /// Stable sort by a text attribute; records without it go last
    pub fn sort_by_attribute(&mut self, attribute: &str) {
        self.records.sort_by(|a, b| {
            match (
                a.get(attribute).and_then(AttributeValue::as_text),
                b.get(attribute).and_then(AttributeValue::as_text),
            ) {
                (Some(a), Some(b)) => a.cmp(b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        });
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::io::Write;

    const TSV: &str = "id\tname\tascii\tlat\tlong\tpopulation\tmodified_at\n\
6058560\tLondon\tLondon\t42.98339\t-81.23304\t346765\t2012-08-19\n\
4355585\tLondontowne\tLondontowne\t38.93345\t-76.54941\t\t2011-05-14\n\
\n";

    #[test]
    fn test_parse_tsv() {
        let dataset = Dataset::parse_tsv(TSV).unwrap();
        assert_eq!(dataset.len(), 2);

        let london = &dataset.records()[0];
        assert_eq!(london.id(), "6058560");
        assert_eq!(london.get("id"), Some(&AttributeValue::Integer(6058560)));
        assert_eq!(london.get("lat"), Some(&AttributeValue::Float(42.98339)));
        assert_eq!(london.get("population"), Some(&AttributeValue::Integer(346765)));
        assert!(matches!(london.get("modified_at"), Some(AttributeValue::Date(_))));

        let towne = &dataset.records()[1];
        assert_eq!(towne.get("population"), Some(&AttributeValue::Integer(0)));
    }

    #[test]
    fn test_short_rows_leave_columns_absent() {
        let dataset = Dataset::parse_tsv("id\tname\tlat\n1\tLondon\n").unwrap();
        assert_eq!(dataset.records()[0].get("lat"), None);
    }

    #[test]
    fn test_coercion_fallbacks() {
        assert_eq!(ColumnKind::Integer.coerce("abc"), AttributeValue::Integer(0));
        assert_eq!(ColumnKind::Integer.coerce("12.7"), AttributeValue::Integer(12));
        assert_eq!(ColumnKind::Float.coerce(""), AttributeValue::Float(0.0));
        assert_eq!(ColumnKind::Date.coerce("soon"), AttributeValue::Text("soon".into()));
        assert_eq!(ColumnKind::for_column("asciiname"), ColumnKind::Text);
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(Dataset::parse_tsv(""), Err(SearchEngineError::InvalidDataset(_))));
        assert!(matches!(
            Dataset::parse_tsv("name\tlat\nLondon\t42.9\n"),
            Err(SearchEngineError::InvalidDataset(_))
        ));
    }

    #[test]
    fn test_load_tsv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TSV.as_bytes()).unwrap();

        let dataset = Dataset::load_tsv(file.path()).unwrap();
        assert_eq!(dataset.len(), 2);

        let missing = Dataset::load_tsv("/nonexistent/cities.tsv");
        assert!(matches!(missing, Err(SearchEngineError::DatasetNotFound(_))));
    }

    #[test]
    fn test_from_json() {
        let many = Dataset::from_json(json!([{ "id": 1, "name": "London" }, { "id": "b", "name": "Paris" }])).unwrap();
        assert_eq!(many.len(), 2);

        let single = Dataset::from_json(json!({ "id": 1, "name": "London" })).unwrap();
        assert_eq!(single.len(), 1);

        let dated = Dataset::from_json(json!({
            "id": 1,
            "name": "2012-08-19T00:00:00Z",
            "modified_at": "2012-08-19"
        }))
        .unwrap();
        let record = &dated.records()[0];
        assert_eq!(record.get("name"), Some(&AttributeValue::from("2012-08-19T00:00:00Z")));
        assert!(matches!(record.get("modified_at"), Some(AttributeValue::Date(_))));

        for bad in [json!("London"), json!(3), json!(null), json!([{ "name": "London" }])] {
            assert!(matches!(Dataset::from_json(bad), Err(SearchEngineError::InvalidDataset(_))));
        }
    }

    #[test]
    fn test_sort_by_attribute() {
        let mut dataset = Dataset::from_json(json!([
            { "id": 1, "name": "Toronto" },
            { "id": 2 },
            { "id": 3, "name": "London" }
        ]))
        .unwrap();
        dataset.sort_by_attribute("name");

        let ids: Vec<&str> = dataset.records().iter().map(Record::id).collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
    }
}
