use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Result, SearchEngineError};

/// A coordinate pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "long", alias = "lon")]
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Criterion-specific query payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryPayload {
    /// Text criteria take the substring to look for
    Text(String),
    /// Distance criteria take the reference position
    Position(GeoPoint),
    /// Anything else, kept as-is; only an error if a configured criterion receives it
    Other(serde_json::Value),
}

impl QueryPayload {
    /// Blank payloads are treated as if the criterion was absent
    pub fn is_blank(&self) -> bool {
        match self {
            QueryPayload::Text(s) => s.is_empty(),
            QueryPayload::Other(value) => value.is_null(),
            QueryPayload::Position(_) => false,
        }
    }
}

/// Mapping from criterion name to payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchQuery {
    payloads: BTreeMap<String, QueryPayload>,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text payload for `criterion`
    pub fn text(mut self, criterion: impl Into<String>, value: impl Into<String>) -> Self {
        self.payloads
            .insert(criterion.into(), QueryPayload::Text(value.into()));
        self
    }

    /// Add a position payload for `criterion`
    pub fn near(mut self, criterion: impl Into<String>, position: GeoPoint) -> Self {
        self.payloads
            .insert(criterion.into(), QueryPayload::Position(position));
        self
    }

    /// Parse a query from a JSON object
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let map = match value {
            serde_json::Value::Object(map) => map,
            other => {
                return Err(SearchEngineError::InvalidQuery(format!(
                    "query must be a mapping, got {}",
                    other
                )))
            }
        };

        let payloads = map
            .into_iter()
            .map(|(name, payload)| -> Result<(String, QueryPayload)> {
                Ok((name, serde_json::from_value(payload)?))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        let query = Self { payloads };
        query.ensure_not_empty()?;
        Ok(query)
    }

    pub(crate) fn ensure_not_empty(&self) -> Result<()> {
        if self.payloads.is_empty() {
            return Err(SearchEngineError::InvalidQuery(
                "query must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn get(&self, criterion: &str) -> Option<&QueryPayload> {
        self.payloads.get(criterion)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.payloads.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }
}
