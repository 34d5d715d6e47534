use serde::Serialize;
use std::cmp::Ordering;

use crate::core::record::{AttributeValue, Attributes};

/// Attribute carrying the secondary-match flag in results
pub const SECONDARY_MATCH_ATTRIBUTE: &str = "secondaryMatch";
/// Attribute carrying the normalized score in results
pub const SCORE_ATTRIBUTE: &str = "score";
/// Attribute carrying the distance in kilometers in results
pub const DISTANCE_ATTRIBUTE: &str = "distance";

/// A ranked search hit.
///
/// Serializes as its (projected) attribute map only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    /// Record identifier
    #[serde(skip)]
    pub id: String,

    /// Normalized score, rounded to one decimal
    #[serde(skip)]
    pub score: f64,

    /// Whether the text match was found away from the start of the value
    #[serde(skip)]
    pub secondary_match: bool,

    /// Attributes kept after projection
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl RankedResult {
    pub fn new(id: impl Into<String>, score: f64, secondary_match: bool, attributes: Attributes) -> Self {
        Self {
            id: id.into(),
            score,
            secondary_match,
            attributes,
        }
    }

    /// Result ordering: primary matches first, then score descending
    pub fn rank_order(a: &Self, b: &Self) -> Ordering {
        a.secondary_match
            .cmp(&b.secondary_match)
            .then_with(|| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal))
    }

    pub fn get(&self, attribute: &str) -> Option<&AttributeValue> {
        self.attributes.get(attribute)
    }

    /// Distance to the query position, when a distance criterion ran and it survived projection
    pub fn distance_km(&self) -> Option<f64> {
        self.get(DISTANCE_ATTRIBUTE).and_then(AttributeValue::as_f64)
    }

    /// Get display string for logging
    pub fn display(&self) -> String {
        let label = self
            .get("name")
            .map(|v| v.to_string())
            .unwrap_or_else(|| self.id.clone());
        match self.distance_km() {
            Some(km) => format!("{} - {:.1} ({} Km)", label, self.score, km),
            None => format!("{} - {:.1}", label, self.score),
        }
    }
}
