pub mod distance;
pub mod text;

use std::sync::Arc;

use crate::core::{Attributes, QueryPayload, Record};
use crate::criteria::{Criterion, CriterionKind};
use crate::error::Result;

pub use distance::{DistanceMatch, DistanceScorer};
pub use text::{MatchKind, TextMatch, TextScorer};

/// Trait for per-criterion scoring implementations
pub trait CriterionScorer: Send + Sync {
    /// Score `records` against the query payload.
    ///
    /// `seeded` tells whether an earlier criterion already produced candidates;
    /// some scorers only report zero-score records in that case.
    fn score(&self, payload: &QueryPayload, records: &[&Record], seeded: bool) -> Result<Vec<PartialResult>>;

    /// Get scorer name for logging
    fn name(&self) -> &str;
}

/// One criterion's contribution to one record
#[derive(Debug, Clone, PartialEq)]
pub struct PartialResult {
    pub record_id: String,
    pub score: f64,
    pub weight: f64,
    /// Attributes this criterion exposes on the result
    pub attributes: Attributes,
    /// Set by text criteria only
    pub secondary_match: Option<bool>,
}

impl PartialResult {
    pub fn new(record_id: impl Into<String>, score: f64, weight: f64) -> Self {
        Self {
            record_id: record_id.into(),
            score,
            weight,
            attributes: Attributes::new(),
            secondary_match: None,
        }
    }
}

/// Build the scorer for a configured criterion
pub fn scorer_for(criterion: &Criterion) -> Arc<dyn CriterionScorer> {
    match &criterion.kind {
        CriterionKind::Text(config) => Arc::new(TextScorer::new(
            &criterion.name,
            config.attribute.as_deref().unwrap_or(&criterion.name),
            config.secondary_search_malus,
            criterion.weight,
        )),
        CriterionKind::Distance(config) => Arc::new(DistanceScorer::new(&criterion.name, config, criterion.weight)),
    }
}

/// Round to one decimal place, from the exact binary value.
///
/// `0.35` is stored just below the halfway point, so it rounds down to `0.3`.
/// Exact halves (odd multiples of 0.25) round away from zero.
pub(crate) fn round_to_tenth(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let quarters = value * 4.0;
    if quarters.fract() == 0.0 && quarters % 2.0 != 0.0 {
        return (value * 10.0).round() / 10.0;
    }
    format!("{:.1}", value).parse().unwrap_or(value)
}
