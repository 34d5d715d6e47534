use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::config::EngineConfig;
use crate::core::ranked_result::{SCORE_ATTRIBUTE, SECONDARY_MATCH_ATTRIBUTE};
use crate::core::{AttributeValue, Attributes, RankedResult, Record, SearchQuery};
use crate::criteria::CriterionRegistry;
use crate::error::{Result, SearchEngineError};
use crate::projection::ResultProjector;
use crate::ranking::{round_to_tenth, scorer_for, CriterionScorer, PartialResult};

/// Search options/configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SearchOptions {
    /// Results must score strictly above this
    #[serde(alias = "scoreMin")]
    pub score_min: f64,
    /// Maximum number of results
    pub limit: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            score_min: 0.3,
            limit: 15,
        }
    }
}

/// A configured criterion paired with its scorer
struct CriterionPass {
    name: String,
    scorer: Arc<dyn CriterionScorer>,
}

/// Main search engine orchestrator
pub struct SearchEngine {
    records: Vec<Record>,
    positions: HashMap<String, usize>,
    criteria: CriterionRegistry,
    passes: Vec<CriterionPass>,
    projector: ResultProjector,
    options: SearchOptions,
}

impl SearchEngine {
    /// Create a new engine over `records`
    pub fn new(records: Vec<Record>, criteria: CriterionRegistry, allowed_attributes: Vec<String>) -> Result<Self> {
        let mut positions = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            if positions.insert(record.id().to_string(), position).is_some() {
                return Err(SearchEngineError::InvalidDataset(format!(
                    "duplicate record id '{}'",
                    record.id()
                )));
            }
        }

        let passes = criteria
            .iter()
            .map(|criterion| CriterionPass {
                name: criterion.name.clone(),
                scorer: scorer_for(criterion),
            })
            .collect();

        tracing::info!(
            "✅ Search engine ready: {} records, {} criteria",
            records.len(),
            criteria.len()
        );

        Ok(Self {
            records,
            positions,
            criteria,
            passes,
            projector: ResultProjector::new(allowed_attributes),
            options: SearchOptions::default(),
        })
    }

    /// Create an engine from a loaded configuration
    pub fn from_config(records: Vec<Record>, config: &EngineConfig) -> Result<Self> {
        let engine = Self::new(records, config.criteria.clone(), config.allowed_attributes.clone())?;
        Ok(engine.with_options(config.search))
    }

    /// Set the options used by [`SearchEngine::search`]
    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn criteria(&self) -> &CriterionRegistry {
        &self.criteria
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Search with the engine's default options
    pub fn search(&self, query: &SearchQuery) -> Result<Vec<RankedResult>> {
        self.compute_search(query, &self.options)
    }

    /// Rank records against `query`.
    ///
    /// Criteria run in registry order. The first criterion that matches
    /// anything seeds the candidate set; later criteria only score those
    /// candidates. Scores are normalized by the weight of the criteria that
    /// actually scored each record.
    pub fn compute_search(&self, query: &SearchQuery, options: &SearchOptions) -> Result<Vec<RankedResult>> {
        let start = Instant::now();
        if !self.names_known_criterion(query)? {
            return Ok(Vec::new());
        }

        let accumulated = self.passes.iter().try_fold(Accumulator::default(), |acc, pass| {
            let payload = match query.get(&pass.name) {
                Some(payload) if !payload.is_blank() => payload,
                _ => return Ok(acc),
            };

            let candidates = acc.candidates(&self.records);
            let partials = pass.scorer.score(payload, &candidates, acc.is_seeded())?;
            tracing::debug!(
                "Criterion {} ({}) scored {} of {} records",
                pass.name,
                pass.scorer.name(),
                partials.len(),
                candidates.len()
            );

            Ok::<_, SearchEngineError>(acc.merge(partials))
        })?;

        let mut ranked: Vec<RankedResult> = accumulated
            .entries
            .into_iter()
            .filter_map(|state| self.finish(state))
            .collect();
        ranked.sort_by(RankedResult::rank_order);

        let results: Vec<RankedResult> = ranked
            .into_iter()
            .filter(|result| result.score > options.score_min)
            .filter_map(|result| {
                let attributes = self.projector.project(result.attributes)?;
                Some(RankedResult { attributes, ..result })
            })
            .take(options.limit)
            .collect();

        tracing::debug!(
            "Search returned {} results in {:.2}ms",
            results.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );

        Ok(results)
    }

    /// Reject empty queries and warn about unknown criteria.
    ///
    /// Returns `false` when no configured criterion is named at all.
    fn names_known_criterion(&self, query: &SearchQuery) -> Result<bool> {
        query.ensure_not_empty()?;

        let unknown: Vec<&str> = query.names().filter(|name| !self.criteria.contains(name)).collect();
        if !unknown.is_empty() {
            tracing::warn!("⚠️ Ignoring unknown criteria in query: {}", unknown.join(", "));
        }

        Ok(unknown.len() < query.len())
    }

    /// Turn accumulated state into an unprojected result
    fn finish(&self, state: AccumulatedState) -> Option<RankedResult> {
        let record = &self.records[*self.positions.get(&state.record_id)?];
        let score = round_to_tenth(state.score / state.weight);
        let secondary_match = state.secondary_match.unwrap_or(false);

        let mut attributes = record.attributes().clone();
        attributes.extend(state.attributes);
        if let Some(secondary) = state.secondary_match {
            attributes.insert(SECONDARY_MATCH_ATTRIBUTE.to_string(), AttributeValue::Boolean(secondary));
        }
        attributes.insert(SCORE_ATTRIBUTE.to_string(), AttributeValue::Float(score));

        Some(RankedResult::new(state.record_id, score, secondary_match, attributes))
    }
}

/// Running totals for one record
#[derive(Debug)]
struct AccumulatedState {
    record_id: String,
    score: f64,
    weight: f64,
    attributes: Attributes,
    secondary_match: Option<bool>,
}

impl From<PartialResult> for AccumulatedState {
    fn from(partial: PartialResult) -> Self {
        Self {
            record_id: partial.record_id,
            score: partial.score,
            weight: partial.weight,
            attributes: partial.attributes,
            secondary_match: partial.secondary_match,
        }
    }
}

/// Per-call fold state: entries in first-match order, indexed by record id
#[derive(Debug, Default)]
struct Accumulator {
    entries: Vec<AccumulatedState>,
    index: HashMap<String, usize>,
}

impl Accumulator {
    fn is_seeded(&self) -> bool {
        !self.index.is_empty()
    }

    /// Every record until something matched, then only the matched ones
    fn candidates<'a>(&self, records: &'a [Record]) -> Vec<&'a Record> {
        if self.is_seeded() {
            records
                .iter()
                .filter(|record| self.index.contains_key(record.id()))
                .collect()
        } else {
            records.iter().collect()
        }
    }

    fn merge(mut self, partials: Vec<PartialResult>) -> Self {
        for partial in partials {
            match self.index.get(&partial.record_id) {
                Some(&position) => {
                    let state = &mut self.entries[position];
                    state.score += partial.score;
                    state.weight += partial.weight;
                    state.attributes.extend(partial.attributes);
                    if partial.secondary_match.is_some() {
                        state.secondary_match = partial.secondary_match;
                    }
                }
                None => {
                    self.index.insert(partial.record_id.clone(), self.entries.len());
                    self.entries.push(partial.into());
                }
            }
        }
        self
    }
}
