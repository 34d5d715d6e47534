use crate::core::{AttributeValue, QueryPayload, Record};
use crate::error::{Result, SearchEngineError};
use crate::ranking::{round_to_tenth, CriterionScorer, PartialResult};

/// Where the query was found in the value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Value starts with the query
    Primary,
    /// Query found further into the value
    Secondary,
}

/// Outcome of matching one value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMatch {
    pub kind: MatchKind,
    /// Characters covered by the query plus the word characters following it
    pub span_len: usize,
    pub score: f64,
}

impl TextMatch {
    pub fn is_secondary(&self) -> bool {
        self.kind == MatchKind::Secondary
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Locate `query` in `text`.
///
/// Returns the match kind and the length in characters of the matched span.
pub fn classify(text: &str, query: &str) -> Option<(MatchKind, usize)> {
    if query.is_empty() {
        return None;
    }

    let (kind, start) = if text.starts_with(query) {
        (MatchKind::Primary, 0)
    } else {
        (MatchKind::Secondary, text.find(query)?)
    };

    let trailing = text[start + query.len()..]
        .chars()
        .take_while(|c| is_word_char(*c))
        .count();

    Some((kind, query.chars().count() + trailing))
}

/// Score `text` against `query`.
///
/// `(len(query) / len(span)) * weight`, minus `malus` for secondary matches,
/// rounded to one decimal.
pub fn score(text: &str, query: &str, malus: f64, weight: f64) -> Option<TextMatch> {
    let (kind, span_len) = classify(text, query)?;
    let malus = match kind {
        MatchKind::Primary => 0.0,
        MatchKind::Secondary => malus,
    };
    let ratio = query.chars().count() as f64 / span_len as f64;

    Some(TextMatch {
        kind,
        span_len,
        score: round_to_tenth(ratio * weight - malus),
    })
}

/// Prefix/substring scorer over one text attribute
pub struct TextScorer {
    criterion: String,
    attribute: String,
    malus: f64,
    weight: f64,
}

impl TextScorer {
    pub fn new(criterion: impl Into<String>, attribute: impl Into<String>, malus: f64, weight: f64) -> Self {
        Self {
            criterion: criterion.into(),
            attribute: attribute.into(),
            malus,
            weight,
        }
    }
}

impl CriterionScorer for TextScorer {
    fn score(&self, payload: &QueryPayload, records: &[&Record], _seeded: bool) -> Result<Vec<PartialResult>> {
        let query = match payload {
            QueryPayload::Text(query) => query,
            _ => {
                return Err(SearchEngineError::InvalidQuery(format!(
                    "criterion '{}' expects a text value",
                    self.criterion
                )))
            }
        };

        let results = records
            .iter()
            .filter_map(|record| {
                let text = record.get(&self.attribute)?.as_text()?;
                let matched = score(text, query, self.malus, self.weight)?;

                let mut partial = PartialResult::new(record.id(), matched.score, self.weight);
                partial
                    .attributes
                    .insert(self.attribute.clone(), AttributeValue::Text(text.to_string()));
                partial.secondary_match = Some(matched.is_secondary());
                Some(partial)
            })
            .collect();

        Ok(results)
    }

    fn name(&self) -> &str {
        "text"
    }
}
