//! Criterion registry.
//!
//! Criteria are declared as an ordered mapping, the same shape in JSON and YAML:
//!
//! ```yaml
//! name:
//!   type: text
//!   weight: 0.6
//!   config:
//!     secondarySearchMalus: 0.1
//! distance:
//!   type: distance
//!   weight: 0.8
//!   config:
//!     latitudeAttr: lat
//!     longitudeAttr: long
//!     limitKm: 1000
//! ```
//!
//! Declaration order is the order criteria run in.

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::{Result, SearchEngineError};

fn default_latitude_attr() -> String {
    "latitude".to_string()
}

fn default_longitude_attr() -> String {
    "longitude".to_string()
}

fn default_limit_km() -> f64 {
    10.0
}

/// Text criterion settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TextConfig {
    /// Subtracted from the score of matches found away from the start
    #[serde(default)]
    pub secondary_search_malus: f64,

    /// Attribute to match against; the criterion name when unset
    #[serde(default)]
    pub attribute: Option<String>,
}

impl TextConfig {
    pub fn with_malus(secondary_search_malus: f64) -> Self {
        Self {
            secondary_search_malus,
            attribute: None,
        }
    }
}

/// Distance criterion settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DistanceConfig {
    #[serde(default = "default_latitude_attr", alias = "latitudeName")]
    pub latitude_attr: String,

    #[serde(default = "default_longitude_attr", alias = "longitudeName")]
    pub longitude_attr: String,

    /// Distance at which the score drops to zero
    #[serde(default = "default_limit_km", alias = "limit")]
    pub limit_km: f64,
}

impl Default for DistanceConfig {
    fn default() -> Self {
        Self {
            latitude_attr: default_latitude_attr(),
            longitude_attr: default_longitude_attr(),
            limit_km: default_limit_km(),
        }
    }
}

impl DistanceConfig {
    pub fn new(latitude_attr: impl Into<String>, longitude_attr: impl Into<String>, limit_km: f64) -> Self {
        Self {
            latitude_attr: latitude_attr.into(),
            longitude_attr: longitude_attr.into(),
            limit_km,
        }
    }
}

/// Criterion type with its settings
#[derive(Debug, Clone, PartialEq)]
pub enum CriterionKind {
    Text(TextConfig),
    Distance(DistanceConfig),
}

impl CriterionKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            CriterionKind::Text(_) => "text",
            CriterionKind::Distance(_) => "distance",
        }
    }
}

/// A named, weighted scoring rule
#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    pub name: String,
    pub weight: f64,
    pub kind: CriterionKind,
}

impl Criterion {
    pub fn text(name: impl Into<String>, weight: f64, config: TextConfig) -> Self {
        Self {
            name: name.into(),
            weight,
            kind: CriterionKind::Text(config),
        }
    }

    pub fn distance(name: impl Into<String>, weight: f64, config: DistanceConfig) -> Self {
        Self {
            name: name.into(),
            weight,
            kind: CriterionKind::Distance(config),
        }
    }

    fn validate(&self) -> Result<()> {
        let invalid = |message: String| Err(SearchEngineError::InvalidCriteria(message));

        if self.name.is_empty() {
            return invalid("criterion name must not be empty".to_string());
        }
        if !self.weight.is_finite() || self.weight <= 0.0 {
            return invalid(format!(
                "criterion '{}': weight must be a positive number, got {}",
                self.name, self.weight
            ));
        }

        match &self.kind {
            CriterionKind::Text(config) => {
                if !config.secondary_search_malus.is_finite() || config.secondary_search_malus < 0.0 {
                    return invalid(format!(
                        "criterion '{}': secondarySearchMalus must be a non-negative number",
                        self.name
                    ));
                }
                if matches!(config.attribute.as_deref(), Some("")) {
                    return invalid(format!("criterion '{}': attribute must not be empty", self.name));
                }
            }
            CriterionKind::Distance(config) => {
                if !config.limit_km.is_finite() || config.limit_km <= 0.0 {
                    return invalid(format!(
                        "criterion '{}': limitKm must be a positive number, got {}",
                        self.name, config.limit_km
                    ));
                }
                if config.latitude_attr.is_empty() || config.longitude_attr.is_empty() {
                    return invalid(format!(
                        "criterion '{}': coordinate attribute names must not be empty",
                        self.name
                    ));
                }
            }
        }

        Ok(())
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, weight {})", self.name, self.kind.type_name(), self.weight)?;
        match &self.kind {
            CriterionKind::Text(config) if config.secondary_search_malus > 0.0 => {
                write!(f, " malus {}", config.secondary_search_malus)
            }
            CriterionKind::Distance(config) => write!(
                f,
                " [{}, {}] limit {} Km",
                config.latitude_attr, config.longitude_attr, config.limit_km
            ),
            _ => Ok(()),
        }
    }
}

/// Ordered, validated set of criteria
#[derive(Debug, Clone, PartialEq)]
pub struct CriterionRegistry {
    criteria: Vec<Criterion>,
}

impl CriterionRegistry {
    pub fn new(criteria: Vec<Criterion>) -> Result<Self> {
        if criteria.is_empty() {
            return Err(SearchEngineError::InvalidCriteria(
                "at least one criterion is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for criterion in &criteria {
            criterion.validate()?;
            if !seen.insert(criterion.name.as_str()) {
                return Err(SearchEngineError::InvalidCriteria(format!(
                    "duplicate criterion '{}'",
                    criterion.name
                )));
            }
        }

        Ok(Self { criteria })
    }

    /// Parse criteria from a JSON mapping
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        if !value.is_object() {
            return Err(SearchEngineError::InvalidCriteria(
                "criteria must be a mapping of name to definition".to_string(),
            ));
        }
        serde_json::from_value(value).map_err(|e| SearchEngineError::InvalidCriteria(e.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&Criterion> {
        self.criteria.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Criterion> {
        self.criteria.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.criteria.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }
}

impl<'a> IntoIterator for &'a CriterionRegistry {
    type Item = &'a Criterion;
    type IntoIter = std::slice::Iter<'a, Criterion>;

    fn into_iter(self) -> Self::IntoIter {
        self.criteria.iter()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum CriterionType {
    Text,
    Distance,
}

/// One entry of the declaration mapping
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CriterionDefinition {
    #[serde(rename = "type")]
    kind: CriterionType,
    weight: f64,
    #[serde(default)]
    config: serde_json::Value,
}

impl CriterionDefinition {
    fn into_criterion(self, name: String) -> Result<Criterion> {
        let config_error =
            |e: serde_json::Error| SearchEngineError::InvalidCriteria(format!("criterion '{}': {}", name, e));

        let kind = match self.kind {
            CriterionType::Text => CriterionKind::Text(if self.config.is_null() {
                TextConfig::default()
            } else {
                serde_json::from_value(self.config).map_err(config_error)?
            }),
            CriterionType::Distance => CriterionKind::Distance(if self.config.is_null() {
                DistanceConfig::default()
            } else {
                serde_json::from_value(self.config).map_err(config_error)?
            }),
        };

        Ok(Criterion {
            name,
            weight: self.weight,
            kind,
        })
    }
}

/// Declaration mapping in document order
#[derive(Debug)]
struct CriterionDefinitions(Vec<(String, CriterionDefinition)>);

impl<'de> Deserialize<'de> for CriterionDefinitions {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DefinitionsVisitor;

        impl<'de> Visitor<'de> for DefinitionsVisitor {
            type Value = CriterionDefinitions;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a mapping of criterion name to definition")
            }

            fn visit_map<M>(self, mut access: M) -> std::result::Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, definition)) = access.next_entry::<String, CriterionDefinition>()? {
                    entries.push((name, definition));
                }
                Ok(CriterionDefinitions(entries))
            }
        }

        deserializer.deserialize_map(DefinitionsVisitor)
    }
}

impl CriterionDefinitions {
    fn into_registry(self) -> Result<CriterionRegistry> {
        let criteria = self
            .0
            .into_iter()
            .map(|(name, definition)| definition.into_criterion(name))
            .collect::<Result<Vec<_>>>()?;
        CriterionRegistry::new(criteria)
    }
}

impl<'de> Deserialize<'de> for CriterionRegistry {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        CriterionDefinitions::deserialize(deserializer)?
            .into_registry()
            .map_err(de::Error::custom)
    }
}
