//! Engine configuration.
//!
//! ```yaml
//! criteria:
//!   name:
//!     type: text
//!     weight: 0.6
//!     config:
//!       secondarySearchMalus: 0.1
//! allowed_attributes: [name, id, distance, score]
//! search:
//!   score_min: 0.3
//!   limit: 15
//! ```

use serde::Deserialize;
use std::path::Path;

use crate::criteria::{Criterion, CriterionRegistry, DistanceConfig, TextConfig};
use crate::engine::SearchOptions;
use crate::error::{Result, SearchEngineError};

/// Everything needed to build a [`SearchEngine`](crate::SearchEngine) besides the records
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EngineConfig {
    pub criteria: CriterionRegistry,

    /// Attributes kept in results; empty keeps all
    #[serde(default, alias = "allowedAttributes")]
    pub allowed_attributes: Vec<String>,

    #[serde(default)]
    pub search: SearchOptions,
}

impl EngineConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a `.json` file, or YAML for any other extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SearchEngineError::ConfigNotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content)?,
            _ => Self::from_yaml_str(&content)?,
        };

        tracing::info!(
            "Loaded config from {} ({} criteria)",
            path.display(),
            config.criteria.len()
        );
        Ok(config)
    }

    /// Setup for the Canada/USA cities dataset: name prefix plus proximity
    pub fn default_cities() -> Result<Self> {
        let criteria = CriterionRegistry::new(vec![
            Criterion::text("name", 0.6, TextConfig::with_malus(0.1)),
            Criterion::distance("distance", 0.8, DistanceConfig::new("lat", "long", 1000.0)),
        ])?;

        Ok(Self {
            criteria,
            allowed_attributes: ["name", "id", "distance", "latitude", "longitude", "score"]
                .into_iter()
                .map(String::from)
                .collect(),
            search: SearchOptions::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::CriterionKind;
    use std::io::Write;

    const YAML: &str = "
criteria:
  name:
    type: text
    weight: 0.6
    config:
      secondarySearchMalus: 0.1
  distance:
    type: distance
    weight: 0.8
    config:
      latitudeAttr: lat
      longitudeAttr: long
      limitKm: 1000
allowed_attributes: [name, id, distance, latitude, longitude, score]
search:
  limit: 5
";

    #[test]
    fn test_from_yaml() {
        let config = EngineConfig::from_yaml_str(YAML).unwrap();

        assert_eq!(config, EngineConfig {
            search: SearchOptions { score_min: 0.3, limit: 5 },
            ..EngineConfig::default_cities().unwrap()
        });
    }

    #[test]
    fn test_from_json_defaults() {
        let config = EngineConfig::from_json_str(
            r#"{ "criteria": { "city": { "type": "text", "weight": 1 } } }"#,
        )
        .unwrap();

        assert!(config.allowed_attributes.is_empty());
        assert_eq!(config.search, SearchOptions::default());
        assert!(matches!(config.criteria.get("city").unwrap().kind, CriterionKind::Text(_)));
    }

    #[test]
    fn test_invalid_criteria_surface() {
        let err = EngineConfig::from_yaml_str("criteria:\n  name:\n    type: text\n    weight: -1\n").unwrap_err();
        assert!(err.to_string().contains("weight must be a positive number"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(YAML.as_bytes()).unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.criteria.len(), 2);

        let missing = EngineConfig::from_file("/nonexistent/engine.yaml");
        assert!(matches!(missing, Err(SearchEngineError::ConfigNotFound(_))));
    }
}
