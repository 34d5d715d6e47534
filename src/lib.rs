//! # Geosearch Engine
//!
//! In-memory multi-criteria search over a fixed record set:
//! - Text criteria: prefix match first, substring match second
//! - Distance criteria: haversine proximity within a limit
//! - Weighted scores normalized over the criteria that scored each record
//! - Attribute allow list on the results
//!
//! ## Example Usage
//!
//! ```rust
//! use geosearch_engine::{
//!     Criterion, CriterionRegistry, DistanceConfig, GeoPoint, Record, SearchEngine, SearchOptions,
//!     SearchQuery, TextConfig,
//! };
//!
//! fn main() -> geosearch_engine::Result<()> {
//!     let records = vec![Record::from_pairs([
//!         ("id", 6058560.into()),
//!         ("name", "London".into()),
//!         ("lat", 42.98339.into()),
//!         ("long", (-81.23304).into()),
//!     ])?];
//!
//!     let criteria = CriterionRegistry::new(vec![
//!         Criterion::text("name", 0.6, TextConfig::with_malus(0.1)),
//!         Criterion::distance("distance", 0.8, DistanceConfig::new("lat", "long", 1000.0)),
//!     ])?;
//!
//!     let engine = SearchEngine::new(records, criteria, vec!["name".into(), "score".into()])?;
//!     let results = engine.compute_search(
//!         &SearchQuery::new()
//!             .text("name", "Londo")
//!             .near("distance", GeoPoint::new(43.70011, -79.4163)),
//!         &SearchOptions::default(),
//!     )?;
//!
//!     assert_eq!(results[0].score, 0.8);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod criteria;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod projection;
pub mod ranking;

// Re-export primary types
pub use config::EngineConfig;
pub use core::{AttributeValue, Attributes, GeoPoint, QueryPayload, RankedResult, Record, SearchQuery};
pub use criteria::{Criterion, CriterionKind, CriterionRegistry, DistanceConfig, TextConfig};
pub use dataset::Dataset;
pub use engine::{SearchEngine, SearchOptions};
pub use error::{Result, SearchEngineError};
pub use projection::ResultProjector;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
