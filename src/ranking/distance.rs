use std::fmt;

use crate::core::ranked_result::DISTANCE_ATTRIBUTE;
use crate::core::{AttributeValue, GeoPoint, QueryPayload, Record};
use crate::criteria::DistanceConfig;
use crate::error::{Result, SearchEngineError};
use crate::ranking::{round_to_tenth, CriterionScorer, PartialResult};

/// Earth radius used for great-circle distances, in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0710;

/// Great-circle distance in kilometers (haversine)
pub fn haversine_km(from: GeoPoint, to: GeoPoint) -> f64 {
    if from == to {
        return 0.0;
    }

    let from_lat = from.latitude.to_radians();
    let to_lat = to.latitude.to_radians();
    let half_dlat = (to_lat - from_lat) / 2.0;
    let half_dlon = (to.longitude - from.longitude).to_radians() / 2.0;

    let h = half_dlat.sin().powi(2) + from_lat.cos() * to_lat.cos() * half_dlon.sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Distance and proximity score of one record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceMatch {
    /// Rounded to one decimal
    pub distance_km: f64,
    pub score: f64,
}

impl DistanceMatch {
    /// Result for records without usable coordinates
    pub fn out_of_range(limit_km: f64) -> Self {
        Self {
            distance_km: limit_km,
            score: 0.0,
        }
    }
}

impl fmt::Display for DistanceMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Km", self.distance_km)
    }
}

/// Proximity score: `(1 - distance / limit) * weight` inside the limit, 0 beyond
pub fn score(from: GeoPoint, to: GeoPoint, limit_km: f64, weight: f64) -> DistanceMatch {
    let distance_km = round_to_tenth(haversine_km(from, to));
    let score = if distance_km < limit_km {
        (1.0 - distance_km / limit_km) * weight
    } else {
        0.0
    };

    DistanceMatch { distance_km, score }
}

/// Proximity scorer over a pair of coordinate attributes
pub struct DistanceScorer {
    criterion: String,
    latitude_attr: String,
    longitude_attr: String,
    limit_km: f64,
    weight: f64,
}

impl DistanceScorer {
    pub fn new(criterion: impl Into<String>, config: &DistanceConfig, weight: f64) -> Self {
        Self {
            criterion: criterion.into(),
            latitude_attr: config.latitude_attr.clone(),
            longitude_attr: config.longitude_attr.clone(),
            limit_km: config.limit_km,
            weight,
        }
    }

    fn position_of(&self, record: &Record) -> Option<GeoPoint> {
        let latitude = record.get(&self.latitude_attr)?.as_f64()?;
        let longitude = record.get(&self.longitude_attr)?.as_f64()?;
        Some(GeoPoint::new(latitude, longitude))
    }
}

impl CriterionScorer for DistanceScorer {
    fn score(&self, payload: &QueryPayload, records: &[&Record], seeded: bool) -> Result<Vec<PartialResult>> {
        let origin = match payload {
            QueryPayload::Position(origin) => *origin,
            _ => {
                return Err(SearchEngineError::InvalidQuery(format!(
                    "criterion '{}' expects a latitude/longitude pair",
                    self.criterion
                )))
            }
        };

        let results = records
            .iter()
            .filter_map(|record| {
                let position = self.position_of(record);
                let matched = match position {
                    Some(position) => score(position, origin, self.limit_km, self.weight),
                    None => DistanceMatch::out_of_range(self.limit_km),
                };

                // Zero scores only annotate records an earlier criterion matched
                if matched.score <= 0.0 && !seeded {
                    return None;
                }

                let mut partial = PartialResult::new(record.id(), matched.score, self.weight);
                if let Some(latitude) = record.get(&self.latitude_attr) {
                    partial.attributes.insert("latitude".to_string(), latitude.clone());
                }
                if let Some(longitude) = record.get(&self.longitude_attr) {
                    partial.attributes.insert("longitude".to_string(), longitude.clone());
                }
                partial
                    .attributes
                    .insert(DISTANCE_ATTRIBUTE.to_string(), AttributeValue::Float(matched.distance_km));
                Some(partial)
            })
            .collect();

        Ok(results)
    }

    fn name(&self) -> &str {
        "distance"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TORONTO: GeoPoint = GeoPoint {
        latitude: 43.70011,
        longitude: -79.4163,
    };

    fn city(id: i64, lat: AttributeValue, long: AttributeValue) -> Record {
        Record::from_pairs([("id", AttributeValue::from(id)), ("lat", lat), ("long", long)]).unwrap()
    }

    fn scorer() -> DistanceScorer {
        DistanceScorer::new("distance", &DistanceConfig::new("lat", "long", 1000.0), 0.8)
    }

    #[test]
    fn test_identical_points() {
        assert_eq!(haversine_km(TORONTO, TORONTO), 0.0);
        let matched = score(TORONTO, TORONTO, 10.0, 0.8);
        assert_eq!(matched.distance_km, 0.0);
        assert_eq!(matched.score, 0.8);
    }

    #[test]
    fn test_known_distance() {
        let london_on = GeoPoint::new(42.98339, -81.23304);
        let km = haversine_km(london_on, TORONTO);
        assert!((km - 168.0).abs() < 2.0, "got {}", km);

        // Symmetric
        assert!((haversine_km(TORONTO, london_on) - km).abs() < 1e-9);
    }

    #[test]
    fn test_score_bounds() {
        let near = score(GeoPoint::new(43.71, -79.42), TORONTO, 10.0, 0.8);
        assert!(near.score > 0.0 && near.score < 0.8);

        let far = score(GeoPoint::new(45.50884, -73.58781), TORONTO, 10.0, 0.8);
        assert!(far.distance_km > 10.0);
        assert_eq!(far.score, 0.0);
    }

    #[test]
    fn test_display_has_unit() {
        let matched = DistanceMatch {
            distance_km: 167.2,
            score: 0.5,
        };
        assert_eq!(matched.to_string(), "167.2 Km");
    }

    #[test]
    fn test_unseeded_drops_zero_scores() {
        let records = [
            city(1, 42.98339.into(), (-81.23304).into()),
            city(2, 25.77427.into(), (-80.19366).into()),
            city(3, "n/a".into(), (-79.0).into()),
        ];
        let refs: Vec<&Record> = records.iter().collect();

        let results = scorer().score(&QueryPayload::Position(TORONTO), &refs, false).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].record_id, "1");
        assert!(results[0].attributes.contains_key("distance"));
        assert_eq!(results[0].attributes.get("latitude"), Some(&AttributeValue::Float(42.98339)));
    }

    #[test]
    fn test_seeded_keeps_invalid_records_at_limit() {
        let records = [city(3, "n/a".into(), (-79.0).into())];
        let refs: Vec<&Record> = records.iter().collect();

        let results = scorer().score(&QueryPayload::Position(TORONTO), &refs, true).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].score, 0.0);
        assert_eq!(results[0].weight, 0.8);
        assert_eq!(results[0].attributes.get("distance"), Some(&AttributeValue::Float(1000.0)));
    }

    #[test]
    fn test_missing_coordinates_are_invalid() {
        let record = Record::from_pairs([("id", AttributeValue::from(9))]).unwrap();
        let results = scorer().score(&QueryPayload::Position(TORONTO), &[&record], true).unwrap();

        assert_eq!(results[0].score, 0.0);
        assert!(!results[0].attributes.contains_key("latitude"));
    }

    #[test]
    fn test_text_payload_rejected() {
        let err = scorer().score(&QueryPayload::Text("Toronto".into()), &[], false).unwrap_err();
        assert!(matches!(err, SearchEngineError::InvalidQuery(_)));
    }
}
