//! Wire shapes of the route comparison backend.
//!
//! Route objects stay as raw `serde_json::Value`s until the normalizer
//! decides how to read them. Optional fields use `DefaultOnError`, so a value
//! of the wrong JSON type reads as absent instead of failing the whole route.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{DefaultOnError, serde_as};
use tracing::warn;

use crate::coordinate::Coordinate;

/// Body of `POST /api/compare-routes`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompareRoutesRequest {
    pub source: String,
    pub destination: String,
    pub preference: String,
    pub options: AvoidOptions,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvoidOptions {
    pub tolls: bool,
    pub highways: bool,
    pub hilly_roads: bool,
    pub inner_city: bool,
}

/// Successful body of `POST /api/compare-routes`.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompareRoutesResponse {
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub our_algorithm: Option<ProviderSection>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub openrouteservice: Option<ProviderSection>,
}

impl CompareRoutesResponse {
    /// Reads a response body, treating anything unreadable as an empty response.
    pub fn from_value_lenient(body: &Value) -> Self {
        Self::deserialize(body).unwrap_or_else(|err| {
            warn!(error = %err, "unreadable comparison response");
            Self::default()
        })
    }
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderSection {
    #[serde(default)]
    pub best_route: Option<Value>,
    #[serde(default)]
    pub alternative_route: Option<Value>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub road_summary: Option<RawRoadSummary>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub visualization: Option<VisualizationSection>,
}

/// Geometry-only copies of the internal routes, traced by the provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VisualizationSection {
    #[serde(default)]
    pub best_route: Option<Value>,
    #[serde(default)]
    pub alternative_route: Option<Value>,
}

/// Error body returned with a non-2xx status.
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub message: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub available_locations: Option<Vec<LocationEntry>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationEntry {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub display: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
}

/// Body of `GET /api/available-locations`.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationsResponse {
    #[serde(default)]
    pub locations: Vec<LocationEntry>,
}

/// Body of `GET /api/available-routes`.
#[derive(Debug, Clone, Deserialize)]
pub struct RoutesResponse {
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
}

/// Route produced by the in-house shortest path algorithms.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InternalRoute {
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub source: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub destination: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub original_source: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub original_destination: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub preference: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub distance: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub time: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub algorithm: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub route_towns: Option<Vec<String>>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub detailed_route: Option<Vec<String>>,
    #[serde(flatten)]
    pub metrics: RawMetrics,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub analysis: Option<RawAnalysis>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub exact_coordinates: Option<RawExactCoordinates>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub comparison: Option<RawDelta>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub weather: Option<Weather>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub used_highway_despite_avoidance: Option<bool>,
}

/// Route returned by the third-party routing provider.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalRoute {
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub source: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub destination: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub preference: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub distance: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub time: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub route: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub decoded_route: Option<Vec<Coordinate>>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub detailed_route: Option<Vec<String>>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub exact_coordinates: Option<RawExactCoordinates>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub comparison: Option<RawDelta>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub error: Option<String>,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMetrics {
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub execution_time_ms: Option<f64>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub nodes_visited: Option<u64>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub edge_relaxations: Option<u64>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub operations: Option<u64>,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAnalysis {
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub algorithm: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub algorithm_description: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub time_complexity: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub space_complexity: Option<String>,
    #[serde(flatten)]
    pub metrics: RawMetrics,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawExactCoordinates {
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub source: Option<Coordinate>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub destination: Option<Coordinate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawDelta {
    pub distance_diff: String,
    pub time_diff: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub temperature: String,
    pub condition: String,
    pub humidity: String,
    pub wind: String,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRoadSummary {
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub road_types: Option<BTreeMap<String, f64>>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub traffic: Option<RawTraffic>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub road_conditions: Option<Vec<String>>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub avoided: Option<Vec<String>>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub preference: Option<String>,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTraffic {
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub level: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub estimated_delay: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub factor: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wrong_field_type_reads_as_absent() {
        let route: InternalRoute = serde_json::from_value(json!({
            "source": "Kingston",
            "destination": 42,
            "route_towns": ["Kingston", 7],
            "execution_time_ms": "fast",
            "nodes_visited": 12,
        }))
        .unwrap();

        assert_eq!(route.source.as_deref(), Some("Kingston"));
        assert_eq!(route.destination, None);
        assert_eq!(route.route_towns, None);
        assert_eq!(route.metrics.execution_time_ms, None);
        assert_eq!(route.metrics.nodes_visited, Some(12));
    }

    #[test]
    fn test_exact_coordinates_are_pairs() {
        let route: ExternalRoute = serde_json::from_value(json!({
            "route": "_p~iF~ps|U",
            "exact_coordinates": {"source": [17.9712, -76.7928], "destination": "nowhere"},
        }))
        .unwrap();

        let exact = route.exact_coordinates.unwrap();
        assert_eq!(exact.source, Some(Coordinate::new(17.9712, -76.7928)));
        assert_eq!(exact.destination, None);
    }

    #[test]
    fn test_request_uses_camel_case_options() {
        let request = CompareRoutesRequest {
            source: "Kingston".to_string(),
            destination: "Ocho Rios".to_string(),
            preference: "fastest".to_string(),
            options: AvoidOptions {
                hilly_roads: true,
                ..AvoidOptions::default()
            },
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["options"]["hillyRoads"], json!(true));
        assert_eq!(body["options"]["innerCity"], json!(false));
    }

    #[test]
    fn test_missing_sections_default() {
        let response: CompareRoutesResponse = serde_json::from_value(json!({
            "our_algorithm": {"best_route": {"source": "A", "destination": "B"}},
            "openrouteservice": "unavailable",
        }))
        .unwrap();
        assert!(response.our_algorithm.is_some());
        assert!(response.openrouteservice.is_none());
    }
}
