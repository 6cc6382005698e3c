//! Test fixtures for route-compare.
//!
//! Real Jamaican town coordinates plus builders for backend payloads.

#![allow(dead_code)]

pub mod jamaica_locations;

pub use jamaica_locations::*;

use route_compare::Coordinate;
use route_compare::polyline::{DEFAULT_PRECISION, encode};
use serde_json::{Value, json};

/// Internal-algorithm route travelling through `towns`.
pub fn internal_route(towns: &[Town], algorithm: &str, execution_time_ms: f64) -> Value {
    let first = towns[0];
    let last = towns[towns.len() - 1];
    json!({
        "source": first.name,
        "destination": last.name,
        "preference": "fastest",
        "distance": "185.3 km",
        "time": "3h 12m",
        "algorithm": algorithm,
        "route_towns": names(towns),
        "execution_time_ms": execution_time_ms,
        "nodes_visited": 14,
        "edge_relaxations": 31,
        "exact_coordinates": {
            "source": [first.position.lat, first.position.lng],
            "destination": [last.position.lat, last.position.lng],
        },
    })
}

/// Provider geometry for `coords`, without any route identity.
pub fn encoded_geometry(coords: &[Coordinate]) -> Value {
    json!({
        "route": encode(coords, DEFAULT_PRECISION),
        "distance": "50 km",
        "time": "1h",
    })
}

/// Provider route with identity and encoded geometry.
pub fn provider_route(towns: &[Town], distance: &str, time: &str) -> Value {
    let mut route = encoded_geometry(&positions(towns));
    route["source"] = json!(towns[0].name);
    route["destination"] = json!(towns[towns.len() - 1].name);
    route["preference"] = json!("fastest");
    route["distance"] = json!(distance);
    route["time"] = json!(time);
    route
}

pub fn road_summary() -> Value {
    json!({
        "road_types": {"highway": 45, "primary": 8, "secondary": 40, "tertiary": 7},
        "traffic": {"level": "moderate", "estimated_delay": "10-15 minutes", "factor": 1.2},
        "road_conditions": ["Construction near May Pen"],
        "avoided": ["tolls"],
    })
}

/// Full compare-routes body: our algorithm over the south coast, the
/// provider's trace of it, and the provider's own routes.
pub fn full_comparison() -> Value {
    let mut alternative = internal_route(NORTH_COAST, "Dijkstra's Algorithm", 9.75);
    alternative["comparison"] = json!({"distance_diff": "+12.4 km", "time_diff": "+18 min"});

    json!({
        "our_algorithm": {
            "best_route": internal_route(SOUTH_COAST, "A* Search Algorithm", 12.4),
            "alternative_route": alternative,
        },
        "openrouteservice": {
            "best_route": provider_route(SOUTH_COAST, "181 km", "3h 5m"),
            "alternative_route": provider_route(NORTH_COAST, "196 km", "3h 30m"),
            "road_summary": road_summary(),
            "visualization": {
                "best_route": encoded_geometry(&positions(SOUTH_COAST)),
                "alternative_route": encoded_geometry(&positions(NORTH_COAST)),
            },
        },
    })
}
