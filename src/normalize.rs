//! Route normalization.
//!
//! The backend hands out two differently shaped route objects: one from the
//! in-house shortest path algorithms (town names plus execution metrics) and
//! one from the routing provider (an encoded polyline). Both are read into a
//! tagged [`RoutePayload`] and reduced to one [`RouteSummary`]. Absent fields
//! stay `None`; nothing is filled in from unrelated data.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::coordinate::Coordinate;
use crate::payload::{ExternalRoute, InternalRoute, RawDelta, RawExactCoordinates, RawMetrics, Weather};
use crate::polyline::EncodedPath;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// No source or destination, or the provider reported the route as failed.
    #[error("route data missing{}", provider_suffix(.provider_error))]
    MissingRouteData { provider_error: Option<String> },

    #[error("route starts and ends at {location}")]
    SameEndpoints { location: String },

    #[error("route payload is not a JSON object")]
    NotAnObject,
}

fn provider_suffix(provider_error: &Option<String>) -> String {
    provider_error
        .as_ref()
        .map(|message| format!(" (provider said: {})", message))
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Internal,
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preference {
    Fastest,
    Shortest,
}

impl Preference {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fastest" => Some(Preference::Fastest),
            "shortest" => Some(Preference::Shortest),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Preference::Fastest => "fastest",
            Preference::Shortest => "shortest",
        }
    }
}

/// Ordered path of a route, in whichever form the payload carried it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RoutePath {
    /// Town names, rendered as a textual path only.
    Towns(Vec<String>),
    /// Provider geometry, decoded when the map is composed.
    Encoded(EncodedPath),
    /// Geometry the provider already decoded.
    Points(Vec<Coordinate>),
}

impl RoutePath {
    pub fn has_geometry(&self) -> bool {
        !matches!(self, RoutePath::Towns(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExecutionMetrics {
    pub time_ms: f64,
    pub nodes_visited: Option<u64>,
    pub edge_relaxations: Option<u64>,
    pub operations: Option<u64>,
}

/// Complexity notes the algorithm reported about itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlgorithmNotes {
    pub description: Option<String>,
    pub time_complexity: Option<String>,
    pub space_complexity: Option<String>,
}

/// Relative difference of an alternative route, as formatted by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDelta {
    pub distance_diff: String,
    pub time_diff: String,
}

/// Exact geocoded endpoints, preferred over the ends of the geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Endpoints {
    pub source: Option<Coordinate>,
    pub destination: Option<Coordinate>,
}

/// Source/destination names that identify a route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct RouteIdentity {
    pub source: Option<String>,
    pub destination: Option<String>,
}

impl RouteIdentity {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            destination: Some(destination.into()),
        }
    }

    /// Two identities conflict when a field known on both sides differs.
    pub fn conflicts_with(&self, other: &RouteIdentity) -> bool {
        fn differs(a: &Option<String>, b: &Option<String>) -> bool {
            matches!((a, b), (Some(a), Some(b)) if a.trim() != b.trim())
        }
        differs(&self.source, &other.source) || differs(&self.destination, &other.destination)
    }
}

/// Canonical route summary shared by both payload kinds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSummary {
    pub kind: SourceKind,
    pub source: Option<String>,
    pub destination: Option<String>,
    pub preference: Option<Preference>,
    pub distance_text: Option<String>,
    pub time_text: Option<String>,
    pub algorithm_name: Option<String>,
    pub path: Option<RoutePath>,
    pub endpoints: Endpoints,
    pub execution_metrics: Option<ExecutionMetrics>,
    pub notes: AlgorithmNotes,
    pub delta: Option<RouteDelta>,
    pub weather: Option<Weather>,
    pub used_highway_despite_avoidance: Option<bool>,
}

impl RouteSummary {
    pub fn identity(&self) -> RouteIdentity {
        RouteIdentity {
            source: self.source.clone(),
            destination: self.destination.clone(),
        }
    }

    /// Human label such as "Kingston to Montego Bay".
    pub fn label(&self) -> String {
        match (&self.source, &self.destination) {
            (Some(source), Some(destination)) => format!("{} to {}", source, destination),
            (Some(source), None) => format!("From {}", source),
            (None, Some(destination)) => format!("To {}", destination),
            (None, None) => "Route".to_string(),
        }
    }
}

/// A raw route tagged with the shape it was read as.
#[derive(Debug, Clone)]
pub enum RoutePayload {
    Internal(InternalRoute),
    External(ExternalRoute),
}

impl RoutePayload {
    pub fn from_value(raw: &Value, kind: SourceKind) -> Result<Self, NormalizeError> {
        if !raw.is_object() {
            return Err(NormalizeError::NotAnObject);
        }
        // Every field is optional and tolerant of type errors, so an object
        // always deserializes.
        let payload = match kind {
            SourceKind::Internal => {
                RoutePayload::Internal(InternalRoute::deserialize(raw).map_err(|_| NormalizeError::NotAnObject)?)
            }
            SourceKind::External => {
                RoutePayload::External(ExternalRoute::deserialize(raw).map_err(|_| NormalizeError::NotAnObject)?)
            }
        };
        Ok(payload)
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            RoutePayload::Internal(_) => SourceKind::Internal,
            RoutePayload::External(_) => SourceKind::External,
        }
    }

    pub fn normalize(self) -> Result<RouteSummary, NormalizeError> {
        self.normalize_with_identity(&RouteIdentity::default())
    }

    /// Normalizes the payload, taking a missing source or destination from
    /// `fallback`. Geometry-only payloads use this to inherit the identity of
    /// the route they trace.
    pub fn normalize_with_identity(self, fallback: &RouteIdentity) -> Result<RouteSummary, NormalizeError> {
        let summary = match self {
            RoutePayload::Internal(route) => normalize_internal(route, fallback)?,
            RoutePayload::External(route) => normalize_external(route, fallback)?,
        };
        debug!(
            kind = ?summary.kind,
            route = %summary.label(),
            has_path = summary.path.is_some(),
            "normalized route"
        );
        Ok(summary)
    }
}

/// Reads `raw` as a route of the given kind and normalizes it.
pub fn normalize(raw: &Value, kind: SourceKind) -> Result<RouteSummary, NormalizeError> {
    RoutePayload::from_value(raw, kind)?.normalize()
}

/// Like [`normalize`], inheriting a missing source or destination from `fallback`.
pub fn normalize_with_identity(
    raw: &Value,
    kind: SourceKind,
    fallback: &RouteIdentity,
) -> Result<RouteSummary, NormalizeError> {
    RoutePayload::from_value(raw, kind)?.normalize_with_identity(fallback)
}

fn normalize_internal(route: InternalRoute, fallback: &RouteIdentity) -> Result<RouteSummary, NormalizeError> {
    let (source, destination) = resolve_identity(
        non_blank(route.source).or(non_blank(route.original_source)),
        non_blank(route.destination).or(non_blank(route.original_destination)),
        fallback,
    )?;

    let path = non_empty(route.detailed_route)
        .or(non_empty(route.route_towns))
        .map(RoutePath::Towns);

    let analysis = route.analysis.unwrap_or_default();
    let execution_metrics = execution_metrics(&route.metrics, &analysis.metrics, &source);

    Ok(RouteSummary {
        kind: SourceKind::Internal,
        preference: preference(route.preference),
        distance_text: non_blank(route.distance),
        time_text: non_blank(route.time),
        algorithm_name: non_blank(route.algorithm).or(non_blank(analysis.algorithm)),
        path,
        endpoints: endpoints(route.exact_coordinates),
        execution_metrics,
        notes: AlgorithmNotes {
            description: non_blank(analysis.algorithm_description),
            time_complexity: non_blank(analysis.time_complexity),
            space_complexity: non_blank(analysis.space_complexity),
        },
        delta: route.comparison.map(delta),
        weather: route.weather,
        used_highway_despite_avoidance: route.used_highway_despite_avoidance,
        source,
        destination,
    })
}

fn normalize_external(route: ExternalRoute, fallback: &RouteIdentity) -> Result<RouteSummary, NormalizeError> {
    // A failed provider call never becomes a summary, even with a known identity.
    if let Some(message) = non_blank(route.error) {
        warn!(provider_error = %message, "provider reported a failed route");
        return Err(NormalizeError::MissingRouteData {
            provider_error: Some(message),
        });
    }

    let (source, destination) =
        resolve_identity(non_blank(route.source), non_blank(route.destination), fallback)?;

    let path = non_blank(route.route)
        .map(|encoded| RoutePath::Encoded(EncodedPath::new(encoded)))
        .or_else(|| decoded_points(route.decoded_route, &source).map(RoutePath::Points))
        .or_else(|| non_empty(route.detailed_route).map(RoutePath::Towns));

    Ok(RouteSummary {
        kind: SourceKind::External,
        preference: preference(route.preference),
        distance_text: non_blank(route.distance),
        time_text: non_blank(route.time),
        algorithm_name: None,
        path,
        endpoints: endpoints(route.exact_coordinates),
        execution_metrics: None,
        notes: AlgorithmNotes::default(),
        delta: route.comparison.map(delta),
        weather: None,
        used_highway_despite_avoidance: None,
        source,
        destination,
    })
}

fn resolve_identity(
    source: Option<String>,
    destination: Option<String>,
    fallback: &RouteIdentity,
) -> Result<(Option<String>, Option<String>), NormalizeError> {
    let source = source.or_else(|| fallback.source.clone());
    let destination = destination.or_else(|| fallback.destination.clone());

    match (&source, &destination) {
        (None, None) => Err(NormalizeError::MissingRouteData { provider_error: None }),
        (Some(s), Some(d)) if s.trim() == d.trim() => Err(NormalizeError::SameEndpoints {
            location: s.trim().to_string(),
        }),
        _ => Ok((source, destination)),
    }
}

fn execution_metrics(top: &RawMetrics, nested: &RawMetrics, source: &Option<String>) -> Option<ExecutionMetrics> {
    let time_ms = top.execution_time_ms.or(nested.execution_time_ms);
    let nodes_visited = top.nodes_visited.or(nested.nodes_visited);
    let edge_relaxations = top.edge_relaxations.or(nested.edge_relaxations);
    let operations = top.operations.or(nested.operations);

    match time_ms {
        Some(time_ms) if time_ms.is_finite() && time_ms >= 0.0 => Some(ExecutionMetrics {
            time_ms,
            nodes_visited,
            edge_relaxations,
            operations,
        }),
        Some(time_ms) => {
            warn!(?source, time_ms, "dropping invalid execution time");
            None
        }
        None => {
            if nodes_visited.is_some() || edge_relaxations.is_some() || operations.is_some() {
                debug!(?source, "execution counters without an execution time");
            }
            None
        }
    }
}

fn decoded_points(points: Option<Vec<Coordinate>>, source: &Option<String>) -> Option<Vec<Coordinate>> {
    let points = non_empty(points)?;
    if points.iter().all(Coordinate::is_valid) {
        Some(points)
    } else {
        warn!(?source, "ignoring decoded route with out of range points");
        None
    }
}

fn endpoints(raw: Option<RawExactCoordinates>) -> Endpoints {
    let raw = raw.unwrap_or_default();
    Endpoints {
        source: raw.source.filter(Coordinate::is_valid),
        destination: raw.destination.filter(Coordinate::is_valid),
    }
}

fn preference(raw: Option<String>) -> Option<Preference> {
    let raw = raw?;
    let parsed = Preference::parse(&raw);
    if parsed.is_none() {
        warn!(preference = %raw, "unknown route preference");
    }
    parsed
}

fn delta(raw: RawDelta) -> RouteDelta {
    RouteDelta {
        distance_diff: raw.distance_diff,
        time_diff: raw.time_diff,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn non_empty<T>(value: Option<Vec<T>>) -> Option<Vec<T>> {
    value.filter(|v| !v.is_empty())
}
