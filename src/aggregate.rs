//! Comparison assembly and road summaries.
//!
//! Nothing here does arithmetic on the backend's numbers: deltas and road
//! type percentages are passed through as received and only arranged for
//! display.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::normalize::{RouteDelta, RouteIdentity, RouteSummary};
use crate::payload::{RawRoadSummary, RawTraffic};

/// Segments at or under this share carry no inline percentage label.
pub const LABEL_THRESHOLD_PERCENT: f64 = 10.0;

/// Sentinel the backend puts in `avoided` when nothing is avoided.
const NOTHING_AVOIDED: &str = "None";

/// Primary and alternative routes disagree on where they go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("alternative route {alternative:?} does not match primary route {primary:?}")]
pub struct DataIntegrityMismatch {
    pub primary: RouteIdentity,
    pub alternative: RouteIdentity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub primary: RouteSummary,
    pub alternative: Option<RouteSummary>,
    /// Present only together with `alternative`.
    pub delta: Option<RouteDelta>,
    pub integrity: Option<DataIntegrityMismatch>,
}

impl ComparisonResult {
    pub fn routes(&self) -> impl Iterator<Item = &RouteSummary> {
        std::iter::once(&self.primary).chain(self.alternative.as_ref())
    }
}

/// Pairs a primary route with its optional alternative.
///
/// A source/destination mismatch is flagged on the result; both routes are
/// still returned as received.
pub fn aggregate(primary: RouteSummary, alternative: Option<RouteSummary>) -> ComparisonResult {
    let integrity = alternative.as_ref().and_then(|alternative| {
        let (p, a) = (primary.identity(), alternative.identity());
        if p.conflicts_with(&a) {
            warn!(primary = %primary.label(), alternative = %alternative.label(), "route identity mismatch");
            Some(DataIntegrityMismatch {
                primary: p,
                alternative: a,
            })
        } else {
            None
        }
    });
    let delta = alternative.as_ref().and_then(|alternative| alternative.delta.clone());

    ComparisonResult {
        primary,
        alternative,
        delta,
        integrity,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoadType {
    Highway,
    Primary,
    Secondary,
    Tertiary,
    #[serde(untagged)]
    Other(String),
}

impl RoadType {
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "highway" => RoadType::Highway,
            "primary" => RoadType::Primary,
            "secondary" => RoadType::Secondary,
            "tertiary" => RoadType::Tertiary,
            other => RoadType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RoadType::Highway => "highway",
            RoadType::Primary => "primary",
            RoadType::Secondary => "secondary",
            RoadType::Tertiary => "tertiary",
            RoadType::Other(name) => name,
        }
    }
}

impl fmt::Display for RoadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrafficLevel {
    Light,
    Moderate,
    Heavy,
}

impl TrafficLevel {
    pub fn parse(level: &str) -> Option<Self> {
        match level.trim().to_ascii_lowercase().as_str() {
            "light" => Some(TrafficLevel::Light),
            "moderate" => Some(TrafficLevel::Moderate),
            "heavy" => Some(TrafficLevel::Heavy),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Traffic {
    pub level: TrafficLevel,
    pub estimated_delay: String,
    pub factor: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoadSummary {
    pub road_type_percentages: BTreeMap<RoadType, f64>,
    pub traffic: Option<Traffic>,
    pub advisories: Vec<String>,
    pub avoided: Vec<String>,
    pub preference_note: Option<String>,
}

/// One segment of the proportional road type bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSegment {
    pub road_type: RoadType,
    pub percentage: f64,
    /// Inline text, only for segments wide enough to hold it.
    pub label: Option<String>,
    /// Hover text, always present.
    pub title: String,
}

impl RoadSummary {
    /// Arranges the percentages into bar segments in road type order.
    pub fn bar_segments(&self) -> Vec<BarSegment> {
        self.road_type_percentages
            .iter()
            .map(|(road_type, &percentage)| BarSegment {
                road_type: road_type.clone(),
                percentage,
                label: (percentage > LABEL_THRESHOLD_PERCENT).then(|| format!("{}%", format_percent(percentage))),
                title: format!("{}: {}%", road_type, format_percent(percentage)),
            })
            .collect()
    }

    /// Advisory lines as shown, including the "Avoiding: ..." line.
    pub fn advisory_lines(&self) -> Vec<String> {
        let mut lines = self.advisories.clone();
        if !self.avoided.is_empty() {
            lines.push(format!("Avoiding: {}", self.avoided.join(", ")));
        }
        lines
    }
}

/// Builds the road summary block from the backend's raw summary.
pub fn summarize_roads(raw: RawRoadSummary) -> RoadSummary {
    let mut road_type_percentages = BTreeMap::new();
    for (name, percentage) in raw.road_types.unwrap_or_default() {
        if !percentage.is_finite() || percentage < 0.0 {
            warn!(road_type = %name, percentage, "dropping invalid road type share");
            continue;
        }
        // Keys that collapse onto the same road type keep the first value.
        road_type_percentages.entry(RoadType::parse(&name)).or_insert(percentage);
    }

    let total: f64 = road_type_percentages.values().sum();
    if total > 100.0 + f64::EPSILON {
        warn!(total, "road type shares exceed 100%");
    }

    let avoided = raw
        .avoided
        .unwrap_or_default()
        .into_iter()
        .filter(|entry| entry != NOTHING_AVOIDED && !entry.trim().is_empty())
        .collect();

    RoadSummary {
        road_type_percentages,
        traffic: raw.traffic.and_then(traffic),
        advisories: raw.road_conditions.unwrap_or_default(),
        avoided,
        preference_note: raw.preference.filter(|note| !note.trim().is_empty()),
    }
}

fn traffic(raw: RawTraffic) -> Option<Traffic> {
    let level = raw.level?;
    let Some(parsed) = TrafficLevel::parse(&level) else {
        warn!(level = %level, "unknown traffic level");
        return None;
    };
    Some(Traffic {
        level: parsed,
        estimated_delay: raw.estimated_delay.unwrap_or_default(),
        factor: raw.factor,
    })
}

fn format_percent(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}
