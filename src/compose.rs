//! Scene composition for the route map.
//!
//! Turns a [`ComparisonResult`] into a render-ready description: decoded
//! paths, start/end/waypoint markers, the fitted region and legend entries.
//! When no route yields drawable geometry the result is a [`Scene::TextOnly`]
//! over the default region, never an empty map.

use serde::Serialize;
use tracing::{debug, warn};

use crate::aggregate::ComparisonResult;
use crate::bounds::{Bounds, Padding, Viewport, fit_bounds};
use crate::coordinate::Coordinate;
use crate::normalize::{RoutePath, RouteSummary};
use crate::polyline::DecodeError;
use crate::waypoints::sample;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PathStyle {
    Primary,
    Alternative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Start,
    End,
    Waypoint,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerStyle {
    pub icon_size: (u32, u32),
    pub icon_anchor: (u32, u32),
    pub popup_anchor: (i32, i32),
    pub class_name: String,
}

impl MarkerStyle {
    /// Pin-shaped icon anchored at its bottom centre.
    pub fn pin(width: u32, height: u32, class_name: impl Into<String>) -> Self {
        Self {
            icon_size: (width, height),
            icon_anchor: (width / 2, height),
            popup_anchor: (0, -(height as i32)),
            class_name: class_name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: String,
    pub weight: u32,
    pub opacity: f64,
    pub dash_array: Option<String>,
}

/// Immutable style configuration handed to the composer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleTable {
    pub start: MarkerStyle,
    pub end: MarkerStyle,
    pub waypoint: MarkerStyle,
    pub primary: LineStyle,
    pub alternative: LineStyle,
}

impl Default for StyleTable {
    fn default() -> Self {
        Self {
            start: MarkerStyle::pin(30, 46, "start-marker"),
            end: MarkerStyle::pin(30, 46, "end-marker"),
            waypoint: MarkerStyle::pin(20, 33, "waypoint-marker"),
            primary: LineStyle {
                color: "blue".to_string(),
                weight: 5,
                opacity: 0.9,
                dash_array: None,
            },
            alternative: LineStyle {
                color: "green".to_string(),
                weight: 4,
                opacity: 0.8,
                dash_array: Some("10, 5".to_string()),
            },
        }
    }
}

impl StyleTable {
    pub fn marker(&self, kind: MarkerKind) -> &MarkerStyle {
        match kind {
            MarkerKind::Start => &self.start,
            MarkerKind::End => &self.end,
            MarkerKind::Waypoint => &self.waypoint,
        }
    }

    pub fn line(&self, style: PathStyle) -> &LineStyle {
        match style {
            PathStyle::Primary => &self.primary,
            PathStyle::Alternative => &self.alternative,
        }
    }
}

/// Region shown when there is nothing to fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DefaultRegion {
    pub center: Coordinate,
    pub zoom: u8,
    pub bounds: Bounds,
}

impl Default for DefaultRegion {
    fn default() -> Self {
        // Whole island of Jamaica.
        Self {
            center: Coordinate::new(18.1096, -77.2975),
            zoom: 8,
            bounds: Bounds {
                south_west: Coordinate::new(17.70, -78.40),
                north_east: Coordinate::new(18.53, -76.18),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposeOptions {
    pub padding: Padding,
    pub viewport: Viewport,
    pub waypoints_per_route: usize,
    pub default_region: DefaultRegion,
    pub styles: StyleTable,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            padding: Padding::default(),
            viewport: Viewport::default(),
            waypoints_per_route: 2,
            default_region: DefaultRegion::default(),
            styles: StyleTable::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenePath {
    pub coords: Vec<Coordinate>,
    pub style: PathStyle,
    pub line: LineStyle,
    pub popup: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub position: Coordinate,
    pub kind: MarkerKind,
    pub label: String,
    pub style: MarkerStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: String,
    pub dashed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneDescriptor {
    pub center: Coordinate,
    /// Fixed zoom for the default region; fitted scenes zoom to `bounds`.
    pub zoom: Option<u8>,
    pub bounds: Bounds,
    pub paths: Vec<ScenePath>,
    pub markers: Vec<Marker>,
    pub legend: Vec<LegendEntry>,
}

impl SceneDescriptor {
    pub(crate) fn default_region(region: &DefaultRegion) -> Self {
        Self {
            center: region.center,
            zoom: Some(region.zoom),
            bounds: region.bounds,
            paths: Vec::new(),
            markers: Vec::new(),
            legend: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TextOnlyReason {
    /// Every route is a town list or has no path at all.
    NoGeometry,
    /// Every route with geometry failed to decode.
    DecodeFailed { errors: Vec<DecodeError> },
    /// Geometry decoded to zero points.
    EmptyGeometry,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Scene {
    Map(SceneDescriptor),
    /// The map should be suppressed; show the textual route summary instead.
    TextOnly {
        descriptor: SceneDescriptor,
        reason: TextOnlyReason,
    },
}

impl Scene {
    pub fn descriptor(&self) -> &SceneDescriptor {
        match self {
            Scene::Map(descriptor) => descriptor,
            Scene::TextOnly { descriptor, .. } => descriptor,
        }
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Scene::Map(_))
    }
}

struct DrawnRoute<'a> {
    summary: &'a RouteSummary,
    style: PathStyle,
    coords: Vec<Coordinate>,
}

/// Builds the map scene for a comparison.
pub fn compose(comparison: &ComparisonResult, options: &ComposeOptions) -> Scene {
    let candidates = std::iter::once((&comparison.primary, PathStyle::Primary))
        .chain(comparison.alternative.iter().map(|alt| (alt, PathStyle::Alternative)));

    let mut drawn = Vec::new();
    let mut errors = Vec::new();
    let mut saw_geometry = false;

    for (summary, style) in candidates {
        let coords = match &summary.path {
            Some(RoutePath::Encoded(encoded)) => match encoded.decode() {
                Ok(polyline) => polyline.into_points(),
                Err(err) => {
                    warn!(route = %summary.label(), ?style, error = %err, "route geometry failed to decode");
                    saw_geometry = true;
                    errors.push(err);
                    continue;
                }
            },
            Some(RoutePath::Points(points)) => points.clone(),
            Some(RoutePath::Towns(_)) | None => continue,
        };
        saw_geometry = true;
        if coords.is_empty() {
            continue;
        }
        drawn.push(DrawnRoute { summary, style, coords });
    }

    if drawn.is_empty() {
        let reason = if !errors.is_empty() {
            TextOnlyReason::DecodeFailed { errors }
        } else if saw_geometry {
            TextOnlyReason::EmptyGeometry
        } else {
            TextOnlyReason::NoGeometry
        };
        debug!(?reason, "no drawable geometry, falling back to text");
        return text_only(options, reason);
    }

    let sets: Vec<&[Coordinate]> = drawn.iter().map(|route| route.coords.as_slice()).collect();
    let bounds = match fit_bounds(&sets, options.padding, options.viewport) {
        Ok(bounds) => bounds,
        Err(_) => return text_only(options, TextOnlyReason::EmptyGeometry),
    };

    let paths = drawn
        .iter()
        .map(|route| ScenePath {
            coords: route.coords.clone(),
            style: route.style,
            line: options.styles.line(route.style).clone(),
            popup: path_popup(route, comparison),
        })
        .collect();

    let markers = markers(&comparison.primary, &drawn, options);
    let legend = legend(&drawn, &markers, &options.styles);

    debug!(
        paths = drawn.len(),
        markers = markers.len(),
        "composed route scene"
    );

    Scene::Map(SceneDescriptor {
        center: bounds.center(),
        zoom: None,
        bounds,
        paths,
        markers,
        legend,
    })
}

fn text_only(options: &ComposeOptions, reason: TextOnlyReason) -> Scene {
    Scene::TextOnly {
        descriptor: SceneDescriptor::default_region(&options.default_region),
        reason,
    }
}

fn markers(primary: &RouteSummary, drawn: &[DrawnRoute<'_>], options: &ComposeOptions) -> Vec<Marker> {
    let styles = &options.styles;
    // Exact geocoded endpoints win over the ends of the first drawn path.
    let first = &drawn[0];
    let start = primary.endpoints.source.or_else(|| first.coords.first().copied());
    let end = primary.endpoints.destination.or_else(|| first.coords.last().copied());

    let mut markers = Vec::new();
    if let Some(position) = start {
        markers.push(Marker {
            position,
            kind: MarkerKind::Start,
            label: format!("Start: {}", primary.source.as_deref().unwrap_or("unknown")),
            style: styles.marker(MarkerKind::Start).clone(),
        });
    }
    if let Some(position) = end {
        markers.push(Marker {
            position,
            kind: MarkerKind::End,
            label: format!("End: {}", primary.destination.as_deref().unwrap_or("unknown")),
            style: styles.marker(MarkerKind::End).clone(),
        });
    }

    for route in drawn {
        markers.extend(
            sample(&route.coords, options.waypoints_per_route)
                .into_iter()
                .map(|waypoint| Marker {
                    position: waypoint.position,
                    kind: MarkerKind::Waypoint,
                    label: match route.style {
                        PathStyle::Primary => waypoint.label,
                        PathStyle::Alternative => format!("Alternative {}", waypoint.label.to_lowercase()),
                    },
                    style: styles.marker(MarkerKind::Waypoint).clone(),
                }),
        );
    }

    markers
}

fn legend(drawn: &[DrawnRoute<'_>], markers: &[Marker], styles: &StyleTable) -> Vec<LegendEntry> {
    let mut entries: Vec<LegendEntry> = drawn
        .iter()
        .map(|route| {
            let line = styles.line(route.style);
            LegendEntry {
                label: match route.style {
                    PathStyle::Primary => "Best Route".to_string(),
                    PathStyle::Alternative => "Alternative Route".to_string(),
                },
                color: line.color.clone(),
                dashed: line.dash_array.is_some(),
            }
        })
        .collect();

    if markers.iter().any(|marker| marker.kind == MarkerKind::Waypoint) {
        entries.push(LegendEntry {
            label: "Waypoints".to_string(),
            color: styles.primary.color.clone(),
            dashed: false,
        });
    }

    entries
}

fn path_popup(route: &DrawnRoute<'_>, comparison: &ComparisonResult) -> String {
    let summary = route.summary;
    let title = match route.style {
        PathStyle::Primary => "Best Route",
        PathStyle::Alternative => "Alternative Route",
    };

    let mut lines = vec![title.to_string()];
    if let Some(distance) = &summary.distance_text {
        lines.push(format!("Distance: {}", distance));
    }
    if let Some(time) = &summary.time_text {
        lines.push(format!("Time: {}", time));
    }
    if let Some(preference) = summary.preference {
        lines.push(format!("Preference: {}", preference.as_str()));
    }
    if route.style == PathStyle::Alternative {
        if let Some(delta) = &comparison.delta {
            lines.push(format!(
                "Difference: {} distance, {} time",
                delta.distance_diff, delta.time_diff
            ));
        }
    }
    lines.join("\n")
}
