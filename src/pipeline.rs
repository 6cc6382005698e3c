//! Comparison pipeline.
//!
//! Drives one backend response through normalization, aggregation and scene
//! composition: `Idle -> Normalizing -> Aggregating -> Composing -> Ready`,
//! with `Failed` reachable from any step. A pipeline runs once; retries
//! belong to whoever fetched the response.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::aggregate::{ComparisonResult, RoadSummary, aggregate, summarize_roads};
use crate::analysis::{AlgorithmAnalysis, ComplexityTable, analyze};
use crate::compose::{ComposeOptions, Scene, SceneDescriptor, TextOnlyReason, compose};
use crate::normalize::{
    NormalizeError, RouteIdentity, RouteSummary, SourceKind, normalize_with_identity,
};
use crate::client::ServiceError;
use crate::payload::{CompareRoutesRequest, CompareRoutesResponse, ProviderSection};
use crate::traits::ComparisonSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    Idle,
    Normalizing,
    Aggregating,
    Composing,
    Ready,
    Failed,
}

impl Stage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Ready | Stage::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FailureReason {
    #[error("no route could be identified: {0}")]
    MissingRouteData(NormalizeError),

    #[error("no route has drawable geometry")]
    GeometryUnavailable(TextOnlyReason),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    /// Routes computed by the in-house algorithms.
    pub ours: Option<ComparisonResult>,
    /// Routes computed directly by the routing provider.
    pub provider: Option<ComparisonResult>,
    pub road_summary: Option<RoadSummary>,
    pub analysis: Option<AlgorithmAnalysis>,
    pub scene: Scene,
    /// Recoverable problems met on the way, for a diagnostic panel.
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineFailure {
    pub reason: FailureReason,
    /// What could still be shown, if anything.
    pub partial: Option<ComparisonReport>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Every stage visited, starting with `Idle`.
    pub stages: Vec<Stage>,
    pub result: Result<ComparisonReport, PipelineFailure>,
}

impl Outcome {
    pub fn stage(&self) -> Stage {
        self.stages.last().copied().unwrap_or(Stage::Idle)
    }

    pub fn is_ready(&self) -> bool {
        self.stage() == Stage::Ready
    }

    /// The report to render: the full one when ready, the partial one
    /// otherwise.
    pub fn report(&self) -> Option<&ComparisonReport> {
        match &self.result {
            Ok(report) => Some(report),
            Err(failure) => failure.partial.as_ref(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ComparisonPipeline {
    compose: ComposeOptions,
    complexity: ComplexityTable,
    stages: Vec<Stage>,
}

/// Normalized primary/alternative pair of one backend section.
struct NormalizedPair {
    primary: Result<RouteSummary, NormalizeError>,
    alternative: Option<RouteSummary>,
}

impl Default for ComparisonPipeline {
    fn default() -> Self {
        Self::new(ComposeOptions::default(), ComplexityTable::default())
    }
}

impl ComparisonPipeline {
    pub fn new(compose: ComposeOptions, complexity: ComplexityTable) -> Self {
        Self {
            compose,
            complexity,
            stages: vec![Stage::Idle],
        }
    }

    fn advance(&mut self, stage: Stage) {
        debug!(?stage, "comparison pipeline");
        self.stages.push(stage);
    }

    fn fail(mut self, reason: FailureReason, partial: Option<ComparisonReport>) -> Outcome {
        warn!(%reason, "comparison failed");
        self.advance(Stage::Failed);
        Outcome {
            stages: self.stages,
            result: Err(PipelineFailure { reason, partial }),
        }
    }

    pub fn run(mut self, response: &CompareRoutesResponse) -> Outcome {
        let mut warnings = Vec::new();

        self.advance(Stage::Normalizing);
        let none = RouteIdentity::default();
        let ours = response.our_algorithm.as_ref().map(|section| {
            normalize_pair(
                section.best_route.as_ref(),
                section.alternative_route.as_ref(),
                SourceKind::Internal,
                &none,
                "our_algorithm",
                &mut warnings,
            )
        });
        let provider = response.openrouteservice.as_ref().map(|section| {
            normalize_pair(
                section.best_route.as_ref(),
                section.alternative_route.as_ref(),
                SourceKind::External,
                &none,
                "openrouteservice",
                &mut warnings,
            )
        });

        let identity = [&ours, &provider]
            .into_iter()
            .flatten()
            .find_map(|pair| pair.primary.as_ref().ok())
            .map(RouteSummary::identity);

        let Some(identity) = identity else {
            let err = [ours, provider]
                .into_iter()
                .flatten()
                .find_map(|pair| pair.primary.err())
                .unwrap_or(NormalizeError::MissingRouteData { provider_error: None });
            return self.fail(FailureReason::MissingRouteData(err), None);
        };

        let overlay = response
            .openrouteservice
            .as_ref()
            .and_then(|section| section.visualization.as_ref())
            .map(|vis| {
                normalize_pair(
                    vis.best_route.as_ref(),
                    vis.alternative_route.as_ref(),
                    SourceKind::External,
                    &identity,
                    "visualization",
                    &mut warnings,
                )
            });

        self.advance(Stage::Aggregating);
        let ours = ours.and_then(|pair| pair.into_comparison("our_algorithm", &mut warnings));
        let provider = provider.and_then(|pair| pair.into_comparison("openrouteservice", &mut warnings));
        let overlay = overlay.and_then(|pair| pair.into_comparison("visualization", &mut warnings));

        let road_summary = road_summary(response);
        let analysis = ours.as_ref().and_then(|ours| analyze(ours, &self.complexity));

        self.advance(Stage::Composing);
        // The provider's trace of our route first, then its own routes.
        let candidates = [overlay.as_ref(), provider.as_ref(), ours.as_ref()];
        let scene = compose_first_drawable(candidates.into_iter().flatten(), &self.compose);

        let report = ComparisonReport {
            ours,
            provider,
            road_summary,
            analysis,
            scene,
            warnings,
        };

        if let Scene::TextOnly { reason, .. } = &report.scene {
            let reason = FailureReason::GeometryUnavailable(reason.clone());
            return self.fail(reason, Some(report));
        }

        self.advance(Stage::Ready);
        Outcome {
            stages: self.stages,
            result: Ok(report),
        }
    }
}

/// Fetches a comparison from `source` and runs a pipeline over it.
///
/// Transport and backend errors are returned as is; everything after a
/// successful fetch is reported through the [`Outcome`].
pub fn fetch_and_run<S>(
    source: &S,
    request: &CompareRoutesRequest,
    pipeline: ComparisonPipeline,
) -> Result<Outcome, ServiceError>
where
    S: ComparisonSource,
{
    let response = source.compare_routes(request)?;
    Ok(pipeline.run(&response))
}

/// Convenience wrapper running a default pipeline over a raw response body.
pub fn run_comparison(body: &Value) -> Outcome {
    let response = CompareRoutesResponse::from_value_lenient(body);
    ComparisonPipeline::default().run(&response)
}

impl NormalizedPair {
    fn into_comparison(self, section: &str, warnings: &mut Vec<String>) -> Option<ComparisonResult> {
        let primary = self.primary.ok()?;
        let result = aggregate(primary, self.alternative);
        if let Some(mismatch) = &result.integrity {
            warnings.push(format!("{}: {}", section, mismatch));
        }
        Some(result)
    }
}

fn normalize_pair(
    best: Option<&Value>,
    alternative: Option<&Value>,
    kind: SourceKind,
    fallback: &RouteIdentity,
    section: &str,
    warnings: &mut Vec<String>,
) -> NormalizedPair {
    let primary = match best {
        Some(raw) => normalize_with_identity(raw, kind, fallback),
        None => Err(NormalizeError::MissingRouteData { provider_error: None }),
    };
    if let Err(err) = &primary {
        warn!(section, error = %err, "best route unusable");
        warnings.push(format!("{} best route: {}", section, err));
    }

    // An alternative inherits the primary's identity only for geometry-only
    // payloads; the fallback passed in is empty otherwise.
    let alternative = alternative.and_then(|raw| match normalize_with_identity(raw, kind, fallback) {
        Ok(summary) => Some(summary),
        Err(err) => {
            warn!(section, error = %err, "alternative route unusable");
            warnings.push(format!("{} alternative route: {}", section, err));
            None
        }
    });

    NormalizedPair { primary, alternative }
}

fn road_summary(response: &CompareRoutesResponse) -> Option<RoadSummary> {
    [&response.our_algorithm, &response.openrouteservice]
        .into_iter()
        .flatten()
        .find_map(|section: &ProviderSection| section.road_summary.clone())
        .map(summarize_roads)
}

/// Composes candidates in order and keeps the first one that yields a map.
///
/// When none does, the first text-only scene is returned so its reason
/// describes the preferred source.
fn compose_first_drawable<'a, I>(candidates: I, options: &ComposeOptions) -> Scene
where
    I: IntoIterator<Item = &'a ComparisonResult>,
{
    let mut fallback = None;
    for candidate in candidates {
        let scene = compose(candidate, options);
        if scene.is_map() {
            return scene;
        }
        debug!(route = %candidate.primary.label(), "candidate not drawable");
        fallback.get_or_insert(scene);
    }
    fallback.unwrap_or_else(|| Scene::TextOnly {
        descriptor: SceneDescriptor::default_region(&options.default_region),
        reason: TextOnlyReason::NoGeometry,
    })
}
