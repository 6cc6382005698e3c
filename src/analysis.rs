//! Algorithm performance analysis.

use std::collections::HashMap;

use serde::Serialize;

use crate::aggregate::ComparisonResult;
use crate::normalize::ExecutionMetrics;

pub const NOT_SPECIFIED: &str = "Not specified";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Complexity {
    pub time: String,
    pub space: String,
}

impl Complexity {
    pub fn new(time: impl Into<String>, space: impl Into<String>) -> Self {
        Self {
            time: time.into(),
            space: space.into(),
        }
    }
}

/// Known asymptotic costs keyed by the algorithm name the backend reports.
#[derive(Debug, Clone)]
pub struct ComplexityTable {
    entries: HashMap<String, Complexity>,
}

impl Default for ComplexityTable {
    fn default() -> Self {
        Self::new([
            ("Dijkstra's Algorithm", Complexity::new("O((V+E)log V)", "O(V)")),
            ("Bellman-Ford", Complexity::new("O(VE)", "O(V)")),
            ("Floyd-Warshall", Complexity::new("O(V³)", "O(V²)")),
            ("A* Search Algorithm", Complexity::new("O(E) with a good heuristic", "O(V)")),
        ])
    }
}

impl ComplexityTable {
    pub fn new<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Complexity)>,
        K: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(|(name, c)| (name.into(), c)).collect(),
        }
    }

    pub fn get(&self, algorithm: &str) -> Option<&Complexity> {
        self.entries.get(algorithm.trim())
    }

    /// Looks up `algorithm`, falling back to "Not specified" for both bounds.
    pub fn lookup(&self, algorithm: Option<&str>) -> Complexity {
        algorithm
            .and_then(|name| self.get(name))
            .cloned()
            .unwrap_or_else(|| Complexity::new(NOT_SPECIFIED, NOT_SPECIFIED))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlgorithmAnalysis {
    pub algorithm: Option<String>,
    pub description: Option<String>,
    pub complexity: Complexity,
    pub primary: Option<ExecutionMetrics>,
    pub alternative: Option<ExecutionMetrics>,
}

/// Builds the performance block for the primary route of `comparison`.
///
/// Complexity strings reported by the algorithm win over the table. Returns
/// `None` when the primary route carries neither an algorithm name nor
/// execution metrics.
pub fn analyze(comparison: &ComparisonResult, table: &ComplexityTable) -> Option<AlgorithmAnalysis> {
    let primary = &comparison.primary;
    if primary.algorithm_name.is_none() && primary.execution_metrics.is_none() {
        return None;
    }

    let fallback = table.lookup(primary.algorithm_name.as_deref());
    let complexity = Complexity {
        time: primary.notes.time_complexity.clone().unwrap_or(fallback.time),
        space: primary.notes.space_complexity.clone().unwrap_or(fallback.space),
    };

    Some(AlgorithmAnalysis {
        algorithm: primary.algorithm_name.clone(),
        description: primary.notes.description.clone(),
        complexity,
        primary: primary.execution_metrics,
        alternative: comparison.alternative.as_ref().and_then(|alt| alt.execution_metrics),
    })
}
