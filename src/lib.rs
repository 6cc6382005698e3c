//! route-compare
//!
//! Turns route comparison responses from a routing backend into a renderable
//! map scene, a road-type breakdown and an algorithm performance summary.

pub mod aggregate;
pub mod analysis;
pub mod bounds;
pub mod catalog;
pub mod client;
pub mod compose;
pub mod coordinate;
pub mod normalize;
pub mod payload;
pub mod pipeline;
pub mod polyline;
pub mod traits;
pub mod waypoints;

pub use coordinate::Coordinate;
pub use pipeline::{ComparisonPipeline, ComparisonReport, Outcome, Stage, run_comparison};
