//! Seams between the comparison core and the backend that feeds it.
//!
//! The HTTP client implements these; tests substitute in-memory sources.

use crate::client::ServiceError;
use crate::payload::{CompareRoutesRequest, CompareRoutesResponse, LocationEntry, RouteEntry};

/// Supplies the location and route pickers.
pub trait CatalogSource {
    fn fetch_locations(&self) -> Result<Vec<LocationEntry>, ServiceError>;

    fn fetch_routes(&self) -> Result<Vec<RouteEntry>, ServiceError>;
}

/// Computes a route comparison for a request.
pub trait ComparisonSource {
    fn compare_routes(&self, request: &CompareRoutesRequest) -> Result<CompareRoutesResponse, ServiceError>;
}
