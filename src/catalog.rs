//! Location and route catalog loading.
//!
//! Both lists are fetched in parallel. Losing one of them degrades the
//! pickers; losing both is an error.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::payload::{LocationEntry, RouteEntry};
use crate::traits::CatalogSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FetchSource {
    AvailableLocations,
    AvailableRoutes,
}

impl FetchSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchSource::AvailableLocations => "available-locations",
            FetchSource::AvailableRoutes => "available-routes",
        }
    }
}

/// One of the two catalog fetches failed; the other one is usable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("failed to load {}: {message}", failed.as_str())]
pub struct PartialFetchError {
    pub failed: FetchSource,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("failed to load catalog: locations: {locations}; routes: {routes}")]
    BothFailed { locations: String, routes: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    pub locations: Vec<LocationEntry>,
    pub routes: Vec<RouteEntry>,
}

impl Catalog {
    /// Routes whose display text contains `term`, ignoring case. A blank term
    /// matches everything.
    pub fn filter_routes(&self, term: &str) -> Vec<&RouteEntry> {
        let term = term.trim().to_lowercase();
        self.routes
            .iter()
            .filter(|route| term.is_empty() || route.display.to_lowercase().contains(&term))
            .collect()
    }

    pub fn location(&self, id: &str) -> Option<&LocationEntry> {
        self.locations.iter().find(|location| location.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogLoad {
    pub catalog: Catalog,
    pub failure: Option<PartialFetchError>,
}

impl CatalogLoad {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// Fetches both lists concurrently and joins the results.
pub fn load_catalog<S>(source: &S) -> Result<CatalogLoad, CatalogError>
where
    S: CatalogSource + Sync,
{
    let (locations, routes) = rayon::join(|| source.fetch_locations(), || source.fetch_routes());

    let load = match (locations, routes) {
        (Ok(locations), Ok(routes)) => CatalogLoad {
            catalog: Catalog { locations, routes },
            failure: None,
        },
        (Ok(locations), Err(err)) => partial(
            Catalog {
                locations,
                routes: Vec::new(),
            },
            FetchSource::AvailableRoutes,
            err.to_string(),
        ),
        (Err(err), Ok(routes)) => partial(
            Catalog {
                locations: Vec::new(),
                routes,
            },
            FetchSource::AvailableLocations,
            err.to_string(),
        ),
        (Err(locations), Err(routes)) => {
            let err = CatalogError::BothFailed {
                locations: locations.to_string(),
                routes: routes.to_string(),
            };
            warn!(error = %err, "catalog unavailable");
            return Err(err);
        }
    };

    debug!(
        locations = load.catalog.locations.len(),
        routes = load.catalog.routes.len(),
        complete = load.is_complete(),
        "catalog loaded"
    );
    Ok(load)
}

fn partial(catalog: Catalog, failed: FetchSource, message: String) -> CatalogLoad {
    let failure = PartialFetchError { failed, message };
    warn!(error = %failure, "catalog partially loaded");
    CatalogLoad {
        catalog,
        failure: Some(failure),
    }
}
