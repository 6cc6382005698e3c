//! HTTP client against a WireMock container serving canned backend responses.
//!
//! Needs Docker: `cargo test -- --ignored`.

use std::time::{Duration, Instant};

use testcontainers::core::{IntoContainerPort, Mount, WaitFor};
use testcontainers::runners::SyncRunner;
use testcontainers::{Container, GenericImage, ImageExt, TestcontainersError};

use route_compare::catalog::{FetchSource, load_catalog};
use route_compare::client::{RouteServiceClient, RouteServiceConfig, ServiceError};
use route_compare::payload::{AvoidOptions, CompareRoutesRequest};
use route_compare::pipeline::ComparisonPipeline;

fn wiremock_container() -> Result<(Container<GenericImage>, String), TestcontainersError> {
    let mappings = format!("{}/tests/fixtures/wiremock/mappings", env!("CARGO_MANIFEST_DIR"));

    let image = GenericImage::new("wiremock/wiremock", "3.9.1")
        .with_exposed_port(8080.tcp())
        .with_wait_for(WaitFor::message_on_stdout("port:"))
        .with_mount(Mount::bind_mount(mappings, "/home/wiremock/mappings"))
        .with_startup_timeout(Duration::from_secs(60));

    let container = image.start()?;
    let port = container.get_host_port_ipv4(8080.tcp())?;
    let base_url = format!("http://127.0.0.1:{}", port);

    Ok((container, base_url))
}

fn client(base_url: &str) -> RouteServiceClient {
    let config = RouteServiceConfig {
        base_url: base_url.to_string(),
        timeout_secs: 10,
    };
    RouteServiceClient::new(config).expect("build route service client")
}

/// Retries until the stubs are loaded; WireMock may log its banner first.
fn wait_for_stubs(client: &RouteServiceClient) {
    let start = Instant::now();
    while start.elapsed() < Duration::from_secs(15) {
        if client.available_locations().is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(500));
    }
    panic!("WireMock stubs never became available");
}

fn request(source: &str, destination: &str) -> CompareRoutesRequest {
    CompareRoutesRequest {
        source: source.to_string(),
        destination: destination.to_string(),
        preference: "fastest".to_string(),
        options: AvoidOptions {
            tolls: true,
            ..AvoidOptions::default()
        },
    }
}

#[test]
#[ignore = "requires docker"]
fn catalog_reports_failed_routes_endpoint() {
    let (_container, base_url) = wiremock_container().expect("start WireMock container");
    let client = client(&base_url);
    wait_for_stubs(&client);

    let load = load_catalog(&client).expect("locations endpoint is up");
    assert_eq!(load.catalog.locations.len(), 3);
    let failure = load.failure.expect("routes endpoint is stubbed to fail");
    assert_eq!(failure.failed, FetchSource::AvailableRoutes);
    assert!(failure.message.contains("Route table unavailable"));
}

#[test]
#[ignore = "requires docker"]
fn comparison_round_trip() {
    let (_container, base_url) = wiremock_container().expect("start WireMock container");
    let client = client(&base_url);
    wait_for_stubs(&client);

    let response = client
        .compare_routes(&request("Kingston", "Montego Bay"))
        .expect("comparison succeeds");
    let outcome = ComparisonPipeline::default().run(&response);

    assert!(outcome.is_ready(), "{:?}", outcome.result);
    let report = outcome.report().unwrap();
    assert_eq!(report.scene.descriptor().paths.len(), 1);
    assert_eq!(
        report.analysis.as_ref().unwrap().complexity.time,
        "O((V+E)log V)"
    );
}

#[test]
#[ignore = "requires docker"]
fn unknown_location_is_a_constraint_error() {
    let (_container, base_url) = wiremock_container().expect("start WireMock container");
    let client = client(&base_url);
    wait_for_stubs(&client);

    let err = client
        .compare_routes(&request("Portland", "Montego Bay"))
        .expect_err("Portland is not served");
    assert!(err.is_location_constraint());
    assert_eq!(err.available_locations().len(), 2);
    assert!(matches!(err, ServiceError::Api { status: 400, .. }));
}
