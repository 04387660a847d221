//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: config → client → paginated requests → scoped records

use base64::Engine as _;
use futures::StreamExt;
use pretty_assertions::assert_eq;
use satellite_client::error::Error;
use satellite_client::{
    Errata, Host, HostPackage, HostQuery, HostScope, SatelliteClient, SatelliteConfig, Scoped,
};
use serde_json::{json, Value};
use std::io::Write;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helpers
// ============================================================================

fn config_yaml(server: &MockServer) -> String {
    format!(
        r#"
endpoint: {}
username: admin
password: changeme
organisation: "1"
location: "2"
http:
  rate_limit:
    enabled: false
"#,
        server.uri()
    )
}

fn client(server: &MockServer) -> SatelliteClient {
    let config = SatelliteConfig::from_yaml(&config_yaml(server)).unwrap();
    SatelliteClient::from_config(config).unwrap()
}

/// Serve one page of a collection
async fn mount_page(
    server: &MockServer,
    endpoint: &str,
    page: u32,
    cursor: Value,
    per_page: u64,
    total: u64,
    results: Value,
) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": total,
            "subtotal": total,
            "page": cursor,
            "per_page": per_page,
            "search": null,
            "sort": {"by": null, "order": null},
            "results": results
        })))
        .expect(1)
        .mount(server)
        .await;
}

fn packages(ids: std::ops::Range<u64>) -> Value {
    Value::Array(
        ids.map(|id| {
            json!({
                "id": id,
                "name": format!("pkg{id}"),
                "nvrea": format!("pkg{id}-1.{id}-3.el9.x86_64"),
                "nvra": format!("pkg{id}-1.{id}-3.el9.x86_64")
            })
        })
        .collect(),
    )
}

async fn mount_host_search(server: &MockServer, name: &str, hosts: Value) {
    let count = hosts.as_array().map_or(0, Vec::len);
    Mock::given(method("GET"))
        .and(path("/api/hosts"))
        .and(query_param("search", format!("name=\"{name}\"")))
        .and(query_param("thin", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": count,
            "subtotal": count,
            "page": 1,
            "per_page": 20,
            "results": hosts
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn requests_to(server: &MockServer, endpoint: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == endpoint)
        .count()
}

// ============================================================================
// Host Packages
// ============================================================================

#[tokio::test]
async fn test_packages_by_host_name() {
    let server = MockServer::start().await;
    mount_host_search(&server, "web01", json!([{"id": 7, "name": "web01"}])).await;

    let endpoint = "/api/hosts/7/packages";
    mount_page(&server, endpoint, 1, json!("1"), 2, 5, packages(0..2)).await;
    mount_page(&server, endpoint, 2, json!("2"), 2, 5, packages(2..4)).await;
    mount_page(&server, endpoint, 3, json!("3"), 2, 5, packages(4..5)).await;

    let stream = client(&server)
        .list_host_packages(HostScope::Name("web01".into()), CancellationToken::new())
        .await
        .unwrap();
    let records: Vec<Scoped<HostPackage>> = stream.map(|r| r.unwrap()).collect().await;

    assert_eq!(records.len(), 5);
    let ids: Vec<i64> = records.iter().map(|r| r.record.id).collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    assert!(records.iter().all(|r| r.host_id() == Some(7)));
    assert_eq!(records[3].record.version().as_deref(), Some("1.3"));
    assert_eq!(records[3].record.arch().as_deref(), Some("x86_64"));

    let flat = serde_json::to_value(&records[0]).unwrap();
    assert_eq!(flat["host_id"], 7);
    assert_eq!(flat["host_name"], "web01");
    assert_eq!(flat["nvra"], "pkg0-1.0-3.el9.x86_64");
}

#[tokio::test]
async fn test_packages_across_all_hosts() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/api/hosts",
        1,
        json!(1),
        20,
        2,
        json!([{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]),
    )
    .await;
    mount_page(&server, "/api/hosts/1/packages", 1, json!(1), 20, 2, packages(0..2)).await;
    mount_page(&server, "/api/hosts/2/packages", 1, json!(1), 20, 1, packages(10..11)).await;

    let stream = client(&server)
        .list_host_packages(HostScope::All, CancellationToken::new())
        .await
        .unwrap();
    let records: Vec<Scoped<HostPackage>> = stream.map(|r| r.unwrap()).collect().await;

    let seen: Vec<(Option<i64>, i64)> = records
        .iter()
        .map(|r| (r.host_id(), r.record.id))
        .collect();
    assert_eq!(seen, vec![(Some(1), 0), (Some(1), 1), (Some(2), 10)]);
    assert_eq!(
        records[2].join.as_ref().and_then(|j| j.host_name.as_deref()),
        Some("b")
    );
}

#[tokio::test]
async fn test_packages_unknown_host_name() {
    let server = MockServer::start().await;
    mount_host_search(&server, "ghost", json!([])).await;

    let result = client(&server)
        .list_host_packages(HostScope::Name("ghost".into()), CancellationToken::new())
        .await;

    assert!(matches!(result, Err(Error::NotFound { .. })));
    assert_eq!(requests_to(&server, "/api/hosts").await, 1);
}

#[tokio::test]
async fn test_packages_cancelled_mid_page() {
    let server = MockServer::start().await;
    let endpoint = "/api/hosts/3/packages";
    mount_page(&server, endpoint, 1, json!(1), 50, 120, packages(0..50)).await;

    let cancel = CancellationToken::new();
    let mut stream = client(&server)
        .list_host_packages(HostScope::Id(3), cancel.clone())
        .await
        .unwrap();

    let mut seen = 0;
    while let Some(record) = stream.next().await {
        record.unwrap();
        seen += 1;
        if seen == 10 {
            cancel.cancel();
        }
    }

    assert_eq!(seen, 10);
    assert_eq!(requests_to(&server, endpoint).await, 1);
}

// ============================================================================
// Host Errata
// ============================================================================

#[tokio::test]
async fn test_errata_by_host_id() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/api/hosts/4/errata",
        1,
        json!(1.0),
        20,
        1,
        json!([{
            "id": 900,
            "errata_id": "RHSA-2023:0001",
            "type": "security",
            "severity": "Critical",
            "cves": [{"bug_id": "CVE-2023-0001", "href": "https://example.com/CVE-2023-0001"}],
            "bugs": [],
            "packages": ["openssl-3.0.7-6.el9_2.x86_64"],
            "installable": true
        }]),
    )
    .await;

    let stream = client(&server)
        .list_host_errata(HostScope::Id(4), CancellationToken::new())
        .await
        .unwrap();
    let records: Vec<Scoped<Errata>> = stream.map(|r| r.unwrap()).collect().await;

    assert_eq!(records.len(), 1);
    assert!(records[0].record.is_security());

    let flat = serde_json::to_value(&records[0]).unwrap();
    assert_eq!(flat["host_id"], 4);
    assert!(flat.get("host_name").is_none());
    assert_eq!(flat["type"], "security");
}

#[tokio::test]
async fn test_errata_with_null_fields_stream_in_full() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/api/hosts/7/errata",
        1,
        json!(1),
        20,
        2,
        json!([
            {"id": 1, "solution": null, "reboot_suggested": null},
            {"id": 2, "errata_id": "RHBA-2023:0002", "solution": "Update"}
        ]),
    )
    .await;

    let results: Vec<_> = client(&server)
        .list_host_errata(HostScope::Id(7), CancellationToken::new())
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(results.len(), 2);
    let first = results[0].as_ref().unwrap();
    assert_eq!(first.record.solution, "");
    assert!(!first.record.reboot_suggested);
    assert_eq!(results[1].as_ref().unwrap().record.solution, "Update");
}

#[tokio::test]
async fn test_errata_unsupported_cursor() {
    let server = MockServer::start().await;
    mount_page(&server, "/api/hosts/4/errata", 1, json!(null), 20, 40, json!([{"id": 1}])).await;

    let stream = client(&server)
        .list_host_errata(HostScope::Id(4), CancellationToken::new())
        .await
        .unwrap();
    let records: Vec<_> = stream.collect().await;

    assert_eq!(records.len(), 1);
    let err = records.into_iter().next().unwrap().unwrap_err();
    assert!(matches!(err, Error::UnsupportedCursorType { .. }));
    assert_eq!(err.to_string(), "Unexpected type in pagination API result: null");
}

// ============================================================================
// Hosts
// ============================================================================

#[tokio::test]
async fn test_hosts_listing_sends_scope_and_headers() {
    let server = MockServer::start().await;
    let expected_auth = format!(
        "Basic {}",
        base64::engine::general_purpose::STANDARD.encode("admin:changeme")
    );

    for page in 1..=2u32 {
        Mock::given(method("GET"))
            .and(path("/api/hosts"))
            .and(query_param("page", page.to_string()))
            .and(query_param("organization_id", "1"))
            .and(query_param("location_id", "2"))
            .and(query_param("search", "os = RedHat"))
            .and(header("Accept", "application/json,version=2"))
            .and(header("Authorization", expected_auth.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total": 3,
                "subtotal": 3,
                "page": page,
                "per_page": 2,
                "results": if page == 1 {
                    json!([
                        {"id": 1, "name": "a", "uptime_seconds": 90, "created_at": "2020-06-10 10:03:19 UTC"},
                        {"id": 2, "name": "b"}
                    ])
                } else {
                    json!([{"id": 3, "name": "c"}])
                }
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let query = HostQuery::default().search("os = RedHat");
    let hosts: Vec<Host> = client(&server)
        .list_hosts(query, CancellationToken::new())
        .map(|r| r.unwrap())
        .collect()
        .await;

    let names: Vec<&str> = hosts.iter().map(|h| h.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    assert_eq!(hosts[0].uptime_duration().as_deref(), Some("1m30s"));
    assert_eq!(
        hosts[0].created_at.map(|t| t.to_string()).as_deref(),
        Some("2020-06-10 10:03:19 UTC")
    );
}

#[tokio::test]
async fn test_hosts_error_after_first_page() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/api/hosts",
        1,
        json!(1),
        1,
        2,
        json!([{"id": 1, "name": "a"}]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/hosts"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let results: Vec<_> = client(&server)
        .list_hosts(HostQuery::thin(), CancellationToken::new())
        .collect()
        .await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].as_ref().unwrap().id, 1);
    assert!(matches!(
        results[1],
        Err(Error::HttpStatus { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_get_host_by_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/hosts/web01.example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 12,
            "name": "web01.example.com",
            "operatingsystem_name": "RedHat 9.2",
            "subscription_facet_attributes": {"uuid": "abc"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let host = client(&server).get_host("web01.example.com").await.unwrap();

    assert_eq!(host.id, 12);
    assert_eq!(host.operatingsystem_name.as_deref(), Some("RedHat 9.2"));
    assert!(host.extra.contains_key("subscription_facet_attributes"));
}

#[tokio::test]
async fn test_resolve_host() {
    let server = MockServer::start().await;
    mount_host_search(
        &server,
        "db",
        json!([{"id": 5, "name": "db-old"}, {"id": 6, "name": "db"}]),
    )
    .await;

    assert_eq!(client(&server).resolve_host("db").await.unwrap(), 6);
}

// ============================================================================
// Configuration
// ============================================================================

#[tokio::test]
async fn test_client_from_config_file() {
    let server = MockServer::start().await;
    mount_host_search(&server, "web01", json!([{"id": 7, "name": "web01"}])).await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(config_yaml(&server).as_bytes()).unwrap();

    let config = SatelliteConfig::from_file(file.path()).unwrap();
    let client = SatelliteClient::from_config(config).unwrap();
    assert_eq!(client.resolve_host("web01").await.unwrap(), 7);
}

#[test]
fn test_client_requires_credentials() {
    let config = SatelliteConfig::from_yaml("endpoint: https://satellite.example.com\n").unwrap();
    let err = SatelliteClient::from_config(config).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Authentication failed: no authentication info available"
    );
}
