//! Integration tests using mock HTTP server
//!
//! Tests the full flow: settings → session → retrying page requests →
//! lazy record stream → sink

use futures::{StreamExt, TryStreamExt};
use pagewise::config::ApiSettings;
use pagewise::http::ApiClient;
use pagewise::output::JsonLinesSink;
use pagewise::pagination::PageNumberStrategy;
use pagewise::retry::RetryPolicy;
use pagewise::roles::{run_pipeline, Identity, Internal, Source};
use pagewise::storage::DuckDbSink;
use pagewise::worldbank::{WorldBankClient, WorldBankSettings};
use pagewise::{Error, RequestParams};
use serde_json::json;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, unit: Duration) -> ApiClient {
    let settings = ApiSettings::builder()
        .base_url(server.uri())
        .endpoint("data")
        .build();
    ApiClient::new(settings)
        .unwrap()
        .with_retry(RetryPolicy::new().with_unit(unit))
}

async fn mount_two_pages(server: &MockServer, page_two_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/data"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"page": 1, "pages": 2},
            ["r1", "r2", "r3", "r4", "r5"]
        ])))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/data"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"page": 2, "pages": 2},
            ["r6", "r7", "r8"]
        ])))
        .expect(page_two_calls)
        .mount(server)
        .await;
}

fn query_of(request: &wiremock::Request) -> HashMap<String, String> {
    request.url.query_pairs().into_owned().collect()
}

// ============================================================================
// Pagination Scenarios
// ============================================================================

#[tokio::test]
async fn test_two_page_scenario() {
    let mock_server = MockServer::start().await;
    mount_two_pages(&mock_server, 1).await;

    let mut client = client_for(&mock_server, Duration::from_millis(1));
    let client = client.scoped().unwrap();
    let strategy = PageNumberStrategy::new();

    let params = RequestParams::new().with("page", 1).with("format", "json");
    let records: Vec<_> = client
        .fetch(&strategy, None, Some(params))
        .try_collect()
        .await
        .unwrap();

    assert_eq!(
        records,
        vec![
            json!("r1"),
            json!("r2"),
            json!("r3"),
            json!("r4"),
            json!("r5"),
            json!("r6"),
            json!("r7"),
            json!("r8")
        ]
    );

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);

    let mut first = query_of(&requests[0]);
    let second = query_of(&requests[1]);
    assert_eq!(first.get("page").map(String::as_str), Some("1"));
    assert_eq!(second.get("page").map(String::as_str), Some("2"));
    first.insert("page".to_string(), "2".to_string());
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_abandoned_iteration_skips_next_page() {
    let mock_server = MockServer::start().await;
    mount_two_pages(&mock_server, 0).await;

    let mut client = client_for(&mock_server, Duration::from_millis(1));
    client.connect().unwrap();
    let strategy = PageNumberStrategy::new();

    let taken: Vec<_> = client
        .fetch(&strategy, None, Some(RequestParams::new().with("page", 1)))
        .take(2)
        .try_collect()
        .await
        .unwrap();

    assert_eq!(taken, vec![json!("r1"), json!("r2")]);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_page_records_arrive_before_next_request() {
    let mock_server = MockServer::start().await;
    mount_two_pages(&mock_server, 1).await;

    let mut client = client_for(&mock_server, Duration::from_millis(1));
    client.connect().unwrap();
    let strategy = PageNumberStrategy::new();
    let mut records = client.fetch(&strategy, None, Some(RequestParams::new().with("page", 1)));

    for expected in ["r1", "r2", "r3", "r4", "r5"] {
        assert_eq!(records.next().await.unwrap().unwrap(), json!(expected));
    }
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);

    assert_eq!(records.next().await.unwrap().unwrap(), json!("r6"));
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_fetch_without_session_makes_no_request() {
    let mock_server = MockServer::start().await;

    let client = client_for(&mock_server, Duration::from_millis(1));
    let strategy = PageNumberStrategy::new();
    let mut records = client.fetch(&strategy, None, None);

    assert!(matches!(records.next().await, Some(Err(Error::NotConnected))));
    assert!(records.next().await.is_none());
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

// ============================================================================
// Retry Behavior
// ============================================================================

#[tokio::test]
async fn test_transient_failures_back_off_then_succeed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"page": 1, "pages": 1}, ["ok"]])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let unit = Duration::from_millis(10);
    let mut client = client_for(&mock_server, unit);
    client.connect().unwrap();
    let strategy = PageNumberStrategy::new();

    let start = Instant::now();
    let records: Vec<_> = client.fetch(&strategy, None, None).try_collect().await.unwrap();

    assert_eq!(records, vec![json!("ok")]);
    // Two waits of at least two units each
    assert!(start.elapsed() >= unit * 4);
}

#[tokio::test]
async fn test_error_on_second_page_after_first_page_records() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"page": 1, "pages": 2},
            ["r1", "r2"]
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/data"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let mut client = client_for(&mock_server, Duration::from_millis(1));
    client.connect().unwrap();
    let strategy = PageNumberStrategy::new();

    let results: Vec<_> = client
        .fetch(&strategy, None, Some(RequestParams::new().with("page", 1)))
        .collect()
        .await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap(), &json!("r1"));
    assert_eq!(results[1].as_ref().unwrap(), &json!("r2"));
    assert!(matches!(
        &results[2],
        Err(Error::HttpStatus { status: 500, body }) if body.as_str() == "boom"
    ));
}

// ============================================================================
// Pipelines
// ============================================================================

fn observation(country: &str, year: u32) -> serde_json::Value {
    json!({
        "indicator": {"id": "SP.POP.TOTL", "value": "Population, total"},
        "country": {"id": "XX", "value": "Country"},
        "countryiso3code": country,
        "date": year.to_string(),
        "value": year * 10
    })
}

async fn mount_world_bank(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/country/USA;CAN/indicator/SP.POP.TOTL"))
        .and(query_param("page", "1"))
        .and(query_param("date", "2019:2020"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"page": 1, "pages": 2, "per_page": 2, "total": 4},
            [observation("USA", 2020), observation("USA", 2019)]
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/country/USA;CAN/indicator/SP.POP.TOTL"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"page": 2, "pages": 2, "per_page": 2, "total": 4},
            [observation("CAN", 2020), observation("CAN", 2019)]
        ])))
        .mount(server)
        .await;
}

fn world_bank_client(server: &MockServer) -> WorldBankClient {
    let api = ApiSettings::builder()
        .base_url(server.uri())
        .batch_size(2)
        .build();
    let settings = WorldBankSettings::new(["USA", "CAN"], ["SP.POP.TOTL"], ["2019:2020"]).with_api(api);
    WorldBankClient::new(settings).unwrap()
}

#[tokio::test]
async fn test_world_bank_into_duckdb() {
    let mock_server = MockServer::start().await;
    mount_world_bank(&mock_server).await;

    let mut client = world_bank_client(&mock_server);
    let mut sink = DuckDbSink::open_in_memory().unwrap();
    {
        let client = client.scoped().unwrap();
        let stats = run_pipeline(client.records(), &Identity, &mut sink, None)
            .await
            .unwrap();
        assert_eq!(stats.read, 4);
        assert_eq!(stats.written, 4);

        // A second run finds every observation already stored
        let stats = run_pipeline(client.records(), &Identity, &mut sink, None)
            .await
            .unwrap();
        assert_eq!(stats.duplicates, 4);
    }

    assert!(!client.is_connected());
    assert_eq!(sink.count().unwrap(), 4);
    assert_eq!(
        sink.value_of("SP.POP.TOTL", "CAN", 2019).unwrap(),
        Some(Some("20190".to_string()))
    );
}

#[tokio::test]
async fn test_world_bank_limit_stops_paging() {
    let mock_server = MockServer::start().await;
    mount_world_bank(&mock_server).await;

    let mut client = world_bank_client(&mock_server);
    let client = client.scoped().unwrap();
    let mut sink = JsonLinesSink::new(Vec::new());

    let stats = run_pipeline(client.records(), &Identity, &mut sink, Some(2))
        .await
        .unwrap();

    assert_eq!(stats.read, 2);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);

    let text = String::from_utf8(sink.into_inner()).unwrap();
    assert_eq!(text.lines().count(), 2);
    assert!(text.contains("\"countryiso3code\":\"USA\""));
}
