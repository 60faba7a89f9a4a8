//! # X Fetcher Tests
//!
//! Runs the search request and the location resolution chain against a mock
//! API server and a scripted geocoder.

use geolens::debug::DebugArtifacts;
use geolens::{EventFetcher, FetchCriteria, FetchError, MetaValue};
use geolens_test_utils::{MockGeocode, MockGeocoder};
use geolens_x::{XError, XFetcher, DEFAULT_QUERY};
use serde_json::json;
use std::sync::Once;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

static INIT: Once = Once::new();

fn setup_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

fn fetcher(server: &MockServer, geocoder: &MockGeocoder) -> XFetcher {
    XFetcher::new(server.uri(), "test-token", Box::new(geocoder.clone()))
        .unwrap()
        .with_post_delay(Duration::ZERO)
}

async fn mount_search(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/tweets/search/recent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_request_shape() {
    setup_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tweets/search/recent"))
        .and(header("authorization", "Bearer test-token"))
        .and(header("user-agent", "GeoLensAI/1.0"))
        .and(query_param("query", DEFAULT_QUERY))
        .and(query_param("max_results", "25"))
        .and(query_param("expansions", "geo.place_id"))
        .and(query_param(
            "tweet.fields",
            "created_at,geo,context_annotations,entities",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"meta": {"result_count": 0}})))
        .expect(1)
        .mount(&server)
        .await;

    let events = fetcher(&server, &MockGeocoder::new())
        .with_max_results(25)
        .fetch_latest_posts(None)
        .await
        .unwrap();

    assert!(events.is_empty());
}

#[tokio::test]
async fn test_location_extracted_from_text_is_geocoded() {
    setup_tracing();
    let server = MockServer::start().await;
    mount_search(
        &server,
        json!({
            "data": [{
                "id": "42",
                "text": "A fire broke out in Springfield yesterday",
                "created_at": "2024-01-03T10:00:00.000Z"
            }]
        }),
    )
    .await;
    let geocoder = MockGeocoder::new().with(
        "Springfield",
        MockGeocode::Found {
            lat: 39.799,
            lon: -89.644,
        },
    );

    let events = fetcher(&server, &geocoder)
        .fetch(&FetchCriteria {
            start_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            query: Some("fire".into()),
        })
        .await
        .unwrap();

    assert_eq!(geocoder.queries(), vec!["Springfield"]);
    assert_eq!(events.len(), 1);
    let ev = &events[0];
    assert_eq!(ev.id, "42");
    assert_eq!(ev.date, "2024-01-03T10:00:00.000Z");
    assert_eq!(ev.location.as_deref(), Some("Springfield"));
    assert_eq!(ev.latitude, Some(39.799));
    assert_eq!(ev.longitude, Some(-89.644));
    assert_eq!(ev.tone, None);
    assert_eq!(ev.source_url(), Some("https://twitter.com/i/web/status/42"));
    assert_eq!(
        ev.metadata["location_type"],
        MetaValue::from("extracted_from_text")
    );
}

#[tokio::test]
async fn test_geocode_timeout_drops_post() {
    setup_tracing();
    let server = MockServer::start().await;
    mount_search(
        &server,
        json!({"data": [{"id": "1", "text": "Flooding reported in Springfield today"}]}),
    )
    .await;
    let geocoder = MockGeocoder::new().with("Springfield", MockGeocode::Timeout);

    let events = fetcher(&server, &geocoder)
        .fetch_latest_posts(None)
        .await
        .unwrap();

    assert!(events.is_empty());
    assert_eq!(geocoder.queries(), vec!["Springfield"]);
}

#[tokio::test]
async fn test_timeout_moves_to_next_candidate() {
    setup_tracing();
    let server = MockServer::start().await;
    mount_search(
        &server,
        json!({"data": [{"id": "1", "text": "Reporting from Gotham about a storm near Metropolis"}]}),
    )
    .await;
    let geocoder = MockGeocoder::new()
        .with("Gotham", MockGeocode::Timeout)
        .with("Metropolis", MockGeocode::Found { lat: 1.0, lon: 2.0 });

    let events = fetcher(&server, &geocoder)
        .fetch_latest_posts(None)
        .await
        .unwrap();

    assert_eq!(geocoder.queries(), vec!["Gotham", "Metropolis"]);
    assert_eq!(events[0].location.as_deref(), Some("Metropolis"));
}

#[tokio::test]
async fn test_geocoder_failure_drops_only_that_post() {
    setup_tracing();
    let server = MockServer::start().await;
    mount_search(
        &server,
        json!({"data": [
            {"id": "1", "text": "Explosion in Gotham"},
            {"id": "2", "text": "Parade in Metropolis"}
        ]}),
    )
    .await;
    let geocoder = MockGeocoder::new()
        .with("Gotham", MockGeocode::Fail("503".into()))
        .with("Metropolis", MockGeocode::Found { lat: 1.0, lon: 2.0 });

    let events = fetcher(&server, &geocoder)
        .fetch_latest_posts(None)
        .await
        .unwrap();

    let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["2"]);
}

#[tokio::test]
async fn test_structured_geo_wins_over_text() {
    setup_tracing();
    let server = MockServer::start().await;
    mount_search(
        &server,
        json!({
            "data": [
                {
                    "id": "1",
                    "text": "Breaking news in Springfield",
                    "geo": {"coordinates": {"type": "Point", "coordinates": [-73.99, 40.73]}, "place_id": "p1"}
                },
                {
                    "id": "2",
                    "text": "Event in Springfield",
                    "geo": {"place_id": "p1"}
                },
                {
                    "id": "3",
                    "text": "no capitalized place here"
                }
            ],
            "includes": {
                "places": [{
                    "id": "p1",
                    "full_name": "Manhattan, NY",
                    "country": "United States",
                    "place_type": "city",
                    "geo": {"type": "Feature", "bbox": [-74.0, 40.0, -73.0, 41.0], "properties": {}}
                }]
            }
        }),
    )
    .await;
    let geocoder = MockGeocoder::new();

    let events = fetcher(&server, &geocoder)
        .fetch_latest_posts(None)
        .await
        .unwrap();

    assert!(geocoder.queries().is_empty());
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].latitude, Some(40.73));
    assert_eq!(events[0].longitude, Some(-73.99));
    assert_eq!(events[0].metadata["location_type"], MetaValue::from("coordinates"));
    assert_eq!(events[1].location.as_deref(), Some("Manhattan, NY"));
    assert_eq!(events[1].latitude, Some(40.5));
    assert_eq!(events[1].longitude, Some(-73.5));
    assert_eq!(events[1].metadata["location_type"], MetaValue::from("city"));
    assert_eq!(
        events[1].metadata["country"],
        MetaValue::from("United States")
    );
}

#[tokio::test]
async fn test_api_error_is_transport_error() {
    setup_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
        .mount(&server)
        .await;

    let err = fetcher(&server, &MockGeocoder::new())
        .fetch_latest_posts(None)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Transport(ref m) if m.contains("429")));
}

#[tokio::test]
async fn test_missing_token_fails_before_any_request() {
    let err = XFetcher::new("http://127.0.0.1:1", "  ", Box::new(MockGeocoder::new())).unwrap_err();
    assert!(matches!(err, XError::MissingCredential));
}

#[tokio::test]
async fn test_raw_response_saved_for_debugging() {
    setup_tracing();
    let server = MockServer::start().await;
    mount_search(&server, json!({"data": [], "meta": {"result_count": 0}})).await;
    let tmp = tempfile::tempdir().unwrap();

    fetcher(&server, &MockGeocoder::new())
        .with_debug(DebugArtifacts::new(tmp.path()))
        .fetch_latest_posts(None)
        .await
        .unwrap();

    let saved: Vec<_> = std::fs::read_dir(tmp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(saved.len(), 1);
    assert!(saved[0].starts_with("x_response_") && saved[0].ends_with(".json"));
}
