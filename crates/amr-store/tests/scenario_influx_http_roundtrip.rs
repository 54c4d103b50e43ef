//! InfluxClient against a mock HTTP server.
//!
//! GREEN when:
//! - Writes POST line protocol to /write with db, precision=s and basic auth.
//! - An empty point set performs no request.
//! - Non-success statuses surface as StoreError::Api with the server message.
//! - History is read from /query with epoch=ns and decoded by column name.

use amr_schemas::{FieldValue, Point};
use amr_store::{HistorySource, InfluxClient, PointSink, StoreError};
use chrono::{Duration, TimeZone, Utc};
use httpmock::prelude::*;

const AUTH: &str = "Basic Y29sbGVjdG9yOmh1bnRlcjI=";

fn client(server: &MockServer) -> InfluxClient {
    InfluxClient::new(server.base_url(), "rtlamr", "collector", "hunter2", "power")
}

fn point(slot: i64, usage: f64) -> Point {
    Point::new("power", Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap())
        .tag("endpoint_id", "12345")
        .tag("endpoint_type", "7")
        .field("consumption", FieldValue::Float(usage))
        .field("interval", FieldValue::Integer(slot))
}

#[tokio::test]
async fn write_posts_line_protocol_with_auth() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/write")
                .query_param("db", "rtlamr")
                .query_param("precision", "s")
                .header("authorization", AUTH)
                .body(
                    "power,endpoint_id=12345,endpoint_type=7 consumption=50,interval=10i 1577836800\n\
                     power,endpoint_id=12345,endpoint_type=7 consumption=12.5,interval=9i 1577836800",
                );
            then.status(204);
        })
        .await;

    client(&server)
        .write_points(&[point(10, 50.0), point(9, 12.5)])
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn empty_write_sends_nothing() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/write");
            then.status(204);
        })
        .await;

    client(&server).write_points(&[]).await.unwrap();
    assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn write_failure_carries_status_and_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/write");
            then.status(404).body(r#"{"error":"database not found: \"rtlamr\""}"#);
        })
        .await;

    let err = client(&server).write_points(&[point(1, 1.0)]).await.unwrap_err();
    assert_eq!(
        err,
        StoreError::Api {
            status: Some(404),
            message: "database not found: \"rtlamr\"".to_string(),
        }
    );
}

#[tokio::test]
async fn unreachable_store_is_transport_error() {
    let c = InfluxClient::new("http://127.0.0.1:1", "rtlamr", "u", "p", "power");
    let err = c.write_points(&[point(1, 1.0)]).await.unwrap_err();
    assert!(matches!(err, StoreError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn history_query_decodes_rows() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/query")
                .query_param("db", "rtlamr")
                .query_param("epoch", "ns")
                .query_param("q", "SELECT * FROM \"power\" WHERE time > now() - 4h")
                .header("authorization", AUTH);
            then.status(200)
                .header("content-type", "application/json")
                .body(
                    r#"{"results":[{"statement_id":0,"series":[{"name":"power",
                    "columns":["time","consumption","endpoint_id","endpoint_type","interval"],
                    "values":[
                        [1577836800000000000,50,"12345","7",10],
                        [1577836500000000000,50,"12345","7",9]
                    ]}]}]}"#,
                );
        })
        .await;

    let rows = client(&server).fetch_recent(Duration::hours(4)).await.unwrap();
    mock.assert_async().await;

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].meter_id, 12345);
    assert_eq!(rows[0].slot, 10);
    assert_eq!(rows[1].slot, 9);
    assert_eq!(
        rows[1].time,
        Utc.with_ymd_and_hms(2019, 12, 31, 23, 55, 0).unwrap()
    );
}

#[tokio::test]
async fn history_server_error_is_api_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/query");
            then.status(401).body(r#"{"error":"authorization failed"}"#);
        })
        .await;

    let err = client(&server).fetch_recent(Duration::hours(4)).await.unwrap_err();
    assert_eq!(
        err,
        StoreError::Api {
            status: Some(401),
            message: "authorization failed".to_string(),
        }
    );
}
