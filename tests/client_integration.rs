//! End-to-end tests for the client facade
//!
//! These run the full path (facade, queue, cache) against a canned HTTP
//! responder on a local socket. The responder counts accepted connections and
//! answers every request with `Connection: close`, so one connection equals
//! one network call.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use tubefetch::{ApiClient, ApiError, ClientConfig, RateLimitConfig, TtlTier, TtlTiers};

/// Serves a fixed response on an ephemeral port, counting connections
async fn spawn_responder(status_line: &'static str, body: String) -> (SocketAddr, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test responder");
    let addr = listener.local_addr().expect("responder address");
    let hits = Arc::new(AtomicUsize::new(0));

    let counter = hits.clone();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            counter.fetch_add(1, Ordering::SeqCst);

            let body = body.clone();
            tokio::spawn(async move {
                // Read until the end of the request head before answering
                let mut buf = [0u8; 4096];
                let mut head = Vec::new();
                loop {
                    match socket.read(&mut buf).await {
                        Ok(0) => break,
                        Ok(n) => {
                            head.extend_from_slice(&buf[..n]);
                            if head.windows(4).any(|window| window == b"\r\n\r\n") {
                                break;
                            }
                        }
                        Err(_) => break,
                    }
                }

                let response = format!(
                    "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, hits)
}

/// Client config pointed at the responder, with fast test-friendly timings
fn test_config(addr: SocketAddr) -> ClientConfig {
    ClientConfig::new(format!("http://{addr}"))
        .with_request_timeout(Duration::from_secs(5))
        .with_rate(RateLimitConfig {
            max_requests: 100,
            window: Duration::from_secs(60),
            spacing: Duration::from_millis(0),
        })
        .with_ttl(TtlTiers {
            short: Duration::from_millis(200),
            medium: Duration::from_secs(60),
            long: Duration::from_secs(3600),
        })
}

#[tokio::test]
async fn two_cached_reads_make_one_network_call() {
    let payload = json!({"videos": [{"id": "v1", "title": "first"}]});
    let (addr, hits) = spawn_responder("200 OK", payload.to_string()).await;
    let client = ApiClient::new(test_config(addr));

    let first: Value = client
        .get_cached("/videos?cat=music", "videos_music_20", TtlTier::Medium)
        .await
        .expect("first read");
    let second: Value = client
        .get_cached("/videos?cat=music", "videos_music_20", TtlTier::Medium)
        .await
        .expect("second read");

    assert_eq!(first, payload);
    assert_eq!(second, payload, "Cached read returns the same body");
    assert_eq!(hits.load(Ordering::SeqCst), 1, "Second read came from cache");
}

#[tokio::test]
async fn expired_entry_triggers_a_fresh_network_call() {
    let payload = json!({"id": "v2", "views": 7});
    let (addr, hits) = spawn_responder("200 OK", payload.to_string()).await;
    let client = ApiClient::new(test_config(addr));

    let _: Value = client
        .get_cached("/videos/v2", "video_v2", TtlTier::Short)
        .await
        .expect("first read");
    // Short tier is 200ms in the test config; wait past it
    tokio::time::sleep(Duration::from_millis(300)).await;
    let refreshed: Value = client
        .get_cached("/videos/v2", "video_v2", TtlTier::Short)
        .await
        .expect("read after expiry");

    assert_eq!(refreshed, payload);
    assert_eq!(hits.load(Ordering::SeqCst), 2, "Expired entry was refetched");
}

#[tokio::test]
async fn uncached_reads_always_hit_the_network() {
    let (addr, hits) = spawn_responder("200 OK", json!([1, 2, 3]).to_string()).await;
    let client = ApiClient::new(test_config(addr));

    let _: Value = client.get("/notifications").await.expect("first read");
    let _: Value = client.get("/notifications").await.expect("second read");

    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert!(client.cache().is_empty(), "Plain get never writes the cache");
}

#[tokio::test]
async fn non_2xx_status_maps_to_status_error() {
    let (addr, _hits) = spawn_responder("404 Not Found", String::new()).await;
    let client = ApiClient::new(test_config(addr));

    let result: Result<Value, ApiError> = client
        .get_cached("/videos/missing", "video_missing", TtlTier::Long)
        .await;

    match result {
        Err(ApiError::Status { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "Not Found");
        }
        other => panic!("expected status error, got {other:?}"),
    }
    assert!(client.cache().is_empty(), "Failed fetch never writes the cache");
}

#[tokio::test]
async fn post_round_trips_a_json_body() {
    let created = json!({"id": "c9", "text": "nice video"});
    let (addr, hits) = spawn_responder("200 OK", created.to_string()).await;
    let client = ApiClient::new(test_config(addr));

    let response: Value = client
        .post("/comments", &json!({"text": "nice video"}))
        .await
        .expect("post");

    assert_eq!(response, created);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(client.cache().is_empty(), "Mutations never write the cache");
}
