use std::time::Duration;

use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{Deliver, HttpDelivery, summarize};
use crate::utils::DeliveryError;

fn client() -> HttpDelivery {
    HttpDelivery::new(Duration::from_secs(2)).expect("build client")
}

#[tokio::test]
async fn test_posts_raw_payload_and_reads_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/inbox"))
        .and(header("content-type", "text/plain"))
        .and(body_string("hello"))
        .respond_with(ResponseTemplate::new(200).set_body_string("got it"))
        .expect(1)
        .mount(&server)
        .await;

    let receipt = client()
        .deliver(&format!("{}/inbox", server.uri()), "hello")
        .await
        .expect("delivery");

    assert_eq!(receipt.status, 200);
    assert_eq!(receipt.body, "got it");
    assert_eq!(receipt.summary(), "got it");
}

#[tokio::test]
async fn test_error_status_is_a_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client().deliver(&server.uri(), "payload").await.unwrap_err();
    match err {
        DeliveryError::Rejected { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn test_connection_refused_is_a_request_error() {
    // nothing listens on the discard port
    let err = client()
        .deliver("http://127.0.0.1:9/inbox", "payload")
        .await
        .unwrap_err();
    assert!(matches!(err, DeliveryError::Request(_)));
}

#[tokio::test]
async fn test_invalid_address_is_a_request_error() {
    let err = client().deliver("not a url", "payload").await.unwrap_err();
    assert!(matches!(err, DeliveryError::Request(_)));
}

#[tokio::test]
async fn test_slow_destination_hits_client_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let delivery = HttpDelivery::new(Duration::from_millis(50)).unwrap();
    let err = delivery.deliver(&server.uri(), "payload").await.unwrap_err();
    match err {
        DeliveryError::Request(e) => assert!(e.is_timeout()),
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[test]
fn test_summary_truncates_long_bodies() {
    let long = "x".repeat(250);
    let summary = summarize(&long);
    assert_eq!(summary.len(), 103);
    assert!(summary.ends_with("..."));
    assert_eq!(summarize("  short\n"), "short");
}
