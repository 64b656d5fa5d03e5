//! Full-stack tests: HTTP API in, worker pool out, wiremock as receivers.

use std::sync::Arc;
use std::time::Duration;

use relaymq::config::BrokerSettings;
use relaymq::delivery::HttpDelivery;
use relaymq::{Broker, BrokerRuntime, transport};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use wiremock::matchers::{body_string, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct TestServer {
    base: String,
    broker: Arc<Broker>,
    runtime: BrokerRuntime,
    stop: oneshot::Sender<()>,
    server: JoinHandle<std::io::Result<()>>,
}

impl TestServer {
    async fn start() -> Self {
        let settings = BrokerSettings {
            job_buffer: 2,
            workers: 2,
            idle_poll_ms: 10,
            delivery_timeout_ms: 1_000,
        };
        let broker = Arc::new(Broker::new(settings.clone()));
        let delivery = HttpDelivery::new(settings.delivery_timeout()).unwrap();
        let runtime = broker.start(Arc::new(delivery));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let (stop, stopped) = oneshot::channel::<()>();
        let server = tokio::spawn(transport::serve(listener, broker.clone(), async move {
            let _ = stopped.await;
        }));

        Self {
            base,
            broker,
            runtime,
            stop,
            server,
        }
    }

    async fn post(&self, route: &str, body: Value) -> (u16, Value) {
        let response = reqwest::Client::new()
            .post(format!("{}{route}", self.base))
            .header("content-type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        let text = response.text().await.unwrap();
        (status, serde_json::from_str(&text).unwrap())
    }

    async fn stop(self) {
        let _ = self.stop.send(());
        self.server.await.unwrap().unwrap();
        self.runtime.shutdown().await;
    }
}

async fn wait_for_requests(server: &MockServer, count: usize) {
    let reached = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let seen = server.received_requests().await.map(|r| r.len()).unwrap_or(0);
            if seen >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(reached.is_ok(), "receiver never saw {count} requests");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn message_sent_over_http_reaches_every_receiver() {
    let reader_a = MockServer::start().await;
    let reader_b = MockServer::start().await;
    for reader in [&reader_a, &reader_b] {
        Mock::given(method("POST"))
            .and(path("/inbox"))
            .and(body_string("hello"))
            .respond_with(ResponseTemplate::new(200).set_body_string("thanks"))
            .expect(1)
            .mount(reader)
            .await;
    }

    let server = TestServer::start().await;

    let (_, writer) = server
        .post("/connect/", json!({ "ClientURL": "http://writer", "Mode": "send" }))
        .await;
    for reader in [&reader_a, &reader_b] {
        let (status, _) = server
            .post(
                "/connect/",
                json!({ "ClientURL": format!("{}/inbox", reader.uri()), "Mode": "receive" }),
            )
            .await;
        assert_eq!(status, 200);
    }

    let (status, reply) = server
        .post("/send/", json!({ "ID": writer["id"], "Body": "hello" }))
        .await;
    assert_eq!(status, 200);
    assert_eq!(reply["status"], "Message enqueued");

    wait_for_requests(&reader_a, 1).await;
    wait_for_requests(&reader_b, 1).await;
    assert_eq!(server.broker.completed_job_count(), 1);

    server.stop().await;
    reader_a.verify().await;
    reader_b.verify().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn refused_receiver_does_not_stop_delivery_to_others() {
    let reader = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&reader)
        .await;

    let server = TestServer::start().await;

    // registered first, so it is attempted first within each job
    server
        .broker
        .register_connection("http://127.0.0.1:9/dead", "receive")
        .unwrap();
    server
        .broker
        .register_connection(&reader.uri(), "receive")
        .unwrap();

    server.post("/send/", json!({ "ID": 0, "Body": "first" })).await;
    server.post("/send/", json!({ "ID": 0, "Body": "second" })).await;

    wait_for_requests(&reader, 2).await;
    let bodies: Vec<String> = reader
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| String::from_utf8_lossy(&r.body).into_owned())
        .collect();
    assert!(bodies.contains(&"first".to_string()));
    assert!(bodies.contains(&"second".to_string()));

    server.stop().await;
    reader.verify().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn disconnected_receiver_gets_nothing_further() {
    let reader = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&reader)
        .await;

    let server = TestServer::start().await;
    let (_, conn) = server
        .post("/connect/", json!({ "ClientURL": reader.uri(), "Mode": "receive" }))
        .await;

    server.post("/send/", json!({ "ID": 0, "Body": "before" })).await;
    wait_for_requests(&reader, 1).await;

    let (status, reply) = server.post("/disconnect/", json!({ "ID": conn["id"] })).await;
    assert_eq!(status, 200);
    assert_eq!(reply["status"], "Disconnected.");

    server.post("/send/", json!({ "ID": 0, "Body": "after" })).await;
    tokio::time::sleep(Duration::from_millis(150)).await;

    // no receivers left, so the message stays queued
    assert_eq!(server.broker.queue_depth(), 1);

    server.stop().await;
    reader.verify().await;
}
