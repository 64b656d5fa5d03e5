//! HTTP transport
//!
//! Translates HTTP requests into broker operations:
//! - `POST /connect`    register a sender or receiver endpoint
//! - `POST /send`       enqueue a payload
//! - `POST /disconnect` remove a registration
//! - `GET  /dashboard`  render the broker counters as HTML
//!
//! Handlers never touch the network themselves; delivery to receivers is done
//! by the worker pool.

use std::future::Future;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::broker::{Broker, Role};
use crate::transport::message::{
    ConnectRequest, ConnectResponse, DisconnectRequest, ErrorResponse, SendRequest, StatusResponse,
};
use crate::utils::BrokerError;

pub const ENQUEUED: &str = "Message enqueued";
pub const DISCONNECTED: &str = "Disconnected.";
pub const NO_SUCH_CONNECTION: &str = "Error: no such connection.";

/// Build the router. Every route answers with and without a trailing slash.
pub fn router(broker: Arc<Broker>) -> Router {
    Router::new()
        .route("/connect", post(connect))
        .route("/connect/", post(connect))
        .route("/send", post(send))
        .route("/send/", post(send))
        .route("/disconnect", post(disconnect))
        .route("/disconnect/", post(disconnect))
        .route("/dashboard", get(dashboard))
        .route("/dashboard/", get(dashboard))
        .with_state(broker)
}

/// Serve `router` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, broker: Arc<Broker>, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!("HTTP server listening on http://{addr}");
    }
    axum::serve(listener, router(broker))
        .with_graceful_shutdown(shutdown)
        .await
}

impl IntoResponse for BrokerError {
    fn into_response(self) -> Response {
        let status = match &self {
            BrokerError::InvalidRole(_) => StatusCode::BAD_REQUEST,
            BrokerError::NotFound(_) => StatusCode::NOT_FOUND,
            BrokerError::EmptyQueue => StatusCode::CONFLICT,
        };
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

async fn connect(
    State(broker): State<Arc<Broker>>,
    Json(req): Json<ConnectRequest>,
) -> Result<Json<ConnectResponse>, BrokerError> {
    match broker.register_connection(&req.client_url, &req.mode) {
        Ok(id) => Ok(Json(ConnectResponse { id })),
        Err(e) => {
            warn!(address = %req.client_url, "error adding connection: {e}");
            Err(e)
        }
    }
}

async fn send(State(broker): State<Arc<Broker>>, Json(req): Json<SendRequest>) -> Json<StatusResponse> {
    match broker.registry().get(req.id) {
        Some(conn) if conn.role == Role::Sender => {}
        _ => debug!(id = req.id, "enqueue from an id that is not a registered sender"),
    }

    broker.enqueue(req.body);
    Json(StatusResponse {
        status: ENQUEUED.to_string(),
        id: req.id,
    })
}

async fn disconnect(
    State(broker): State<Arc<Broker>>,
    Json(req): Json<DisconnectRequest>,
) -> (StatusCode, Json<StatusResponse>) {
    match broker.unregister_connection(req.id) {
        Ok(_) => (
            StatusCode::OK,
            Json(StatusResponse {
                status: DISCONNECTED.to_string(),
                id: req.id,
            }),
        ),
        Err(e) => {
            warn!(id = req.id, "error disconnecting: {e}");
            (
                StatusCode::NOT_FOUND,
                Json(StatusResponse {
                    status: NO_SUCH_CONNECTION.to_string(),
                    id: req.id,
                }),
            )
        }
    }
}

async fn dashboard(State(broker): State<Arc<Broker>>) -> Html<String> {
    let stats = broker.stats();
    Html(format!(
        "<html><body><h1>Dashboard</h1>\
         <p>Readers: {}</p><p>Writers: {}</p>\
         <p>Queue len: {}</p><p>Completed sends: {}</p>\
         </body></html>",
        stats.receivers, stats.senders, stats.queue_depth, stats.completed_jobs,
    ))
}
