//! JSON bodies exchanged with HTTP clients.
//!
//! Field names follow the wire format existing clients already speak
//! (`ClientURL`, `Mode`, `ID`, `Body`); snake_case spellings are accepted too.

use serde::{Deserialize, Serialize};

use crate::broker::ConnectionId;

#[derive(Debug, Deserialize, Serialize)]
pub struct ConnectRequest {
    #[serde(rename = "ClientURL", alias = "client_url")]
    pub client_url: String,
    #[serde(rename = "Mode", alias = "mode")]
    pub mode: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SendRequest {
    #[serde(rename = "ID", alias = "id", default)]
    pub id: ConnectionId,
    #[serde(rename = "Body", alias = "body")]
    pub body: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DisconnectRequest {
    #[serde(rename = "ID", alias = "id")]
    pub id: ConnectionId,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ConnectResponse {
    pub id: ConnectionId,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct StatusResponse {
    pub status: String,
    pub id: ConnectionId,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}
