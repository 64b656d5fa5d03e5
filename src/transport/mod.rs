//! The `transport` module exposes the broker over HTTP.
//!
//! It defines the JSON request and response bodies and the `axum` router
//! that maps them onto the broker's registration, enqueue and status
//! operations.

pub mod http;
pub mod message;

pub use http::{router, serve};
