//! Negotiation API Client
//!
//! A typed client for the sales negotiation training API deployed behind an
//! API Gateway stage: five conversation routes, each reachable with POST and
//! OPTIONS, plus a generic request executor.

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod routes;
pub mod transport;

pub use client::NegotiationClient;
pub use error::{ClientError, Result};
pub use models::Empty;
pub use routes::{Operation, Route, ROUTES};
pub use transport::{ApiRequest, ApiResponse, HttpMethod, HttpTransport, Transport};
