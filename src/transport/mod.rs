//! Transport module - request descriptors and the reqwest-backed sender

pub mod http_transport;
pub mod traits;

pub use http_transport::HttpTransport;
pub use traits::{ApiRequest, ApiResponse, HttpMethod, Transport};
