//! Configuration module

pub mod settings;

pub use settings::{EndpointConfig, LoggingConfig, Settings};
