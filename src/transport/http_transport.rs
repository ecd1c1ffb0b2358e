//! reqwest-backed transport for the deployed gateway

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, error};

use crate::config::EndpointConfig;
use crate::error::{ClientError, Result};
use crate::transport::traits::{ApiRequest, ApiResponse, Transport};

/// Header the gateway reads its API key from
pub const API_KEY_HEADER: &str = "x-api-key";

/// Transport that sends requests to the configured endpoint over HTTP
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: EndpointConfig,
    root_url: String,
}

impl HttpTransport {
    /// Create a new transport for an endpoint
    pub fn new(endpoint: EndpointConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(endpoint.timeout_ms))
            .connect_timeout(Duration::from_millis(endpoint.connect_timeout_ms))
            .default_headers(Self::default_headers(&endpoint)?)
            .build()?;

        let root_url = endpoint.root_url();

        Ok(Self {
            client,
            endpoint,
            root_url,
        })
    }

    /// Headers sent with every request unless the request sets them itself
    fn default_headers(endpoint: &EndpointConfig) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        let user_agent = HeaderValue::from_str(&endpoint.user_agent).map_err(|e| {
            ClientError::InvalidRequest(format!(
                "Invalid user agent '{}': {}",
                endpoint.user_agent, e
            ))
        })?;
        headers.insert(USER_AGENT, user_agent);

        for (name, value) in &endpoint.default_headers {
            let (name, value) = parse_header(name, value)?;
            headers.insert(name, value);
        }

        if let Some(key) = endpoint.resolve_api_key() {
            let mut value = HeaderValue::from_str(&key)
                .map_err(|e| ClientError::InvalidRequest(format!("Invalid API key: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(HeaderName::from_static(API_KEY_HEADER), value);
        }

        Ok(headers)
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.endpoint
    }
}

fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
        ClientError::InvalidRequest(format!("Invalid header name '{}': {}", name, e))
    })?;
    let header_value = HeaderValue::from_str(value).map_err(|e| {
        ClientError::InvalidRequest(format!("Invalid value for header '{}': {}", name, e))
    })?;
    Ok((header_name, header_value))
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = self.endpoint.invoke_url(&request.path);

        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            let (name, value) = parse_header(name, value)?;
            headers.append(name, value);
        }

        let mut builder = self
            .client
            .request(request.method.into(), &url)
            .headers(headers);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        debug!(method = %request.method, url = %url, "Sending gateway request");
        let started = Instant::now();

        let response = builder.send().await.map_err(|e| {
            error!(method = %request.method, url = %url, error = %e, "Gateway request failed");
            ClientError::Http(e)
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.bytes().await?.to_vec();

        debug!(
            method = %request.method,
            url = %url,
            status = status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Gateway response received"
        );

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }

    fn endpoint(&self) -> &str {
        &self.root_url
    }
}
