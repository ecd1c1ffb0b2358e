//! Typed facade over the negotiation API routes

use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::{EndpointConfig, Settings};
use crate::error::{ClientError, Result};
use crate::models::{
    ContinueConversation, ConversationRequest, ConversationStarted, ConversationTurn, Empty,
    ProgressQuery, ProgressReport, SessionResume, StartConversation, StartOrContinue,
};
use crate::routes::Operation;
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, Transport};

/// Client for the deployed negotiation API
///
/// Cloning is cheap; clones share the underlying transport and no call
/// changes client state, so one client may serve many tasks at once.
pub struct NegotiationClient<T: Transport = HttpTransport> {
    transport: Arc<T>,
}

impl<T: Transport> Clone for NegotiationClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl NegotiationClient<HttpTransport> {
    /// Create a client for an endpoint over HTTP
    pub fn new(endpoint: EndpointConfig) -> Result<Self> {
        Ok(Self::with_transport(HttpTransport::new(endpoint)?))
    }

    /// Create a client from loaded settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.validate()?;
        Self::new(settings.endpoint.clone())
    }
}

impl<T: Transport> NegotiationClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Root URL of the gateway this client talks to
    pub fn endpoint(&self) -> &str {
        self.transport.endpoint()
    }

    /// Send any request descriptor as is and return the response as is.
    ///
    /// Non-2xx responses are returned, not turned into errors.
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.transport.send(request).await
    }

    /// Call one of the fixed routes without a body, expecting no payload
    pub async fn invoke(&self, operation: Operation) -> Result<Empty> {
        let route = operation.route();
        let request = ApiRequest::new(route.method, route.path);

        self.dispatch(operation, request).await?;
        Ok(Empty::default())
    }

    /// Send a JSON payload to its route and decode the reply
    pub async fn call<R: ConversationRequest>(&self, payload: &R) -> Result<R::Response> {
        payload.validate()?;

        let operation = R::OPERATION;
        let route = operation.route();
        let request = ApiRequest::new(route.method, route.path).with_json(payload)?;

        let response = self.dispatch(operation, request).await?;
        response.json().map_err(|e| {
            warn!(operation = %operation, error = %e, "Failed to decode gateway response");
            e
        })
    }

    async fn dispatch(&self, operation: Operation, request: ApiRequest) -> Result<ApiResponse> {
        let route = operation.route();
        debug!(
            operation = %operation,
            method = %route.method,
            path = route.path,
            "Invoking operation"
        );

        let response = self.transport.send(request).await?;

        if !response.is_success() {
            let err = ClientError::from_status(response.status, &response.body);
            warn!(
                operation = %operation,
                status = response.status,
                error = %err,
                "Operation failed"
            );
            return Err(err);
        }

        debug!(operation = %operation, status = response.status, "Operation succeeded");
        Ok(response)
    }

    pub async fn check_progress_post(&self) -> Result<Empty> {
        self.invoke(Operation::CheckProgressPost).await
    }

    pub async fn check_progress_options(&self) -> Result<Empty> {
        self.invoke(Operation::CheckProgressOptions).await
    }

    pub async fn continue_conversation_post(&self) -> Result<Empty> {
        self.invoke(Operation::ContinueConversationPost).await
    }

    pub async fn continue_conversation_options(&self) -> Result<Empty> {
        self.invoke(Operation::ContinueConversationOptions).await
    }

    pub async fn reset_progress_post(&self) -> Result<Empty> {
        self.invoke(Operation::ResetProgressPost).await
    }

    pub async fn reset_progress_options(&self) -> Result<Empty> {
        self.invoke(Operation::ResetProgressOptions).await
    }

    pub async fn start_conversation_post(&self) -> Result<Empty> {
        self.invoke(Operation::StartConversationPost).await
    }

    pub async fn start_conversation_options(&self) -> Result<Empty> {
        self.invoke(Operation::StartConversationOptions).await
    }

    pub async fn start_or_continue_post(&self) -> Result<Empty> {
        self.invoke(Operation::StartOrContinuePost).await
    }

    pub async fn start_or_continue_options(&self) -> Result<Empty> {
        self.invoke(Operation::StartOrContinueOptions).await
    }

    // Typed payload calls

    pub async fn check_progress(&self, query: &ProgressQuery) -> Result<ProgressReport> {
        self.call(query).await
    }

    /// Delete stored progress, returning the handler's confirmation message
    pub async fn reset_progress(&self, query: &ProgressQuery) -> Result<String> {
        self.call(&query.reset()).await
    }

    /// Start a conversation; the reply may arrive bare or inside the handler envelope
    pub async fn start_conversation(
        &self,
        request: &StartConversation,
    ) -> Result<ConversationStarted> {
        self.call(request).await?.into_started()
    }

    pub async fn continue_conversation(
        &self,
        request: &ContinueConversation,
    ) -> Result<ConversationTurn> {
        self.call(request).await
    }

    pub async fn start_or_continue(&self, request: &StartOrContinue) -> Result<SessionResume> {
        self.call(request).await
    }
}
