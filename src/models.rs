//! Request and response models for the negotiation API

use chrono::{DateTime, Utc};
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ClientError, Result};
use crate::routes::Operation;

/// Marker returned by calls that expect no payload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty {}

/// A JSON payload bound to one POST route
pub trait ConversationRequest: Serialize + Send + Sync {
    /// Operation the payload is sent to
    const OPERATION: Operation;

    /// Decoded success body
    type Response: DeserializeOwned;

    /// Reject payloads the handler would answer with 400
    fn validate(&self) -> Result<()>;
}

fn require(value: &str, field: &str) -> Result<()> {
    if value.is_empty() {
        return Err(ClientError::InvalidRequest(format!("'{}' is required", field)));
    }
    Ok(())
}

/// Levels arrive either as integers or as whole floats
fn deserialize_levels<'de, D>(deserializer: D) -> std::result::Result<Vec<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<f64>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|level| {
            if level >= 0.0 && level.fract() == 0.0 && level <= u32::MAX as f64 {
                Ok(level as u32)
            } else {
                Err(serde::de::Error::custom(format!("invalid level {}", level)))
            }
        })
        .collect()
}

/// Identifies one user's progress on one product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressQuery {
    pub user_id: String,
    pub product_id: String,
}

impl ProgressQuery {
    pub fn new(user_id: impl Into<String>, product_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            product_id: product_id.into(),
        }
    }

    /// Same payload, addressed to the reset route
    pub fn reset(&self) -> ResetProgress {
        ResetProgress(self.clone())
    }
}

impl ConversationRequest for ProgressQuery {
    const OPERATION: Operation = Operation::CheckProgressPost;
    type Response = ProgressReport;

    fn validate(&self) -> Result<()> {
        require(&self.user_id, "user_id")?;
        require(&self.product_id, "product_id")
    }
}

/// Stored progress; empty levels and zero percentage when nothing is stored
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    #[serde(default, deserialize_with = "deserialize_levels")]
    pub levels_passed: Vec<u32>,
    #[serde(default)]
    pub progress_percentage: f64,
}

impl ProgressReport {
    pub fn highest_level_passed(&self) -> Option<u32> {
        self.levels_passed.iter().copied().max()
    }

    pub fn has_progress(&self) -> bool {
        !self.levels_passed.is_empty() || self.progress_percentage > 0.0
    }
}

/// Deletes stored progress; the handler answers with a confirmation message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResetProgress(pub ProgressQuery);

impl ConversationRequest for ResetProgress {
    const OPERATION: Operation = Operation::ResetProgressPost;
    type Response = String;

    fn validate(&self) -> Result<()> {
        self.0.validate()
    }
}

/// Opens a new conversation at a level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartConversation {
    pub user_id: String,
    pub product_id: String,
    #[serde(default = "default_level")]
    pub level: u32,
    /// Drop stored progress and restart from level 1
    #[serde(default)]
    pub reset: bool,
}

fn default_level() -> u32 {
    1
}

impl StartConversation {
    pub fn new(user_id: impl Into<String>, product_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            product_id: product_id.into(),
            level: default_level(),
            reset: false,
        }
    }

    pub fn at_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_reset(mut self) -> Self {
        self.reset = true;
        self
    }
}

impl ConversationRequest for StartConversation {
    const OPERATION: Operation = Operation::StartConversationPost;
    type Response = StartReply;

    fn validate(&self) -> Result<()> {
        require(&self.user_id, "user_id")?;
        require(&self.product_id, "product_id")?;
        if self.level == 0 {
            return Err(ClientError::InvalidRequest("'level' starts at 1".to_string()));
        }
        Ok(())
    }
}

/// Opening line of a new conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationStarted {
    pub session_id: Uuid,
    pub ai_response: String,
    pub level: u32,
}

/// Reply of the start route, bare or wrapped in the handler envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StartReply {
    Started(ConversationStarted),
    Relayed(HandlerEnvelope),
}

impl StartReply {
    /// The started conversation; a failed inner status becomes a status error
    pub fn into_started(self) -> Result<ConversationStarted> {
        match self {
            StartReply::Started(started) => Ok(started),
            StartReply::Relayed(envelope) => envelope.into_started(),
        }
    }
}

/// One salesperson message in an open session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinueConversation {
    pub session_id: Uuid,
    pub user_input: String,
}

impl ContinueConversation {
    pub fn new(session_id: Uuid, user_input: impl Into<String>) -> Self {
        Self {
            session_id,
            user_input: user_input.into(),
        }
    }
}

impl ConversationRequest for ContinueConversation {
    const OPERATION: Operation = Operation::ContinueConversationPost;
    type Response = ConversationTurn;

    fn validate(&self) -> Result<()> {
        if self.session_id.is_nil() {
            return Err(ClientError::InvalidRequest("'session_id' is required".to_string()));
        }
        require(&self.user_input, "user_input")
    }
}

/// Customer reply plus the sentiment scoring of the turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub session_id: Uuid,
    pub ai_response: String,
    pub conviction_score: f64,
    pub mood: String,
    pub convinced: bool,
    #[serde(default, deserialize_with = "deserialize_levels")]
    pub levels_passed: Vec<u32>,
    pub current_level: u32,
    pub progress_percentage: f64,
}

impl ConversationTurn {
    /// The customer was convinced and the session moved to the next level
    pub fn level_passed(&self) -> bool {
        self.convinced
    }
}

/// Resume the latest session for a product, or start one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartOrContinue {
    pub user_id: String,
    pub product_id: String,
    #[serde(default)]
    pub levels_passed: u32,
    #[serde(default)]
    pub progress_percentage: f64,
    #[serde(default)]
    pub reset: bool,
}

impl StartOrContinue {
    pub fn new(user_id: impl Into<String>, product_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            product_id: product_id.into(),
            levels_passed: 0,
            progress_percentage: 0.0,
            reset: false,
        }
    }

    /// Carry a progress report into the request
    pub fn resume_from(query: &ProgressQuery, report: &ProgressReport) -> Self {
        Self {
            levels_passed: report.highest_level_passed().unwrap_or(0),
            progress_percentage: report.progress_percentage,
            ..Self::new(query.user_id.clone(), query.product_id.clone())
        }
    }

    pub fn with_reset(mut self) -> Self {
        self.reset = true;
        self
    }
}

impl ConversationRequest for StartOrContinue {
    const OPERATION: Operation = Operation::StartOrContinuePost;
    type Response = SessionResume;

    fn validate(&self) -> Result<()> {
        require(&self.user_id, "user_id")?;
        require(&self.product_id, "product_id")
    }
}

/// Who wrote a history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    Salesperson,
    Customer,
}

/// One stored exchange of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub user_input: String,
    #[serde(default)]
    pub ai_response: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn speaker(&self) -> Speaker {
        if self.user_input.is_empty() {
            Speaker::Customer
        } else {
            Speaker::Salesperson
        }
    }
}

/// Outcome of start-or-continue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SessionResume {
    /// An ongoing session was found; its history in chronological order
    Resumed {
        session_id: Uuid,
        previous_messages: Vec<ChatMessage>,
    },
    /// A new conversation was started; the start handler's raw reply
    Started(HandlerEnvelope),
}

impl SessionResume {
    pub fn session_id(&self) -> Option<Uuid> {
        match self {
            SessionResume::Resumed { session_id, .. } => Some(*session_id),
            SessionResume::Started(envelope) => envelope
                .decode::<ConversationStarted>()
                .ok()
                .map(|started| started.session_id),
        }
    }
}

/// A handler reply relayed verbatim: a status code and a string body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerEnvelope {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    #[serde(default)]
    pub body: String,
}

impl HandlerEnvelope {
    fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        if !(200..300).contains(&self.status_code) {
            return Err(ClientError::from_status(self.status_code, self.body.as_bytes()));
        }
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Decode the relayed start-conversation result
    pub fn into_started(self) -> Result<ConversationStarted> {
        self.decode()
    }
}
