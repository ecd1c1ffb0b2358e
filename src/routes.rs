//! Fixed route table of the negotiation API

use std::fmt;
use std::str::FromStr;

use crate::error::ClientError;
use crate::transport::HttpMethod;

pub const CHECK_PROGRESS: &str = "/check-progress";
pub const CONTINUE_CONVERSATION: &str = "/continue-conversation";
pub const RESET_PROGRESS: &str = "/reset-progress";
pub const START_CONVERSATION: &str = "/start-conversation";
pub const START_OR_CONTINUE: &str = "/start-or-continue";

/// A fixed (method, path) pair exposed by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Route {
    pub method: HttpMethod,
    pub path: &'static str,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// The ten named operations of the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CheckProgressPost,
    CheckProgressOptions,
    ContinueConversationPost,
    ContinueConversationOptions,
    ResetProgressPost,
    ResetProgressOptions,
    StartConversationPost,
    StartConversationOptions,
    StartOrContinuePost,
    StartOrContinueOptions,
}

const fn post(path: &'static str) -> Route {
    Route {
        method: HttpMethod::Post,
        path,
    }
}

const fn options(path: &'static str) -> Route {
    Route {
        method: HttpMethod::Options,
        path,
    }
}

/// Operation to route lookup table
pub const ROUTES: [(Operation, Route); 10] = [
    (Operation::CheckProgressPost, post(CHECK_PROGRESS)),
    (Operation::CheckProgressOptions, options(CHECK_PROGRESS)),
    (Operation::ContinueConversationPost, post(CONTINUE_CONVERSATION)),
    (Operation::ContinueConversationOptions, options(CONTINUE_CONVERSATION)),
    (Operation::ResetProgressPost, post(RESET_PROGRESS)),
    (Operation::ResetProgressOptions, options(RESET_PROGRESS)),
    (Operation::StartConversationPost, post(START_CONVERSATION)),
    (Operation::StartConversationOptions, options(START_CONVERSATION)),
    (Operation::StartOrContinuePost, post(START_OR_CONTINUE)),
    (Operation::StartOrContinueOptions, options(START_OR_CONTINUE)),
];

impl Operation {
    pub const ALL: [Operation; 10] = [
        Operation::CheckProgressPost,
        Operation::CheckProgressOptions,
        Operation::ContinueConversationPost,
        Operation::ContinueConversationOptions,
        Operation::ResetProgressPost,
        Operation::ResetProgressOptions,
        Operation::StartConversationPost,
        Operation::StartConversationOptions,
        Operation::StartOrContinuePost,
        Operation::StartOrContinueOptions,
    ];

    /// The route this operation is bound to
    pub fn route(self) -> Route {
        ROUTES[self as usize].1
    }

    pub fn name(self) -> &'static str {
        match self {
            Operation::CheckProgressPost => "check_progress_post",
            Operation::CheckProgressOptions => "check_progress_options",
            Operation::ContinueConversationPost => "continue_conversation_post",
            Operation::ContinueConversationOptions => "continue_conversation_options",
            Operation::ResetProgressPost => "reset_progress_post",
            Operation::ResetProgressOptions => "reset_progress_options",
            Operation::StartConversationPost => "start_conversation_post",
            Operation::StartConversationOptions => "start_conversation_options",
            Operation::StartOrContinuePost => "start_or_continue_post",
            Operation::StartOrContinueOptions => "start_or_continue_options",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| ClientError::InvalidRequest(format!("Unknown operation '{}'", s)))
    }
}
