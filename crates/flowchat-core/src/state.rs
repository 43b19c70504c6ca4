//! UI-agnostic conversation state types
//!
//! These are shared by every front end (the terminal window, the one-shot
//! `ask` command) and don't depend on any UI framework.

use serde::{Deserialize, Serialize};

/// Which side of the conversation a message came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Typed (or picked from a suggestion) by the user
    Outbound,
    /// Produced by the flow
    Inbound,
}

/// Lifecycle of a message bubble
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MessageStatus {
    #[default]
    Settled,
    /// Placeholder waiting for the transport to settle
    Pending,
    /// The flow answered without a `result`; the placeholder is left empty
    Abandoned,
}

/// A chat message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub direction: Direction,
    pub is_error: bool,
    #[serde(default)]
    pub status: MessageStatus,
}

impl Message {
    pub fn outbound(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            direction: Direction::Outbound,
            is_error: false,
            status: MessageStatus::Settled,
        }
    }

    pub fn inbound(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            direction: Direction::Inbound,
            is_error: false,
            status: MessageStatus::Settled,
        }
    }

    pub fn pending() -> Self {
        Self {
            status: MessageStatus::Pending,
            ..Self::inbound("")
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == MessageStatus::Pending
    }
}

/// Outcome of resolving a flow response (or a transport failure) into bot text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedReply {
    pub text: String,
    pub is_error: bool,
}

impl ResolvedReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}
