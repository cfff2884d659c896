//! User-facing messages
//!
//! Commit failures and other deliberate-action outcomes are reported here,
//! for whatever message surface the embedding application shows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Message severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
    Success,
}

impl std::fmt::Display for MessageLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERR"),
            Self::Success => write!(f, "OK"),
        }
    }
}

/// A message for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub level: MessageLevel,
    pub title: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a message stamped with the current time
    pub fn new(level: MessageLevel, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn error(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(MessageLevel::Error, title, text)
    }

    pub fn info(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(MessageLevel::Info, title, text)
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.level, self.title, self.text)
    }
}

/// Broadcasts user messages to subscribers
#[derive(Clone)]
pub struct MessageDispatcher {
    tx: broadcast::Sender<Message>,
}

impl MessageDispatcher {
    /// Create a dispatcher with the given broadcast buffer size
    pub fn new(buffer_size: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer_size);
        Self { tx }
    }

    /// Subscribe to messages
    pub fn subscribe(&self) -> broadcast::Receiver<Message> {
        self.tx.subscribe()
    }

    /// Publish a message; logged as well, so nothing is lost without subscribers
    pub fn publish(&self, message: Message) -> usize {
        match message.level {
            MessageLevel::Error => tracing::error!("{}", message),
            MessageLevel::Warning => tracing::warn!("{}", message),
            MessageLevel::Info | MessageLevel::Success => tracing::info!("{}", message),
        }
        self.tx.send(message).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for MessageDispatcher {
    fn default() -> Self {
        Self::new(100)
    }
}

impl std::fmt::Debug for MessageDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageDispatcher")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
