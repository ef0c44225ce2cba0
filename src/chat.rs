//! Assistant chat history, persisted in the `chat-storage` slot.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::store::SharedState;

pub const WELCOME_MESSAGE_ID: &str = "welcome";

const WELCOME_TEXT: &str = "Hello! I'm your AI health assistant. I'm here to help you track \
your symptoms, medications, nutrition, and answer any health-related questions you might \
have. How can I assist you today?";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChatMessageKind {
    #[default]
    Text,
    Image,
    Action,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ChatAction {
    LogSymptom,
    LogMedication,
    LogNutrition,
    Emergency,
}

/// Extra payload on image and action messages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChatMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_type: Option<ChatAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub content: String,
    pub role: ChatRole,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type", default)]
    pub kind: ChatMessageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ChatMetadata>,
}

impl ChatMessage {
    pub fn text(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            role,
            timestamp: Utc::now(),
            kind: ChatMessageKind::Text,
            metadata: None,
        }
    }

    fn welcome() -> Self {
        Self {
            id: WELCOME_MESSAGE_ID.to_string(),
            ..Self::text(ChatRole::Assistant, WELCOME_TEXT)
        }
    }
}

/// Everything stored in the `chat-storage` slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatState {
    pub messages: Vec<ChatMessage>,
}

impl Default for ChatState {
    fn default() -> Self {
        Self {
            messages: vec![ChatMessage::welcome()],
        }
    }
}

/// Shared handle over the chat history.
///
/// The loading flag is session-only and never reaches storage.
#[derive(Clone)]
pub struct ChatStore {
    state: SharedState<ChatState>,
    loading: Arc<AtomicBool>,
}

impl ChatStore {
    pub fn new(state: SharedState<ChatState>) -> Self {
        Self {
            state,
            loading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.state.read(|s| s.messages.clone()).await
    }

    pub async fn add_message(&self, message: ChatMessage) {
        debug!(id = %message.id, role = ?message.role, "Chat message added");
        self.state.update(|s| s.messages.push(message)).await;
    }

    /// Returns `false` if no message has that id.
    pub async fn update_message(&self, id: &str, f: impl FnOnce(&mut ChatMessage)) -> bool {
        self.state
            .update(|s| match s.messages.iter_mut().find(|m| m.id == id) {
                Some(message) => {
                    f(message);
                    true
                }
                None => false,
            })
            .await
    }

    pub async fn delete_message(&self, id: &str) -> bool {
        self.state
            .update(|s| {
                let before = s.messages.len();
                s.messages.retain(|m| m.id != id);
                s.messages.len() != before
            })
            .await
    }

    /// Remove every message, the welcome message included.
    pub async fn clear(&self) {
        self.state.update(|s| s.messages.clear()).await;
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    pub fn set_loading(&self, loading: bool) {
        self.loading.store(loading, Ordering::Release);
    }
}
