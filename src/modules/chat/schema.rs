use std::borrow::Cow;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::services::conversation::ConversationTurn;

/// Upper bound on one chat message, in bytes.
pub const MAX_MESSAGE_BYTES: usize = 20_000;

fn validate_message(message: &str) -> Result<(), ValidationError> {
    if message.trim().is_empty() {
        return Err(ValidationError::new("message").with_message(Cow::Borrowed("Message cannot be empty")));
    }
    if message.len() > MAX_MESSAGE_BYTES {
        return Err(ValidationError::new("message").with_message(Cow::Borrowed("Message too long")));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(custom(function = "validate_message"))]
    pub message: String,
    pub conversation_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub conversation_id: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub conversation_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum HistoryResponse {
    One {
        conversation_id: String,
        history: Vec<ConversationTurn>,
    },
    All {
        conversations: HashMap<String, Vec<ConversationTurn>>,
    },
}
