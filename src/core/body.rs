use grpc_stream::encode_message_framed;
use uuid::Uuid;

use super::{
    aiserver::v1::{
        ChatMessage, Verify as _,
        chat_message::{Instructions, Model, UserMessage},
    },
    error::EncodeError,
    model::{Message, Role},
};
use crate::app::{
    constant::{
        EMPTY_STRING, FLAG_UNKNOWN13, FLAG_UNKNOWN16, FLAG_UNKNOWN29, FLAG_UNKNOWN31,
        GZIP_TURN_THRESHOLD, ROLE_ASSISTANT, ROLE_USER,
    },
    lazy::DEFAULT_INSTRUCTIONS,
};

#[inline]
fn new_id() -> String { Uuid::new_v4().to_string() }

/// Build the chat request record for `messages`.
///
/// Every turn gets a fresh message id and the request a fresh conversation
/// id. Roles other than `user` are sent as assistant turns. Blank
/// `instructions` fall back to [`DEFAULT_INSTRUCTIONS`].
pub fn build_chat_message(
    messages: &[Message],
    model_name: &str,
    instructions: Option<&str>,
) -> ChatMessage {
    let user_messages = messages
        .iter()
        .map(|msg| UserMessage {
            content: msg.content.to_text().into_owned(),
            role: if msg.role == Role::User { ROLE_USER } else { ROLE_ASSISTANT },
            message_id: new_id(),
        })
        .collect();

    let instruction = match instructions {
        Some(s) if !s.is_empty() => s.to_owned(),
        _ => DEFAULT_INSTRUCTIONS.to_string(),
    };

    ChatMessage {
        user_messages,
        instructions: Some(Instructions { instruction }),
        model: Some(Model { name: model_name.to_owned(), empty: Some(EMPTY_STRING.to_owned()) }),
        unknown13: Some(FLAG_UNKNOWN13),
        conversation_id: new_id(),
        unknown16: Some(FLAG_UNKNOWN16),
        unknown29: Some(FLAG_UNKNOWN29),
        unknown31: Some(FLAG_UNKNOWN31),
    }
}

/// Verify and frame a chat request.
///
/// Requests of [`GZIP_TURN_THRESHOLD`] turns or more travel gzipped.
pub fn encode_chat_message(message: &ChatMessage) -> Result<Vec<u8>, EncodeError> {
    message.verify().map_err(EncodeError::Validation)?;

    let compress = message.user_messages.len() >= GZIP_TURN_THRESHOLD;
    crate::debug!(turns = message.user_messages.len(), compress, "encoding chat request");

    Ok(encode_message_framed(message, compress)?)
}

/// [`build_chat_message`] followed by [`encode_chat_message`].
#[inline]
pub fn generate_body(
    messages: &[Message],
    model_name: &str,
    instructions: Option<&str>,
) -> Result<Vec<u8>, EncodeError> {
    encode_chat_message(&build_chat_message(messages, model_name, instructions))
}
