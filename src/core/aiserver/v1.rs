use alloc::borrow::Cow;

use crate::app::constant::{ROLE_ASSISTANT, ROLE_USER};

/// Outbound chat request
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChatMessage {
    #[prost(message, repeated, tag = "2")]
    pub user_messages: Vec<chat_message::UserMessage>,
    #[prost(message, optional, tag = "4")]
    pub instructions: Option<chat_message::Instructions>,
    #[prost(message, optional, tag = "7")]
    pub model: Option<chat_message::Model>,
    #[prost(uint32, optional, tag = "13")]
    pub unknown13: Option<u32>,
    #[prost(string, tag = "15")]
    pub conversation_id: String,
    #[prost(uint32, optional, tag = "16")]
    pub unknown16: Option<u32>,
    #[prost(uint32, optional, tag = "29")]
    pub unknown29: Option<u32>,
    #[prost(uint32, optional, tag = "31")]
    pub unknown31: Option<u32>,
}

/// Nested message and enum types in `ChatMessage`.
pub mod chat_message {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct UserMessage {
        #[prost(string, tag = "1")]
        pub content: String,
        /// 1 = user, 2 = assistant
        #[prost(uint32, tag = "2")]
        pub role: u32,
        #[prost(string, tag = "13")]
        pub message_id: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Instructions {
        #[prost(string, tag = "1")]
        pub instruction: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Model {
        #[prost(string, tag = "1")]
        pub name: String,
        #[prost(string, optional, tag = "4")]
        pub empty: Option<String>,
    }
}

/// Inbound response record
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ResMessage {
    #[prost(string, optional, tag = "1")]
    pub content: Option<String>,
    #[prost(string, tag = "4")]
    pub empty: String,
    /// Filled prompt echoed by compressed frames; never surfaced
    #[prost(string, tag = "5")]
    pub prompt: String,
}

/// Structural check run before a record goes on the wire.
///
/// `Err` carries a human-readable reason naming the offending field.
pub trait Verify {
    fn verify(&self) -> Result<(), Cow<'static, str>>;
}

impl Verify for ChatMessage {
    /// Only roles are checked. Empty ids, names and instructions are sent as
    /// they are.
    fn verify(&self) -> Result<(), Cow<'static, str>> {
        for (i, msg) in self.user_messages.iter().enumerate() {
            if msg.role != ROLE_USER && msg.role != ROLE_ASSISTANT {
                return Err(Cow::Owned(format!(
                    "userMessages[{i}].role: {ROLE_USER} or {ROLE_ASSISTANT} expected, got {}",
                    msg.role
                )));
            }
        }
        Ok(())
    }
}
