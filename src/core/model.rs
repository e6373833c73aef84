use alloc::borrow::Cow;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContentPart {
    #[serde(default)]
    pub text: String,
}

/// Message body as chat clients send it: plain text or a list of parts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// Flatten to text; parts are joined with `\n`.
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(s) => Cow::Borrowed(s),
            Self::Parts(parts) => match parts.as_slice() {
                [] => Cow::Borrowed(""),
                [one] => Cow::Borrowed(&one.text),
                parts => Cow::Owned(
                    parts.iter().map(|p| p.text.as_str()).collect::<Vec<_>>().join("\n"),
                ),
            },
        }
    }
}

impl From<String> for MessageContent {
    #[inline]
    fn from(s: String) -> Self { Self::Text(s) }
}

impl From<&str> for MessageContent {
    #[inline]
    fn from(s: &str) -> Self { Self::Text(s.to_owned()) }
}

/// One chat turn from the caller
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: MessageContent,
}

impl Message {
    #[inline]
    pub fn new(role: Role, content: impl Into<MessageContent>) -> Self {
        Self { role, content: content.into() }
    }

    #[inline]
    pub fn user(content: impl Into<MessageContent>) -> Self { Self::new(Role::User, content) }

    #[inline]
    pub fn assistant(content: impl Into<MessageContent>) -> Self {
        Self::new(Role::Assistant, content)
    }
}
