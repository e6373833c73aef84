use super::{
    config::PreprocessRule,
    error::ConfigError,
    model::{Message, MessageContent},
    stream::rewrite::RewriteRule,
};
use crate::app::constant::DEFAULT_PREPROCESS_RANGE;

/// Inclusive index range; `None` bounds are open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Range {
    start: Option<i64>,
    end: Option<i64>,
}

impl Range {
    /// `"start-end"` or `"start:end"`; either side may be empty.
    fn parse(s: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidRange(s.to_owned());

        // a leading '-' is a sign, not a separator
        let split = s.find(':').or_else(|| s.get(1..)?.find('-').map(|i| i + 1));
        let (start, end) = match split {
            Some(i) => (&s[..i], Some(&s[i + 1..])),
            None => (s, None),
        };

        let bound = |part: &str| -> Result<Option<i64>, ConfigError> {
            let part = part.trim();
            if part.is_empty() {
                return Ok(None);
            }
            part.parse::<i64>().map(Some).map_err(|_| invalid())
        };

        Ok(Self { start: bound(start)?, end: end.map(bound).transpose()?.flatten() })
    }

    /// Resolve against a list of `len` items; negative bounds count from the end.
    fn bounds(self, len: usize) -> (i64, i64) {
        let len = len as i64;
        let resolve = |n: i64| if n < 0 { len + n } else { n };
        let start = self.start.map_or(0, resolve);
        let end = self.end.map_or(len, resolve);
        (start.min(end), end.max(start))
    }
}

/// Rewrite message contents with index-scoped rules.
///
/// Every rule is applied, in order, to each message whose index falls inside
/// its range. Part lists are flattened to text first, so every returned
/// message carries [`MessageContent::Text`].
pub fn preprocess_messages(
    messages: &[Message],
    rules: &[PreprocessRule],
) -> Result<Vec<Message>, ConfigError> {
    let len = messages.len();
    let compiled = rules
        .iter()
        .map(|rule| {
            let range = Range::parse(rule.range.as_deref().unwrap_or(DEFAULT_PREPROCESS_RANGE))?;
            let regex = RewriteRule::new(&rule.pattern, &rule.flags, &rule.replacement)?;
            Ok((range.bounds(len), regex))
        })
        .collect::<Result<Vec<_>, ConfigError>>()?;

    Ok(messages
        .iter()
        .enumerate()
        .map(|(index, message)| {
            let index = index as i64;
            let mut content = message.content.to_text().into_owned();
            for ((start, end), regex) in &compiled {
                if (*start..=*end).contains(&index) {
                    content = regex.apply(&content).into_owned();
                }
            }
            Message { role: message.role, content: MessageContent::Text(content) }
        })
        .collect())
}
