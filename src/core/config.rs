use serde::{Deserialize, Serialize};

use super::{
    error::ConfigError,
    stream::{
        assembler::Assembler,
        rewrite::{RewriteChain, RewriteRule},
    },
};

/// One output rewrite rule, as configured
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RewriteRuleConfig {
    pub pattern: String,
    /// JavaScript-style flags; empty means `g`
    pub flags: String,
    /// JavaScript-style template (`$1`, `$&`, `$<name>`)
    pub replacement: String,
}

impl RewriteRuleConfig {
    #[inline]
    pub fn compile(&self) -> Result<RewriteRule, ConfigError> {
        RewriteRule::new(&self.pattern, &self.flags, &self.replacement)
    }
}

/// Input rewrite rule scoped to a range of message indices
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PreprocessRule {
    pub pattern: String,
    pub flags: String,
    pub replacement: String,
    /// `"start-end"` or `"start:end"`, inclusive; negative counts from the end
    pub range: Option<String>,
}

/// Options of one stream-processing call
///
/// ```
/// # use cursor_stream::StreamOptions;
/// let options = StreamOptions::from_json(
///     r#"{"start": ["<a>"], "stop": ["</a>"], "outputRegex": [{"pattern": "x", "replacement": "y"}]}"#,
/// ).unwrap();
/// assert_eq!(options.output_regex[0].flags, "");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StreamOptions {
    /// Alternatives; empty means output starts immediately
    pub start: Vec<String>,
    /// Alternatives; empty means output runs to the end of the stream
    pub stop: Vec<String>,
    pub output_regex: Vec<RewriteRuleConfig>,
}

impl StreamOptions {
    #[inline]
    pub fn from_json(s: &str) -> Result<Self, ConfigError> { Ok(serde_json::from_str(s)?) }

    #[inline]
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> { Ok(toml::from_str(s)?) }

    /// Compile the rewrite rules in declaration order.
    pub fn rewrite_chain(&self) -> Result<RewriteChain, ConfigError> {
        self.output_regex.iter().map(RewriteRuleConfig::compile).collect()
    }

    /// Fresh assembler for one stream.
    #[inline]
    pub fn assembler(&self) -> Result<Assembler, ConfigError> {
        Ok(Assembler::new(self.start.clone(), self.stop.clone(), self.rewrite_chain()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_toml() {
        let options = StreamOptions::from_toml(
            r#"
            start = ["<|BEGIN|>"]
            stop = ["<|END|>", "<|STOP|>"]

            [[outputRegex]]
            pattern = "foo"
            flags = "gi"
            replacement = "bar"
            "#,
        )
        .unwrap();

        assert_eq!(options.start, ["<|BEGIN|>"]);
        assert_eq!(options.stop.len(), 2);
        assert_eq!(options.output_regex[0].flags, "gi");
        assert_eq!(options.rewrite_chain().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_fields_default() {
        let options = StreamOptions::from_json("{}").unwrap();
        assert_eq!(options, StreamOptions::default());
        assert!(options.assembler().unwrap().is_started());
    }

    #[test]
    fn test_bad_pattern_is_config_error() {
        let options = StreamOptions {
            output_regex: vec![RewriteRuleConfig { pattern: "(".into(), ..Default::default() }],
            ..Default::default()
        };
        let err = options.assembler().unwrap_err();
        assert_eq!(err.error_type(), "invalid_pattern");
    }

    #[test]
    fn test_malformed_document() {
        let err = StreamOptions::from_json(r#"{"start": "not a list"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
