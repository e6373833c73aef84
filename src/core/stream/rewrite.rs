//! Ordered regex substitutions over streamed text

use alloc::borrow::Cow;
use regex::{Regex, RegexBuilder};

use crate::core::error::ConfigError;

/// A compiled substitution rule
///
/// Flags follow JavaScript `RegExp`: `g` replaces every match (implied when
/// no flags are given at all), `i`, `m` and `s` map to the regex options of
/// the same meaning, `u` and `d` are accepted and ignored. Anything else,
/// including sticky `y`, is rejected.
#[derive(Debug, Clone)]
pub struct RewriteRule {
    regex: Regex,
    replacement: String,
    global: bool,
}

impl RewriteRule {
    pub fn new(pattern: &str, flags: &str, replacement: &str) -> Result<Self, ConfigError> {
        let mut builder = RegexBuilder::new(pattern);
        let mut global = flags.is_empty();

        for flag in flags.chars() {
            match flag {
                'g' => global = true,
                'i' => {
                    builder.case_insensitive(true);
                }
                'm' => {
                    builder.multi_line(true);
                }
                's' => {
                    builder.dot_matches_new_line(true);
                }
                'u' | 'd' => {}
                flag => {
                    return Err(ConfigError::UnsupportedFlag { flag, flags: flags.to_owned() });
                }
            }
        }

        let regex = builder.build().map_err(|e| ConfigError::InvalidPattern {
            pattern: pattern.to_owned(),
            source: Box::new(e),
        })?;
        let replacement = translate_template(replacement, regex.captures_len() - 1);

        Ok(Self { regex, replacement, global })
    }

    #[inline]
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        if self.global {
            self.regex.replace_all(text, self.replacement.as_str())
        } else {
            self.regex.replace(text, self.replacement.as_str())
        }
    }
}

/// Rules applied left to right, each to the previous rule's output
#[derive(Debug, Clone, Default)]
pub struct RewriteChain {
    rules: Vec<RewriteRule>,
}

impl RewriteChain {
    #[inline]
    pub const fn new() -> Self { Self { rules: Vec::new() } }

    #[inline]
    pub fn push(&mut self, rule: RewriteRule) { self.rules.push(rule) }

    #[inline]
    pub fn len(&self) -> usize { self.rules.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.rules.is_empty() }

    /// Borrows `text` untouched when no rule matched.
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        let mut out = Cow::Borrowed(text);
        for rule in &self.rules {
            let next = match rule.apply(&out) {
                Cow::Borrowed(_) => None,
                Cow::Owned(s) => Some(s),
            };
            if let Some(s) = next {
                out = Cow::Owned(s);
            }
        }
        out
    }
}

impl FromIterator<RewriteRule> for RewriteChain {
    #[inline]
    fn from_iter<I: IntoIterator<Item = RewriteRule>>(iter: I) -> Self {
        Self { rules: iter.into_iter().collect() }
    }
}

/// Translate a JavaScript replacement template into `regex` syntax.
///
/// | JS          | meaning                 | output     |
/// |-------------|-------------------------|------------|
/// | `$$`        | literal `$`             | `$$`       |
/// | `$&`        | whole match             | `${0}`     |
/// | `$n`, `$nn` | numbered group          | `${n}`     |
/// | `$<name>`   | named group             | `${name}`  |
/// | other `$`   | literal                 | `$$`       |
///
/// Two-digit references are taken only when that group exists, as JS does.
fn translate_template(template: &str, group_count: usize) -> String {
    let bytes = template.as_bytes();
    let mut out = String::with_capacity(template.len() + 8);
    let mut i = 0;

    while let Some(offset) = template[i..].find('$') {
        out.push_str(&template[i..i + offset]);
        i += offset;

        let next = bytes.get(i + 1).copied();
        match next {
            Some(b'$') => {
                out.push_str("$$");
                i += 2;
            }
            Some(b'&') => {
                out.push_str("${0}");
                i += 2;
            }
            Some(b'<') => match template[i + 2..].find('>') {
                Some(end) => {
                    out.push_str("${");
                    out.push_str(&template[i + 2..i + 2 + end]);
                    out.push('}');
                    i += 3 + end;
                }
                None => {
                    out.push_str("$$");
                    i += 1;
                }
            },
            Some(d) if d.is_ascii_digit() => {
                let one = (d - b'0') as usize;
                let two = bytes
                    .get(i + 2)
                    .filter(|b| b.is_ascii_digit())
                    .map(|b| one * 10 + (b - b'0') as usize);

                match two {
                    Some(n) if n >= 1 && n <= group_count => {
                        out.push_str(&format!("${{{n}}}"));
                        i += 3;
                    }
                    _ if one >= 1 && one <= group_count => {
                        out.push_str(&format!("${{{one}}}"));
                        i += 2;
                    }
                    _ => {
                        out.push_str("$$");
                        i += 1;
                    }
                }
            }
            _ => {
                out.push_str("$$");
                i += 1;
            }
        }
    }

    out.push_str(&template[i..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(pattern: &str, flags: &str, replacement: &str) -> RewriteRule {
        RewriteRule::new(pattern, flags, replacement).unwrap()
    }

    #[test]
    fn test_rules_compose_in_order() {
        let chain: RewriteChain = [rule("a", "", "b"), rule("b", "", "c")].into_iter().collect();
        assert_eq!(chain.apply("a"), "c");
        assert_eq!(chain.apply("xyz"), "xyz");
        assert!(matches!(chain.apply("xyz"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_global_flag() {
        assert_eq!(rule("o", "", "0").apply("foo"), "f00");
        assert_eq!(rule("o", "g", "0").apply("foo"), "f00");
        // without `g` only the first match goes
        assert_eq!(rule("o", "i", "0").apply("fOo"), "f0o");
        assert_eq!(rule("O", "gi", "0").apply("fOo"), "f00");
    }

    #[test]
    fn test_multiline_and_dotall() {
        assert_eq!(rule("^x", "gm", "y").apply("x\nx"), "y\ny");
        assert_eq!(rule("a.b", "s", "-").apply("a\nb"), "-");
        assert_eq!(rule("a.b", "g", "-").apply("a\nb"), "a\nb");
    }

    #[test]
    fn test_rejected_flags() {
        let err = RewriteRule::new("a", "gy", "").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFlag { flag: 'y', .. }));
        assert!(RewriteRule::new("(", "", "").is_err());
    }

    #[test]
    fn test_template_translation() {
        assert_eq!(translate_template("[$1]", 1), "[${1}]");
        assert_eq!(translate_template("$1a", 1), "${1}a");
        assert_eq!(translate_template("$12", 1), "${1}2");
        assert_eq!(translate_template("$12", 12), "${12}");
        assert_eq!(translate_template("$&!", 0), "${0}!");
        assert_eq!(translate_template("$<word>", 1), "${word}");
        assert_eq!(translate_template("cost: $$5", 0), "cost: $$5");
        assert_eq!(translate_template("$5 $x $", 0), "$$5 $$x $$");
        assert_eq!(translate_template("$<open", 0), "$$<open");
    }

    #[test]
    fn test_js_style_replacements() {
        assert_eq!(rule(r"(\w+)@(\w+)", "g", "$2 at $1").apply("me@home"), "home at me");
        assert_eq!(rule(r"(?P<n>\d+)", "g", "<$<n>>").apply("a1b22"), "a<1>b<22>");
        assert_eq!(rule("b", "g", "[$&]").apply("abc"), "a[b]c");
        assert_eq!(rule("b", "g", "$$").apply("abc"), "a$c");
    }
}
