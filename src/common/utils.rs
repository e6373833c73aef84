pub mod string_builder {
    pub trait StringBuilder {
        fn append_mut(&mut self, string: &str) -> &mut Self;
    }
    impl StringBuilder for String {
        #[inline]
        fn append_mut(&mut self, string: &str) -> &mut Self {
            self.push_str(string);
            self
        }
    }
}

use alloc::borrow::Cow;

pub trait ParseFromEnv: Sized + 'static {
    type Result: Sized + From<Self> + 'static;
    fn parse_from_env(key: &str) -> Option<Self::Result>;
    #[inline]
    fn parse_from_env_or(key: &str, default: Self) -> Self::Result {
        Self::parse_from_env(key).unwrap_or_else(|| default.into())
    }
}

impl ParseFromEnv for bool {
    type Result = bool;

    #[inline]
    fn parse_from_env(key: &str) -> Option<bool> {
        let val = ::std::env::var(key).ok()?;
        match val.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ParseFromEnv for &'static str {
    type Result = Cow<'static, str>;

    /// Blank values count as unset.
    #[inline]
    fn parse_from_env(key: &str) -> Option<Cow<'static, str>> {
        let value = ::std::env::var(key).ok()?;
        let trimmed = value.trim();

        if trimmed.is_empty() {
            None
        } else if trimmed.len() == value.len() {
            Some(Cow::Owned(value))
        } else {
            Some(Cow::Owned(trimmed.to_owned()))
        }
    }
}

macro_rules! impl_parse_num_from_env {
    ($($ty:ty)*) => {
        $(
            impl ParseFromEnv for $ty {
                type Result = $ty;

                #[inline]
                fn parse_from_env(key: &str) -> Option<$ty> {
                    ::std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
                }
            }
        )*
    };
}

impl_parse_num_from_env!(usize);

#[inline]
pub fn parse_from_env<T: ParseFromEnv>(key: &str, default: T) -> T::Result {
    T::parse_from_env_or(key, default)
}

/// Largest char boundary of `s` that is `<= index`.
#[inline]
pub fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_from_env() {
        unsafe {
            std::env::set_var("CURSOR_STREAM_TEST_BOOL", " TRUE ");
            std::env::set_var("CURSOR_STREAM_TEST_BOOL_BAD", "maybe");
        }
        assert!(parse_from_env("CURSOR_STREAM_TEST_BOOL", false));
        assert!(parse_from_env("CURSOR_STREAM_TEST_BOOL_BAD", true));
        assert!(!parse_from_env("CURSOR_STREAM_TEST_BOOL_UNSET", false));
    }

    #[test]
    fn test_parse_str_from_env() {
        unsafe {
            std::env::set_var("CURSOR_STREAM_TEST_STR", "  padded  ");
            std::env::set_var("CURSOR_STREAM_TEST_STR_BLANK", "   ");
        }
        assert_eq!(parse_from_env("CURSOR_STREAM_TEST_STR", "x"), "padded");
        assert_eq!(parse_from_env("CURSOR_STREAM_TEST_STR_BLANK", "fallback"), "fallback");
        assert_eq!(parse_from_env("CURSOR_STREAM_TEST_NUM_UNSET", 7usize), 7);
    }

    #[test]
    fn test_floor_char_boundary() {
        let s = "aé"; // 'é' is two bytes
        assert_eq!(floor_char_boundary(s, 0), 0);
        assert_eq!(floor_char_boundary(s, 2), 1);
        assert_eq!(floor_char_boundary(s, 3), 3);
        assert_eq!(floor_char_boundary(s, 10), 3);
    }
}
