#[macro_export]
macro_rules! def_pub_const {
    ($($(#[$meta:meta])* $name:ident = $value:expr),+ $(,)?) => {
        $(
            $(#[$meta])*
            pub const $name: &'static str = $value;
        )+
    };
}

#[macro_export]
macro_rules! define_typed_constants {
    // Recursive case: process one type block, then continue with remaining
    (
        $vis:vis $ty:ty => {
            $(
                $(#[$attr:meta])*
                $name:ident = $value:expr
            ),* $(,)?
        }
        $($rest:tt)*
    ) => {
        $(
            $(#[$attr])*
            $vis const $name: $ty = $value;
        )*

        $crate::define_typed_constants! {
            $($rest)*
        }
    };

    // Base case: stop when no more content
    () => {};
}

// Package related constants
def_pub_const!(
    PKG_VERSION = env!("CARGO_PKG_VERSION"),
    PKG_NAME = env!("CARGO_PKG_NAME"),
);

def_pub_const!(
    EMPTY_STRING = "",
    /// Used when neither the caller nor `DEFAULT_INSTRUCTIONS` provides one
    DEFAULT_INSTRUCTIONS = "Respond in the same language as the user by default.",
    /// Range applied by a preprocessing rule without one: every message
    DEFAULT_PREPROCESS_RANGE = "0:",
);

define_typed_constants! {
    pub usize => {
        /// Requests carrying at least this many turns are gzipped
        GZIP_TURN_THRESHOLD = 5,
    }
    pub u32 => {
        ROLE_USER = 1,
        ROLE_ASSISTANT = 2,
        /// Fixed protocol flags of the chat request
        FLAG_UNKNOWN13 = 1,
        FLAG_UNKNOWN16 = 1,
        FLAG_UNKNOWN29 = 1,
        FLAG_UNKNOWN31 = 0,
    }
}
