pub mod log;

use super::constant::DEFAULT_INSTRUCTIONS as FALLBACK_INSTRUCTIONS;
use crate::common::utils::parse_from_env;
use alloc::borrow::Cow;
use std::sync::LazyLock;

/// Instruction text sent when the caller supplies none.
///
/// Read from environment variable "DEFAULT_INSTRUCTIONS" on first use.
pub static DEFAULT_INSTRUCTIONS: LazyLock<Cow<'static, str>> =
    LazyLock::new(|| parse_from_env("DEFAULT_INSTRUCTIONS", FALLBACK_INSTRUCTIONS));
