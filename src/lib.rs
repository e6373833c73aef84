//! Request packing and response decoding for the Cursor chat stream.
//!
//! Outbound, caller chat turns become a [`ChatMessage`] record, which is
//! verified, protobuf-encoded and wrapped in the `[kind][len][payload]`
//! envelope (gzipped from five turns on). Inbound, raw transport chunks are
//! reassembled into envelopes, decoded into content text, rewritten by an
//! ordered regex chain and cut between start/stop markers by the
//! [`Assembler`].
//!
//! ```
//! use cursor_stream::{StreamOptions, TextStream};
//!
//! let options = StreamOptions {
//!     start: vec!["<|BEGIN|>".into()],
//!     stop: vec!["<|END|>".into()],
//!     ..Default::default()
//! };
//! let chunks = ["noise<|BEGIN|>", "hello ", "world<|END|>trailing"]
//!     .into_iter()
//!     .map(Ok::<_, std::convert::Infallible>);
//!
//! let text: String = TextStream::new(chunks, options.assembler().unwrap())
//!     .map(Result::unwrap)
//!     .collect();
//! assert_eq!(text, "hello world");
//! ```

extern crate alloc;

pub mod app;
pub mod common;
pub mod core;

pub use crate::core::{
    aiserver::v1::{ChatMessage, ResMessage, Verify},
    body::{build_chat_message, encode_chat_message, generate_body},
    config::{PreprocessRule, RewriteRuleConfig, StreamOptions},
    error::{ConfigError, EncodeError},
    model::{ContentPart, Message, MessageContent, Role},
    preprocess::preprocess_messages,
    stream::{
        assembler::{Assembler, ProcessedStream, Step, TextStream},
        decoder::{
            ChunkDecoder, ContentIter, ContentStream, Diagnostic, DiagnosticSink, ResponseDecoder,
        },
        rewrite::{RewriteChain, RewriteRule},
        scanner::{MarkerMatch, MarkerSet},
    },
};
