//! Envelope framing for the upstream streaming protocol
//!
//! Each record travels as `[kind 1B][length 4B BE][payload]`, where kind
//! `0x00` is a plain protobuf record and `0x01` a gzip-compressed one.
//! Envelopes are concatenated with nothing in between, and transport chunk
//! boundaries fall wherever they like.
//!
//! # Example
//!
//! ```
//! use grpc_stream::{Decoded, StreamDecoder, encode_message_framed};
//! use prost::Message;
//!
//! #[derive(Clone, PartialEq, Message)]
//! struct MyMessage {
//!     #[prost(string, tag = "1")]
//!     content: String,
//! }
//!
//! let wire = encode_message_framed(&MyMessage { content: "hello".into() }, true).unwrap();
//! let messages = StreamDecoder::new().decode_default::<MyMessage>(&wire).unwrap();
//!
//! for msg in messages {
//!     if let Decoded::Message(msg) = msg {
//!         println!("{}", msg.content);
//!     }
//! }
//! ```

extern crate alloc;

mod buffer;
mod compression;
mod decoder;
mod encoder;
mod error;
mod frame;

// Public API
pub use buffer::{Buffer, MessageIter};
pub use compression::{compress_gzip, decompress_gzip};
pub use decoder::{DecodeFailure, Decoded, StreamDecoder, decode_buffer, decode_raw};
pub use encoder::{encode_frame, encode_message_framed};
pub use error::FrameError;
pub use frame::{FrameKind, HEADER_LEN, RawMessage, read_header};

/// Maximum decompressed message size limit (4 MiB)
///
/// Aligned with gRPC standard default max message size, prevents memory abuse attacks
pub const MAX_DECOMPRESSED_SIZE_BYTES: usize = 0x400000; // 4 * 1024 * 1024

/// Largest envelope payload a [`StreamDecoder`] will wait for
///
/// A gzip payload may run slightly past the decoded size it carries.
pub const MAX_FRAME_LEN: usize = MAX_DECOMPRESSED_SIZE_BYTES + 1024;
