//! Envelope encoding

use bytes::BufMut as _;
use prost::Message;

use crate::{
    FrameError, MAX_DECOMPRESSED_SIZE_BYTES,
    compression::compress_gzip,
    frame::{FrameKind, HEADER_LEN},
};

/// Wrap an already-encoded payload in an envelope header.
///
/// ```text
/// [kind 1B][payload length 4B BE][payload]
/// ```
pub fn encode_frame(kind: FrameKind, payload: &[u8]) -> Result<Vec<u8>, FrameError> {
    let len = u32::try_from(payload.len())
        .map_err(|_| FrameError::TooLarge { size: payload.len(), max: u32::MAX as usize })?;

    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
    frame.put_u8(kind.as_byte());
    frame.put_u32(len);
    frame.put_slice(payload);
    Ok(frame)
}

/// Encode a protobuf message into one complete envelope.
///
/// With `compress` set the encoded record is gzipped and tagged
/// [`FrameKind::Gzipped`], otherwise it goes out as [`FrameKind::Plain`].
///
/// # Errors
/// [`FrameError::TooLarge`] when the encoded record exceeds
/// [`MAX_DECOMPRESSED_SIZE_BYTES`]; the receiving side would refuse it anyway.
pub fn encode_message_framed(
    message: &impl Message,
    compress: bool,
) -> Result<Vec<u8>, FrameError> {
    let encoded_len = message.encoded_len();

    if encoded_len > MAX_DECOMPRESSED_SIZE_BYTES {
        return Err(FrameError::TooLarge { size: encoded_len, max: MAX_DECOMPRESSED_SIZE_BYTES });
    }

    let encoded = message.encode_to_vec();

    if compress {
        encode_frame(FrameKind::Gzipped, &compress_gzip(&encoded))
    } else {
        encode_frame(FrameKind::Plain, &encoded)
    }
}
