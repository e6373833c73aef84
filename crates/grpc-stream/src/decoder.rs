//! Streaming message decoder

use alloc::borrow::Cow;
use prost::Message;

use crate::{
    FrameError, MAX_FRAME_LEN,
    buffer::{Buffer, MessageIter},
    compression::decompress_gzip,
    frame::{FrameKind, RawMessage, read_header},
};

/// One decoded envelope
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<T> {
    /// Kind 0x00 or 0x01 payload decoded as `T`
    Message(T),
    /// Unrecognized kind; payload read as (lossy) UTF-8 text
    Other { kind: u8, text: String },
}

/// Decoding stopped at a frame that could not be processed
///
/// `messages` holds what was decoded before the failure. `unread` holds every
/// byte that was unread when the call started, so callers can attempt a
/// whole-buffer recovery of their own.
#[derive(Debug)]
pub struct DecodeFailure<T, E> {
    pub messages: Vec<T>,
    pub error: E,
    pub unread: Vec<u8>,
}

/// Decode a single envelope with the default rules
///
/// - Kind 0: Directly decode Protobuf message
/// - Kind 1: First gzip decompress, then decode
/// - Other kinds: surfaced as text, never decoded
pub fn decode_raw<T: Message + Default>(raw: RawMessage<'_>) -> Result<Decoded<T>, FrameError> {
    let data = match raw.kind {
        FrameKind::Plain => Cow::Borrowed(raw.data),
        FrameKind::Gzipped => Cow::Owned(decompress_gzip(raw.data).ok_or(FrameError::Decompress)?),
        FrameKind::Other(kind) => {
            return Ok(Decoded::Other { kind, text: String::from_utf8_lossy(raw.data).into_owned() });
        }
    };
    Ok(Decoded::Message(T::decode(&*data)?))
}

/// Decode every envelope of a buffer that is expected to hold whole frames
///
/// Unlike [`StreamDecoder`] a trailing partial frame is an error
/// ([`FrameError::Incomplete`]), and so is any frame `processor` rejects.
pub fn decode_buffer<T, E, F>(data: &[u8], mut processor: F) -> Result<Vec<T>, DecodeFailure<T, E>>
where
    F: FnMut(RawMessage<'_>) -> Result<Option<T>, E>,
    E: From<FrameError>,
{
    let mut iter = MessageIter::new(data);
    let mut messages = Vec::with_capacity(iter.len());

    let error = loop {
        match iter.next() {
            Some(raw) => match processor(raw) {
                Ok(Some(msg)) => messages.push(msg),
                Ok(None) => {}
                Err(e) => break Some(e),
            },
            None if iter.remaining().is_empty() => break None,
            None => {
                break Some(E::from(FrameError::Incomplete {
                    offset: iter.offset(),
                    available: iter.remaining().len(),
                }));
            }
        }
    };

    match error {
        None => Ok(messages),
        Some(error) => Err(DecodeFailure { messages, error, unread: data.to_vec() }),
    }
}

/// Streaming envelope decoder
///
/// Processes incremental data chunks, parses complete Protobuf messages.
/// A frame split across chunks stays buffered until the rest arrives.
///
/// # Example
///
/// ```
/// use grpc_stream::{Decoded, StreamDecoder, encode_message_framed};
/// use prost::Message;
///
/// #[derive(Clone, PartialEq, Message)]
/// struct MyMessage {
///     #[prost(string, tag = "1")]
///     content: String,
/// }
///
/// let frame = encode_message_framed(&MyMessage { content: "hi".into() }, false).unwrap();
/// let mut decoder = StreamDecoder::new();
///
/// assert!(decoder.decode_default::<MyMessage>(&frame[..3]).unwrap().is_empty());
/// let messages = decoder.decode_default::<MyMessage>(&frame[3..]).unwrap();
/// assert_eq!(messages, vec![Decoded::Message(MyMessage { content: "hi".into() })]);
/// ```
#[derive(Debug, Default)]
pub struct StreamDecoder {
    buffer: Buffer,
}

impl StreamDecoder {
    #[inline]
    pub fn new() -> Self { Self { buffer: Buffer::with_capacity(64) } }

    /// Bytes of a partial frame still waiting for the rest
    #[inline]
    pub fn pending(&self) -> usize { self.buffer.len() }

    /// Take the buffered partial frame, leaving the decoder empty
    #[inline]
    pub fn take_pending(&mut self) -> Vec<u8> { self.buffer.take_remaining() }

    /// Decode data chunk with custom processor
    ///
    /// `processor` receives each complete frame in wire order. Returning
    /// `Err` stops decoding: the whole unread buffer is handed back inside
    /// [`DecodeFailure`] and the decoder starts over empty. A pending header
    /// declaring more than [`MAX_FRAME_LEN`] fails the same way with
    /// [`FrameError::TooLarge`] instead of being waited on.
    pub fn decode<T, E, F>(
        &mut self,
        data: &[u8],
        mut processor: F,
    ) -> Result<Vec<T>, DecodeFailure<T, E>>
    where
        F: FnMut(RawMessage<'_>) -> Result<Option<T>, E>,
        E: From<FrameError>,
    {
        self.buffer.extend_from_slice(data);

        let mut messages = Vec::new();
        let mut failure = None;

        let consumed = {
            let mut iter = (&self.buffer).into_iter();
            messages.reserve(iter.len());

            for raw_msg in iter.by_ref() {
                match processor(raw_msg) {
                    Ok(Some(msg)) => messages.push(msg),
                    Ok(None) => {}
                    Err(e) => {
                        failure = Some(e);
                        break;
                    }
                }
            }

            if failure.is_none() {
                match read_header(iter.remaining()) {
                    Some((_, len)) if len > MAX_FRAME_LEN => {
                        failure = Some(E::from(FrameError::TooLarge { size: len, max: MAX_FRAME_LEN }));
                    }
                    _ => {}
                }
            }
            iter.offset()
        };

        if let Some(error) = failure {
            let unread = self.buffer.take_remaining();
            return Err(DecodeFailure { messages, error, unread });
        }

        self.buffer.advance(consumed);
        Ok(messages)
    }

    /// Decode data chunk with [`decode_raw`]
    #[inline]
    pub fn decode_default<T: Message + Default>(
        &mut self,
        data: &[u8],
    ) -> Result<Vec<Decoded<T>>, DecodeFailure<Decoded<T>, FrameError>> {
        self.decode(data, |raw| decode_raw(raw).map(Some))
    }
}
