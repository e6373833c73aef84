use alloc::sync::Arc;
use core::{
    fmt,
    pin::Pin,
    task::{Context, Poll, ready},
};

use futures_core::stream::Stream;
use grpc_stream::{
    DecodeFailure, Decoded, FrameError, HEADER_LEN, RawMessage, StreamDecoder, decode_buffer,
    decode_raw, decompress_gzip,
};

use crate::{common::utils::string_builder::StringBuilder, core::aiserver::v1::ResMessage};

/// Something the decoder swallowed instead of failing
#[derive(Debug)]
pub enum Diagnostic {
    /// Envelope of a kind other than 0x00/0x01; payload read as text
    UnknownFrame { kind: u8, message: String },
    /// Parse error that cut decoding short
    Malformed(FrameError),
    /// Whole-buffer gzip fallback produced text after a parse error
    Recovered { bytes: usize },
}

/// Callback receiving every [`Diagnostic`]
pub type DiagnosticSink = Arc<dyn Fn(&Diagnostic) + Send + Sync>;

/// Decodes buffers of whole envelopes into response content
///
/// Content is concatenated in wire order without separators. Parse errors
/// never escape: if nothing was collected yet the buffer past its first
/// header is gunzipped as one block, otherwise the collected content is kept
/// and the rest dropped.
#[derive(Clone, Default)]
pub struct ChunkDecoder {
    sink: Option<DiagnosticSink>,
}

impl fmt::Debug for ChunkDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkDecoder").field("sink", &self.sink.is_some()).finish()
    }
}

impl ChunkDecoder {
    #[inline]
    pub const fn new() -> Self { Self { sink: None } }

    #[inline]
    pub fn with_diagnostics(sink: impl Fn(&Diagnostic) + Send + Sync + 'static) -> Self {
        Self { sink: Some(Arc::new(sink)) }
    }

    fn report(&self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::UnknownFrame { kind, message } => {
                crate::debug!(kind, message = %message, "non-record envelope skipped");
            }
            Diagnostic::Malformed(e) => {
                ::tracing::warn!(error = %e, "malformed envelope");
            }
            Diagnostic::Recovered { bytes } => {
                crate::debug!(bytes, "recovered text via gzip fallback");
            }
        }
        if let Some(sink) = &self.sink {
            sink(&diagnostic);
        }
    }

    /// Content of one envelope.
    ///
    /// Every decoded record yields a string, empty when `content` is unset,
    /// so it counts as collected and suppresses the gzip fallback.
    fn process(&self, raw: RawMessage<'_>) -> Result<Option<String>, FrameError> {
        match decode_raw::<ResMessage>(raw)? {
            Decoded::Message(msg) => Ok(Some(msg.content.unwrap_or_default())),
            Decoded::Other { kind, text } => {
                self.report(Diagnostic::UnknownFrame { kind, message: text });
                Ok(None)
            }
        }
    }

    pub fn decode(&self, buffer: &[u8]) -> String {
        match decode_buffer(buffer, |raw| self.process(raw)) {
            Ok(parts) => concat(&parts),
            Err(failure) => self.recover(failure),
        }
    }

    fn recover(&self, failure: DecodeFailure<String, FrameError>) -> String {
        let DecodeFailure { messages, error, unread } = failure;
        self.report(Diagnostic::Malformed(error));

        if !messages.is_empty() {
            return concat(&messages);
        }

        let text = unread
            .get(HEADER_LEN..)
            .and_then(decompress_gzip)
            .map(|data| String::from_utf8_lossy(&data).into_owned())
            .unwrap_or_default();
        if !text.is_empty() {
            self.report(Diagnostic::Recovered { bytes: text.len() });
        }
        text
    }
}

fn concat(parts: &[String]) -> String {
    let mut out = String::with_capacity(parts.iter().map(String::len).sum());
    for part in parts {
        out.append_mut(part);
    }
    out
}

/// Frame reassembly across transport chunks
///
/// [`push`](Self::push) decodes every envelope completed by the chunk and
/// keeps a trailing partial envelope for the next call.
/// [`finish`](Self::finish) runs the leftover bytes through
/// [`ChunkDecoder::decode`].
#[derive(Debug, Default)]
pub struct ResponseDecoder {
    frames: StreamDecoder,
    chunk: ChunkDecoder,
}

impl ResponseDecoder {
    #[inline]
    pub fn new(chunk: ChunkDecoder) -> Self { Self { frames: StreamDecoder::new(), chunk } }

    pub fn push(&mut self, data: impl AsRef<[u8]>) -> String {
        let chunk = &self.chunk;
        match self.frames.decode(data.as_ref(), |raw| chunk.process(raw)) {
            Ok(parts) => concat(&parts),
            Err(failure) => chunk.recover(failure),
        }
    }

    /// Bytes held back waiting for the rest of an envelope
    #[inline]
    pub fn pending(&self) -> usize { self.frames.pending() }

    pub fn finish(&mut self) -> String {
        if self.frames.pending() == 0 {
            return String::new();
        }
        let rest = self.frames.take_pending();
        self.chunk.decode(&rest)
    }
}

/// Content strings decoded from an iterator of transport chunks
///
/// Chunks that carry no content produce no item. Source errors pass
/// through unchanged.
pub struct ContentIter<I> {
    source: Option<I>,
    decoder: ResponseDecoder,
}

impl<I> ContentIter<I> {
    #[inline]
    pub fn new(source: I, decoder: ResponseDecoder) -> Self {
        Self { source: Some(source), decoder }
    }
}

impl<I, B, E> Iterator for ContentIter<I>
where
    I: Iterator<Item = Result<B, E>>,
    B: AsRef<[u8]>,
{
    type Item = Result<String, E>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let source = self.source.as_mut()?;
            match source.next() {
                Some(Ok(chunk)) => {
                    let text = self.decoder.push(chunk);
                    if !text.is_empty() {
                        return Some(Ok(text));
                    }
                }
                Some(Err(e)) => return Some(Err(e)),
                None => {
                    self.source = None;
                    let text = self.decoder.finish();
                    return (!text.is_empty()).then_some(Ok(text));
                }
            }
        }
    }
}

impl<I, B, E> core::iter::FusedIterator for ContentIter<I>
where
    I: Iterator<Item = Result<B, E>>,
    B: AsRef<[u8]>,
{
}

/// Async counterpart of [`ContentIter`]
pub struct ContentStream<S> {
    source: Option<S>,
    decoder: ResponseDecoder,
}

impl<S> ContentStream<S> {
    #[inline]
    pub fn new(source: S, decoder: ResponseDecoder) -> Self {
        Self { source: Some(source), decoder }
    }
}

impl<S, B, E> Stream for ContentStream<S>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
{
    type Item = Result<String, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            let Some(source) = this.source.as_mut() else {
                return Poll::Ready(None);
            };
            match ready!(Pin::new(source).poll_next(cx)) {
                Some(Ok(chunk)) => {
                    let text = this.decoder.push(chunk);
                    if !text.is_empty() {
                        return Poll::Ready(Some(Ok(text)));
                    }
                }
                Some(Err(e)) => return Poll::Ready(Some(Err(e))),
                None => {
                    this.source = None;
                    let text = this.decoder.finish();
                    return Poll::Ready((!text.is_empty()).then_some(Ok(text)));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use grpc_stream::{FrameKind, compress_gzip, encode_frame, encode_message_framed};
    use std::sync::Mutex;

    fn record(content: &str) -> ResMessage {
        ResMessage { content: Some(content.to_owned()), ..Default::default() }
    }

    fn frame(content: &str, gzip: bool) -> Vec<u8> {
        encode_message_framed(&record(content), gzip).unwrap()
    }

    fn collecting() -> (ChunkDecoder, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let decoder = ChunkDecoder::with_diagnostics(move |d| {
            let tag = match d {
                Diagnostic::UnknownFrame { kind, message } => format!("unknown:{kind}:{message}"),
                Diagnostic::Malformed(_) => "malformed".to_owned(),
                Diagnostic::Recovered { bytes } => format!("recovered:{bytes}"),
            };
            sink.lock().unwrap().push(tag);
        });
        (decoder, seen)
    }

    #[test]
    fn test_plain_and_gzip_round_trip() {
        let decoder = ChunkDecoder::new();
        assert_eq!(decoder.decode(&frame("hello", false)), "hello");
        assert_eq!(decoder.decode(&frame("hello", true)), "hello");
    }

    #[test]
    fn test_multi_frame_buffers() {
        let decoder = ChunkDecoder::new();
        for n in [0usize, 1, 5, 50] {
            let mut wire = Vec::new();
            let mut expected = String::new();
            for i in 0..n {
                wire.extend(frame(&format!("<{i}>"), i % 3 == 0));
                expected.push_str(&format!("<{i}>"));
            }
            assert_eq!(decoder.decode(&wire), expected, "n = {n}");
        }
    }

    #[test]
    fn test_prompt_field_is_ignored() {
        let msg = ResMessage {
            content: Some("answer".into()),
            prompt: "system prompt".into(),
            ..Default::default()
        };
        let wire = encode_message_framed(&msg, true).unwrap();
        assert_eq!(ChunkDecoder::new().decode(&wire), "answer");
    }

    #[test]
    fn test_malformed_trailing_frame_keeps_collected() {
        let (decoder, seen) = collecting();
        let mut wire = frame("kept", false);
        // header claims 100 bytes, 3 follow
        wire.extend([0, 0, 0, 0, 100, 1, 2, 3]);

        assert_eq!(decoder.decode(&wire), "kept");
        assert_eq!(*seen.lock().unwrap(), ["malformed"]);
    }

    #[test]
    fn test_contentless_record_blocks_fallback() {
        let (decoder, seen) = collecting();
        let msg = ResMessage { content: None, prompt: "hidden prompt".into(), ..Default::default() };
        let mut wire = encode_message_framed(&msg, true).unwrap();
        wire.extend([0, 0, 0, 0, 100, 1, 0, 0, 0]);

        assert_eq!(decoder.decode(&wire), "");
        assert_eq!(*seen.lock().unwrap(), ["malformed"]);
    }

    #[test]
    fn test_gzip_fallback_when_nothing_collected() {
        let (decoder, seen) = collecting();
        // bogus header followed by a bare gzip stream of text
        let mut wire = vec![0, 0, 0, 0, 1];
        wire.extend(compress_gzip(b"fallback text"));

        assert_eq!(decoder.decode(&wire), "fallback text");
        assert_eq!(*seen.lock().unwrap(), ["malformed", "recovered:13"]);
    }

    #[test]
    fn test_unrecoverable_buffer_is_empty() {
        let decoder = ChunkDecoder::new();
        assert_eq!(decoder.decode(&[0, 0, 0]), "");
        assert_eq!(decoder.decode(&[1, 0, 0, 0, 2, 0xff, 0xff]), "");
    }

    #[test]
    fn test_unknown_kind_is_reported_not_emitted() {
        let (decoder, seen) = collecting();
        let mut wire = frame("a", false);
        wire.extend(encode_frame(FrameKind::Other(2), b"rate limited").unwrap());
        wire.extend(frame("b", false));

        assert_eq!(decoder.decode(&wire), "ab");
        assert_eq!(*seen.lock().unwrap(), ["unknown:2:rate limited"]);
    }

    #[test]
    fn test_response_decoder_reassembles_split_frames() {
        let mut wire = frame("alpha ", false);
        wire.extend(frame("beta", true));

        for split in 0..=wire.len() {
            let mut decoder = ResponseDecoder::default();
            let mut out = decoder.push(&wire[..split]);
            out.push_str(&decoder.push(&wire[split..]));
            assert_eq!(decoder.pending(), 0);
            out.push_str(&decoder.finish());
            assert_eq!(out, "alpha beta", "split at {split}");
        }
    }

    #[test]
    fn test_response_decoder_flushes_partial_tail() {
        let (chunk, seen) = collecting();
        let mut decoder = ResponseDecoder::new(chunk);
        let wire = frame("whole", false);

        assert_eq!(decoder.push(&wire), "whole");
        assert_eq!(decoder.push([0u8, 0, 0]), "");
        assert_eq!(decoder.pending(), 3);
        assert_eq!(decoder.finish(), "");
        assert_eq!(*seen.lock().unwrap(), ["malformed"]);
    }

    #[test]
    fn test_response_decoder_drops_oversized_header() {
        let (chunk, seen) = collecting();
        let mut decoder = ResponseDecoder::new(chunk);

        assert_eq!(decoder.push([2u8, 0xff, 0xff, 0xff, 0xff]), "");
        assert_eq!(decoder.pending(), 0);
        assert_eq!(decoder.push(frame("next", false)), "next");
        assert_eq!(decoder.pending(), 0);
        assert_eq!(*seen.lock().unwrap(), ["malformed"]);
    }

    #[test]
    fn test_content_iter_skips_empty_chunks() {
        let wire = frame("hi", false);
        let chunks = vec![Ok::<_, Infallible>(wire[..2].to_vec()), Ok(wire[2..].to_vec())];
        let out: Vec<String> = ContentIter::new(chunks.into_iter(), ResponseDecoder::default())
            .map(Result::unwrap)
            .collect();
        assert_eq!(out, ["hi"]);
    }

    #[test]
    fn test_content_iter_passes_errors_through() {
        let chunks = vec![Ok(frame("a", false)), Err("boom"), Ok(frame("b", false))];
        let out: Vec<_> = ContentIter::new(chunks.into_iter(), ResponseDecoder::default()).collect();
        assert_eq!(out, [Ok("a".to_owned()), Err("boom"), Ok("b".to_owned())]);
    }

    #[tokio::test]
    async fn test_content_stream() {
        use futures_util::StreamExt as _;

        let mut wire = frame("one ", false);
        wire.extend(frame("two", true));
        let (a, b) = wire.split_at(7);
        let source =
            futures_util::stream::iter([Ok::<_, Infallible>(a.to_vec()), Ok(b.to_vec())]);

        let out: Vec<String> = ContentStream::new(source, ResponseDecoder::default())
            .map(Result::unwrap)
            .collect()
            .await;
        assert_eq!(out.concat(), "one two");
    }
}
