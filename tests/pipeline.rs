use bytes::Bytes;
use core::convert::Infallible;
use std::sync::{Arc, Mutex};

use cursor_stream::{
    ChunkDecoder, ContentIter, ContentStream, Diagnostic, Message, PreprocessRule, ProcessedStream,
    ResMessage, ResponseDecoder, StreamOptions, TextStream, generate_body, preprocess_messages,
};
use futures_util::StreamExt as _;
use grpc_stream::{FrameKind, encode_frame, encode_message_framed};

fn response(contents: &[&str]) -> Vec<u8> {
    let mut wire = Vec::new();
    for (i, content) in contents.iter().enumerate() {
        let msg = ResMessage { content: Some((*content).to_owned()), ..Default::default() };
        wire.extend(encode_message_framed(&msg, i % 2 == 1).unwrap());
    }
    wire
}

fn chunked(wire: &[u8], size: usize) -> Vec<Result<Bytes, Infallible>> {
    wire.chunks(size).map(|c| Ok(Bytes::copy_from_slice(c))).collect()
}

fn options() -> StreamOptions {
    StreamOptions::from_json(
        r#"{
            "start": ["<answer>"],
            "stop": ["</answer>"],
            "outputRegex": [{"pattern": "colour", "flags": "gi", "replacement": "color"}]
        }"#,
    )
    .unwrap()
}

#[test]
fn test_wire_to_text() {
    let wire = response(&["thinking...<ans", "wer>The Colour", " is blue</ans", "wer> bye"]);

    for size in [1, 3, 7, 64, wire.len()] {
        let content = ContentIter::new(chunked(&wire, size).into_iter(), ResponseDecoder::default());
        let text: String = TextStream::new(content, options().assembler().unwrap())
            .map(Result::unwrap)
            .collect();
        assert_eq!(text, "The color is blue", "chunk size {size}");
    }
}

#[test]
fn test_diagnostics_reach_sink() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let decoder = ChunkDecoder::with_diagnostics(move |d| {
        if let Diagnostic::UnknownFrame { message, .. } = d {
            sink.lock().unwrap().push(message.clone());
        }
    });

    let mut wire = response(&["a"]);
    wire.extend(encode_frame(FrameKind::Other(3), b"quota exceeded").unwrap());
    wire.extend(response(&["b"]));

    let content = ContentIter::new(chunked(&wire, 4).into_iter(), ResponseDecoder::new(decoder));
    let text: String = content.map(Result::unwrap).collect();

    assert_eq!(text, "ab");
    assert_eq!(*seen.lock().unwrap(), ["quota exceeded"]);
}

#[test]
fn test_request_body_after_preprocessing() {
    let messages: Vec<Message> = serde_json::from_str(
        r#"[
            {"role": "system", "content": "secret"},
            {"role": "user", "content": [{"text": "hi"}, {"text": "there"}]}
        ]"#,
    )
    .unwrap();
    let rules: Vec<PreprocessRule> =
        serde_json::from_str(r#"[{"pattern": "secret", "replacement": "***", "range": "0-0"}]"#)
            .unwrap();

    let messages = preprocess_messages(&messages, &rules).unwrap();
    assert_eq!(messages[0].content.to_text(), "***");
    assert_eq!(messages[1].content.to_text(), "hi\nthere");

    let body = generate_body(&messages, "gpt-4o", None).unwrap();
    assert_eq!(body[0], 0x00);
    assert_eq!(u32::from_be_bytes(body[1..5].try_into().unwrap()) as usize, body.len() - 5);
}

#[tokio::test]
async fn test_async_pipeline_stops_early() {
    let wire = response(&["<answer>streamed", " text</answer>"]);
    let mut chunks = chunked(&wire, 5);
    // garbage after the stop marker is never polled
    chunks.push(Ok(Bytes::from_static(&[0xff; 3])));

    let source = futures_util::stream::iter(chunks);
    let content = ContentStream::new(source, ResponseDecoder::default());
    let out: Vec<String> = ProcessedStream::new(content, options().assembler().unwrap())
        .map(Result::unwrap)
        .collect()
        .await;

    assert_eq!(out.concat(), "streamed text");
}
