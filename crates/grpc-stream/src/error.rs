/// Errors raised while framing or unframing envelopes.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Header or payload runs past the end of the available bytes.
    #[error("incomplete frame at offset {offset}: {available} bytes available")]
    Incomplete { offset: usize, available: usize },

    /// A kind 0x01 payload that does not gunzip.
    #[error("payload is not valid gzip data")]
    Decompress,

    /// The (decompressed) payload is not a valid record.
    #[error("invalid protobuf payload: {0}")]
    Decode(#[from] prost::DecodeError),

    /// Encoded record exceeds the envelope size limit.
    #[error("message too large ({size} bytes, max {max})")]
    TooLarge { size: usize, max: usize },
}
