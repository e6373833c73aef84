//! Raw message frame definition

/// Size of the envelope header: 1 byte kind + 4 bytes big-endian length.
pub const HEADER_LEN: usize = 5;

/// Envelope kind tag, decoded from the first header byte.
///
/// Upstream uses unrecognized tags to carry plain-text diagnostics; readers
/// still step over them by `length`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// Protobuf record as-is
    Plain,
    /// Gzip-compressed protobuf record
    Gzipped,
    /// Anything else; payload is a UTF-8 diagnostic string
    Other(u8),
}

impl FrameKind {
    #[inline]
    pub const fn from_byte(byte: u8) -> Self {
        match byte {
            0x00 => Self::Plain,
            0x01 => Self::Gzipped,
            other => Self::Other(other),
        }
    }

    #[inline]
    pub const fn as_byte(self) -> u8 {
        match self {
            Self::Plain => 0x00,
            Self::Gzipped => 0x01,
            Self::Other(b) => b,
        }
    }
}

/// Raw frame of a streaming message
///
/// Contains frame header information and reference to message data.
///
/// # Frame Format
///
/// ```text
/// +------+----------+----------------+
/// | kind | length   | data           |
/// | 1B   | 4B (BE)  | length bytes   |
/// +------+----------+----------------+
/// ```
///
/// - `kind`: see [`FrameKind`]
/// - `length`: Message body length as transmitted (post-compression)
/// - `data`: Message body data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMessage<'b> {
    pub kind: FrameKind,

    /// Message body data, exactly `length` bytes
    pub data: &'b [u8],
}

impl RawMessage<'_> {
    /// Total bytes this message occupies on the wire
    ///
    /// ```
    /// # use grpc_stream::{FrameKind, RawMessage};
    /// let msg = RawMessage { kind: FrameKind::Plain, data: &[1, 2, 3] };
    /// assert_eq!(msg.total_size(), 8); // 5 + 3
    /// ```
    #[inline]
    pub const fn total_size(&self) -> usize { HEADER_LEN + self.data.len() }
}

/// Read the header at the start of `buf`.
///
/// Returns `None` when fewer than [`HEADER_LEN`] bytes are available.
#[inline]
pub fn read_header(buf: &[u8]) -> Option<(FrameKind, usize)> {
    let header: &[u8; HEADER_LEN] = buf.get(..HEADER_LEN)?.try_into().ok()?;
    let len = u32::from_be_bytes([header[1], header[2], header[3], header[4]]) as usize;
    Some((FrameKind::from_byte(header[0]), len))
}
