//! Reassembly buffer for frames split across transport chunks

use crate::frame::{HEADER_LEN, RawMessage, read_header};
use core::iter::FusedIterator;

/// Byte buffer with a read cursor
///
/// Bytes before `cursor` have already been consumed as complete frames.
/// The consumed prefix is reclaimed lazily on the next append.
#[derive(Debug, Default)]
pub struct Buffer {
    inner: Vec<u8>,
    cursor: usize,
}

impl Buffer {
    #[inline]
    pub fn new() -> Self { Self { inner: Vec::new(), cursor: 0 } }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { inner: Vec::with_capacity(capacity), cursor: 0 }
    }

    #[inline]
    pub fn len(&self) -> usize { self.inner.len() - self.cursor }

    #[inline]
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    #[inline]
    pub fn extend_from_slice(&mut self, data: &[u8]) {
        self.try_reclaim();
        self.inner.extend_from_slice(data)
    }

    /// Mark `cnt` bytes as consumed. Clamped to the unread length.
    #[inline]
    pub fn advance(&mut self, cnt: usize) { self.cursor += cnt.min(self.len()) }

    /// Drop all unread bytes and return them.
    pub fn take_remaining(&mut self) -> Vec<u8> {
        let rest = self.inner.split_off(self.cursor);
        self.inner.clear();
        self.cursor = 0;
        rest
    }

    /// reset if empty, compact once the consumed prefix dominates
    #[inline]
    fn try_reclaim(&mut self) {
        if self.is_empty() {
            self.inner.clear();
            self.cursor = 0
        } else if self.cursor > self.inner.len() / 2 {
            self.inner.drain(..self.cursor);
            self.cursor = 0
        }
    }
}

impl AsRef<[u8]> for Buffer {
    #[inline]
    fn as_ref(&self) -> &[u8] { &self.inner[self.cursor..] }
}

/// Iterator over the complete frames of a byte slice
///
/// Stops at the first frame whose header or payload is not fully present;
/// [`MessageIter::offset`] then points at the start of that partial frame.
#[derive(Debug, Clone)]
pub struct MessageIter<'b> {
    buffer: &'b [u8],
    offset: usize,
}

impl<'b> MessageIter<'b> {
    #[inline]
    pub const fn new(buffer: &'b [u8]) -> Self { Self { buffer, offset: 0 } }

    /// Bytes consumed so far; always a frame boundary
    #[inline]
    pub fn offset(&self) -> usize { self.offset }

    /// Unconsumed tail of the underlying slice
    #[inline]
    pub fn remaining(&self) -> &'b [u8] { &self.buffer[self.offset..] }
}

impl<'b> Iterator for MessageIter<'b> {
    type Item = RawMessage<'b>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.remaining();
        let (kind, msg_len) = read_header(rest)?;

        // payload must be fully present
        let data = rest.get(HEADER_LEN..HEADER_LEN.checked_add(msg_len)?)?;
        self.offset += HEADER_LEN + msg_len;

        Some(RawMessage { kind, data })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let count = self.len();
        (count, Some(count))
    }
}

impl ExactSizeIterator for MessageIter<'_> {
    fn len(&self) -> usize {
        let mut count = 0;
        let mut offset = self.offset;

        while let Some((_, msg_len)) = read_header(&self.buffer[offset..]) {
            let end = offset + HEADER_LEN + msg_len;
            if end > self.buffer.len() {
                break;
            }
            count += 1;
            offset = end;
        }

        count
    }
}

impl FusedIterator for MessageIter<'_> {}

impl<'b> IntoIterator for &'b Buffer {
    type Item = RawMessage<'b>;
    type IntoIter = MessageIter<'b>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter { MessageIter::new(self.as_ref()) }
}
