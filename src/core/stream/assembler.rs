use core::{
    pin::Pin,
    task::{Context, Poll, ready},
};

use futures_core::stream::Stream;

use super::{rewrite::RewriteChain, scanner::MarkerSet};
use crate::common::utils::floor_char_boundary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    NotStarted,
    Started,
    Finished,
}

/// Result of feeding one content string to an [`Assembler`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Nothing to emit yet
    Pending,
    /// Text ready for the caller
    Emit(String),
    /// A stop marker matched; the text before it, if any, is the last
    /// segment and no further input should be read
    ///
    /// A stop marker at the very front yields `Finish(None)`, never an empty
    /// segment.
    Finish(Option<String>),
}

/// Cuts rewritten content between start and stop markers
///
/// Text before the first start marker is dropped, as is everything from the
/// first stop marker on. While no stop marker has matched, a tail as long as
/// the longest stop marker is held back so a marker split across chunks is
/// never emitted in part.
#[derive(Debug, Clone)]
pub struct Assembler {
    start: MarkerSet,
    stop: MarkerSet,
    chain: RewriteChain,
    buffer: String,
    phase: Phase,
}

impl Assembler {
    pub fn new(start: Vec<String>, stop: Vec<String>, chain: RewriteChain) -> Self {
        let start = MarkerSet::new(start);
        let phase = if start.is_empty() { Phase::Started } else { Phase::NotStarted };
        Self { start, stop: MarkerSet::new(stop), chain, buffer: String::new(), phase }
    }

    #[inline]
    pub fn is_started(&self) -> bool { self.phase != Phase::NotStarted }

    #[inline]
    pub fn is_finished(&self) -> bool { self.phase == Phase::Finished }

    pub fn push(&mut self, text: &str) -> Step {
        if text.is_empty() || self.phase == Phase::Finished {
            return Step::Pending;
        }

        self.buffer.push_str(&self.chain.apply(text));

        if self.phase == Phase::NotStarted {
            let Some(found) = self.start.find(&self.buffer) else {
                return Step::Pending;
            };
            crate::debug!(marker = found.marker, "start marker matched");
            self.buffer.drain(..found.end());
            self.phase = Phase::Started;
        }

        if self.stop.is_empty() {
            return if self.buffer.is_empty() {
                Step::Pending
            } else {
                Step::Emit(core::mem::take(&mut self.buffer))
            };
        }

        if let Some(found) = self.stop.find(&self.buffer) {
            crate::debug!(marker = found.marker, "stop marker matched");
            self.buffer.truncate(found.index);
            self.phase = Phase::Finished;
            let last = core::mem::take(&mut self.buffer);
            return Step::Finish((!last.is_empty()).then_some(last));
        }

        let safe = floor_char_boundary(
            &self.buffer,
            self.buffer.len().saturating_sub(self.stop.longest()),
        );
        if safe == 0 {
            return Step::Pending;
        }
        let tail = self.buffer.split_off(safe);
        Step::Emit(core::mem::replace(&mut self.buffer, tail))
    }

    /// Flush held-back text at end of input.
    ///
    /// Yields nothing unless a start marker was seen.
    pub fn finish(&mut self) -> Option<String> {
        let started = self.phase == Phase::Started;
        self.phase = Phase::Finished;
        let rest = core::mem::take(&mut self.buffer);
        (started && !rest.is_empty()).then_some(rest)
    }
}

/// Output segments of an [`Assembler`] driven by an iterator of content
///
/// Once a stop marker matches, the source is dropped without being read
/// again. Source errors pass through and leave the assembler untouched.
pub struct TextStream<I> {
    source: Option<I>,
    assembler: Assembler,
}

impl<I> TextStream<I> {
    #[inline]
    pub fn new(source: I, assembler: Assembler) -> Self {
        Self { source: Some(source), assembler }
    }

    #[inline]
    pub fn assembler(&self) -> &Assembler { &self.assembler }
}

impl<I, T, E> Iterator for TextStream<I>
where
    I: Iterator<Item = Result<T, E>>,
    T: AsRef<str>,
{
    type Item = Result<String, E>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let source = self.source.as_mut()?;
            match source.next() {
                Some(Ok(text)) => match self.assembler.push(text.as_ref()) {
                    Step::Pending => {}
                    Step::Emit(segment) => return Some(Ok(segment)),
                    Step::Finish(last) => {
                        self.source = None;
                        return last.map(Ok);
                    }
                },
                Some(Err(e)) => return Some(Err(e)),
                None => {
                    self.source = None;
                    return self.assembler.finish().map(Ok);
                }
            }
        }
    }
}

impl<I, T, E> core::iter::FusedIterator for TextStream<I>
where
    I: Iterator<Item = Result<T, E>>,
    T: AsRef<str>,
{
}

/// Async counterpart of [`TextStream`]
pub struct ProcessedStream<S> {
    source: Option<S>,
    assembler: Assembler,
}

impl<S> ProcessedStream<S> {
    #[inline]
    pub fn new(source: S, assembler: Assembler) -> Self {
        Self { source: Some(source), assembler }
    }
}

impl<S, T, E> Stream for ProcessedStream<S>
where
    S: Stream<Item = Result<T, E>> + Unpin,
    T: AsRef<str>,
{
    type Item = Result<String, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            let Some(source) = this.source.as_mut() else {
                return Poll::Ready(None);
            };
            match ready!(Pin::new(source).poll_next(cx)) {
                Some(Ok(text)) => match this.assembler.push(text.as_ref()) {
                    Step::Pending => {}
                    Step::Emit(segment) => return Poll::Ready(Some(Ok(segment))),
                    Step::Finish(last) => {
                        this.source = None;
                        return Poll::Ready(last.map(Ok));
                    }
                },
                Some(Err(e)) => return Poll::Ready(Some(Err(e))),
                None => {
                    this.source = None;
                    return Poll::Ready(this.assembler.finish().map(Ok));
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.source {
            Some(_) => (0, None),
            None => (0, Some(0)),
        }
    }
}
