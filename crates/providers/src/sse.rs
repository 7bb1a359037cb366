//! Server-sent-event decoding for streamed chat replies.
//!
//! The body is read as raw bytes and split on `\n`. Only `data:` lines are
//! looked at; the payload `[DONE]` ends the stream and everything else is
//! handed to the provider adapter. Lines that are blank, comments, other
//! SSE fields, or payloads that fail to parse are skipped.

use crate::adapter::{ProviderAdapter, adapter_for};
use futures::stream::{self, BoxStream, Stream, StreamExt};
use std::pin::Pin;
use std::task::{Context, Poll};
use sydia_core::error::GatewayError;
use sydia_core::provider::{ProviderKind, TextDelta};
use tracing::trace;

const DATA_PREFIX: &str = "data:";
const DONE_SENTINEL: &str = "[DONE]";
/// Longest line buffered before the stream is treated as broken.
const MAX_LINE_BYTES: usize = 1024 * 1024;

/// What a single line of an event stream means to the reader.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum StreamLine {
    /// Blank, comment, non-data field, empty or unparseable payload.
    Ignored,
    /// The `[DONE]` sentinel.
    Done,
    Delta(TextDelta),
}

pub(crate) fn classify_line(adapter: &dyn ProviderAdapter, raw: &str) -> StreamLine {
    let Some(payload) = raw.trim().strip_prefix(DATA_PREFIX) else {
        return StreamLine::Ignored;
    };
    let payload = payload.trim();
    if payload == DONE_SENTINEL {
        return StreamLine::Done;
    }
    if payload.is_empty() {
        return StreamLine::Ignored;
    }

    match adapter.parse_stream_payload(payload) {
        Ok(Some(text)) => TextDelta::new(text).map_or(StreamLine::Ignored, StreamLine::Delta),
        Ok(None) => StreamLine::Ignored,
        Err(e) => {
            trace!(provider = %adapter.kind(), error = %e, "Skipping unparseable stream payload");
            StreamLine::Ignored
        }
    }
}

/// Extract the text fragment from one raw SSE line, if it carries one.
///
/// Returns `None` for the `[DONE]` sentinel as well; use [`DeltaStream`]
/// to tell end-of-stream apart from an empty event.
pub fn parse_stream_line(kind: ProviderKind, raw: &str) -> Option<TextDelta> {
    match classify_line(adapter_for(kind), raw) {
        StreamLine::Delta(delta) => Some(delta),
        StreamLine::Ignored | StreamLine::Done => None,
    }
}

/// Splits a chunked byte stream into lines.
///
/// Bytes are buffered until a newline arrives so that multi-byte UTF-8
/// sequences cut across chunk boundaries decode intact.
struct LineReader<S> {
    source: Pin<Box<S>>,
    buf: Vec<u8>,
    exhausted: bool,
    max_line: usize,
}

impl<S, B> LineReader<S>
where
    S: Stream<Item = Result<B, GatewayError>>,
    B: AsRef<[u8]>,
{
    fn new(source: S) -> Self {
        Self::with_max_line(source, MAX_LINE_BYTES)
    }

    fn with_max_line(source: S, max_line: usize) -> Self {
        Self {
            source: Box::pin(source),
            buf: Vec::new(),
            exhausted: false,
            max_line,
        }
    }

    fn line_too_long(&self) -> GatewayError {
        GatewayError::StreamInterrupted(format!("stream line exceeds {} bytes", self.max_line))
    }

    async fn next_line(&mut self) -> Option<Result<String, GatewayError>> {
        loop {
            if let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
                if pos > self.max_line {
                    return Some(Err(self.line_too_long()));
                }
                let line: Vec<u8> = self.buf.drain(..=pos).collect();
                return Some(Ok(decode_line(&line)));
            }

            if self.buf.len() > self.max_line {
                return Some(Err(self.line_too_long()));
            }

            if self.exhausted {
                if self.buf.is_empty() {
                    return None;
                }
                let rest = std::mem::take(&mut self.buf);
                return Some(Ok(decode_line(&rest)));
            }

            match self.source.next().await {
                Some(Ok(chunk)) => self.buf.extend_from_slice(chunk.as_ref()),
                Some(Err(e)) => return Some(Err(e)),
                None => self.exhausted = true,
            }
        }
    }
}

fn decode_line(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches(['\r', '\n'])
        .to_string()
}

/// Lazy, finite stream of reply fragments.
///
/// Nothing is read from the network until the consumer polls. Dropping the
/// stream drops the response body and releases the connection. A transport
/// failure is yielded once as `Err` and ends the stream.
pub struct DeltaStream {
    inner: BoxStream<'static, Result<TextDelta, GatewayError>>,
}

impl DeltaStream {
    pub fn new<S, B>(kind: ProviderKind, source: S) -> Self
    where
        S: Stream<Item = Result<B, GatewayError>> + Send + 'static,
        B: AsRef<[u8]> + Send + 'static,
    {
        let adapter = adapter_for(kind);
        let inner = stream::unfold(Some(LineReader::new(source)), move |state| async move {
            let Some(mut reader) = state else {
                return None;
            };
            loop {
                match reader.next_line().await {
                    None => return None,
                    Some(Err(e)) => return Some((Err(e), None)),
                    Some(Ok(line)) => match classify_line(adapter, &line) {
                        StreamLine::Ignored => continue,
                        StreamLine::Done => return None,
                        StreamLine::Delta(delta) => return Some((Ok(delta), Some(reader))),
                    },
                }
            }
        })
        .boxed();

        Self { inner }
    }

    /// Drain the stream and concatenate every fragment.
    pub async fn collect_text(mut self) -> Result<String, GatewayError> {
        let mut text = String::new();
        while let Some(delta) = self.next().await {
            text.push_str(delta?.as_str());
        }
        Ok(text)
    }
}

impl Stream for DeltaStream {
    type Item = Result<TextDelta, GatewayError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

impl std::fmt::Debug for DeltaStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeltaStream").finish_non_exhaustive()
    }
}
