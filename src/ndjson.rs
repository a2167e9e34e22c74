//! Streaming newline-delimited JSON decoder.
//!
//! # Responsibilities
//! - Turn a one-shot HTTP body stream into a lazy sequence of records
//! - Reassemble lines split across arbitrary chunk boundaries
//! - Surface the first structural error immediately, with its line index
//!
//! # Design Decisions
//! - Buffers at most one in-flight line, never the whole payload
//! - A decode failure fuses the stream; records already yielded downstream
//!   are final and are not retracted
//! - The decoder takes exclusive ownership of the body, so dropping it on
//!   any exit path releases the connection exactly once

use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use futures_util::stream::{BoxStream, Stream, StreamExt};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors produced while decoding an NDJSON body.
#[derive(Debug, Error)]
pub enum NdjsonError {
    /// A line did not decode to a valid record. Carries the 1-based index
    /// of the offending line and the content that failed to decode.
    #[error("malformed record on line {line}: {detail}")]
    MalformedRecord { line: usize, detail: String },

    /// The underlying body stream failed before the payload ended.
    #[error("upstream body error: {0}")]
    Transport(String),
}

/// Lazy decoder over a newline-delimited JSON body.
///
/// Yields one decoded record per non-empty line, in input order. Empty
/// lines (including the trailing one left by a final `\n`) are skipped.
/// The stream is forward-only and not restartable.
pub struct NdjsonDecoder<T> {
    body: BoxStream<'static, Result<Bytes, NdjsonError>>,
    buf: BytesMut,
    line: usize,
    done: bool,
    // fn pointer marker keeps the decoder Unpin regardless of T
    _record: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> NdjsonDecoder<T> {
    /// Wrap a byte stream (typically `reqwest::Response::bytes_stream`).
    pub fn new<S, E>(body: S) -> Self
    where
        S: Stream<Item = Result<Bytes, E>> + Send + 'static,
        E: std::fmt::Display,
    {
        Self {
            body: body
                .map(|chunk| chunk.map_err(|e| NdjsonError::Transport(e.to_string())))
                .boxed(),
            buf: BytesMut::new(),
            line: 0,
            done: false,
            _record: PhantomData,
        }
    }

    /// Decode one physical line. Returns `None` for lines that carry no
    /// record (empty, or bare `\r`).
    fn decode_line(&mut self, raw: &[u8]) -> Option<Result<T, NdjsonError>> {
        self.line += 1;
        let raw = match raw.last() {
            Some(b'\r') => &raw[..raw.len() - 1],
            _ => raw,
        };
        if raw.is_empty() {
            return None;
        }
        match serde_json::from_slice(raw) {
            Ok(record) => Some(Ok(record)),
            Err(e) => {
                self.done = true;
                Some(Err(NdjsonError::MalformedRecord {
                    line: self.line,
                    detail: format!("{} in {:?}", e, String::from_utf8_lossy(raw)),
                }))
            }
        }
    }
}

impl<T: DeserializeOwned> Stream for NdjsonDecoder<T> {
    type Item = Result<T, NdjsonError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if this.done {
                return Poll::Ready(None);
            }

            // Drain complete lines already buffered.
            if let Some(pos) = this.buf.iter().position(|&b| b == b'\n') {
                let line = this.buf.split_to(pos + 1);
                match this.decode_line(&line[..pos]) {
                    Some(item) => return Poll::Ready(Some(item)),
                    None => continue,
                }
            }

            match this.body.poll_next_unpin(cx) {
                Poll::Ready(Some(Ok(chunk))) => this.buf.extend_from_slice(&chunk),
                Poll::Ready(Some(Err(e))) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Ready(None) => {
                    this.done = true;
                    if this.buf.is_empty() {
                        return Poll::Ready(None);
                    }
                    // Final line without a terminating newline.
                    let line = this.buf.split();
                    return match this.decode_line(&line) {
                        Some(item) => Poll::Ready(Some(item)),
                        None => Poll::Ready(None),
                    };
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
