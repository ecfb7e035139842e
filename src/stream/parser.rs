//! Incremental event-stream parsing.
//!
//! # Responsibilities
//! - Decode a live byte stream into `event:` / `data:` field lines
//! - Emit one record per `data:` line, carrying the pending event type
//! - Translate end-of-input into a distinguished lost-connection error
//!
//! # Design Decisions
//! - Line-at-a-time reading; partial lines stay buffered until the
//!   delimiter arrives, so chunk boundaries never split a record
//! - The field grammar (identifier, colon, at least one whitespace, value)
//!   is matched with a hand-rolled scanner; no regex in the hot path
//! - Malformed lines are skipped, never fatal: the stream keeps flowing

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use crate::stream::event::{EventRecord, StreamError};

/// Recognized field names.
const EVENT_FIELD: &[u8] = b"event";
const DATA_FIELD: &[u8] = b"data";

/// Streaming parser over the body of an open event-stream response.
///
/// Produces a lazy, unbounded sequence of records via
/// [`next_record`](Self::next_record). The sequence ends with exactly one
/// `Err` when the underlying source closes or fails; the parser never
/// resumes a closed source itself.
pub struct EventStreamParser<R> {
    reader: BufReader<R>,
    source: String,
    /// Pending `event:` value, consumed by the next `data:` flush.
    event_type: Vec<u8>,
    line: Vec<u8>,
    done: bool,
}

impl<R: AsyncRead + Unpin> EventStreamParser<R> {
    /// Create a parser over a byte source read from `source`.
    pub fn new(source: impl Into<String>, reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            source: source.into(),
            event_type: Vec::new(),
            line: Vec::new(),
            done: false,
        }
    }

    /// Read until the next complete record or terminal error.
    ///
    /// Returns `None` once the sequence has ended.
    pub async fn next_record(&mut self) -> Option<Result<EventRecord, StreamError>> {
        if self.done {
            return None;
        }

        loop {
            self.line.clear();
            match self.reader.read_until(b'\n', &mut self.line).await {
                Ok(0) => {
                    self.done = true;
                    return Some(Err(StreamError::ConnectionLost));
                }
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    self.done = true;
                    return Some(Err(StreamError::ConnectionLost));
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(StreamError::Read(e)));
                }
            }

            if self.line.last() != Some(&b'\n') {
                // Source closed mid-line; the partial line is discarded.
                self.done = true;
                return Some(Err(StreamError::ConnectionLost));
            }

            if self.line.len() < 2 {
                continue;
            }

            let line = &self.line[..self.line.len() - 1];
            let Some((field, value)) = split_field_line(line) else {
                tracing::debug!(
                    line = %String::from_utf8_lossy(line),
                    "discarding malformed stream line"
                );
                continue;
            };

            match field {
                EVENT_FIELD => {
                    self.event_type = value.trim_ascii().to_vec();
                }
                DATA_FIELD => {
                    let record = EventRecord {
                        source: self.source.clone(),
                        // A fresh accumulator per flush: the type never
                        // leaks into a later record.
                        event_type: std::mem::take(&mut self.event_type),
                        payload: value.trim_ascii().to_vec(),
                    };
                    return Some(Ok(record));
                }
                _ => {}
            }
        }
    }
}

/// Match a field line: an identifier, a colon, at least one whitespace
/// character, then the value (with its leading whitespace run consumed).
fn split_field_line(line: &[u8]) -> Option<(&[u8], &[u8])> {
    let colon = line.iter().position(|&b| b == b':')?;
    let (name, rest) = line.split_at(colon);
    if name.is_empty() || !name.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'_') {
        return None;
    }
    let rest = &rest[1..];
    let ws = rest.iter().take_while(|b| b.is_ascii_whitespace()).count();
    if ws == 0 {
        return None;
    }
    Some((name, &rest[ws..]))
}
