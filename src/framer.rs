//! Event-stream framing.
//!
//! Each event is written as
//!
//! ```text
//! event: <kind>
//! data: <json payload>
//!
//! ```
//!
//! The decoder works on raw bytes so that chunk boundaries can fall anywhere,
//! including inside a multi-byte UTF-8 character. Only complete lines are
//! interpreted; the trailing partial line stays buffered for the next chunk.

use crate::events::StreamEvent;
use serde_json::Value;
use tracing::{debug, warn};

/// Largest partial line or open record the decoder buffers. Anything bigger
/// is discarded.
pub const MAX_RECORD_BYTES: usize = 1024 * 1024;

/// Encode one event as a complete frame.
pub fn encode(event: &StreamEvent) -> String {
    // serde_json never emits raw newlines, so the payload fits on one line.
    format!("event: {}\ndata: {}\n\n", event.kind(), event.data())
}

/// Incremental frame decoder.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Option<String>,
    /// Set after an oversized partial line was discarded; the rest of that
    /// line is skipped up to its newline.
    skip_line: bool,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of bytes and return every event it completes, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.buffer[start..].iter().position(|&b| b == b'\n') {
            let end = start + offset;
            let mut line = &self.buffer[start..end];
            if let Some(stripped) = line.strip_suffix(b"\r") {
                line = stripped;
            }
            let line = String::from_utf8_lossy(line).into_owned();
            start = end + 1;

            if self.skip_line {
                self.skip_line = false;
                continue;
            }
            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
        }
        self.buffer.drain(..start);

        if self.buffer.len() > MAX_RECORD_BYTES {
            warn!(
                "Discarding stream line over {} bytes without a newline",
                MAX_RECORD_BYTES
            );
            self.buffer.clear();
            self.reset_record();
            self.skip_line = true;
        }

        events
    }

    /// Whether a partial line or an unfinished record is buffered.
    ///
    /// When the underlying stream ends with this still true, the incomplete
    /// record is simply dropped.
    pub fn has_pending(&self) -> bool {
        !self.buffer.is_empty() || self.event.is_some() || self.data.is_some() || self.skip_line
    }

    fn reset_record(&mut self) {
        self.event = None;
        self.data = None;
    }

    fn process_line(&mut self, line: &str) -> Option<StreamEvent> {
        if line.is_empty() {
            return self.close_record();
        }

        if let Some(name) = line.strip_prefix("event:") {
            if self.data.is_some() {
                debug!("Discarding unfinished {:?} record", self.event);
            }
            self.event = Some(name.trim().to_string());
            self.data = None;
        } else if let Some(value) = line.strip_prefix("data:") {
            let value = value.strip_prefix(' ').unwrap_or(value);
            match self.data.as_mut() {
                Some(data) => {
                    data.push('\n');
                    data.push_str(value);
                }
                None => self.data = Some(value.to_string()),
            }
            if self.data.as_ref().is_some_and(|data| data.len() > MAX_RECORD_BYTES) {
                warn!(
                    "Discarding {:?} record over {} bytes",
                    self.event, MAX_RECORD_BYTES
                );
                self.reset_record();
            }
        } else if !line.starts_with(':') {
            debug!("Ignoring unrecognised stream line: {}", line);
        }

        None
    }

    /// Handle the blank line that terminates a record.
    fn close_record(&mut self) -> Option<StreamEvent> {
        let Some(data) = self.data.as_deref() else {
            // A record without data is complete but carries nothing; its
            // event name must not leak into the next record.
            if let Some(kind) = self.event.take() {
                debug!("Dropping {} record without data", kind);
            }
            return None;
        };

        // Unparsable JSON may be a payload that continues on further data
        // lines; keep the record open until it parses or a new one starts.
        let value: Value = match serde_json::from_str(data) {
            Ok(value) => value,
            Err(_) => return None,
        };

        self.data = None;
        let Some(kind) = self.event.take() else {
            debug!("Dropping data record without an event name");
            return None;
        };

        StreamEvent::from_frame(&kind, value)
    }
}
