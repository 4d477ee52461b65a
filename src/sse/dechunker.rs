// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Incremental SSE parser

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{SseEvent, BOM};
use crate::http::{ChunkKind, Subscriber};

/// Receives `(event_type, data)` for every dispatched event
pub type EventCallback = Box<dyn FnMut(&str, &str) + Send>;

/// Push-based SSE parser
///
/// Feed it body bytes in pieces of any size. A record is delivered only once
/// a blank line terminates it; whatever is still buffered when the stream
/// ends is dropped.
pub struct SseDechunker {
    /// Bytes not yet resolved into a complete line
    pending: Vec<u8>,
    /// Prefix of `pending` already searched for a terminator
    scanned: usize,
    data: Vec<u8>,
    event: Vec<u8>,
    started: bool,
    bom_checked: bool,
    callback: Option<EventCallback>,
}

impl Default for SseDechunker {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            scanned: 0,
            data: Vec::new(),
            event: Vec::new(),
            started: false,
            bom_checked: false,
            callback: None,
        }
    }
}

impl SseDechunker {
    /// Create a dechunker that reports events to `callback`
    pub fn new<F>(callback: F) -> Self
    where
        F: FnMut(&str, &str) + Send + 'static,
    {
        Self {
            callback: Some(Box::new(callback)),
            ..Default::default()
        }
    }

    /// Create a dechunker that appends every event to a shared log
    pub fn collecting() -> (Self, Arc<Mutex<Vec<SseEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let log = events.clone();
        let dechunker = Self::new(move |event, data| {
            log.lock().push(SseEvent::new(event, data));
        });
        (dechunker, events)
    }

    /// Replace the event callback
    pub fn set_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&str, &str) + Send + 'static,
    {
        self.callback = Some(Box::new(callback));
    }

    /// Whether at least one event has been dispatched
    pub fn started(&self) -> bool {
        self.started
    }

    /// Number of buffered bytes that do not form a complete line yet
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Forget all stream state, keeping the callback
    pub fn reset(&mut self) {
        self.pending.clear();
        self.scanned = 0;
        self.data.clear();
        self.event.clear();
        self.started = false;
        self.bom_checked = false;
    }

    /// Consume one chunk of body bytes
    pub fn feed(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);

        if !self.bom_checked {
            if self.pending.len() >= BOM.len() {
                if self.pending.starts_with(BOM) {
                    self.pending.drain(..BOM.len());
                }
                self.bom_checked = true;
            } else if BOM.starts_with(&self.pending) {
                // Too short to decide, and a BOM prefix holds no line break.
                return;
            } else {
                self.bom_checked = true;
            }
        }

        let buffer = std::mem::take(&mut self.pending);
        let mut consumed = 0;
        let mut skip = self.scanned;
        while let Some((len, terminator)) = find_next_line(&buffer[consumed + skip..]) {
            let len = skip + len;
            self.process_line(&buffer[consumed..consumed + len]);
            consumed += len + terminator;
            skip = 0;
        }
        self.pending = buffer;
        self.pending.drain(..consumed);

        // A trailing CR is rescanned once its successor arrives.
        self.scanned = self.pending.len() - usize::from(self.pending.last() == Some(&b'\r'));
    }

    fn process_line(&mut self, line: &[u8]) {
        if line.is_empty() {
            self.dispatch();
            return;
        }

        if line[0] == b':' {
            return;
        }

        let (field, value) = match line.iter().position(|&b| b == b':') {
            Some(colon) => {
                let value = &line[colon + 1..];
                (&line[..colon], value.strip_prefix(b" ").unwrap_or(value))
            }
            None => (line, &[][..]),
        };

        match field {
            b"event" => {
                self.event.clear();
                self.event.extend_from_slice(value);
            }
            b"data" => {
                self.data.extend_from_slice(value);
                self.data.push(b'\n');
            }
            _ => {}
        }
    }

    fn dispatch(&mut self) {
        if self.data.is_empty() {
            return;
        }
        if self.data.last() == Some(&b'\n') {
            self.data.pop();
        }

        let event = String::from_utf8_lossy(&self.event);
        let data = String::from_utf8_lossy(&self.data);
        tracing::trace!(event = %event, bytes = data.len(), "SSE event dispatched");
        if let Some(callback) = self.callback.as_mut() {
            callback(&event, &data);
        }

        self.started = true;
        self.data.clear();
        self.event.clear();
    }
}

impl Subscriber for SseDechunker {
    fn on_chunk(&mut self, chunk: &[u8], kind: ChunkKind) {
        if kind == ChunkKind::Body {
            self.feed(chunk);
        }
    }
}

impl fmt::Debug for SseDechunker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SseDechunker")
            .field("pending", &self.pending.len())
            .field("data", &self.data.len())
            .field("event", &String::from_utf8_lossy(&self.event))
            .field("started", &self.started)
            .finish()
    }
}

/// Find the first complete line in `buf`
///
/// Returns `(line_len, terminator_len)`. A line ends at `\n`, `\r\n` or a
/// `\r` followed by any other byte. A trailing `\r` is not a complete line
/// yet since the next chunk may start with `\n`.
pub fn find_next_line(buf: &[u8]) -> Option<(usize, usize)> {
    for (i, &byte) in buf.iter().enumerate() {
        match byte {
            b'\n' => return Some((i, 1)),
            b'\r' => {
                return match buf.get(i + 1) {
                    Some(b'\n') => Some((i, 2)),
                    Some(_) => Some((i, 1)),
                    None => None,
                }
            }
            _ => {}
        }
    }
    None
}
