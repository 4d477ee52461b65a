// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Server-Sent Events decoding
//!
//! [`SseDechunker`] turns a body delivered in arbitrary pieces into discrete
//! `(event, data)` records. Register it on a request or client through
//! [`Subscription::shared`](crate::http::Subscription::shared) and every
//! completed event reaches the callback while `send` is still running.

mod dechunker;

use serde::{Deserialize, Serialize};

pub use dechunker::{find_next_line, EventCallback, SseDechunker};

/// UTF-8 byte order mark
pub const BOM: &[u8] = b"\xEF\xBB\xBF";

/// One dispatched event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SseEvent {
    /// Value of the last `event:` field, empty when none was sent
    pub event: String,
    /// `data:` lines joined with `\n`
    pub data: String,
}

impl SseEvent {
    pub fn new(event: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            data: data.into(),
        }
    }

    /// True for the conventional end-of-stream marker `[DONE]`
    pub fn is_done_marker(&self) -> bool {
        self.data.trim() == "[DONE]"
    }

    /// Parse `data` as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> crate::error::Result<T> {
        Ok(serde_json::from_str(&self.data)?)
    }
}
