// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP response types

use std::collections::HashMap;
use std::fmt;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use super::{headers, mime, TransportCode};
use crate::error::{Error, Result};

/// HTTP response representation
#[derive(Debug, Clone, Default)]
pub struct Response {
    /// Numeric status, 0 unless the exchange completed
    pub status_code: u16,
    /// First header line as received, trimmed
    pub status_line: String,
    /// Headers as received; repeated keys joined with `", "`
    ///
    /// The reqwest transport delivers names lowercased (`content-type`), so
    /// look names up with [`Response::header_ignore_case`] unless the exact
    /// spelling is known.
    pub headers: HashMap<String, String>,
    /// Full body, always buffered
    pub body: Bytes,
    /// Outcome of the transport layer
    pub transport_code: TransportCode,
    /// Transport error message when `transport_code` is not `Ok`
    pub transport_error: Option<String>,
    /// URL the response came from, after any followed redirects
    pub url: String,
}

impl Response {
    /// Whether the transport completed the exchange
    pub fn transport_ok(&self) -> bool {
        self.transport_code.is_success()
    }

    /// Turn a transport failure into an error, keeping HTTP errors as data
    pub fn into_result(self) -> Result<Self> {
        if self.transport_ok() {
            Ok(self)
        } else {
            Err(Error::transport(
                self.transport_code,
                self.transport_error.unwrap_or_default(),
            ))
        }
    }

    /// Check if status is success (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Check if status is redirect (3xx)
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status_code)
    }

    /// Check if status is client error (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code)
    }

    /// Check if status is server error (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status_code)
    }

    /// Get body as text
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.to_vec()).map_err(|e| Error::Other(e.to_string()))
    }

    /// Get body as text, lossy conversion
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parse body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(Error::from)
    }

    /// Get a header value by exact key
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Get a header value ignoring ASCII case
    pub fn header_ignore_case(&self, name: &str) -> Option<&str> {
        self.header(name).or_else(|| {
            self.headers
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str())
        })
    }

    /// Get content type
    pub fn content_type(&self) -> Option<&str> {
        self.header_ignore_case(headers::CONTENT_TYPE)
    }

    /// Check if content type is JSON
    pub fn is_json(&self) -> bool {
        self.content_type()
            .map(|ct| ct.contains(mime::JSON))
            .unwrap_or(false)
    }

    /// Check if content type is an SSE stream
    pub fn is_event_stream(&self) -> bool {
        self.content_type()
            .map(|ct| ct.contains(mime::EVENT_STREAM))
            .unwrap_or(false)
    }

    /// Get body length
    pub fn body_len(&self) -> usize {
        self.body.len()
    }

    /// Get raw body bytes
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.body))
    }
}

/// Raw header text split into its parts
#[derive(Debug, Default)]
pub(crate) struct ParsedHeaders {
    pub status_line: String,
    pub headers: HashMap<String, String>,
    /// Each `Set-Cookie` value on its own, before joining
    pub set_cookies: Vec<String>,
}

/// Parse header text: status line first, then `Key: Value` lines
pub(crate) fn parse_raw_headers(raw: &str) -> ParsedHeaders {
    let mut parsed = ParsedHeaders::default();
    let mut lines = raw.split('\n');

    if let Some(first) = lines.next() {
        parsed.status_line = first.trim().to_string();
    }

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        if key.eq_ignore_ascii_case(headers::SET_COOKIE) {
            parsed.set_cookies.push(value.to_string());
        }

        parsed
            .headers
            .entry(key.to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    parsed
}
