// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP client layer
//!
//! A blocking client whose requests are assembled from per-call values layered
//! over client-wide defaults. Response bytes are buffered into a [`Response`]
//! and, while they arrive, handed to every registered [`Subscription`].

mod client;
mod cookie;
mod request;
mod response;
mod subscription;
mod transport;
mod url;

use std::fmt;

pub use client::Client;
pub use cookie::{Cookie, CookieJar};
pub use request::Request;
pub use response::Response;
pub use subscription::{ChunkKind, Subscriber, Subscription};
pub use transport::{
    Exchange, ExchangeSink, ReqwestTransport, Transport, TransportCode, TransportEnv,
    TransportFailure,
};
pub use url::Url;

/// Default user agent string
pub const DEFAULT_USER_AGENT: &str = concat!("streamnet/", env!("CARGO_PKG_VERSION"));

/// URL used when neither the request nor the client names a host
pub const FALLBACK_URL: &str = "http://localhost";

/// Common HTTP headers, spelled the way they are sent
pub mod headers {
    pub const ACCEPT: &str = "Accept";
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const COOKIE: &str = "Cookie";
    pub const SET_COOKIE: &str = "Set-Cookie";
    pub const USER_AGENT: &str = "User-Agent";
    pub const AUTHORIZATION: &str = "Authorization";
}

/// Common content types
pub mod mime {
    pub const JSON: &str = "application/json";
    pub const OCTET_STREAM: &str = "application/octet-stream";
    pub const EVENT_STREAM: &str = "text/event-stream";
}

/// HTTP request method
///
/// "No method" is expressed as `Option<Method>::None` wherever a value can be
/// inherited from a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Patch,
    Trace,
    Connect,
}

impl Method {
    /// Wire token for this method
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Patch => "PATCH",
            Method::Trace => "TRACE",
            Method::Connect => "CONNECT",
        }
    }

    /// Parse a wire token (case-insensitive)
    pub fn from_token(token: &str) -> Option<Self> {
        let method = match token.to_ascii_uppercase().as_str() {
            "GET" => Method::Get,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            "DELETE" => Method::Delete,
            "HEAD" => Method::Head,
            "OPTIONS" => Method::Options,
            "PATCH" => Method::Patch,
            "TRACE" => Method::Trace,
            "CONNECT" => Method::Connect,
            _ => return None,
        };
        Some(method)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire token for an optional method, `"UNKNOWN"` when unset
pub fn method_to_string(method: Option<Method>) -> &'static str {
    method.map_or("UNKNOWN", |m| m.as_str())
}

/// Insert `Content-Type` unless the exact key is already present
pub(crate) fn set_default_content_type(
    headers: &mut std::collections::HashMap<String, String>,
    content_type: &str,
) {
    headers
        .entry(headers::CONTENT_TYPE.to_string())
        .or_insert_with(|| content_type.to_string());
}
