// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # Streamnet - Blocking HTTP with inline streaming
//!
//! A small blocking HTTP client built for talking to streaming APIs such as
//! LLM completion endpoints.
//!
//! ## Features
//!
//! - Layered requests: every request field falls back to a client default
//! - Inline streaming: subscribers see header and body chunks as they arrive
//! - SSE dechunker: incremental `text/event-stream` parser, usable as a subscriber
//! - Transport errors as data: a failed exchange still yields a `Response`
//! - Cookie jar with optional JSON file persistence
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use parking_lot::Mutex;
//! use streamnet::{Client, Request, SseDechunker, Subscription, Url};
//!
//! fn main() -> streamnet::Result<()> {
//!     let mut client = Client::new(Url::parse("https://api.example.com/v1/chat")?)?;
//!     client.set_default_header("Authorization", "Bearer token");
//!
//!     let dechunker = Arc::new(Mutex::new(SseDechunker::new(|event, data| {
//!         println!("{event}: {data}");
//!     })));
//!
//!     let request = Request::default()
//!         .json(&serde_json::json!({"stream": true}))?
//!         .with_subscription(Subscription::shared(dechunker));
//!
//!     let response = client.send(request).into_result()?;
//!     println!("status {}", response.status_code);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod sse;

// Re-exports for convenience

// Client and values
pub use http::{method_to_string, Client, Method, Request, Response, Url};

// Streaming
pub use http::{ChunkKind, Subscriber, Subscription};

// Transport
pub use http::{
    Exchange, ExchangeSink, ReqwestTransport, Transport, TransportCode, TransportEnv,
    TransportFailure,
};

// Cookies
pub use http::{Cookie, CookieJar};

// SSE
pub use sse::{find_next_line, EventCallback, SseDechunker, SseEvent};

// Configuration
pub use config::NetConfig;

// Errors
pub use error::{Error, Result};

/// Streamnet version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
