// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Transport boundary
//!
//! The client talks to the network through the [`Transport`] trait: one
//! blocking exchange per call, with header and body bytes pushed into an
//! [`ExchangeSink`] as they arrive. [`ReqwestTransport`] is the production
//! implementation; tests plug in scripted transports.
//!
//! Process-wide transport state lives in [`TransportEnv`]. It is built from
//! the environment the first time a client is constructed and stays alive
//! until the process exits; nothing needs to be torn down explicitly.

use std::fmt;
use std::io::{ErrorKind, Read};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use reqwest::header::{LOCATION, SET_COOKIE};
use reqwest::redirect::Policy;
use reqwest::StatusCode;

use super::{headers, Method};
use crate::config::NetConfig;
use crate::error::{Error, Result};

lazy_static! {
    static ref TRANSPORT_ENV: TransportEnv = TransportEnv::init();
}

/// Process-wide transport state
#[derive(Debug)]
pub struct TransportEnv {
    config: NetConfig,
    initialized_at: DateTime<Utc>,
}

impl TransportEnv {
    /// The shared instance, initialised on first use
    pub fn global() -> &'static TransportEnv {
        &TRANSPORT_ENV
    }

    fn init() -> Self {
        let config = NetConfig::from_env();
        tracing::info!(
            user_agent = %config.user_agent,
            proxy = ?config.proxy,
            max_redirects = config.max_redirects,
            "Transport environment initialised"
        );
        Self {
            config,
            initialized_at: Utc::now(),
        }
    }

    /// Configuration resolved from the environment
    pub fn config(&self) -> &NetConfig {
        &self.config
    }

    /// When the state was built
    pub fn initialized_at(&self) -> DateTime<Utc> {
        self.initialized_at
    }
}

/// Outcome of the transport layer, independent of HTTP status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransportCode {
    /// Exchange completed
    #[default]
    Ok,
    /// DNS or TCP/TLS connection failure
    Connect,
    /// Timed out
    Timeout,
    /// Redirect loop or hop limit exceeded
    Redirect,
    /// Request could not be sent
    Request,
    /// Body could not be read or written
    Body,
    /// Response could not be decoded
    Decode,
    /// Request could not be built (bad URL, header or method)
    Builder,
    /// Anything else
    Other,
}

impl TransportCode {
    /// True only for [`TransportCode::Ok`]
    pub fn is_success(&self) -> bool {
        matches!(self, TransportCode::Ok)
    }

    /// Short lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportCode::Ok => "ok",
            TransportCode::Connect => "connect",
            TransportCode::Timeout => "timeout",
            TransportCode::Redirect => "redirect",
            TransportCode::Request => "request",
            TransportCode::Body => "body",
            TransportCode::Decode => "decode",
            TransportCode::Builder => "builder",
            TransportCode::Other => "other",
        }
    }

    fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportCode::Timeout
        } else if err.is_connect() {
            TransportCode::Connect
        } else if err.is_redirect() {
            TransportCode::Redirect
        } else if err.is_builder() {
            TransportCode::Builder
        } else if err.is_body() {
            TransportCode::Body
        } else if err.is_decode() {
            TransportCode::Decode
        } else if err.is_request() {
            TransportCode::Request
        } else {
            TransportCode::Other
        }
    }
}

impl fmt::Display for TransportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    pub code: TransportCode,
    pub message: String,
}

impl TransportFailure {
    pub fn new(code: TransportCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TransportFailure {
    fn from(err: reqwest::Error) -> Self {
        Self::new(TransportCode::from_reqwest(&err), err.to_string())
    }
}

impl From<TransportFailure> for Error {
    fn from(failure: TransportFailure) -> Self {
        Error::transport(failure.code, failure.message)
    }
}

/// Fully resolved request handed to a transport
#[derive(Debug, Clone, Default)]
pub struct Exchange {
    /// Explicit method, or `None` to infer from the body
    pub method: Option<Method>,
    /// Serialized target URL
    pub url: String,
    /// Caller header pairs, one per unique key; jar cookies are added per hop
    pub headers: Vec<(String, String)>,
    /// Body bytes, if any
    pub body: Option<Bytes>,
    /// Follow 3xx responses
    pub follow_redirects: bool,
}

impl Exchange {
    /// Method that goes on the wire: explicit, else POST with a body, else GET
    pub fn effective_method(&self) -> Method {
        self.method.unwrap_or(if self.body.is_some() {
            Method::Post
        } else {
            Method::Get
        })
    }

    /// Headers as literal `Key: Value` lines
    pub fn header_lines(&self) -> Vec<String> {
        self.headers
            .iter()
            .map(|(name, value)| format!("{}: {}", name, value))
            .collect()
    }

    /// Whether the caller supplied a `Cookie` header (any spelling)
    pub fn has_cookie_header(&self) -> bool {
        self.headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case(headers::COOKIE))
    }

    /// Headers for one hop to `url`: the caller's, plus the sink's cookies
    /// for that URL unless the caller set a `Cookie` header
    pub fn hop_headers(&self, url: &str, sink: &mut dyn ExchangeSink) -> Vec<(String, String)> {
        let mut hop = self.headers.clone();
        if !self.has_cookie_header() {
            if let Some(cookies) = sink.cookie_header(url) {
                hop.push((headers::COOKIE.to_string(), cookies));
            }
        }
        hop
    }
}

/// Receives raw bytes from a transport while an exchange is running
pub trait ExchangeSink {
    /// Status line or header bytes of the final response
    fn header(&mut self, chunk: &[u8]);
    /// Body bytes of the final response
    fn body(&mut self, chunk: &[u8]);

    /// `Cookie` header value to send to `url`, asked before every hop
    fn cookie_header(&mut self, _url: &str) -> Option<String> {
        None
    }

    /// A redirect response from `url` is being followed
    fn redirected(&mut self, _url: &str, _set_cookies: &[String]) {}

    /// URL the final response came from
    fn final_url(&mut self, _url: &str) {}
}

/// Performs one blocking HTTP exchange
///
/// Implementations must deliver every header chunk before the first body
/// chunk, and return the numeric status only when the exchange completed.
pub trait Transport: Send {
    fn perform(
        &mut self,
        exchange: &Exchange,
        sink: &mut dyn ExchangeSink,
    ) -> std::result::Result<u16, TransportFailure>;
}

/// Blocking transport backed by one reusable reqwest session
///
/// Redirects are followed here rather than inside reqwest so that every hop
/// goes through the sink's cookie handling.
pub struct ReqwestTransport {
    session: reqwest::blocking::Client,
    max_redirects: usize,
    read_chunk_size: usize,
}

impl ReqwestTransport {
    /// Build a session from the process-wide configuration
    pub fn new() -> Result<Self> {
        Self::with_config(TransportEnv::global().config().clone())
    }

    /// Build a session from an explicit configuration
    pub fn with_config(config: NetConfig) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(Policy::none())
            .timeout(config.timeout);

        if let Some(connect_timeout) = config.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }

        if let Some(ref proxy_url) = config.proxy {
            builder = builder.proxy(
                reqwest::Proxy::all(proxy_url)
                    .map_err(|e| Error::config(format!("Invalid proxy URL: {}", e)))?,
            );
        }

        let session = builder.build()?;

        Ok(Self {
            session,
            max_redirects: config.max_redirects,
            read_chunk_size: config.read_chunk_size.max(1),
        })
    }

    fn send_hop(
        &self,
        exchange: &Exchange,
        method: &reqwest::Method,
        url: &str,
        body: Option<&Bytes>,
        sink: &mut dyn ExchangeSink,
    ) -> std::result::Result<reqwest::blocking::Response, TransportFailure> {
        let mut builder = self.session.request(method.clone(), url);

        for (name, value) in exchange.hop_headers(url, sink) {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = body {
            builder = builder.body(body.to_vec());
        }

        Ok(builder.send()?)
    }
}

impl fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("max_redirects", &self.max_redirects)
            .field("read_chunk_size", &self.read_chunk_size)
            .finish()
    }
}

impl Transport for ReqwestTransport {
    fn perform(
        &mut self,
        exchange: &Exchange,
        sink: &mut dyn ExchangeSink,
    ) -> std::result::Result<u16, TransportFailure> {
        let mut method = to_reqwest_method(exchange.effective_method());
        let mut body = exchange.body.clone();
        let mut url = exchange.url.clone();
        let mut hops = 0;

        let mut response = loop {
            let response = self.send_hop(exchange, &method, &url, body.as_ref(), sink)?;
            let status = response.status();

            let next = if exchange.follow_redirects && status.is_redirection() {
                redirect_target(&response)
            } else {
                None
            };
            let Some(next) = next else {
                break response;
            };

            if hops >= self.max_redirects {
                return Err(TransportFailure::new(
                    TransportCode::Redirect,
                    format!("too many redirects (limit {})", self.max_redirects),
                ));
            }
            hops += 1;

            let set_cookies: Vec<String> = response
                .headers()
                .get_all(SET_COOKIE)
                .iter()
                .filter_map(|value| value.to_str().ok())
                .map(str::to_string)
                .collect();
            sink.redirected(&url, &set_cookies);
            tracing::debug!(from = %url, to = %next, status = status.as_u16(), "Following redirect");

            if status == StatusCode::SEE_OTHER
                || ((status == StatusCode::MOVED_PERMANENTLY || status == StatusCode::FOUND)
                    && method == reqwest::Method::POST)
            {
                if method != reqwest::Method::HEAD {
                    method = reqwest::Method::GET;
                }
                body = None;
            }
            url = next.to_string();
        };

        sink.final_url(response.url().as_str());
        let status = response.status();

        let status_line = format!(
            "{:?} {} {}",
            response.version(),
            status.as_u16(),
            status.canonical_reason().unwrap_or("")
        );
        sink.header(format!("{}\r\n", status_line.trim_end()).as_bytes());

        for (name, value) in response.headers() {
            let mut line = Vec::with_capacity(name.as_str().len() + value.len() + 4);
            line.extend_from_slice(name.as_str().as_bytes());
            line.extend_from_slice(b": ");
            line.extend_from_slice(value.as_bytes());
            line.extend_from_slice(b"\r\n");
            sink.header(&line);
        }
        sink.header(b"\r\n");

        let mut buf = vec![0u8; self.read_chunk_size];
        loop {
            match response.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    tracing::trace!(bytes = n, "Body chunk received");
                    sink.body(&buf[..n]);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(TransportFailure::new(TransportCode::Body, e.to_string())),
            }
        }

        Ok(status.as_u16())
    }
}

/// Absolute URL named by a redirect's `Location`, resolved against the hop
fn redirect_target(response: &reqwest::blocking::Response) -> Option<reqwest::Url> {
    let location = response.headers().get(LOCATION)?.to_str().ok()?;
    response.url().join(location).ok()
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
        Method::Head => reqwest::Method::HEAD,
        Method::Options => reqwest::Method::OPTIONS,
        Method::Patch => reqwest::Method::PATCH,
        Method::Trace => reqwest::Method::TRACE,
        Method::Connect => reqwest::Method::CONNECT,
    }
}
