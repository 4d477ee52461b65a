// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP client implementation
//!
//! A [`Client`] owns one transport session and a set of defaults. `send`
//! layers the request over those defaults, runs a single blocking exchange and
//! returns the buffered response. Subscribers see each chunk inline while the
//! exchange runs, client defaults first.
//!
//! The session is not shareable: use one client per thread and never call
//! `send` from inside a subscriber.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use bytes::{Bytes, BytesMut};
use serde::Serialize;

use super::cookie::{Cookie, CookieJar};
use super::request::Request;
use super::response::{parse_raw_headers, Response};
use super::subscription::{ChunkKind, Subscription};
use super::transport::{Exchange, ExchangeSink, ReqwestTransport, Transport, TransportEnv};
use super::url::Url;
use super::{method_to_string, mime, set_default_content_type, Method, FALLBACK_URL};
use crate::config::NetConfig;
use crate::error::Result;

/// Blocking HTTP client with layered request defaults
pub struct Client {
    default_url: Url,
    default_method: Option<Method>,
    default_headers: HashMap<String, String>,
    default_body: Bytes,
    default_subscriptions: Vec<Subscription>,
    /// Empty path disables persistence
    cookie_file: PathBuf,
    follow_redirects: bool,
    cookie_jar: CookieJar,
    transport: Box<dyn Transport>,
}

impl Client {
    /// Create a client using the process-wide configuration
    pub fn new(default_url: Url) -> Result<Self> {
        TransportEnv::global();
        Ok(Self::with_transport(default_url, Box::new(ReqwestTransport::new()?)))
    }

    /// Create a client with an explicit transport configuration
    pub fn with_config(default_url: Url, config: NetConfig) -> Result<Self> {
        TransportEnv::global();
        Ok(Self::with_transport(
            default_url,
            Box::new(ReqwestTransport::with_config(config)?),
        ))
    }

    /// Create a client on top of any transport
    pub fn with_transport(default_url: Url, transport: Box<dyn Transport>) -> Self {
        Self {
            default_url,
            default_method: None,
            default_headers: HashMap::new(),
            default_body: Bytes::new(),
            default_subscriptions: Vec::new(),
            cookie_file: PathBuf::new(),
            follow_redirects: false,
            cookie_jar: CookieJar::new(),
            transport,
        }
    }

    /// Get the default URL
    pub fn default_url(&self) -> &Url {
        &self.default_url
    }

    /// Set the default URL
    pub fn set_default_url(&mut self, url: Url) {
        self.default_url = url;
    }

    /// Get the default method
    pub fn default_method(&self) -> Option<Method> {
        self.default_method
    }

    /// Set or clear the default method
    pub fn set_default_method(&mut self, method: Option<Method>) {
        self.default_method = method;
    }

    /// Get the default headers
    pub fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Mutable access to the default headers
    pub fn default_headers_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.default_headers
    }

    /// Set one default header
    pub fn set_default_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.default_headers.insert(name.into(), value.into());
    }

    /// Get the default body
    pub fn default_body(&self) -> &Bytes {
        &self.default_body
    }

    /// Use `text` as the default body; no content type is implied
    pub fn set_default_string(&mut self, text: impl Into<String>) {
        self.default_body = Bytes::from(text.into());
    }

    /// Use raw bytes as the default body, defaulting the content type
    pub fn set_default_data(&mut self, data: impl Into<Bytes>) {
        self.default_body = data.into();
        set_default_content_type(&mut self.default_headers, mime::OCTET_STREAM);
    }

    /// Serialize `value` as the default body, defaulting the content type
    pub fn set_default_json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.default_body = Bytes::from(serde_json::to_vec(value)?);
        set_default_content_type(&mut self.default_headers, mime::JSON);
        Ok(())
    }

    /// Register a subscriber for every exchange on this client
    pub fn subscribe(&mut self, subscription: Subscription) {
        self.default_subscriptions.push(subscription);
    }

    /// Number of client-wide subscribers
    pub fn subscription_count(&self) -> usize {
        self.default_subscriptions.len()
    }

    /// Cookie persistence file (empty when disabled)
    pub fn cookie_file(&self) -> &Path {
        &self.cookie_file
    }

    /// Persist cookies to `path` around every exchange; empty disables
    pub fn set_cookie_file(&mut self, path: impl Into<PathBuf>) {
        self.cookie_file = path.into();
    }

    /// Whether 3xx responses are followed
    pub fn follow_redirects(&self) -> bool {
        self.follow_redirects
    }

    /// Follow 3xx responses (up to the configured hop limit)
    pub fn set_follow_redirects(&mut self, follow: bool) {
        self.follow_redirects = follow;
    }

    /// Get the cookie jar
    pub fn cookie_jar(&self) -> &CookieJar {
        &self.cookie_jar
    }

    /// Every stored cookie as a Set-Cookie style line
    pub fn get_cookies(&self) -> Vec<String> {
        self.cookie_jar
            .all()
            .iter()
            .map(Cookie::to_set_cookie_string)
            .collect()
    }

    /// Inject cookies: a Set-Cookie line, or `name=value; name2=value2`
    pub fn set_cookie(&mut self, cookie: &str) {
        if looks_like_set_cookie(cookie) {
            self.cookie_jar.add_from_header(cookie, &Url::default());
        } else {
            self.cookie_jar.add_pairs(cookie);
        }
    }

    /// Merge cookies from the configured file into the jar
    pub fn load_cookies(&self) -> Result<usize> {
        if !self.persists_cookies() {
            return Ok(0);
        }
        let stored = CookieJar::load(&self.cookie_file)?;
        let count = stored.len();
        self.cookie_jar.merge(&stored);
        Ok(count)
    }

    /// Write the jar to the configured file
    pub fn save_cookies(&self) -> Result<()> {
        if !self.persists_cookies() {
            return Ok(());
        }
        self.cookie_jar.save(&self.cookie_file)
    }

    fn persists_cookies(&self) -> bool {
        !self.cookie_file.as_os_str().is_empty()
    }

    /// Perform one exchange
    ///
    /// Never fails: transport problems are reported through
    /// [`Response::transport_code`] and HTTP errors through the status code.
    pub fn send(&mut self, request: Request) -> Response {
        let Request {
            url: request_url,
            method: request_method,
            headers: request_headers,
            body: request_body,
            subscriptions: request_subscriptions,
        } = request;

        let url = self.resolve_url(&request_url);
        let method = request_method.or(self.default_method);
        let body = if !request_body.is_empty() {
            Some(request_body)
        } else if !self.default_body.is_empty() {
            Some(self.default_body.clone())
        } else {
            None
        };

        let mut merged_headers = self.default_headers.clone();
        merged_headers.extend(request_headers);

        if let Err(e) = self.load_cookies() {
            tracing::warn!(path = %self.cookie_file.display(), error = %e, "Could not load cookies");
        }

        let subscriptions: Vec<Subscription> = self
            .default_subscriptions
            .iter()
            .cloned()
            .chain(request_subscriptions)
            .collect();

        let exchange = Exchange {
            method,
            url: url.to_string(),
            headers: merged_headers.into_iter().collect(),
            body,
            follow_redirects: self.follow_redirects,
        };

        tracing::debug!(
            method = method_to_string(exchange.method),
            url = %exchange.url,
            headers = exchange.headers.len(),
            body_bytes = exchange.body.as_ref().map_or(0, Bytes::len),
            subscribers = subscriptions.len(),
            "Sending request"
        );

        let mut sink = ResponseSink::new(&subscriptions, &self.cookie_jar);
        let outcome = self.transport.perform(&exchange, &mut sink);

        let mut response = Response::default();
        match outcome {
            Ok(status) => response.status_code = status,
            Err(failure) => {
                tracing::warn!(
                    url = %exchange.url,
                    code = %failure.code,
                    error = %failure.message,
                    "Transport failure"
                );
                response.transport_code = failure.code;
                response.transport_error = Some(failure.message);
            }
        }

        let final_url = sink
            .final_url
            .as_deref()
            .and_then(|u| Url::parse(u).ok())
            .unwrap_or(url);

        let parsed = parse_raw_headers(&String::from_utf8_lossy(&sink.raw_headers));
        response.status_line = parsed.status_line;
        response.headers = parsed.headers;
        response.body = sink.body.freeze();

        for set_cookie in &parsed.set_cookies {
            self.cookie_jar.add_from_header(set_cookie, &final_url);
        }
        response.url = final_url.to_string();
        if let Err(e) = self.save_cookies() {
            tracing::warn!(path = %self.cookie_file.display(), error = %e, "Could not save cookies");
        }

        tracing::debug!(
            status = response.status_code,
            body_bytes = response.body.len(),
            transport = %response.transport_code,
            "Exchange complete"
        );

        response
    }

    /// Request URL if it names a host, else the default, else localhost;
    /// query parameters are the default's overwritten by the request's.
    fn resolve_url(&self, request_url: &Url) -> Url {
        let mut url = if !request_url.is_empty() {
            request_url.clone()
        } else if !self.default_url.is_empty() {
            self.default_url.clone()
        } else {
            fallback_url()
        };

        let mut query = self.default_url.query.clone();
        query.extend(request_url.query.clone());
        url.query = query;
        url
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("default_url", &self.default_url.to_string())
            .field("default_method", &self.default_method)
            .field("default_headers", &self.default_headers)
            .field("default_body", &self.default_body.len())
            .field("default_subscriptions", &self.default_subscriptions.len())
            .field("cookie_file", &self.cookie_file)
            .field("follow_redirects", &self.follow_redirects)
            .finish()
    }
}

fn fallback_url() -> Url {
    Url::parse(FALLBACK_URL).unwrap_or_default()
}

fn looks_like_set_cookie(cookie: &str) -> bool {
    cookie.split(';').skip(1).any(|attr| {
        let name = attr.split('=').next().unwrap_or("").trim().to_ascii_lowercase();
        matches!(
            name.as_str(),
            "domain" | "path" | "expires" | "max-age" | "secure" | "httponly" | "samesite"
        )
    })
}

/// Buffers an exchange, fans every chunk out to the subscribers and keeps
/// the cookie jar current across redirect hops
struct ResponseSink<'a> {
    raw_headers: Vec<u8>,
    body: BytesMut,
    final_url: Option<String>,
    subscriptions: &'a [Subscription],
    cookie_jar: &'a CookieJar,
}

impl<'a> ResponseSink<'a> {
    fn new(subscriptions: &'a [Subscription], cookie_jar: &'a CookieJar) -> Self {
        Self {
            raw_headers: Vec::new(),
            body: BytesMut::new(),
            final_url: None,
            subscriptions,
            cookie_jar,
        }
    }
}

impl ExchangeSink for ResponseSink<'_> {
    fn header(&mut self, chunk: &[u8]) {
        self.raw_headers.extend_from_slice(chunk);
        for subscription in self.subscriptions {
            subscription.deliver(chunk, ChunkKind::Header);
        }
    }

    fn body(&mut self, chunk: &[u8]) {
        self.body.extend_from_slice(chunk);
        for subscription in self.subscriptions {
            subscription.deliver(chunk, ChunkKind::Body);
        }
    }

    fn cookie_header(&mut self, url: &str) -> Option<String> {
        let url = Url::parse(url).ok()?;
        self.cookie_jar.get_cookie_header(&url)
    }

    fn redirected(&mut self, url: &str, set_cookies: &[String]) {
        let Ok(hop) = Url::parse(url) else {
            return;
        };
        for set_cookie in set_cookies {
            self.cookie_jar.add_from_header(set_cookie, &hop);
        }
    }

    fn final_url(&mut self, url: &str) {
        self.final_url = Some(url.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{TransportCode, TransportFailure};
    use crate::sse::{SseDechunker, SseEvent};
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Replays canned chunks and records every exchange it is given
    #[derive(Clone, Default)]
    struct ScriptedTransport {
        header_chunks: Vec<Vec<u8>>,
        body_chunks: Vec<Vec<u8>>,
        outcome: Option<TransportFailure>,
        status: u16,
        /// Redirect hops reported before the final response: (url, Set-Cookie values)
        hops: Vec<(String, Vec<String>)>,
        final_url: Option<String>,
        seen: Arc<Mutex<Vec<Exchange>>>,
    }

    impl ScriptedTransport {
        fn ok(status: u16, headers: &[&str], body: &[&[u8]]) -> Self {
            Self {
                header_chunks: headers.iter().map(|h| h.as_bytes().to_vec()).collect(),
                body_chunks: body.iter().map(|b| b.to_vec()).collect(),
                status,
                ..Default::default()
            }
        }

        fn failing(code: TransportCode, body: &[&[u8]]) -> Self {
            Self {
                body_chunks: body.iter().map(|b| b.to_vec()).collect(),
                outcome: Some(TransportFailure::new(code, "simulated failure")),
                ..Default::default()
            }
        }

        fn redirect_via(mut self, url: &str, set_cookies: &[&str]) -> Self {
            self.hops
                .push((url.to_string(), set_cookies.iter().map(|c| c.to_string()).collect()));
            self
        }

        fn ending_at(mut self, url: &str) -> Self {
            self.final_url = Some(url.to_string());
            self
        }

        /// The exchange as it went out on the final hop
        fn last(&self) -> Exchange {
            self.seen.lock().last().cloned().unwrap()
        }
    }

    impl Transport for ScriptedTransport {
        fn perform(
            &mut self,
            exchange: &Exchange,
            sink: &mut dyn ExchangeSink,
        ) -> std::result::Result<u16, TransportFailure> {
            for (hop_url, set_cookies) in &self.hops {
                exchange.hop_headers(hop_url, sink);
                sink.redirected(hop_url, set_cookies);
            }
            let target = self.final_url.clone().unwrap_or_else(|| exchange.url.clone());
            let mut sent = exchange.clone();
            sent.headers = exchange.hop_headers(&target, sink);
            self.seen.lock().push(sent);
            if self.final_url.is_some() {
                sink.final_url(&target);
            }

            for chunk in &self.header_chunks {
                sink.header(chunk);
            }
            for chunk in &self.body_chunks {
                sink.body(chunk);
            }
            match &self.outcome {
                Some(failure) => Err(failure.clone()),
                None => Ok(self.status),
            }
        }
    }

    fn client_with(default_url: &str, transport: &ScriptedTransport) -> Client {
        let url = if default_url.is_empty() {
            Url::default()
        } else {
            Url::parse(default_url).unwrap()
        };
        Client::with_transport(url, Box::new(transport.clone()))
    }

    fn ok_transport() -> ScriptedTransport {
        ScriptedTransport::ok(200, &["HTTP/1.1 200 OK\r\n", "\r\n"], &[])
    }

    #[test]
    fn test_request_url_wins() {
        let transport = ok_transport();
        let mut client = client_with("http://default.test/base", &transport);

        client.send(Request::parse("https://api.test/v1").unwrap());
        assert_eq!(transport.last().url, "https://api.test/v1");
    }

    #[test]
    fn test_default_url_used() {
        let transport = ok_transport();
        let mut client = client_with("http://default.test:8080/base", &transport);

        client.send(Request::default());
        assert_eq!(transport.last().url, "http://default.test:8080/base");
    }

    #[test]
    fn test_fallback_to_localhost() {
        let transport = ok_transport();
        let mut client = client_with("", &transport);

        client.send(Request::default());
        assert_eq!(transport.last().url, "http://localhost/");
        assert_eq!(fallback_url().port, "80");
    }

    #[test]
    fn test_query_merge_right_biased() {
        let transport = ok_transport();
        let mut client = client_with("http://default.test/?a=1&keep=yes", &transport);

        client.send(Request::parse("http://api.test/q?a=2&b=3").unwrap());
        let sent = Url::parse(&transport.last().url).unwrap();

        assert_eq!(sent.domain, "api.test");
        assert_eq!(sent.query.len(), 3);
        assert_eq!(sent.query["a"], "2");
        assert_eq!(sent.query["b"], "3");
        assert_eq!(sent.query["keep"], "yes");
    }

    #[test]
    fn test_method_resolution() {
        let transport = ok_transport();
        let mut client = client_with("http://h.test", &transport);

        client.send(Request::default());
        assert_eq!(transport.last().method, None);

        client.set_default_method(Some(Method::Put));
        client.send(Request::default());
        assert_eq!(transport.last().method, Some(Method::Put));

        client.send(Request::default().with_method(Method::Delete));
        assert_eq!(transport.last().method, Some(Method::Delete));
    }

    #[test]
    fn test_body_resolution() {
        let transport = ok_transport();
        let mut client = client_with("http://h.test", &transport);

        client.send(Request::default());
        assert!(transport.last().body.is_none());
        assert_eq!(transport.last().effective_method(), Method::Get);

        client.set_default_string("default body");
        client.send(Request::default());
        assert_eq!(transport.last().body.as_deref(), Some(&b"default body"[..]));
        assert_eq!(transport.last().effective_method(), Method::Post);

        client.send(Request::default().text("own body"));
        assert_eq!(transport.last().body.as_deref(), Some(&b"own body"[..]));
    }

    #[test]
    fn test_header_merge_right_biased() {
        let transport = ok_transport();
        let mut client = client_with("http://h.test", &transport);
        client.set_default_header("Authorization", "Bearer default");
        client.set_default_header("X-Client", "cli");

        client.send(
            Request::default()
                .header("Authorization", "Bearer override")
                .header("authorization", "lowercase is a different key"),
        );

        let mut lines = transport.last().header_lines();
        lines.sort();
        assert_eq!(
            lines,
            vec![
                "Authorization: Bearer override",
                "X-Client: cli",
                "authorization: lowercase is a different key",
            ]
        );
    }

    #[test]
    fn test_default_json_sets_content_type() {
        let transport = ok_transport();
        let mut client = client_with("http://h.test", &transport);
        client
            .set_default_json(&serde_json::json!({"stream": true}))
            .unwrap();

        client.send(Request::default());
        let sent = transport.last();
        assert!(sent
            .headers
            .contains(&("Content-Type".to_string(), "application/json".to_string())));
        assert_eq!(sent.body.as_deref(), Some(&br#"{"stream":true}"#[..]));
    }

    #[test]
    fn test_fan_out_order_and_buffering() {
        let transport = ScriptedTransport::ok(
            200,
            &["HTTP/1.1 200 OK\r\n", "X-A: 1\r\n", "\r\n"],
            &[b"first", b"second"],
        );
        let mut client = client_with("http://h.test", &transport);

        let log = Arc::new(Mutex::new(Vec::<String>::new()));
        let recorder = |name: &'static str| {
            let log = log.clone();
            Subscription::from_fn(move |chunk, kind| {
                log.lock().push(format!(
                    "{name}:{kind:?}:{}",
                    String::from_utf8_lossy(chunk).trim_end()
                ));
            })
        };
        client.subscribe(recorder("default"));
        let response = client.send(Request::default().with_subscription(recorder("request")));

        let log = log.lock();
        assert_eq!(
            *log,
            vec![
                "default:Header:HTTP/1.1 200 OK",
                "request:Header:HTTP/1.1 200 OK",
                "default:Header:X-A: 1",
                "request:Header:X-A: 1",
                "default:Header:",
                "request:Header:",
                "default:Body:first",
                "request:Body:first",
                "default:Body:second",
                "request:Body:second",
            ]
        );
        assert_eq!(&response.body[..], b"firstsecond");
        assert_eq!(response.status_code, 200);
        assert_eq!(response.status_line, "HTTP/1.1 200 OK");
        assert_eq!(response.header("X-A"), Some("1"));
    }

    #[test]
    fn test_sse_events_delivered_inline() {
        let transport = ScriptedTransport::ok(
            200,
            &["HTTP/1.1 200 OK\r\n", "\r\n"],
            &[b"event: delta\ndata: a", b"\n\ndata: b\n", b"\n: done\n"],
        );
        let mut client = client_with("http://h.test", &transport);

        let log = Arc::new(Mutex::new(Vec::<String>::new()));
        let event_log = log.clone();
        let dechunker = Arc::new(Mutex::new(SseDechunker::new(move |event, data| {
            event_log.lock().push(format!("event {event}:{data}"));
        })));
        let chunk_log = log.clone();

        let response = client.send(
            Request::default()
                .with_subscription(Subscription::shared(dechunker.clone()))
                .with_subscription(Subscription::from_fn(move |_, kind| {
                    if kind == ChunkKind::Body {
                        chunk_log.lock().push("chunk".to_string());
                    }
                })),
        );

        assert_eq!(
            *log.lock(),
            vec!["chunk", "event delta:a", "chunk", "event :b", "chunk"]
        );
        assert!(dechunker.lock().started());
        assert_eq!(response.text().unwrap(), "event: delta\ndata: a\n\ndata: b\n\n: done\n");
    }

    #[test]
    fn test_collecting_dechunker_on_client() {
        let transport = ScriptedTransport::ok(
            200,
            &["HTTP/1.1 200 OK\r\n", "\r\n"],
            &[b"data: {\"n\":1}\n\n", b"data: [DONE]\n\n"],
        );
        let mut client = client_with("http://h.test", &transport);
        let (dechunker, events) = SseDechunker::collecting();
        client.subscribe(Subscription::new(dechunker));

        client.send(Request::default());
        let events = events.lock();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], SseEvent::new("", "{\"n\":1}"));
        assert!(events[1].is_done_marker());
    }

    #[test]
    fn test_transport_failure_leaves_status_zero() {
        let transport = ScriptedTransport::failing(TransportCode::Connect, &[b"partial"]);
        let mut client = client_with("http://h.test", &transport);

        let response = client.send(Request::default());
        assert_eq!(response.status_code, 0);
        assert!(!response.transport_ok());
        assert_eq!(response.transport_code, TransportCode::Connect);
        assert_eq!(response.transport_error.as_deref(), Some("simulated failure"));
        assert_eq!(&response.body[..], b"partial");
        assert!(!response.is_success());
    }

    #[test]
    fn test_http_error_is_ordinary_response() {
        let transport = ScriptedTransport::ok(
            401,
            &["HTTP/1.1 401 Unauthorized\r\n", "Content-Type: application/json\r\n", "\r\n"],
            &[br#"{"error":"bad key"}"#],
        );
        let mut client = client_with("http://h.test", &transport);

        let response = client.send(Request::default());
        assert!(response.transport_ok());
        assert_eq!(response.status_code, 401);
        assert!(response.is_client_error());
        assert!(response.is_json());
    }

    #[test]
    fn test_repeated_response_headers_joined() {
        let transport = ScriptedTransport::ok(
            200,
            &["HTTP/1.1 200 OK\r\n", "Via: one\r\n", "Via: two\r\n", "\r\n"],
            &[],
        );
        let mut client = client_with("http://h.test", &transport);

        let response = client.send(Request::default());
        assert_eq!(response.header("Via"), Some("one, two"));
    }

    #[test]
    fn test_follow_redirects_flag_forwarded() {
        let transport = ok_transport();
        let mut client = client_with("http://h.test", &transport);

        client.send(Request::default());
        assert!(!transport.last().follow_redirects);

        client.set_follow_redirects(true);
        client.send(Request::default());
        assert!(transport.last().follow_redirects);
    }

    #[test]
    fn test_set_cookie_stored_and_replayed() {
        let transport = ScriptedTransport::ok(
            200,
            &["HTTP/1.1 200 OK\r\n", "Set-Cookie: session=abc; Path=/\r\n", "\r\n"],
            &[],
        );
        let mut client = client_with("http://h.test", &transport);

        client.send(Request::default());
        assert_eq!(client.get_cookies(), vec!["session=abc; Domain=h.test; Path=/"]);

        client.send(Request::default());
        let sent = transport.last();
        assert!(sent
            .headers
            .contains(&("Cookie".to_string(), "session=abc".to_string())));

        client.send(Request::default().header("Cookie", "manual=1"));
        assert!(transport
            .last()
            .headers
            .contains(&("Cookie".to_string(), "manual=1".to_string())));
    }

    #[test]
    fn test_lowercase_cookie_header_suppresses_jar() {
        let transport = ok_transport();
        let mut client = client_with("http://h.test", &transport);
        client.set_cookie("jar=1");

        client.send(Request::default().header("cookie", "mine=1"));
        let sent = transport.last();
        assert_eq!(sent.headers, vec![("cookie".to_string(), "mine=1".to_string())]);
    }

    #[test]
    fn test_redirect_hop_cookies_stored_per_host() {
        let transport = ScriptedTransport::ok(
            200,
            &["HTTP/1.1 200 OK\r\n", "Set-Cookie: final=2\r\n", "\r\n"],
            &[],
        )
        .redirect_via("http://login.test/start", &["hop=1; Path=/"])
        .ending_at("http://app.test/home");
        let mut client = client_with("http://login.test/start", &transport);
        client.set_follow_redirects(true);

        let response = client.send(Request::default());
        assert_eq!(response.url, "http://app.test/home");

        let mut cookies = client.get_cookies();
        cookies.sort();
        assert_eq!(
            cookies,
            vec![
                "final=2; Domain=app.test; Path=/",
                "hop=1; Domain=login.test; Path=/",
            ]
        );

        // The login cookie is not replayed to the other host.
        assert!(!transport.last().has_cookie_header());
    }

    #[test]
    fn test_redirect_hop_cookie_sent_on_same_host_hop() {
        let transport = ok_transport()
            .redirect_via("http://h.test/login", &["session=s1"])
            .ending_at("http://h.test/home");
        let mut client = client_with("http://h.test/login", &transport);
        client.set_follow_redirects(true);

        client.send(Request::default());
        assert!(transport
            .last()
            .headers
            .contains(&("Cookie".to_string(), "session=s1".to_string())));
    }

    #[test]
    fn test_response_url_without_redirect() {
        let transport = ok_transport();
        let mut client = client_with("http://h.test/a", &transport);
        let response = client.send(Request::default());
        assert_eq!(response.url, "http://h.test/a");
    }

    #[test]
    fn test_set_cookie_injection() {
        let transport = ok_transport();
        let mut client = client_with("http://h.test", &transport);

        client.set_cookie("a=1; b=2");
        client.set_cookie("scoped=x; Domain=other.test; Path=/");
        assert_eq!(client.cookie_jar().len(), 3);

        client.send(Request::default());
        let cookie = transport
            .last()
            .headers
            .into_iter()
            .find(|(k, _)| k == "Cookie")
            .map(|(_, v)| v)
            .unwrap();
        let mut parts: Vec<&str> = cookie.split("; ").collect();
        parts.sort();
        assert_eq!(parts, vec!["a=1", "b=2"]);
    }

    #[test]
    fn test_cookie_file_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jar.json");

        let transport = ScriptedTransport::ok(
            200,
            &["HTTP/1.1 200 OK\r\n", "Set-Cookie: token=t1\r\n", "\r\n"],
            &[],
        );
        let mut client = client_with("http://h.test", &transport);
        client.set_cookie_file(&path);
        client.send(Request::default());
        assert!(path.exists());

        let replay = ok_transport();
        let mut fresh = client_with("http://h.test", &replay);
        fresh.set_cookie_file(&path);
        fresh.send(Request::default());
        assert!(replay
            .last()
            .headers
            .contains(&("Cookie".to_string(), "token=t1".to_string())));
    }

    #[test]
    fn test_cookie_file_errors_do_not_abort() {
        let dir = tempfile::tempdir().unwrap();
        let transport = ok_transport();
        let mut client = client_with("http://h.test", &transport);
        // A directory can be neither read nor written as a file.
        client.set_cookie_file(dir.path());

        let response = client.send(Request::default());
        assert_eq!(response.status_code, 200);
        assert!(client.save_cookies().is_err());
    }
}
