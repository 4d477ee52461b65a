// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP request value object
//!
//! Every field may be left empty to inherit the corresponding client default.

use std::collections::HashMap;

use bytes::Bytes;
use serde::Serialize;

use super::client::Client;
use super::response::Response;
use super::subscription::Subscription;
use super::url::Url;
use super::{mime, set_default_content_type, Method};
use crate::error::Result;

/// HTTP request representation
#[derive(Debug, Clone, Default)]
pub struct Request {
    /// Target URL (empty domain = use the client's URL)
    pub url: Url,
    /// Request method (None = use the client's method)
    pub method: Option<Method>,
    /// Request headers, keys compared as literal strings
    pub headers: HashMap<String, String>,
    /// Request body (empty = use the client's body)
    pub body: Bytes,
    /// Subscribers fired after the client's own
    pub subscriptions: Vec<Subscription>,
}

impl Request {
    /// Create a request for a URL
    pub fn new(url: Url) -> Self {
        Self {
            url,
            ..Default::default()
        }
    }

    /// Create a request by parsing a URL string
    pub fn parse(url: &str) -> Result<Self> {
        Ok(Self::new(Url::parse(url)?))
    }

    /// Create a GET request
    pub fn get(url: &str) -> Result<Self> {
        Ok(Self::parse(url)?.with_method(Method::Get))
    }

    /// Create a POST request
    pub fn post(url: &str) -> Result<Self> {
        Ok(Self::parse(url)?.with_method(Method::Post))
    }

    /// Set the method
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Set a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set multiple headers
    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Set a text body
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.set_string(text);
        self
    }

    /// Set a binary body
    pub fn data(mut self, data: impl Into<Bytes>) -> Self {
        self.set_data(data);
        self
    }

    /// Set a JSON body
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self> {
        self.set_json(value)?;
        Ok(self)
    }

    /// Register a subscriber
    pub fn with_subscription(mut self, subscription: Subscription) -> Self {
        self.subscribe(subscription);
        self
    }

    /// Register a subscriber
    pub fn subscribe(&mut self, subscription: Subscription) {
        self.subscriptions.push(subscription);
    }

    /// Use `text` as the body; no content type is implied
    pub fn set_string(&mut self, text: impl Into<String>) {
        self.body = Bytes::from(text.into());
    }

    /// Use raw bytes as the body, defaulting the content type to octet-stream
    pub fn set_data(&mut self, data: impl Into<Bytes>) {
        self.body = data.into();
        set_default_content_type(&mut self.headers, mime::OCTET_STREAM);
    }

    /// Serialize `value` as the body, defaulting the content type to JSON
    pub fn set_json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.body = Bytes::from(serde_json::to_vec(value)?);
        set_default_content_type(&mut self.headers, mime::JSON);
        Ok(())
    }

    /// Send on a fresh client with no defaults
    pub fn send(self) -> Result<Response> {
        let mut client = Client::new(Url::default())?;
        Ok(client.send(self))
    }
}
