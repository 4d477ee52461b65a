// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Absolute URL value type
//!
//! Parses `scheme://domain[:port]/path[?query]` into its parts and serializes
//! it back. Query parameters live in a map, so serialization order is whatever
//! the map yields and percent-encoding is canonicalized on every call.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Parsed absolute URL
///
/// The default value has an empty domain, which requests use to mean
/// "inherit the client's URL".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Url {
    /// Scheme, `http` when the input had none
    pub scheme: String,
    /// Host name, never empty after a successful parse
    pub domain: String,
    /// Port as written, or the scheme default, or empty
    pub port: String,
    /// Path as written, may be empty
    pub path: String,
    /// Decoded query parameters
    pub query: HashMap<String, String>,
}

impl Url {
    /// Parse an absolute URL; fails when the domain segment is empty
    ///
    /// The domain ends at the first `/` or `?`, so `http://h?q=1` has domain
    /// `h` and an empty path.
    pub fn parse(input: &str) -> Result<Self> {
        let (scheme, rest) = match input.find(':') {
            Some(idx) if input[idx + 1..].starts_with("//") => (&input[..idx], &input[idx + 3..]),
            _ => ("http", input),
        };

        let domain_end = rest.find(|c: char| c == '/' || c == '?').unwrap_or(rest.len());
        let authority = &rest[..domain_end];
        let (domain, port) = match authority.split_once(':') {
            Some((domain, port)) => (domain, port.to_string()),
            None => (
                authority,
                Self::default_port(scheme).unwrap_or_default().to_string(),
            ),
        };

        if domain.is_empty() {
            return Err(Error::missing_domain(input));
        }

        let tail = &rest[domain_end..];
        let (path, query) = match tail.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (tail, None),
        };

        Ok(Self {
            scheme: scheme.to_string(),
            domain: domain.to_string(),
            port,
            path: path.to_string(),
            query: query.map(parse_query_string).unwrap_or_default(),
        })
    }

    /// Well-known port for a scheme
    pub fn default_port(scheme: &str) -> Option<&'static str> {
        match scheme {
            "http" => Some("80"),
            "https" => Some("443"),
            "ftp" => Some("21"),
            "sftp" => Some("22"),
            _ => None,
        }
    }

    /// True for the "inherit" URL (no domain)
    pub fn is_empty(&self) -> bool {
        self.domain.is_empty()
    }

    /// Add or replace a query parameter
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Overwrite query parameters key by key with `params`
    pub fn merge_query(&mut self, params: &HashMap<String, String>) {
        for (key, value) in params {
            self.query.insert(key.clone(), value.clone());
        }
    }

    /// Percent-encode everything except unreserved characters
    pub fn encode(input: &str) -> String {
        let mut result = String::with_capacity(input.len());
        for byte in input.bytes() {
            match byte {
                b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                    result.push(byte as char)
                }
                _ => result.push_str(&format!("%{:02X}", byte)),
            }
        }
        result
    }

    /// Decode `%XX` escapes; malformed escapes and `+` are kept literally
    pub fn decode(input: &str) -> String {
        let bytes = input.as_bytes();
        let mut out = Vec::with_capacity(bytes.len());
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'%' && i + 2 < bytes.len() {
                if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                    out.push(hi << 4 | lo);
                    i += 3;
                    continue;
                }
            }
            out.push(bytes[i]);
            i += 1;
        }
        String::from_utf8_lossy(&out).into_owned()
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.domain)?;

        let well_known = matches!(
            (self.scheme.as_str(), self.port.as_str()),
            ("http", "80") | ("https", "443")
        );
        if !well_known && !self.port.is_empty() {
            write!(f, ":{}", self.port)?;
        }

        if !self.path.starts_with('/') {
            f.write_str("/")?;
        }
        f.write_str(&self.path)?;

        let mut first = true;
        for (key, value) in &self.query {
            f.write_str(if first { "?" } else { "&" })?;
            write!(f, "{}={}", Self::encode(key), Self::encode(value))?;
            first = false;
        }

        Ok(())
    }
}

impl FromStr for Url {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Url {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn parse_query_string(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (Url::decode(key), Url::decode(value)),
            None => (Url::decode(pair), String::new()),
        })
        .collect()
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}
