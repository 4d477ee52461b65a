// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Cookie jar with optional JSON file persistence

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use super::url::Url;
use crate::error::{Error, Result};

/// A single HTTP cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Domain the cookie belongs to (empty = every host)
    pub domain: String,
    /// Path the cookie is valid for
    pub path: String,
    /// Expiration time (None = session cookie)
    pub expires: Option<DateTime<Utc>>,
    /// Secure flag (HTTPS only)
    pub secure: bool,
    /// HttpOnly flag
    pub http_only: bool,
}

impl Cookie {
    /// Create a new cookie
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: String::new(),
            path: "/".to_string(),
            expires: None,
            secure: false,
            http_only: false,
        }
    }

    /// Set the domain
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Set the path
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set secure flag
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Set expiration time
    pub fn expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Check if the cookie is expired
    pub fn is_expired(&self) -> bool {
        self.expires.map_or(false, |exp| exp < Utc::now())
    }

    /// Check if the cookie should be sent to the given URL
    pub fn matches(&self, url: &Url) -> bool {
        if !self.domain_matches(&url.domain) {
            return false;
        }

        let path = if url.path.is_empty() { "/" } else { url.path.as_str() };
        if !path.starts_with(&self.path) {
            return false;
        }

        if self.secure && url.scheme != "https" {
            return false;
        }

        !self.is_expired()
    }

    fn domain_matches(&self, host: &str) -> bool {
        if self.domain.is_empty() {
            return true;
        }

        let domain = self.domain.trim_start_matches('.');
        host.eq_ignore_ascii_case(domain) || host.ends_with(&format!(".{}", domain))
    }

    /// Parse a Set-Cookie header value received from `url`
    pub fn parse(header: &str, url: &Url) -> Option<Self> {
        let mut parts = header.split(';');
        let first = parts.next()?.trim();

        let (name, value) = first.split_once('=')?;
        if name.trim().is_empty() {
            return None;
        }
        let mut cookie = Cookie::new(name.trim(), value.trim());
        cookie.domain = url.domain.clone();

        for part in parts {
            let part = part.trim();
            let (attr, val) = match part.split_once('=') {
                Some((attr, val)) => (attr.trim().to_lowercase(), val.trim()),
                None => (part.to_lowercase(), ""),
            };
            match attr.as_str() {
                "domain" if !val.is_empty() => {
                    cookie.domain = val.trim_start_matches('.').to_string()
                }
                "path" if !val.is_empty() => cookie.path = val.to_string(),
                "expires" => {
                    if let Ok(dt) = DateTime::parse_from_rfc2822(val) {
                        cookie.expires = Some(dt.with_timezone(&Utc));
                    }
                }
                "max-age" => {
                    if let Ok(secs) = val.parse::<i64>() {
                        cookie.expires = Some(Utc::now() + chrono::Duration::seconds(secs));
                    }
                }
                "secure" => cookie.secure = true,
                "httponly" => cookie.http_only = true,
                _ => {}
            }
        }

        Some(cookie)
    }

    /// Convert to cookie header format
    pub fn to_header_value(&self) -> String {
        format!("{}={}", self.name, self.value)
    }

    /// Render as a Set-Cookie style line
    pub fn to_set_cookie_string(&self) -> String {
        let mut out = self.to_header_value();
        if !self.domain.is_empty() {
            out.push_str(&format!("; Domain={}", self.domain));
        }
        out.push_str(&format!("; Path={}", self.path));
        if let Some(expires) = self.expires {
            out.push_str(&format!("; Expires={}", expires.to_rfc2822()));
        }
        if self.secure {
            out.push_str("; Secure");
        }
        if self.http_only {
            out.push_str("; HttpOnly");
        }
        out
    }
}

/// Cookie storage keyed by domain
#[derive(Debug, Clone)]
pub struct CookieJar {
    cookies: Arc<DashMap<String, Vec<Cookie>>>,
}

impl Default for CookieJar {
    fn default() -> Self {
        Self::new()
    }
}

impl CookieJar {
    /// Create a new empty cookie jar
    pub fn new() -> Self {
        Self {
            cookies: Arc::new(DashMap::new()),
        }
    }

    /// Add a cookie, replacing one with the same name, domain and path
    pub fn add(&self, cookie: Cookie) {
        let mut entry = self.cookies.entry(cookie.domain.clone()).or_default();
        entry.retain(|c| c.name != cookie.name || c.path != cookie.path);
        entry.push(cookie);
    }

    /// Add a cookie from a Set-Cookie header
    pub fn add_from_header(&self, header: &str, url: &Url) {
        match Cookie::parse(header, url) {
            Some(cookie) => self.add(cookie),
            None => tracing::debug!(header = %header, "Ignoring unparsable Set-Cookie"),
        }
    }

    /// Add `name=value; name2=value2` pairs that apply to every host
    pub fn add_pairs(&self, pairs: &str) -> usize {
        let mut added = 0;
        for pair in pairs.split(';') {
            if let Some((name, value)) = pair.trim().split_once('=') {
                if !name.trim().is_empty() {
                    self.add(Cookie::new(name.trim(), value.trim()));
                    added += 1;
                }
            }
        }
        added
    }

    /// Get all cookies for a URL
    pub fn get_cookies(&self, url: &Url) -> Vec<Cookie> {
        self.remove_expired();

        let mut result = Vec::new();
        for entry in self.cookies.iter() {
            for cookie in entry.value().iter() {
                if cookie.matches(url) {
                    result.push(cookie.clone());
                }
            }
        }
        result
    }

    /// Get Cookie header value for a URL
    pub fn get_cookie_header(&self, url: &Url) -> Option<String> {
        let cookies = self.get_cookies(url);
        if cookies.is_empty() {
            return None;
        }

        Some(
            cookies
                .iter()
                .map(|c| c.to_header_value())
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Every stored cookie
    pub fn all(&self) -> Vec<Cookie> {
        self.cookies
            .iter()
            .flat_map(|e| e.value().clone())
            .collect()
    }

    /// Copy every cookie of `other` into this jar
    pub fn merge(&self, other: &CookieJar) {
        for cookie in other.all() {
            self.add(cookie);
        }
    }

    /// Clear all cookies
    pub fn clear(&self) {
        self.cookies.clear();
    }

    fn remove_expired(&self) {
        for mut entry in self.cookies.iter_mut() {
            entry.value_mut().retain(|c| !c.is_expired());
        }
    }

    /// Get total cookie count
    pub fn len(&self) -> usize {
        self.cookies.iter().map(|e| e.value().len()).sum()
    }

    /// Check if jar is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Export all cookies as JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.all())
    }

    /// Import cookies from JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let cookies: Vec<Cookie> = serde_json::from_str(json)?;
        let jar = CookieJar::new();
        for cookie in cookies {
            jar.add(cookie);
        }
        Ok(jar)
    }

    /// Read a jar from a JSON file; a missing file yields an empty jar
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new());
        }
        let json = std::fs::read_to_string(path)?;
        if json.trim().is_empty() {
            return Ok(Self::new());
        }
        Self::from_json(&json)
            .map_err(|e| Error::cookie(format!("{}: {}", path.display(), e)))
    }

    /// Write the jar to a JSON file, dropping session-expired cookies first
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.remove_expired();
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_cookie_parsing() {
        let header = "session=abc123; Domain=.example.com; Path=/; Secure; HttpOnly";
        let cookie = Cookie::parse(header, &url("https://example.com/path")).unwrap();

        assert_eq!(cookie.name, "session");
        assert_eq!(cookie.value, "abc123");
        assert_eq!(cookie.domain, "example.com");
        assert_eq!(cookie.path, "/");
        assert!(cookie.secure);
        assert!(cookie.http_only);
    }

    #[test]
    fn test_cookie_defaults_to_request_host() {
        let cookie = Cookie::parse("a=1", &url("http://api.example.com/x")).unwrap();
        assert_eq!(cookie.domain, "api.example.com");
        assert!(Cookie::parse("novalue", &url("http://h")).is_none());
    }

    #[test]
    fn test_cookie_matching() {
        let cookie = Cookie::new("t", "1").domain("example.com").path("/api").secure(true);

        assert!(cookie.matches(&url("https://sub.example.com/api/v1")));
        assert!(!cookie.matches(&url("http://example.com/api")));
        assert!(!cookie.matches(&url("https://example.com/other")));
        assert!(!cookie.matches(&url("https://badexample.com/api")));
    }

    #[test]
    fn test_max_age_zero_expires() {
        let jar = CookieJar::new();
        let target = url("http://example.com/");
        jar.add_from_header("gone=1; Max-Age=-1", &target);
        assert!(jar.get_cookies(&target).is_empty());
        assert!(jar.is_empty());
    }

    #[test]
    fn test_cookie_jar() {
        let jar = CookieJar::new();
        let target = url("https://example.com/path");

        jar.add(Cookie::new("test", "value").domain("example.com"));
        jar.add(Cookie::new("test", "newer").domain("example.com"));
        assert_eq!(jar.len(), 1);

        let cookies = jar.get_cookies(&target);
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].value, "newer");
        assert_eq!(jar.get_cookie_header(&target).as_deref(), Some("test=newer"));
    }

    #[test]
    fn test_add_pairs_apply_everywhere() {
        let jar = CookieJar::new();
        assert_eq!(jar.add_pairs("a=1; b=2;  ; =x"), 2);
        assert_eq!(jar.get_cookies(&url("http://anywhere.test/")).len(), 2);
    }

    #[test]
    fn test_set_cookie_string() {
        let cookie = Cookie::new("k", "v").domain("example.com").secure(true);
        assert_eq!(
            cookie.to_set_cookie_string(),
            "k=v; Domain=example.com; Path=/; Secure"
        );
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.json");

        assert!(CookieJar::load(&path).unwrap().is_empty());

        let jar = CookieJar::new();
        jar.add(Cookie::new("persist", "yes").domain("example.com"));
        jar.save(&path).unwrap();

        let loaded = CookieJar::load(&path).unwrap();
        assert_eq!(loaded.all(), jar.all());
    }

    #[test]
    fn test_load_garbage_is_cookie_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.json");
        std::fs::write(&path, "# Netscape HTTP Cookie File").unwrap();
        assert!(matches!(CookieJar::load(&path), Err(Error::Cookie(_))));
    }
}
