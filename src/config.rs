// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Transport configuration

use std::time::Duration;

use crate::http::DEFAULT_USER_AGENT;

/// Environment variable overriding the user agent
pub const ENV_USER_AGENT: &str = "STREAMNET_USER_AGENT";
/// Environment variable with a proxy URL for all schemes
pub const ENV_PROXY: &str = "STREAMNET_PROXY";
/// Environment variable with the connect timeout in milliseconds
pub const ENV_CONNECT_TIMEOUT_MS: &str = "STREAMNET_CONNECT_TIMEOUT_MS";
/// Environment variable with the overall exchange timeout in milliseconds
pub const ENV_TIMEOUT_MS: &str = "STREAMNET_TIMEOUT_MS";
/// Environment variable with the redirect hop limit
pub const ENV_MAX_REDIRECTS: &str = "STREAMNET_MAX_REDIRECTS";
/// Environment variable with the body read chunk size in bytes
pub const ENV_READ_CHUNK: &str = "STREAMNET_READ_CHUNK";

/// Transport configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetConfig {
    /// User agent string
    pub user_agent: String,
    /// Connect timeout
    pub connect_timeout: Option<Duration>,
    /// Overall exchange timeout (none: a send may block forever)
    pub timeout: Option<Duration>,
    /// Maximum redirect hops when following is enabled
    pub max_redirects: usize,
    /// Upper bound for a single body read, and therefore for a body chunk
    pub read_chunk_size: usize,
    /// Proxy URL
    pub proxy: Option<String>,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout: Some(Duration::from_secs(30)),
            timeout: None,
            max_redirects: 10,
            read_chunk_size: 16 * 1024,
            proxy: None,
        }
    }
}

impl NetConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `STREAMNET_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(agent) = lookup(ENV_USER_AGENT).filter(|v| !v.trim().is_empty()) {
            config.user_agent = agent;
        }
        if let Some(proxy) = lookup(ENV_PROXY).filter(|v| !v.trim().is_empty()) {
            config.proxy = Some(proxy);
        }
        if let Some(ms) = parse_number(&lookup, ENV_CONNECT_TIMEOUT_MS) {
            config.connect_timeout = Some(Duration::from_millis(ms as u64));
        }
        if let Some(ms) = parse_number(&lookup, ENV_TIMEOUT_MS) {
            config.timeout = Some(Duration::from_millis(ms as u64));
        }
        if let Some(hops) = parse_number(&lookup, ENV_MAX_REDIRECTS) {
            config.max_redirects = hops;
        }
        if let Some(size) = parse_number(&lookup, ENV_READ_CHUNK).filter(|&n| n > 0) {
            config.read_chunk_size = size;
        }

        config
    }

    /// Set user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set connect timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set overall timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Remove the overall timeout
    pub fn no_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Set redirect hop limit
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    /// Set body read chunk size (clamped to at least one byte)
    pub fn read_chunk_size(mut self, size: usize) -> Self {
        self.read_chunk_size = size.max(1);
        self
    }

    /// Set proxy
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }
}

fn parse_number<F>(lookup: &F, key: &str) -> Option<usize>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<usize>() {
        Ok(n) => Some(n),
        Err(_) => {
            tracing::warn!(variable = key, value = %raw, "Ignoring non-numeric setting");
            None
        }
    }
}
