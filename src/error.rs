// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for streamnet
//!
//! Only failures that happen before an exchange starts (URL construction,
//! session construction, body encoding) or explicit cookie-file IO come back
//! as `Err`. Everything that goes wrong during an exchange is reported through
//! the [`Response`](crate::http::Response) instead.

use thiserror::Error;

use crate::http::TransportCode;

/// Result type alias for streamnet operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for streamnet
#[derive(Error, Debug)]
pub enum Error {
    /// URL has no domain segment
    #[error("URL is missing a domain: {input:?}")]
    MissingDomain { input: String },

    /// The transport could not complete an exchange
    #[error("Transport error ({code}): {message}")]
    Transport { code: TransportCode, message: String },

    /// HTTP session could not be built
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Cookie handling error
    #[error("Cookie error: {0}")]
    Cookie(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a missing-domain error for the given input
    pub fn missing_domain(input: impl Into<String>) -> Self {
        Error::MissingDomain {
            input: input.into(),
        }
    }

    /// Create a transport error
    pub fn transport(code: TransportCode, message: impl Into<String>) -> Self {
        Error::Transport {
            code,
            message: message.into(),
        }
    }

    /// Create a cookie error
    pub fn cookie<S: Into<String>>(msg: S) -> Self {
        Error::Cookie(msg.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a URL construction error
    pub fn is_url(&self) -> bool {
        matches!(self, Error::MissingDomain { .. })
    }

    /// Check if this came from the transport
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport { .. } | Error::Http(_))
    }

    /// Transport code if this is a transport error
    pub fn transport_code(&self) -> Option<TransportCode> {
        match self {
            Error::Transport { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}
