// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Streaming subscribers
//!
//! A subscriber sees every raw header and body chunk of an exchange while the
//! transport is still receiving it. Subscribers run inline on the thread that
//! called `send`, in registration order, and must not call back into the
//! client that is driving them.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// Which part of the response a chunk belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkKind {
    /// Status line or header line bytes
    Header,
    /// Response body bytes
    Body,
}

/// Receives raw response bytes as they arrive
///
/// # Example
///
/// ```rust
/// use streamnet::{ChunkKind, Subscriber};
///
/// #[derive(Default)]
/// struct ByteCounter {
///     body_bytes: usize,
/// }
///
/// impl Subscriber for ByteCounter {
///     fn on_chunk(&mut self, chunk: &[u8], kind: ChunkKind) {
///         if kind == ChunkKind::Body {
///             self.body_bytes += chunk.len();
///         }
///     }
/// }
/// ```
pub trait Subscriber {
    /// Called once per chunk, in arrival order
    fn on_chunk(&mut self, chunk: &[u8], kind: ChunkKind);
}

impl<F> Subscriber for F
where
    F: FnMut(&[u8], ChunkKind),
{
    fn on_chunk(&mut self, chunk: &[u8], kind: ChunkKind) {
        self(chunk, kind)
    }
}

/// Registered subscriber handle
///
/// Cloning shares the underlying subscriber. Keep your own clone of the
/// `Arc` passed to [`Subscription::shared`] to inspect the subscriber after
/// `send` returns.
#[derive(Clone)]
pub struct Subscription {
    inner: Arc<Mutex<dyn Subscriber + Send>>,
}

impl Subscription {
    /// Wrap an owned subscriber
    pub fn new<S>(subscriber: S) -> Self
    where
        S: Subscriber + Send + 'static,
    {
        Self {
            inner: Arc::new(Mutex::new(subscriber)),
        }
    }

    /// Wrap a subscriber the caller keeps a handle to
    pub fn shared<S>(subscriber: Arc<Mutex<S>>) -> Self
    where
        S: Subscriber + Send + 'static,
    {
        Self { inner: subscriber }
    }

    /// Wrap a closure
    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnMut(&[u8], ChunkKind) + Send + 'static,
    {
        Self::new(f)
    }

    /// Deliver one chunk
    pub fn deliver(&self, chunk: &[u8], kind: ChunkKind) {
        self.inner.lock().on_chunk(chunk, kind);
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("handles", &Arc::strong_count(&self.inner))
            .finish()
    }
}
