//! # Futures implementation using Tokio runtime
//!
//! This module contains [`RuntimeTokio`] type.
//!
//! It requires the [`tokio` feature] to be enabled.
//!
//! [`tokio` feature]: ../index.html#features

use crate::core::Runtime;
use std::future::Future;

/// Tokio-based `async` tasks spawner.
///
/// Spawns the push subscription loops on the ambient Tokio runtime, so it
/// has to be used from within a Tokio context.
#[derive(Copy, Clone, Debug, Default)]
pub struct RuntimeTokio;

impl Runtime for RuntimeTokio {
    fn spawn<R>(&self, future: impl Future<Output = R> + Send + 'static)
    where
        R: Send + 'static,
    {
        tokio::spawn(future);
    }
}
