//! # Providers module
//!
//! This module contains the runtime providers that can be used by
//! [`PushSubscription`].
//!
//! [`PushSubscription`]: crate::dx::realtime::PushSubscription

#[cfg(feature = "tokio")]
pub mod futures_tokio;
