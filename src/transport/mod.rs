//! # Transport Providers Module
//!
//! This module contains the REST transport used by [`GroupMeClient`] and the
//! middleware applied to every request.
//!
//! [`GroupMeClient`]: crate::dx::GroupMeClient

#[cfg(feature = "reqwest")]
pub use self::reqwest::TransportReqwest;
#[cfg(feature = "reqwest")]
pub mod reqwest;

pub use middleware::GroupMeMiddleware;
pub mod middleware;
