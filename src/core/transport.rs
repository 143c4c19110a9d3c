//! # Transport module
//!
//! This module contains the [`Transport`] trait used by the REST client.
//!
//! You can implement this trait for your own types, or use the provided
//! `reqwest` feature to use [`TransportReqwest`].
//!
//! [`TransportReqwest`]: crate::transport::TransportReqwest

use super::{GroupMeError, TransportRequest, TransportResponse};

/// This trait is used to send requests to the [`GroupMe API`].
///
/// # Examples
/// ```
/// use groupme::core::{Transport, TransportRequest, TransportResponse, GroupMeError};
///
/// struct MyTransport;
///
/// #[async_trait::async_trait]
/// impl Transport for MyTransport {
///    async fn send(&self, req: TransportRequest) -> Result<TransportResponse, GroupMeError> {
///         // Send your request here
///
///         Ok(TransportResponse::default())
///    }
/// }
/// ```
///
/// [`GroupMe API`]: https://dev.groupme.com/docs/v3
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Send a request to the [`GroupMe API`].
    ///
    /// # Errors
    /// Should return an [`GroupMeError::Transport`] if the request cannot be
    /// sent.
    ///
    /// [`GroupMe API`]: https://dev.groupme.com/docs/v3
    async fn send(&self, req: TransportRequest) -> Result<TransportResponse, GroupMeError>;
}
