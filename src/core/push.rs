//! # Push transport module
//!
//! This module contains the [`PushTransport`] and [`Extension`] traits and
//! the [`PushMessage`] type exchanged with the GroupMe push service.
//!
//! The push service speaks a long-polling publish/subscribe protocol
//! (handshake, connect cycle, channel subscriptions). The wire level of that
//! protocol is not implemented by this crate: a transport only has to be able
//! to subscribe to a channel and deliver every message published to it, and
//! to let registered [`Extension`]s inspect messages in both directions.

use crate::core::GroupMeError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Address of the GroupMe push service.
pub const PUSH_SERVER: &str = "https://push.groupme.com/faye";

/// Prefix of the per-user channel.
pub const USER_CHANNEL: &str = "/user/";

/// Prefix of the per-group channel.
pub const GROUP_CHANNEL: &str = "/group/";

/// Prefix of the per-conversation (direct message) channel.
pub const DM_CHANNEL: &str = "/direct_message/";

/// Protocol handshake meta channel.
pub const HANDSHAKE_CHANNEL: &str = "/meta/handshake";

/// Protocol connect meta channel.
pub const CONNECT_CHANNEL: &str = "/meta/connect";

/// Protocol subscribe meta channel.
///
/// Outgoing messages on this channel carry the access token.
pub const SUBSCRIBE_CHANNEL: &str = "/meta/subscribe";

/// Sending half of the inbound channel shared by all subscriptions.
pub type PushSender = async_channel::Sender<PushMessage>;

/// Receiving half of the inbound channel shared by all subscriptions.
pub type PushReceiver = async_channel::Receiver<PushMessage>;

/// Single message exchanged with the push service.
///
/// Used both for protocol control messages (`/meta/*` channels) and for the
/// events published on user, group and direct message channels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushMessage {
    /// Name of the channel the message belongs to.
    pub channel: String,

    /// Event payload.
    ///
    /// Events delivered to subscribers carry a `type` discriminator and a
    /// `subject` with the event body.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub data: Map<String, Value>,

    /// Free-form extension map.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub ext: Map<String, Value>,

    /// Error reported by the service for this message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Protocol message identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Protocol client identifier assigned during the handshake.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Channel targeted by a subscribe control message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription: Option<String>,

    /// Whether the service acknowledged the control message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub successful: Option<bool>,
}

impl PushMessage {
    /// Create message for `channel` with the given event payload.
    pub fn new<S>(channel: S, data: Map<String, Value>) -> Self
    where
        S: Into<String>,
    {
        Self {
            channel: channel.into(),
            data,
            ..Default::default()
        }
    }

    /// Name of the channel the message belongs to.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Event payload.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Mutable extension map.
    pub fn ext_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.ext
    }

    /// Error reported by the service, `None` when empty.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref().filter(|error| !error.is_empty())
    }
}

/// Hook into every message passing through a [`PushTransport`].
///
/// `incoming` is called for every message received from the service and
/// `outgoing` right before a message is sent, with a chance to modify it.
pub trait Extension: Send + Sync {
    /// Inspect a message received from the service.
    fn incoming(&self, message: &PushMessage);

    /// Inspect or amend a message about to be sent to the service.
    fn outgoing(&self, message: &mut PushMessage);
}

/// Publish/subscribe session with the push service.
///
/// Implementations own the connection lifecycle (handshake, connect cycle,
/// reconnection). Every message published on a subscribed channel has to be
/// sent to the `destination` passed to [`PushTransport::wait_subscribe`].
///
/// # Examples
/// ```
/// use groupme::core::{
///     push::{Extension, PushSender, PushTransport},
///     GroupMeError,
/// };
/// use std::sync::Arc;
///
/// struct MyTransport;
///
/// #[async_trait::async_trait]
/// impl PushTransport for MyTransport {
///     fn add_extension(&self, extension: Arc<dyn Extension>) {
///         // Keep extension and call it for every message.
///     }
///
///     async fn listen(&self) {
///         // Run connect cycle until connection is terminated.
///     }
///
///     async fn wait_subscribe(
///         &self,
///         channel: &str,
///         destination: PushSender,
///     ) -> Result<(), GroupMeError> {
///         // Send subscribe request and wait for acknowledgement.
///         Ok(())
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait PushTransport: Send + Sync {
    /// Register extension which should see every message in both directions.
    fn add_extension(&self, extension: Arc<dyn Extension>);

    /// Receive messages until the underlying connection terminates.
    async fn listen(&self);

    /// Subscribe to `channel` and wait for the service acknowledgement.
    ///
    /// After successful return, `destination` receives all messages
    /// published to `channel`.
    ///
    /// # Errors
    /// Should return [`GroupMeError::Transport`] if the subscription request
    /// can't be completed.
    async fn wait_subscribe(
        &self,
        channel: &str,
        destination: PushSender,
    ) -> Result<(), GroupMeError>;

    /// Terminate the session.
    async fn disconnect(&self) {}
}

#[async_trait::async_trait]
impl<T> PushTransport for Arc<T>
where
    T: PushTransport + ?Sized,
{
    fn add_extension(&self, extension: Arc<dyn Extension>) {
        self.as_ref().add_extension(extension)
    }

    async fn listen(&self) {
        self.as_ref().listen().await
    }

    async fn wait_subscribe(
        &self,
        channel: &str,
        destination: PushSender,
    ) -> Result<(), GroupMeError> {
        self.as_ref().wait_subscribe(channel, destination).await
    }

    async fn disconnect(&self) {
        self.as_ref().disconnect().await
    }
}
