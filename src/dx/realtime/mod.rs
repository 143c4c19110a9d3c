//! # Real-time push subscription
//!
//! This module contains [`PushSubscription`], which keeps a publish/subscribe
//! session with the GroupMe push service and delivers received events to
//! registered handlers.
//!
//! ```no_run
//! use groupme::{
//!     core::{GroupMeError, PushTransport, ID},
//!     dx::realtime::{Handler, PushSubscription},
//!     providers::futures_tokio::RuntimeTokio,
//! };
//! use std::sync::Arc;
//!
//! struct Logger;
//!
//! impl Handler for Logger {
//!     fn handle_error(&self, error: &GroupMeError) {
//!         eprintln!("{error}");
//!     }
//! }
//!
//! # async fn run(transport: impl PushTransport + 'static) -> Result<(), GroupMeError> {
//! let push = PushSubscription::new(RuntimeTokio);
//! push.add_handler(Arc::new(Logger));
//! push.start_listening(transport)?;
//! push.subscribe_to_user(&ID::from("1234"), "access-token").await?;
//! # Ok(())
//! # }
//! ```

use crate::core::{
    push::{PushReceiver, PushSender, DM_CHANNEL, GROUP_CHANNEL, USER_CHANNEL},
    GroupMeError, PushMessage, PushTransport, Runtime, Timestamp, ID,
};
use derive_builder::Builder;
use futures::lock::Mutex;
use log::{debug, info, warn};
use serde_json::Value;
use spin::RwLock;
use std::{
    fmt::{Debug, Formatter},
    ops::Deref,
    sync::{
        atomic::{AtomicBool, AtomicI64, Ordering},
        Arc,
    },
    time::Duration,
};
use time::OffsetDateTime;

#[doc(inline)]
pub use handlers::{
    Handler, HandlerAll, HandlerGroupMembership, HandlerGroupMetadata, HandlerLike,
    HandlerMembers, HandlerMembership, HandlerText,
};
pub mod handlers;

pub(crate) use event_dispatcher::EventDispatcher;
mod event_dispatcher;

mod auth_extension;
mod event_handlers;

use auth_extension::AuthExtension;
use event_handlers::event_handler;
use handlers::FullHandler;

/// Push subscription configuration.
///
/// ```
/// use groupme::dx::realtime::PushConfigBuilder;
/// use std::time::Duration;
///
/// let config = PushConfigBuilder::default()
///     .with_liveness_window(Duration::from_secs(60))
///     .build()
///     .unwrap();
///
/// assert_eq!(config.inbound_capacity, 100);
/// ```
#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(
    pattern = "owned",
    name = "PushConfigBuilder",
    build_fn(private, name = "build_internal", validate = "Self::validate"),
    setter(prefix = "with")
)]
pub struct PushConfig {
    /// How long after the last received message the subscription is still
    /// considered connected.
    ///
    /// Defaults to 30 seconds.
    #[builder(default = "Duration::from_secs(30)")]
    pub liveness_window: Duration,

    /// Number of received messages which may wait for dispatch.
    ///
    /// Transport is suspended while the inbound channel is full.
    /// Defaults to 100, must be greater than zero.
    #[builder(default = "100")]
    pub inbound_capacity: usize,
}

impl PushConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.inbound_capacity {
            Some(0) => Err("inbound_capacity must be greater than zero".into()),
            _ => Ok(()),
        }
    }

    /// Build [`PushConfig`] from the provided values.
    ///
    /// # Errors
    /// Returns [`GroupMeError::ClientInitialization`] if a value is invalid.
    pub fn build(self) -> Result<PushConfig, GroupMeError> {
        self.build_internal()
            .map_err(|err| GroupMeError::ClientInitialization {
                details: err.to_string(),
            })
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            liveness_window: Duration::from_secs(30),
            inbound_capacity: 100,
        }
    }
}

/// Real-time events subscription.
///
/// Wraps [`PushSubscriptionRef`] into [`Arc`], clones share the same
/// session, handlers and inbound channel.
///
/// Lifecycle:
/// 1. create with [`PushSubscription::new`],
/// 2. register handlers with [`add_handler`] or [`add_full_handler`],
/// 3. call [`start_listening`] with the push transport,
/// 4. subscribe to user, group or direct message channels,
/// 5. optionally [`stop`] it.
///
/// Handlers registered after events started flowing receive only the
/// events dispatched after registration.
///
/// [`add_handler`]: PushSubscriptionRef::add_handler
/// [`add_full_handler`]: PushSubscriptionRef::add_full_handler
/// [`start_listening`]: PushSubscriptionRef::start_listening
/// [`stop`]: PushSubscriptionRef::stop
#[derive(Debug)]
pub struct PushSubscription<R> {
    inner: Arc<PushSubscriptionRef<R>>,
}

impl<R> Deref for PushSubscription<R> {
    type Target = PushSubscriptionRef<R>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<R> Clone for PushSubscription<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Push subscription state.
///
/// Not intended to be used directly. Use [`PushSubscription`] instead.
pub struct PushSubscriptionRef<R> {
    config: PushConfig,

    runtime: R,

    /// Destination passed to the transport for every subscribed channel.
    sender: PushSender,

    /// Consumed by the dispatch loop.
    receiver: PushReceiver,

    /// Set by `start_listening`, cleared by `stop`.
    transport: RwLock<Option<Arc<dyn PushTransport>>>,

    /// Set once `start_listening` has been called.
    started: AtomicBool,

    dispatcher: Arc<EventDispatcher>,

    /// Access token used to sign subscribe requests.
    ///
    /// Single token for all channels, the last subscribe call wins.
    token: Arc<RwLock<String>>,

    /// Serializes "store token, subscribe" sequences and `stop`.
    subscribe_lock: Mutex<()>,

    /// Unix time (seconds) of the last received message, `0` if none.
    last_connected: Arc<AtomicI64>,
}

impl<R> PushSubscription<R>
where
    R: Runtime + 'static,
{
    /// Create push subscription with default configuration.
    ///
    /// No network activity happens until [`start_listening`] is called.
    ///
    /// [`start_listening`]: PushSubscriptionRef::start_listening
    pub fn new(runtime: R) -> Self {
        Self::with_config(runtime, PushConfig::default())
    }

    /// Create push subscription with custom configuration.
    pub fn with_config(runtime: R, config: PushConfig) -> Self {
        let (sender, receiver) = async_channel::bounded(config.inbound_capacity.max(1));

        Self {
            inner: Arc::new(PushSubscriptionRef {
                config,
                runtime,
                sender,
                receiver,
                transport: RwLock::new(None),
                started: AtomicBool::new(false),
                dispatcher: Arc::new(EventDispatcher::new()),
                token: Arc::new(RwLock::new(String::new())),
                subscribe_lock: Mutex::new(()),
                last_connected: Arc::new(AtomicI64::new(0)),
            }),
        }
    }
}

#[cfg(feature = "tokio")]
impl Default for PushSubscription<crate::providers::futures_tokio::RuntimeTokio> {
    fn default() -> Self {
        Self::new(crate::providers::futures_tokio::RuntimeTokio)
    }
}

impl<R> PushSubscriptionRef<R>
where
    R: Runtime + 'static,
{
    /// Register handler.
    ///
    /// Handler receives events for every capability exposed through its
    /// `as_*` accessors. Handlers are called in registration order.
    pub fn add_handler(&self, handler: Arc<dyn Handler>) {
        self.dispatcher.add_handler(handler);
    }

    /// Register handler which implements every capability.
    pub fn add_full_handler<H>(&self, handler: Arc<H>)
    where
        H: HandlerAll + 'static,
    {
        self.dispatcher.add_handler(Arc::new(FullHandler(handler)));
    }

    /// Start receiving events through `transport`.
    ///
    /// Registers the authentication extension with the transport, then spawns
    /// the transport listen loop and the event dispatch loop. Returns
    /// immediately.
    ///
    /// # Errors
    /// Returns [`GroupMeError::AlreadyListening`] if called more than once or
    /// after [`stop`].
    ///
    /// [`stop`]: PushSubscriptionRef::stop
    pub fn start_listening<T>(&self, transport: T) -> Result<(), GroupMeError>
    where
        T: PushTransport + 'static,
    {
        if self.started.swap(true, Ordering::AcqRel) || self.receiver.is_closed() {
            return Err(GroupMeError::AlreadyListening);
        }

        let transport: Arc<dyn PushTransport> = Arc::new(transport);
        transport.add_extension(Arc::new(AuthExtension::new(
            self.token.clone(),
            self.dispatcher.clone(),
        )));
        *self.transport.write() = Some(transport.clone());

        self.runtime.spawn(async move {
            transport.listen().await;
            debug!("Push transport stopped listening");
        });
        self.runtime.spawn(dispatch_loop(
            self.receiver.clone(),
            self.dispatcher.clone(),
            self.last_connected.clone(),
        ));

        info!("Push subscription started listening");
        Ok(())
    }

    /// Subscribe to events of the user with identifier `user_id`.
    ///
    /// `auth_token` replaces the token used for every following subscribe
    /// request.
    ///
    /// # Errors
    /// Returns [`GroupMeError::ListenerNotStarted`] if called before
    /// [`start_listening`], or the transport error.
    ///
    /// [`start_listening`]: PushSubscriptionRef::start_listening
    pub async fn subscribe_to_user(&self, user_id: &ID, auth_token: &str) -> Result<(), GroupMeError> {
        self.subscribe(format!("{USER_CHANNEL}{user_id}"), auth_token)
            .await
    }

    /// Subscribe to events of the group with identifier `group_id`.
    ///
    /// # Errors
    /// Same as [`subscribe_to_user`].
    ///
    /// [`subscribe_to_user`]: PushSubscriptionRef::subscribe_to_user
    pub async fn subscribe_to_group(
        &self,
        group_id: &ID,
        auth_token: &str,
    ) -> Result<(), GroupMeError> {
        self.subscribe(format!("{GROUP_CHANNEL}{group_id}"), auth_token)
            .await
    }

    /// Subscribe to events of the direct conversation `conversation_id`.
    ///
    /// Conversation identifiers join both participants with `+`, channel
    /// names use `_` instead (first occurrence only).
    ///
    /// # Errors
    /// Same as [`subscribe_to_user`].
    ///
    /// [`subscribe_to_user`]: PushSubscriptionRef::subscribe_to_user
    pub async fn subscribe_to_dm(
        &self,
        conversation_id: &ID,
        auth_token: &str,
    ) -> Result<(), GroupMeError> {
        let channel = format!(
            "{DM_CHANNEL}{}",
            conversation_id.as_str().replacen('+', "_", 1)
        );
        self.subscribe(channel, auth_token).await
    }

    async fn subscribe(&self, channel: String, auth_token: &str) -> Result<(), GroupMeError> {
        let _guard = self.subscribe_lock.lock().await;

        let transport = self.transport.read().clone();
        let Some(transport) = transport else {
            return Err(GroupMeError::ListenerNotStarted);
        };

        *self.token.write() = auth_token.into();

        debug!("Subscribing to {channel}");
        transport
            .wait_subscribe(&channel, self.sender.clone())
            .await?;
        info!("Subscribed to {channel}");

        Ok(())
    }

    /// Whether a message has been received within the liveness window.
    ///
    /// Times are compared in whole seconds and the window end is inclusive.
    ///
    /// Keep-alive `ping` events refresh it as well.
    pub fn connected(&self) -> bool {
        let last = self.last_connected.load(Ordering::Acquire);
        if last <= 0 {
            return false;
        }

        let window = i64::try_from(self.config.liveness_window.as_secs()).unwrap_or(i64::MAX);
        OffsetDateTime::now_utc().unix_timestamp() - last <= window
    }

    /// Time of the last received message, zero if nothing has been received.
    pub fn last_connected(&self) -> Timestamp {
        Timestamp(u64::try_from(self.last_connected.load(Ordering::Acquire)).unwrap_or_default())
    }

    /// Stop listening.
    ///
    /// Closes the inbound channel (already received messages are still
    /// dispatched) and disconnects the transport. Stopped subscription can't
    /// be started again.
    ///
    /// Waits for an in-flight `subscribe_to_*` call to finish first. A
    /// transport that never acknowledges that subscription keeps `stop`
    /// waiting as well.
    pub async fn stop(&self) {
        let _guard = self.subscribe_lock.lock().await;

        self.receiver.close();
        let transport = self.transport.write().take();
        if let Some(transport) = transport {
            transport.disconnect().await;
        }

        info!("Push subscription stopped");
    }

    /// Push subscription configuration.
    pub fn config(&self) -> &PushConfig {
        &self.config
    }
}

impl<R> Debug for PushSubscriptionRef<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushSubscriptionRef")
            .field("config", &self.config)
            .field("listening", &self.transport.read().is_some())
            .field("dispatcher", &self.dispatcher)
            .field("last_connected", &self.last_connected.load(Ordering::Acquire))
            .finish()
    }
}

async fn dispatch_loop(
    receiver: PushReceiver,
    dispatcher: Arc<EventDispatcher>,
    last_connected: Arc<AtomicI64>,
) {
    while let Ok(message) = receiver.recv().await {
        last_connected.store(OffsetDateTime::now_utc().unix_timestamp(), Ordering::Release);
        dispatch_message(&dispatcher, &message);
    }

    debug!("Push dispatch loop finished");
}

/// Deliver single received message to the handlers.
pub(crate) fn dispatch_message(dispatcher: &EventDispatcher, message: &PushMessage) {
    let data = message.data();
    let event_type = data.get("type").and_then(Value::as_str).unwrap_or_default();
    let subject = data.get("subject").unwrap_or(&Value::Null);

    match event_handler(event_type) {
        Some(handler) => handler(dispatcher, message.channel(), subject),
        None if event_type.is_empty() || event_type == "ping" || subject.is_null() => {}
        None => warn!(
            "Unable to handle push event of type '{event_type}' on {}",
            message.channel()
        ),
    }
}
