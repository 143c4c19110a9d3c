//! # GroupMe Rust client
//!
//! Client for the [GroupMe API] with real-time push event subscriptions.
//!
//! The REST part maps typed requests onto the GroupMe v3 API, the
//! [`realtime`] part keeps a publish/subscribe session with the GroupMe push
//! service and delivers new messages, likes, membership and group changes
//! to registered handlers.
//!
//! ## Getting started
//!
//! Below you can find an example that fetches the current user and
//! subscribes to its push channel. The push protocol session is provided by
//! the caller as a [`PushTransport`] implementation.
//!
//! ```no_run
//! use groupme::{
//!     core::{GroupMeError, PushTransport},
//!     dx::{
//!         data_types::Message,
//!         realtime::{Handler, HandlerText},
//!     },
//!     GroupMeClientBuilder, PushSubscription, RuntimeTokio,
//! };
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl Handler for Printer {
//!     fn handle_error(&self, error: &GroupMeError) {
//!         eprintln!("{error}");
//!     }
//!
//!     fn as_text(&self) -> Option<&dyn HandlerText> {
//!         Some(self)
//!     }
//! }
//!
//! impl HandlerText for Printer {
//!     fn handle_text_message(&self, message: &Message) {
//!         println!("{}: {}", message.name, message.text);
//!     }
//! }
//!
//! # async fn run(transport: impl PushTransport + 'static) -> Result<(), Box<dyn std::error::Error>> {
//! let client = GroupMeClientBuilder::with_reqwest_transport()
//!     .with_auth_token("access-token")
//!     .build()?;
//! let me = client.my_user().await?;
//!
//! let push = PushSubscription::new(RuntimeTokio);
//! push.add_handler(Arc::new(Printer));
//! push.start_listening(transport)?;
//! push.subscribe_to_user(&me.id, &client.get_token()).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! * `reqwest` - enables [`TransportReqwest`], the default REST transport
//! * `tokio` - enables [`RuntimeTokio`], the default task spawner for the
//!   push subscription
//!
//! Both are enabled by default.
//!
//! [GroupMe API]: https://dev.groupme.com/docs/v3
//! [`realtime`]: dx::realtime
//! [`PushTransport`]: core::PushTransport
//! [`TransportReqwest`]: transport::TransportReqwest
//! [`RuntimeTokio`]: providers::futures_tokio::RuntimeTokio

#[doc(inline)]
pub use dx::{
    GroupMeClientBuilder, GroupMeGenericClient, GroupsQuery, PushConfig, PushConfigBuilder,
    PushSubscription,
};

#[cfg(feature = "reqwest")]
#[doc(inline)]
pub use dx::GroupMeClient;

#[cfg(feature = "tokio")]
#[doc(inline)]
pub use providers::futures_tokio::RuntimeTokio;

pub mod core;
pub mod dx;
pub mod providers;
pub mod transport;
