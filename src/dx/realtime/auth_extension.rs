//! # Push authentication extension
//!
//! [`Extension`] which signs channel subscription requests with the access
//! token of the [`PushSubscription`] and reports protocol errors to its
//! handlers.
//!
//! [`PushSubscription`]: super::PushSubscription

use crate::{
    core::{push::SUBSCRIBE_CHANNEL, Extension, GroupMeError, PushMessage, Timestamp},
    dx::realtime::event_dispatcher::EventDispatcher,
};
use log::error;
use serde_json::Value;
use spin::RwLock;
use std::sync::Arc;

pub(crate) struct AuthExtension {
    /// Access token used by the most recent subscribe call.
    token: Arc<RwLock<String>>,

    /// Receivers of the protocol errors.
    dispatcher: Arc<EventDispatcher>,
}

impl AuthExtension {
    pub(crate) fn new(token: Arc<RwLock<String>>, dispatcher: Arc<EventDispatcher>) -> Self {
        Self { token, dispatcher }
    }
}

impl Extension for AuthExtension {
    fn incoming(&self, message: &PushMessage) {
        let Some(details) = message.error() else {
            return;
        };

        error!("Push service error on {}: {details}", message.channel());
        self.dispatcher.handle_error(&GroupMeError::Protocol {
            details: format!("{}: {details}", message.channel()),
        });
    }

    fn outgoing(&self, message: &mut PushMessage) {
        if message.channel() != SUBSCRIBE_CHANNEL {
            return;
        }

        let token = self.token.read().clone();
        let ext = message.ext_mut();
        ext.insert("access_token".into(), Value::String(token));
        ext.insert("timestamp".into(), Value::from(Timestamp::now().0));
    }
}
