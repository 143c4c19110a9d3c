//! # Event dispatcher module
//!
//! This module contains the [`EventDispatcher`] type, which is used by
//! [`PushSubscription`] to keep registered handlers and fan decoded events
//! out to them.
//!
//! [`PushSubscription`]: super::PushSubscription

use crate::{core::GroupMeError, dx::realtime::Handler};
use spin::RwLock;
use std::{fmt::Debug, sync::Arc};

pub(crate) struct EventDispatcher {
    /// Registered handlers, in registration order.
    handlers: RwLock<Vec<Arc<dyn Handler>>>,
}

impl EventDispatcher {
    /// Create event dispatcher without handlers.
    pub(crate) fn new() -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
        }
    }

    /// Append handler to the list of event receivers.
    pub(crate) fn add_handler(&self, handler: Arc<dyn Handler>) {
        self.handlers.write().push(handler);
    }

    /// Number of registered handlers.
    pub(crate) fn handlers_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Call `notify` for each registered handler, in registration order.
    ///
    /// Handlers list is copied before delivery, so handlers registered from
    /// within a callback will receive only following events.
    pub(crate) fn for_each_handler<F>(&self, mut notify: F)
    where
        F: FnMut(&dyn Handler),
    {
        let handlers = self.handlers.read().clone();
        handlers.iter().for_each(|handler| notify(handler.as_ref()));
    }

    /// Deliver `error` to every registered handler.
    pub(crate) fn handle_error(&self, error: &GroupMeError) {
        self.for_each_handler(|handler| handler.handle_error(error));
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("handlers", &self.handlers_count())
            .finish()
    }
}

#[cfg(test)]
mod it_should {
    use super::*;
    use spin::Mutex;

    #[derive(Default)]
    struct ErrorRecorder {
        errors: Mutex<Vec<GroupMeError>>,
    }

    impl Handler for ErrorRecorder {
        fn handle_error(&self, error: &GroupMeError) {
            self.errors.lock().push(error.clone());
        }
    }

    #[test]
    fn create_event_dispatcher() {
        let dispatcher = EventDispatcher::new();
        assert_eq!(dispatcher.handlers_count(), 0);
    }

    #[test]
    fn deliver_errors_to_every_handler() {
        let dispatcher = EventDispatcher::new();
        let first = Arc::new(ErrorRecorder::default());
        let second = Arc::new(ErrorRecorder::default());
        dispatcher.add_handler(first.clone());
        dispatcher.add_handler(second.clone());

        dispatcher.handle_error(&GroupMeError::Protocol {
            details: "403::Forbidden".into(),
        });

        assert_eq!(first.errors.lock().len(), 1);
        assert_eq!(second.errors.lock().len(), 1);
    }

    #[test]
    fn visit_handlers_in_registration_order() {
        let dispatcher = EventDispatcher::new();
        let first: Arc<dyn Handler> = Arc::new(ErrorRecorder::default());
        let second: Arc<dyn Handler> = Arc::new(ErrorRecorder::default());
        dispatcher.add_handler(first.clone());
        dispatcher.add_handler(second.clone());

        let mut visited = Vec::new();
        dispatcher.for_each_handler(|handler| visited.push(handler as *const _ as *const ()));

        assert_eq!(
            visited,
            vec![
                Arc::as_ptr(&first) as *const (),
                Arc::as_ptr(&second) as *const ()
            ]
        );
    }
}
