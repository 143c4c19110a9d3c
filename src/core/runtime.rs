//! # Runtime module
//!
//! This module contains the task spawning trait used by the push
//! subscription.
//!
//! The [`Runtime`] trait is used to spawn the long-running transport listen
//! loop and the event dispatch loop.

use std::future::Future;

/// GroupMe runtime trait.
///
/// This trait is used to spawn async tasks in work of the push subscription.
/// Both loops started by [`PushSubscription::start_listening`] are spawned
/// through it.
///
/// # Examples
/// ```
/// use groupme::core::Runtime;
/// use std::future::Future;
///
/// #[derive(Clone)]
/// struct MyRuntime;
///
/// impl Runtime for MyRuntime {
///    fn spawn<R>(&self, future: impl Future<Output = R> + Send + 'static)
///    where
///        R: Send + 'static,
///    {
///       // spawn the Future
///       // e.g. tokio::spawn(future);
///    }
/// }
/// ```
///
/// [`PushSubscription::start_listening`]: crate::dx::realtime::PushSubscription::start_listening
pub trait Runtime: Clone + Send + Sync {
    /// Spawn a task.
    ///
    /// This method is used to spawn a task.
    fn spawn<R>(&self, future: impl Future<Output = R> + Send + 'static)
    where
        R: Send + 'static;
}
