//! # Push event handlers
//!
//! Callback interfaces implemented by push subscription users.
//!
//! Every handler implements [`Handler`], which only requires error
//! reporting. Additional event classes are opted into by implementing the
//! narrow capability traits and exposing them through the matching `as_*`
//! accessor of [`Handler`]:
//!
//! ```
//! use groupme::{
//!     core::GroupMeError,
//!     dx::{
//!         data_types::Message,
//!         realtime::{Handler, HandlerText},
//!     },
//! };
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
//! ```
//!
//! All callbacks are invoked on the dispatch task, one after another, in
//! registration order. A callback which blocks stalls delivery of every
//! following event.

use crate::{
    core::{GroupMeError, ID},
    dx::data_types::{Member, Message},
};
use std::{fmt::Debug, sync::Arc};

/// Base handler interface.
pub trait Handler: Send + Sync {
    /// Called for decode failures and errors reported by the push service.
    fn handle_error(&self, error: &GroupMeError);

    /// Text messages capability.
    fn as_text(&self) -> Option<&dyn HandlerText> {
        None
    }

    /// Likes capability.
    fn as_like(&self) -> Option<&dyn HandlerLike> {
        None
    }

    /// Group join capability.
    fn as_membership(&self) -> Option<&dyn HandlerMembership> {
        None
    }

    /// Group metadata changes capability.
    fn as_group_metadata(&self) -> Option<&dyn HandlerGroupMetadata> {
        None
    }

    /// Per-member changes capability.
    fn as_group_membership(&self) -> Option<&dyn HandlerGroupMembership> {
        None
    }

    /// Members roster changes capability.
    fn as_members(&self) -> Option<&dyn HandlerMembers> {
        None
    }
}

/// New messages in groups and direct conversations.
pub trait HandlerText: Send + Sync {
    /// Message posted by a user or a bot.
    fn handle_text_message(&self, message: &Message);
}

/// Likes on messages.
pub trait HandlerLike: Send + Sync {
    /// Liked message, with the current list of users who liked it.
    fn handle_like(&self, message: &Message);
}

/// Membership of the subscribed user.
pub trait HandlerMembership: Send + Sync {
    /// Subscribed user joined the group with identifier `id`.
    fn handle_join(&self, id: &ID);
}

/// Group-wide settings changes.
pub trait HandlerGroupMetadata: Send + Sync {
    /// New group topic.
    fn handle_group_topic(&self, group: &ID, topic: &str);

    /// New group name.
    fn handle_group_name(&self, group: &ID, name: &str);

    /// New group avatar URL.
    fn handle_group_avatar(&self, group: &ID, avatar_url: &str);

    /// New like icon.
    ///
    /// Removal of the custom icon is reported as `(0, 0, "")`.
    fn handle_like_icon(&self, group: &ID, pack_id: i64, pack_index: i64, icon_type: &str);
}

/// Changes of a single member's profile within a group.
pub trait HandlerGroupMembership: Send + Sync {
    /// Member `user` changed nickname.
    fn handle_new_nickname(&self, group: &ID, user: &ID, nickname: &str);

    /// Member `user` changed avatar, empty URL means the default avatar.
    fn handle_new_avatar_in_group(&self, group: &ID, user: &ID, avatar_url: &str);
}

/// Members added to or removed from a group.
pub trait HandlerMembers: Send + Sync {
    /// Roster change; `added` is `false` for removals.
    fn handle_members(&self, group: &ID, members: &[Member], added: bool);
}

/// Handler implementing every capability.
///
/// Blanket-implemented, use with [`PushSubscription::add_full_handler`] to
/// get compile-time assurance that no event class is missed.
///
/// [`PushSubscription::add_full_handler`]: super::PushSubscription::add_full_handler
pub trait HandlerAll:
    Handler
    + HandlerText
    + HandlerLike
    + HandlerMembership
    + HandlerGroupMetadata
    + HandlerGroupMembership
    + HandlerMembers
{
}

impl<T> HandlerAll for T where
    T: Handler
        + HandlerText
        + HandlerLike
        + HandlerMembership
        + HandlerGroupMetadata
        + HandlerGroupMembership
        + HandlerMembers
{
}

/// Adapter exposing every capability of a [`HandlerAll`].
pub(crate) struct FullHandler<H>(pub(crate) Arc<H>);

impl<H> Debug for FullHandler<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FullHandler").finish()
    }
}

impl<H> Handler for FullHandler<H>
where
    H: HandlerAll + 'static,
{
    fn handle_error(&self, error: &GroupMeError) {
        self.0.handle_error(error)
    }

    fn as_text(&self) -> Option<&dyn HandlerText> {
        Some(self.0.as_ref())
    }

    fn as_like(&self) -> Option<&dyn HandlerLike> {
        Some(self.0.as_ref())
    }

    fn as_membership(&self) -> Option<&dyn HandlerMembership> {
        Some(self.0.as_ref())
    }

    fn as_group_metadata(&self) -> Option<&dyn HandlerGroupMetadata> {
        Some(self.0.as_ref())
    }

    fn as_group_membership(&self) -> Option<&dyn HandlerGroupMembership> {
        Some(self.0.as_ref())
    }

    fn as_members(&self) -> Option<&dyn HandlerMembers> {
        Some(self.0.as_ref())
    }
}
