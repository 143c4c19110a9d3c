//! # Push event dispatch tables
//!
//! Mapping from the event `type` discriminator to the function which decodes
//! the event `subject` and notifies interested handlers.
//!
//! Two tables exist: [`EVENT_HANDLERS`] for events published on user, group
//! and direct message channels, and [`SYSTEM_EVENT_HANDLERS`] for the
//! administrative events wrapped into messages from the
//! [`SYSTEM_SENDER`].
//!
//! [`SYSTEM_SENDER`]: crate::dx::data_types::SYSTEM_SENDER

use crate::{
    core::{GroupMeError, ID},
    dx::{
        data_types::{Member, Message, SYSTEM_SENDER},
        realtime::event_dispatcher::EventDispatcher,
    },
};
use log::{error, warn};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;

/// Top-level event handler.
///
/// Called with the dispatcher, the name of the channel the event has been
/// received on and the event `subject`.
pub(crate) type EventHandlerFn = fn(&EventDispatcher, &str, &Value);

/// System event handler.
///
/// Called with the dispatcher, the group or conversation the event belongs
/// to and the system event `data`.
pub(crate) type SystemEventHandlerFn = fn(&EventDispatcher, &ID, &Value);

/// Handlers of events published on user, group and direct message channels.
pub(crate) const EVENT_HANDLERS: &[(&str, EventHandlerFn)] = &[
    ("direct_message.create", line_create),
    ("line.create", line_create),
    ("like.create", like_create),
    ("membership.create", membership_create),
    ("favorite", favorite),
];

/// Handlers of the administrative events sent by the system sender.
pub(crate) const SYSTEM_EVENT_HANDLERS: &[(&str, SystemEventHandlerFn)] = &[
    ("membership.nickname_changed", nickname_changed),
    ("membership.avatar_changed", member_avatar_changed),
    ("membership.announce.added", members_added),
    ("membership.notifications.removed", member_removed),
    ("membership.name_change", group_name_changed),
    ("group.name_change", group_name_changed),
    ("group.topic_change", group_topic_changed),
    ("group.avatar_change", group_avatar_changed),
    ("group.like_icon_set", like_icon_set),
    ("group.like_icon_removed", like_icon_removed),
];

/// Find handler for top-level event `event_type`.
pub(crate) fn event_handler(event_type: &str) -> Option<EventHandlerFn> {
    EVENT_HANDLERS
        .iter()
        .find_map(|(name, handler)| (*name == event_type).then_some(*handler))
}

/// Find handler for system event `event_type`.
pub(crate) fn system_event_handler(event_type: &str) -> Option<SystemEventHandlerFn> {
    SYSTEM_EVENT_HANDLERS
        .iter()
        .find_map(|(name, handler)| (*name == event_type).then_some(*handler))
}

/// Decode `value` into `T`.
///
/// Failures are logged and reported to every handler, the event is dropped.
fn decode<T>(dispatcher: &EventDispatcher, event: &str, value: &Value) -> Option<T>
where
    T: DeserializeOwned,
{
    match T::deserialize(value) {
        Ok(decoded) => Some(decoded),
        Err(err) => {
            error!("Unable to decode '{event}' event: {err}");
            dispatcher.handle_error(&GroupMeError::Deserialization {
                details: format!("'{event}' event: {err}"),
            });
            None
        }
    }
}

/// Administrative event wrapped into a system message.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SystemMessage {
    event: SystemEvent,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SystemEvent {
    #[serde(rename = "type")]
    kind: String,
    data: Value,
}

fn line_create(dispatcher: &EventDispatcher, channel: &str, subject: &Value) {
    let Some(mut message) = decode::<Message>(dispatcher, "line.create", subject) else {
        return;
    };

    // Direct message events report the conversation as `chat_id`.
    if !message.chat_id.is_empty() {
        message.conversation_id = message.chat_id.clone();
    }

    if message.user_id == SYSTEM_SENDER {
        let Some(system) = decode::<SystemMessage>(dispatcher, "system", subject) else {
            return;
        };

        let Some(handler) = system_event_handler(&system.event.kind) else {
            warn!(
                "Unable to handle system message of type '{}' on {channel}",
                system.event.kind
            );
            return;
        };

        let id = if message.group_id.is_empty() {
            &message.conversation_id
        } else {
            &message.group_id
        };

        handler(dispatcher, id, &system.event.data);
        return;
    }

    dispatcher.for_each_handler(|handler| {
        if let Some(handler) = handler.as_text() {
            handler.handle_text_message(&message);
        }
    });
}

/// Likes are delivered separately as `favorite` events.
fn like_create(_dispatcher: &EventDispatcher, _channel: &str, _subject: &Value) {}

fn membership_create(dispatcher: &EventDispatcher, _channel: &str, subject: &Value) {
    #[derive(Deserialize)]
    struct Membership {
        #[serde(default)]
        id: ID,
    }

    let Some(membership) = decode::<Membership>(dispatcher, "membership.create", subject) else {
        return;
    };

    dispatcher.for_each_handler(|handler| {
        if let Some(handler) = handler.as_membership() {
            handler.handle_join(&membership.id);
        }
    });
}

fn favorite(dispatcher: &EventDispatcher, _channel: &str, subject: &Value) {
    #[derive(Deserialize)]
    struct Favorite {
        line: Message,
    }

    let Some(Favorite { line }) = decode::<Favorite>(dispatcher, "favorite", subject) else {
        return;
    };

    dispatcher.for_each_handler(|handler| {
        if let Some(handler) = handler.as_like() {
            handler.handle_like(&line);
        }
    });
}

/// Member referenced by a system event.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EventUser {
    id: ID,
}

fn nickname_changed(dispatcher: &EventDispatcher, group: &ID, data: &Value) {
    #[derive(Default, Deserialize)]
    #[serde(default)]
    struct NicknameChanged {
        name: String,
        user: EventUser,
    }

    let Some(event) = decode::<NicknameChanged>(dispatcher, "membership.nickname_changed", data)
    else {
        return;
    };

    dispatcher.for_each_handler(|handler| {
        if let Some(handler) = handler.as_group_membership() {
            handler.handle_new_nickname(group, &event.user.id, &event.name);
        }
    });
}

fn member_avatar_changed(dispatcher: &EventDispatcher, group: &ID, data: &Value) {
    #[derive(Default, Deserialize)]
    #[serde(default)]
    struct AvatarChanged {
        avatar_url: String,
        user: EventUser,
    }

    let Some(event) = decode::<AvatarChanged>(dispatcher, "membership.avatar_changed", data)
    else {
        return;
    };

    dispatcher.for_each_handler(|handler| {
        if let Some(handler) = handler.as_group_membership() {
            handler.handle_new_avatar_in_group(group, &event.user.id, &event.avatar_url);
        }
    });
}

fn members_added(dispatcher: &EventDispatcher, group: &ID, data: &Value) {
    #[derive(Default, Deserialize)]
    #[serde(default)]
    struct MembersAdded {
        added_users: Vec<Member>,
    }

    let Some(event) = decode::<MembersAdded>(dispatcher, "membership.announce.added", data) else {
        return;
    };

    notify_members(dispatcher, group, &event.added_users, true);
}

fn member_removed(dispatcher: &EventDispatcher, group: &ID, data: &Value) {
    #[derive(Default, Deserialize)]
    #[serde(default)]
    struct MemberRemoved {
        removed_user: Member,
    }

    let Some(event) = decode::<MemberRemoved>(dispatcher, "membership.notifications.removed", data)
    else {
        return;
    };

    notify_members(dispatcher, group, &[event.removed_user], false);
}

fn notify_members(dispatcher: &EventDispatcher, group: &ID, members: &[Member], added: bool) {
    dispatcher.for_each_handler(|handler| {
        if let Some(handler) = handler.as_members() {
            handler.handle_members(group, members, added);
        }
    });
}

fn group_name_changed(dispatcher: &EventDispatcher, group: &ID, data: &Value) {
    #[derive(Default, Deserialize)]
    #[serde(default)]
    struct NameChanged {
        name: String,
    }

    let Some(event) = decode::<NameChanged>(dispatcher, "group.name_change", data) else {
        return;
    };

    dispatcher.for_each_handler(|handler| {
        if let Some(handler) = handler.as_group_metadata() {
            handler.handle_group_name(group, &event.name);
        }
    });
}

fn group_topic_changed(dispatcher: &EventDispatcher, group: &ID, data: &Value) {
    #[derive(Default, Deserialize)]
    #[serde(default)]
    struct TopicChanged {
        topic: String,
    }

    let Some(event) = decode::<TopicChanged>(dispatcher, "group.topic_change", data) else {
        return;
    };

    dispatcher.for_each_handler(|handler| {
        if let Some(handler) = handler.as_group_metadata() {
            handler.handle_group_topic(group, &event.topic);
        }
    });
}

fn group_avatar_changed(dispatcher: &EventDispatcher, group: &ID, data: &Value) {
    #[derive(Default, Deserialize)]
    #[serde(default)]
    struct AvatarChanged {
        avatar_url: String,
    }

    let Some(event) = decode::<AvatarChanged>(dispatcher, "group.avatar_change", data) else {
        return;
    };

    dispatcher.for_each_handler(|handler| {
        if let Some(handler) = handler.as_group_metadata() {
            handler.handle_group_avatar(group, &event.avatar_url);
        }
    });
}

fn like_icon_set(dispatcher: &EventDispatcher, group: &ID, data: &Value) {
    #[derive(Default, Deserialize)]
    #[serde(default)]
    struct LikeIcon {
        pack_id: i64,
        pack_index: i64,
        #[serde(rename = "type")]
        kind: String,
    }

    #[derive(Default, Deserialize)]
    #[serde(default)]
    struct LikeIconSet {
        like_icon: LikeIcon,
    }

    let Some(event) = decode::<LikeIconSet>(dispatcher, "group.like_icon_set", data) else {
        return;
    };

    let icon = event.like_icon;
    notify_like_icon(dispatcher, group, icon.pack_id, icon.pack_index, &icon.kind);
}

/// Removal is reported as the default icon `(0, 0, "")`.
fn like_icon_removed(dispatcher: &EventDispatcher, group: &ID, _data: &Value) {
    notify_like_icon(dispatcher, group, 0, 0, "");
}

fn notify_like_icon(
    dispatcher: &EventDispatcher,
    group: &ID,
    pack_id: i64,
    pack_index: i64,
    icon_type: &str,
) {
    dispatcher.for_each_handler(|handler| {
        if let Some(handler) = handler.as_group_metadata() {
            handler.handle_like_icon(group, pack_id, pack_index, icon_type);
        }
    });
}
