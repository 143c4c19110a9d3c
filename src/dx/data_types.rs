//! # GroupMe data model
//!
//! Types returned by the REST API and carried by push events.
//!
//! Decoding is lenient: unknown fields are ignored, missing fields and JSON
//! `null` fall back to the field's default value.

use crate::core::{types::null_as_default, Timestamp, ID};
use serde::{Deserialize, Serialize};

/// Identifier of the synthetic sender used for administrative events.
pub const SYSTEM_SENDER: &str = "system";

/// GroupMe group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Group {
    pub id: ID,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Type of group (`private` or `public`).
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub image_url: String,
    pub creator_user_id: ID,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: Timestamp,
    #[serde(deserialize_with = "null_as_default")]
    pub updated_at: Timestamp,
    #[serde(deserialize_with = "null_as_default")]
    pub members: Vec<Member>,
    #[serde(deserialize_with = "null_as_default")]
    pub share_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub messages: GroupMessages,
}

impl Group {
    /// Group member with the given user identifier.
    pub fn member_by_user_id(&self, user_id: &ID) -> Option<&Member> {
        self.members.iter().find(|member| member.user_id == *user_id)
    }

    /// Group member with the given nickname.
    pub fn member_by_nickname(&self, nickname: &str) -> Option<&Member> {
        self.members.iter().find(|member| member.nickname == nickname)
    }
}

/// Summary of the group's messages, only returned with [`Group`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupMessages {
    pub count: u64,
    pub last_message_id: ID,
    #[serde(deserialize_with = "null_as_default")]
    pub last_message_created_at: Timestamp,
    #[serde(deserialize_with = "null_as_default")]
    pub preview: MessagePreview,
}

/// Abbreviated form of [`Message`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagePreview {
    #[serde(deserialize_with = "null_as_default")]
    pub nickname: String,
    #[serde(deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(deserialize_with = "null_as_default")]
    pub image_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub attachments: Vec<Attachment>,
}

/// GroupMe group member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Member {
    pub id: ID,
    pub user_id: ID,
    #[serde(deserialize_with = "null_as_default")]
    pub nickname: String,
    #[serde(deserialize_with = "null_as_default")]
    pub muted: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub image_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub autokicked: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub app_installed: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub guid: String,
}

/// GroupMe message, either in a group or in a direct conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    pub id: ID,
    #[serde(deserialize_with = "null_as_default")]
    pub source_guid: String,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: Timestamp,
    pub group_id: ID,
    pub user_id: ID,
    pub bot_id: ID,
    pub sender_id: ID,
    #[serde(deserialize_with = "null_as_default")]
    pub sender_type: SenderType,
    #[serde(deserialize_with = "null_as_default")]
    pub system: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub recipient_id: ID,
    pub conversation_id: ID,
    /// Conversation identifier as reported by direct message push events.
    pub chat_id: ID,
    #[serde(deserialize_with = "null_as_default")]
    pub avatar_url: String,
    /// Maximum length of 1000 characters.
    #[serde(deserialize_with = "null_as_default")]
    pub text: String,
    /// Must be an image service URL (i.groupme.com).
    #[serde(deserialize_with = "null_as_default")]
    pub image_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub favorited_by: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub attachments: Vec<Attachment>,
}

/// Kind of message author.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderType {
    #[default]
    User,
    Bot,
    System,
    /// Sender type introduced after this client has been released.
    #[serde(other)]
    Unknown,
}

/// Kind of message attachment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentType {
    Mentions,
    #[default]
    Image,
    Location,
    Emoji,
    /// Attachment type introduced after this client has been released.
    #[serde(other)]
    Unknown,
}

/// GroupMe message attachment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attachment {
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: AttachmentType,
    #[serde(deserialize_with = "null_as_default")]
    pub loci: Vec<Vec<i64>>,
    #[serde(deserialize_with = "null_as_default")]
    pub user_ids: Vec<ID>,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "lat", deserialize_with = "null_as_default")]
    pub latitude: String,
    #[serde(rename = "lng", deserialize_with = "null_as_default")]
    pub longitude: String,
    #[serde(deserialize_with = "null_as_default")]
    pub placeholder: String,
    #[serde(deserialize_with = "null_as_default")]
    pub charmap: Vec<Vec<i64>>,
}

/// GroupMe user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: ID,
    /// Country code plus the number of the user.
    #[serde(deserialize_with = "null_as_default")]
    pub phone_number: String,
    #[serde(deserialize_with = "null_as_default")]
    pub image_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: Timestamp,
    #[serde(deserialize_with = "null_as_default")]
    pub updated_at: Timestamp,
    #[serde(deserialize_with = "null_as_default")]
    pub avatar_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sms: bool,
}

#[cfg(test)]
mod should {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_message_with_nulls_and_unknown_fields() {
        let message: Message = serde_json::from_value(json!({
            "id": "42",
            "group_id": "55",
            "user_id": "7",
            "sender_type": "user",
            "text": null,
            "avatar_url": null,
            "favorited_by": ["1", "2"],
            "attachments": [{"type": "mentions", "user_ids": ["9"], "loci": [[0, 4]]}],
            "platform": "gm"
        }))
        .unwrap();

        assert_eq!(message.id, "42");
        assert_eq!(message.text, "");
        assert_eq!(message.favorited_by, vec!["1", "2"]);
        assert_eq!(message.attachments[0].kind, AttachmentType::Mentions);
        assert_eq!(message.attachments[0].loci, vec![vec![0, 4]]);
    }

    #[test]
    fn decode_unknown_sender_type() {
        let message: Message =
            serde_json::from_value(json!({"sender_type": "service"})).unwrap();

        assert_eq!(message.sender_type, SenderType::Unknown);
    }

    #[test]
    fn find_group_members() {
        let group: Group = serde_json::from_value(json!({
            "id": "1",
            "members": [
                {"id": "10", "user_id": "100", "nickname": "Ann"},
                {"id": "11", "user_id": "101", "nickname": "Bob"}
            ]
        }))
        .unwrap();

        assert_eq!(
            group.member_by_user_id(&"101".into()).map(|m| m.nickname.as_str()),
            Some("Bob")
        );
        assert_eq!(
            group.member_by_nickname("Ann").map(|m| m.id.clone()),
            Some(ID::from("10"))
        );
        assert!(group.member_by_nickname("Eve").is_none());
    }
}
