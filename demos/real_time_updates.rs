use groupme::{
    core::{push::PushSender, Extension, GroupMeError, PushMessage, PushTransport, ID},
    dx::{
        data_types::{Member, Message},
        realtime::{
            Handler, HandlerGroupMembership, HandlerGroupMetadata, HandlerLike, HandlerMembers,
            HandlerMembership, HandlerText,
        },
    },
    GroupMeClientBuilder, GroupsQuery, PushSubscription, RuntimeTokio,
};
use serde_json::{json, Value};
use spin::Mutex;
use std::{env, sync::Arc, time::Duration};

/// Prints every event it receives.
struct Printer;

impl Handler for Printer {
    fn handle_error(&self, error: &GroupMeError) {
        eprintln!("error: {error}");
    }
}

impl HandlerText for Printer {
    fn handle_text_message(&self, message: &Message) {
        println!("[{}] {}: {}", message.group_id, message.name, message.text);
    }
}

impl HandlerLike for Printer {
    fn handle_like(&self, message: &Message) {
        println!("message {} liked by {:?}", message.id, message.favorited_by);
    }
}

impl HandlerMembership for Printer {
    fn handle_join(&self, id: &ID) {
        println!("joined group {id}");
    }
}

impl HandlerGroupMetadata for Printer {
    fn handle_group_topic(&self, group: &ID, topic: &str) {
        println!("[{group}] topic: {topic}");
    }

    fn handle_group_name(&self, group: &ID, name: &str) {
        println!("[{group}] name: {name}");
    }

    fn handle_group_avatar(&self, group: &ID, avatar_url: &str) {
        println!("[{group}] avatar: {avatar_url}");
    }

    fn handle_like_icon(&self, group: &ID, pack_id: i64, pack_index: i64, icon_type: &str) {
        println!("[{group}] like icon: {pack_id}/{pack_index} {icon_type}");
    }
}

impl HandlerGroupMembership for Printer {
    fn handle_new_nickname(&self, group: &ID, user: &ID, nickname: &str) {
        println!("[{group}] {user} is now {nickname}");
    }

    fn handle_new_avatar_in_group(&self, group: &ID, user: &ID, avatar_url: &str) {
        println!("[{group}] {user} avatar: {avatar_url}");
    }
}

impl HandlerMembers for Printer {
    fn handle_members(&self, group: &ID, members: &[Member], added: bool) {
        let nicknames = members
            .iter()
            .map(|member| member.nickname.as_str())
            .collect::<Vec<_>>();
        let verb = if added { "added" } else { "removed" };
        println!("[{group}] {verb}: {}", nicknames.join(", "));
    }
}

/// Stand-in for a push protocol client.
///
/// Acknowledges every subscription and replays a short scripted session on
/// the subscribed group channels. Replace with a client speaking the push
/// service protocol to receive live events.
#[derive(Default)]
struct ReplayTransport {
    extensions: Mutex<Vec<Arc<dyn Extension>>>,
    groups: Mutex<Vec<(String, PushSender)>>,
}

impl ReplayTransport {
    fn event(channel: &str, event_type: &str, subject: Value) -> PushMessage {
        let Value::Object(data) = json!({"type": event_type, "subject": subject}) else {
            return PushMessage::new(channel, Default::default());
        };
        PushMessage::new(channel, data)
    }
}

#[async_trait::async_trait]
impl PushTransport for ReplayTransport {
    fn add_extension(&self, extension: Arc<dyn Extension>) {
        self.extensions.lock().push(extension);
    }

    async fn listen(&self) {
        tokio::time::sleep(Duration::from_millis(200)).await;

        let groups = self.groups.lock().clone();
        for (channel, destination) in groups {
            let group_id = channel.trim_start_matches("/group/");
            let script = [
                Self::event(
                    &channel,
                    "line.create",
                    json!({"id": "1", "group_id": group_id, "user_id": "2", "name": "Ann", "text": "Hi all!"}),
                ),
                Self::event(
                    &channel,
                    "favorite",
                    json!({"line": {"id": "1", "group_id": group_id, "favorited_by": ["3"]}}),
                ),
                Self::event(
                    &channel,
                    "line.create",
                    json!({
                        "id": "2",
                        "group_id": group_id,
                        "user_id": "system",
                        "system": true,
                        "event": {"type": "group.topic_change", "data": {"topic": "Weekend plans"}}
                    }),
                ),
            ];

            for message in script {
                let extensions = self.extensions.lock().clone();
                extensions
                    .iter()
                    .for_each(|extension| extension.incoming(&message));
                if destination.send(message).await.is_err() {
                    return;
                }
            }
        }
    }

    async fn wait_subscribe(
        &self,
        channel: &str,
        destination: PushSender,
    ) -> Result<(), GroupMeError> {
        let mut request = PushMessage {
            channel: groupme::core::push::SUBSCRIBE_CHANNEL.into(),
            subscription: Some(channel.into()),
            ..Default::default()
        };
        let extensions = self.extensions.lock().clone();
        extensions
            .iter()
            .for_each(|extension| extension.outgoing(&mut request));

        if channel.starts_with(groupme::core::push::GROUP_CHANNEL) {
            self.groups.lock().push((channel.into(), destination));
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Find your token by logging into https://dev.groupme.com/
    let token = env::var("GROUPME_TOKEN").unwrap_or_else(|_| "0123456789ABCDEF".into());

    let client = GroupMeClientBuilder::with_reqwest_transport()
        .with_auth_token(token)
        .build()?;

    let me = client.my_user().await?;
    println!("Logged in as {} ({})", me.name, me.id);

    let groups = client
        .index_groups(&GroupsQuery {
            per_page: 5,
            omit: "memberships".into(),
            ..Default::default()
        })
        .await?;

    let push = PushSubscription::new(RuntimeTokio);
    push.add_full_handler(Arc::new(Printer));
    push.start_listening(ReplayTransport::default())?;

    push.subscribe_to_user(&me.id, &client.get_token()).await?;
    for group in &groups {
        push.subscribe_to_group(&group.id, &client.get_token())
            .await?;
        println!("Subscribed to {}", group.name);
    }

    tokio::time::sleep(Duration::from_secs(2)).await;
    println!("Connected: {}", push.connected());

    push.stop().await;
    Ok(())
}
