use groupme::{
    core::{
        push::{PushSender, SUBSCRIBE_CHANNEL},
        Extension, GroupMeError, PushMessage, PushTransport, ID,
    },
    dx::{
        data_types::{Member, Message},
        realtime::{
            Handler, HandlerGroupMembership, HandlerGroupMetadata, HandlerLike, HandlerMembers,
            HandlerMembership, HandlerText,
        },
    },
    PushSubscription, RuntimeTokio,
};
use serde_json::{json, Value};
use spin::Mutex;
use std::{sync::Arc, time::Duration};

/// In-memory push service.
///
/// Signs subscribe requests through the registered extensions and lets the
/// test publish events on subscribed channels.
#[derive(Default)]
struct MockPushTransport {
    extensions: Mutex<Vec<Arc<dyn Extension>>>,
    subscriptions: Mutex<Vec<(String, PushSender)>>,
    subscribe_requests: Mutex<Vec<PushMessage>>,
    reject_with: Mutex<Option<String>>,
}

impl MockPushTransport {
    async fn publish(&self, channel: &str, event_type: &str, subject: Value) {
        let Value::Object(data) = json!({"type": event_type, "subject": subject}) else {
            unreachable!()
        };
        let message = PushMessage::new(channel, data);
        let extensions = self.extensions.lock().clone();
        extensions
            .iter()
            .for_each(|extension| extension.incoming(&message));

        let destination = self
            .subscriptions
            .lock()
            .iter()
            .find(|(name, _)| name == channel)
            .map(|(_, sender)| sender.clone())
            .expect("channel should be subscribed");
        destination.send(message).await.unwrap();
    }
}

#[async_trait::async_trait]
impl PushTransport for MockPushTransport {
    fn add_extension(&self, extension: Arc<dyn Extension>) {
        self.extensions.lock().push(extension);
    }

    async fn listen(&self) {
        futures::future::pending::<()>().await
    }

    async fn wait_subscribe(
        &self,
        channel: &str,
        destination: PushSender,
    ) -> Result<(), GroupMeError> {
        // Handshake round trips let other subscribe calls run in between.
        tokio::task::yield_now().await;

        let mut request = PushMessage {
            channel: SUBSCRIBE_CHANNEL.into(),
            subscription: Some(channel.into()),
            ..Default::default()
        };
        let extensions = self.extensions.lock().clone();
        extensions
            .iter()
            .for_each(|extension| extension.outgoing(&mut request));
        self.subscribe_requests.lock().push(request);
        tokio::task::yield_now().await;

        let rejection = self.reject_with.lock().clone();
        if let Some(error) = rejection {
            let reply = PushMessage {
                channel: SUBSCRIBE_CHANNEL.into(),
                error: Some(error.clone()),
                successful: Some(false),
                ..Default::default()
            };
            extensions
                .iter()
                .for_each(|extension| extension.incoming(&reply));
            return Err(GroupMeError::Transport { details: error });
        }

        self.subscriptions
            .lock()
            .push((channel.to_string(), destination));
        Ok(())
    }
}

/// Implements every capability and records calls in order.
#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<String>>,
}

impl Recorder {
    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    async fn wait_for_calls(&self, count: usize) -> Vec<String> {
        for _ in 0..200 {
            if self.calls.lock().len() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        self.calls()
    }
}

impl Handler for Recorder {
    fn handle_error(&self, error: &GroupMeError) {
        self.record(format!("error: {error}"));
    }
}

impl HandlerText for Recorder {
    fn handle_text_message(&self, message: &Message) {
        self.record(format!("text: {}", message.text));
    }
}

impl HandlerLike for Recorder {
    fn handle_like(&self, message: &Message) {
        self.record(format!("like: {} {:?}", message.id, message.favorited_by));
    }
}

impl HandlerMembership for Recorder {
    fn handle_join(&self, id: &ID) {
        self.record(format!("join: {id}"));
    }
}

impl HandlerGroupMetadata for Recorder {
    fn handle_group_topic(&self, group: &ID, topic: &str) {
        self.record(format!("topic: {group} {topic}"));
    }

    fn handle_group_name(&self, group: &ID, name: &str) {
        self.record(format!("name: {group} {name}"));
    }

    fn handle_group_avatar(&self, group: &ID, avatar_url: &str) {
        self.record(format!("avatar: {group} {avatar_url}"));
    }

    fn handle_like_icon(&self, group: &ID, pack_id: i64, pack_index: i64, icon_type: &str) {
        self.record(format!("like icon: {group} {pack_id} {pack_index} {icon_type}"));
    }
}

impl HandlerGroupMembership for Recorder {
    fn handle_new_nickname(&self, group: &ID, user: &ID, nickname: &str) {
        self.record(format!("nickname: {group} {user} {nickname}"));
    }

    fn handle_new_avatar_in_group(&self, group: &ID, user: &ID, avatar_url: &str) {
        self.record(format!("member avatar: {group} {user} {avatar_url}"));
    }
}

impl HandlerMembers for Recorder {
    fn handle_members(&self, group: &ID, members: &[Member], added: bool) {
        let nicknames = members
            .iter()
            .map(|member| member.nickname.as_str())
            .collect::<Vec<_>>();
        self.record(format!("members: {group} {nicknames:?} {added}"));
    }
}

/// Exposes only the text capability.
struct TextOnly(Arc<Recorder>);

impl Handler for TextOnly {
    fn handle_error(&self, error: &GroupMeError) {
        self.0.handle_error(error);
    }

    fn as_text(&self) -> Option<&dyn HandlerText> {
        Some(self.0.as_ref())
    }
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

async fn listening() -> (PushSubscription<RuntimeTokio>, Arc<MockPushTransport>, Arc<Recorder>) {
    init_logger();

    let push = PushSubscription::new(RuntimeTokio);
    let recorder = Arc::new(Recorder::default());
    push.add_full_handler(recorder.clone());

    let transport = Arc::new(MockPushTransport::default());
    push.start_listening(transport.clone()).unwrap();

    (push, transport, recorder)
}

#[tokio::test]
async fn deliver_events_from_subscribed_channels() {
    let (push, transport, recorder) = listening().await;

    push.subscribe_to_user(&"7".into(), "user-token").await.unwrap();
    push.subscribe_to_group(&"55".into(), "user-token").await.unwrap();

    transport
        .publish("/user/7", "membership.create", json!({"id": "55"}))
        .await;
    transport
        .publish(
            "/group/55",
            "line.create",
            json!({"id": "1", "group_id": "55", "user_id": "8", "text": "hello"}),
        )
        .await;
    transport
        .publish(
            "/group/55",
            "favorite",
            json!({"line": {"id": "42", "favorited_by": ["1", "2"]}}),
        )
        .await;
    transport.publish("/user/7", "ping", Value::Null).await;

    assert_eq!(
        recorder.wait_for_calls(3).await,
        vec![
            "join: 55".to_string(),
            "text: hello".to_string(),
            "like: 42 [\"1\", \"2\"]".to_string(),
        ]
    );
    assert!(push.connected());
    assert!(push.last_connected().0 > 0);
}

#[tokio::test]
async fn deliver_system_events_to_group_handlers() {
    let (push, transport, recorder) = listening().await;
    push.subscribe_to_group(&"55".into(), "token").await.unwrap();

    let system = |event: Value| {
        json!({
            "id": "2",
            "group_id": "55",
            "user_id": "system",
            "sender_id": "system",
            "system": true,
            "text": "Ann changed the topic",
            "event": event
        })
    };

    transport
        .publish(
            "/group/55",
            "line.create",
            system(json!({"type": "group.topic_change", "data": {"topic": "Books"}})),
        )
        .await;
    transport
        .publish(
            "/group/55",
            "line.create",
            system(json!({
                "type": "membership.announce.added",
                "data": {"added_users": [{"id": "7", "nickname": "Ann"}]}
            })),
        )
        .await;
    transport
        .publish(
            "/group/55",
            "line.create",
            system(json!({"type": "group.like_icon_removed", "data": {}})),
        )
        .await;

    assert_eq!(
        recorder.wait_for_calls(3).await,
        vec![
            "topic: 55 Books".to_string(),
            "members: 55 [\"Ann\"] true".to_string(),
            "like icon: 55 0 0 ".to_string(),
        ]
    );
}

#[tokio::test]
async fn survive_unknown_and_malformed_events() {
    let (push, transport, recorder) = listening().await;
    push.subscribe_to_group(&"55".into(), "token").await.unwrap();

    transport
        .publish("/group/55", "bogus.new.feature", json!({"id": "1"}))
        .await;
    transport
        .publish("/group/55", "favorite", json!({"line": "not a message"}))
        .await;
    transport
        .publish("/group/55", "line.create", json!({"text": "still alive"}))
        .await;

    let calls = recorder.wait_for_calls(2).await;
    assert_eq!(calls.len(), 2);
    assert!(calls[0].starts_with("error: Deserialization error"));
    assert_eq!(calls[1], "text: still alive");
}

#[tokio::test]
async fn fan_out_by_capability() {
    init_logger();
    let push = PushSubscription::new(RuntimeTokio);
    let full = Arc::new(Recorder::default());
    let text_only = Arc::new(Recorder::default());
    push.add_handler(Arc::new(TextOnly(text_only.clone())));
    push.add_full_handler(full.clone());
    let transport = Arc::new(MockPushTransport::default());
    push.start_listening(transport.clone()).unwrap();
    push.subscribe_to_dm(&"7+8".into(), "token").await.unwrap();

    transport
        .publish(
            "/direct_message/7_8",
            "favorite",
            json!({"line": {"id": "42"}}),
        )
        .await;
    transport
        .publish(
            "/direct_message/7_8",
            "direct_message.create",
            json!({"id": "43", "chat_id": "7+8", "user_id": "8", "text": "hi"}),
        )
        .await;

    assert_eq!(
        full.wait_for_calls(2).await,
        vec!["like: 42 []".to_string(), "text: hi".to_string()]
    );
    assert_eq!(text_only.calls(), vec!["text: hi".to_string()]);
}

#[tokio::test]
async fn sign_subscribe_requests_with_latest_token() {
    let (push, transport, _) = listening().await;

    push.subscribe_to_user(&"7".into(), "first").await.unwrap();
    push.subscribe_to_dm(&"7+8".into(), "second").await.unwrap();

    let requests = transport.subscribe_requests.lock().clone();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].subscription.as_deref(), Some("/user/7"));
    assert_eq!(requests[0].ext["access_token"], json!("first"));
    assert_eq!(
        requests[1].subscription.as_deref(),
        Some("/direct_message/7_8")
    );
    assert_eq!(requests[1].ext["access_token"], json!("second"));
    assert!(requests[1].ext["timestamp"].as_u64().is_some());
}

#[tokio::test]
async fn sign_concurrent_subscribe_requests_with_own_token() {
    let (push, transport, _) = listening().await;
    let user = ID::from("7");
    let group = ID::from("55");

    let (user_result, group_result) = tokio::join!(
        push.subscribe_to_user(&user, "a"),
        push.subscribe_to_group(&group, "b")
    );
    user_result.unwrap();
    group_result.unwrap();

    let requests = transport.subscribe_requests.lock().clone();
    assert_eq!(requests.len(), 2);
    requests.iter().for_each(|request| {
        let expected = match request.subscription.as_deref() {
            Some("/user/7") => "a",
            Some("/group/55") => "b",
            other => panic!("unexpected subscription {other:?}"),
        };
        assert_eq!(request.ext["access_token"], json!(expected));
    });
}

#[tokio::test]
async fn report_rejected_subscription() {
    let (push, transport, recorder) = listening().await;
    *transport.reject_with.lock() = Some("401::Unauthorized".into());

    let result = push.subscribe_to_group(&"55".into(), "expired").await;

    assert_eq!(
        result,
        Err(GroupMeError::Transport {
            details: "401::Unauthorized".into()
        })
    );
    assert_eq!(
        recorder.calls(),
        vec!["error: Push protocol error: /meta/subscribe: 401::Unauthorized".to_string()]
    );
}

#[tokio::test]
async fn require_listener_before_subscribing() {
    init_logger();
    let push = PushSubscription::new(RuntimeTokio);

    assert_eq!(
        push.subscribe_to_user(&"7".into(), "token").await,
        Err(GroupMeError::ListenerNotStarted)
    );
    assert!(!push.connected());
}

#[tokio::test]
async fn stop_delivering_after_stop() {
    let (push, transport, recorder) = listening().await;
    push.subscribe_to_group(&"55".into(), "token").await.unwrap();

    push.stop().await;

    let sender = transport.subscriptions.lock()[0].1.clone();
    assert!(sender.is_closed());
    assert_eq!(
        push.subscribe_to_group(&"55".into(), "token").await,
        Err(GroupMeError::ListenerNotStarted)
    );
    assert!(recorder.calls().is_empty());
}
