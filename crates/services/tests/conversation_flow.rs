use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use services::{AssistantGateway, ConversationService, GatewayError};
use tutor_core::conversation::{EMPTY_REPLY_FALLBACK, UNAVAILABLE_REPLY_FALLBACK};
use tutor_core::model::{ChatMessage, ChatRole};
use tutor_core::time::fixed_clock;
use tutor_core::{Conversation, SendOutcome};

/// Assistant double that echoes and records the transcript length it saw.
#[derive(Default)]
struct EchoAssistant {
    seen_history: Mutex<Vec<usize>>,
}

#[async_trait]
impl AssistantGateway for EchoAssistant {
    async fn reply(&self, transcript: &[ChatMessage], message: &str) -> Result<String, GatewayError> {
        self.seen_history.lock().unwrap().push(transcript.len());
        match message {
            "fail" => Err(GatewayError::EmptyResponse),
            "silence" => Ok(String::new()),
            other => Ok(format!("echo: {other}")),
        }
    }
}

#[tokio::test]
async fn replies_follow_user_messages_with_full_history() {
    let assistant = Arc::new(EchoAssistant::default());
    let service = ConversationService::new(Arc::clone(&assistant) as Arc<dyn AssistantGateway>);
    let mut conversation = Conversation::new(fixed_clock());

    let reply = service.send(&mut conversation, "What is SELECT?").await.unwrap();
    assert_eq!(reply.role(), ChatRole::Assistant);
    assert_eq!(reply.text(), "echo: What is SELECT?");

    service.send(&mut conversation, "And FROM?").await.unwrap();
    assert_eq!(*assistant.seen_history.lock().unwrap(), [0, 2]);
    assert_eq!(conversation.messages().len(), 4);
}

#[tokio::test]
async fn blank_messages_are_not_sent() {
    let assistant = Arc::new(EchoAssistant::default());
    let service = ConversationService::new(Arc::clone(&assistant) as Arc<dyn AssistantGateway>);
    let mut conversation = Conversation::new(fixed_clock());

    assert!(service.send(&mut conversation, "   ").await.is_none());
    assert!(conversation.messages().is_empty());
    assert!(assistant.seen_history.lock().unwrap().is_empty());
}

#[tokio::test]
async fn faults_keep_the_conversation_going() {
    let service = ConversationService::new(Arc::new(EchoAssistant::default()));
    let mut conversation = Conversation::new(fixed_clock());

    let reply = service.send(&mut conversation, "fail").await.unwrap();
    assert_eq!(reply.text(), UNAVAILABLE_REPLY_FALLBACK);

    let reply = service.send(&mut conversation, "silence").await.unwrap();
    assert_eq!(reply.text(), EMPTY_REPLY_FALLBACK);

    let reply = service.send(&mut conversation, "still there?").await.unwrap();
    assert_eq!(reply.text(), "echo: still there?");
    assert_eq!(conversation.messages().len(), 6);
}

#[tokio::test]
async fn replies_land_in_completion_order() {
    let service = ConversationService::new(Arc::new(EchoAssistant::default()));
    let mut conversation = Conversation::new(fixed_clock());

    let SendOutcome::Started(first) = conversation.begin("one") else {
        panic!("first message ignored");
    };
    let SendOutcome::Started(second) = conversation.begin("two") else {
        panic!("second message ignored");
    };
    assert_eq!(conversation.in_flight(), 2);

    let second = service.reply(second).await;
    conversation.complete(second.pending, second.outcome);
    let first = service.reply(first).await;
    conversation.complete(first.pending, first.outcome);

    let texts: Vec<&str> = conversation.messages().iter().map(ChatMessage::text).collect();
    assert_eq!(texts, ["one", "two", "echo: two", "echo: one"]);
    assert_eq!(conversation.in_flight(), 0);
}
