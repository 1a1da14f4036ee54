use async_trait::async_trait;

use tutor_core::model::{ChatMessage, ChatRole};

use crate::ai::{ChatClient, PromptMessage, PromptRole};
use crate::error::GatewayError;

pub const TUTOR_SYSTEM_PROMPT: &str = "You are a friendly and patient SQL tutor. You help people \
learn SQL with simple analogies and clear explanations. Be concise. If they ask for the answer, \
give them a helpful hint to guide them there.";

/// Boundary to the conversational oracle. Holds no session memory of its own.
#[async_trait]
pub trait AssistantGateway: Send + Sync {
    /// Answer `message` given the prior `transcript`.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` on transport, auth, or payload failures.
    async fn reply(&self, transcript: &[ChatMessage], message: &str)
    -> Result<String, GatewayError>;
}

#[derive(Clone)]
pub struct AiAssistant {
    client: ChatClient,
}

impl AiAssistant {
    #[must_use]
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AssistantGateway for AiAssistant {
    async fn reply(
        &self,
        transcript: &[ChatMessage],
        message: &str,
    ) -> Result<String, GatewayError> {
        let messages = build_messages(TUTOR_SYSTEM_PROMPT, transcript, message);
        self.client.complete(&messages, 0.2, false).await
    }
}

fn build_messages(system_prompt: &str, transcript: &[ChatMessage], message: &str) -> Vec<PromptMessage> {
    let mut messages = Vec::with_capacity(transcript.len() + 2);
    messages.push(PromptMessage::new(PromptRole::System, system_prompt));
    messages.extend(transcript.iter().map(|entry| {
        let role = match entry.role() {
            ChatRole::User => PromptRole::User,
            ChatRole::Assistant => PromptRole::Assistant,
        };
        PromptMessage::new(role, entry.text())
    }));
    messages.push(PromptMessage::new(PromptRole::User, message));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutor_core::time::fixed_now;

    #[test]
    fn transcript_is_replayed_between_system_and_new_message() {
        let transcript = vec![
            ChatMessage::new(ChatRole::User, "What is WHERE?", fixed_now()),
            ChatMessage::new(ChatRole::Assistant, "A filter.", fixed_now()),
        ];
        let messages = build_messages("sys", &transcript, "And HAVING?");

        let roles: Vec<PromptRole> = messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            [
                PromptRole::System,
                PromptRole::User,
                PromptRole::Assistant,
                PromptRole::User
            ]
        );
        assert_eq!(messages[0].content, "sys");
        assert_eq!(messages[2].content, "A filter.");
        assert_eq!(messages[3].content, "And HAVING?");
    }

    #[tokio::test]
    async fn unconfigured_assistant_faults() {
        let assistant = AiAssistant::new(ChatClient::new(None));
        let err = assistant.reply(&[], "hello").await.unwrap_err();
        assert!(matches!(err, GatewayError::NotConfigured));
    }
}
