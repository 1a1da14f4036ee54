use std::sync::Arc;

use tutor_core::model::ChatMessage;
use tutor_core::{Conversation, PendingReply, ReplyOutcome, SendOutcome};

use crate::assistant::AssistantGateway;

/// Assistant reply paired with the message it answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedReply {
    pub pending: PendingReply,
    pub outcome: ReplyOutcome,
}

/// Drives assistant calls for a `Conversation`.
#[derive(Clone)]
pub struct ConversationService {
    assistant: Arc<dyn AssistantGateway>,
}

impl ConversationService {
    #[must_use]
    pub fn new(assistant: Arc<dyn AssistantGateway>) -> Self {
        Self { assistant }
    }

    /// Ask the assistant; faults are logged and become `ReplyOutcome::Faulted`.
    pub async fn reply(&self, pending: PendingReply) -> FinishedReply {
        let outcome = match self
            .assistant
            .reply(pending.history(), pending.message())
            .await
        {
            Ok(text) => ReplyOutcome::Answered(text),
            Err(error) => {
                tracing::warn!(error = %error, "assistant fault");
                ReplyOutcome::Faulted
            }
        };
        FinishedReply { pending, outcome }
    }

    /// Append `text` and the assistant's answer to the transcript.
    ///
    /// Returns the appended reply, or `None` when `text` is blank.
    pub async fn send(&self, conversation: &mut Conversation, text: &str) -> Option<ChatMessage> {
        let SendOutcome::Started(pending) = conversation.begin(text) else {
            return None;
        };
        let FinishedReply { pending, outcome } = self.reply(pending).await;
        Some(conversation.complete(pending, outcome).clone())
    }
}
