use crate::model::{ChatMessage, ChatRole};
use crate::time::Clock;

/// Reply used when the assistant answered with nothing.
pub const EMPTY_REPLY_FALLBACK: &str = "I'm taking a quick break. Ask again in a second!";

/// Reply used when the assistant could not be reached.
pub const UNAVAILABLE_REPLY_FALLBACK: &str =
    "The tutor is currently unavailable. Try again in a moment.";

/// A user message that has been appended and is waiting for its reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReply {
    history: Vec<ChatMessage>,
    message: String,
}

impl PendingReply {
    /// Transcript as it was before the user message was appended.
    #[must_use]
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Started(PendingReply),
    /// Blank input; nothing was appended.
    Ignored,
}

/// What the assistant gateway produced, after faults were absorbed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    Answered(String),
    Faulted,
}

/// Append-only chat transcript, independent of lesson state.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    in_flight: usize,
    clock: Clock,
}

impl Conversation {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            messages: Vec::new(),
            in_flight: 0,
            clock,
        }
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Number of user messages still waiting for a reply.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Append a user message immediately and hand back what the gateway needs.
    pub fn begin(&mut self, text: &str) -> SendOutcome {
        if text.trim().is_empty() {
            return SendOutcome::Ignored;
        }

        let history = self.messages.clone();
        self.messages
            .push(ChatMessage::new(ChatRole::User, text, self.clock.now()));
        self.in_flight += 1;
        SendOutcome::Started(PendingReply {
            history,
            message: text.to_owned(),
        })
    }

    /// Append the assistant reply for a pending message.
    ///
    /// Replies are appended in the order they complete.
    pub fn complete(&mut self, _pending: PendingReply, reply: ReplyOutcome) -> &ChatMessage {
        let text = match reply {
            ReplyOutcome::Answered(text) if !text.trim().is_empty() => text,
            ReplyOutcome::Answered(_) => EMPTY_REPLY_FALLBACK.to_string(),
            ReplyOutcome::Faulted => UNAVAILABLE_REPLY_FALLBACK.to_string(),
        };
        self.in_flight = self.in_flight.saturating_sub(1);
        self.messages
            .push(ChatMessage::new(ChatRole::Assistant, text, self.clock.now()));
        &self.messages[self.messages.len() - 1]
    }
}
