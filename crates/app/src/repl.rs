use services::{FinishedEvaluation, FinishedReply, TutorServices};
use tokio::sync::mpsc;
use tutor_core::{
    Conversation, EvaluationApplied, LessonPlayer, Navigation, PendingEvaluation, SendOutcome,
    SubmitIgnored,
};

use crate::commands::{Command, Target};
use crate::render;

/// Gateway work finished in a background task.
#[derive(Debug)]
pub enum Event {
    Evaluated(FinishedEvaluation),
    Replied(FinishedReply),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reaction {
    Print(String),
    Quit,
}

/// Terminal front end over one player and one conversation.
///
/// Gateway calls are spawned and report back through `events`, so the learner
/// can keep navigating while an evaluation is in flight.
pub struct Repl {
    services: TutorServices,
    player: LessonPlayer,
    conversation: Conversation,
    events: mpsc::UnboundedSender<Event>,
}

impl Repl {
    pub fn new(
        services: TutorServices,
        player: LessonPlayer,
        events: mpsc::UnboundedSender<Event>,
    ) -> Self {
        let conversation = services.conversation();
        Self {
            services,
            player,
            conversation,
            events,
        }
    }

    pub fn intro(&self) -> String {
        let mut out = String::new();
        if !self.services.gateways_configured() {
            out.push_str(
                "AI gateway not configured (set TUTOR_AI_API_KEY); attempts and questions will get fallback answers.\n",
            );
        }
        out.push_str(&render::lesson(&self.player.snapshot()));
        out.push_str("\nType :help for commands.\n");
        out
    }

    pub fn handle(&mut self, command: Command) -> Reaction {
        let text = match command {
            Command::Quit => return Reaction::Quit,
            Command::Empty => String::new(),
            Command::Help => render::HELP.to_string(),
            Command::Run(query) => self.run(query),
            Command::Ask(text) => self.ask(&text),
            Command::Next => {
                let navigation = self.player.next();
                self.navigated(navigation, "This is the last lesson.\n")
            }
            Command::Prev => {
                let navigation = self.player.prev();
                self.navigated(navigation, "This is the first lesson.\n")
            }
            Command::GoTo(Target::Position(position)) => {
                let navigation = self.player.go_to(position.saturating_sub(1));
                self.navigated(navigation, "No lesson at that position.\n")
            }
            Command::GoTo(Target::Lesson(id)) => match self.player.go_to_lesson(&id) {
                Ok(navigation) => self.navigated(navigation, "No such lesson.\n"),
                Err(error) => format!("{error}\n"),
            },
            Command::Reset => {
                self.player.reset_lesson();
                render::lesson(&self.player.snapshot())
            }
            Command::Show => {
                let snapshot = self.player.snapshot();
                format!(
                    "{}{}",
                    render::lesson(&snapshot),
                    render::submission(&snapshot.submission)
                )
            }
            Command::Draft => format!("{}\n", self.player.draft()),
            Command::Lessons => render::catalog(self.player.catalog(), &self.player.progress()),
            Command::Chat => render::transcript(self.conversation.messages()),
            Command::Unknown(line) => format!("Unknown command: {line}. Type :help.\n"),
        };
        Reaction::Print(text)
    }

    /// Fold a finished gateway call back into the session.
    pub fn on_event(&mut self, event: Event) -> String {
        match event {
            Event::Evaluated(finished) => {
                let applied = self.services.evaluation().apply(&mut self.player, finished);
                match applied {
                    EvaluationApplied::Stale => String::new(),
                    EvaluationApplied::Resolved {
                        newly_completed, ..
                    } => {
                        let snapshot = self.player.snapshot();
                        let mut out = render::submission(&snapshot.submission);
                        if newly_completed {
                            out.push_str("Lesson complete.");
                            if snapshot.can_advance {
                                out.push_str(" Type :next to continue.");
                            }
                            out.push('\n');
                        }
                        out
                    }
                }
            }
            Event::Replied(FinishedReply { pending, outcome }) => {
                render::chat_message(self.conversation.complete(pending, outcome))
            }
        }
    }

    fn run(&mut self, query: String) -> String {
        if !query.is_empty() {
            self.player.edit_draft(query);
        }
        match self.player.submit_draft() {
            Ok(pending) => {
                let text = render::submission(self.player.submission_state());
                self.spawn_evaluation(pending);
                text
            }
            Err(SubmitIgnored::EmptyQuery) => "Nothing to submit.\n".to_string(),
            Err(SubmitIgnored::AlreadyPending) => {
                "Still evaluating the previous attempt.\n".to_string()
            }
        }
    }

    fn ask(&mut self, text: &str) -> String {
        match self.conversation.begin(text) {
            SendOutcome::Started(pending) => {
                let service = self.services.conversation_service();
                let events = self.events.clone();
                tokio::spawn(async move {
                    let finished = service.reply(pending).await;
                    let _ = events.send(Event::Replied(finished));
                });
                "Asking the tutor...\n".to_string()
            }
            SendOutcome::Ignored => "Nothing to ask.\n".to_string(),
        }
    }

    fn spawn_evaluation(&self, pending: PendingEvaluation) {
        let evaluation = self.services.evaluation();
        let events = self.events.clone();
        tokio::spawn(async move {
            let finished = evaluation.evaluate(pending).await;
            // The receiver only goes away at shutdown.
            let _ = events.send(Event::Evaluated(finished));
        });
    }

    fn navigated(&self, navigation: Navigation, unchanged: &str) -> String {
        match navigation {
            Navigation::Moved { .. } | Navigation::Reselected { .. } => {
                render::lesson(&self.player.snapshot())
            }
            Navigation::Unchanged => unchanged.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use services::{AssistantGateway, EvaluatorGateway, GatewayError};
    use tutor_core::model::{ChatMessage, Evaluation, EvaluationRequest};
    use tutor_core::time::fixed_clock;
    use tutor_core::{LessonCatalog, SubmissionState};

    use super::*;

    struct AlwaysCorrect;

    #[async_trait]
    impl EvaluatorGateway for AlwaysCorrect {
        async fn evaluate(&self, _request: &EvaluationRequest) -> Result<Evaluation, GatewayError> {
            let row = serde_json::json!({ "name": "Laptop" });
            let serde_json::Value::Object(row) = row else {
                unreachable!()
            };
            Ok(Evaluation::new(true, "Nice.", vec![row], Vec::new()))
        }
    }

    struct Offline;

    #[async_trait]
    impl AssistantGateway for Offline {
        async fn reply(&self, _history: &[ChatMessage], _message: &str) -> Result<String, GatewayError> {
            Err(GatewayError::NotConfigured)
        }
    }

    fn repl() -> (Repl, mpsc::UnboundedReceiver<Event>) {
        let catalog = Arc::new(LessonCatalog::builtin().unwrap());
        let services = TutorServices::new(
            fixed_clock(),
            catalog,
            Arc::new(AlwaysCorrect),
            Arc::new(Offline),
        );
        let player = services.player(None).unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        (Repl::new(services, player, tx), rx)
    }

    #[tokio::test]
    async fn submitted_query_resolves_through_event_channel() {
        let (mut repl, mut rx) = repl();

        let reaction = repl.handle(Command::parse("SELECT name FROM products;"));
        assert!(matches!(reaction, Reaction::Print(text) if text.contains("Evaluating")));
        assert!(repl.player.submission_state().is_pending());

        let event = rx.recv().await.unwrap();
        let text = repl.on_event(event);

        assert!(text.contains("Correct: Nice."));
        assert!(text.contains("| Laptop |"));
        assert!(text.contains("Lesson complete."));
        assert!(matches!(
            repl.player.submission_state(),
            SubmissionState::Resolved(_)
        ));
    }

    #[tokio::test]
    async fn navigating_away_discards_the_pending_result() {
        let (mut repl, mut rx) = repl();

        repl.handle(Command::parse("SELECT 1;"));
        repl.handle(Command::Next);
        let text = repl.on_event(rx.recv().await.unwrap());

        assert!(text.is_empty());
        assert_eq!(repl.player.current_index(), 1);
        assert_eq!(repl.player.completion_ratio(), 0.0);
    }

    #[tokio::test]
    async fn assistant_fault_appends_fallback() {
        let (mut repl, mut rx) = repl();

        repl.handle(Command::parse(":ask what is a primary key?"));
        let text = repl.on_event(rx.recv().await.unwrap());

        assert!(text.contains("tutor:"));
        assert_eq!(repl.conversation.messages().len(), 2);
    }

    #[test]
    fn edges_and_quit() {
        let (mut repl, _rx) = repl();

        assert_eq!(
            repl.handle(Command::Prev),
            Reaction::Print("This is the first lesson.\n".into())
        );
        assert_eq!(
            repl.handle(Command::parse(":goto 0")),
            Reaction::Print("No lesson at that position.\n".into())
        );
        assert_eq!(repl.handle(Command::parse(":q")), Reaction::Quit);
    }
}
