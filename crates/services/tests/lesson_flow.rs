use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use services::{AssistantGateway, EvaluatorGateway, GatewayError, TutorServices};
use tutor_core::model::{ChatMessage, Evaluation, EvaluationRequest, LessonId};
use tutor_core::submission::{EVALUATOR_FAULT_MESSAGE, NO_ROWS_ADVISORY};
use tutor_core::time::fixed_clock;
use tutor_core::{EvaluationApplied, LessonCatalog, SubmissionState, SubmitIgnored};

/// Evaluator double that replays scripted verdicts and records requests.
#[derive(Default)]
struct ScriptedEvaluator {
    verdicts: Mutex<VecDeque<Result<Evaluation, GatewayError>>>,
    requests: Mutex<Vec<EvaluationRequest>>,
}

impl ScriptedEvaluator {
    fn push(&self, verdict: Result<Evaluation, GatewayError>) {
        self.verdicts.lock().unwrap().push_back(verdict);
    }

    fn requests(&self) -> Vec<EvaluationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl EvaluatorGateway for ScriptedEvaluator {
    async fn evaluate(&self, request: &EvaluationRequest) -> Result<Evaluation, GatewayError> {
        self.requests.lock().unwrap().push(request.clone());
        self.verdicts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(GatewayError::EmptyResponse))
    }
}

struct SilentAssistant;

#[async_trait]
impl AssistantGateway for SilentAssistant {
    async fn reply(&self, _: &[ChatMessage], _: &str) -> Result<String, GatewayError> {
        Err(GatewayError::NotConfigured)
    }
}

fn build_services(evaluator: Arc<ScriptedEvaluator>) -> TutorServices {
    TutorServices::new(
        fixed_clock(),
        Arc::new(LessonCatalog::builtin().unwrap()),
        evaluator,
        Arc::new(SilentAssistant),
    )
}

fn correct() -> Evaluation {
    let row = json!({"id": 1, "name": "Laptop"}).as_object().cloned().unwrap();
    Evaluation::new(true, "Perfect!", vec![row], Vec::new())
}

#[tokio::test]
async fn correct_submission_completes_lesson_once() {
    let evaluator = Arc::new(ScriptedEvaluator::default());
    evaluator.push(Ok(correct()));
    evaluator.push(Ok(correct()));
    let services = build_services(Arc::clone(&evaluator));
    let evaluation = services.evaluation();
    let mut player = services.player(None).unwrap();

    let first = evaluation
        .submit(&mut player, "SELECT * FROM products;")
        .await
        .unwrap();
    assert_eq!(
        first,
        EvaluationApplied::Resolved {
            correct: true,
            newly_completed: true
        }
    );
    let second = evaluation
        .submit(&mut player, "SELECT * FROM products;")
        .await
        .unwrap();
    assert_eq!(
        second,
        EvaluationApplied::Resolved {
            correct: true,
            newly_completed: false
        }
    );

    let progress = player.progress();
    assert_eq!(progress.completed.len(), 1);
    assert!(progress.is_completed(&LessonId::new("b1").unwrap()));
    assert!((player.completion_ratio() - 1.0 / 30.0).abs() < f64::EPSILON);

    let resolution = player.submission_state().resolution().unwrap();
    assert_eq!(resolution.columns, ["id", "name"]);
    assert_eq!(resolution.feedback, "Perfect!");

    let requests = evaluator.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].reference_query, "SELECT * FROM products;");
    assert_eq!(requests[0].sample_rows.len(), 2);
}

#[tokio::test]
async fn gateway_fault_degrades_to_error_state() {
    let evaluator = Arc::new(ScriptedEvaluator::default());
    evaluator.push(Err(GatewayError::NotConfigured));
    let services = build_services(Arc::clone(&evaluator));
    let mut player = services.player(None).unwrap();

    let applied = services
        .evaluation()
        .submit(&mut player, "SELECT * FROM products;")
        .await
        .unwrap();
    assert_eq!(
        applied,
        EvaluationApplied::Resolved {
            correct: false,
            newly_completed: false
        }
    );

    let resolution = player.submission_state().resolution().unwrap();
    assert!(!resolution.is_correct);
    assert!(resolution.rows.is_empty());
    assert!(resolution.columns.is_empty());
    assert_eq!(
        resolution.error_message.as_deref(),
        Some(EVALUATOR_FAULT_MESSAGE)
    );
    assert!(player.progress().completed.is_empty());
}

#[tokio::test]
async fn incorrect_empty_result_gets_advisory() {
    let evaluator = Arc::new(ScriptedEvaluator::default());
    evaluator.push(Ok(Evaluation::new(
        false,
        "Check your WHERE clause.",
        Vec::new(),
        Vec::new(),
    )));
    let services = build_services(evaluator);
    let mut player = services.player(Some(&LessonId::new("b6").unwrap())).unwrap();

    services
        .evaluation()
        .submit(&mut player, "SELECT * FROM products WHERE category = 'Food';")
        .await
        .unwrap();

    let resolution = player.submission_state().resolution().unwrap();
    assert_eq!(resolution.feedback, "Check your WHERE clause.");
    assert_eq!(resolution.error_message.as_deref(), Some(NO_ROWS_ADVISORY));
}

#[tokio::test]
async fn ignored_submissions_never_reach_the_evaluator() {
    let evaluator = Arc::new(ScriptedEvaluator::default());
    let services = build_services(Arc::clone(&evaluator));
    let evaluation = services.evaluation();
    let mut player = services.player(None).unwrap();

    let err = evaluation.submit(&mut player, "  \n").await.unwrap_err();
    assert_eq!(err, SubmitIgnored::EmptyQuery);
    assert_eq!(player.submission_state(), &SubmissionState::Idle);

    let _pending = player.submit("SELECT * FROM products;").unwrap();
    let err = evaluation
        .submit(&mut player, "SELECT name FROM products;")
        .await
        .unwrap_err();
    assert_eq!(err, SubmitIgnored::AlreadyPending);
    assert!(evaluator.requests().is_empty());
}

#[tokio::test]
async fn response_for_previous_lesson_is_discarded() {
    let evaluator = Arc::new(ScriptedEvaluator::default());
    evaluator.push(Ok(correct()));
    let services = build_services(evaluator);
    let evaluation = services.evaluation();
    let mut player = services.player(None).unwrap();

    let pending = player.submit_draft().unwrap();
    let in_flight = {
        let evaluation = Arc::clone(&evaluation);
        tokio::spawn(async move { evaluation.evaluate(pending).await })
    };

    player.next();
    assert_eq!(player.draft(), "SELECT ");

    let finished = in_flight.await.unwrap();
    assert_eq!(finished.ticket.lesson_id().as_str(), "b1");
    assert_eq!(evaluation.apply(&mut player, finished), EvaluationApplied::Stale);

    assert_eq!(player.current_lesson().id().as_str(), "b2");
    assert_eq!(player.submission_state(), &SubmissionState::Idle);
    assert!(player.progress().completed.is_empty());
}

#[tokio::test]
async fn reset_while_pending_discards_response() {
    let evaluator = Arc::new(ScriptedEvaluator::default());
    evaluator.push(Ok(correct()));
    let services = build_services(evaluator);
    let evaluation = services.evaluation();
    let mut player = services.player(None).unwrap();

    player.edit_draft("SELECT * FROM products;");
    let pending = player.submit_draft().unwrap();
    player.reset_lesson();
    assert_eq!(player.draft(), "SELECT ");

    let finished = evaluation.evaluate(pending).await;
    assert_eq!(evaluation.apply(&mut player, finished), EvaluationApplied::Stale);
    assert_eq!(player.submission_state(), &SubmissionState::Idle);
}
