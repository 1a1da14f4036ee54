use std::sync::Arc;

use tutor_core::model::EvaluationOutcome;
use tutor_core::{EvaluationApplied, LessonPlayer, PendingEvaluation, SubmissionTicket, SubmitIgnored};

use crate::evaluator::EvaluatorGateway;

/// Evaluator verdict paired with the ticket it answers.
#[derive(Debug, Clone, PartialEq)]
pub struct FinishedEvaluation {
    pub ticket: SubmissionTicket,
    pub outcome: EvaluationOutcome,
}

/// Runs evaluator calls and feeds the results back into a `LessonPlayer`.
///
/// Gateway faults stop here: they are logged and turned into
/// `EvaluationOutcome::Faulted`.
#[derive(Clone)]
pub struct EvaluationService {
    evaluator: Arc<dyn EvaluatorGateway>,
}

impl EvaluationService {
    #[must_use]
    pub fn new(evaluator: Arc<dyn EvaluatorGateway>) -> Self {
        Self { evaluator }
    }

    /// Call the evaluator for a started submission.
    ///
    /// Does not touch the player, so it can run while the learner keeps navigating.
    pub async fn evaluate(&self, pending: PendingEvaluation) -> FinishedEvaluation {
        let PendingEvaluation { ticket, request } = pending;
        tracing::debug!(
            lesson_id = %ticket.lesson_id(),
            epoch = ticket.epoch(),
            "evaluating submission"
        );

        let outcome = match self.evaluator.evaluate(&request).await {
            Ok(evaluation) => EvaluationOutcome::Judged(evaluation),
            Err(error) => {
                tracing::warn!(
                    lesson_id = %ticket.lesson_id(),
                    error = %error,
                    "evaluator fault"
                );
                EvaluationOutcome::Faulted
            }
        };

        FinishedEvaluation { ticket, outcome }
    }

    /// Apply a finished evaluation. Results for a lesson that is no longer
    /// active, or was reset, are dropped.
    pub fn apply(&self, player: &mut LessonPlayer, finished: FinishedEvaluation) -> EvaluationApplied {
        let FinishedEvaluation { ticket, outcome } = finished;
        let applied = player.apply_evaluation(&ticket, outcome);
        match applied {
            EvaluationApplied::Stale => tracing::debug!(
                lesson_id = %ticket.lesson_id(),
                epoch = ticket.epoch(),
                "discarding stale evaluation"
            ),
            EvaluationApplied::Resolved {
                newly_completed: true,
                ..
            } => tracing::info!(lesson_id = %ticket.lesson_id(), "lesson completed"),
            EvaluationApplied::Resolved { .. } => {}
        }
        applied
    }

    /// Submit `query` and wait for the verdict.
    ///
    /// # Errors
    ///
    /// Returns `SubmitIgnored` for blank queries or while another submission is
    /// pending; the player is unchanged in that case.
    pub async fn submit(
        &self,
        player: &mut LessonPlayer,
        query: &str,
    ) -> Result<EvaluationApplied, SubmitIgnored> {
        let pending = player.submit(query)?;
        let finished = self.evaluate(pending).await;
        Ok(self.apply(player, finished))
    }

    /// Submit the player's current draft and wait for the verdict.
    ///
    /// # Errors
    ///
    /// See [`EvaluationService::submit`].
    pub async fn submit_draft(
        &self,
        player: &mut LessonPlayer,
    ) -> Result<EvaluationApplied, SubmitIgnored> {
        let pending = player.submit_draft()?;
        let finished = self.evaluate(pending).await;
        Ok(self.apply(player, finished))
    }
}
