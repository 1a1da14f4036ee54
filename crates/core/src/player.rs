use std::sync::Arc;

use crate::catalog::LessonCatalog;
use crate::error::CatalogError;
use crate::model::{EvaluationOutcome, EvaluationRequest, Lesson, LessonId};
use crate::progress::{Navigation, ProgressController, ProgressState};
use crate::submission::{
    ResolveOutcome, SubmissionLifecycle, SubmissionState, SubmissionTicket, SubmitIgnored,
    SubmitOutcome,
};
use crate::time::Clock;

//
// ─── SNAPSHOTS ─────────────────────────────────────────────────────────────────
//

/// Everything a presentation layer needs to draw the active lesson.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonSnapshot {
    pub lesson: Lesson,
    /// Zero-based position in the catalog.
    pub index: usize,
    pub total: usize,
    pub is_first: bool,
    pub is_last: bool,
    pub is_completed: bool,
    /// The last attempt was correct and there is a lesson after this one.
    pub can_advance: bool,
    pub draft: String,
    pub submission: SubmissionState,
    pub completion_ratio: f64,
}

/// An evaluation that has been started and still needs the evaluator's verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEvaluation {
    pub ticket: SubmissionTicket,
    pub request: EvaluationRequest,
}

/// How an evaluator response was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationApplied {
    Resolved { correct: bool, newly_completed: bool },
    /// The lesson changed or was reset while the call was in flight.
    Stale,
}

//
// ─── PLAYER ────────────────────────────────────────────────────────────────────
//

/// Composes lesson progression with the submission lifecycle of the active lesson.
///
/// The player does no I/O. Gateways run outside of it: `submit` hands out a
/// [`PendingEvaluation`], and `apply_evaluation` feeds the result back in.
#[derive(Debug, Clone)]
pub struct LessonPlayer {
    progress: ProgressController,
    submission: SubmissionLifecycle,
}

impl LessonPlayer {
    #[must_use]
    pub fn new(catalog: Arc<LessonCatalog>, clock: Clock) -> Self {
        let progress = ProgressController::new(catalog);
        let submission = SubmissionLifecycle::new(progress.current_lesson(), clock);
        Self {
            progress,
            submission,
        }
    }

    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if `id` is not in the catalog.
    pub fn starting_at(
        catalog: Arc<LessonCatalog>,
        clock: Clock,
        id: &LessonId,
    ) -> Result<Self, CatalogError> {
        let progress = ProgressController::starting_at(catalog, id)?;
        let submission = SubmissionLifecycle::new(progress.current_lesson(), clock);
        Ok(Self {
            progress,
            submission,
        })
    }

    #[must_use]
    pub fn catalog(&self) -> &LessonCatalog {
        self.progress.catalog()
    }

    #[must_use]
    pub fn current_lesson(&self) -> &Lesson {
        self.progress.current_lesson()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.progress.current_index()
    }

    #[must_use]
    pub fn draft(&self) -> &str {
        self.submission.draft()
    }

    #[must_use]
    pub fn submission_state(&self) -> &SubmissionState {
        self.submission.state()
    }

    #[must_use]
    pub fn progress(&self) -> ProgressState {
        self.progress.snapshot()
    }

    #[must_use]
    pub fn completion_ratio(&self) -> f64 {
        self.progress.completion_ratio()
    }

    //
    // ─── NAVIGATION ────────────────────────────────────────────────────────────
    //

    pub fn go_to<I: TryInto<usize>>(&mut self, index: I) -> Navigation {
        let navigation = self.progress.go_to(index);
        self.after_navigation(navigation)
    }

    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if `id` is not in the catalog.
    pub fn go_to_lesson(&mut self, id: &LessonId) -> Result<Navigation, CatalogError> {
        let index = self.progress.catalog().index_of(id)?;
        Ok(self.go_to(index))
    }

    pub fn next(&mut self) -> Navigation {
        let navigation = self.progress.next();
        self.after_navigation(navigation)
    }

    pub fn prev(&mut self) -> Navigation {
        let navigation = self.progress.prev();
        self.after_navigation(navigation)
    }

    fn after_navigation(&mut self, navigation: Navigation) -> Navigation {
        match navigation {
            Navigation::Moved { .. } => self.submission.retarget(self.progress.current_lesson()),
            Navigation::Reselected { .. } => self.submission.reset(),
            Navigation::Unchanged => {}
        }
        navigation
    }

    //
    // ─── SUBMISSIONS ───────────────────────────────────────────────────────────
    //

    /// Restore the active lesson to its starting state. Progress is kept.
    pub fn reset_lesson(&mut self) {
        self.submission.reset();
    }

    pub fn edit_draft(&mut self, text: impl Into<String>) {
        self.submission.edit_draft(text);
    }

    /// Start evaluating `query` against the active lesson.
    ///
    /// # Errors
    ///
    /// Returns the reason the submission was ignored; the state is unchanged in
    /// that case.
    pub fn submit(&mut self, query: &str) -> Result<PendingEvaluation, SubmitIgnored> {
        match self.submission.submit(query) {
            SubmitOutcome::Started(ticket) => {
                let request = EvaluationRequest::for_lesson(self.current_lesson(), ticket.query());
                Ok(PendingEvaluation { ticket, request })
            }
            SubmitOutcome::Ignored(reason) => Err(reason),
        }
    }

    /// Submit the current draft.
    ///
    /// # Errors
    ///
    /// See [`LessonPlayer::submit`].
    pub fn submit_draft(&mut self) -> Result<PendingEvaluation, SubmitIgnored> {
        let draft = self.submission.draft().to_owned();
        self.submit(&draft)
    }

    /// Feed an evaluator result back in. Correct answers mark the lesson completed.
    pub fn apply_evaluation(
        &mut self,
        ticket: &SubmissionTicket,
        outcome: EvaluationOutcome,
    ) -> EvaluationApplied {
        match self.submission.resolve(ticket, outcome) {
            ResolveOutcome::Stale => EvaluationApplied::Stale,
            ResolveOutcome::Resolved { observed: None } => EvaluationApplied::Resolved {
                correct: false,
                newly_completed: false,
            },
            ResolveOutcome::Resolved {
                observed: Some(event),
            } => EvaluationApplied::Resolved {
                correct: true,
                newly_completed: self.progress.observe(&event),
            },
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> LessonSnapshot {
        let lesson = self.current_lesson();
        let index = self.current_index();
        let total = self.catalog().len();
        let is_last = index + 1 == total;
        let answered_correctly = self
            .submission
            .state()
            .resolution()
            .is_some_and(|resolution| resolution.is_correct);

        LessonSnapshot {
            lesson: lesson.clone(),
            index,
            total,
            is_first: index == 0,
            is_last,
            is_completed: self.progress.is_completed(lesson.id()),
            can_advance: answered_correctly && !is_last,
            draft: self.submission.draft().to_owned(),
            submission: self.submission.state().clone(),
            completion_ratio: self.completion_ratio(),
        }
    }
}
