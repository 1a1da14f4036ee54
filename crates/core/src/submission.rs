use chrono::{DateTime, Utc};

use crate::model::{EvaluationOutcome, Lesson, LessonId, ResultRow};
use crate::progress::CorrectSubmissionObserved;
use crate::time::Clock;

/// Shown when an incorrect attempt produced no rows. A hint, not a failure.
pub const NO_ROWS_ADVISORY: &str = "Query produced no data. Double check your filters!";

/// Shown when the evaluator could not be reached or answered with garbage.
pub const EVALUATOR_FAULT_MESSAGE: &str = "The SQL engine encountered a temporary delay.";

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Outcome of a finished attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub query: String,
    pub is_correct: bool,
    pub feedback: String,
    pub columns: Vec<String>,
    pub rows: Vec<ResultRow>,
    pub error_message: Option<String>,
    pub resolved_at: DateTime<Utc>,
}

impl Resolution {
    fn from_outcome(query: String, outcome: EvaluationOutcome, resolved_at: DateTime<Utc>) -> Self {
        let EvaluationOutcome::Judged(evaluation) = outcome else {
            return Self {
                query,
                is_correct: false,
                feedback: String::new(),
                columns: Vec::new(),
                rows: Vec::new(),
                error_message: Some(EVALUATOR_FAULT_MESSAGE.to_string()),
                resolved_at,
            };
        };

        let (is_correct, feedback, rows, columns) = evaluation.into_parts();
        let error_message =
            (rows.is_empty() && !is_correct).then(|| NO_ROWS_ADVISORY.to_string());
        Self {
            query,
            is_correct,
            feedback,
            columns,
            rows,
            error_message,
            resolved_at,
        }
    }
}

/// Per-attempt state of the active lesson.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Pending {
        query: String,
    },
    Resolved(Resolution),
}

impl SubmissionState {
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, SubmissionState::Pending { .. })
    }

    #[must_use]
    pub fn resolution(&self) -> Option<&Resolution> {
        match self {
            SubmissionState::Resolved(resolution) => Some(resolution),
            _ => None,
        }
    }
}

//
// ─── TRANSITIONS ───────────────────────────────────────────────────────────────
//

/// Tag identifying one in-flight evaluation.
///
/// A ticket only resolves the lifecycle that issued it, and only while no newer
/// request, reset, or lesson switch has happened since.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionTicket {
    epoch: u64,
    lesson_id: LessonId,
    query: String,
}

impl SubmissionTicket {
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    #[must_use]
    pub fn lesson_id(&self) -> &LessonId {
        &self.lesson_id
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitIgnored {
    EmptyQuery,
    AlreadyPending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Started(SubmissionTicket),
    Ignored(SubmitIgnored),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// The attempt resolved; carries the completion event for correct answers.
    Resolved {
        observed: Option<CorrectSubmissionObserved>,
    },
    /// The ticket no longer matches the active request and was dropped.
    Stale,
}

//
// ─── LIFECYCLE ─────────────────────────────────────────────────────────────────
//

/// Idle → Pending → Resolved state machine for the active lesson.
#[derive(Debug, Clone)]
pub struct SubmissionLifecycle {
    lesson_id: LessonId,
    starter: String,
    draft: String,
    state: SubmissionState,
    epoch: u64,
    clock: Clock,
}

impl SubmissionLifecycle {
    #[must_use]
    pub fn new(lesson: &Lesson, clock: Clock) -> Self {
        let starter = lesson.starter_draft();
        Self {
            lesson_id: lesson.id().clone(),
            draft: starter.clone(),
            starter,
            state: SubmissionState::Idle,
            epoch: 0,
            clock,
        }
    }

    /// Point the lifecycle at a newly active lesson, discarding everything about
    /// the previous one. Any in-flight ticket becomes stale.
    pub fn retarget(&mut self, lesson: &Lesson) {
        self.lesson_id = lesson.id().clone();
        self.starter = lesson.starter_draft();
        self.reset();
    }

    /// Back to `Idle` with the starter draft. In-flight tickets become stale.
    pub fn reset(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        self.draft.clone_from(&self.starter);
        self.state = SubmissionState::Idle;
    }

    #[must_use]
    pub fn lesson_id(&self) -> &LessonId {
        &self.lesson_id
    }

    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    #[must_use]
    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn edit_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    #[must_use]
    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    /// Start evaluating `query`.
    ///
    /// Blank queries and submissions while another is pending leave the state
    /// untouched.
    pub fn submit(&mut self, query: &str) -> SubmitOutcome {
        if query.trim().is_empty() {
            return SubmitOutcome::Ignored(SubmitIgnored::EmptyQuery);
        }
        if self.state.is_pending() {
            return SubmitOutcome::Ignored(SubmitIgnored::AlreadyPending);
        }

        self.epoch = self.epoch.wrapping_add(1);
        self.state = SubmissionState::Pending {
            query: query.to_owned(),
        };
        SubmitOutcome::Started(SubmissionTicket {
            epoch: self.epoch,
            lesson_id: self.lesson_id.clone(),
            query: query.to_owned(),
        })
    }

    /// Apply the evaluator's answer for `ticket`.
    pub fn resolve(
        &mut self,
        ticket: &SubmissionTicket,
        outcome: EvaluationOutcome,
    ) -> ResolveOutcome {
        let current = matches!(
            &self.state,
            SubmissionState::Pending { query } if *query == ticket.query
        );
        if !current || ticket.epoch != self.epoch || ticket.lesson_id != self.lesson_id {
            return ResolveOutcome::Stale;
        }

        let resolution = Resolution::from_outcome(ticket.query.clone(), outcome, self.clock.now());
        let observed = resolution.is_correct.then(|| CorrectSubmissionObserved {
            lesson_id: self.lesson_id.clone(),
        });
        self.state = SubmissionState::Resolved(resolution);
        ResolveOutcome::Resolved { observed }
    }
}
