use std::collections::BTreeSet;
use std::sync::Arc;

use crate::catalog::LessonCatalog;
use crate::error::CatalogError;
use crate::model::{Lesson, LessonId};

/// Emitted by the submission lifecycle when the evaluator accepts an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectSubmissionObserved {
    pub lesson_id: LessonId,
}

/// Result of a navigation request.
///
/// Out-of-range targets produce `Unchanged` rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Moved { from: usize, to: usize },
    /// The active lesson was selected again; its attempt starts over.
    Reselected { index: usize },
    Unchanged,
}

/// Read-only snapshot of learner progress.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressState {
    pub current_index: usize,
    pub completed: BTreeSet<LessonId>,
    pub total: usize,
}

impl ProgressState {
    #[must_use]
    pub fn completion_ratio(&self) -> f64 {
        completion_ratio(self.completed.len(), self.total)
    }

    #[must_use]
    pub fn is_completed(&self, id: &LessonId) -> bool {
        self.completed.contains(id)
    }
}

/// Owns the active lesson pointer and the set of completed lessons.
#[derive(Debug, Clone)]
pub struct ProgressController {
    catalog: Arc<LessonCatalog>,
    current: usize,
    completed: BTreeSet<LessonId>,
}

impl ProgressController {
    /// Starts at the first lesson with nothing completed.
    #[must_use]
    pub fn new(catalog: Arc<LessonCatalog>) -> Self {
        Self {
            catalog,
            current: 0,
            completed: BTreeSet::new(),
        }
    }

    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if `id` is not in the catalog.
    pub fn starting_at(catalog: Arc<LessonCatalog>, id: &LessonId) -> Result<Self, CatalogError> {
        let current = catalog.index_of(id)?;
        Ok(Self {
            catalog,
            current,
            completed: BTreeSet::new(),
        })
    }

    #[must_use]
    pub fn catalog(&self) -> &LessonCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_lesson(&self) -> &Lesson {
        // `current` is always < len and the catalog is never empty.
        &self.catalog.all()[self.current]
    }

    /// Activate the lesson at `index` if it exists.
    ///
    /// Accepts any integer type so that negative requests from edge controls
    /// (e.g. `-1`) are treated like any other out-of-range target.
    pub fn go_to<I: TryInto<usize>>(&mut self, index: I) -> Navigation {
        let Ok(to) = index.try_into() else {
            return Navigation::Unchanged;
        };
        if to >= self.catalog.len() {
            return Navigation::Unchanged;
        }
        if to == self.current {
            return Navigation::Reselected { index: to };
        }
        let from = self.current;
        self.current = to;
        Navigation::Moved { from, to }
    }

    pub fn next(&mut self) -> Navigation {
        match self.current.checked_add(1) {
            Some(to) => self.go_to(to),
            None => Navigation::Unchanged,
        }
    }

    pub fn prev(&mut self) -> Navigation {
        match self.current.checked_sub(1) {
            Some(to) => self.go_to(to),
            None => Navigation::Unchanged,
        }
    }

    /// Record a lesson as completed.
    ///
    /// Returns `true` only the first time an id is added. Ids that are not in
    /// the catalog are ignored so the completion ratio stays within `[0, 1]`.
    pub fn mark_completed(&mut self, id: &LessonId) -> bool {
        if self.completed.contains(id) || self.catalog.find(id).is_none() {
            return false;
        }
        self.completed.insert(id.clone())
    }

    /// Consume a correctness event from the submission lifecycle.
    pub fn observe(&mut self, event: &CorrectSubmissionObserved) -> bool {
        self.mark_completed(&event.lesson_id)
    }

    #[must_use]
    pub fn is_completed(&self, id: &LessonId) -> bool {
        self.completed.contains(id)
    }

    #[must_use]
    pub fn completed_ids(&self) -> &BTreeSet<LessonId> {
        &self.completed
    }

    #[must_use]
    pub fn completion_ratio(&self) -> f64 {
        completion_ratio(self.completed.len(), self.catalog.len())
    }

    #[must_use]
    pub fn snapshot(&self) -> ProgressState {
        ProgressState {
            current_index: self.current,
            completed: self.completed.clone(),
            total: self.catalog.len(),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn completion_ratio(completed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (completed as f64 / total as f64).clamp(0.0, 1.0)
}
