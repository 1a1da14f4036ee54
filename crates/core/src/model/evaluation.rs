use serde::Serialize;

use crate::model::lesson::Lesson;

/// One simulated result row, keyed by column name in column order.
pub type ResultRow = serde_json::Map<String, serde_json::Value>;

/// Everything the evaluator needs to judge a query against a lesson.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationRequest {
    pub query: String,
    pub task: String,
    pub schema: String,
    pub reference_query: String,
    pub sample_rows: Vec<ResultRow>,
}

impl EvaluationRequest {
    #[must_use]
    pub fn for_lesson(lesson: &Lesson, query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            task: lesson.task().to_owned(),
            schema: lesson.schema().to_owned(),
            reference_query: lesson.reference_query().to_owned(),
            sample_rows: lesson.sample_rows().to_vec(),
        }
    }
}

/// Verdict and simulated result set returned by the evaluator.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Evaluation {
    is_correct: bool,
    feedback: String,
    rows: Vec<ResultRow>,
    columns: Vec<String>,
}

impl Evaluation {
    /// Builds an evaluation, backfilling `columns` from the first row's keys
    /// when rows are present but no columns were reported.
    #[must_use]
    pub fn new(
        is_correct: bool,
        feedback: impl Into<String>,
        rows: Vec<ResultRow>,
        columns: Vec<String>,
    ) -> Self {
        let columns = if columns.is_empty() {
            rows.first()
                .map(|row| row.keys().cloned().collect())
                .unwrap_or_default()
        } else {
            columns
        };

        Self {
            is_correct,
            feedback: feedback.into(),
            rows,
            columns,
        }
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.is_correct
    }

    #[must_use]
    pub fn feedback(&self) -> &str {
        &self.feedback
    }

    #[must_use]
    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub(crate) fn into_parts(self) -> (bool, String, Vec<ResultRow>, Vec<String>) {
        (self.is_correct, self.feedback, self.rows, self.columns)
    }
}

/// What came back from an evaluator call, after transport faults were absorbed.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationOutcome {
    Judged(Evaluation),
    Faulted,
}
