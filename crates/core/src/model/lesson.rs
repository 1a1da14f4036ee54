use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::evaluation::ResultRow;
use crate::model::ids::LessonId;

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

/// Curriculum track a lesson belongs to.
///
/// Ordering follows the track order, so grouped views list beginner lessons first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

/// One unit of curriculum.
///
/// The reference query only seeds the editor and is passed to the evaluator as a
/// hint. It is never compared against a submission locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    id: LessonId,
    title: String,
    description: String,
    task: String,
    reference_query: String,
    difficulty: Difficulty,
    schema: String,
    #[serde(default)]
    sample_rows: Vec<ResultRow>,
}

impl Lesson {
    /// Creates a lesson with empty description, task and schema text.
    #[must_use]
    pub fn new(
        id: LessonId,
        title: impl Into<String>,
        difficulty: Difficulty,
        reference_query: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            task: String::new(),
            reference_query: reference_query.into(),
            difficulty,
            schema: String::new(),
            sample_rows: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_task(mut self, task: impl Into<String>) -> Self {
        self.task = task.into();
        self
    }

    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    #[must_use]
    pub fn with_sample_rows(mut self, rows: Vec<ResultRow>) -> Self {
        self.sample_rows = rows;
        self
    }

    #[must_use]
    pub fn id(&self) -> &LessonId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn task(&self) -> &str {
        &self.task
    }

    #[must_use]
    pub fn reference_query(&self) -> &str {
        &self.reference_query
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn schema(&self) -> &str {
        &self.schema
    }

    #[must_use]
    pub fn sample_rows(&self) -> &[ResultRow] {
        &self.sample_rows
    }

    /// Editor text shown when the lesson becomes active.
    #[must_use]
    pub fn starter_draft(&self) -> String {
        starter_draft(&self.reference_query)
    }
}

/// First whitespace-delimited token of `reference_query` followed by one space.
///
/// A blank reference query seeds an empty draft.
#[must_use]
pub fn starter_draft(reference_query: &str) -> String {
    reference_query
        .split_whitespace()
        .next()
        .map(|token| format!("{token} "))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starter_draft_takes_first_token() {
        assert_eq!(starter_draft("SELECT * FROM products;"), "SELECT ");
        assert_eq!(
            starter_draft("WITH x AS (SELECT 1) SELECT * FROM x;"),
            "WITH "
        );
    }

    #[test]
    fn starter_draft_ignores_leading_whitespace_and_newlines() {
        assert_eq!(starter_draft("\n  UPDATE\tproducts SET x = 1"), "UPDATE ");
        assert_eq!(starter_draft("SELECT\nname FROM t"), "SELECT ");
    }

    #[test]
    fn starter_draft_of_blank_reference_is_empty() {
        assert_eq!(starter_draft(""), "");
        assert_eq!(starter_draft("   "), "");
    }

    #[test]
    fn difficulty_orders_by_track() {
        assert!(Difficulty::Beginner < Difficulty::Intermediate);
        assert!(Difficulty::Intermediate < Difficulty::Advanced);
        assert_eq!(Difficulty::Advanced.to_string(), "Advanced");
    }

    #[test]
    fn lesson_deserializes_with_missing_sample_rows() {
        let raw = r#"{
            "id": "x1",
            "title": "Test",
            "description": "d",
            "task": "t",
            "reference_query": "SELECT 1;",
            "difficulty": "intermediate",
            "schema": "t (a)"
        }"#;
        let lesson: Lesson = serde_json::from_str(raw).unwrap();
        assert_eq!(lesson.difficulty(), Difficulty::Intermediate);
        assert!(lesson.sample_rows().is_empty());
        assert_eq!(lesson.starter_draft(), "SELECT ");
    }
}
