mod chat;
mod evaluation;
mod ids;
mod lesson;

pub use ids::{LessonId, ParseIdError};

pub use chat::{ChatMessage, ChatRole};
pub use evaluation::{Evaluation, EvaluationOutcome, EvaluationRequest, ResultRow};
pub use lesson::{Difficulty, Lesson, starter_draft};
