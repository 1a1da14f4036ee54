use thiserror::Error;

use crate::model::LessonId;

/// Errors raised while building or querying the lesson catalog.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("lesson catalog is empty")]
    Empty,

    #[error("duplicate lesson id: {0}")]
    DuplicateId(LessonId),

    #[error("lesson not found: {0}")]
    NotFound(LessonId),

    #[error("malformed lesson catalog: {0}")]
    Malformed(#[from] serde_json::Error),
}
