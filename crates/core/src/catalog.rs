use std::collections::{BTreeMap, HashSet};

use crate::error::CatalogError;
use crate::model::{Difficulty, Lesson, LessonId};

const BUILTIN_LESSONS: &str = include_str!("../data/lessons.json");

/// Immutable, ordered lesson list.
///
/// Construction guarantees the catalog is non-empty and ids are unique, so a
/// lesson index in `0..len()` always resolves.
#[derive(Debug, Clone)]
pub struct LessonCatalog {
    lessons: Vec<Lesson>,
}

impl LessonCatalog {
    /// # Errors
    ///
    /// Returns `CatalogError::Empty` for an empty list and
    /// `CatalogError::DuplicateId` when two lessons share an id.
    pub fn new(lessons: Vec<Lesson>) -> Result<Self, CatalogError> {
        if lessons.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::with_capacity(lessons.len());
        for lesson in &lessons {
            if !seen.insert(lesson.id()) {
                return Err(CatalogError::DuplicateId(lesson.id().clone()));
            }
        }

        Ok(Self { lessons })
    }

    /// Parse a catalog from a JSON array of lessons.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Malformed` if the JSON does not match the lesson shape,
    /// plus any validation error from [`LessonCatalog::new`].
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let lessons: Vec<Lesson> = serde_json::from_str(raw)?;
        Self::new(lessons)
    }

    /// The curriculum bundled with the crate.
    ///
    /// # Errors
    ///
    /// Only fails if the bundled data is corrupt.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_LESSONS)
    }

    #[must_use]
    pub fn all(&self) -> &[Lesson] {
        &self.lessons
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Lesson> {
        self.lessons.get(index)
    }

    #[must_use]
    pub fn find(&self, id: &LessonId) -> Option<&Lesson> {
        self.lessons.iter().find(|lesson| lesson.id() == id)
    }

    /// Position of a lesson in catalog order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no lesson has this id.
    pub fn index_of(&self, id: &LessonId) -> Result<usize, CatalogError> {
        self.lessons
            .iter()
            .position(|lesson| lesson.id() == id)
            .ok_or_else(|| CatalogError::NotFound(id.clone()))
    }

    /// Lessons partitioned by difficulty, preserving catalog order within each group.
    ///
    /// Every difficulty has an entry, possibly empty.
    #[must_use]
    pub fn by_difficulty(&self) -> BTreeMap<Difficulty, Vec<&Lesson>> {
        let mut groups: BTreeMap<Difficulty, Vec<&Lesson>> = Difficulty::ALL
            .into_iter()
            .map(|difficulty| (difficulty, Vec::new()))
            .collect();
        for lesson in &self.lessons {
            groups.entry(lesson.difficulty()).or_default().push(lesson);
        }
        groups
    }
}
