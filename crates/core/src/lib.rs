#![forbid(unsafe_code)]

pub mod catalog;
pub mod conversation;
pub mod error;
pub mod model;
pub mod player;
pub mod progress;
pub mod submission;
pub mod time;

pub use catalog::LessonCatalog;
pub use conversation::{Conversation, PendingReply, ReplyOutcome, SendOutcome};
pub use error::CatalogError;
pub use player::{EvaluationApplied, LessonPlayer, LessonSnapshot, PendingEvaluation};
pub use progress::{CorrectSubmissionObserved, Navigation, ProgressController, ProgressState};
pub use submission::{
    Resolution, SubmissionLifecycle, SubmissionState, SubmissionTicket, SubmitIgnored,
};
pub use time::Clock;
