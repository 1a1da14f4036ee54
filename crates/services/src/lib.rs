#![forbid(unsafe_code)]

pub mod ai;
pub mod app_services;
pub mod assistant;
pub mod config;
pub mod conversation_service;
pub mod error;
pub mod evaluation_service;
pub mod evaluator;

pub use tutor_core::Clock;

pub use app_services::TutorServices;
pub use assistant::{AiAssistant, AssistantGateway};
pub use config::AiConfig;
pub use conversation_service::{ConversationService, FinishedReply};
pub use error::{AppServicesError, ConfigError, GatewayError};
pub use evaluation_service::{EvaluationService, FinishedEvaluation};
pub use evaluator::{AiEvaluator, EvaluatorGateway};
