use std::sync::Arc;

use tutor_core::model::LessonId;
use tutor_core::{CatalogError, Clock, Conversation, LessonCatalog, LessonPlayer};

use crate::ai::ChatClient;
use crate::assistant::{AiAssistant, AssistantGateway};
use crate::config::AiConfig;
use crate::conversation_service::ConversationService;
use crate::error::AppServicesError;
use crate::evaluation_service::EvaluationService;
use crate::evaluator::{AiEvaluator, EvaluatorGateway};

/// Assembles the lesson catalog and gateway-backed services.
#[derive(Clone)]
pub struct TutorServices {
    clock: Clock,
    catalog: Arc<LessonCatalog>,
    evaluation: Arc<EvaluationService>,
    conversation: Arc<ConversationService>,
    gateways_configured: bool,
}

impl TutorServices {
    /// Build services with the bundled curriculum and gateways configured from
    /// the environment.
    ///
    /// A missing or invalid gateway configuration is not an error: it is logged
    /// and every evaluation or chat call then degrades to its fallback.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the bundled catalog cannot be loaded.
    pub fn from_env(clock: Clock) -> Result<Self, AppServicesError> {
        let catalog = Arc::new(LessonCatalog::builtin()?);
        let config = match AiConfig::from_env() {
            Ok(config) => {
                tracing::debug!(?config, "AI gateway configured");
                Some(config)
            }
            Err(error) => {
                tracing::warn!(error = %error, "AI gateway disabled; submissions will not be judged");
                None
            }
        };

        let client = ChatClient::new(config);
        let gateways_configured = client.enabled();
        let mut services = Self::new(
            clock,
            catalog,
            Arc::new(AiEvaluator::new(client.clone())),
            Arc::new(AiAssistant::new(client)),
        );
        services.gateways_configured = gateways_configured;
        Ok(services)
    }

    /// Build services around explicit gateways.
    #[must_use]
    pub fn new(
        clock: Clock,
        catalog: Arc<LessonCatalog>,
        evaluator: Arc<dyn EvaluatorGateway>,
        assistant: Arc<dyn AssistantGateway>,
    ) -> Self {
        Self {
            clock,
            catalog,
            evaluation: Arc::new(EvaluationService::new(evaluator)),
            conversation: Arc::new(ConversationService::new(assistant)),
            gateways_configured: true,
        }
    }

    /// Start a player at `start`, or at the first lesson.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if `start` is not in the catalog.
    pub fn player(&self, start: Option<&LessonId>) -> Result<LessonPlayer, CatalogError> {
        match start {
            Some(id) => LessonPlayer::starting_at(Arc::clone(&self.catalog), self.clock, id),
            None => Ok(LessonPlayer::new(Arc::clone(&self.catalog), self.clock)),
        }
    }

    #[must_use]
    pub fn conversation(&self) -> Conversation {
        Conversation::new(self.clock)
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<LessonCatalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn evaluation(&self) -> Arc<EvaluationService> {
        Arc::clone(&self.evaluation)
    }

    #[must_use]
    pub fn conversation_service(&self) -> Arc<ConversationService> {
        Arc::clone(&self.conversation)
    }

    #[must_use]
    pub fn gateways_configured(&self) -> bool {
        self.gateways_configured
    }
}
