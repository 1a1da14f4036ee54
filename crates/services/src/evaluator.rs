use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use tutor_core::model::{Evaluation, EvaluationRequest, ResultRow};

use crate::ai::{ChatClient, PromptMessage, PromptRole};
use crate::error::GatewayError;

/// Rows of sample data included in the evaluator prompt.
pub const SAMPLE_ROW_HINT_LIMIT: usize = 5;

/// Feedback used when a verdict arrives without any feedback text.
pub const MISSING_FEEDBACK: &str = "The tutor had a minor glitch. Try running it again!";

/// Boundary to the oracle that judges a query and simulates its result set.
#[async_trait]
pub trait EvaluatorGateway: Send + Sync {
    /// Judge `request.query` against the lesson context in `request`.
    ///
    /// Implementations return evaluations with columns already backfilled.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` on transport, auth, or payload failures.
    async fn evaluate(&self, request: &EvaluationRequest) -> Result<Evaluation, GatewayError>;
}

/// Evaluator backed by a chat-completions model in JSON mode.
#[derive(Clone)]
pub struct AiEvaluator {
    client: ChatClient,
}

impl AiEvaluator {
    #[must_use]
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EvaluatorGateway for AiEvaluator {
    async fn evaluate(&self, request: &EvaluationRequest) -> Result<Evaluation, GatewayError> {
        let messages = [PromptMessage::new(PromptRole::User, build_prompt(request))];
        let raw = self.client.complete(&messages, 0.0, true).await?;
        parse_verdict(&raw)
    }
}

pub(crate) fn build_prompt(request: &EvaluationRequest) -> String {
    let samples = Value::Array(
        request
            .sample_rows
            .iter()
            .take(SAMPLE_ROW_HINT_LIMIT)
            .cloned()
            .map(Value::Object)
            .collect(),
    );

    format!(
        r#"You are a friendly and helpful SQL tutor.

CONTEXT:
- Task: "{task}"
- Table Schema: "{schema}"
- Reference "Correct" Answer: "{reference}"
- Sample Data: {samples}

STUDENT INPUT: "{query}"

INSTRUCTIONS:
1. Determine if the STUDENT INPUT is logically correct for the Task.
2. SIMULATE the result based on the provided sample data.
3. Provide encouraging feedback.
4. If incorrect, explain the mistake (e.g. "Check your table name" or "You missed a comma") without revealing the exact solution.

OUTPUT FORMAT (JSON ONLY):
{{
  "isCorrect": boolean,
  "feedback": "Encouraging and instructive text",
  "rows": [ {{"col1": "val", "col2": "val"}} ],
  "columns": ["col1", "col2"]
}}"#,
        task = request.task,
        schema = request.schema,
        reference = request.reference_query,
        samples = samples,
        query = request.query,
    )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerdictPayload {
    #[serde(default)]
    is_correct: Option<bool>,
    #[serde(default)]
    feedback: Option<String>,
    #[serde(default)]
    rows: Option<Vec<ResultRow>>,
    #[serde(default)]
    columns: Option<Vec<String>>,
}

/// Decode the model's JSON verdict. Anything that is not a verdict object is a fault.
pub(crate) fn parse_verdict(raw: &str) -> Result<Evaluation, GatewayError> {
    let payload: VerdictPayload = serde_json::from_str(strip_code_fence(raw))?;

    let feedback = payload
        .feedback
        .unwrap_or_else(|| MISSING_FEEDBACK.to_string());

    Ok(Evaluation::new(
        payload.is_correct.unwrap_or(false),
        feedback,
        payload.rows.unwrap_or_default(),
        payload.columns.unwrap_or_default(),
    ))
}

/// Some models wrap JSON in a markdown fence even in JSON mode.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = body.strip_prefix("json").unwrap_or(body);
    body.strip_suffix("```").unwrap_or(body).trim()
}
