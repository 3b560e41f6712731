//! services/api/src/adapters/insight_llm.rs
//!
//! This module contains the adapter for the insight-generating LLM.
//! It implements the `InsightGenerationService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use drift_core::ports::{
    InsightGenerationService, InsightNarrative, InsightRequest, PortError, PortResult,
};

use super::parse_model_json;

const SYSTEM_INSTRUCTIONS: &str = "You are a supportive wellness assistant reading someone's private mood journal. \
Respond with ONLY a JSON object, no prose and no code fences, with the fields \
\"summary\" (string), \"trends\" (array of 3 strings), \"tips\" (array of 3 strings) \
and \"driftPrediction\" (string).";

pub(crate) fn render_prompt(request: &InsightRequest) -> String {
    let history = request
        .entries
        .iter()
        .map(|e| format!("[{}] {}", e.timestamp.to_rfc3339(), e.text))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Analyze these recent journal entries and provide mental health insights.\n\
         Current Stats: Stability {:.0}%, Positivity {:.0}%\n\
         History:\n{}\n\n\
         Output JSON with:\n\
         - summary: 1-2 sentences of overall mood.\n\
         - trends: List of 3 identified emotional patterns.\n\
         - tips: List of 3 personalized wellness tips.\n\
         - driftPrediction: Prediction of likely mood drift for the next few days.",
        request.stability, request.positivity, history
    )
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `InsightGenerationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiInsightAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiInsightAdapter {
    /// Creates a new `OpenAiInsightAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `InsightGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl InsightGenerationService for OpenAiInsightAdapter {
    async fn generate_insights(&self, request: &InsightRequest) -> PortResult<InsightNarrative> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(render_prompt(request))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.7)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Malformed("Insight LLM response contained no text content.".to_string())
            })?;

        parse_model_json(&content)
    }
}
