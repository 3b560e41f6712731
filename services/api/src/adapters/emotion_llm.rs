//! services/api/src/adapters/emotion_llm.rs
//!
//! This module contains the adapter for the emotion-classifying LLM.
//! It implements the `EmotionClassifierService` port from the `core` crate.

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
use drift_core::{
    domain::{BehavioralData, EmotionScores},
    ports::{EmotionAnalysis, EmotionClassifierService, PortError, PortResult},
};
use serde::Deserialize;

use super::parse_model_json;

const SYSTEM_INSTRUCTIONS: &str = r#"You analyze private journal entries for emotional content and writing behavior.
Respond with ONLY a JSON object, no prose and no code fences, with exactly these numeric fields:
{"joy": 0-1, "sadness": 0-1, "anger": 0-1, "fear": 0-1, "calm": 0-1, "surprise": 0-1,
 "intensity": 0-1, "confidence": 0-100, "behaviorConfidence": 0-100}"#;

const USER_INPUT_TEMPLATE: &str = r#"Analyze the following journal entry for emotional content and behavior.

User Behavior Signals:
- Typing Speed: {typing_speed} chars/sec
- Time Spent: {time_spent} seconds
- Text Length: {text_length} chars

Entry Text: "{text}"

Instructions:
1. Provide emotional scores (0-1) for: joy, sadness, anger, fear, calm, surprise.
2. Provide an overall emotional intensity score (0-1).
3. Provide a base confidence score (0-100) based purely on text clarity.
4. Provide an 'enhanced' behaviorConfidence score (0-100). Slower typing or longer time spent on short text might indicate hesitation or deep reflection, increasing confidence in complex emotions. High speed might indicate raw, impulsive emotion."#;

/// The model's answer. Every field is required; a missing one makes the response malformed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmotionPayload {
    joy: f64,
    sadness: f64,
    anger: f64,
    fear: f64,
    calm: f64,
    surprise: f64,
    intensity: f64,
    confidence: f64,
    behavior_confidence: f64,
}

impl EmotionPayload {
    fn to_domain(self) -> EmotionAnalysis {
        EmotionAnalysis {
            scores: EmotionScores {
                joy: self.joy,
                sadness: self.sadness,
                anger: self.anger,
                fear: self.fear,
                calm: self.calm,
                surprise: self.surprise,
            },
            intensity: self.intensity,
            confidence: self.confidence,
            behavior_confidence: self.behavior_confidence,
        }
    }
}

pub(crate) fn render_prompt(text: &str, behavior: &BehavioralData) -> String {
    USER_INPUT_TEMPLATE
        .replace("{typing_speed}", &format!("{:.2}", behavior.typing_speed))
        .replace("{time_spent}", &format!("{:.1}", behavior.time_spent))
        .replace("{text_length}", &behavior.text_length.to_string())
        .replace("{text}", text)
}

pub(crate) fn parse_emotion_response(content: &str) -> PortResult<EmotionAnalysis> {
    parse_model_json::<EmotionPayload>(content).map(EmotionPayload::to_domain)
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `EmotionClassifierService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiEmotionAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiEmotionAdapter {
    /// Creates a new `OpenAiEmotionAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `EmotionClassifierService` Trait Implementation
//=========================================================================================

#[async_trait]
impl EmotionClassifierService for OpenAiEmotionAdapter {
    async fn analyze_emotion(
        &self,
        text: &str,
        behavior: &BehavioralData,
    ) -> PortResult<EmotionAnalysis> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(render_prompt(text, behavior))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.2)
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
                PortError::Malformed("Emotion LLM response contained no text content.".to_string())
            })?;

        parse_emotion_response(&content)
    }
}
