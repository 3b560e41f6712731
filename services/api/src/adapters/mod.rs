pub mod emotion_llm;
pub mod insight_llm;
pub mod kv_file;

pub use emotion_llm::OpenAiEmotionAdapter;
pub use insight_llm::OpenAiInsightAdapter;
pub use kv_file::JsonFileStore;

use drift_core::ports::{PortError, PortResult};
use serde::de::DeserializeOwned;

/// Removes a surrounding Markdown code fence (```json ... ```) if the model added one.
pub(crate) fn strip_code_fences(text: &str) -> &str {
    text.trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Parses a model's JSON answer. Anything unparsable or incomplete is `Malformed`.
pub(crate) fn parse_model_json<T: DeserializeOwned>(text: &str) -> PortResult<T> {
    let clean = strip_code_fences(text);
    serde_json::from_str(clean)
        .map_err(|e| PortError::Malformed(format!("{} - Text: {}", e, clean)))
}
