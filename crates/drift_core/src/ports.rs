//! crates/drift_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the journal's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to stay independent of the concrete key-value store and LLM provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::{BehavioralData, EmotionScores, JournalEntry};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., filesystem, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Malformed response: {0}")]
    Malformed(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Port Payloads
//=========================================================================================

/// Structured output of the emotion classifier.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionAnalysis {
    pub scores: EmotionScores,
    /// Raw intensity in [0, 1]; scaled to 0-10 when the entry is built.
    pub intensity: f64,
    /// 0-100, based on text clarity alone.
    pub confidence: f64,
    /// 0-100, enhanced by behavioral signals.
    pub behavior_confidence: f64,
}

impl EmotionAnalysis {
    pub fn zeroed() -> Self {
        Self::default()
    }
}

/// What the insight generator is given: a window of recent entries plus the
/// locally computed metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct InsightRequest {
    /// Newest first, at most ten.
    pub entries: Vec<JournalEntry>,
    pub stability: f64,
    pub positivity: f64,
}

/// The narrative part of an insight, as produced by the external generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightNarrative {
    pub summary: String,
    pub trends: Vec<String>,
    pub tips: Vec<String>,
    pub drift_prediction: String,
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// A generic string key-value store (browser local storage, a directory, memory).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> PortResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> PortResult<()>;

    /// Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> PortResult<()>;
}

#[async_trait]
pub trait EmotionClassifierService: Send + Sync {
    /// Scores an entry's text for the six emotions, intensity and confidence.
    async fn analyze_emotion(
        &self,
        text: &str,
        behavior: &BehavioralData,
    ) -> PortResult<EmotionAnalysis>;
}

#[async_trait]
pub trait InsightGenerationService: Send + Sync {
    /// Produces a summary, trends, tips and a drift prediction for recent entries.
    async fn generate_insights(&self, request: &InsightRequest) -> PortResult<InsightNarrative>;
}

//=========================================================================================
// In-Memory Store
//=========================================================================================

/// A process-local `KeyValueStore`. Never fails.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> PortResult<()> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> PortResult<()> {
        self.values.write().await.remove(key);
        Ok(())
    }
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> PortResult<()> {
        (**self).set(key, value).await
    }

    async fn remove(&self, key: &str) -> PortResult<()> {
        (**self).remove(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_get_set_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").await.unwrap(), None);
        store.set("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
        store.remove("k").await.unwrap();
        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }
}
