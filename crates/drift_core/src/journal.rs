//! crates/drift_core/src/journal.rs
//!
//! The entry submission flow: validate, measure, classify, build, persist.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::classification::{classify, Classification};
use crate::domain::{BehavioralData, JournalEntry, User};
use crate::ports::{EmotionAnalysis, EmotionClassifierService, KeyValueStore, PortError};
use crate::store::JournalStore;

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("Entry text must not be empty")]
    EmptyText,
    #[error("User rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),
    #[error("Failed to persist entry: {0}")]
    Storage(#[from] PortError),
}

/// What the client submits.
#[derive(Debug, Clone)]
pub struct Submission {
    pub text: String,
    pub user_rating: u8,
    /// Seconds between the first keystroke and submission.
    pub elapsed_seconds: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub entry: JournalEntry,
    /// True when the classifier failed and the scores are zeroed placeholders.
    pub degraded: bool,
    pub user: User,
}

fn to_percent(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

/// Scales the classifier's 0-1 intensity onto the 0-10 entry scale.
fn to_intensity(raw: f64) -> u8 {
    (raw * 10.0).round().clamp(0.0, 10.0) as u8
}

/// Builds an immutable entry from a classification result.
pub fn build_entry(
    user_id: &str,
    text: &str,
    user_rating: u8,
    behavior: BehavioralData,
    analysis: &EmotionAnalysis,
    timestamp: DateTime<Utc>,
) -> JournalEntry {
    JournalEntry {
        id: Uuid::new_v4(),
        user_id: user_id.to_string(),
        text: text.to_string(),
        timestamp,
        emotions: analysis.scores,
        dominant_emotion: analysis.scores.dominant(),
        intensity: to_intensity(analysis.intensity),
        confidence: to_percent(analysis.confidence),
        behavior_confidence: to_percent(analysis.behavior_confidence),
        user_rating,
        behavioral_signals: behavior,
    }
}

/// Ties the store and the classifier together. One submission at a time.
pub struct JournalService<S, C: ?Sized> {
    store: JournalStore<S>,
    classifier: std::sync::Arc<C>,
}

impl<S, C> JournalService<S, C>
where
    S: KeyValueStore,
    C: EmotionClassifierService + ?Sized,
{
    pub fn new(store: JournalStore<S>, classifier: std::sync::Arc<C>) -> Self {
        Self { store, classifier }
    }

    pub fn store(&self) -> &JournalStore<S> {
        &self.store
    }

    pub async fn submit(&self, submission: Submission) -> Result<SubmissionReceipt, SubmissionError> {
        if submission.text.trim().is_empty() {
            return Err(SubmissionError::EmptyText);
        }
        if !(1..=5).contains(&submission.user_rating) {
            return Err(SubmissionError::InvalidRating(submission.user_rating));
        }

        let behavior = BehavioralData::from_timing(&submission.text, submission.elapsed_seconds);
        let classification = classify(self.classifier.as_ref(), &submission.text, &behavior).await;
        let degraded = classification.is_degraded();
        if let Classification::Degraded { reason, .. } = &classification {
            info!(%reason, "Saving entry with zeroed scores");
        }

        let user = self.store.get_user().await?;
        let entry = build_entry(
            &user.id,
            &submission.text,
            submission.user_rating,
            behavior,
            classification.analysis(),
            Utc::now(),
        );
        self.store.save_entry(entry.clone()).await?;
        let user = self.store.get_user().await?;

        info!(
            entry_id = %entry.id,
            dominant = %entry.dominant_emotion,
            streak = user.streak,
            "Journal entry saved"
        );
        Ok(SubmissionReceipt {
            entry,
            degraded,
            user,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Emotion, EmotionScores};
    use crate::ports::{MemoryStore, PortResult};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingClassifier {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl EmotionClassifierService for CountingClassifier {
        async fn analyze_emotion(
            &self,
            _text: &str,
            _behavior: &BehavioralData,
        ) -> PortResult<EmotionAnalysis> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(PortError::Unexpected("quota exceeded".into()));
            }
            Ok(EmotionAnalysis {
                scores: EmotionScores {
                    fear: 0.6,
                    surprise: 0.6,
                    ..EmotionScores::zeroed()
                },
                intensity: 0.74,
                confidence: 81.4,
                behavior_confidence: 140.0,
            })
        }
    }

    fn service(fail: bool) -> JournalService<MemoryStore, CountingClassifier> {
        JournalService::new(
            JournalStore::new(MemoryStore::new()),
            Arc::new(CountingClassifier {
                calls: AtomicUsize::new(0),
                fail,
            }),
        )
    }

    fn submission(text: &str) -> Submission {
        Submission {
            text: text.into(),
            user_rating: 3,
            elapsed_seconds: 4.0,
        }
    }

    #[tokio::test]
    async fn blank_text_is_rejected_without_classifying() {
        let svc = service(false);
        let err = svc.submit(submission("   \n")).await.unwrap_err();
        assert!(matches!(err, SubmissionError::EmptyText));
        assert_eq!(svc.classifier.calls.load(Ordering::SeqCst), 0);
        assert!(svc.store().get_entries().await.is_empty());
    }

    #[tokio::test]
    async fn out_of_range_rating_is_rejected() {
        let svc = service(false);
        let mut s = submission("fine");
        s.user_rating = 6;
        assert!(matches!(
            svc.submit(s).await.unwrap_err(),
            SubmissionError::InvalidRating(6)
        ));
    }

    #[tokio::test]
    async fn submission_builds_and_persists_entry() {
        let svc = service(false);
        let receipt = svc.submit(submission("nervous but excited")).await.unwrap();
        let entry = &receipt.entry;

        assert!(!receipt.degraded);
        assert_eq!(entry.dominant_emotion, Emotion::Fear);
        assert!(entry.is_consistent());
        assert_eq!(entry.intensity, 7);
        assert_eq!(entry.confidence, 81);
        assert_eq!(entry.behavior_confidence, 100);
        assert_eq!(entry.user_id, "user-1");
        assert_eq!(entry.behavioral_signals.text_length, 19);
        assert_eq!(receipt.user.streak, 1);

        let stored = svc.store().get_entries().await;
        assert_eq!(stored.newest(), Some(entry));
    }

    #[tokio::test]
    async fn classifier_failure_still_saves_zeroed_entry() {
        let svc = service(true);
        let receipt = svc.submit(submission("whatever")).await.unwrap();
        assert!(receipt.degraded);
        assert_eq!(receipt.entry.emotions, EmotionScores::zeroed());
        assert_eq!(receipt.entry.dominant_emotion, Emotion::Joy);
        assert_eq!(receipt.entry.intensity, 0);
        assert_eq!(svc.store().get_entries().await.len(), 1);
    }

    #[test]
    fn intensity_scaling_rounds_and_clamps() {
        assert_eq!(to_intensity(0.0), 0);
        assert_eq!(to_intensity(0.44), 4);
        assert_eq!(to_intensity(0.46), 5);
        assert_eq!(to_intensity(7.0), 10);
        assert_eq!(to_intensity(-1.0), 0);
    }
}
