//! crates/drift_core/src/classification.rs
//!
//! Wraps the emotion classifier port so that no failure escapes: a transport
//! error or a malformed response becomes a zeroed, explicitly degraded result.

use tracing::{error, warn};

use crate::domain::BehavioralData;
use crate::ports::{EmotionAnalysis, EmotionClassifierService, PortError};

/// The outcome of a classification attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// The classifier answered with a complete payload.
    Scored(EmotionAnalysis),
    /// The classifier was unavailable or answered with garbage; all values are zero.
    Degraded {
        analysis: EmotionAnalysis,
        reason: String,
    },
}

impl Classification {
    fn degraded(reason: String) -> Self {
        Classification::Degraded {
            analysis: EmotionAnalysis::zeroed(),
            reason,
        }
    }

    /// The payload to build an entry from, whether real or substituted.
    pub fn analysis(&self) -> &EmotionAnalysis {
        match self {
            Classification::Scored(analysis) => analysis,
            Classification::Degraded { analysis, .. } => analysis,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Classification::Degraded { .. })
    }
}

/// Calls the classifier once, without retry, and degrades on any error.
pub async fn classify<C>(classifier: &C, text: &str, behavior: &BehavioralData) -> Classification
where
    C: EmotionClassifierService + ?Sized,
{
    match classifier.analyze_emotion(text, behavior).await {
        Ok(analysis) => Classification::Scored(analysis),
        Err(PortError::Malformed(reason)) => {
            warn!(%reason, "Failed to parse emotion analysis; substituting zeroed scores");
            Classification::degraded(reason)
        }
        Err(e) => {
            error!(error = %e, "Emotion classifier call failed; substituting zeroed scores");
            Classification::degraded(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EmotionScores;
    use crate::ports::PortResult;
    use async_trait::async_trait;

    struct FixedClassifier(PortResult<EmotionAnalysis>);

    #[async_trait]
    impl EmotionClassifierService for FixedClassifier {
        async fn analyze_emotion(
            &self,
            _text: &str,
            _behavior: &BehavioralData,
        ) -> PortResult<EmotionAnalysis> {
            match &self.0 {
                Ok(a) => Ok(*a),
                Err(PortError::Malformed(m)) => Err(PortError::Malformed(m.clone())),
                Err(e) => Err(PortError::Unexpected(e.to_string())),
            }
        }
    }

    #[tokio::test]
    async fn successful_call_is_scored() {
        let analysis = EmotionAnalysis {
            scores: EmotionScores {
                joy: 0.9,
                ..EmotionScores::zeroed()
            },
            intensity: 0.7,
            confidence: 88.0,
            behavior_confidence: 91.0,
        };
        let result = classify(&FixedClassifier(Ok(analysis)), "good day", &BehavioralData::default()).await;
        assert!(!result.is_degraded());
        assert_eq!(result.analysis(), &analysis);
    }

    #[tokio::test]
    async fn malformed_response_degrades_to_zero() {
        let classifier = FixedClassifier(Err(PortError::Malformed("missing field `joy`".into())));
        let result = classify(&classifier, "text", &BehavioralData::default()).await;
        assert!(result.is_degraded());
        assert_eq!(result.analysis(), &EmotionAnalysis::zeroed());
    }

    #[tokio::test]
    async fn transport_failure_degrades_to_zero() {
        let classifier = FixedClassifier(Err(PortError::Unexpected("timeout".into())));
        match classify(&classifier, "text", &BehavioralData::default()).await {
            Classification::Degraded { reason, analysis } => {
                assert!(reason.contains("timeout"));
                assert_eq!(analysis, EmotionAnalysis::zeroed());
            }
            other => panic!("expected degraded, got {other:?}"),
        }
    }
}
