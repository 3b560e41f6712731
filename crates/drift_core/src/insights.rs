//! crates/drift_core/src/insights.rs
//!
//! Builds insight requests from the entry collection, merges the generator's
//! narrative with the locally computed metrics, and keeps the latest published
//! insight behind a request-sequence token.

use tokio::sync::Mutex;
use tracing::{debug, error};

use crate::aggregation::{positivity_ratio, stability_index};
use crate::domain::{AIInsight, JournalEntry};
use crate::ports::{InsightGenerationService, InsightNarrative, InsightRequest};

/// How many of the most recent entries the generator sees.
pub const INSIGHT_WINDOW: usize = 10;

pub const FALLBACK_SUMMARY: &str = "Analysis unavailable.";
pub const FALLBACK_PREDICTION: &str = "Stay mindful of your daily routine.";

impl InsightRequest {
    /// `entries` must be newest-first. Metrics are computed over the whole
    /// collection; only the window of entries is truncated.
    pub fn from_entries(entries: &[JournalEntry]) -> Self {
        Self {
            entries: entries[..INSIGHT_WINDOW.min(entries.len())].to_vec(),
            stability: f64::from(stability_index(entries)),
            positivity: positivity_ratio(entries),
        }
    }
}

/// Result of one generation attempt. Both variants carry a complete insight.
#[derive(Debug, Clone, PartialEq)]
pub enum InsightOutcome {
    Generated(AIInsight),
    Fallback(AIInsight),
}

impl InsightOutcome {
    pub fn insight(&self) -> &AIInsight {
        match self {
            InsightOutcome::Generated(insight) | InsightOutcome::Fallback(insight) => insight,
        }
    }

    pub fn into_insight(self) -> AIInsight {
        match self {
            InsightOutcome::Generated(insight) | InsightOutcome::Fallback(insight) => insight,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, InsightOutcome::Fallback(_))
    }
}

fn merge(narrative: InsightNarrative, request: &InsightRequest) -> AIInsight {
    AIInsight {
        summary: narrative.summary,
        trends: narrative.trends,
        tips: narrative.tips,
        drift_prediction: narrative.drift_prediction,
        stability_indicator: request.stability,
        positivity_ratio: request.positivity,
    }
}

fn fallback(request: &InsightRequest) -> AIInsight {
    AIInsight {
        summary: FALLBACK_SUMMARY.to_string(),
        trends: Vec::new(),
        tips: Vec::new(),
        drift_prediction: FALLBACK_PREDICTION.to_string(),
        stability_indicator: request.stability,
        positivity_ratio: request.positivity,
    }
}

/// Calls the generator once. On failure the fixed fallback text is used.
/// The two metrics always come from `request`, never from the generator.
pub async fn generate<G>(generator: &G, request: &InsightRequest) -> InsightOutcome
where
    G: InsightGenerationService + ?Sized,
{
    match generator.generate_insights(request).await {
        Ok(narrative) => InsightOutcome::Generated(merge(narrative, request)),
        Err(e) => {
            error!(error = %e, "Insight generation failed; using fallback insight");
            InsightOutcome::Fallback(fallback(request))
        }
    }
}

//=========================================================================================
// Insight Board
//=========================================================================================

/// Sequence number handed out when an insight request starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct InsightTicket(u64);

#[derive(Default)]
struct BoardState {
    latest_issued: u64,
    current: Option<AIInsight>,
}

/// Shared display state for insights. Only a completion holding the most
/// recently issued ticket may publish; anything older is dropped.
#[derive(Default)]
pub struct InsightBoard {
    state: Mutex<BoardState>,
}

impl InsightBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn issue(&self) -> InsightTicket {
        let mut state = self.state.lock().await;
        state.latest_issued += 1;
        InsightTicket(state.latest_issued)
    }

    /// Returns whether the insight was accepted.
    pub async fn publish(&self, ticket: InsightTicket, insight: AIInsight) -> bool {
        let mut state = self.state.lock().await;
        if ticket.0 != state.latest_issued {
            debug!(
                ticket = ticket.0,
                latest = state.latest_issued,
                "Discarding superseded insight"
            );
            return false;
        }
        state.current = Some(insight);
        true
    }

    pub async fn current(&self) -> Option<AIInsight> {
        self.state.lock().await.current.clone()
    }

    /// Drops the displayed insight, e.g. after a purge. Outstanding tickets are invalidated.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.latest_issued += 1;
        state.current = None;
    }
}
