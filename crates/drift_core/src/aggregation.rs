//! crates/drift_core/src/aggregation.rs
//!
//! Pure functions deriving dashboard metrics from an entry collection.
//! Nothing here touches storage; callers pass the entries in.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

use crate::domain::{chronological, Emotion, EmotionScores, JournalEntry};

/// Added to the positivity denominator so all-zero input divides cleanly.
pub const POSITIVITY_EPSILON: f64 = 0.1;

/// An intensity change strictly greater than this between adjacent entries is a drift.
pub const DRIFT_INTENSITY_DELTA: u8 = 3;

/// Label used where a collection has no dominant emotion.
pub const NO_EMOTION_LABEL: &str = "None";

//=========================================================================================
// Dominant-Emotion Frequency
//=========================================================================================

/// The most common dominant emotion. On a tie the category that reached the
/// maximum count first, iterating in collection order, wins.
pub fn most_frequent_emotion(entries: &[JournalEntry]) -> Option<Emotion> {
    let mut counts: HashMap<Emotion, usize> = HashMap::new();
    let mut best: Option<(Emotion, usize)> = None;
    for entry in entries {
        let count = counts.entry(entry.dominant_emotion).or_insert(0);
        *count += 1;
        if best.map_or(true, |(_, max)| *count > max) {
            best = Some((entry.dominant_emotion, *count));
        }
    }
    best.map(|(emotion, _)| emotion)
}

pub fn emotion_label(emotion: Option<Emotion>) -> &'static str {
    emotion.map_or(NO_EMOTION_LABEL, Emotion::label)
}

//=========================================================================================
// Positivity
//=========================================================================================

/// Rounded positive and negative percentages. Both are computed against the
/// same epsilon-padded denominator, so they need not sum to exactly 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PositivityBreakdown {
    pub positive: u32,
    pub negative: u32,
}

fn masses(entries: &[JournalEntry]) -> (f64, f64) {
    entries.iter().fold((0.0, 0.0), |(pos, neg), e| {
        (pos + e.emotions.positive_mass(), neg + e.emotions.negative_mass())
    })
}

fn percent(value: f64) -> u32 {
    value.round().max(0.0) as u32
}

pub fn positivity(entries: &[JournalEntry]) -> PositivityBreakdown {
    if entries.is_empty() {
        return PositivityBreakdown {
            positive: 0,
            negative: 0,
        };
    }
    let (pos, neg) = masses(entries);
    let total = pos + neg + POSITIVITY_EPSILON;
    PositivityBreakdown {
        positive: percent(pos / total * 100.0),
        negative: percent(neg / total * 100.0),
    }
}

/// Unrounded positive percentage, as handed to the insight generator.
pub fn positivity_ratio(entries: &[JournalEntry]) -> f64 {
    let (pos, neg) = masses(entries);
    pos / (pos + neg + POSITIVITY_EPSILON) * 100.0
}

//=========================================================================================
// Drift and Stability
//=========================================================================================

/// One point of the ascending timeline, with its drift flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePoint {
    pub timestamp: DateTime<Utc>,
    pub dominant_emotion: Emotion,
    #[serde(flatten)]
    pub emotions: EmotionScores,
    pub intensity: u8,
    pub confidence: u8,
    pub behavior_confidence: u8,
    /// User rating scaled from 1-5 to 0.2-1.0 so it shares an axis with the scores.
    pub user_rating: f64,
    pub is_drift: bool,
}

/// Whether `current` drifted from `previous`.
pub fn is_drift(previous: &JournalEntry, current: &JournalEntry) -> bool {
    current.intensity.abs_diff(previous.intensity) > DRIFT_INTENSITY_DELTA
        || current.dominant_emotion != previous.dominant_emotion
}

/// Entries sorted ascending by timestamp with drift flags. The first point never drifts.
pub fn timeline(entries: &[JournalEntry]) -> Vec<TimelinePoint> {
    let sorted = chronological(entries);
    let mut points = Vec::with_capacity(sorted.len());
    for (i, entry) in sorted.iter().enumerate() {
        let drift = i > 0 && is_drift(sorted[i - 1], entry);
        points.push(TimelinePoint {
            timestamp: entry.timestamp,
            dominant_emotion: entry.dominant_emotion,
            emotions: entry.emotions,
            intensity: entry.intensity,
            confidence: entry.confidence,
            behavior_confidence: entry.behavior_confidence,
            user_rating: f64::from(entry.user_rating) / 5.0,
            is_drift: drift,
        });
    }
    points
}

pub fn drift_count(entries: &[JournalEntry]) -> usize {
    timeline(entries).iter().filter(|p| p.is_drift).count()
}

/// 100 minus twice the drift percentage, floored at 0. Fewer than two
/// entries carry no drift information and score 100.
pub fn stability_index(entries: &[JournalEntry]) -> u32 {
    if entries.len() < 2 {
        return 100;
    }
    let drifts = drift_count(entries) as f64;
    let raw = 100.0 - drifts / entries.len() as f64 * 200.0;
    raw.max(0.0).round() as u32
}

//=========================================================================================
// Distribution and Dashboard
//=========================================================================================

/// Mean score of one emotion across the collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmotionShare {
    pub emotion: Emotion,
    pub label: &'static str,
    pub color: &'static str,
    pub value: f64,
}

/// Mean score per emotion, in canonical order, omitting emotions that average zero.
pub fn emotion_distribution(entries: &[JournalEntry]) -> Vec<EmotionShare> {
    if entries.is_empty() {
        return Vec::new();
    }
    let n = entries.len() as f64;
    Emotion::ALL
        .iter()
        .map(|&emotion| {
            let total: f64 = entries.iter().map(|e| e.emotions.get(emotion)).sum();
            EmotionShare {
                emotion,
                label: emotion.label(),
                color: emotion.color(),
                value: total / n,
            }
        })
        .filter(|share| share.value > 0.0)
        .collect()
}

/// Everything the dashboard renders, derived in one pass over the collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_entries: usize,
    pub streak: u32,
    pub stability_index: u32,
    pub most_frequent_emotion: Option<Emotion>,
    pub most_frequent_label: &'static str,
    pub positivity: PositivityBreakdown,
    pub latest_entry: Option<JournalEntry>,
    pub distribution: Vec<EmotionShare>,
    pub timeline: Vec<TimelinePoint>,
}

impl DashboardSummary {
    /// `entries` must be newest-first; the first element is reported as the latest.
    pub fn from_entries(entries: &[JournalEntry], streak: u32) -> Self {
        let most_frequent = most_frequent_emotion(entries);
        Self {
            total_entries: entries.len(),
            streak,
            stability_index: stability_index(entries),
            most_frequent_emotion: most_frequent,
            most_frequent_label: emotion_label(most_frequent),
            positivity: positivity(entries),
            latest_entry: entries.first().cloned(),
            distribution: emotion_distribution(entries),
            timeline: timeline(entries),
        }
    }
}
