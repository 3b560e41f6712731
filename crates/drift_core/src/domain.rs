//! crates/drift_core/src/domain.rs
//!
//! Defines the core data structures for the journal.
//! Field names serialize in camelCase because the persisted key-value layout
//! stores these records as JSON blobs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

//=========================================================================================
// Emotions
//=========================================================================================

/// One of the six scored emotion categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Joy,
    Sadness,
    Anger,
    Fear,
    Calm,
    Surprise,
}

impl Emotion {
    /// Canonical category order. Argmax ties resolve to the earliest entry here.
    pub const ALL: [Emotion; 6] = [
        Emotion::Joy,
        Emotion::Sadness,
        Emotion::Anger,
        Emotion::Fear,
        Emotion::Calm,
        Emotion::Surprise,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Emotion::Joy => "joy",
            Emotion::Sadness => "sadness",
            Emotion::Anger => "anger",
            Emotion::Fear => "fear",
            Emotion::Calm => "calm",
            Emotion::Surprise => "surprise",
        }
    }

    /// Human-readable label used in reports.
    pub fn label(self) -> &'static str {
        match self {
            Emotion::Joy => "Joy",
            Emotion::Sadness => "Sadness",
            Emotion::Anger => "Anger",
            Emotion::Fear => "Fear",
            Emotion::Calm => "Calm",
            Emotion::Surprise => "Surprise",
        }
    }

    /// Hex color for charting clients.
    pub fn color(self) -> &'static str {
        match self {
            Emotion::Joy => "#FBBF24",
            Emotion::Sadness => "#60A5FA",
            Emotion::Anger => "#F87171",
            Emotion::Fear => "#A78BFA",
            Emotion::Calm => "#34D399",
            Emotion::Surprise => "#F472B6",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Per-category scores as returned by the classifier, nominally in [0, 1].
/// There is no sum-to-one constraint.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EmotionScores {
    pub joy: f64,
    pub sadness: f64,
    pub anger: f64,
    pub fear: f64,
    pub calm: f64,
    pub surprise: f64,
}

impl EmotionScores {
    pub fn zeroed() -> Self {
        Self::default()
    }

    pub fn get(&self, emotion: Emotion) -> f64 {
        match emotion {
            Emotion::Joy => self.joy,
            Emotion::Sadness => self.sadness,
            Emotion::Anger => self.anger,
            Emotion::Fear => self.fear,
            Emotion::Calm => self.calm,
            Emotion::Surprise => self.surprise,
        }
    }

    /// Scores paired with their category, in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Emotion, f64)> + '_ {
        Emotion::ALL.iter().map(move |&e| (e, self.get(e)))
    }

    /// The category with the highest score. A linear scan with a strict
    /// comparison, so ties go to the first category in canonical order.
    pub fn dominant(&self) -> Emotion {
        let mut dominant = Emotion::Joy;
        let mut max = f64::NEG_INFINITY;
        for (emotion, score) in self.iter() {
            if score > max {
                max = score;
                dominant = emotion;
            }
        }
        dominant
    }

    pub fn positive_mass(&self) -> f64 {
        self.joy + self.calm
    }

    pub fn negative_mass(&self) -> f64 {
        self.sadness + self.anger + self.fear
    }
}

//=========================================================================================
// Behavioral Signals
//=========================================================================================

/// Client-observed interaction metadata captured at submission time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehavioralData {
    /// Characters per second.
    pub typing_speed: f64,
    /// Seconds between the first keystroke and submission.
    pub time_spent: f64,
    pub text_length: usize,
}

impl BehavioralData {
    /// Derives the signals from the submitted text and the elapsed writing time.
    /// A zero (or negative) interval falls back to one second for the speed.
    pub fn from_timing(text: &str, elapsed_seconds: f64) -> Self {
        let time_spent = elapsed_seconds.max(0.0);
        let text_length = text.chars().count();
        let divisor = if time_spent > 0.0 { time_spent } else { 1.0 };
        Self {
            typing_speed: text_length as f64 / divisor,
            time_spent,
            text_length,
        }
    }
}

//=========================================================================================
// Entries and Users
//=========================================================================================

/// A single journal entry. Created once at submission and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: Uuid,
    pub user_id: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub emotions: EmotionScores,
    pub dominant_emotion: Emotion,
    /// 0-10.
    pub intensity: u8,
    /// 0-100.
    pub confidence: u8,
    /// 0-100, confidence enhanced by behavioral signals.
    pub behavior_confidence: u8,
    /// 1-5 self-reported mood.
    pub user_rating: u8,
    pub behavioral_signals: BehavioralData,
}

impl JournalEntry {
    /// True when the stored dominant emotion is the argmax of the entry's own scores.
    pub fn is_consistent(&self) -> bool {
        self.dominant_emotion == self.emotions.dominant()
    }
}

/// The single local user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub streak: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_entry_date: Option<DateTime<Utc>>,
}

impl Default for User {
    fn default() -> Self {
        Self {
            id: "user-1".to_string(),
            email: "demo@example.com".to_string(),
            name: "Drift Explorer".to_string(),
            streak: 0,
            last_entry_date: None,
        }
    }
}

/// Narrative insights plus the two locally computed metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AIInsight {
    pub summary: String,
    pub trends: Vec<String>,
    pub tips: Vec<String>,
    pub drift_prediction: String,
    /// 0-100.
    pub stability_indicator: f64,
    /// 0-100.
    pub positivity_ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Parses the stored literal. Anything other than the two known values is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

//=========================================================================================
// Entry Log
//=========================================================================================

/// The stored entry collection. Always newest-first: index 0 is the latest entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryLog {
    entries: Vec<JournalEntry>,
}

impl EntryLog {
    /// Wraps a sequence that is already newest-first.
    pub fn from_newest_first(entries: Vec<JournalEntry>) -> Self {
        Self { entries }
    }

    pub fn prepend(&mut self, entry: JournalEntry) {
        self.entries.insert(0, entry);
    }

    pub fn newest(&self) -> Option<&JournalEntry> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Newest-first iteration.
    pub fn iter(&self) -> std::slice::Iter<'_, JournalEntry> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[JournalEntry] {
        &self.entries
    }

    /// At most `n` entries, newest first.
    pub fn recent(&self, n: usize) -> &[JournalEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    /// Entries in ascending timestamp order. Equal timestamps keep their stored order.
    pub fn chronological(&self) -> Vec<&JournalEntry> {
        chronological(&self.entries)
    }

    pub fn into_vec(self) -> Vec<JournalEntry> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a EntryLog {
    type Item = &'a JournalEntry;
    type IntoIter = std::slice::Iter<'a, JournalEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Sorts borrowed entries ascending by timestamp (stable).
pub fn chronological(entries: &[JournalEntry]) -> Vec<&JournalEntry> {
    let mut sorted: Vec<&JournalEntry> = entries.iter().collect();
    sorted.sort_by_key(|e| e.timestamp);
    sorted
}
