pub mod aggregation;
pub mod classification;
pub mod domain;
pub mod export;
pub mod insights;
pub mod journal;
pub mod ports;
pub mod store;

pub use aggregation::{DashboardSummary, PositivityBreakdown, TimelinePoint};
pub use classification::Classification;
pub use domain::{AIInsight, BehavioralData, Emotion, EmotionScores, EntryLog, JournalEntry, Theme, User};
pub use insights::{InsightBoard, InsightOutcome, InsightTicket};
pub use journal::{JournalService, Submission, SubmissionError, SubmissionReceipt};
pub use ports::{
    EmotionAnalysis, EmotionClassifierService, InsightGenerationService, InsightNarrative,
    InsightRequest, KeyValueStore, MemoryStore, PortError, PortResult,
};
pub use store::JournalStore;
